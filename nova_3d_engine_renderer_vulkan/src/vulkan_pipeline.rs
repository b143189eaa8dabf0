/// Graphics pipeline and descriptor set construction
///
/// One pipeline owns its whole descriptor chain: layout, an exactly-sized
/// pool, and the single set, written once at build time. Binding numbers are
/// positional: binding N is the Nth entry of the config slice, and shader
/// attribute location N is the Nth vertex attribute config.

use ash::vk;
use nova_3d_engine::nova3d::{Error, Result};
use nova_3d_engine::{engine_error, engine_info};
use std::path::Path;

use crate::vulkan_swapchain::DEPTH_FORMAT;

/// One descriptor binding of the world pipeline
///
/// Buffer bindings point into the persistently mapped uniform buffer at an
/// explicit offset and range; the image binding carries its sampler and view
/// directly.
#[derive(Debug, Clone, Copy)]
pub enum DescriptorBindingConfig {
    /// Uniform buffer slice, fixed offset
    UniformBuffer {
        stages: vk::ShaderStageFlags,
        offset: vk::DeviceSize,
        range: vk::DeviceSize,
    },
    /// Uniform buffer slice addressed with a per-draw dynamic offset
    DynamicUniformBuffer {
        stages: vk::ShaderStageFlags,
        offset: vk::DeviceSize,
        range: vk::DeviceSize,
    },
    /// Combined image sampler
    CombinedImageSampler {
        stages: vk::ShaderStageFlags,
        sampler: vk::Sampler,
        view: vk::ImageView,
    },
}

impl DescriptorBindingConfig {
    fn descriptor_type(&self) -> vk::DescriptorType {
        match self {
            Self::UniformBuffer { .. } => vk::DescriptorType::UNIFORM_BUFFER,
            Self::DynamicUniformBuffer { .. } => vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC,
            Self::CombinedImageSampler { .. } => vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
        }
    }

    fn stages(&self) -> vk::ShaderStageFlags {
        match self {
            Self::UniformBuffer { stages, .. }
            | Self::DynamicUniformBuffer { stages, .. }
            | Self::CombinedImageSampler { stages, .. } => *stages,
        }
    }
}

/// One vertex attribute of the world pipeline
#[derive(Debug, Clone, Copy)]
pub struct VertexAttributeConfig {
    pub format: vk::Format,
    /// Byte offset within one vertex
    pub offset: u32,
}

/// Build descriptor set layout bindings from binding configs
///
/// Binding index is the config's position in the slice.
pub fn layout_bindings(
    configs: &[DescriptorBindingConfig],
) -> Vec<vk::DescriptorSetLayoutBinding<'static>> {
    configs
        .iter()
        .enumerate()
        .map(|(binding, config)| {
            vk::DescriptorSetLayoutBinding::default()
                .binding(binding as u32)
                .descriptor_type(config.descriptor_type())
                .descriptor_count(1)
                .stage_flags(config.stages())
        })
        .collect()
}

/// Build pool sizes holding exactly one descriptor per binding
pub fn pool_sizes(configs: &[DescriptorBindingConfig]) -> Vec<vk::DescriptorPoolSize> {
    configs
        .iter()
        .map(|config| vk::DescriptorPoolSize {
            ty: config.descriptor_type(),
            descriptor_count: 1,
        })
        .collect()
}

/// A graphics pipeline with its descriptor chain
pub struct Pipeline {
    pub pipeline: vk::Pipeline,
    pub layout: vk::PipelineLayout,
    pub descriptor_set_layout: vk::DescriptorSetLayout,
    pub descriptor_pool: vk::DescriptorPool,
    pub descriptor_set: vk::DescriptorSet,
}

impl Pipeline {
    /// Destroy the pipeline and its descriptor objects
    ///
    /// # Safety
    ///
    /// The GPU must be done with the pipeline.
    pub unsafe fn destroy(&self, device: &ash::Device) {
        device.destroy_pipeline(self.pipeline, None);
        device.destroy_pipeline_layout(self.layout, None);
        device.destroy_descriptor_pool(self.descriptor_pool, None);
        device.destroy_descriptor_set_layout(self.descriptor_set_layout, None);
    }
}

/// Load a SPIR-V file and wrap it in a shader module
fn create_shader_module(device: &ash::Device, path: &Path) -> Result<vk::ShaderModule> {
    let mut file = std::fs::File::open(path).map_err(|e| {
        engine_error!(
            "nova3d::vulkan",
            "Failed to open shader file {}: {}",
            path.display(),
            e
        );
        Error::InvalidAsset(format!("Failed to open shader file {}: {}", path.display(), e))
    })?;

    let code = ash::util::read_spv(&mut file).map_err(|e| {
        engine_error!(
            "nova3d::vulkan",
            "Shader file {} is not valid SPIR-V: {}",
            path.display(),
            e
        );
        Error::InvalidAsset(format!(
            "Shader file {} is not valid SPIR-V: {}",
            path.display(),
            e
        ))
    })?;

    let create_info = vk::ShaderModuleCreateInfo::default().code(&code);
    unsafe {
        device.create_shader_module(&create_info, None).map_err(|e| {
            engine_error!("nova3d::vulkan", "Failed to create shader module: {:?}", e);
            Error::BackendError(format!("Failed to create shader module: {:?}", e))
        })
    }
}

/// Create the world graphics pipeline
///
/// Targets dynamic rendering against `color_format` plus the fixed depth
/// format, rasterizes at `sample_count`, and leaves viewport and scissor
/// dynamic. Shader modules are destroyed again before returning, and every
/// error path releases the descriptor objects created up to that point.
#[allow(clippy::too_many_arguments)]
pub fn create_graphics_pipeline(
    device: &ash::Device,
    vertex_shader_path: &Path,
    fragment_shader_path: &Path,
    bindings: &[DescriptorBindingConfig],
    vertex_attributes: &[VertexAttributeConfig],
    vertex_stride: u32,
    uniform_buffer: vk::Buffer,
    color_format: vk::Format,
    sample_count: vk::SampleCountFlags,
) -> Result<Pipeline> {
    unsafe {
        // Descriptor set layout, pool and the single set
        let set_layout_bindings = layout_bindings(bindings);
        let descriptor_set_layout_create_info =
            vk::DescriptorSetLayoutCreateInfo::default().bindings(&set_layout_bindings);
        let descriptor_set_layout = device
            .create_descriptor_set_layout(&descriptor_set_layout_create_info, None)
            .map_err(|e| {
                engine_error!(
                    "nova3d::vulkan",
                    "Failed to create descriptor set layout: {:?}",
                    e
                );
                Error::BackendError(format!("Failed to create descriptor set layout: {:?}", e))
            })?;

        let sizes = pool_sizes(bindings);
        let descriptor_pool_create_info = vk::DescriptorPoolCreateInfo::default()
            .pool_sizes(&sizes)
            .max_sets(1);
        let descriptor_pool = device
            .create_descriptor_pool(&descriptor_pool_create_info, None)
            .map_err(|e| {
                device.destroy_descriptor_set_layout(descriptor_set_layout, None);
                engine_error!("nova3d::vulkan", "Failed to create descriptor pool: {:?}", e);
                Error::BackendError(format!("Failed to create descriptor pool: {:?}", e))
            })?;

        let set_layouts = [descriptor_set_layout];
        let descriptor_set_allocate_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(descriptor_pool)
            .set_layouts(&set_layouts);
        let descriptor_set = device
            .allocate_descriptor_sets(&descriptor_set_allocate_info)
            .map_err(|e| {
                device.destroy_descriptor_pool(descriptor_pool, None);
                device.destroy_descriptor_set_layout(descriptor_set_layout, None);
                engine_error!("nova3d::vulkan", "Failed to allocate descriptor set: {:?}", e);
                Error::BackendError(format!("Failed to allocate descriptor set: {:?}", e))
            })?[0];

        // Write every binding in one batch. Info structs are collected
        // first so the writes can reference them by index.
        let buffer_infos: Vec<vk::DescriptorBufferInfo> = bindings
            .iter()
            .map(|config| match config {
                DescriptorBindingConfig::UniformBuffer { offset, range, .. }
                | DescriptorBindingConfig::DynamicUniformBuffer { offset, range, .. } => {
                    vk::DescriptorBufferInfo {
                        buffer: uniform_buffer,
                        offset: *offset,
                        range: *range,
                    }
                }
                DescriptorBindingConfig::CombinedImageSampler { .. } => {
                    vk::DescriptorBufferInfo::default()
                }
            })
            .collect();
        let image_infos: Vec<vk::DescriptorImageInfo> = bindings
            .iter()
            .map(|config| match config {
                DescriptorBindingConfig::CombinedImageSampler { sampler, view, .. } => {
                    vk::DescriptorImageInfo {
                        sampler: *sampler,
                        image_view: *view,
                        image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                    }
                }
                _ => vk::DescriptorImageInfo::default(),
            })
            .collect();

        let writes: Vec<vk::WriteDescriptorSet> = bindings
            .iter()
            .enumerate()
            .map(|(binding, config)| {
                let write = vk::WriteDescriptorSet::default()
                    .dst_set(descriptor_set)
                    .dst_binding(binding as u32)
                    .descriptor_type(config.descriptor_type());
                match config {
                    DescriptorBindingConfig::CombinedImageSampler { .. } => {
                        write.image_info(std::slice::from_ref(&image_infos[binding]))
                    }
                    _ => write.buffer_info(std::slice::from_ref(&buffer_infos[binding])),
                }
            })
            .collect();
        device.update_descriptor_sets(&writes, &[]);

        // Vertex input: one binding, positional attribute locations
        let attribute_descriptions: Vec<vk::VertexInputAttributeDescription> = vertex_attributes
            .iter()
            .enumerate()
            .map(|(location, attribute)| vk::VertexInputAttributeDescription {
                location: location as u32,
                binding: 0,
                format: attribute.format,
                offset: attribute.offset,
            })
            .collect();
        let binding_descriptions = [vk::VertexInputBindingDescription {
            binding: 0,
            stride: vertex_stride,
            input_rate: vk::VertexInputRate::VERTEX,
        }];
        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&binding_descriptions)
            .vertex_attribute_descriptions(&attribute_descriptions);

        // Shaders
        let vertex_shader = match create_shader_module(device, vertex_shader_path) {
            Ok(module) => module,
            Err(e) => {
                device.destroy_descriptor_pool(descriptor_pool, None);
                device.destroy_descriptor_set_layout(descriptor_set_layout, None);
                return Err(e);
            }
        };
        let fragment_shader = match create_shader_module(device, fragment_shader_path) {
            Ok(module) => module,
            Err(e) => {
                device.destroy_shader_module(vertex_shader, None);
                device.destroy_descriptor_pool(descriptor_pool, None);
                device.destroy_descriptor_set_layout(descriptor_set_layout, None);
                return Err(e);
            }
        };
        let shader_stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vertex_shader)
                .name(c"main"),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(fragment_shader)
                .name(c"main"),
        ];

        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST);

        // Counts only; the actual viewport and scissor are dynamic
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);

        let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
            .polygon_mode(vk::PolygonMode::FILL)
            .cull_mode(vk::CullModeFlags::NONE)
            .front_face(vk::FrontFace::CLOCKWISE)
            .line_width(1.0);

        let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(sample_count);

        let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(true)
            .depth_write_enable(true)
            .depth_compare_op(vk::CompareOp::LESS);

        let blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
            .color_write_mask(vk::ColorComponentFlags::RGBA)];
        let color_blend_state =
            vk::PipelineColorBlendStateCreateInfo::default().attachments(&blend_attachments);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let layout_set_layouts = [descriptor_set_layout];
        let pipeline_layout_create_info =
            vk::PipelineLayoutCreateInfo::default().set_layouts(&layout_set_layouts);
        let layout = device
            .create_pipeline_layout(&pipeline_layout_create_info, None)
            .map_err(|e| {
                device.destroy_shader_module(vertex_shader, None);
                device.destroy_shader_module(fragment_shader, None);
                device.destroy_descriptor_pool(descriptor_pool, None);
                device.destroy_descriptor_set_layout(descriptor_set_layout, None);
                engine_error!("nova3d::vulkan", "Failed to create pipeline layout: {:?}", e);
                Error::BackendError(format!("Failed to create pipeline layout: {:?}", e))
            })?;

        // Attachment formats for dynamic rendering replace the render pass
        let color_formats = [color_format];
        let mut rendering_create_info = vk::PipelineRenderingCreateInfo::default()
            .color_attachment_formats(&color_formats)
            .depth_attachment_format(DEPTH_FORMAT);

        let pipeline_create_info = vk::GraphicsPipelineCreateInfo::default()
            .push_next(&mut rendering_create_info)
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .multisample_state(&multisample_state)
            .depth_stencil_state(&depth_stencil_state)
            .color_blend_state(&color_blend_state)
            .dynamic_state(&dynamic_state)
            .layout(layout);

        let pipeline_result = device.create_graphics_pipelines(
            vk::PipelineCache::null(),
            &[pipeline_create_info],
            None,
        );

        // Modules are only needed during pipeline creation
        device.destroy_shader_module(vertex_shader, None);
        device.destroy_shader_module(fragment_shader, None);

        let pipeline = pipeline_result.map_err(|(_, e)| {
            device.destroy_pipeline_layout(layout, None);
            device.destroy_descriptor_pool(descriptor_pool, None);
            device.destroy_descriptor_set_layout(descriptor_set_layout, None);
            engine_error!("nova3d::vulkan", "Failed to create graphics pipeline: {:?}", e);
            Error::BackendError(format!("Failed to create graphics pipeline: {:?}", e))
        })?[0];

        engine_info!(
            "nova3d::vulkan",
            "Created world pipeline: {} bindings, {} vertex attributes",
            bindings.len(),
            vertex_attributes.len()
        );

        Ok(Pipeline {
            pipeline,
            layout,
            descriptor_set_layout,
            descriptor_pool,
            descriptor_set,
        })
    }
}
