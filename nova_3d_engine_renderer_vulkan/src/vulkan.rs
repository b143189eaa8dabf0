/// VulkanRenderer - the Vulkan implementation of the Renderer trait
///
/// All assets are uploaded once at construction time; per frame the renderer
/// only rewrites the persistently mapped uniform buffer and re-records its
/// single command buffer. Synchronization is a device idle wait at the end
/// of every frame, which keeps the resource model to one copy of everything.

use ash::vk;
use nova_3d_engine::nova3d::render::{
    projection_matrix, view_matrix, FrameStatus, RenderList, Renderer, RendererConfig,
    MAX_RENDER_INSTANCES,
};
use nova_3d_engine::nova3d::resource::{MeshData, MeshVertex, TextureImage, MESH_VERTEX_STRIDE};
use nova_3d_engine::nova3d::{Error, Result};
use nova_3d_engine::{engine_bail, engine_err, engine_error, engine_info};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use std::path::Path;

use crate::debug::vulkan_debug_callback;
use crate::vulkan_allocate::{AllocatedImage, MemoryBuffer};
use crate::vulkan_device::{select_physical_device, QueueFamilySelection, REQUIRED_DEVICE_EXTENSIONS};
use crate::vulkan_host_data::{
    GlobalUniforms, HostMappedData, GLOBAL_REGION_OFFSET, GLOBAL_REGION_SIZE,
    HOST_MAPPED_DATA_SIZE, INSTANCE_REGION_OFFSET, INSTANCE_SLOT_SIZE,
};
use crate::vulkan_image::image_memory_barrier;
use crate::vulkan_mesh::{upload_meshes, AllocatedMesh};
use crate::vulkan_pipeline::{
    create_graphics_pipeline, DescriptorBindingConfig, Pipeline, VertexAttributeConfig,
};
use crate::vulkan_swapchain::SwapchainResources;
use crate::vulkan_transient_commands::{begin_transient_commands, end_transient_commands};

const VALIDATION_LAYER: &std::ffi::CStr = c"VK_LAYER_KHRONOS_validation";

/// Assets the renderer uploads at construction time
///
/// Mesh order is significant: `MeshHandle::new(i)` refers to `meshes[i]`.
pub struct RendererAssets<'a> {
    pub meshes: &'a [MeshData],
    pub texture: &'a TextureImage,
    pub vertex_shader: &'a Path,
    pub fragment_shader: &'a Path,
}

/// Vulkan renderer
///
/// Not `Send`: it holds a raw pointer into persistently mapped GPU memory
/// and must stay on the thread that created it.
pub struct VulkanRenderer {
    _entry: ash::Entry,
    instance: ash::Instance,
    debug_messenger: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
    surface_loader: ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    physical_device: vk::PhysicalDevice,
    device: ash::Device,
    swapchain_loader: ash::khr::swapchain::Device,
    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
    sample_count: vk::SampleCountFlags,
    memory_properties: vk::PhysicalDeviceMemoryProperties,

    command_pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,

    host_buffer: MemoryBuffer,
    mapped: *mut HostMappedData,

    sampler: vk::Sampler,
    texture: AllocatedImage,
    mesh_buffer: MemoryBuffer,
    meshes: Vec<AllocatedMesh>,

    pipeline: Pipeline,
    swapchain: Option<SwapchainResources>,
    fallback_extent: vk::Extent2D,
}

impl VulkanRenderer {
    /// Create a renderer for the given window and upload all assets
    pub fn new(
        config: &RendererConfig,
        display_handle: RawDisplayHandle,
        window_handle: RawWindowHandle,
        initial_width: u32,
        initial_height: u32,
        assets: &RendererAssets,
    ) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load().map_err(|e| {
                engine_error!("nova3d::vulkan", "Failed to load Vulkan library: {}", e);
                Error::InitializationFailed(format!("Failed to load Vulkan library: {}", e))
            })?;

            let instance = create_instance(&entry, config, display_handle)?;

            let debug_messenger = if config.enable_validation {
                Some(create_debug_messenger(&entry, &instance)?)
            } else {
                None
            };

            let surface = ash_window::create_surface(
                &entry,
                &instance,
                display_handle,
                window_handle,
                None,
            )
            .map_err(|e| {
                engine_error!("nova3d::vulkan", "Failed to create surface: {:?}", e);
                Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
            })?;
            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

            let selected = select_physical_device(&instance, &surface_loader, surface)?;
            let physical_device = selected.physical_device;
            let queue_families = selected.queue_families;
            let sample_count = selected.sample_count;
            let memory_properties =
                instance.get_physical_device_memory_properties(physical_device);

            let device = create_device(&instance, physical_device, queue_families)?;
            let graphics_queue = device.get_device_queue(queue_families.graphics, 0);
            let present_queue = device.get_device_queue(queue_families.present, 0);
            let swapchain_loader = ash::khr::swapchain::Device::new(&instance, &device);

            let command_pool_create_info = vk::CommandPoolCreateInfo::default()
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
                .queue_family_index(queue_families.graphics);
            let command_pool = device
                .create_command_pool(&command_pool_create_info, None)
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to create command pool: {:?}", e)
                })?;

            let command_buffer_allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);
            let command_buffer = device
                .allocate_command_buffers(&command_buffer_allocate_info)
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to allocate command buffer: {:?}", e)
                })?[0];

            // Uniform buffer, mapped once and left mapped
            let host_buffer = MemoryBuffer::allocate(
                &device,
                &memory_properties,
                HOST_MAPPED_DATA_SIZE,
                vk::BufferUsageFlags::UNIFORM_BUFFER,
                vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
            )?;
            let mapped = device
                .map_memory(
                    host_buffer.memory,
                    0,
                    HOST_MAPPED_DATA_SIZE,
                    vk::MemoryMapFlags::empty(),
                )
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to map uniform memory: {:?}", e)
                })? as *mut HostMappedData;

            let sampler_create_info = vk::SamplerCreateInfo::default()
                .mag_filter(vk::Filter::LINEAR)
                .min_filter(vk::Filter::LINEAR)
                .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
                .address_mode_u(vk::SamplerAddressMode::REPEAT)
                .address_mode_v(vk::SamplerAddressMode::REPEAT)
                .address_mode_w(vk::SamplerAddressMode::REPEAT)
                .anisotropy_enable(true)
                .max_anisotropy(selected.max_sampler_anisotropy)
                .border_color(vk::BorderColor::INT_OPAQUE_BLACK);
            let sampler = device
                .create_sampler(&sampler_create_info, None)
                .map_err(|e| engine_err!("nova3d::vulkan", "Failed to create sampler: {:?}", e))?;

            let texture = upload_texture(
                &device,
                &memory_properties,
                command_pool,
                graphics_queue,
                assets.texture,
            )?;

            let (mesh_buffer, meshes) = upload_meshes(
                &device,
                &memory_properties,
                command_pool,
                graphics_queue,
                assets.meshes,
            )?;

            let fallback_extent = vk::Extent2D {
                width: initial_width,
                height: initial_height,
            };
            let swapchain = SwapchainResources::create(
                &device,
                &swapchain_loader,
                &surface_loader,
                physical_device,
                surface,
                &memory_properties,
                sample_count,
                fallback_extent,
            )?;

            let bindings = [
                DescriptorBindingConfig::UniformBuffer {
                    stages: vk::ShaderStageFlags::VERTEX,
                    offset: GLOBAL_REGION_OFFSET,
                    range: GLOBAL_REGION_SIZE,
                },
                DescriptorBindingConfig::DynamicUniformBuffer {
                    stages: vk::ShaderStageFlags::VERTEX,
                    offset: INSTANCE_REGION_OFFSET,
                    range: INSTANCE_SLOT_SIZE,
                },
                DescriptorBindingConfig::CombinedImageSampler {
                    stages: vk::ShaderStageFlags::FRAGMENT,
                    sampler,
                    view: texture.view,
                },
            ];
            let vertex_attributes = [
                VertexAttributeConfig {
                    format: vk::Format::R32G32B32_SFLOAT,
                    offset: std::mem::offset_of!(MeshVertex, position) as u32,
                },
                VertexAttributeConfig {
                    format: vk::Format::R32G32_SFLOAT,
                    offset: std::mem::offset_of!(MeshVertex, texture_uv) as u32,
                },
            ];
            let pipeline = create_graphics_pipeline(
                &device,
                assets.vertex_shader,
                assets.fragment_shader,
                &bindings,
                &vertex_attributes,
                MESH_VERTEX_STRIDE,
                host_buffer.buffer,
                swapchain.surface_format.format,
                sample_count,
            )?;

            engine_info!(
                "nova3d::vulkan",
                "Renderer ready: {} meshes, {}x{} texture",
                meshes.len(),
                assets.texture.width(),
                assets.texture.height()
            );

            Ok(Self {
                _entry: entry,
                instance,
                debug_messenger,
                surface_loader,
                surface,
                physical_device,
                device,
                swapchain_loader,
                graphics_queue,
                present_queue,
                sample_count,
                memory_properties,
                command_pool,
                command_buffer,
                host_buffer,
                mapped,
                sampler,
                texture,
                mesh_buffer,
                meshes,
                pipeline,
                swapchain: Some(swapchain),
                fallback_extent,
            })
        }
    }

    /// Tear down and rebuild every swapchain-dependent resource
    ///
    /// Rebuilding normally happens lazily, when a frame observes a stale
    /// surface. Calling this forces it immediately, for example after a
    /// display change. Safe to call repeatedly without rendering in between;
    /// each call waits for the device to go idle first.
    pub fn recreate_swapchain(&mut self) -> Result<()> {
        unsafe {
            self.device.device_wait_idle().map_err(|e| {
                engine_err!("nova3d::vulkan", "Wait idle before swapchain rebuild failed: {:?}", e)
            })?;
            if let Some(old) = self.swapchain.take() {
                old.destroy(&self.device, &self.swapchain_loader);
            }
        }

        let rebuilt = SwapchainResources::create(
            &self.device,
            &self.swapchain_loader,
            &self.surface_loader,
            self.physical_device,
            self.surface,
            &self.memory_properties,
            self.sample_count,
            self.fallback_extent,
        )?;
        self.swapchain = Some(rebuilt);
        Ok(())
    }

    /// Copy camera matrices and per-instance transforms into mapped memory
    fn write_uniforms(&mut self, render_list: &RenderList, extent: vk::Extent2D) {
        let clear = render_list.clear_color;
        let global = GlobalUniforms {
            view: view_matrix(render_list.camera_position, render_list.camera_target),
            projection: projection_matrix(extent.width, extent.height),
            clear_color: [clear.x, clear.y, clear.z, 1.0],
        };

        unsafe {
            (*self.mapped).global = global;
            for (index, instance) in render_list.instances().iter().enumerate() {
                (*self.mapped).instances[index].model = instance.model_matrix();
            }
        }
    }

    /// Record the whole frame into the main command buffer
    fn record_frame(
        &self,
        render_list: &RenderList,
        extent: vk::Extent2D,
        render_view: vk::ImageView,
        depth_view: vk::ImageView,
        render_image: vk::Image,
        depth_image: vk::Image,
        swapchain_image: vk::Image,
        swapchain_view: vk::ImageView,
    ) -> Result<()> {
        let device = &self.device;
        let command_buffer = self.command_buffer;

        unsafe {
            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            device
                .begin_command_buffer(command_buffer, &begin_info)
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to begin command buffer: {:?}", e)
                })?;

            // Attachments start undefined every frame; nothing is preserved
            image_memory_barrier(
                device,
                command_buffer,
                render_image,
                vk::ImageAspectFlags::COLOR,
                vk::ImageLayout::UNDEFINED,
                vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                vk::AccessFlags::empty(),
                vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
                vk::PipelineStageFlags::TOP_OF_PIPE,
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            );
            image_memory_barrier(
                device,
                command_buffer,
                depth_image,
                vk::ImageAspectFlags::DEPTH,
                vk::ImageLayout::UNDEFINED,
                vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
                vk::AccessFlags::empty(),
                vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
                vk::PipelineStageFlags::TOP_OF_PIPE,
                vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            );
            image_memory_barrier(
                device,
                command_buffer,
                swapchain_image,
                vk::ImageAspectFlags::COLOR,
                vk::ImageLayout::UNDEFINED,
                vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                vk::AccessFlags::empty(),
                vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
                vk::PipelineStageFlags::TOP_OF_PIPE,
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            );

            let clear = render_list.clear_color;
            let color_attachment = color_attachment_info(
                render_view,
                swapchain_view,
                [clear.x, clear.y, clear.z, 1.0],
            );
            let depth_attachment = depth_attachment_info(depth_view);
            let color_attachments = [color_attachment];
            let rendering_info = vk::RenderingInfo::default()
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D { x: 0, y: 0 },
                    extent,
                })
                .layer_count(1)
                .color_attachments(&color_attachments)
                .depth_attachment(&depth_attachment);
            device.cmd_begin_rendering(command_buffer, &rendering_info);

            let viewport = vk::Viewport {
                x: 0.0,
                y: 0.0,
                width: extent.width as f32,
                height: extent.height as f32,
                min_depth: 0.0,
                max_depth: 1.0,
            };
            device.cmd_set_viewport(command_buffer, 0, &[viewport]);
            let scissor = vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            };
            device.cmd_set_scissor(command_buffer, 0, &[scissor]);

            device.cmd_bind_pipeline(
                command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                self.pipeline.pipeline,
            );

            for (index, instance) in render_list.instances().iter().enumerate() {
                let mesh = self.meshes[instance.mesh.index()];

                device.cmd_bind_vertex_buffers(
                    command_buffer,
                    0,
                    &[self.mesh_buffer.buffer],
                    &[mesh.vertex_buffer_offset],
                );
                device.cmd_bind_index_buffer(
                    command_buffer,
                    self.mesh_buffer.buffer,
                    mesh.index_buffer_offset,
                    vk::IndexType::UINT32,
                );
                let dynamic_offset = index as u32 * INSTANCE_SLOT_SIZE as u32;
                device.cmd_bind_descriptor_sets(
                    command_buffer,
                    vk::PipelineBindPoint::GRAPHICS,
                    self.pipeline.layout,
                    0,
                    &[self.pipeline.descriptor_set],
                    &[dynamic_offset],
                );
                device.cmd_draw_indexed(command_buffer, mesh.index_count, 1, 0, 0, 0);
            }

            device.cmd_end_rendering(command_buffer);

            image_memory_barrier(
                device,
                command_buffer,
                swapchain_image,
                vk::ImageAspectFlags::COLOR,
                vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                vk::ImageLayout::PRESENT_SRC_KHR,
                vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
                vk::AccessFlags::empty(),
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
                vk::PipelineStageFlags::BOTTOM_OF_PIPE,
            );

            device.end_command_buffer(command_buffer).map_err(|e| {
                engine_err!("nova3d::vulkan", "Failed to end command buffer: {:?}", e)
            })?;
        }
        Ok(())
    }
}

impl Renderer for VulkanRenderer {
    fn render(&mut self, render_list: &RenderList) -> Result<FrameStatus> {
        if render_list.len() > MAX_RENDER_INSTANCES {
            engine_bail!(
                "nova3d::vulkan",
                "Render list holds {} instances, capacity is {}",
                render_list.len(),
                MAX_RENDER_INSTANCES
            );
        }
        for instance in render_list.instances() {
            if instance.mesh.index() >= self.meshes.len() {
                engine_bail!(
                    "nova3d::vulkan",
                    "Mesh handle {} out of range ({} meshes uploaded)",
                    instance.mesh.index(),
                    self.meshes.len()
                );
            }
        }

        let (swapchain_handle, extent, image_available, render_finished) = {
            let Some(swapchain) = &self.swapchain else {
                engine_bail!("nova3d::vulkan", "Renderer has no swapchain");
            };
            (
                swapchain.swapchain,
                swapchain.extent,
                swapchain.image_available,
                swapchain.render_finished,
            )
        };

        self.write_uniforms(render_list, extent);

        let acquired = unsafe {
            self.swapchain_loader.acquire_next_image(
                swapchain_handle,
                u64::MAX,
                image_available,
                vk::Fence::null(),
            )
        };
        let image_index = match acquired {
            Ok((index, false)) => index,
            Ok((_, true)) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                self.recreate_swapchain()?;
                return Ok(FrameStatus::SwapchainRebuilt);
            }
            Err(e) => {
                engine_bail!("nova3d::vulkan", "Failed to acquire swapchain image: {:?}", e)
            }
        };

        let (render_view, depth_view, render_image, depth_image, swapchain_image, swapchain_view) = {
            let swapchain = self.swapchain.as_ref().unwrap();
            (
                swapchain.render_image.view,
                swapchain.depth_image.view,
                swapchain.render_image.image,
                swapchain.depth_image.image,
                swapchain.images[image_index as usize],
                swapchain.image_views[image_index as usize],
            )
        };

        self.record_frame(
            render_list,
            extent,
            render_view,
            depth_view,
            render_image,
            depth_image,
            swapchain_image,
            swapchain_view,
        )?;

        unsafe {
            let wait_semaphores = [image_available];
            let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
            let signal_semaphores = [render_finished];
            let command_buffers = [self.command_buffer];
            let submit_info = vk::SubmitInfo::default()
                .wait_semaphores(&wait_semaphores)
                .wait_dst_stage_mask(&wait_stages)
                .command_buffers(&command_buffers)
                .signal_semaphores(&signal_semaphores);
            self.device
                .queue_submit(self.graphics_queue, &[submit_info], vk::Fence::null())
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to submit frame: {:?}", e)
                })?;

            let swapchains = [swapchain_handle];
            let image_indices = [image_index];
            let present_info = vk::PresentInfoKHR::default()
                .wait_semaphores(&signal_semaphores)
                .swapchains(&swapchains)
                .image_indices(&image_indices);
            let presented = self
                .swapchain_loader
                .queue_present(self.present_queue, &present_info);

            match presented {
                Ok(false) => {}
                Ok(true) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                    self.recreate_swapchain()?;
                    return Ok(FrameStatus::SwapchainRebuilt);
                }
                Err(e) => {
                    engine_bail!("nova3d::vulkan", "Failed to present frame: {:?}", e)
                }
            }

            // Single-copy resource model: the next frame rewrites the same
            // uniforms and command buffer, so it must not start until this
            // one finishes.
            self.device.device_wait_idle().map_err(|e| {
                engine_err!("nova3d::vulkan", "Wait idle after present failed: {:?}", e)
            })?;
        }

        Ok(FrameStatus::Presented)
    }

    fn surface_resized(&mut self, width: u32, height: u32) {
        self.fallback_extent = vk::Extent2D { width, height };
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.device.device_wait_idle().map_err(|e| {
                engine_err!("nova3d::vulkan", "Device wait idle failed: {:?}", e)
            })
        }
    }
}

impl Drop for VulkanRenderer {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();

            self.pipeline.destroy(&self.device);
            if let Some(swapchain) = self.swapchain.take() {
                swapchain.destroy(&self.device, &self.swapchain_loader);
            }
            self.device.destroy_sampler(self.sampler, None);
            self.texture.destroy(&self.device);
            self.mesh_buffer.destroy(&self.device);
            self.device.unmap_memory(self.host_buffer.memory);
            self.host_buffer.destroy(&self.device);
            self.device.destroy_command_pool(self.command_pool, None);
            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);
            if let Some((loader, messenger)) = self.debug_messenger.take() {
                loader.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

/// Multisampled color attachment resolving into the acquired swapchain image
pub(crate) fn color_attachment_info(
    render_view: vk::ImageView,
    resolve_view: vk::ImageView,
    clear_color: [f32; 4],
) -> vk::RenderingAttachmentInfo<'static> {
    vk::RenderingAttachmentInfo::default()
        .image_view(render_view)
        .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
        .resolve_mode(vk::ResolveModeFlags::AVERAGE)
        .resolve_image_view(resolve_view)
        .resolve_image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .clear_value(vk::ClearValue {
            color: vk::ClearColorValue {
                float32: clear_color,
            },
        })
}

/// Depth attachment, cleared to the far plane and stored
pub(crate) fn depth_attachment_info(
    depth_view: vk::ImageView,
) -> vk::RenderingAttachmentInfo<'static> {
    vk::RenderingAttachmentInfo::default()
        .image_view(depth_view)
        .image_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .clear_value(vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue {
                depth: 1.0,
                stencil: 0,
            },
        })
}

fn create_instance(
    entry: &ash::Entry,
    config: &RendererConfig,
    display_handle: RawDisplayHandle,
) -> Result<ash::Instance> {
    let app_name = std::ffi::CString::new(config.app_name.as_str()).map_err(|_| {
        Error::InitializationFailed("Application name contains a NUL byte".to_string())
    })?;
    let (major, minor, patch) = config.app_version;

    let app_info = vk::ApplicationInfo::default()
        .application_name(&app_name)
        .application_version(vk::make_api_version(0, major, minor, patch))
        .engine_name(c"Nova3D")
        .engine_version(vk::make_api_version(0, 1, 0, 0))
        .api_version(vk::API_VERSION_1_3);

    let mut extensions = ash_window::enumerate_required_extensions(display_handle)
        .map_err(|e| {
            engine_err!(
                "nova3d::vulkan",
                "Failed to query required surface extensions: {:?}",
                e
            )
        })?
        .to_vec();
    let mut layers = Vec::new();
    if config.enable_validation {
        extensions.push(ash::ext::debug_utils::NAME.as_ptr());
        layers.push(VALIDATION_LAYER.as_ptr());
    }

    let create_info = vk::InstanceCreateInfo::default()
        .application_info(&app_info)
        .enabled_extension_names(&extensions)
        .enabled_layer_names(&layers);

    unsafe {
        entry.create_instance(&create_info, None).map_err(|e| {
            engine_error!("nova3d::vulkan", "Failed to create instance: {:?}", e);
            Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
        })
    }
}

fn create_debug_messenger(
    entry: &ash::Entry,
    instance: &ash::Instance,
) -> Result<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)> {
    let loader = ash::ext::debug_utils::Instance::new(entry, instance);
    let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(vulkan_debug_callback));

    let messenger = unsafe {
        loader
            .create_debug_utils_messenger(&create_info, None)
            .map_err(|e| {
                engine_err!("nova3d::vulkan", "Failed to create debug messenger: {:?}", e)
            })?
    };
    Ok((loader, messenger))
}

fn create_device(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
    queue_families: QueueFamilySelection,
) -> Result<ash::Device> {
    let priorities = [1.0f32];
    let mut queue_create_infos = vec![vk::DeviceQueueCreateInfo::default()
        .queue_family_index(queue_families.graphics)
        .queue_priorities(&priorities)];
    if !queue_families.shared {
        queue_create_infos.push(
            vk::DeviceQueueCreateInfo::default()
                .queue_family_index(queue_families.present)
                .queue_priorities(&priorities),
        );
    }

    let extension_names: Vec<*const std::os::raw::c_char> = REQUIRED_DEVICE_EXTENSIONS
        .iter()
        .map(|name| name.as_ptr())
        .collect();

    let features = vk::PhysicalDeviceFeatures::default().sampler_anisotropy(true);
    let mut dynamic_rendering =
        vk::PhysicalDeviceDynamicRenderingFeatures::default().dynamic_rendering(true);

    let create_info = vk::DeviceCreateInfo::default()
        .push_next(&mut dynamic_rendering)
        .queue_create_infos(&queue_create_infos)
        .enabled_extension_names(&extension_names)
        .enabled_features(&features);

    unsafe {
        instance
            .create_device(physical_device, &create_info, None)
            .map_err(|e| {
                engine_error!("nova3d::vulkan", "Failed to create logical device: {:?}", e);
                Error::InitializationFailed(format!("Failed to create logical device: {:?}", e))
            })
    }
}

fn upload_texture(
    device: &ash::Device,
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    command_pool: vk::CommandPool,
    queue: vk::Queue,
    texture: &TextureImage,
) -> Result<AllocatedImage> {
    let size = texture.byte_size() as vk::DeviceSize;

    let staging = MemoryBuffer::allocate(
        device,
        memory_properties,
        size,
        vk::BufferUsageFlags::TRANSFER_SRC,
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
    )?;

    unsafe {
        let mapped = device
            .map_memory(staging.memory, 0, size, vk::MemoryMapFlags::empty())
            .map_err(|e| {
                staging.destroy(device);
                engine_err!(
                    "nova3d::vulkan",
                    "Failed to map texture staging memory: {:?}",
                    e
                )
            })? as *mut u8;
        std::ptr::copy_nonoverlapping(texture.pixels().as_ptr(), mapped, size as usize);
        device.unmap_memory(staging.memory);
    }

    let extent = vk::Extent2D {
        width: texture.width(),
        height: texture.height(),
    };
    let image = match AllocatedImage::allocate(
        device,
        memory_properties,
        extent,
        vk::Format::R8G8B8A8_SRGB,
        vk::SampleCountFlags::TYPE_1,
        vk::ImageUsageFlags::TRANSFER_DST | vk::ImageUsageFlags::SAMPLED,
        vk::ImageAspectFlags::COLOR,
    ) {
        Ok(image) => image,
        Err(e) => {
            unsafe { staging.destroy(device) };
            return Err(e);
        }
    };

    let copy_result = (|| -> Result<()> {
        let command_buffer = begin_transient_commands(device, command_pool)?;
        unsafe {
            image_memory_barrier(
                device,
                command_buffer,
                image.image,
                vk::ImageAspectFlags::COLOR,
                vk::ImageLayout::UNDEFINED,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                vk::AccessFlags::empty(),
                vk::AccessFlags::TRANSFER_WRITE,
                vk::PipelineStageFlags::TOP_OF_PIPE,
                vk::PipelineStageFlags::TRANSFER,
            );

            let region = vk::BufferImageCopy::default()
                .image_subresource(
                    vk::ImageSubresourceLayers::default()
                        .aspect_mask(vk::ImageAspectFlags::COLOR)
                        .mip_level(0)
                        .base_array_layer(0)
                        .layer_count(1),
                )
                .image_extent(vk::Extent3D {
                    width: extent.width,
                    height: extent.height,
                    depth: 1,
                });
            device.cmd_copy_buffer_to_image(
                command_buffer,
                staging.buffer,
                image.image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );

            image_memory_barrier(
                device,
                command_buffer,
                image.image,
                vk::ImageAspectFlags::COLOR,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                vk::AccessFlags::TRANSFER_WRITE,
                vk::AccessFlags::SHADER_READ,
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::FRAGMENT_SHADER,
            );
        }
        end_transient_commands(device, command_pool, command_buffer, queue)
    })();

    unsafe { staging.destroy(device) };

    match copy_result {
        Ok(()) => Ok(image),
        Err(e) => {
            unsafe { image.destroy(device) };
            Err(e)
        }
    }
}
