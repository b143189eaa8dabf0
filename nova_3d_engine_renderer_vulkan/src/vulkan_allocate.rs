/// GPU memory allocation helpers
///
/// All memory comes straight from vkAllocateMemory, one allocation per
/// buffer or image. Resource counts are fixed at startup, so a suballocating
/// allocator would buy nothing here.

use ash::vk;
use nova_3d_engine::nova3d::{Error, Result};
use nova_3d_engine::{engine_error, engine_trace};

use crate::vulkan_image::create_image_view;

/// Find the lowest memory type index usable for an allocation
///
/// A type qualifies when its bit is set in `memory_type_bits` (from the
/// resource's memory requirements) and its property flags contain every flag
/// in `required_flags`.
pub fn find_memory_type(
    memory_type_bits: u32,
    required_flags: vk::MemoryPropertyFlags,
    properties: &vk::PhysicalDeviceMemoryProperties,
) -> Option<u32> {
    (0..properties.memory_type_count).find(|&type_index| {
        memory_type_bits & (1 << type_index) != 0
            && properties.memory_types[type_index as usize]
                .property_flags
                .contains(required_flags)
    })
}

/// Allocate device memory satisfying `requirements` and `required_flags`
fn allocate_memory(
    device: &ash::Device,
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    requirements: vk::MemoryRequirements,
    required_flags: vk::MemoryPropertyFlags,
) -> Result<vk::DeviceMemory> {
    let type_index = find_memory_type(
        requirements.memory_type_bits,
        required_flags,
        memory_properties,
    )
    .ok_or_else(|| {
        engine_error!(
            "nova3d::vulkan",
            "No memory type matches bits {:#x} with flags {:?}",
            requirements.memory_type_bits,
            required_flags
        );
        Error::OutOfMemory
    })?;

    let allocate_info = vk::MemoryAllocateInfo::default()
        .allocation_size(requirements.size)
        .memory_type_index(type_index);

    unsafe {
        device.allocate_memory(&allocate_info, None).map_err(|e| {
            engine_error!(
                "nova3d::vulkan",
                "Failed to allocate {} bytes of GPU memory: {:?}",
                requirements.size,
                e
            );
            Error::OutOfMemory
        })
    }
}

/// A buffer with its backing memory allocation
pub struct MemoryBuffer {
    pub buffer: vk::Buffer,
    pub memory: vk::DeviceMemory,
}

impl MemoryBuffer {
    /// Create a buffer and bind fresh memory to it
    pub fn allocate(
        device: &ash::Device,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        required_flags: vk::MemoryPropertyFlags,
    ) -> Result<Self> {
        engine_trace!(
            "nova3d::vulkan",
            "Allocating buffer: {} bytes, usage {:?}",
            size,
            usage
        );

        let buffer_create_info = vk::BufferCreateInfo::default()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        unsafe {
            let buffer = device
                .create_buffer(&buffer_create_info, None)
                .map_err(|e| {
                    engine_error!("nova3d::vulkan", "Failed to create buffer: {:?}", e);
                    Error::BackendError(format!("Failed to create buffer: {:?}", e))
                })?;

            let requirements = device.get_buffer_memory_requirements(buffer);
            let memory =
                match allocate_memory(device, memory_properties, requirements, required_flags) {
                    Ok(memory) => memory,
                    Err(e) => {
                        device.destroy_buffer(buffer, None);
                        return Err(e);
                    }
                };

            device
                .bind_buffer_memory(buffer, memory, 0)
                .map_err(|e| {
                    engine_error!("nova3d::vulkan", "Failed to bind buffer memory: {:?}", e);
                    device.destroy_buffer(buffer, None);
                    device.free_memory(memory, None);
                    Error::BackendError(format!("Failed to bind buffer memory: {:?}", e))
                })?;

            Ok(Self { buffer, memory })
        }
    }

    /// Destroy the buffer and free its memory
    ///
    /// # Safety
    ///
    /// The GPU must be done with the buffer.
    pub unsafe fn destroy(&self, device: &ash::Device) {
        device.destroy_buffer(self.buffer, None);
        device.free_memory(self.memory, None);
    }
}

/// An image with its view and backing memory allocation
pub struct AllocatedImage {
    pub image: vk::Image,
    pub view: vk::ImageView,
    pub memory: vk::DeviceMemory,
}

impl AllocatedImage {
    /// Create a 2D image in device-local memory along with a matching view
    pub fn allocate(
        device: &ash::Device,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        extent: vk::Extent2D,
        format: vk::Format,
        samples: vk::SampleCountFlags,
        usage: vk::ImageUsageFlags,
        aspect: vk::ImageAspectFlags,
    ) -> Result<Self> {
        engine_trace!(
            "nova3d::vulkan",
            "Allocating image: {}x{} {:?}, {:?} samples",
            extent.width,
            extent.height,
            format,
            samples
        );

        let image_create_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(format)
            .extent(vk::Extent3D {
                width: extent.width,
                height: extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .samples(samples)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        unsafe {
            let image = device
                .create_image(&image_create_info, None)
                .map_err(|e| {
                    engine_error!("nova3d::vulkan", "Failed to create image: {:?}", e);
                    Error::BackendError(format!("Failed to create image: {:?}", e))
                })?;

            let requirements = device.get_image_memory_requirements(image);
            let memory = match allocate_memory(
                device,
                memory_properties,
                requirements,
                vk::MemoryPropertyFlags::DEVICE_LOCAL,
            ) {
                Ok(memory) => memory,
                Err(e) => {
                    device.destroy_image(image, None);
                    return Err(e);
                }
            };

            if let Err(e) = device.bind_image_memory(image, memory, 0) {
                engine_error!("nova3d::vulkan", "Failed to bind image memory: {:?}", e);
                device.destroy_image(image, None);
                device.free_memory(memory, None);
                return Err(Error::BackendError(format!(
                    "Failed to bind image memory: {:?}",
                    e
                )));
            }

            let view = match create_image_view(device, image, format, aspect) {
                Ok(view) => view,
                Err(e) => {
                    device.destroy_image(image, None);
                    device.free_memory(memory, None);
                    return Err(e);
                }
            };

            Ok(Self {
                image,
                view,
                memory,
            })
        }
    }

    /// Destroy the image, its view and free its memory
    ///
    /// # Safety
    ///
    /// The GPU must be done with the image.
    pub unsafe fn destroy(&self, device: &ash::Device) {
        device.destroy_image_view(self.view, None);
        device.destroy_image(self.image, None);
        device.free_memory(self.memory, None);
    }
}
