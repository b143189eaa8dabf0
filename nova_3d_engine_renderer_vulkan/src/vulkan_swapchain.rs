/// Swapchain and per-surface resources
///
/// Everything invalidated by a surface change lives in one bundle: the
/// swapchain itself, its image views, the multisampled render target, the
/// depth buffer, and the two frame semaphores. Recreation destroys and
/// rebuilds the whole bundle after a device idle wait, so stale semaphore
/// state can never leak into the new chain.

use ash::vk;
use nova_3d_engine::nova3d::{Error, Result};
use nova_3d_engine::{engine_error, engine_info};

use crate::vulkan_allocate::AllocatedImage;
use crate::vulkan_image::create_image_view;

/// Depth attachment format used by the whole renderer
pub const DEPTH_FORMAT: vk::Format = vk::Format::D32_SFLOAT;

/// Prefer sRGB BGRA; fall back to whatever the surface lists first
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    if formats.is_empty() {
        return None;
    }
    Some(
        formats
            .iter()
            .copied()
            .find(|f| {
                f.format == vk::Format::B8G8R8A8_SRGB
                    && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
            })
            .unwrap_or(formats[0]),
    )
}

/// Prefer MAILBOX; FIFO is the fallback every device must support
pub fn choose_present_mode(modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    if modes.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else {
        vk::PresentModeKHR::FIFO
    }
}

/// One more image than the minimum, clamped to the surface maximum
///
/// A max of 0 means "no limit".
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let mut count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 && count > capabilities.max_image_count {
        count = capabilities.max_image_count;
    }
    count
}

/// Surface extent, falling back to the clamped window size
///
/// Surfaces that let the swapchain pick its own size report u32::MAX for
/// current_extent; the window's framebuffer size clamped to the surface
/// bounds is used in that case.
pub fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    fallback: vk::Extent2D,
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }
    vk::Extent2D {
        width: fallback.width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: fallback.height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

/// Swapchain plus every resource tied to its extent or lifetime
pub struct SwapchainResources {
    pub swapchain: vk::SwapchainKHR,
    pub extent: vk::Extent2D,
    pub surface_format: vk::SurfaceFormatKHR,
    pub images: Vec<vk::Image>,
    pub image_views: Vec<vk::ImageView>,
    /// Multisampled color target, resolved into the acquired swapchain image
    pub render_image: AllocatedImage,
    /// Multisampled depth buffer
    pub depth_image: AllocatedImage,
    /// Signaled when the acquired image is ready to be drawn to
    pub image_available: vk::Semaphore,
    /// Signaled when rendering finishes; presentation waits on it
    pub render_finished: vk::Semaphore,
}

impl SwapchainResources {
    /// Create the swapchain bundle for the surface's current state
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        device: &ash::Device,
        swapchain_loader: &ash::khr::swapchain::Device,
        surface_loader: &ash::khr::surface::Instance,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        sample_count: vk::SampleCountFlags,
        fallback_extent: vk::Extent2D,
    ) -> Result<Self> {
        unsafe {
            let capabilities = surface_loader
                .get_physical_device_surface_capabilities(physical_device, surface)
                .map_err(|e| {
                    engine_error!(
                        "nova3d::vulkan",
                        "Failed to query surface capabilities: {:?}",
                        e
                    );
                    Error::BackendError(format!("Failed to query surface capabilities: {:?}", e))
                })?;

            let formats = surface_loader
                .get_physical_device_surface_formats(physical_device, surface)
                .map_err(|e| {
                    engine_error!("nova3d::vulkan", "Failed to query surface formats: {:?}", e);
                    Error::BackendError(format!("Failed to query surface formats: {:?}", e))
                })?;
            let surface_format = choose_surface_format(&formats).ok_or_else(|| {
                engine_error!("nova3d::vulkan", "Surface reports no formats");
                Error::BackendError("Surface reports no formats".to_string())
            })?;

            let present_modes = surface_loader
                .get_physical_device_surface_present_modes(physical_device, surface)
                .map_err(|e| {
                    engine_error!(
                        "nova3d::vulkan",
                        "Failed to query present modes: {:?}",
                        e
                    );
                    Error::BackendError(format!("Failed to query present modes: {:?}", e))
                })?;
            let present_mode = choose_present_mode(&present_modes);

            let extent = choose_extent(&capabilities, fallback_extent);
            let image_count = choose_image_count(&capabilities);

            engine_info!(
                "nova3d::vulkan",
                "Creating swapchain: {}x{}, {} images, {:?}, {:?}",
                extent.width,
                extent.height,
                image_count,
                surface_format.format,
                present_mode
            );

            let swapchain_create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(surface)
                .min_image_count(image_count)
                .image_format(surface_format.format)
                .image_color_space(surface_format.color_space)
                .image_extent(extent)
                .image_array_layers(1)
                .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
                .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
                .pre_transform(capabilities.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(present_mode)
                .clipped(true);

            let swapchain = swapchain_loader
                .create_swapchain(&swapchain_create_info, None)
                .map_err(|e| {
                    engine_error!("nova3d::vulkan", "Failed to create swapchain: {:?}", e);
                    Error::BackendError(format!("Failed to create swapchain: {:?}", e))
                })?;

            let images = swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(|e| {
                    engine_error!("nova3d::vulkan", "Failed to get swapchain images: {:?}", e);
                    Error::BackendError(format!("Failed to get swapchain images: {:?}", e))
                })?;

            let mut image_views = Vec::with_capacity(images.len());
            for &image in &images {
                image_views.push(create_image_view(
                    device,
                    image,
                    surface_format.format,
                    vk::ImageAspectFlags::COLOR,
                )?);
            }

            let render_image = AllocatedImage::allocate(
                device,
                memory_properties,
                extent,
                surface_format.format,
                sample_count,
                vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_SRC,
                vk::ImageAspectFlags::COLOR,
            )?;

            let depth_image = AllocatedImage::allocate(
                device,
                memory_properties,
                extent,
                DEPTH_FORMAT,
                sample_count,
                vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
                vk::ImageAspectFlags::DEPTH,
            )?;

            // Fresh semaphores per chain; the old ones may hold signals for
            // images that no longer exist.
            let semaphore_create_info = vk::SemaphoreCreateInfo::default();
            let image_available = device
                .create_semaphore(&semaphore_create_info, None)
                .map_err(|e| {
                    engine_error!("nova3d::vulkan", "Failed to create semaphore: {:?}", e);
                    Error::BackendError(format!("Failed to create semaphore: {:?}", e))
                })?;
            let render_finished = device
                .create_semaphore(&semaphore_create_info, None)
                .map_err(|e| {
                    engine_error!("nova3d::vulkan", "Failed to create semaphore: {:?}", e);
                    Error::BackendError(format!("Failed to create semaphore: {:?}", e))
                })?;

            Ok(Self {
                swapchain,
                extent,
                surface_format,
                images,
                image_views,
                render_image,
                depth_image,
                image_available,
                render_finished,
            })
        }
    }

    /// Destroy every resource in the bundle
    ///
    /// # Safety
    ///
    /// The GPU must be idle with respect to this swapchain.
    pub unsafe fn destroy(
        &self,
        device: &ash::Device,
        swapchain_loader: &ash::khr::swapchain::Device,
    ) {
        for &view in &self.image_views {
            device.destroy_image_view(view, None);
        }
        swapchain_loader.destroy_swapchain(self.swapchain, None);
        self.render_image.destroy(device);
        self.depth_image.destroy(device);
        device.destroy_semaphore(self.image_available, None);
        device.destroy_semaphore(self.render_finished, None);
    }
}
