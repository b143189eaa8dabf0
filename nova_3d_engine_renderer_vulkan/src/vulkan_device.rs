/// Physical device selection
///
/// Devices are scored and the best qualifying one wins. Hard requirements
/// (queue families, extensions, sampler anisotropy, multisampled color
/// rendering) eliminate a device outright; soft preferences (shared
/// graphics/present family, how high the sample count goes) only affect its
/// score. A device that meets every hard requirement is eligible even with
/// score 0.

use ash::vk;
use nova_3d_engine::nova3d::{Error, Result};
use nova_3d_engine::{engine_debug, engine_error, engine_info};
use std::ffi::CStr;

/// Score bonus when one queue family does both graphics and present
pub const SHARED_FAMILY_BONUS: u32 = 4;

/// Device extensions every candidate must expose
pub const REQUIRED_DEVICE_EXTENSIONS: [&CStr; 2] = [
    ash::khr::swapchain::NAME,
    ash::khr::dynamic_rendering::NAME,
];

/// Queue family indices picked for a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilySelection {
    pub graphics: u32,
    pub present: u32,
    /// True when both roles use the same family
    pub shared: bool,
}

/// The winning device with everything later setup needs from it
pub struct SelectedDevice {
    pub physical_device: vk::PhysicalDevice,
    pub queue_families: QueueFamilySelection,
    pub sample_count: vk::SampleCountFlags,
    pub max_sampler_anisotropy: f32,
    pub score: u32,
}

/// Pick queue families from per-family capabilities
///
/// `flags[i]` are the queue flags of family `i`; `present_support[i]` says
/// whether family `i` can present to the target surface. A family serving
/// both roles is preferred; otherwise any graphics family is paired with any
/// presenting family.
pub fn find_queue_families(
    flags: &[vk::QueueFlags],
    present_support: &[bool],
) -> Option<QueueFamilySelection> {
    let mut graphics = None;
    let mut present = None;

    for (index, family_flags) in flags.iter().enumerate() {
        let index = index as u32;
        let has_graphics = family_flags.contains(vk::QueueFlags::GRAPHICS);
        let has_present = present_support.get(index as usize).copied().unwrap_or(false);

        if has_graphics {
            graphics.get_or_insert(index);
        }
        if has_present {
            present.get_or_insert(index);
        }
        if has_graphics && has_present {
            return Some(QueueFamilySelection {
                graphics: index,
                present: index,
                shared: true,
            });
        }
    }

    Some(QueueFamilySelection {
        graphics: graphics?,
        present: present?,
        shared: false,
    })
}

/// Pick the highest supported MSAA sample count and its score contribution
///
/// Counts are ranked 64 down to 2; higher counts score more. The frame loop
/// always resolves a multisampled render target, so a device supporting only
/// single-sampled color rendering does not qualify and yields `None`.
pub fn pick_sample_count(supported: vk::SampleCountFlags) -> Option<(vk::SampleCountFlags, u32)> {
    const RANKED: [vk::SampleCountFlags; 6] = [
        vk::SampleCountFlags::TYPE_64,
        vk::SampleCountFlags::TYPE_32,
        vk::SampleCountFlags::TYPE_16,
        vk::SampleCountFlags::TYPE_8,
        vk::SampleCountFlags::TYPE_4,
        vk::SampleCountFlags::TYPE_2,
    ];

    for (rank, &count) in RANKED.iter().enumerate() {
        if supported.contains(count) {
            return Some((count, 7 - rank as u32));
        }
    }
    None
}

/// True when `available` covers every required device extension
pub fn has_required_extensions(available: &[&CStr]) -> bool {
    REQUIRED_DEVICE_EXTENSIONS
        .iter()
        .all(|required| available.contains(required))
}

/// Enumerate physical devices and select the best qualifying one
pub fn select_physical_device(
    instance: &ash::Instance,
    surface_loader: &ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
) -> Result<SelectedDevice> {
    unsafe {
        let physical_devices = instance.enumerate_physical_devices().map_err(|e| {
            engine_error!(
                "nova3d::vulkan",
                "Failed to enumerate physical devices: {:?}",
                e
            );
            Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
        })?;

        let mut best: Option<SelectedDevice> = None;

        for physical_device in physical_devices {
            let properties = instance.get_physical_device_properties(physical_device);
            let device_name = properties
                .device_name_as_c_str()
                .unwrap_or(c"<unnamed>")
                .to_string_lossy();

            // Hard requirement: a graphics family and a presenting family
            let queue_families =
                instance.get_physical_device_queue_family_properties(physical_device);
            let flags: Vec<vk::QueueFlags> =
                queue_families.iter().map(|qf| qf.queue_flags).collect();
            let present_support: Vec<bool> = (0..queue_families.len() as u32)
                .map(|index| {
                    surface_loader
                        .get_physical_device_surface_support(physical_device, index, surface)
                        .unwrap_or(false)
                })
                .collect();

            let Some(selection) = find_queue_families(&flags, &present_support) else {
                engine_debug!(
                    "nova3d::vulkan",
                    "Rejecting '{}': no graphics/present queue families",
                    device_name
                );
                continue;
            };

            // Hard requirement: swapchain and dynamic rendering extensions
            let extensions = instance
                .enumerate_device_extension_properties(physical_device)
                .map_err(|e| {
                    engine_error!(
                        "nova3d::vulkan",
                        "Failed to query extensions of '{}': {:?}",
                        device_name,
                        e
                    );
                    Error::InitializationFailed(format!(
                        "Failed to query device extensions: {:?}",
                        e
                    ))
                })?;
            let available: Vec<&CStr> = extensions
                .iter()
                .filter_map(|ext| ext.extension_name_as_c_str().ok())
                .collect();
            if !has_required_extensions(&available) {
                engine_debug!(
                    "nova3d::vulkan",
                    "Rejecting '{}': missing required extensions",
                    device_name
                );
                continue;
            }

            // Hard requirement: anisotropic filtering
            let features = instance.get_physical_device_features(physical_device);
            if features.sampler_anisotropy != vk::TRUE {
                engine_debug!(
                    "nova3d::vulkan",
                    "Rejecting '{}': no sampler anisotropy",
                    device_name
                );
                continue;
            }

            // Hard requirement: multisampled color rendering
            let Some((sample_count, sample_score)) =
                pick_sample_count(properties.limits.framebuffer_color_sample_counts)
            else {
                engine_debug!(
                    "nova3d::vulkan",
                    "Rejecting '{}': no multisampled color support",
                    device_name
                );
                continue;
            };

            let mut score = sample_score;
            if selection.shared {
                score += SHARED_FAMILY_BONUS;
            }

            engine_debug!(
                "nova3d::vulkan",
                "Candidate '{}': score {}, {:?} samples",
                device_name,
                score,
                sample_count
            );

            let candidate = SelectedDevice {
                physical_device,
                queue_families: selection,
                sample_count,
                max_sampler_anisotropy: properties.limits.max_sampler_anisotropy,
                score,
            };

            match &best {
                Some(current) if current.score >= candidate.score => {}
                _ => best = Some(candidate),
            }
        }

        let selected = best.ok_or_else(|| {
            engine_error!(
                "nova3d::vulkan",
                "No GPU meets the renderer's requirements"
            );
            Error::InitializationFailed(
                "No GPU meets the renderer's requirements".to_string(),
            )
        })?;

        engine_info!(
            "nova3d::vulkan",
            "Selected GPU with score {} ({:?} samples, shared family: {})",
            selected.score,
            selected.sample_count,
            selected.queue_families.shared
        );
        Ok(selected)
    }
}
