//! Unit tests for swapchain parameter selection

use crate::vulkan_swapchain::{
    choose_extent, choose_image_count, choose_present_mode, choose_surface_format,
};
use ash::vk;

fn format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
    vk::SurfaceFormatKHR {
        format,
        color_space,
    }
}

// ============================================================================
// SURFACE FORMAT TESTS
// ============================================================================

#[test]
fn test_prefers_bgra_srgb() {
    let formats = [
        format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
    ];
    let chosen = choose_surface_format(&formats).unwrap();
    assert_eq!(chosen.format, vk::Format::B8G8R8A8_SRGB);
    assert_eq!(chosen.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
}

#[test]
fn test_srgb_format_requires_srgb_color_space() {
    // The right format in the wrong color space does not count
    let formats = [
        format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT),
    ];
    let chosen = choose_surface_format(&formats).unwrap();
    assert_eq!(chosen.format, vk::Format::R8G8B8A8_UNORM);
}

#[test]
fn test_falls_back_to_first_format() {
    let formats = [
        format(vk::Format::R5G6B5_UNORM_PACK16, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
    ];
    let chosen = choose_surface_format(&formats).unwrap();
    assert_eq!(chosen.format, vk::Format::R5G6B5_UNORM_PACK16);
}

#[test]
fn test_empty_format_list_is_none() {
    assert!(choose_surface_format(&[]).is_none());
}

// ============================================================================
// PRESENT MODE TESTS
// ============================================================================

#[test]
fn test_prefers_mailbox() {
    let modes = [
        vk::PresentModeKHR::FIFO,
        vk::PresentModeKHR::IMMEDIATE,
        vk::PresentModeKHR::MAILBOX,
    ];
    assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::MAILBOX);
}

#[test]
fn test_falls_back_to_fifo() {
    let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE];
    assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::FIFO);

    // Even an empty list yields FIFO, which the API guarantees
    assert_eq!(choose_present_mode(&[]), vk::PresentModeKHR::FIFO);
}

// ============================================================================
// IMAGE COUNT TESTS
// ============================================================================

#[test]
fn test_requests_one_above_minimum() {
    let capabilities = vk::SurfaceCapabilitiesKHR {
        min_image_count: 2,
        max_image_count: 8,
        ..Default::default()
    };
    assert_eq!(choose_image_count(&capabilities), 3);
}

#[test]
fn test_clamps_to_maximum() {
    let capabilities = vk::SurfaceCapabilitiesKHR {
        min_image_count: 3,
        max_image_count: 3,
        ..Default::default()
    };
    assert_eq!(choose_image_count(&capabilities), 3);
}

#[test]
fn test_zero_maximum_means_unbounded() {
    let capabilities = vk::SurfaceCapabilitiesKHR {
        min_image_count: 4,
        max_image_count: 0,
        ..Default::default()
    };
    assert_eq!(choose_image_count(&capabilities), 5);
}

// ============================================================================
// EXTENT TESTS
// ============================================================================

#[test]
fn test_uses_surface_reported_extent() {
    let capabilities = vk::SurfaceCapabilitiesKHR {
        current_extent: vk::Extent2D {
            width: 1280,
            height: 720,
        },
        ..Default::default()
    };
    let extent = choose_extent(&capabilities, vk::Extent2D { width: 1, height: 1 });
    assert_eq!(extent.width, 1280);
    assert_eq!(extent.height, 720);
}

#[test]
fn test_clamps_fallback_when_surface_defers() {
    let capabilities = vk::SurfaceCapabilitiesKHR {
        current_extent: vk::Extent2D {
            width: u32::MAX,
            height: u32::MAX,
        },
        min_image_extent: vk::Extent2D {
            width: 100,
            height: 100,
        },
        max_image_extent: vk::Extent2D {
            width: 2000,
            height: 1000,
        },
        ..Default::default()
    };

    // Fallback inside the bounds passes through
    let extent = choose_extent(
        &capabilities,
        vk::Extent2D {
            width: 800,
            height: 600,
        },
    );
    assert_eq!(extent, vk::Extent2D { width: 800, height: 600 });

    // Fallback outside the bounds gets clamped on both axes
    let extent = choose_extent(
        &capabilities,
        vk::Extent2D {
            width: 5000,
            height: 50,
        },
    );
    assert_eq!(extent, vk::Extent2D { width: 2000, height: 100 });
}
