//! Unit tests for frame attachment configuration

use crate::vulkan::{color_attachment_info, depth_attachment_info};
use ash::vk;

#[test]
fn test_color_attachment_clears_and_stores() {
    let info = color_attachment_info(vk::ImageView::null(), vk::ImageView::null(), [0.1, 0.2, 0.3, 1.0]);

    assert_eq!(info.load_op, vk::AttachmentLoadOp::CLEAR);
    assert_eq!(info.store_op, vk::AttachmentStoreOp::STORE);
    assert_eq!(info.image_layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
    let float32 = unsafe { info.clear_value.color.float32 };
    assert_eq!(float32, [0.1, 0.2, 0.3, 1.0]);
}

#[test]
fn test_color_attachment_resolves_into_resolve_view() {
    let info = color_attachment_info(vk::ImageView::null(), vk::ImageView::null(), [0.0; 4]);

    assert_eq!(info.resolve_mode, vk::ResolveModeFlags::AVERAGE);
    assert_eq!(
        info.resolve_image_layout,
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL
    );
}

#[test]
fn test_depth_attachment_clears_to_far_plane_and_stores() {
    let info = depth_attachment_info(vk::ImageView::null());

    assert_eq!(info.load_op, vk::AttachmentLoadOp::CLEAR);
    assert_eq!(info.store_op, vk::AttachmentStoreOp::STORE);
    assert_eq!(
        info.image_layout,
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
    );
    let depth_stencil = unsafe { info.clear_value.depth_stencil };
    assert_eq!(depth_stencil.depth, 1.0);
    assert_eq!(depth_stencil.stencil, 0);
}
