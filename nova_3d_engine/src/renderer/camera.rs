/// Camera matrix helpers shared by all backends
///
/// Backends upload these matrices verbatim into the per-frame global uniform
/// block. The projection already carries the Vulkan clip-space Y flip.

use glam::{Mat4, Vec3};

/// Vertical field of view in degrees
pub const FOV_Y_DEGREES: f32 = 75.0;

/// Near clip plane distance
pub const Z_NEAR: f32 = 0.1;

/// Far clip plane distance
pub const Z_FAR: f32 = 100.0;

/// View matrix for a camera at `position` looking at `target`, +Y up
pub fn view_matrix(position: Vec3, target: Vec3) -> Mat4 {
    Mat4::look_at_rh(position, target, Vec3::Y)
}

/// Perspective projection for a surface of the given pixel extent
///
/// Uses a 0..1 depth range and flips the Y axis so that clip space matches
/// the presentation surface orientation.
pub fn projection_matrix(width: u32, height: u32) -> Mat4 {
    let aspect = width as f32 / height as f32;
    let mut proj = Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect, Z_NEAR, Z_FAR);
    proj.y_axis.y *= -1.0;
    proj
}
