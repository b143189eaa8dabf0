/// RenderList - the per-frame scene snapshot handed to the backend

use crate::error::{Error, Result};
use glam::{Mat4, Quat, Vec3};

/// Maximum number of instances a single frame may draw
///
/// Bounds the per-instance region of the backend's host-mapped uniform
/// buffer, which is sized once at startup. `RenderList::push` enforces it.
pub const MAX_RENDER_INSTANCES: usize = 64;

/// Handle to a mesh uploaded into a backend
///
/// Obtained positionally: the renderer is built with a slice of mesh assets,
/// and the handle's index refers to that slice. A handle is only meaningful
/// for the renderer it was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(usize);

impl MeshHandle {
    /// Create a handle for the mesh at `index` in the renderer's mesh set
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Index into the renderer's mesh set
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One drawable entry in a render list
#[derive(Debug, Clone, Copy)]
pub struct RenderInstance {
    /// World-space position
    pub position: Vec3,
    /// World-space orientation
    pub orientation: Quat,
    /// Which uploaded mesh to draw
    pub mesh: MeshHandle,
}

impl RenderInstance {
    /// Model matrix for this instance (translation applied after rotation)
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_quat(self.orientation)
    }
}

/// Complete description of one frame
///
/// The application rebuilds or mutates this snapshot every frame and hands
/// it to `Renderer::render`. The backend reads it, never stores it.
#[derive(Debug, Clone)]
pub struct RenderList {
    /// Background clear color (RGB, alpha is forced to 1.0)
    pub clear_color: Vec3,
    /// Camera eye position
    pub camera_position: Vec3,
    /// Point the camera looks at
    pub camera_target: Vec3,
    instances: Vec<RenderInstance>,
}

impl RenderList {
    /// Create an empty list with a black background and a camera at the origin
    /// looking down -Z
    pub fn new() -> Self {
        Self {
            clear_color: Vec3::ZERO,
            camera_position: Vec3::ZERO,
            camera_target: Vec3::new(0.0, 0.0, -1.0),
            instances: Vec::new(),
        }
    }

    /// Add an instance to draw this frame
    ///
    /// # Errors
    ///
    /// Fails when the list already holds [`MAX_RENDER_INSTANCES`] entries.
    pub fn push(&mut self, instance: RenderInstance) -> Result<()> {
        if self.instances.len() >= MAX_RENDER_INSTANCES {
            return Err(Error::BackendError(format!(
                "Render list full: capacity is {} instances",
                MAX_RENDER_INSTANCES
            )));
        }
        self.instances.push(instance);
        Ok(())
    }

    /// Remove all instances, keeping camera and clear color
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Instances to draw this frame
    pub fn instances(&self) -> &[RenderInstance] {
        &self.instances
    }

    /// Number of instances queued
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// True when no instances are queued
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl Default for RenderList {
    fn default() -> Self {
        Self::new()
    }
}
