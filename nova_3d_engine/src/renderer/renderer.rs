/// Renderer trait - backend capability interface

use crate::error::Result;
use crate::renderer::RenderList;

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Enable validation/debug layers
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Nova3D Application".to_string(),
            app_version: (1, 0, 0),
        }
    }
}

/// Outcome of a successfully handled frame
///
/// A frame that hit a stale swapchain is not an error: the backend rebuilds
/// its presentation resources and skips the draw. Callers normally ignore
/// this value, but tests use it to observe recreation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// The frame was rendered and queued for presentation
    Presented,
    /// The swapchain was stale; it has been rebuilt and the draw was skipped
    SwapchainRebuilt,
}

/// Main renderer trait
///
/// The capability interface implemented by backend-specific renderers
/// (e.g., VulkanRenderer). The application owns the renderer as a plain
/// value and drives it once per frame with a [`RenderList`] snapshot.
///
/// Implementations are not required to be `Send`: backends may keep
/// thread-affine state such as persistently mapped GPU memory.
pub trait Renderer {
    /// Render one frame from a scene snapshot
    ///
    /// Acquires a presentation image, records and submits all GPU commands,
    /// and queues the image for presentation. A stale surface is handled
    /// internally and reported as [`FrameStatus::SwapchainRebuilt`].
    ///
    /// # Arguments
    ///
    /// * `render_list` - Complete scene description for this frame
    ///
    /// # Errors
    ///
    /// Returns an error on unrecoverable GPU failures (device loss,
    /// allocation failure, unexpected API results).
    fn render(&mut self, render_list: &RenderList) -> Result<FrameStatus>;

    /// Notify the renderer that the window surface changed size
    ///
    /// The new extent is used as a fallback when the surface itself does not
    /// report one. Actual swapchain recreation happens lazily on the next
    /// frame that observes a stale surface.
    fn surface_resized(&mut self, width: u32, height: u32);

    /// Block until the GPU has finished all submitted work
    ///
    /// Call before tearing down resources the GPU may still be reading.
    fn wait_idle(&self) -> Result<()>;
}
