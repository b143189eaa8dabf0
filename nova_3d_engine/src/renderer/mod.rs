/// Renderer module - the backend capability trait and per-frame scene types

// Module declarations
pub mod camera;
pub mod render_list;
pub mod renderer;

// Re-export everything
pub use camera::*;
pub use render_list::*;
pub use renderer::*;

#[cfg(test)]
mod render_list_tests;
