/*!
# Nova 3D Engine

Core traits and types for the Nova 3D rendering engine.

This crate provides the platform-agnostic API for real-time rendering using
trait-based dynamic polymorphism. Backend implementations (Vulkan today,
possibly others later) live in separate crates and implement these traits.

## Architecture

- **Renderer**: backend capability trait (per-frame render, resize, idle wait)
- **RenderList**: the per-frame scene snapshot handed to the backend
- **resource**: CPU-side asset decoding (OBJ meshes, BMP textures), validated
  before any GPU resource exists
*/

// Internal modules
mod engine;
mod error;
pub mod log;
pub mod renderer;
pub mod resource;


// Main nova3d namespace module
pub mod nova3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine logging host
    pub use crate::engine::Engine;

    // Renderer capability trait
    pub use crate::renderer::Renderer;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
        // Note: engine_* macros live at the crate root via #[macro_export]
    }

    // Render sub-module with all rendering types
    pub mod render {
        pub use crate::renderer::*;
    }

    // Resource sub-module with asset types
    pub mod resource {
        pub use crate::resource::*;
    }
}

// Re-export math library at crate root
pub use glam;
