//! Error types for the Nova3D engine
//!
//! Every fallible engine operation returns [`Result`]. A stale presentation
//! surface (out-of-date or suboptimal swapchain) is deliberately NOT an error:
//! backends recover from it internally and report it through
//! `renderer::FrameStatus`.

use std::fmt;

/// Result type for Nova3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Nova3D engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific failure (unexpected API result at runtime)
    BackendError(String),

    /// No GPU memory left, or no memory type satisfies an allocation request
    OutOfMemory,

    /// Malformed or unreadable asset data (mesh, texture, shader bytecode)
    InvalidAsset(String),

    /// Setup failed: missing device requirements or an API error during init
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidAsset(msg) => write!(f, "Invalid asset: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
