/// Resource module - CPU-side asset decoding
///
/// Assets are fully decoded and validated here before any backend touches
/// them. A renderer is constructed from already-decoded data, so a bad file
/// fails the load call, never a frame.

// Module declarations
pub mod mesh;
pub mod texture;

// Re-export everything
pub use mesh::*;
pub use texture::*;

#[cfg(test)]
mod mesh_tests;
