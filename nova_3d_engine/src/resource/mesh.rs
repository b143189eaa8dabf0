//! Mesh assets and the OBJ-subset loader
//!
//! Supported OBJ records: `v` (position), `vt` (texture UV), `f` (triangular
//! faces with `v/vt/vn` elements). Everything else is skipped. Faces must be
//! triangles; UVs are assigned to vertex-buffer vertices retroactively while
//! walking the faces, since OBJ defines them per face corner.

use crate::error::{Error, Result};
use glam::{Vec2, Vec3};
use std::path::Path;

/// One vertex as uploaded to the GPU
///
/// Layout is position (3 floats) followed by texture UV (2 floats), 20 bytes,
/// matching the vertex attribute offsets the backends declare.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    /// Object-space position
    pub position: Vec3,
    /// Texture coordinate, V pointing down
    pub texture_uv: Vec2,
}

// Two tightly packed float vectors, no padding (12 + 8 = 20 bytes).
unsafe impl bytemuck::Zeroable for MeshVertex {}
unsafe impl bytemuck::Pod for MeshVertex {}

/// Byte stride between consecutive vertices in a vertex buffer
pub const MESH_VERTEX_STRIDE: u32 = std::mem::size_of::<MeshVertex>() as u32;

/// A fully decoded mesh, ready for upload
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// Unique vertices
    pub vertices: Vec<MeshVertex>,
    /// Triangle list, three indices per face, indexing `vertices`
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Load a mesh from an OBJ file on disk
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAsset`] when the file cannot be read or its
    /// contents violate the supported OBJ subset.
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidAsset(format!("Cannot read mesh file {}: {}", path.display(), e))
        })?;
        Self::parse_obj(&text)
    }

    /// Parse OBJ text into mesh data
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAsset`] for non-triangle faces, malformed
    /// records, or indices that point outside the declared data.
    pub fn parse_obj(text: &str) -> Result<Self> {
        let mut vertices: Vec<MeshVertex> = Vec::new();
        let mut texture_uvs: Vec<Vec2> = Vec::new();
        // One entry per face corner: (vertex index, uv index), both 0-based
        let mut face_elements: Vec<(u32, u32)> = Vec::new();

        for (line_number, line) in text.lines().enumerate() {
            let line_number = line_number + 1;
            let mut fields = line.split_whitespace();
            let keyword = match fields.next() {
                Some(k) => k,
                None => continue,
            };

            match keyword {
                "v" => {
                    let position = Vec3::new(
                        parse_float(fields.next(), "v", line_number)?,
                        parse_float(fields.next(), "v", line_number)?,
                        parse_float(fields.next(), "v", line_number)?,
                    );
                    vertices.push(MeshVertex {
                        position,
                        texture_uv: Vec2::ZERO,
                    });
                }
                "vt" => {
                    let u = parse_float(fields.next(), "vt", line_number)?;
                    let v = parse_float(fields.next(), "vt", line_number)?;
                    // OBJ puts V up, sampling puts V down
                    texture_uvs.push(Vec2::new(u, 1.0 - v));
                }
                "f" => {
                    let corners: Vec<&str> = fields.collect();
                    if corners.len() != 3 {
                        return Err(Error::InvalidAsset(format!(
                            "OBJ line {}: face has {} corners, only triangles are supported",
                            line_number,
                            corners.len()
                        )));
                    }
                    for corner in corners {
                        face_elements.push(parse_face_corner(corner, line_number)?);
                    }
                }
                // Normals, materials, groups and comments are skipped
                _ => {}
            }
        }

        // Retroactive UV assignment: indices reference the vertex buffer,
        // UVs come from the face corner that referenced each vertex.
        let vertex_count = vertices.len();
        let mut indices = Vec::with_capacity(face_elements.len());
        for (vertex_index, uv_index) in face_elements {
            let vertex = vertices.get_mut(vertex_index as usize).ok_or_else(|| {
                Error::InvalidAsset(format!(
                    "OBJ face references vertex {} of {}",
                    vertex_index + 1,
                    vertex_count
                ))
            })?;
            let uv = texture_uvs.get(uv_index as usize).ok_or_else(|| {
                Error::InvalidAsset(format!(
                    "OBJ face references texture UV {} of {}",
                    uv_index + 1,
                    texture_uvs.len()
                ))
            })?;
            vertex.texture_uv = *uv;
            indices.push(vertex_index);
        }

        Ok(Self { vertices, indices })
    }

    /// Number of triangles in the mesh
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

fn parse_float(field: Option<&str>, record: &str, line_number: usize) -> Result<f32> {
    field
        .and_then(|f| f.parse::<f32>().ok())
        .ok_or_else(|| {
            Error::InvalidAsset(format!(
                "OBJ line {}: malformed '{}' record",
                line_number, record
            ))
        })
}

/// Parse one `v/vt/vn` face corner into 0-based (vertex, uv) indices
fn parse_face_corner(corner: &str, line_number: usize) -> Result<(u32, u32)> {
    let mut parts = corner.split('/');
    let vertex = parse_face_index(parts.next(), line_number)?;
    let uv = parse_face_index(parts.next(), line_number)?;
    // The normal index must be present even though it is unused
    parse_face_index(parts.next(), line_number)?;
    if parts.next().is_some() {
        return Err(Error::InvalidAsset(format!(
            "OBJ line {}: face corner has too many components",
            line_number
        )));
    }
    Ok((vertex, uv))
}

fn parse_face_index(field: Option<&str>, line_number: usize) -> Result<u32> {
    let index = field
        .and_then(|f| f.parse::<u32>().ok())
        .ok_or_else(|| {
            Error::InvalidAsset(format!(
                "OBJ line {}: face corner must be 'v/vt/vn' with numeric indices",
                line_number
            ))
        })?;
    if index == 0 {
        return Err(Error::InvalidAsset(format!(
            "OBJ line {}: face indices are 1-based, found 0",
            line_number
        )));
    }
    Ok(index - 1)
}
