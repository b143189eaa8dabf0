//! Unit tests for the OBJ-subset mesh loader

use crate::error::Error;
use crate::resource::{MeshData, MeshVertex, MESH_VERTEX_STRIDE};
use glam::{Vec2, Vec3};

const TRIANGLE_OBJ: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1
";

// ============================================================================
// VERTEX LAYOUT TESTS
// ============================================================================

#[test]
fn test_vertex_stride_is_20_bytes() {
    assert_eq!(MESH_VERTEX_STRIDE, 20);
    assert_eq!(std::mem::size_of::<MeshVertex>(), 20);
}

#[test]
fn test_vertex_is_pod() {
    let vertex = MeshVertex {
        position: Vec3::new(1.0, 2.0, 3.0),
        texture_uv: Vec2::new(0.5, 0.25),
    };
    let bytes: &[u8] = bytemuck::bytes_of(&vertex);
    assert_eq!(bytes.len(), 20);

    // Position floats come first, UV floats after
    let floats: &[f32] = bytemuck::cast_slice(bytes);
    assert_eq!(floats, &[1.0, 2.0, 3.0, 0.5, 0.25]);
}

// ============================================================================
// OBJ PARSING TESTS
// ============================================================================

#[test]
fn test_parse_single_triangle() {
    let mesh = MeshData::parse_obj(TRIANGLE_OBJ).unwrap();

    assert_eq!(mesh.vertices.len(), 3);
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.triangle_count(), 1);

    assert_eq!(mesh.vertices[0].position, Vec3::new(0.0, 0.0, 0.0));
    assert_eq!(mesh.vertices[1].position, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(mesh.vertices[2].position, Vec3::new(0.0, 1.0, 0.0));
}

#[test]
fn test_uv_v_axis_is_flipped() {
    let mesh = MeshData::parse_obj(TRIANGLE_OBJ).unwrap();

    // vt 0,0 becomes 0,1 and vt 0,1 becomes 0,0
    assert_eq!(mesh.vertices[0].texture_uv, Vec2::new(0.0, 1.0));
    assert_eq!(mesh.vertices[1].texture_uv, Vec2::new(1.0, 1.0));
    assert_eq!(mesh.vertices[2].texture_uv, Vec2::new(0.0, 0.0));
}

#[test]
fn test_uvs_assigned_through_face_corners() {
    // Vertices and UVs are referenced in different orders by the face
    let obj = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.1 0.0
vt 0.2 0.0
vt 0.3 0.0
f 3/1/1 1/2/1 2/3/1
";
    let mesh = MeshData::parse_obj(obj).unwrap();

    assert_eq!(mesh.indices, vec![2, 0, 1]);
    assert_eq!(mesh.vertices[2].texture_uv, Vec2::new(0.1, 1.0));
    assert_eq!(mesh.vertices[0].texture_uv, Vec2::new(0.2, 1.0));
    assert_eq!(mesh.vertices[1].texture_uv, Vec2::new(0.3, 1.0));
}

#[test]
fn test_shared_vertices_across_faces() {
    let obj = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";
    let mesh = MeshData::parse_obj(obj).unwrap();

    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    assert_eq!(mesh.triangle_count(), 2);
}

#[test]
fn test_unknown_records_are_skipped() {
    let obj = "\
# a comment line
o cube
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vn 0.0 0.0 1.0
s off
usemtl default
f 1/1/1 2/2/1 3/3/1
";
    let mesh = MeshData::parse_obj(obj).unwrap();
    assert_eq!(mesh.triangle_count(), 1);
}

#[test]
fn test_empty_input_yields_empty_mesh() {
    let mesh = MeshData::parse_obj("").unwrap();
    assert!(mesh.vertices.is_empty());
    assert!(mesh.indices.is_empty());
}

// ============================================================================
// MALFORMED CONTENT TESTS
// ============================================================================

#[test]
fn test_quad_face_is_rejected() {
    let obj = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
f 1/1/1 2/1/1 3/1/1 4/1/1
";
    let result = MeshData::parse_obj(obj);
    assert!(matches!(result, Err(Error::InvalidAsset(_))));
}

#[test]
fn test_face_corner_without_uv_is_rejected() {
    let obj = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";
    let result = MeshData::parse_obj(obj);
    assert!(matches!(result, Err(Error::InvalidAsset(_))));
}

#[test]
fn test_zero_index_is_rejected() {
    let obj = "\
v 0.0 0.0 0.0
vt 0.0 0.0
f 0/1/1 1/1/1 1/1/1
";
    let result = MeshData::parse_obj(obj);
    assert!(matches!(result, Err(Error::InvalidAsset(_))));
}

#[test]
fn test_out_of_range_vertex_index_is_rejected() {
    let obj = "\
v 0.0 0.0 0.0
vt 0.0 0.0
f 1/1/1 2/1/1 1/1/1
";
    let result = MeshData::parse_obj(obj);
    let err = result.unwrap_err();
    assert!(matches!(err, Error::InvalidAsset(ref msg) if msg.contains("vertex 2")));
}

#[test]
fn test_out_of_range_uv_index_is_rejected() {
    let obj = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
f 1/1/1 2/2/1 3/1/1
";
    let result = MeshData::parse_obj(obj);
    assert!(matches!(result, Err(Error::InvalidAsset(_))));
}

#[test]
fn test_malformed_vertex_record_is_rejected() {
    let result = MeshData::parse_obj("v 1.0 banana 0.0\n");
    assert!(matches!(result, Err(Error::InvalidAsset(_))));
}

#[test]
fn test_missing_file_reports_invalid_asset() {
    let result = MeshData::load_obj("/nonexistent/mesh.obj");
    assert!(matches!(result, Err(Error::InvalidAsset(_))));
}
