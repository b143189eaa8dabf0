//! Unit tests for render_list.rs

use crate::error::Error;
use crate::renderer::{MeshHandle, RenderInstance, RenderList, MAX_RENDER_INSTANCES};
use glam::{Mat4, Quat, Vec3};

fn test_instance(mesh_index: usize) -> RenderInstance {
    RenderInstance {
        position: Vec3::new(1.0, 2.0, 3.0),
        orientation: Quat::IDENTITY,
        mesh: MeshHandle::new(mesh_index),
    }
}

// ============================================================================
// RENDER LIST TESTS
// ============================================================================

#[test]
fn test_new_list_is_empty() {
    let list = RenderList::new();
    assert!(list.is_empty());
    assert_eq!(list.len(), 0);
    assert_eq!(list.instances().len(), 0);
}

#[test]
fn test_push_and_read_back() {
    let mut list = RenderList::new();
    list.push(test_instance(0)).unwrap();
    list.push(test_instance(1)).unwrap();

    assert_eq!(list.len(), 2);
    assert_eq!(list.instances()[0].mesh, MeshHandle::new(0));
    assert_eq!(list.instances()[1].mesh, MeshHandle::new(1));
}

#[test]
fn test_push_rejects_overflow() {
    let mut list = RenderList::new();
    for i in 0..MAX_RENDER_INSTANCES {
        list.push(test_instance(i)).unwrap();
    }
    assert_eq!(list.len(), MAX_RENDER_INSTANCES);

    let result = list.push(test_instance(0));
    assert!(matches!(result, Err(Error::BackendError(_))));
    // The failed push must not grow the list
    assert_eq!(list.len(), MAX_RENDER_INSTANCES);
}

#[test]
fn test_clear_keeps_camera_and_color() {
    let mut list = RenderList::new();
    list.clear_color = Vec3::new(0.1, 0.2, 0.3);
    list.camera_position = Vec3::new(0.0, 1.0, 5.0);
    list.camera_target = Vec3::new(0.0, 0.0, -2.0);
    list.push(test_instance(0)).unwrap();

    list.clear();

    assert!(list.is_empty());
    assert_eq!(list.clear_color, Vec3::new(0.1, 0.2, 0.3));
    assert_eq!(list.camera_position, Vec3::new(0.0, 1.0, 5.0));
    assert_eq!(list.camera_target, Vec3::new(0.0, 0.0, -2.0));
}

#[test]
fn test_clear_allows_refilling_to_capacity() {
    let mut list = RenderList::new();
    for i in 0..MAX_RENDER_INSTANCES {
        list.push(test_instance(i)).unwrap();
    }
    list.clear();
    for i in 0..MAX_RENDER_INSTANCES {
        list.push(test_instance(i)).unwrap();
    }
    assert_eq!(list.len(), MAX_RENDER_INSTANCES);
}

// ============================================================================
// INSTANCE MODEL MATRIX TESTS
// ============================================================================

#[test]
fn test_model_matrix_identity_orientation() {
    let instance = RenderInstance {
        position: Vec3::new(4.0, -2.0, 1.0),
        orientation: Quat::IDENTITY,
        mesh: MeshHandle::new(0),
    };

    let model = instance.model_matrix();
    assert_eq!(model, Mat4::from_translation(Vec3::new(4.0, -2.0, 1.0)));
}

#[test]
fn test_model_matrix_rotates_before_translating() {
    // 180 degrees around Y maps +X to -X, then the translation applies
    let instance = RenderInstance {
        position: Vec3::new(10.0, 0.0, 0.0),
        orientation: Quat::from_rotation_y(std::f32::consts::PI),
        mesh: MeshHandle::new(0),
    };

    let model = instance.model_matrix();
    let p = model.transform_point3(Vec3::new(1.0, 0.0, 0.0));
    assert!((p - Vec3::new(9.0, 0.0, 0.0)).length() < 1e-5);
}

// ============================================================================
// MESH HANDLE TESTS
// ============================================================================

#[test]
fn test_mesh_handle_index_round_trip() {
    let handle = MeshHandle::new(7);
    assert_eq!(handle.index(), 7);
}

#[test]
fn test_mesh_handle_equality() {
    assert_eq!(MeshHandle::new(3), MeshHandle::new(3));
    assert_ne!(MeshHandle::new(3), MeshHandle::new(4));
}
