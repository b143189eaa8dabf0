//! Unit tests for the host-mapped uniform layout

use crate::vulkan_host_data::{
    GlobalUniforms, HostMappedData, InstanceSlot, GLOBAL_REGION_SIZE, HOST_MAPPED_DATA_SIZE,
    INSTANCE_REGION_OFFSET, INSTANCE_SLOT_SIZE,
};
use nova_3d_engine::nova3d::render::MAX_RENDER_INSTANCES;
use std::mem::{align_of, offset_of, size_of};

#[test]
fn test_global_region_layout() {
    // Two mat4s then a vec4 clear color
    assert_eq!(offset_of!(GlobalUniforms, view), 0);
    assert_eq!(offset_of!(GlobalUniforms, projection), 64);
    assert_eq!(offset_of!(GlobalUniforms, clear_color), 128);
    assert_eq!(GLOBAL_REGION_SIZE, 144);
}

#[test]
fn test_instance_slot_is_one_alignment_unit() {
    assert_eq!(size_of::<InstanceSlot>(), 256);
    assert_eq!(align_of::<InstanceSlot>(), 256);
    assert_eq!(offset_of!(InstanceSlot, model), 0);
}

#[test]
fn test_instance_region_starts_on_slot_boundary() {
    assert_eq!(INSTANCE_REGION_OFFSET % INSTANCE_SLOT_SIZE, 0);
    // The global region fits in the gap before the first slot
    assert!(INSTANCE_REGION_OFFSET >= GLOBAL_REGION_SIZE);
}

#[test]
fn test_total_size_covers_all_instances() {
    let expected =
        INSTANCE_REGION_OFFSET + INSTANCE_SLOT_SIZE * MAX_RENDER_INSTANCES as u64;
    assert_eq!(HOST_MAPPED_DATA_SIZE, expected);
}

#[test]
fn test_dynamic_offsets_are_slot_aligned() {
    for instance in 0..MAX_RENDER_INSTANCES as u64 {
        let offset = instance * INSTANCE_SLOT_SIZE;
        assert_eq!(offset % 256, 0);
        assert!(INSTANCE_REGION_OFFSET + offset < HOST_MAPPED_DATA_SIZE);
    }
}

#[test]
fn test_instances_array_matches_render_list_capacity() {
    let data_size = size_of::<HostMappedData>();
    let slots_size = size_of::<InstanceSlot>() * MAX_RENDER_INSTANCES;
    assert_eq!(data_size, INSTANCE_REGION_OFFSET as usize + slots_size);
}
