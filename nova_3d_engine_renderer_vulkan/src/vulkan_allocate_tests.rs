//! Unit tests for memory type selection

use crate::vulkan_allocate::find_memory_type;
use ash::vk;

fn properties_with(types: &[vk::MemoryPropertyFlags]) -> vk::PhysicalDeviceMemoryProperties {
    let mut properties = vk::PhysicalDeviceMemoryProperties {
        memory_type_count: types.len() as u32,
        ..Default::default()
    };
    for (index, &flags) in types.iter().enumerate() {
        properties.memory_types[index] = vk::MemoryType {
            property_flags: flags,
            heap_index: 0,
        };
    }
    properties
}

#[test]
fn test_picks_lowest_matching_index() {
    let properties = properties_with(&[
        vk::MemoryPropertyFlags::DEVICE_LOCAL,
        vk::MemoryPropertyFlags::DEVICE_LOCAL,
    ]);
    // Both types qualify; the first one wins
    let found = find_memory_type(0b11, vk::MemoryPropertyFlags::DEVICE_LOCAL, &properties);
    assert_eq!(found, Some(0));
}

#[test]
fn test_respects_memory_type_bits() {
    let properties = properties_with(&[
        vk::MemoryPropertyFlags::DEVICE_LOCAL,
        vk::MemoryPropertyFlags::DEVICE_LOCAL,
    ]);
    // Type 0 matches the flags but its bit is cleared
    let found = find_memory_type(0b10, vk::MemoryPropertyFlags::DEVICE_LOCAL, &properties);
    assert_eq!(found, Some(1));
}

#[test]
fn test_requires_all_flags() {
    let properties = properties_with(&[
        vk::MemoryPropertyFlags::HOST_VISIBLE,
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
    ]);
    let found = find_memory_type(
        0b11,
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        &properties,
    );
    assert_eq!(found, Some(1));
}

#[test]
fn test_extra_flags_are_allowed() {
    // A type carrying more flags than required still qualifies
    let properties = properties_with(&[
        vk::MemoryPropertyFlags::DEVICE_LOCAL
            | vk::MemoryPropertyFlags::HOST_VISIBLE
            | vk::MemoryPropertyFlags::HOST_COHERENT,
    ]);
    let found = find_memory_type(0b1, vk::MemoryPropertyFlags::HOST_VISIBLE, &properties);
    assert_eq!(found, Some(0));
}

#[test]
fn test_none_when_nothing_fits() {
    let properties = properties_with(&[vk::MemoryPropertyFlags::DEVICE_LOCAL]);
    let found = find_memory_type(0b1, vk::MemoryPropertyFlags::HOST_VISIBLE, &properties);
    assert_eq!(found, None);

    // Zero type bits can never match
    let found = find_memory_type(0, vk::MemoryPropertyFlags::DEVICE_LOCAL, &properties);
    assert_eq!(found, None);
}
