/// Host-mapped uniform memory layout
///
/// One HOST_VISIBLE | HOST_COHERENT buffer stays persistently mapped for the
/// renderer's whole lifetime. It holds a global region (camera matrices and
/// clear color, bound as a plain uniform buffer) followed by one 256-byte
/// slot per drawable instance (bound as a dynamic uniform buffer, addressed
/// with `instance_index * INSTANCE_SLOT_SIZE`).
///
/// Slots are 256-byte aligned because 256 is the largest value Vulkan
/// permits for minUniformBufferOffsetAlignment; every device accepts these
/// dynamic offsets without a runtime re-layout.

use ash::vk;
use nova_3d_engine::glam::Mat4;
use nova_3d_engine::nova3d::render::MAX_RENDER_INSTANCES;

/// Byte stride between per-instance uniform slots
pub const INSTANCE_SLOT_SIZE: vk::DeviceSize = 256;

/// Per-frame globals, bound at binding 0 of the world pipeline
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct GlobalUniforms {
    /// World-to-view transform
    pub view: Mat4,
    /// View-to-clip transform, Y already flipped for Vulkan
    pub projection: Mat4,
    /// Background color, alpha unused by shaders
    pub clear_color: [f32; 4],
}

/// One per-instance slot, bound at binding 1 with a dynamic offset
#[repr(C, align(256))]
#[derive(Debug, Clone, Copy)]
pub struct InstanceSlot {
    /// Model-to-world transform
    pub model: Mat4,
}

/// The complete mapped buffer contents
#[repr(C)]
pub struct HostMappedData {
    pub global: GlobalUniforms,
    pub instances: [InstanceSlot; MAX_RENDER_INSTANCES],
}

/// Byte offset of the global region within the mapped buffer
pub const GLOBAL_REGION_OFFSET: vk::DeviceSize = 0;

/// Byte size of the global region
pub const GLOBAL_REGION_SIZE: vk::DeviceSize = std::mem::size_of::<GlobalUniforms>() as vk::DeviceSize;

/// Byte offset of the first instance slot within the mapped buffer
pub const INSTANCE_REGION_OFFSET: vk::DeviceSize =
    std::mem::offset_of!(HostMappedData, instances) as vk::DeviceSize;

/// Total size of the mapped buffer
pub const HOST_MAPPED_DATA_SIZE: vk::DeviceSize =
    std::mem::size_of::<HostMappedData>() as vk::DeviceSize;

// The descriptor offsets baked into the pipeline depend on this exact layout.
const _: () = assert!(std::mem::offset_of!(HostMappedData, global) == 0);
const _: () = assert!(std::mem::size_of::<InstanceSlot>() == INSTANCE_SLOT_SIZE as usize);
const _: () = assert!(INSTANCE_REGION_OFFSET as usize % INSTANCE_SLOT_SIZE as usize == 0);
