/// Mesh packing and upload
///
/// All meshes share a single device-local buffer. Each mesh occupies one
/// contiguous span: its vertices first, then its indices. Draws bind the
/// shared buffer with the mesh's byte offsets.

use ash::vk;
use nova_3d_engine::nova3d::resource::{MeshData, MESH_VERTEX_STRIDE};
use nova_3d_engine::nova3d::{Error, Result};
use nova_3d_engine::{engine_bail, engine_err, engine_info};

use crate::vulkan_allocate::MemoryBuffer;
use crate::vulkan_transient_commands::{begin_transient_commands, end_transient_commands};

/// Where one uploaded mesh lives inside the shared mesh buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatedMesh {
    pub vertex_count: u32,
    pub index_count: u32,
    /// Byte offset of the vertex data in the shared buffer
    pub vertex_buffer_offset: vk::DeviceSize,
    /// Byte offset of the index data in the shared buffer
    pub index_buffer_offset: vk::DeviceSize,
}

/// Compute buffer offsets for a set of meshes and the total size needed
///
/// Offsets stay 4-byte aligned for the u32 index reads because the vertex
/// stride and the index size are both multiples of 4.
pub fn pack_meshes(meshes: &[MeshData]) -> Result<(Vec<AllocatedMesh>, vk::DeviceSize)> {
    let mut layout = Vec::with_capacity(meshes.len());
    let mut total_size: vk::DeviceSize = 0;

    for (mesh_index, mesh) in meshes.iter().enumerate() {
        if mesh.vertices.is_empty() || mesh.indices.is_empty() {
            return Err(Error::InvalidAsset(format!(
                "Mesh {} has no geometry ({} vertices, {} indices)",
                mesh_index,
                mesh.vertices.len(),
                mesh.indices.len()
            )));
        }

        let vertex_bytes = MESH_VERTEX_STRIDE as vk::DeviceSize * mesh.vertices.len() as vk::DeviceSize;
        let index_bytes = std::mem::size_of::<u32>() as vk::DeviceSize * mesh.indices.len() as vk::DeviceSize;

        layout.push(AllocatedMesh {
            vertex_count: mesh.vertices.len() as u32,
            index_count: mesh.indices.len() as u32,
            vertex_buffer_offset: total_size,
            index_buffer_offset: total_size + vertex_bytes,
        });
        total_size += vertex_bytes + index_bytes;
    }

    Ok((layout, total_size))
}

/// Upload meshes into a new device-local buffer via a staging copy
///
/// Returns the shared buffer and the per-mesh offsets into it. Blocks until
/// the transfer completes.
pub fn upload_meshes(
    device: &ash::Device,
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    command_pool: vk::CommandPool,
    queue: vk::Queue,
    meshes: &[MeshData],
) -> Result<(MemoryBuffer, Vec<AllocatedMesh>)> {
    if meshes.is_empty() {
        engine_bail!("nova3d::vulkan", "Mesh upload requires at least one mesh");
    }

    let (layout, total_size) = pack_meshes(meshes)?;

    let staging = MemoryBuffer::allocate(
        device,
        memory_properties,
        total_size,
        vk::BufferUsageFlags::TRANSFER_SRC,
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
    )?;

    unsafe {
        let mapped = device
            .map_memory(staging.memory, 0, total_size, vk::MemoryMapFlags::empty())
            .map_err(|e| {
                staging.destroy(device);
                engine_err!("nova3d::vulkan", "Failed to map mesh staging memory: {:?}", e)
            })? as *mut u8;

        for (mesh, placement) in meshes.iter().zip(&layout) {
            let vertex_bytes: &[u8] = bytemuck::cast_slice(&mesh.vertices);
            let index_bytes: &[u8] = bytemuck::cast_slice(&mesh.indices);
            std::ptr::copy_nonoverlapping(
                vertex_bytes.as_ptr(),
                mapped.add(placement.vertex_buffer_offset as usize),
                vertex_bytes.len(),
            );
            std::ptr::copy_nonoverlapping(
                index_bytes.as_ptr(),
                mapped.add(placement.index_buffer_offset as usize),
                index_bytes.len(),
            );
        }

        device.unmap_memory(staging.memory);
    }

    let mesh_buffer = match MemoryBuffer::allocate(
        device,
        memory_properties,
        total_size,
        vk::BufferUsageFlags::TRANSFER_DST
            | vk::BufferUsageFlags::VERTEX_BUFFER
            | vk::BufferUsageFlags::INDEX_BUFFER,
        vk::MemoryPropertyFlags::DEVICE_LOCAL,
    ) {
        Ok(buffer) => buffer,
        Err(e) => {
            unsafe { staging.destroy(device) };
            return Err(e);
        }
    };

    let copy_result = (|| -> Result<()> {
        let command_buffer = begin_transient_commands(device, command_pool)?;
        unsafe {
            let region = vk::BufferCopy::default().size(total_size);
            device.cmd_copy_buffer(command_buffer, staging.buffer, mesh_buffer.buffer, &[region]);
        }
        end_transient_commands(device, command_pool, command_buffer, queue)
    })();

    unsafe { staging.destroy(device) };

    if let Err(e) = copy_result {
        unsafe { mesh_buffer.destroy(device) };
        return Err(e);
    }

    engine_info!(
        "nova3d::vulkan",
        "Uploaded {} meshes, {} bytes total",
        meshes.len(),
        total_size
    );
    Ok((mesh_buffer, layout))
}
