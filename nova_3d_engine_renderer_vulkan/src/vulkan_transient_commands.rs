/// One-shot command buffer helpers for init-time transfers
///
/// Transfers share the renderer's command pool and graphics queue. The
/// submit is fully synchronous: `end_transient_commands` waits for the queue
/// to drain before freeing the buffer, so callers may destroy staging
/// resources immediately after it returns.

use ash::vk;
use nova_3d_engine::engine_err;
use nova_3d_engine::nova3d::Result;

/// Allocate and begin a one-time-submit primary command buffer
pub fn begin_transient_commands(
    device: &ash::Device,
    command_pool: vk::CommandPool,
) -> Result<vk::CommandBuffer> {
    unsafe {
        let allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);

        let command_buffer = device
            .allocate_command_buffers(&allocate_info)
            .map_err(|e| {
                engine_err!(
                    "nova3d::vulkan",
                    "Failed to allocate transient command buffer: {:?}",
                    e
                )
            })?[0];

        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        device
            .begin_command_buffer(command_buffer, &begin_info)
            .map_err(|e| {
                engine_err!(
                    "nova3d::vulkan",
                    "Failed to begin transient command buffer: {:?}",
                    e
                )
            })?;

        Ok(command_buffer)
    }
}

/// End, submit, wait for completion and free a transient command buffer
pub fn end_transient_commands(
    device: &ash::Device,
    command_pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,
    queue: vk::Queue,
) -> Result<()> {
    unsafe {
        device.end_command_buffer(command_buffer).map_err(|e| {
            engine_err!(
                "nova3d::vulkan",
                "Failed to end transient command buffer: {:?}",
                e
            )
        })?;

        let command_buffers = [command_buffer];
        let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);

        device
            .queue_submit(queue, &[submit_info], vk::Fence::null())
            .map_err(|e| {
                engine_err!(
                    "nova3d::vulkan",
                    "Failed to submit transient commands: {:?}",
                    e
                )
            })?;

        device.queue_wait_idle(queue).map_err(|e| {
            engine_err!(
                "nova3d::vulkan",
                "Failed to wait for transient commands: {:?}",
                e
            )
        })?;

        device.free_command_buffers(command_pool, &[command_buffer]);
        Ok(())
    }
}
