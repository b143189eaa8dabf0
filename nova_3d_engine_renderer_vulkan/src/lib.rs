/*!
# Nova 3D Engine - Vulkan Renderer Backend

Vulkan implementation of the Nova 3D rendering engine.

This crate provides a Vulkan backend that implements the nova_3d_engine
`Renderer` trait using the Ash library for Vulkan bindings. It uses dynamic
rendering (no render passes), a single reusable command buffer, and one
persistently mapped uniform buffer shared by all draws.
*/

// Vulkan implementation modules
mod debug;
mod vulkan;
mod vulkan_allocate;
mod vulkan_device;
mod vulkan_host_data;
mod vulkan_image;
mod vulkan_mesh;
mod vulkan_pipeline;
mod vulkan_swapchain;
mod vulkan_transient_commands;

#[cfg(test)]
mod vulkan_allocate_tests;
#[cfg(test)]
mod vulkan_host_data_tests;
#[cfg(test)]
mod vulkan_pipeline_tests;
#[cfg(test)]
mod vulkan_swapchain_tests;
#[cfg(test)]
mod vulkan_tests;

pub use vulkan::{RendererAssets, VulkanRenderer};
pub use vulkan_host_data::{GlobalUniforms, INSTANCE_SLOT_SIZE};
