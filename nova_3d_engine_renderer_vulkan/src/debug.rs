//! Validation layer message routing

use ash::vk;
use nova_3d_engine::{engine_debug, engine_error, engine_warn};
use std::ffi::CStr;

/// Forward validation layer messages into the engine log
pub unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    let message = if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
        "<no message>".to_string()
    } else {
        CStr::from_ptr((*p_callback_data).p_message)
            .to_string_lossy()
            .into_owned()
    };

    if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        engine_error!("nova3d::vulkan", "[{:?}] {}", message_type, message);
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        engine_warn!("nova3d::vulkan", "[{:?}] {}", message_type, message);
    } else {
        engine_debug!("nova3d::vulkan", "[{:?}] {}", message_type, message);
    }

    vk::FALSE
}
