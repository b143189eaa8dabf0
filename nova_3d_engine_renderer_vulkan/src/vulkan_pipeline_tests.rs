//! Unit tests for descriptor binding config translation

use crate::vulkan_pipeline::{layout_bindings, pool_sizes, DescriptorBindingConfig};
use ash::vk;

fn world_bindings() -> [DescriptorBindingConfig; 3] {
    [
        DescriptorBindingConfig::UniformBuffer {
            stages: vk::ShaderStageFlags::VERTEX,
            offset: 0,
            range: 144,
        },
        DescriptorBindingConfig::DynamicUniformBuffer {
            stages: vk::ShaderStageFlags::VERTEX,
            offset: 256,
            range: 256,
        },
        DescriptorBindingConfig::CombinedImageSampler {
            stages: vk::ShaderStageFlags::FRAGMENT,
            sampler: vk::Sampler::null(),
            view: vk::ImageView::null(),
        },
    ]
}

#[test]
fn test_binding_index_is_list_position() {
    let bindings = layout_bindings(&world_bindings());

    assert_eq!(bindings.len(), 3);
    for (index, binding) in bindings.iter().enumerate() {
        assert_eq!(binding.binding, index as u32);
        assert_eq!(binding.descriptor_count, 1);
    }
}

#[test]
fn test_descriptor_types_follow_config_variant() {
    let bindings = layout_bindings(&world_bindings());

    assert_eq!(bindings[0].descriptor_type, vk::DescriptorType::UNIFORM_BUFFER);
    assert_eq!(
        bindings[1].descriptor_type,
        vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC
    );
    assert_eq!(
        bindings[2].descriptor_type,
        vk::DescriptorType::COMBINED_IMAGE_SAMPLER
    );
}

#[test]
fn test_stage_flags_carried_through() {
    let bindings = layout_bindings(&world_bindings());

    assert_eq!(bindings[0].stage_flags, vk::ShaderStageFlags::VERTEX);
    assert_eq!(bindings[1].stage_flags, vk::ShaderStageFlags::VERTEX);
    assert_eq!(bindings[2].stage_flags, vk::ShaderStageFlags::FRAGMENT);
}

#[test]
fn test_pool_holds_exactly_one_descriptor_per_binding() {
    let sizes = pool_sizes(&world_bindings());

    assert_eq!(sizes.len(), 3);
    assert!(sizes.iter().all(|size| size.descriptor_count == 1));
    assert_eq!(sizes[0].ty, vk::DescriptorType::UNIFORM_BUFFER);
    assert_eq!(sizes[1].ty, vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC);
    assert_eq!(sizes[2].ty, vk::DescriptorType::COMBINED_IMAGE_SAMPLER);
}

#[test]
fn test_empty_config_list() {
    assert!(layout_bindings(&[]).is_empty());
    assert!(pool_sizes(&[]).is_empty());
}
