/// Conversions between engine descriptor enums and Vulkan enums
///
/// Pure functions, tested without a GPU.

use ash::vk;
use mrt_engine::mrt::device::{
    TextureFormat, VertexFormat, VertexAttr, IndexType, PrimitiveType,
    CompareFunc, Face, StoreAction, ShaderStage,
};

pub fn texture_format_to_vk(format: TextureFormat) -> vk::Format {
    match format {
        TextureFormat::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        TextureFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        TextureFormat::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        TextureFormat::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        TextureFormat::D16_UNORM => vk::Format::D16_UNORM,
        TextureFormat::D32_FLOAT => vk::Format::D32_SFLOAT,
        TextureFormat::D24_UNORM_S8_UINT => vk::Format::D24_UNORM_S8_UINT,
        TextureFormat::D32_FLOAT_S8_UINT => vk::Format::D32_SFLOAT_S8_UINT,
    }
}

/// Inverse of [`texture_format_to_vk`]; `None` for formats the engine does not name
pub fn vk_to_texture_format(format: vk::Format) -> Option<TextureFormat> {
    match format {
        vk::Format::R8G8B8A8_SRGB => Some(TextureFormat::R8G8B8A8_SRGB),
        vk::Format::R8G8B8A8_UNORM => Some(TextureFormat::R8G8B8A8_UNORM),
        vk::Format::B8G8R8A8_SRGB => Some(TextureFormat::B8G8R8A8_SRGB),
        vk::Format::B8G8R8A8_UNORM => Some(TextureFormat::B8G8R8A8_UNORM),
        vk::Format::D16_UNORM => Some(TextureFormat::D16_UNORM),
        vk::Format::D32_SFLOAT => Some(TextureFormat::D32_FLOAT),
        vk::Format::D24_UNORM_S8_UINT => Some(TextureFormat::D24_UNORM_S8_UINT),
        vk::Format::D32_SFLOAT_S8_UINT => Some(TextureFormat::D32_FLOAT_S8_UINT),
        _ => None,
    }
}

pub fn depth_aspect(format: TextureFormat) -> vk::ImageAspectFlags {
    if format.has_stencil() {
        vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
    } else {
        vk::ImageAspectFlags::DEPTH
    }
}

pub fn vertex_format_to_vk(format: VertexFormat) -> vk::Format {
    match format {
        VertexFormat::Float => vk::Format::R32_SFLOAT,
        VertexFormat::Float2 => vk::Format::R32G32_SFLOAT,
        VertexFormat::Float3 => vk::Format::R32G32B32_SFLOAT,
        VertexFormat::Float4 => vk::Format::R32G32B32A32_SFLOAT,
        VertexFormat::UByte4N => vk::Format::R8G8B8A8_UNORM,
        VertexFormat::Byte4N => vk::Format::R8G8B8A8_SNORM,
    }
}

/// Shader input location of each vertex attribute
pub fn vertex_attr_location(attr: VertexAttr) -> u32 {
    match attr {
        VertexAttr::Position => 0,
        VertexAttr::Normal => 1,
        VertexAttr::TexCoord0 => 2,
        VertexAttr::Color0 => 3,
    }
}

/// `None` for non-indexed meshes
pub fn index_type_to_vk(index_type: IndexType) -> Option<vk::IndexType> {
    match index_type {
        IndexType::None => None,
        IndexType::UInt16 => Some(vk::IndexType::UINT16),
        IndexType::UInt32 => Some(vk::IndexType::UINT32),
    }
}

pub fn primitive_type_to_vk(primitive: PrimitiveType) -> vk::PrimitiveTopology {
    match primitive {
        PrimitiveType::Triangles => vk::PrimitiveTopology::TRIANGLE_LIST,
        PrimitiveType::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
    }
}

pub fn compare_func_to_vk(func: CompareFunc) -> vk::CompareOp {
    match func {
        CompareFunc::Never => vk::CompareOp::NEVER,
        CompareFunc::Less => vk::CompareOp::LESS,
        CompareFunc::Equal => vk::CompareOp::EQUAL,
        CompareFunc::LessEqual => vk::CompareOp::LESS_OR_EQUAL,
        CompareFunc::Greater => vk::CompareOp::GREATER,
        CompareFunc::NotEqual => vk::CompareOp::NOT_EQUAL,
        CompareFunc::GreaterEqual => vk::CompareOp::GREATER_OR_EQUAL,
        CompareFunc::Always => vk::CompareOp::ALWAYS,
    }
}

pub fn cull_mode_to_vk(enabled: bool, face: Face) -> vk::CullModeFlags {
    match (enabled, face) {
        (false, _) => vk::CullModeFlags::NONE,
        (true, Face::Front) => vk::CullModeFlags::FRONT,
        (true, Face::Back) => vk::CullModeFlags::BACK,
    }
}

/// `None` for counts Vulkan cannot express
pub fn sample_count_to_vk(count: u32) -> Option<vk::SampleCountFlags> {
    match count {
        1 => Some(vk::SampleCountFlags::TYPE_1),
        2 => Some(vk::SampleCountFlags::TYPE_2),
        4 => Some(vk::SampleCountFlags::TYPE_4),
        8 => Some(vk::SampleCountFlags::TYPE_8),
        16 => Some(vk::SampleCountFlags::TYPE_16),
        32 => Some(vk::SampleCountFlags::TYPE_32),
        64 => Some(vk::SampleCountFlags::TYPE_64),
        _ => None,
    }
}

/// Largest single count contained in `flags`
pub fn max_sample_count(flags: vk::SampleCountFlags) -> u32 {
    [64, 32, 16, 8, 4, 2]
        .into_iter()
        .find(|&n| sample_count_to_vk(n).is_some_and(|f| flags.contains(f)))
        .unwrap_or(1)
}

/// Store op of the multisampled (or only) color attachment
pub fn color_store_op(action: StoreAction, samples: u32) -> vk::AttachmentStoreOp {
    match action {
        StoreAction::Store => vk::AttachmentStoreOp::STORE,
        StoreAction::DontCare => vk::AttachmentStoreOp::DONT_CARE,
        // a resolved pass keeps the single-sample copy only
        StoreAction::Resolve if samples > 1 => vk::AttachmentStoreOp::DONT_CARE,
        StoreAction::Resolve => vk::AttachmentStoreOp::STORE,
    }
}

pub fn shader_stage_to_vk(stage: ShaderStage) -> vk::ShaderStageFlags {
    match stage {
        ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
        ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
    }
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
