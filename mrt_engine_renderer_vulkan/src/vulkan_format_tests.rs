//! Unit tests for Vulkan format conversion functions
//!
//! Pure conversions only, no GPU required.

use super::*;

// ============================================================================
// TEXTURE FORMAT CONVERSION TESTS
// ============================================================================

#[test]
fn test_color_formats_to_vk() {
    assert_eq!(texture_format_to_vk(TextureFormat::R8G8B8A8_UNORM), vk::Format::R8G8B8A8_UNORM);
    assert_eq!(texture_format_to_vk(TextureFormat::R8G8B8A8_SRGB), vk::Format::R8G8B8A8_SRGB);
    assert_eq!(texture_format_to_vk(TextureFormat::B8G8R8A8_SRGB), vk::Format::B8G8R8A8_SRGB);
    assert_eq!(texture_format_to_vk(TextureFormat::B8G8R8A8_UNORM), vk::Format::B8G8R8A8_UNORM);
}

#[test]
fn test_depth_formats_to_vk() {
    assert_eq!(texture_format_to_vk(TextureFormat::D16_UNORM), vk::Format::D16_UNORM);
    assert_eq!(texture_format_to_vk(TextureFormat::D32_FLOAT), vk::Format::D32_SFLOAT);
    assert_eq!(texture_format_to_vk(TextureFormat::D24_UNORM_S8_UINT), vk::Format::D24_UNORM_S8_UINT);
    assert_eq!(texture_format_to_vk(TextureFormat::D32_FLOAT_S8_UINT), vk::Format::D32_SFLOAT_S8_UINT);
}

#[test]
fn test_surface_formats_map_back() {
    for format in [
        TextureFormat::R8G8B8A8_SRGB,
        TextureFormat::B8G8R8A8_SRGB,
        TextureFormat::B8G8R8A8_UNORM,
        TextureFormat::D24_UNORM_S8_UINT,
    ] {
        assert_eq!(vk_to_texture_format(texture_format_to_vk(format)), Some(format));
    }
}

#[test]
fn test_unknown_surface_format_has_no_engine_format() {
    assert_eq!(vk_to_texture_format(vk::Format::A2B10G10R10_UNORM_PACK32), None);
}

#[test]
fn test_depth_aspect_includes_stencil() {
    assert_eq!(
        depth_aspect(TextureFormat::D24_UNORM_S8_UINT),
        vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
    );
    assert_eq!(depth_aspect(TextureFormat::D32_FLOAT), vk::ImageAspectFlags::DEPTH);
}

// ============================================================================
// VERTEX INPUT TESTS
// ============================================================================

#[test]
fn test_vertex_formats_to_vk() {
    assert_eq!(vertex_format_to_vk(VertexFormat::Float2), vk::Format::R32G32_SFLOAT);
    assert_eq!(vertex_format_to_vk(VertexFormat::Float3), vk::Format::R32G32B32_SFLOAT);
    // packed normals are normalized bytes
    assert_eq!(vertex_format_to_vk(VertexFormat::UByte4N), vk::Format::R8G8B8A8_UNORM);
    assert_eq!(vertex_format_to_vk(VertexFormat::Byte4N), vk::Format::R8G8B8A8_SNORM);
}

#[test]
fn test_vertex_attr_locations_are_distinct() {
    let locations = [
        vertex_attr_location(VertexAttr::Position),
        vertex_attr_location(VertexAttr::Normal),
        vertex_attr_location(VertexAttr::TexCoord0),
        vertex_attr_location(VertexAttr::Color0),
    ];
    assert_eq!(locations, [0, 1, 2, 3]);
}

#[test]
fn test_index_types() {
    assert_eq!(index_type_to_vk(IndexType::None), None);
    assert_eq!(index_type_to_vk(IndexType::UInt16), Some(vk::IndexType::UINT16));
    assert_eq!(index_type_to_vk(IndexType::UInt32), Some(vk::IndexType::UINT32));
}

#[test]
fn test_primitive_types() {
    assert_eq!(primitive_type_to_vk(PrimitiveType::Triangles), vk::PrimitiveTopology::TRIANGLE_LIST);
    assert_eq!(primitive_type_to_vk(PrimitiveType::TriangleStrip), vk::PrimitiveTopology::TRIANGLE_STRIP);
}

// ============================================================================
// PIPELINE STATE TESTS
// ============================================================================

#[test]
fn test_compare_funcs() {
    assert_eq!(compare_func_to_vk(CompareFunc::LessEqual), vk::CompareOp::LESS_OR_EQUAL);
    assert_eq!(compare_func_to_vk(CompareFunc::Always), vk::CompareOp::ALWAYS);
    assert_eq!(compare_func_to_vk(CompareFunc::GreaterEqual), vk::CompareOp::GREATER_OR_EQUAL);
}

#[test]
fn test_cull_modes() {
    assert_eq!(cull_mode_to_vk(false, Face::Back), vk::CullModeFlags::NONE);
    assert_eq!(cull_mode_to_vk(true, Face::Back), vk::CullModeFlags::BACK);
    assert_eq!(cull_mode_to_vk(true, Face::Front), vk::CullModeFlags::FRONT);
}

#[test]
fn test_sample_counts() {
    assert_eq!(sample_count_to_vk(1), Some(vk::SampleCountFlags::TYPE_1));
    assert_eq!(sample_count_to_vk(4), Some(vk::SampleCountFlags::TYPE_4));
    assert_eq!(sample_count_to_vk(3), None);
    assert_eq!(sample_count_to_vk(0), None);
}

#[test]
fn test_max_sample_count() {
    let flags = vk::SampleCountFlags::TYPE_1 | vk::SampleCountFlags::TYPE_2 | vk::SampleCountFlags::TYPE_4;
    assert_eq!(max_sample_count(flags), 4);
    assert_eq!(max_sample_count(vk::SampleCountFlags::TYPE_1), 1);
    assert_eq!(max_sample_count(vk::SampleCountFlags::empty()), 1);
}

#[test]
fn test_store_ops() {
    assert_eq!(color_store_op(StoreAction::Store, 4), vk::AttachmentStoreOp::STORE);
    assert_eq!(color_store_op(StoreAction::DontCare, 1), vk::AttachmentStoreOp::DONT_CARE);
    assert_eq!(color_store_op(StoreAction::Resolve, 4), vk::AttachmentStoreOp::DONT_CARE);
    assert_eq!(color_store_op(StoreAction::Resolve, 1), vk::AttachmentStoreOp::STORE);
}

#[test]
fn test_shader_stages() {
    assert_eq!(shader_stage_to_vk(ShaderStage::Vertex), vk::ShaderStageFlags::VERTEX);
    assert_eq!(shader_stage_to_vk(ShaderStage::Fragment), vk::ShaderStageFlags::FRAGMENT);
}
