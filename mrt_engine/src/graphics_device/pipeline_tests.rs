use super::*;
use crate::graphics_device::{VertexAttr, VertexFormat};

fn layout() -> VertexLayout {
    let mut layout = VertexLayout::new();
    layout.add(VertexAttr::Position, VertexFormat::Float3);
    layout
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_from_layout_and_shader_defaults() {
    let desc = PipelineDesc::from_layout_and_shader(layout(), ShaderId::default());
    assert_eq!(desc.primitive_type, PrimitiveType::Triangles);
    assert!(!desc.depth_stencil.depth_write_enabled);
    assert_eq!(desc.depth_stencil.depth_cmp_func, CompareFunc::Always);
    assert!(!desc.rasterizer.cull_face_enabled);
    assert_eq!(desc.rasterizer.sample_count, 1);
    assert_eq!(desc.blend.color_attachment_count, 1);
    assert!(desc.validate().is_ok());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_validate_rejects_zero_color_attachments() {
    let mut desc = PipelineDesc::from_layout_and_shader(layout(), ShaderId::default());
    desc.blend.color_attachment_count = 0;
    assert!(desc.validate().is_err());
}

#[test]
fn test_validate_rejects_depth_write_without_depth() {
    let mut desc = PipelineDesc::from_layout_and_shader(layout(), ShaderId::default());
    desc.depth_stencil.depth_write_enabled = true;
    desc.blend.depth_format = None;
    assert!(matches!(desc.validate(), Err(Error::InvalidResource(_))));
}

#[test]
fn test_validate_rejects_empty_layout() {
    let desc = PipelineDesc::from_layout_and_shader(VertexLayout::new(), ShaderId::default());
    assert!(desc.validate().is_err());
}

#[test]
fn test_validate_rejects_odd_sample_count() {
    let mut desc = PipelineDesc::from_layout_and_shader(layout(), ShaderId::default());
    desc.rasterizer.sample_count = 6;
    assert!(desc.validate().is_err());
}
