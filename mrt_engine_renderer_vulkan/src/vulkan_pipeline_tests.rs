//! Unit tests for pipeline vertex input (no GPU required)

use super::*;
use mrt_engine::mrt::device::{MeshDesc, VertexAttr, VertexFormat};

// ============================================================================
// VERTEX INPUT
// ============================================================================

#[test]
fn test_cube_layout_vertex_input() {
    let mut layout = VertexLayout::new();
    layout
        .add(VertexAttr::Position, VertexFormat::Float3)
        .add(VertexAttr::Normal, VertexFormat::UByte4N);

    let (binding, attributes) = vertex_input(&layout);

    assert_eq!(binding.stride, 16);
    assert_eq!(binding.input_rate, vk::VertexInputRate::VERTEX);
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes[0].location, 0);
    assert_eq!(attributes[0].offset, 0);
    assert_eq!(attributes[0].format, vk::Format::R32G32B32_SFLOAT);
    assert_eq!(attributes[1].location, 1);
    assert_eq!(attributes[1].offset, 12);
    assert_eq!(attributes[1].format, vk::Format::R8G8B8A8_UNORM);
}

#[test]
fn test_quad_layout_vertex_input() {
    let quad = MeshDesc::full_screen_quad(true);
    let (binding, attributes) = vertex_input(&quad.layout);

    assert_eq!(binding.stride, 16);
    assert_eq!(attributes[0].format, vk::Format::R32G32_SFLOAT);
    // texcoords are read at location 2 whatever the layout order
    assert_eq!(attributes[1].location, 2);
    assert_eq!(attributes[1].offset, 8);
}
