/// ShapeBuilder - procedural box meshes for any vertex layout

use glam::{Vec2, Vec3, Vec4};
use crate::error::{Error, Result};
use crate::graphics_device::{
    MeshDesc, VertexLayout, VertexAttr, VertexFormat, IndexType, PrimitiveType, PrimitiveGroup,
};

/// One generated vertex before encoding
#[derive(Debug, Clone, Copy)]
struct ShapeVertex {
    position: Vec3,
    normal: Vec3,
    tex_coord: Vec2,
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    Box { width: f32, height: f32, depth: f32, tiles: u32 },
}

/// Box face: outward normal plus the two in-plane axes (u x v == normal)
struct Face {
    normal: Vec3,
    u: Vec3,
    v: Vec3,
}

const BOX_FACES: [Face; 6] = [
    Face { normal: Vec3::X, u: Vec3::NEG_Z, v: Vec3::Y },
    Face { normal: Vec3::NEG_X, u: Vec3::Z, v: Vec3::Y },
    Face { normal: Vec3::Y, u: Vec3::X, v: Vec3::NEG_Z },
    Face { normal: Vec3::NEG_Y, u: Vec3::X, v: Vec3::Z },
    Face { normal: Vec3::Z, u: Vec3::X, v: Vec3::Y },
    Face { normal: Vec3::NEG_Z, u: Vec3::NEG_X, v: Vec3::Y },
];

/// Builds indexed triangle meshes; every added shape becomes one primitive group.
///
/// ```
/// use mrt_engine::mrt::shapes::ShapeBuilder;
/// use mrt_engine::mrt::device::{VertexAttr, VertexFormat};
///
/// let mut builder = ShapeBuilder::new();
/// builder.layout
///     .add(VertexAttr::Position, VertexFormat::Float3)
///     .add(VertexAttr::Normal, VertexFormat::UByte4N);
/// builder.add_box(1.0, 1.0, 1.0, 1);
/// let mesh = builder.build().unwrap();
/// assert_eq!(mesh.num_vertices, 24);
/// ```
#[derive(Debug, Clone)]
pub struct ShapeBuilder {
    pub layout: VertexLayout,
    /// Value written to `Color0` components
    pub color: Vec4,
    shapes: Vec<Shape>,
}

impl Default for ShapeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeBuilder {
    pub fn new() -> Self {
        Self {
            layout: VertexLayout::new(),
            color: Vec4::ONE,
            shapes: Vec::new(),
        }
    }

    /// Axis-aligned box centered at the origin, each face split into `tiles` x `tiles` quads
    pub fn add_box(&mut self, width: f32, height: f32, depth: f32, tiles: u32) -> &mut Self {
        self.shapes.push(Shape::Box { width, height, depth, tiles: tiles.max(1) });
        self
    }

    /// Generate the mesh descriptor
    pub fn build(&self) -> Result<MeshDesc> {
        if self.layout.component_index(VertexAttr::Position).is_none() {
            return Err(Error::InvalidResource("shape layout has no Position component".to_string()));
        }
        if self.shapes.is_empty() {
            return Err(Error::InvalidResource("shape builder has no shapes".to_string()));
        }

        let mut vertices: Vec<ShapeVertex> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();
        let mut groups = Vec::with_capacity(self.shapes.len());

        for shape in &self.shapes {
            let base_element = indices.len() as u32;
            match *shape {
                Shape::Box { width, height, depth, tiles } => {
                    build_box(Vec3::new(width, height, depth), tiles, &mut vertices, &mut indices);
                }
            }
            groups.push(PrimitiveGroup {
                base_element,
                num_elements: indices.len() as u32 - base_element,
            });
        }

        let mut vertex_data = Vec::with_capacity(vertices.len() * self.layout.stride() as usize);
        for vertex in &vertices {
            for component in &self.layout.components {
                self.encode(vertex, component.attr, component.format, &mut vertex_data);
            }
        }

        let (index_type, index_data) = if vertices.len() <= u16::MAX as usize + 1 {
            let narrow: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
            (IndexType::UInt16, bytemuck::cast_slice(&narrow).to_vec())
        } else {
            (IndexType::UInt32, bytemuck::cast_slice(&indices).to_vec())
        };

        Ok(MeshDesc {
            name: "shape".to_string(),
            layout: self.layout.clone(),
            num_vertices: vertices.len() as u32,
            vertex_data,
            index_type,
            num_indices: indices.len() as u32,
            index_data,
            primitive_type: PrimitiveType::Triangles,
            primitive_groups: groups,
        })
    }

    fn encode(&self, vertex: &ShapeVertex, attr: VertexAttr, format: VertexFormat, out: &mut Vec<u8>) {
        let value = match attr {
            VertexAttr::Position => vertex.position.extend(1.0),
            VertexAttr::Normal => vertex.normal.extend(0.0),
            VertexAttr::TexCoord0 => vertex.tex_coord.extend(0.0).extend(0.0),
            VertexAttr::Color0 => self.color,
        };
        match format {
            VertexFormat::Float => out.extend_from_slice(bytemuck::bytes_of(&value.x)),
            VertexFormat::Float2 => out.extend_from_slice(bytemuck::cast_slice(&value.to_array()[..2])),
            VertexFormat::Float3 => out.extend_from_slice(bytemuck::cast_slice(&value.to_array()[..3])),
            VertexFormat::Float4 => out.extend_from_slice(bytemuck::cast_slice(&value.to_array())),
            VertexFormat::UByte4N => {
                // signed data (normals) is biased into 0..1 first
                let unit = if attr == VertexAttr::Normal { value * 0.5 + Vec4::splat(0.5) } else { value };
                for c in unit.to_array() {
                    out.push((c.clamp(0.0, 1.0) * 255.0).round() as u8);
                }
            }
            VertexFormat::Byte4N => {
                for c in value.to_array() {
                    out.push(((c.clamp(-1.0, 1.0) * 127.0).round() as i8) as u8);
                }
            }
        }
    }
}

fn build_box(size: Vec3, tiles: u32, vertices: &mut Vec<ShapeVertex>, indices: &mut Vec<u32>) {
    let half = size * 0.5;
    for face in &BOX_FACES {
        let first = vertices.len() as u32;
        let extent_u = (face.u * size).abs().max_element();
        let extent_v = (face.v * size).abs().max_element();
        let center = face.normal * half;

        for j in 0..=tiles {
            for i in 0..=tiles {
                let s = i as f32 / tiles as f32;
                let t = j as f32 / tiles as f32;
                vertices.push(ShapeVertex {
                    position: center + face.u * (s - 0.5) * extent_u + face.v * (t - 0.5) * extent_v,
                    normal: face.normal,
                    tex_coord: Vec2::new(s, 1.0 - t),
                });
            }
        }

        let row = tiles + 1;
        for j in 0..tiles {
            for i in 0..tiles {
                let a = first + j * row + i;
                let b = a + 1;
                let c = a + row + 1;
                let d = a + row;
                indices.extend_from_slice(&[a, b, c, a, c, d]);
            }
        }
    }
}

#[cfg(test)]
#[path = "shape_builder_tests.rs"]
mod tests;
