/// Mesh descriptor: vertex layout, vertex/index data and primitive groups

use crate::error::{Error, Result};

/// Vertex component data format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Float,
    Float2,
    Float3,
    Float4,
    /// 4 unsigned bytes normalized to 0.0..1.0
    UByte4N,
    /// 4 signed bytes normalized to -1.0..1.0
    Byte4N,
}

impl VertexFormat {
    /// Size in bytes of one component
    pub fn size_bytes(&self) -> u32 {
        match self {
            VertexFormat::Float => 4,
            VertexFormat::Float2 => 8,
            VertexFormat::Float3 => 12,
            VertexFormat::Float4 => 16,
            VertexFormat::UByte4N | VertexFormat::Byte4N => 4,
        }
    }
}

/// Semantic of a vertex component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttr {
    Position,
    Normal,
    TexCoord0,
    Color0,
}

/// One interleaved vertex component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexComponent {
    pub attr: VertexAttr,
    pub format: VertexFormat,
}

/// Interleaved vertex layout. Component `i` is bound to shader location `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    pub components: Vec<VertexComponent>,
}

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a component (builder style)
    pub fn add(&mut self, attr: VertexAttr, format: VertexFormat) -> &mut Self {
        self.components.push(VertexComponent { attr, format });
        self
    }

    /// Byte distance between two consecutive vertices
    pub fn stride(&self) -> u32 {
        self.components.iter().map(|c| c.format.size_bytes()).sum()
    }

    /// Byte offset of component `index` inside a vertex
    pub fn offset_of(&self, index: usize) -> u32 {
        self.components[..index].iter().map(|c| c.format.size_bytes()).sum()
    }

    /// Index of the component carrying `attr`, if present
    pub fn component_index(&self, attr: VertexAttr) -> Option<usize> {
        self.components.iter().position(|c| c.attr == attr)
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Index element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// Non-indexed mesh
    None,
    UInt16,
    UInt32,
}

impl IndexType {
    pub fn size_bytes(&self) -> u32 {
        match self {
            IndexType::None => 0,
            IndexType::UInt16 => 2,
            IndexType::UInt32 => 4,
        }
    }
}

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Triangles,
    TriangleStrip,
}

/// A range of elements (indices, or vertices for non-indexed meshes) drawn by one draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveGroup {
    pub base_element: u32,
    pub num_elements: u32,
}

/// Descriptor for creating a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshDesc {
    pub name: String,
    pub layout: VertexLayout,
    pub num_vertices: u32,
    /// Interleaved vertex bytes, `num_vertices * layout.stride()` long
    pub vertex_data: Vec<u8>,
    pub index_type: IndexType,
    pub num_indices: u32,
    pub index_data: Vec<u8>,
    pub primitive_type: PrimitiveType,
    pub primitive_groups: Vec<PrimitiveGroup>,
}

impl MeshDesc {
    /// Two-triangle quad covering clip space, with texture coordinates.
    ///
    /// With `flip_v` the v coordinate runs top to bottom (v = 0 at clip y = +1),
    /// which matches top-left image origins.
    pub fn full_screen_quad(flip_v: bool) -> Self {
        let (v_top, v_bottom) = if flip_v { (0.0f32, 1.0f32) } else { (1.0, 0.0) };
        let vertices: [[f32; 4]; 4] = [
            [-1.0, 1.0, 0.0, v_top],
            [1.0, 1.0, 1.0, v_top],
            [-1.0, -1.0, 0.0, v_bottom],
            [1.0, -1.0, 1.0, v_bottom],
        ];
        let indices: [u16; 6] = [0, 2, 1, 1, 2, 3];

        let mut layout = VertexLayout::new();
        layout
            .add(VertexAttr::Position, VertexFormat::Float2)
            .add(VertexAttr::TexCoord0, VertexFormat::Float2);

        Self {
            name: "full_screen_quad".to_string(),
            layout,
            num_vertices: 4,
            vertex_data: bytemuck::cast_slice(&vertices).to_vec(),
            index_type: IndexType::UInt16,
            num_indices: 6,
            index_data: bytemuck::cast_slice(&indices).to_vec(),
            primitive_type: PrimitiveType::Triangles,
            primitive_groups: vec![PrimitiveGroup { base_element: 0, num_elements: 6 }],
        }
    }

    /// Check data sizes and primitive group ranges
    pub fn validate(&self) -> Result<()> {
        if self.layout.is_empty() {
            return Err(Error::InvalidResource(format!("mesh '{}' has an empty vertex layout", self.name)));
        }
        let expected_vertex_bytes = self.num_vertices as usize * self.layout.stride() as usize;
        if self.vertex_data.len() != expected_vertex_bytes {
            return Err(Error::InvalidResource(format!(
                "mesh '{}' vertex data is {} bytes, expected {}",
                self.name, self.vertex_data.len(), expected_vertex_bytes
            )));
        }
        let expected_index_bytes = self.num_indices as usize * self.index_type.size_bytes() as usize;
        if self.index_data.len() != expected_index_bytes {
            return Err(Error::InvalidResource(format!(
                "mesh '{}' index data is {} bytes, expected {}",
                self.name, self.index_data.len(), expected_index_bytes
            )));
        }
        let element_count = match self.index_type {
            IndexType::None => self.num_vertices,
            _ => self.num_indices,
        };
        for (i, group) in self.primitive_groups.iter().enumerate() {
            if group.base_element + group.num_elements > element_count {
                return Err(Error::InvalidResource(format!(
                    "mesh '{}' primitive group {} exceeds {} elements", self.name, i, element_count
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
