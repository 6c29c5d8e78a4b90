/// Graphics pipeline descriptor

use crate::error::{Error, Result};
use crate::graphics_device::{ShaderId, TextureFormat, VertexLayout, PrimitiveType};

/// Depth comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    pub depth_write_enabled: bool,
    pub depth_cmp_func: CompareFunc,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_write_enabled: false,
            depth_cmp_func: CompareFunc::Always,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterizerState {
    pub cull_face_enabled: bool,
    pub cull_face: Face,
    /// Must match the sample count of the pass the pipeline is used in
    pub sample_count: u32,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            cull_face_enabled: false,
            cull_face: Face::Back,
            sample_count: 1,
        }
    }
}

/// Output attachment description of the pass a pipeline renders into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendState {
    /// Number of color outputs written by the fragment stage
    pub color_attachment_count: u32,
    pub color_format: TextureFormat,
    pub depth_format: Option<TextureFormat>,
}

impl Default for BlendState {
    fn default() -> Self {
        Self {
            color_attachment_count: 1,
            color_format: TextureFormat::R8G8B8A8_UNORM,
            depth_format: Some(TextureFormat::D24_UNORM_S8_UINT),
        }
    }
}

/// Descriptor for creating a graphics pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDesc {
    pub name: String,
    pub shader: ShaderId,
    pub layout: VertexLayout,
    pub primitive_type: PrimitiveType,
    pub depth_stencil: DepthStencilState,
    pub rasterizer: RasterizerState,
    pub blend: BlendState,
}

impl PipelineDesc {
    /// Pipeline with default fixed-function state for the given vertex layout and shader
    pub fn from_layout_and_shader(layout: VertexLayout, shader: ShaderId) -> Self {
        Self {
            name: String::new(),
            shader,
            layout,
            primitive_type: PrimitiveType::Triangles,
            depth_stencil: DepthStencilState::default(),
            rasterizer: RasterizerState::default(),
            blend: BlendState::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.layout.is_empty() {
            return Err(Error::InvalidResource(format!("pipeline '{}' has an empty vertex layout", self.name)));
        }
        if self.blend.color_attachment_count == 0 {
            return Err(Error::InvalidResource(format!("pipeline '{}' writes no color attachment", self.name)));
        }
        if self.blend.color_format.is_depth() {
            return Err(Error::InvalidResource(format!(
                "pipeline '{}' color format {:?} is a depth format", self.name, self.blend.color_format
            )));
        }
        if !self.rasterizer.sample_count.is_power_of_two() {
            return Err(Error::InvalidResource(format!(
                "pipeline '{}' has invalid sample count {}", self.name, self.rasterizer.sample_count
            )));
        }
        if self.depth_stencil.depth_write_enabled && self.blend.depth_format.is_none() {
            return Err(Error::InvalidResource(format!(
                "pipeline '{}' writes depth but its pass has no depth buffer", self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
