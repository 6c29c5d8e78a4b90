/// Per-draw state: pipeline, mesh, bound textures and viewport rectangles

use crate::graphics_device::{PipelineId, MeshId, TextureId};

/// Everything needed to issue a draw call, except uniforms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawState {
    pub pipeline: PipelineId,
    pub mesh: MeshId,
    /// Textures bound to the fragment stage, in binding order
    pub fs_textures: Vec<TextureId>,
}

impl DrawState {
    pub fn new(pipeline: PipelineId, mesh: MeshId) -> Self {
        Self { pipeline, mesh, fs_textures: Vec::new() }
    }

    pub fn with_fs_texture(mut self, texture: TextureId) -> Self {
        self.fs_textures.push(texture);
        self
    }
}

/// Pixel rectangle (viewport, scissor or filled rect)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewportRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ViewportRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive far edge along y
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn overlaps(&self, other: &ViewportRect) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &ViewportRect) -> ViewportRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        ViewportRect::new(x, y, (right - x) as u32, (bottom - y) as u32)
    }
}

#[cfg(test)]
#[path = "draw_state_tests.rs"]
mod tests;
