/// Offscreen render pass descriptor and per-pass clear actions

use glam::Vec4;
use crate::error::{Error, Result};
use crate::graphics_device::TextureId;

/// What happens to attachment contents when a pass ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreAction {
    /// Contents may be discarded
    DontCare,
    /// Contents are kept in the attachment images
    Store,
    /// Multisampled contents are resolved into single-sample images
    /// that can be sampled by later passes
    Resolve,
}

/// One color attachment of an offscreen pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAttachment {
    pub texture: TextureId,
    /// Clear color used when the pass begins with the pass defaults
    pub clear_color: Vec4,
}

/// Descriptor for creating an offscreen render pass
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPassDesc {
    pub name: String,
    /// Color attachments, in shader output order
    pub color_attachments: Vec<ColorAttachment>,
    /// Surface whose depth buffer is used for the whole pass
    pub depth_stencil_texture: Option<TextureId>,
    pub clear_depth: f32,
    pub clear_stencil: u8,
    pub store_action: StoreAction,
}

impl RenderPassDesc {
    /// Pass rendering into `colors` (in order), using the depth buffer of `depth`
    pub fn from_targets(colors: &[TextureId], depth: Option<TextureId>) -> Self {
        Self {
            name: String::new(),
            color_attachments: colors
                .iter()
                .map(|&texture| ColorAttachment { texture, clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0) })
                .collect(),
            depth_stencil_texture: depth,
            clear_depth: 1.0,
            clear_stencil: 0,
            store_action: StoreAction::Store,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Textures bound as color attachments, in order
    pub fn color_textures(&self) -> Vec<TextureId> {
        self.color_attachments.iter().map(|a| a.texture).collect()
    }

    /// Structural checks that do not need the textures themselves
    pub fn validate(&self, max_color_attachments: u32) -> Result<()> {
        if self.color_attachments.is_empty() {
            return Err(Error::InvalidResource(format!("pass '{}' has no color attachment", self.name)));
        }
        if self.color_attachments.len() > max_color_attachments as usize {
            return Err(Error::InvalidResource(format!(
                "pass '{}' binds {} color attachments, device maximum is {}",
                self.name, self.color_attachments.len(), max_color_attachments
            )));
        }
        for (i, a) in self.color_attachments.iter().enumerate() {
            if let Some(j) = self.color_attachments[..i].iter().position(|b| b.texture == a.texture) {
                return Err(Error::InvalidResource(format!(
                    "pass '{}' binds the same texture to attachments {} and {}", self.name, j, i
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.clear_depth) {
            return Err(Error::InvalidResource(format!(
                "pass '{}' clear depth {} is outside 0..1", self.name, self.clear_depth
            )));
        }
        Ok(())
    }

    /// Clear colors applied when the pass begins with `action`
    pub fn resolved_clear_colors(&self, action: &PassAction) -> Vec<Vec4> {
        self.color_attachments
            .iter()
            .map(|a| action.color.unwrap_or(a.clear_color))
            .collect()
    }
}

/// Clear values used by `begin_pass`
///
/// `None` fields keep the pass defaults (for the default pass:
/// the device's default clear color, depth 1.0, stencil 0).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PassAction {
    pub color: Option<Vec4>,
    pub depth: Option<f32>,
    pub stencil: Option<u8>,
}

impl PassAction {
    /// Clear every color attachment to `color`
    pub fn clear(color: Vec4) -> Self {
        Self { color: Some(color), ..Default::default() }
    }

    /// Keep the clear values configured on the pass
    pub fn pass_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[path = "render_pass_tests.rs"]
mod tests;
