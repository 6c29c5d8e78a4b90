/// Texture (render target surface) descriptor and formats

use crate::error::{Error, Result};

/// Pixel formats usable for render targets and the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    D16_UNORM,
    D32_FLOAT,
    D24_UNORM_S8_UINT,
    D32_FLOAT_S8_UINT,
}

impl TextureFormat {
    /// True for depth or depth-stencil formats
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::D16_UNORM
                | TextureFormat::D32_FLOAT
                | TextureFormat::D24_UNORM_S8_UINT
                | TextureFormat::D32_FLOAT_S8_UINT
        )
    }

    /// True if the format carries a stencil component
    pub fn has_stencil(&self) -> bool {
        matches!(self, TextureFormat::D24_UNORM_S8_UINT | TextureFormat::D32_FLOAT_S8_UINT)
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::D16_UNORM => 2,
            TextureFormat::D32_FLOAT_S8_UINT => 8,
            _ => 4,
        }
    }
}

/// Texture usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureUsage {
    /// Sampled in shaders only
    Sampled,
    /// Color attachment only
    RenderTarget,
    /// Rendered into, then sampled in a later pass
    SampledAndRenderTarget,
}

/// Descriptor for creating a texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    /// Debug name
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Color format
    pub format: TextureFormat,
    pub usage: TextureUsage,
    /// Multisample count (1 = no MSAA). Multisampled targets are resolved
    /// into a single-sample image by a pass with `StoreAction::Resolve`.
    pub sample_count: u32,
    /// Format of the depth buffer owned by this surface, if any
    pub depth_format: Option<TextureFormat>,
}

impl TextureDesc {
    /// Sampleable RGBA8 render target without depth buffer, single-sampled
    pub fn render_target(width: u32, height: u32) -> Self {
        Self {
            name: String::new(),
            width,
            height,
            format: TextureFormat::R8G8B8A8_UNORM,
            usage: TextureUsage::SampledAndRenderTarget,
            sample_count: 1,
            depth_format: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn with_depth_format(mut self, depth_format: Option<TextureFormat>) -> Self {
        self.depth_format = depth_format;
        self
    }

    /// Check the descriptor is self-consistent
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidResource(format!(
                "texture '{}' has zero size ({}x{})", self.name, self.width, self.height
            )));
        }
        if !self.sample_count.is_power_of_two() || self.sample_count > 64 {
            return Err(Error::InvalidResource(format!(
                "texture '{}' has invalid sample count {}", self.name, self.sample_count
            )));
        }
        if self.format.is_depth() {
            return Err(Error::InvalidResource(format!(
                "texture '{}' color format {:?} is a depth format", self.name, self.format
            )));
        }
        if let Some(depth) = self.depth_format {
            if !depth.is_depth() {
                return Err(Error::InvalidResource(format!(
                    "texture '{}' depth format {:?} is not a depth format", self.name, depth
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
