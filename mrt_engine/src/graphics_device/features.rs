/// Device capability flags and display attributes

use bitflags::bitflags;
use crate::graphics_device::TextureFormat;

bitflags! {
    /// Optional capabilities reported by a GraphicsDevice
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DeviceFeatures: u32 {
        /// More than one color attachment can be bound per pass
        const MULTIPLE_RENDER_TARGET = 1 << 0;
        /// Render targets may be multisampled (and resolved)
        const MSAA_RENDER_TARGETS = 1 << 1;
    }
}

/// Properties of the default (screen) framebuffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayAttributes {
    pub framebuffer_width: u32,
    pub framebuffer_height: u32,
    /// Color format of the default pass
    pub color_format: TextureFormat,
    /// Depth format of the default pass (None = no depth buffer)
    pub depth_format: Option<TextureFormat>,
    /// Sample count of the default pass
    pub sample_count: u32,
}
