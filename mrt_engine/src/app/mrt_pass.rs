/// Multi-target pass builder: three offscreen surfaces bound into one pass

use glam::Vec4;
use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, TextureDesc, TextureFormat, TextureId, PassId, RenderPassDesc, StoreAction,
};
use crate::app::{ResourceArena, MRT_ATTACHMENT_COUNT};
use crate::{engine_info, engine_error};

/// Depth format of the first surface, shared by the whole pass
pub const MRT_DEPTH_FORMAT: TextureFormat = TextureFormat::D24_UNORM_S8_UINT;

/// Color format of every surface
pub const MRT_COLOR_FORMAT: TextureFormat = TextureFormat::R8G8B8A8_UNORM;

/// Surfaces and pass produced by [`MrtPassBuilder::build`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MrtTargets {
    /// Attachment order: depth-capable surface first, then the two color-only ones
    pub surfaces: [TextureId; MRT_ATTACHMENT_COUNT],
    pub pass: PassId,
    pub sample_count: u32,
}

/// Describes the offscreen surfaces and their pass
#[derive(Debug, Clone, PartialEq)]
pub struct MrtPassBuilder {
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
    pub clear_colors: [Vec4; MRT_ATTACHMENT_COUNT],
}

impl MrtPassBuilder {
    pub fn new(width: u32, height: u32, sample_count: u32) -> Self {
        Self {
            width,
            height,
            sample_count: sample_count.max(1),
            clear_colors: [Vec4::new(0.0, 0.0, 0.0, 1.0); MRT_ATTACHMENT_COUNT],
        }
    }

    pub fn with_clear_colors(mut self, colors: [Vec4; MRT_ATTACHMENT_COUNT]) -> Self {
        self.clear_colors = colors;
        self
    }

    /// Store policy: resolve multisampled content, plain store otherwise
    pub fn store_action(&self) -> StoreAction {
        if self.sample_count > 1 {
            StoreAction::Resolve
        } else {
            StoreAction::Store
        }
    }

    /// Surface descriptors in attachment order
    pub fn surface_descs(&self) -> [TextureDesc; MRT_ATTACHMENT_COUNT] {
        std::array::from_fn(|i| {
            let depth = if i == 0 { Some(MRT_DEPTH_FORMAT) } else { None };
            TextureDesc::render_target(self.width, self.height)
                .with_name(format!("mrt_surface_{}", i))
                .with_sample_count(self.sample_count)
                .with_depth_format(depth)
        })
    }

    /// Pass descriptor binding `surfaces` in order, depth from the first one
    pub fn pass_desc(&self, surfaces: &[TextureId; MRT_ATTACHMENT_COUNT]) -> RenderPassDesc {
        let mut desc = RenderPassDesc::from_targets(surfaces, Some(surfaces[0])).with_name("mrt_pass");
        for (attachment, color) in desc.color_attachments.iter_mut().zip(self.clear_colors) {
            attachment.clear_color = color;
        }
        desc.store_action = self.store_action();
        desc
    }

    /// Create the surfaces and the pass
    ///
    /// Either everything is created and tracked in `arena`, or nothing is:
    /// on failure the resources created here are released before returning.
    pub fn build(&self, device: &mut dyn GraphicsDevice, arena: &mut ResourceArena) -> Result<MrtTargets> {
        let max = device.max_color_attachments();
        if (max as usize) < MRT_ATTACHMENT_COUNT {
            return Err(Error::InvalidResource(format!(
                "multi-target pass needs {} color attachments, device maximum is {}",
                MRT_ATTACHMENT_COUNT, max
            )));
        }

        let mark = arena.mark();
        match self.create(device, arena) {
            Ok(targets) => {
                engine_info!(
                    "mrt::pass",
                    "multi-target pass built: {} surfaces {}x{}, {} samples, {:?}",
                    MRT_ATTACHMENT_COUNT,
                    self.width,
                    self.height,
                    self.sample_count,
                    self.store_action()
                );
                Ok(targets)
            }
            Err(e) => {
                if let Err(release_error) = arena.rollback_to(device, mark) {
                    engine_error!("mrt::pass", "rollback after failed pass build failed: {}", release_error);
                }
                Err(e)
            }
        }
    }

    fn create(&self, device: &mut dyn GraphicsDevice, arena: &mut ResourceArena) -> Result<MrtTargets> {
        let descs = self.surface_descs();
        let mut surfaces = [TextureId::default(); MRT_ATTACHMENT_COUNT];
        for (slot, desc) in surfaces.iter_mut().zip(descs.iter()) {
            *slot = arena.track(device.create_texture(desc)?);
        }
        let pass = arena.track(device.create_pass(&self.pass_desc(&surfaces))?);
        Ok(MrtTargets { surfaces, pass, sample_count: self.sample_count })
    }
}

#[cfg(test)]
#[path = "mrt_pass_tests.rs"]
mod tests;
