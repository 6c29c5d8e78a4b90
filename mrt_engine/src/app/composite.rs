/// Composite stage: the resolved surfaces shown side by side on screen

use glam::Vec4;
use crate::error::Result;
use crate::graphics_device::{
    GraphicsDevice, MeshId, ShaderId, PipelineId, ShaderDesc, PipelineDesc, MeshDesc,
    TextureId, DrawState, PassAction, ViewportRect,
};
use crate::app::{ResourceArena, MrtConfig, MrtTargets, MRT_ATTACHMENT_COUNT};

/// Viewport of each panel: `(i * width, 0, width, height)`, bottom-left origin
pub fn panel_viewports(width: u32, height: u32) -> [ViewportRect; MRT_ATTACHMENT_COUNT] {
    std::array::from_fn(|i| ViewportRect::new((i as u32 * width) as i32, 0, width, height))
}

pub struct CompositeStage {
    pub mesh: MeshId,
    pub shader: ShaderId,
    pub pipeline: PipelineId,
    /// Surface shown in each panel, with the panel's viewport
    pub panels: [(TextureId, ViewportRect); MRT_ATTACHMENT_COUNT],
    pub clear_color: Vec4,
}

impl CompositeStage {
    /// Quad mesh, quad shader and a pipeline matching the screen pass
    pub fn create(
        device: &mut dyn GraphicsDevice,
        arena: &mut ResourceArena,
        shader: &ShaderDesc,
        targets: &MrtTargets,
        config: &MrtConfig,
    ) -> Result<Self> {
        let quad = MeshDesc::full_screen_quad(true);
        let mesh = arena.track(device.create_mesh(&quad)?);
        let shader = arena.track(device.create_shader(shader)?);

        let display = device.display_attributes();
        let mut desc = PipelineDesc::from_layout_and_shader(quad.layout.clone(), shader).with_name("quad_pipeline");
        desc.rasterizer.sample_count = display.sample_count;
        desc.blend.color_attachment_count = 1;
        desc.blend.color_format = display.color_format;
        desc.blend.depth_format = display.depth_format;
        let pipeline = arena.track(device.create_pipeline(&desc)?);

        let viewports = panel_viewports(config.offscreen_width, config.offscreen_height);
        let panels = std::array::from_fn(|i| (targets.surfaces[i], viewports[i]));

        Ok(Self { mesh, shader, pipeline, panels, clear_color: config.display_clear_color })
    }

    /// Draw one textured quad per panel into the screen pass
    pub fn draw(&self, device: &mut dyn GraphicsDevice) -> Result<()> {
        device.begin_pass(None, &PassAction::clear(self.clear_color))?;
        for (texture, viewport) in &self.panels {
            device.apply_viewport(*viewport, false)?;
            device.apply_draw_state(&DrawState::new(self.pipeline, self.mesh).with_fs_texture(*texture))?;
            device.draw(0)?;
        }
        device.end_pass()
    }
}
