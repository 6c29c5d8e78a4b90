/// GraphicsDevice trait - resource factory and frame command stream

use glam::Vec4;
use crate::error::Result;
use crate::graphics_device::{
    DeviceFeatures, DisplayAttributes,
    TextureDesc, MeshDesc, ShaderDesc, PipelineDesc, RenderPassDesc, PassAction,
    TextureId, MeshId, ShaderId, PipelineId, PassId, ResourceId,
    DrawState, ViewportRect, ShaderStage,
};

/// Graphics resource service
///
/// Creates GPU objects from declarative descriptors and hands out opaque handles.
/// Rendering is issued as a strictly ordered command stream:
///
/// ```text
/// begin_pass -> (apply_viewport | apply_draw_state | apply_uniforms | draw | fill_rects)* -> end_pass
/// ... more passes ...
/// commit_frame
/// ```
///
/// Passes never nest. Draw-related calls outside a pass fail with `Error::BackendError`.
/// A pipeline may only be applied inside a pass with the same color attachment
/// count and sample count.
pub trait GraphicsDevice {
    // ===== CAPABILITIES =====

    /// Optional features supported by this device
    fn features(&self) -> DeviceFeatures;

    /// Check a single feature
    fn query_feature(&self, feature: DeviceFeatures) -> bool {
        self.features().contains(feature)
    }

    /// Maximum number of color attachments in one pass
    fn max_color_attachments(&self) -> u32;

    /// Properties of the default (screen) framebuffer
    fn display_attributes(&self) -> DisplayAttributes;

    // ===== RESOURCES =====

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureId>;

    fn create_mesh(&mut self, desc: &MeshDesc) -> Result<MeshId>;

    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<ShaderId>;

    fn create_pipeline(&mut self, desc: &PipelineDesc) -> Result<PipelineId>;

    /// Create an offscreen pass. All attachments must share size and sample count.
    fn create_pass(&mut self, desc: &RenderPassDesc) -> Result<PassId>;

    /// Release a resource. Releasing an unknown or already released handle
    /// returns `Error::InvalidResource`.
    fn destroy(&mut self, id: ResourceId) -> Result<()>;

    // ===== COMMANDS =====

    /// Begin `pass`, or the default screen pass when `None`
    fn begin_pass(&mut self, pass: Option<PassId>, action: &PassAction) -> Result<()>;

    /// Restrict rasterization to `rect` (pixels). With `origin_top_left == false`
    /// y = 0 is the bottom row of the render target.
    fn apply_viewport(&mut self, rect: ViewportRect, origin_top_left: bool) -> Result<()>;

    fn apply_draw_state(&mut self, state: &DrawState) -> Result<()>;

    /// Upload the uniform block of `stage` for the current draw state
    fn apply_uniforms(&mut self, stage: ShaderStage, data: &[u8]) -> Result<()>;

    /// Draw primitive group `primitive_group` of the current mesh
    fn draw(&mut self, primitive_group: usize) -> Result<()>;

    /// Fill solid rectangles (top-left origin, pixels) in the current pass
    fn fill_rects(&mut self, color: Vec4, rects: &[ViewportRect]) -> Result<()>;

    fn end_pass(&mut self) -> Result<()>;

    /// Submit everything recorded since the previous commit and present
    fn commit_frame(&mut self) -> Result<()>;

    // ===== WINDOW =====

    /// True once the window asked to close
    fn quit_requested(&self) -> bool;

    fn request_quit(&mut self);
}
