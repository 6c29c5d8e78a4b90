/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Keeps every created descriptor in slot maps, records the command stream
/// as typed [`MockCommand`]s and enforces the same ordering rules as a real
/// backend. Creation of the Nth resource of a kind can be made to fail.

use glam::Vec4;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, DeviceFeatures, DisplayAttributes,
    TextureDesc, MeshDesc, ShaderDesc, PipelineDesc, RenderPassDesc, PassAction, StoreAction,
    TextureId, MeshId, ShaderId, PipelineId, PassId, ResourceId, ResourceKind,
    DrawState, ViewportRect, ShaderStage, TextureFormat,
};
use crate::engine_bail;

// ============================================================================
// Recorded commands
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum MockCommand {
    BeginPass { pass: Option<PassId>, clear_colors: Vec<Vec4> },
    ApplyViewport { rect: ViewportRect, origin_top_left: bool },
    ApplyDrawState(DrawState),
    ApplyUniforms { stage: ShaderStage, data: Vec<u8> },
    Draw { primitive_group: usize },
    FillRects { color: Vec4, rects: Vec<ViewportRect> },
    EndPass,
    CommitFrame,
}

/// Attachment signature of the pass currently being recorded
struct ActivePass {
    pass: Option<PassId>,
    color_count: u32,
    color_format: TextureFormat,
    depth_format: Option<TextureFormat>,
    sample_count: u32,
    attachments: Vec<TextureId>,
    draw_state: Option<DrawState>,
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

pub struct MockGraphicsDevice {
    features: DeviceFeatures,
    max_color_attachments: u32,
    display: DisplayAttributes,
    default_clear_color: Vec4,

    textures: SlotMap<TextureId, TextureDesc>,
    meshes: SlotMap<MeshId, MeshDesc>,
    shaders: SlotMap<ShaderId, ShaderDesc>,
    pipelines: SlotMap<PipelineId, PipelineDesc>,
    passes: SlotMap<PassId, RenderPassDesc>,

    created: FxHashMap<ResourceKind, usize>,
    destroyed: FxHashMap<ResourceKind, usize>,
    creation_order: Vec<ResourceId>,
    resolved: FxHashSet<TextureId>,
    fail_at: Option<(ResourceKind, usize)>,

    commands: Vec<MockCommand>,
    active: Option<ActivePass>,
    frames_committed: usize,
    quit: bool,
    quit_after_frames: Option<usize>,
}

impl MockGraphicsDevice {
    /// Device with every feature, 4 color attachments and a 640x480 display
    pub fn new() -> Self {
        Self {
            features: DeviceFeatures::all(),
            max_color_attachments: 4,
            display: DisplayAttributes {
                framebuffer_width: 640,
                framebuffer_height: 480,
                color_format: TextureFormat::B8G8R8A8_SRGB,
                depth_format: Some(TextureFormat::D24_UNORM_S8_UINT),
                sample_count: 1,
            },
            default_clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            textures: SlotMap::with_key(),
            meshes: SlotMap::with_key(),
            shaders: SlotMap::with_key(),
            pipelines: SlotMap::with_key(),
            passes: SlotMap::with_key(),
            created: FxHashMap::default(),
            destroyed: FxHashMap::default(),
            creation_order: Vec::new(),
            resolved: FxHashSet::default(),
            fail_at: None,
            commands: Vec::new(),
            active: None,
            frames_committed: 0,
            quit: false,
            quit_after_frames: None,
        }
    }

    pub fn with_features(mut self, features: DeviceFeatures) -> Self {
        self.features = features;
        self
    }

    pub fn with_max_color_attachments(mut self, max: u32) -> Self {
        self.max_color_attachments = max;
        self
    }

    pub fn with_display(mut self, display: DisplayAttributes) -> Self {
        self.display = display;
        self
    }

    /// Make the `nth` (1-based) creation of `kind` fail with a backend error
    pub fn fail_creation(mut self, kind: ResourceKind, nth: usize) -> Self {
        self.fail_at = Some((kind, nth));
        self
    }

    /// Report a quit request once `frames` frames were committed
    pub fn quit_after_frames(mut self, frames: usize) -> Self {
        self.quit_after_frames = Some(frames);
        self
    }

    // ===== INSPECTION =====

    pub fn commands(&self) -> &[MockCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<MockCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn created_count(&self, kind: ResourceKind) -> usize {
        self.created.get(&kind).copied().unwrap_or(0)
    }

    pub fn destroyed_count(&self, kind: ResourceKind) -> usize {
        self.destroyed.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_created(&self) -> usize {
        self.created.values().sum()
    }

    pub fn total_destroyed(&self) -> usize {
        self.destroyed.values().sum()
    }

    /// Resources currently alive
    pub fn live_count(&self) -> usize {
        self.textures.len() + self.meshes.len() + self.shaders.len() + self.pipelines.len() + self.passes.len()
    }

    /// Every handle ever created, in creation order
    pub fn creation_order(&self) -> &[ResourceId] {
        &self.creation_order
    }

    pub fn texture_desc(&self, id: TextureId) -> Option<&TextureDesc> {
        self.textures.get(id)
    }

    pub fn pass_desc(&self, id: PassId) -> Option<&RenderPassDesc> {
        self.passes.get(id)
    }

    pub fn pipeline_desc(&self, id: PipelineId) -> Option<&PipelineDesc> {
        self.pipelines.get(id)
    }

    pub fn mesh_desc(&self, id: MeshId) -> Option<&MeshDesc> {
        self.meshes.get(id)
    }

    pub fn frames_committed(&self) -> usize {
        self.frames_committed
    }

    pub fn in_pass(&self) -> bool {
        self.active.is_some()
    }

    // ===== INTERNALS =====

    fn register_creation(&mut self, kind: ResourceKind) -> Result<()> {
        let count = self.created_count(kind);
        if self.fail_at == Some((kind, count + 1)) {
            engine_bail!("mrt::mock", "injected failure creating {:?} #{}", kind, count + 1);
        }
        *self.created.entry(kind).or_insert(0) += 1;
        Ok(())
    }

    fn active_pass(&mut self, what: &str) -> Result<&mut ActivePass> {
        match self.active.as_mut() {
            Some(active) => Ok(active),
            None => Err(crate::engine_err!("mrt::mock", "{} called outside of a pass", what)),
        }
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn features(&self) -> DeviceFeatures {
        self.features
    }

    fn max_color_attachments(&self) -> u32 {
        self.max_color_attachments
    }

    fn display_attributes(&self) -> DisplayAttributes {
        self.display
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureId> {
        desc.validate()?;
        self.register_creation(ResourceKind::Texture)?;
        let id = self.textures.insert(desc.clone());
        self.creation_order.push(id.into());
        Ok(id)
    }

    fn create_mesh(&mut self, desc: &MeshDesc) -> Result<MeshId> {
        desc.validate()?;
        self.register_creation(ResourceKind::Mesh)?;
        let id = self.meshes.insert(desc.clone());
        self.creation_order.push(id.into());
        Ok(id)
    }

    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<ShaderId> {
        desc.validate()?;
        self.register_creation(ResourceKind::Shader)?;
        let id = self.shaders.insert(desc.clone());
        self.creation_order.push(id.into());
        Ok(id)
    }

    fn create_pipeline(&mut self, desc: &PipelineDesc) -> Result<PipelineId> {
        desc.validate()?;
        if !self.shaders.contains_key(desc.shader) {
            return Err(Error::InvalidResource(format!("pipeline '{}' references an unknown shader", desc.name)));
        }
        self.register_creation(ResourceKind::Pipeline)?;
        let id = self.pipelines.insert(desc.clone());
        self.creation_order.push(id.into());
        Ok(id)
    }

    fn create_pass(&mut self, desc: &RenderPassDesc) -> Result<PassId> {
        desc.validate(self.max_color_attachments)?;

        let mut first: Option<&TextureDesc> = None;
        for texture in desc.color_textures() {
            let tex = self.textures.get(texture).ok_or_else(|| {
                Error::InvalidResource(format!("pass '{}' references an unknown texture", desc.name))
            })?;
            if let Some(first) = first {
                if (tex.width, tex.height, tex.sample_count) != (first.width, first.height, first.sample_count) {
                    return Err(Error::InvalidResource(format!(
                        "pass '{}' attachments differ in size or sample count", desc.name
                    )));
                }
            }
            first = Some(tex);
        }
        if let Some(depth) = desc.depth_stencil_texture {
            let has_depth = self.textures.get(depth).map(|t| t.depth_format.is_some()).unwrap_or(false);
            if !has_depth {
                return Err(Error::InvalidResource(format!(
                    "pass '{}' depth source has no depth buffer", desc.name
                )));
            }
        }

        self.register_creation(ResourceKind::Pass)?;
        let id = self.passes.insert(desc.clone());
        self.creation_order.push(id.into());
        Ok(id)
    }

    fn destroy(&mut self, id: ResourceId) -> Result<()> {
        let removed = match id {
            ResourceId::Texture(t) => self.textures.remove(t).is_some(),
            ResourceId::Mesh(m) => self.meshes.remove(m).is_some(),
            ResourceId::Shader(s) => self.shaders.remove(s).is_some(),
            ResourceId::Pipeline(p) => self.pipelines.remove(p).is_some(),
            ResourceId::Pass(p) => self.passes.remove(p).is_some(),
        };
        if !removed {
            return Err(Error::InvalidResource(format!("{:?} is not alive", id)));
        }
        *self.destroyed.entry(id.kind()).or_insert(0) += 1;
        Ok(())
    }

    fn begin_pass(&mut self, pass: Option<PassId>, action: &PassAction) -> Result<()> {
        if self.active.is_some() {
            engine_bail!("mrt::mock", "begin_pass called while another pass is active");
        }

        let (active, clear_colors) = match pass {
            Some(id) => {
                let desc = self.passes.get(id).ok_or_else(|| {
                    Error::InvalidResource("begin_pass with an unknown pass".to_string())
                })?;
                let attachments = desc.color_textures();
                let first = self.textures.get(attachments[0]).ok_or_else(|| {
                    Error::InvalidResource("pass attachment was released".to_string())
                })?;
                let depth_format = desc
                    .depth_stencil_texture
                    .and_then(|t| self.textures.get(t))
                    .and_then(|t| t.depth_format);
                (
                    ActivePass {
                        pass,
                        color_count: attachments.len() as u32,
                        color_format: first.format,
                        depth_format,
                        sample_count: first.sample_count,
                        attachments,
                        draw_state: None,
                    },
                    desc.resolved_clear_colors(action),
                )
            }
            None => (
                ActivePass {
                    pass: None,
                    color_count: 1,
                    color_format: self.display.color_format,
                    depth_format: self.display.depth_format,
                    sample_count: self.display.sample_count,
                    attachments: Vec::new(),
                    draw_state: None,
                },
                vec![action.color.unwrap_or(self.default_clear_color)],
            ),
        };

        self.active = Some(active);
        self.commands.push(MockCommand::BeginPass { pass, clear_colors });
        Ok(())
    }

    fn apply_viewport(&mut self, rect: ViewportRect, origin_top_left: bool) -> Result<()> {
        self.active_pass("apply_viewport")?;
        self.commands.push(MockCommand::ApplyViewport { rect, origin_top_left });
        Ok(())
    }

    fn apply_draw_state(&mut self, state: &DrawState) -> Result<()> {
        let pipeline = self
            .pipelines
            .get(state.pipeline)
            .ok_or_else(|| Error::InvalidResource("draw state references an unknown pipeline".to_string()))?
            .clone();
        if !self.meshes.contains_key(state.mesh) {
            return Err(Error::InvalidResource("draw state references an unknown mesh".to_string()));
        }
        for texture in &state.fs_textures {
            let desc = self
                .textures
                .get(*texture)
                .ok_or_else(|| Error::InvalidResource("draw state references an unknown texture".to_string()))?;
            if desc.sample_count > 1 && !self.resolved.contains(texture) {
                engine_bail!("mrt::mock", "multisampled texture '{}' sampled before being resolved", desc.name);
            }
        }

        let active = self.active_pass("apply_draw_state")?;
        if state.fs_textures.iter().any(|t| active.attachments.contains(t)) {
            engine_bail!("mrt::mock", "texture sampled while bound as an attachment");
        }
        if pipeline.blend.color_attachment_count != active.color_count
            || pipeline.blend.color_format != active.color_format
            || pipeline.blend.depth_format != active.depth_format
            || pipeline.rasterizer.sample_count != active.sample_count
        {
            engine_bail!(
                "mrt::mock",
                "pipeline '{}' ({} x {:?}, {} samples) does not match pass ({} x {:?}, {} samples)",
                pipeline.name,
                pipeline.blend.color_attachment_count,
                pipeline.blend.color_format,
                pipeline.rasterizer.sample_count,
                active.color_count,
                active.color_format,
                active.sample_count
            );
        }
        active.draw_state = Some(state.clone());
        self.commands.push(MockCommand::ApplyDrawState(state.clone()));
        Ok(())
    }

    fn apply_uniforms(&mut self, stage: ShaderStage, data: &[u8]) -> Result<()> {
        let active = self.active_pass("apply_uniforms")?;
        if active.draw_state.is_none() {
            engine_bail!("mrt::mock", "apply_uniforms called before apply_draw_state");
        }
        self.commands.push(MockCommand::ApplyUniforms { stage, data: data.to_vec() });
        Ok(())
    }

    fn draw(&mut self, primitive_group: usize) -> Result<()> {
        let mesh = match self.active_pass("draw")?.draw_state.as_ref() {
            Some(state) => state.mesh,
            None => engine_bail!("mrt::mock", "draw called before apply_draw_state"),
        };
        let groups = self.meshes.get(mesh).map(|m| m.primitive_groups.len()).unwrap_or(0);
        if primitive_group >= groups {
            engine_bail!("mrt::mock", "primitive group {} out of range ({} groups)", primitive_group, groups);
        }
        self.commands.push(MockCommand::Draw { primitive_group });
        Ok(())
    }

    fn fill_rects(&mut self, color: Vec4, rects: &[ViewportRect]) -> Result<()> {
        self.active_pass("fill_rects")?;
        self.commands.push(MockCommand::FillRects { color, rects: rects.to_vec() });
        Ok(())
    }

    fn end_pass(&mut self) -> Result<()> {
        let active = match self.active.take() {
            Some(active) => active,
            None => engine_bail!("mrt::mock", "end_pass called without begin_pass"),
        };
        if let Some(id) = active.pass {
            if self.passes.get(id).map(|p| p.store_action) == Some(StoreAction::Resolve) {
                self.resolved.extend(active.attachments.iter().copied());
            }
        }
        self.commands.push(MockCommand::EndPass);
        Ok(())
    }

    fn commit_frame(&mut self) -> Result<()> {
        if self.active.is_some() {
            engine_bail!("mrt::mock", "commit_frame called inside a pass");
        }
        self.frames_committed += 1;
        if let Some(frames) = self.quit_after_frames {
            if self.frames_committed >= frames {
                self.quit = true;
            }
        }
        self.commands.push(MockCommand::CommitFrame);
        Ok(())
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }

    fn request_quit(&mut self) {
        self.quit = true;
    }
}

// ============================================================================
// Test helpers
// ============================================================================

/// Minimal byte stream that passes SPIR-V header validation
pub fn fake_spirv() -> Vec<u8> {
    let mut bytes = crate::graphics_device::SPIRV_MAGIC.to_le_bytes().to_vec();
    bytes.extend_from_slice(&[0u8; 16]);
    bytes
}

pub fn fake_shader_desc(name: &str) -> ShaderDesc {
    ShaderDesc::from_spirv(name, fake_spirv(), fake_spirv())
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
