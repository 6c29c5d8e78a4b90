/// Opaque resource handles returned by a GraphicsDevice

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a texture / render target surface
    pub struct TextureId;
    /// Handle to a mesh (vertex + index data and primitive groups)
    pub struct MeshId;
    /// Handle to a shader program (vertex + fragment stage)
    pub struct ShaderId;
    /// Handle to a graphics pipeline
    pub struct PipelineId;
    /// Handle to an offscreen render pass
    pub struct PassId;
}

/// Resource category, used for bookkeeping and release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Texture,
    Mesh,
    Shader,
    Pipeline,
    Pass,
}

/// Any resource handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceId {
    Texture(TextureId),
    Mesh(MeshId),
    Shader(ShaderId),
    Pipeline(PipelineId),
    Pass(PassId),
}

impl ResourceId {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceId::Texture(_) => ResourceKind::Texture,
            ResourceId::Mesh(_) => ResourceKind::Mesh,
            ResourceId::Shader(_) => ResourceKind::Shader,
            ResourceId::Pipeline(_) => ResourceKind::Pipeline,
            ResourceId::Pass(_) => ResourceKind::Pass,
        }
    }
}

impl From<TextureId> for ResourceId {
    fn from(id: TextureId) -> Self {
        ResourceId::Texture(id)
    }
}

impl From<MeshId> for ResourceId {
    fn from(id: MeshId) -> Self {
        ResourceId::Mesh(id)
    }
}

impl From<ShaderId> for ResourceId {
    fn from(id: ShaderId) -> Self {
        ResourceId::Shader(id)
    }
}

impl From<PipelineId> for ResourceId {
    fn from(id: PipelineId) -> Self {
        ResourceId::Pipeline(id)
    }
}

impl From<PassId> for ResourceId {
    fn from(id: PassId) -> Self {
        ResourceId::Pass(id)
    }
}
