/// Offscreen stage: one rotating cube drawn into all surfaces of the multi-target pass

use crate::error::Result;
use crate::graphics_device::{
    GraphicsDevice, MeshId, ShaderId, PipelineId, ShaderDesc, ShaderStage, PipelineDesc,
    VertexAttr, VertexFormat, CompareFunc, Face, BlendState, DrawState, PassAction,
};
use crate::shapes::ShapeBuilder;
use crate::app::{
    ResourceArena, MrtConfig, MrtTargets, CubeTransform,
    MRT_ATTACHMENT_COUNT, MRT_COLOR_FORMAT, MRT_DEPTH_FORMAT,
};

pub struct OffscreenStage {
    pub mesh: MeshId,
    pub shader: ShaderId,
    pub pipeline: PipelineId,
    pub transform: CubeTransform,
}

impl OffscreenStage {
    /// Cube mesh, cube shader and a pipeline matching the multi-target pass
    pub fn create(
        device: &mut dyn GraphicsDevice,
        arena: &mut ResourceArena,
        shader: &ShaderDesc,
        targets: &MrtTargets,
        config: &MrtConfig,
    ) -> Result<Self> {
        let mut shapes = ShapeBuilder::new();
        shapes
            .layout
            .add(VertexAttr::Position, VertexFormat::Float3)
            .add(VertexAttr::Normal, VertexFormat::UByte4N);
        shapes.add_box(1.0, 1.0, 1.0, 1);
        let mut cube = shapes.build()?;
        cube.name = "cube".to_string();

        let mesh = arena.track(device.create_mesh(&cube)?);
        let shader = arena.track(device.create_shader(shader)?);

        let mut desc = PipelineDesc::from_layout_and_shader(cube.layout.clone(), shader).with_name("cube_pipeline");
        desc.depth_stencil.depth_write_enabled = true;
        desc.depth_stencil.depth_cmp_func = CompareFunc::LessEqual;
        desc.rasterizer.cull_face_enabled = true;
        desc.rasterizer.cull_face = Face::Back;
        desc.rasterizer.sample_count = targets.sample_count;
        desc.blend = BlendState {
            color_attachment_count: MRT_ATTACHMENT_COUNT as u32,
            color_format: MRT_COLOR_FORMAT,
            depth_format: Some(MRT_DEPTH_FORMAT),
        };
        let pipeline = arena.track(device.create_pipeline(&desc)?);

        Ok(Self { mesh, shader, pipeline, transform: CubeTransform::new(config) })
    }

    /// Advance the rotation and render the cube into every surface
    ///
    /// The pass clears each attachment to its own configured color and
    /// resolves when it ends.
    pub fn draw(&mut self, device: &mut dyn GraphicsDevice, targets: &MrtTargets) -> Result<()> {
        self.transform.advance();
        let params = self.transform.uniforms();

        device.begin_pass(Some(targets.pass), &PassAction::pass_defaults())?;
        device.apply_draw_state(&DrawState::new(self.pipeline, self.mesh))?;
        device.apply_uniforms(ShaderStage::Vertex, bytemuck::bytes_of(&params))?;
        device.draw(0)?;
        device.end_pass()
    }
}
