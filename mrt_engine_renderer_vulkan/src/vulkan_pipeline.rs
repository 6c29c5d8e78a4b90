/// Pipeline - graphics pipeline, its layout and its texture descriptor layout
///
/// The pipeline is built against a temporary render pass with the same
/// attachment formats and sample count as the passes it will be used in.

use ash::vk;
use mrt_engine::mrt::Result;
use mrt_engine::mrt::device::{PipelineDesc, TextureFormat, VertexLayout};
use mrt_engine::{engine_debug, engine_err};
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{
    compare_func_to_vk, cull_mode_to_vk, primitive_type_to_vk, sample_count_to_vk,
    vertex_attr_location, vertex_format_to_vk,
};
use crate::vulkan_render_pass::PassLayout;
use crate::vulkan_shader::VulkanShader;

pub struct VulkanPipeline {
    ctx: Arc<GpuContext>,
    pub(crate) name: String,
    pub(crate) pipeline: vk::Pipeline,
    pub(crate) layout: vk::PipelineLayout,
    pub(crate) set_layout: vk::DescriptorSetLayout,

    /// Stages covered by the shared push-constant range
    pub(crate) push_constant_stages: vk::ShaderStageFlags,
    pub(crate) push_constant_size: u32,

    /// Fragment texture bindings in set 0, in `DrawState::fs_textures` order
    pub(crate) sampled_bindings: Vec<u32>,

    pub(crate) color_attachment_count: u32,
    pub(crate) color_format: TextureFormat,
    pub(crate) depth_format: Option<TextureFormat>,
    pub(crate) sample_count: u32,
}

/// Vertex buffer binding 0 with one attribute per layout component
pub fn vertex_input(layout: &VertexLayout) -> (vk::VertexInputBindingDescription, Vec<vk::VertexInputAttributeDescription>) {
    let binding = vk::VertexInputBindingDescription {
        binding: 0,
        stride: layout.stride(),
        input_rate: vk::VertexInputRate::VERTEX,
    };
    let attributes = layout
        .components
        .iter()
        .enumerate()
        .map(|(i, component)| vk::VertexInputAttributeDescription {
            location: vertex_attr_location(component.attr),
            binding: 0,
            format: vertex_format_to_vk(component.format),
            offset: layout.offset_of(i),
        })
        .collect();
    (binding, attributes)
}

impl VulkanPipeline {
    pub fn new(ctx: &Arc<GpuContext>, desc: &PipelineDesc, shader: &VulkanShader) -> Result<Self> {
        desc.validate()?;
        let samples = sample_count_to_vk(desc.rasterizer.sample_count).ok_or_else(|| {
            engine_err!("mrt::vulkan", "pipeline '{}': unsupported sample count {}", desc.name, desc.rasterizer.sample_count)
        })?;

        let sampled_bindings = shader.fragment.reflection.sampled_bindings.clone();
        let vs_push = shader.vertex.reflection.push_constant_size;
        let fs_push = shader.fragment.reflection.push_constant_size;
        let mut push_constant_stages = vk::ShaderStageFlags::empty();
        if vs_push > 0 {
            push_constant_stages |= vk::ShaderStageFlags::VERTEX;
        }
        if fs_push > 0 {
            push_constant_stages |= vk::ShaderStageFlags::FRAGMENT;
        }
        let push_constant_size = vs_push.max(fs_push);

        let mut this = Self {
            ctx: Arc::clone(ctx),
            name: desc.name.clone(),
            pipeline: vk::Pipeline::null(),
            layout: vk::PipelineLayout::null(),
            set_layout: vk::DescriptorSetLayout::null(),
            push_constant_stages,
            push_constant_size,
            sampled_bindings,
            color_attachment_count: desc.blend.color_attachment_count,
            color_format: desc.blend.color_format,
            depth_format: desc.blend.depth_format,
            sample_count: desc.rasterizer.sample_count,
        };

        unsafe {
            let set_bindings: Vec<vk::DescriptorSetLayoutBinding> = this
                .sampled_bindings
                .iter()
                .map(|&binding| {
                    vk::DescriptorSetLayoutBinding::default()
                        .binding(binding)
                        .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                        .descriptor_count(1)
                        .stage_flags(vk::ShaderStageFlags::FRAGMENT)
                })
                .collect();
            let set_layout_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&set_bindings);
            this.set_layout = ctx.device.create_descriptor_set_layout(&set_layout_info, None)
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to create descriptor set layout of '{}': {:?}", desc.name, e))?;

            let push_constant_ranges = [vk::PushConstantRange {
                stage_flags: push_constant_stages,
                offset: 0,
                size: push_constant_size,
            }];
            let set_layouts = [this.set_layout];
            let mut layout_info = vk::PipelineLayoutCreateInfo::default().set_layouts(&set_layouts);
            if push_constant_size > 0 {
                layout_info = layout_info.push_constant_ranges(&push_constant_ranges);
            }
            this.layout = ctx.device.create_pipeline_layout(&layout_info, None)
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to create pipeline layout of '{}': {:?}", desc.name, e))?;

            let compatible_pass = PassLayout::compatible(
                ctx.vk_format(desc.blend.color_format),
                desc.blend.color_attachment_count,
                samples,
                desc.blend.depth_format.map(|f| ctx.vk_format(f)),
            )
            .create(&ctx.device)?;

            let result = this.build(desc, shader, samples, compatible_pass);
            ctx.device.destroy_render_pass(compatible_pass, None);
            this.pipeline = result?;
        }

        engine_debug!("mrt::vulkan", "Pipeline '{}': {} color attachment(s), {} sample(s), {} push-constant bytes",
            this.name, this.color_attachment_count, this.sample_count, this.push_constant_size);
        Ok(this)
    }

    unsafe fn build(
        &self,
        desc: &PipelineDesc,
        shader: &VulkanShader,
        samples: vk::SampleCountFlags,
        render_pass: vk::RenderPass,
    ) -> Result<vk::Pipeline> {
        let shader_stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(shader.vertex.module)
                .name(&shader.vertex.entry_point),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(shader.fragment.module)
                .name(&shader.fragment.entry_point),
        ];

        let (binding, attributes) = vertex_input(&desc.layout);
        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(std::slice::from_ref(&binding))
            .vertex_attribute_descriptions(&attributes);

        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(primitive_type_to_vk(desc.primitive_type))
            .primitive_restart_enable(false);

        let viewports = [vk::Viewport::default()];
        let scissors = [vk::Rect2D::default()];
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewports(&viewports)
            .scissors(&scissors);

        // viewports are flipped to y-up, which keeps counter-clockwise front faces
        let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(cull_mode_to_vk(desc.rasterizer.cull_face_enabled, desc.rasterizer.cull_face))
            .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
            .depth_bias_enable(false);

        let has_depth = desc.blend.depth_format.is_some();
        let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(has_depth)
            .depth_write_enable(has_depth && desc.depth_stencil.depth_write_enabled)
            .depth_compare_op(compare_func_to_vk(desc.depth_stencil.depth_cmp_func))
            .depth_bounds_test_enable(false)
            .stencil_test_enable(false);

        let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
            .sample_shading_enable(false)
            .rasterization_samples(samples);

        let blend_attachments = vec![
            vk::PipelineColorBlendAttachmentState::default()
                .color_write_mask(vk::ColorComponentFlags::RGBA)
                .blend_enable(false);
            desc.blend.color_attachment_count as usize
        ];
        let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(&blend_attachments);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let pipeline_create_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .depth_stencil_state(&depth_stencil_state)
            .multisample_state(&multisample_state)
            .color_blend_state(&color_blend_state)
            .dynamic_state(&dynamic_state)
            .layout(self.layout)
            .render_pass(render_pass)
            .subpass(0);

        let pipelines = self.ctx.device
            .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_create_info], None)
            .map_err(|(_, e)| engine_err!("mrt::vulkan", "Failed to create graphics pipeline '{}': {:?}", desc.name, e))?;

        pipelines
            .into_iter()
            .next()
            .ok_or_else(|| engine_err!("mrt::vulkan", "Driver returned no pipeline for '{}'", desc.name))
    }
}

impl Drop for VulkanPipeline {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_pipeline(self.pipeline, None);
            self.ctx.device.destroy_pipeline_layout(self.layout, None);
            self.ctx.device.destroy_descriptor_set_layout(self.set_layout, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_pipeline_tests.rs"]
mod tests;
