/// Render passes and framebuffers
///
/// Attachment order inside a `VkRenderPass`: the N color attachments, then
/// their N resolve attachments when the pass resolves, then depth/stencil.

use ash::vk;
use mrt_engine::glam::Vec4;
use mrt_engine::mrt::Result;
use mrt_engine::mrt::device::{
    RenderPassDesc, PassAction, StoreAction, TextureFormat, TextureId, TextureUsage,
};
use mrt_engine::{engine_bail, engine_err};
use slotmap::SlotMap;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{color_store_op, sample_count_to_vk};
use crate::vulkan_texture::VulkanTexture;

/// Everything that shapes a `VkRenderPass`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassLayout {
    /// Format and final layout of each color attachment
    pub colors: Vec<(vk::Format, vk::ImageLayout)>,
    pub samples: vk::SampleCountFlags,
    pub depth_format: Option<vk::Format>,
    pub resolve: bool,
    pub color_store: vk::AttachmentStoreOp,
}

/// Attachment descriptions and the subpass references into them
#[derive(Debug, Clone)]
pub struct AttachmentSet {
    pub attachments: Vec<vk::AttachmentDescription>,
    pub color_refs: Vec<vk::AttachmentReference>,
    pub resolve_refs: Vec<vk::AttachmentReference>,
    pub depth_ref: Option<vk::AttachmentReference>,
}

impl PassLayout {
    /// Layout of a pass used only for pipeline compatibility
    pub fn compatible(color_format: vk::Format, count: u32, samples: vk::SampleCountFlags, depth_format: Option<vk::Format>) -> Self {
        Self {
            colors: vec![(color_format, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL); count as usize],
            samples,
            depth_format,
            resolve: false,
            color_store: vk::AttachmentStoreOp::STORE,
        }
    }

    pub fn attachment_set(&self) -> AttachmentSet {
        let mut attachments = Vec::with_capacity(self.colors.len() * 2 + 1);
        let mut color_refs = Vec::with_capacity(self.colors.len());
        let mut resolve_refs = Vec::new();

        for &(format, final_layout) in &self.colors {
            let final_layout = if self.resolve { vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL } else { final_layout };
            color_refs.push(vk::AttachmentReference::default()
                .attachment(attachments.len() as u32)
                .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL));
            attachments.push(vk::AttachmentDescription::default()
                .format(format)
                .samples(self.samples)
                .load_op(vk::AttachmentLoadOp::CLEAR)
                .store_op(self.color_store)
                .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .final_layout(final_layout));
        }

        if self.resolve {
            for &(format, final_layout) in &self.colors {
                resolve_refs.push(vk::AttachmentReference::default()
                    .attachment(attachments.len() as u32)
                    .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL));
                attachments.push(vk::AttachmentDescription::default()
                    .format(format)
                    .samples(vk::SampleCountFlags::TYPE_1)
                    .load_op(vk::AttachmentLoadOp::DONT_CARE)
                    .store_op(vk::AttachmentStoreOp::STORE)
                    .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                    .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                    .initial_layout(vk::ImageLayout::UNDEFINED)
                    .final_layout(final_layout));
            }
        }

        let depth_ref = self.depth_format.map(|format| {
            let index = attachments.len() as u32;
            attachments.push(vk::AttachmentDescription::default()
                .format(format)
                .samples(self.samples)
                .load_op(vk::AttachmentLoadOp::CLEAR)
                .store_op(vk::AttachmentStoreOp::DONT_CARE)
                .stencil_load_op(vk::AttachmentLoadOp::CLEAR)
                .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .final_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL));
            vk::AttachmentReference::default()
                .attachment(index)
                .layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
        });

        AttachmentSet { attachments, color_refs, resolve_refs, depth_ref }
    }

    pub fn create(&self, device: &ash::Device) -> Result<vk::RenderPass> {
        let set = self.attachment_set();

        let mut subpass = vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&set.color_refs);
        if !set.resolve_refs.is_empty() {
            subpass = subpass.resolve_attachments(&set.resolve_refs);
        }
        if let Some(ref depth_ref) = set.depth_ref {
            subpass = subpass.depth_stencil_attachment(depth_ref);
        }

        let attachment_stages = vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
            | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS
            | vk::PipelineStageFlags::LATE_FRAGMENT_TESTS;
        let attachment_writes = vk::AccessFlags::COLOR_ATTACHMENT_WRITE
            | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE;

        let dependencies = [
            // previous frame: writes to the attachments and shader reads of them
            vk::SubpassDependency::default()
                .src_subpass(vk::SUBPASS_EXTERNAL)
                .dst_subpass(0)
                .src_stage_mask(attachment_stages | vk::PipelineStageFlags::FRAGMENT_SHADER)
                .src_access_mask(attachment_writes)
                .dst_stage_mask(attachment_stages)
                .dst_access_mask(attachment_writes | vk::AccessFlags::COLOR_ATTACHMENT_READ),
            // later passes sample what this one rendered
            vk::SubpassDependency::default()
                .src_subpass(0)
                .dst_subpass(vk::SUBPASS_EXTERNAL)
                .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
                .src_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE)
                .dst_stage_mask(vk::PipelineStageFlags::FRAGMENT_SHADER)
                .dst_access_mask(vk::AccessFlags::SHADER_READ),
        ];

        let render_pass_info = vk::RenderPassCreateInfo::default()
            .attachments(&set.attachments)
            .subpasses(std::slice::from_ref(&subpass))
            .dependencies(&dependencies);

        unsafe { device.create_render_pass(&render_pass_info, None) }
            .map_err(|e| engine_err!("mrt::vulkan", "Failed to create render pass: {:?}", e))
    }
}

pub fn create_framebuffer(
    device: &ash::Device,
    render_pass: vk::RenderPass,
    views: &[vk::ImageView],
    extent: vk::Extent2D,
) -> Result<vk::Framebuffer> {
    let framebuffer_info = vk::FramebufferCreateInfo::default()
        .render_pass(render_pass)
        .attachments(views)
        .width(extent.width)
        .height(extent.height)
        .layers(1);

    unsafe { device.create_framebuffer(&framebuffer_info, None) }
        .map_err(|e| engine_err!("mrt::vulkan", "Failed to create framebuffer: {:?}", e))
}

/// Offscreen pass: a render pass plus the framebuffer binding its textures
pub struct VulkanPass {
    ctx: Arc<GpuContext>,
    pub(crate) name: String,
    pub(crate) render_pass: vk::RenderPass,
    pub(crate) framebuffer: vk::Framebuffer,
    pub(crate) extent: vk::Extent2D,
    pub(crate) color_textures: Vec<TextureId>,
    pub(crate) clear_colors: Vec<Vec4>,
    pub(crate) clear_depth: f32,
    pub(crate) clear_stencil: u8,
    pub(crate) resolves: bool,
    pub(crate) sample_count: u32,
    pub(crate) color_format: TextureFormat,
    pub(crate) depth_format: Option<TextureFormat>,
}

impl VulkanPass {
    pub fn new(
        ctx: &Arc<GpuContext>,
        desc: &RenderPassDesc,
        textures: &SlotMap<TextureId, VulkanTexture>,
        max_color_attachments: u32,
    ) -> Result<Self> {
        desc.validate(max_color_attachments)?;

        let mut colors: Vec<&VulkanTexture> = Vec::with_capacity(desc.color_attachments.len());
        for (i, attachment) in desc.color_attachments.iter().enumerate() {
            let Some(texture) = textures.get(attachment.texture) else {
                engine_bail!("mrt::vulkan", "pass '{}': color attachment {} is not a live texture", desc.name, i);
            };
            if texture.usage == TextureUsage::Sampled {
                engine_bail!("mrt::vulkan", "pass '{}': texture '{}' is not a render target", desc.name, texture.name);
            }
            colors.push(texture);
        }

        let Some(&first) = colors.first() else {
            engine_bail!("mrt::vulkan", "pass '{}' has no color attachment", desc.name);
        };
        for texture in &colors[1..] {
            if texture.extent != first.extent
                || texture.sample_count != first.sample_count
                || texture.format != first.format
            {
                engine_bail!("mrt::vulkan",
                    "pass '{}': attachment '{}' ({}x{}, {} samples, {:?}) differs from '{}' ({}x{}, {} samples, {:?})",
                    desc.name,
                    texture.name, texture.extent.width, texture.extent.height, texture.sample_count, texture.format,
                    first.name, first.extent.width, first.extent.height, first.sample_count, first.format);
            }
        }

        let depth_texture = match desc.depth_stencil_texture {
            Some(id) => match textures.get(id) {
                Some(texture) if texture.depth.is_some() && texture.extent == first.extent => Some(texture),
                Some(texture) => engine_bail!("mrt::vulkan",
                    "pass '{}': depth source '{}' has no matching depth buffer", desc.name, texture.name),
                None => engine_bail!("mrt::vulkan", "pass '{}': depth source is not a live texture", desc.name),
            },
            None => None,
        };

        let resolves = desc.store_action == StoreAction::Resolve && first.sample_count > 1;
        if resolves {
            if let Some(texture) = colors.iter().find(|t| t.resolve.is_none()) {
                engine_bail!("mrt::vulkan",
                    "pass '{}': '{}' resolves but has no single-sample image", desc.name, texture.name);
            }
        }

        let samples = sample_count_to_vk(first.sample_count).ok_or_else(|| {
            engine_err!("mrt::vulkan", "pass '{}': unsupported sample count {}", desc.name, first.sample_count)
        })?;
        let depth_format = depth_texture.and_then(|t| t.depth_format());

        let layout = PassLayout {
            colors: colors
                .iter()
                .map(|t| {
                    // resolve targets and single-sample sampled targets end up readable
                    let final_layout = if resolves || (t.sample_count == 1 && t.sampled_view().is_some()) {
                        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL
                    } else {
                        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL
                    };
                    (ctx.vk_format(t.format), final_layout)
                })
                .collect(),
            samples,
            depth_format: depth_format.map(|f| ctx.vk_format(f)),
            resolve: resolves,
            color_store: color_store_op(desc.store_action, first.sample_count),
        };

        let mut views: Vec<vk::ImageView> = colors.iter().map(|t| t.color.view).collect();
        if resolves {
            views.extend(colors.iter().filter_map(|t| t.resolve.as_ref().map(|r| r.view)));
        }
        if let Some(view) = depth_texture.and_then(|t| t.depth_view()) {
            views.push(view);
        }

        let render_pass = layout.create(&ctx.device)?;
        let framebuffer = match create_framebuffer(&ctx.device, render_pass, &views, first.extent) {
            Ok(framebuffer) => framebuffer,
            Err(e) => {
                unsafe { ctx.device.destroy_render_pass(render_pass, None) };
                return Err(e);
            }
        };

        Ok(Self {
            ctx: Arc::clone(ctx),
            name: desc.name.clone(),
            render_pass,
            framebuffer,
            extent: first.extent,
            color_textures: desc.color_textures(),
            clear_colors: desc.color_attachments.iter().map(|a| a.clear_color).collect(),
            clear_depth: desc.clear_depth,
            clear_stencil: desc.clear_stencil,
            resolves,
            sample_count: first.sample_count,
            color_format: first.format,
            depth_format,
        })
    }

    /// One clear value per attachment, in attachment order
    pub fn clear_values(&self, action: &PassAction) -> Vec<vk::ClearValue> {
        let colors = self
            .clear_colors
            .iter()
            .map(|c| action.color.unwrap_or(*c))
            .map(color_clear_value);
        let mut values: Vec<vk::ClearValue> = colors.collect();
        if self.resolves {
            values.extend((0..self.clear_colors.len()).map(|_| vk::ClearValue::default()));
        }
        if self.depth_format.is_some() {
            values.push(depth_clear_value(
                action.depth.unwrap_or(self.clear_depth),
                action.stencil.unwrap_or(self.clear_stencil),
            ));
        }
        values
    }
}

impl Drop for VulkanPass {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_framebuffer(self.framebuffer, None);
            self.ctx.device.destroy_render_pass(self.render_pass, None);
        }
    }
}

pub fn color_clear_value(color: Vec4) -> vk::ClearValue {
    vk::ClearValue {
        color: vk::ClearColorValue { float32: color.to_array() },
    }
}

pub fn depth_clear_value(depth: f32, stencil: u8) -> vk::ClearValue {
    vk::ClearValue {
        depth_stencil: vk::ClearDepthStencilValue { depth, stencil: stencil as u32 },
    }
}

#[cfg(test)]
#[path = "vulkan_render_pass_tests.rs"]
mod tests;
