/// Texture - render target images for the Vulkan backend
///
/// A multisampled texture owns two images: the MSAA image the pass renders
/// into and a single-sample image the pass resolves into. Shaders only ever
/// sample the single-sample image. An optional depth image with the same
/// sample count rides along when the descriptor asks for one.

use ash::vk;
use gpu_allocator::vulkan::Allocation;
use gpu_allocator::MemoryLocation;
use mrt_engine::mrt::Result;
use mrt_engine::mrt::device::{TextureDesc, TextureFormat, TextureUsage};
use mrt_engine::engine_err;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{depth_aspect, sample_count_to_vk};

/// Image + view + memory, released together
pub struct ImageAllocation {
    ctx: Arc<GpuContext>,
    pub(crate) image: vk::Image,
    pub(crate) view: vk::ImageView,
    allocation: Option<Allocation>,
}

impl ImageAllocation {
    pub fn new(
        ctx: &Arc<GpuContext>,
        name: &str,
        extent: vk::Extent2D,
        format: vk::Format,
        samples: vk::SampleCountFlags,
        usage: vk::ImageUsageFlags,
        aspect_mask: vk::ImageAspectFlags,
    ) -> Result<Self> {
        unsafe {
            let image_create_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .format(format)
                .extent(vk::Extent3D { width: extent.width, height: extent.height, depth: 1 })
                .mip_levels(1)
                .array_layers(1)
                .samples(samples)
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);

            let image = ctx.device.create_image(&image_create_info, None)
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to create image '{}': {:?}", name, e))?;

            // From here on Drop cleans up whatever was created
            let mut this = Self {
                ctx: Arc::clone(ctx),
                image,
                view: vk::ImageView::null(),
                allocation: None,
            };

            let requirements = ctx.device.get_image_memory_requirements(image);
            let allocation = this.allocation.insert(
                ctx.allocate(name, requirements, MemoryLocation::GpuOnly, false)?,
            );
            ctx.device.bind_image_memory(image, allocation.memory(), allocation.offset())
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to bind memory of image '{}': {:?}", name, e))?;

            let view_create_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .components(vk::ComponentMapping::default())
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });
            this.view = ctx.device.create_image_view(&view_create_info, None)
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to create view of image '{}': {:?}", name, e))?;

            Ok(this)
        }
    }
}

impl Drop for ImageAllocation {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_image_view(self.view, None);
            if let Some(allocation) = self.allocation.take() {
                self.ctx.free(allocation);
            }
            self.ctx.device.destroy_image(self.image, None);
        }
    }
}

pub struct VulkanTexture {
    pub(crate) name: String,
    pub(crate) extent: vk::Extent2D,
    pub(crate) format: TextureFormat,
    pub(crate) sample_count: u32,
    pub(crate) usage: TextureUsage,

    /// Render image (multisampled when `sample_count > 1`)
    pub(crate) color: ImageAllocation,

    /// Single-sample resolve image of a sampled MSAA texture
    pub(crate) resolve: Option<ImageAllocation>,

    pub(crate) depth: Option<(TextureFormat, ImageAllocation)>,

    /// True once a resolving pass has written `resolve`
    pub(crate) resolved: bool,
}

impl VulkanTexture {
    pub fn new(ctx: &Arc<GpuContext>, desc: &TextureDesc) -> Result<Self> {
        desc.validate()?;
        let samples = sample_count_to_vk(desc.sample_count).ok_or_else(|| {
            engine_err!("mrt::vulkan", "texture '{}': unsupported sample count {}", desc.name, desc.sample_count)
        })?;
        let extent = vk::Extent2D { width: desc.width, height: desc.height };
        let format = ctx.vk_format(desc.format);

        let sampled = matches!(desc.usage, TextureUsage::Sampled | TextureUsage::SampledAndRenderTarget);
        let render_target = matches!(desc.usage, TextureUsage::RenderTarget | TextureUsage::SampledAndRenderTarget);
        let multisampled = desc.sample_count > 1;

        let mut color_usage = vk::ImageUsageFlags::empty();
        if render_target {
            color_usage |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
        }
        if sampled && !multisampled {
            color_usage |= vk::ImageUsageFlags::SAMPLED;
        }
        if color_usage.is_empty() {
            color_usage = vk::ImageUsageFlags::SAMPLED;
        }
        color_usage |= vk::ImageUsageFlags::TRANSFER_DST;

        let color = ImageAllocation::new(
            ctx, &desc.name, extent, format, samples, color_usage, vk::ImageAspectFlags::COLOR,
        )?;

        let resolve = if multisampled && sampled {
            Some(ImageAllocation::new(
                ctx,
                &format!("{}_resolve", desc.name),
                extent,
                format,
                vk::SampleCountFlags::TYPE_1,
                vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::SAMPLED,
                vk::ImageAspectFlags::COLOR,
            )?)
        } else {
            None
        };

        let depth = match desc.depth_format {
            Some(depth_format) => Some((
                depth_format,
                ImageAllocation::new(
                    ctx,
                    &format!("{}_depth", desc.name),
                    extent,
                    ctx.vk_format(depth_format),
                    samples,
                    vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
                    depth_aspect(depth_format),
                )?,
            )),
            None => None,
        };

        let texture = Self {
            name: desc.name.clone(),
            extent,
            format: desc.format,
            sample_count: desc.sample_count,
            usage: desc.usage,
            color,
            resolve,
            depth,
            resolved: false,
        };
        texture.transition_for_sampling(ctx)?;
        Ok(texture)
    }

    /// Image shaders read, when the texture can be sampled at all
    fn sampled_image(&self) -> Option<&ImageAllocation> {
        match self.usage {
            TextureUsage::RenderTarget => None,
            _ if self.sample_count > 1 => self.resolve.as_ref(),
            _ => Some(&self.color),
        }
    }

    pub fn sampled_view(&self) -> Option<vk::ImageView> {
        self.sampled_image().map(|image| image.view)
    }

    /// Multisampled contents are only readable after a resolving pass
    pub fn is_sampleable(&self) -> bool {
        self.sampled_image().is_some() && (self.sample_count == 1 || self.resolved)
    }

    pub fn depth_view(&self) -> Option<vk::ImageView> {
        self.depth.as_ref().map(|(_, image)| image.view)
    }

    pub fn depth_format(&self) -> Option<TextureFormat> {
        self.depth.as_ref().map(|(format, _)| *format)
    }

    /// Move the sampled image to SHADER_READ_ONLY_OPTIMAL so it can be bound
    /// before anything was rendered into it. Render passes leave it there too.
    fn transition_for_sampling(&self, ctx: &GpuContext) -> Result<()> {
        let Some(sampled) = self.sampled_image() else {
            return Ok(());
        };
        let image = sampled.image;
        ctx.one_shot(|device, cb| unsafe {
            let barrier = vk::ImageMemoryBarrier::default()
                .old_layout(vk::ImageLayout::UNDEFINED)
                .new_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(image)
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                })
                .src_access_mask(vk::AccessFlags::empty())
                .dst_access_mask(vk::AccessFlags::SHADER_READ);
            device.cmd_pipeline_barrier(
                cb,
                vk::PipelineStageFlags::TOP_OF_PIPE,
                vk::PipelineStageFlags::FRAGMENT_SHADER,
                vk::DependencyFlags::empty(),
                &[], &[], &[barrier],
            );
        })
    }
}

/// Depth image with the aspect its format needs, for swapchain depth buffers
pub fn create_depth_image(
    ctx: &Arc<GpuContext>,
    name: &str,
    extent: vk::Extent2D,
    format: TextureFormat,
) -> Result<ImageAllocation> {
    ImageAllocation::new(
        ctx,
        name,
        extent,
        ctx.vk_format(format),
        vk::SampleCountFlags::TYPE_1,
        vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
        depth_aspect(format),
    )
}
