/// Swapchain - presentation images, the screen render pass and its framebuffers
///
/// The default pass renders straight into the acquired swapchain image with a
/// depth buffer that is shared by every image. An out-of-date or suboptimal
/// swapchain is flagged and rebuilt at the start of the next frame.

use ash::vk;
use mrt_engine::mrt::{Error, Result};
use mrt_engine::mrt::device::TextureFormat;
use mrt_engine::{engine_debug, engine_err, engine_error, engine_warn};
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::vk_to_texture_format;
use crate::vulkan_render_pass::{create_framebuffer, PassLayout};
use crate::vulkan_texture::{create_depth_image, ImageAllocation};

/// Depth format of the default pass
pub const SCREEN_DEPTH_FORMAT: TextureFormat = TextureFormat::D24_UNORM_S8_UINT;

/// Surface formats the engine can describe, best first
const PREFERRED_FORMATS: [vk::Format; 4] = [
    vk::Format::B8G8R8A8_SRGB,
    vk::Format::R8G8B8A8_SRGB,
    vk::Format::B8G8R8A8_UNORM,
    vk::Format::R8G8B8A8_UNORM,
];

/// Pick the first preferred format the surface offers
pub fn choose_surface_format(available: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    PREFERRED_FORMATS
        .iter()
        .find_map(|wanted| available.iter().find(|f| f.format == *wanted).copied())
}

/// FIFO is always available; MAILBOX and IMMEDIATE only when asked for no vsync
pub fn choose_present_mode(available: &[vk::PresentModeKHR], vsync: bool) -> vk::PresentModeKHR {
    if vsync {
        return vk::PresentModeKHR::FIFO;
    }
    [vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::IMMEDIATE]
        .into_iter()
        .find(|mode| available.contains(mode))
        .unwrap_or(vk::PresentModeKHR::FIFO)
}

/// Surface extent, or the window size clamped to what the surface allows
pub fn choose_extent(capabilities: &vk::SurfaceCapabilitiesKHR, width: u32, height: u32) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }
    vk::Extent2D {
        width: width.clamp(capabilities.min_image_extent.width, capabilities.max_image_extent.width),
        height: height.clamp(capabilities.min_image_extent.height, capabilities.max_image_extent.height),
    }
}

/// One more than the minimum, capped by the maximum (0 = unbounded)
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 {
        count.min(capabilities.max_image_count)
    } else {
        count
    }
}

pub struct VulkanSwapchain {
    ctx: Arc<GpuContext>,
    physical_device: vk::PhysicalDevice,
    present_queue: vk::Queue,

    surface: vk::SurfaceKHR,
    surface_loader: ash::khr::surface::Instance,
    swapchain_loader: ash::khr::swapchain::Device,

    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    views: Vec<vk::ImageView>,
    surface_format: vk::SurfaceFormatKHR,
    pub(crate) color_format: TextureFormat,
    pub(crate) extent: vk::Extent2D,
    vsync: bool,

    depth: Option<ImageAllocation>,
    pub(crate) render_pass: vk::RenderPass,
    framebuffers: Vec<vk::Framebuffer>,

    /// One per frame in flight (acquire)
    image_available: Vec<vk::Semaphore>,
    /// One per swapchain image (present)
    render_finished: Vec<vk::Semaphore>,

    /// Set on OUT_OF_DATE / SUBOPTIMAL, or when the window was resized
    pub(crate) needs_recreate: bool,
}

impl VulkanSwapchain {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ctx: &Arc<GpuContext>,
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        surface_loader: ash::khr::surface::Instance,
        present_queue: vk::Queue,
        width: u32,
        height: u32,
        vsync: bool,
        frames_in_flight: usize,
    ) -> Result<Self> {
        unsafe {
            let surface_formats = surface_loader
                .get_physical_device_surface_formats(physical_device, surface)
                .map_err(|e| {
                    engine_error!("mrt::vulkan", "Failed to query surface formats: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface formats: {:?}", e))
                })?;
            let surface_format = choose_surface_format(&surface_formats).ok_or_else(|| {
                engine_error!("mrt::vulkan", "Surface offers no 8-bit RGBA/BGRA format");
                Error::InitializationFailed("No supported surface format".to_string())
            })?;
            let color_format = vk_to_texture_format(surface_format.format).ok_or_else(|| {
                Error::InitializationFailed(format!("Unsupported surface format {:?}", surface_format.format))
            })?;

            let layout = PassLayout {
                colors: vec![(surface_format.format, vk::ImageLayout::PRESENT_SRC_KHR)],
                samples: vk::SampleCountFlags::TYPE_1,
                depth_format: Some(ctx.vk_format(SCREEN_DEPTH_FORMAT)),
                resolve: false,
                color_store: vk::AttachmentStoreOp::STORE,
            };
            let render_pass = layout.create(&ctx.device)?;

            let swapchain_loader = ash::khr::swapchain::Device::new(instance, &ctx.device);
            let mut this = Self {
                ctx: Arc::clone(ctx),
                physical_device,
                present_queue,
                surface,
                surface_loader,
                swapchain_loader,
                swapchain: vk::SwapchainKHR::null(),
                images: Vec::new(),
                views: Vec::new(),
                surface_format,
                color_format,
                extent: vk::Extent2D { width, height },
                vsync,
                depth: None,
                render_pass,
                framebuffers: Vec::new(),
                image_available: Vec::new(),
                render_finished: Vec::new(),
                needs_recreate: false,
            };

            let semaphore_info = vk::SemaphoreCreateInfo::default();
            for _ in 0..frames_in_flight {
                let semaphore = ctx.device.create_semaphore(&semaphore_info, None).map_err(|e| {
                    engine_error!("mrt::vulkan", "Failed to create image-available semaphore: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create semaphore: {:?}", e))
                })?;
                this.image_available.push(semaphore);
            }

            this.build(width, height)?;
            Ok(this)
        }
    }

    pub fn image_available(&self, frame: usize) -> vk::Semaphore {
        self.image_available[frame % self.image_available.len()]
    }

    pub fn render_finished(&self, image_index: u32) -> vk::Semaphore {
        self.render_finished[image_index as usize]
    }

    pub fn framebuffer(&self, image_index: u32) -> vk::Framebuffer {
        self.framebuffers[image_index as usize]
    }

    /// Acquire the next image. `None` means the swapchain is out of date and
    /// has been flagged for recreation.
    pub fn acquire(&mut self, frame: usize) -> Result<Option<u32>> {
        let semaphore = self.image_available(frame);
        let result = unsafe {
            self.swapchain_loader
                .acquire_next_image(self.swapchain, u64::MAX, semaphore, vk::Fence::null())
        };
        match result {
            Ok((index, suboptimal)) => {
                if suboptimal {
                    self.needs_recreate = true;
                }
                Ok(Some(index))
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                self.needs_recreate = true;
                Ok(None)
            }
            Err(e) => Err(engine_err!("mrt::vulkan", "Failed to acquire next swapchain image: {:?}", e)),
        }
    }

    pub fn present(&mut self, image_index: u32) -> Result<()> {
        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let wait_semaphores = [self.render_finished(image_index)];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        match unsafe { self.swapchain_loader.queue_present(self.present_queue, &present_info) } {
            Ok(false) => Ok(()),
            Ok(true) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                self.needs_recreate = true;
                Ok(())
            }
            Err(e) => Err(engine_err!("mrt::vulkan", "Failed to present swapchain image: {:?}", e)),
        }
    }

    /// Rebuild for a new window size. The render pass survives, so pipelines
    /// built for the screen stay valid.
    pub fn recreate(&mut self, width: u32, height: u32) -> Result<()> {
        unsafe {
            self.ctx.device.device_wait_idle()
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to wait idle before swapchain recreate: {:?}", e))?;
            self.release_images();
            self.build(width, height)?;
        }
        self.needs_recreate = false;
        engine_debug!("mrt::vulkan", "Swapchain recreated at {}x{}", self.extent.width, self.extent.height);
        Ok(())
    }

    unsafe fn build(&mut self, width: u32, height: u32) -> Result<()> {
        let capabilities = self.surface_loader
            .get_physical_device_surface_capabilities(self.physical_device, self.surface)
            .map_err(|e| {
                engine_error!("mrt::vulkan", "Failed to get surface capabilities: {:?}", e);
                Error::InitializationFailed(format!("Failed to get surface capabilities: {:?}", e))
            })?;
        let present_modes = self.surface_loader
            .get_physical_device_surface_present_modes(self.physical_device, self.surface)
            .unwrap_or_default();

        let extent = choose_extent(&capabilities, width, height);
        if extent.width == 0 || extent.height == 0 {
            // minimized: keep the old extent and try again later
            engine_warn!("mrt::vulkan", "Surface has a zero extent, postponing swapchain creation");
            self.needs_recreate = true;
            return Ok(());
        }

        let old_swapchain = self.swapchain;
        let create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(self.surface)
            .min_image_count(choose_image_count(&capabilities))
            .image_format(self.surface_format.format)
            .image_color_space(self.surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(choose_present_mode(&present_modes, self.vsync))
            .clipped(true)
            .old_swapchain(old_swapchain);

        let swapchain = self.swapchain_loader.create_swapchain(&create_info, None).map_err(|e| {
            engine_error!("mrt::vulkan", "Failed to create swapchain: {:?}", e);
            Error::InitializationFailed(format!("Failed to create swapchain: {:?}", e))
        })?;
        if old_swapchain != vk::SwapchainKHR::null() {
            self.swapchain_loader.destroy_swapchain(old_swapchain, None);
        }
        self.swapchain = swapchain;
        self.extent = extent;

        self.images = self.swapchain_loader.get_swapchain_images(swapchain).map_err(|e| {
            engine_error!("mrt::vulkan", "Failed to get swapchain images: {:?}", e);
            Error::InitializationFailed(format!("Failed to get swapchain images: {:?}", e))
        })?;

        for &image in &self.images {
            let view_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(self.surface_format.format)
                .components(vk::ComponentMapping::default())
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });
            let view = self.ctx.device.create_image_view(&view_info, None).map_err(|e| {
                engine_error!("mrt::vulkan", "Failed to create swapchain image view: {:?}", e);
                Error::InitializationFailed(format!("Failed to create image view: {:?}", e))
            })?;
            self.views.push(view);
        }

        let depth = create_depth_image(&self.ctx, "screen_depth", extent, SCREEN_DEPTH_FORMAT)?;
        for &view in &self.views {
            let framebuffer = create_framebuffer(&self.ctx.device, self.render_pass, &[view, depth.view], extent)?;
            self.framebuffers.push(framebuffer);
        }
        self.depth = Some(depth);

        let semaphore_info = vk::SemaphoreCreateInfo::default();
        while self.render_finished.len() < self.images.len() {
            let semaphore = self.ctx.device.create_semaphore(&semaphore_info, None).map_err(|e| {
                engine_error!("mrt::vulkan", "Failed to create render-finished semaphore: {:?}", e);
                Error::InitializationFailed(format!("Failed to create semaphore: {:?}", e))
            })?;
            self.render_finished.push(semaphore);
        }
        Ok(())
    }

    /// Framebuffers, views and the depth image; the swapchain handle itself is
    /// handed to the next `create_swapchain` as `old_swapchain`
    unsafe fn release_images(&mut self) {
        for framebuffer in self.framebuffers.drain(..) {
            self.ctx.device.destroy_framebuffer(framebuffer, None);
        }
        for view in self.views.drain(..) {
            self.ctx.device.destroy_image_view(view, None);
        }
        self.depth = None;
        self.images.clear();
    }
}

impl Drop for VulkanSwapchain {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.device_wait_idle().ok();
            self.release_images();
            for &semaphore in self.image_available.iter().chain(self.render_finished.iter()) {
                self.ctx.device.destroy_semaphore(semaphore, None);
            }
            if self.swapchain != vk::SwapchainKHR::null() {
                self.swapchain_loader.destroy_swapchain(self.swapchain, None);
            }
            self.ctx.device.destroy_render_pass(self.render_pass, None);
            self.surface_loader.destroy_surface(self.surface, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_swapchain_tests.rs"]
mod tests;
