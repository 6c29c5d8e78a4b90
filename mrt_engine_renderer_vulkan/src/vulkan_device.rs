/// VulkanGraphicsDevice - Vulkan implementation of the GraphicsDevice trait
///
/// Owns the instance, the logical device, the swapchain and every resource
/// created through the trait. Commands are recorded into the current frame's
/// command buffer as they arrive; the frame starts with the first
/// `begin_pass` and is submitted and presented by `commit_frame`.

use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use mrt_engine::glam::Vec4;
use mrt_engine::mrt::{Error, Result};
use mrt_engine::mrt::device::{
    GraphicsDevice, DeviceFeatures, DisplayAttributes,
    TextureDesc, MeshDesc, ShaderDesc, PipelineDesc, RenderPassDesc, PassAction,
    TextureId, MeshId, ShaderId, PipelineId, PassId, ResourceId,
    DrawState, ViewportRect, ShaderStage, TextureFormat,
};
use mrt_engine::{engine_bail, engine_debug, engine_err, engine_error, engine_info, engine_warn};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use slotmap::SlotMap;
use std::mem::ManuallyDrop;
use std::sync::Arc;

use crate::debug;
use crate::vulkan_config::VulkanConfig;
use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{max_sample_count, shader_stage_to_vk};
use crate::vulkan_frame::FrameResources;
use crate::vulkan_mesh::VulkanMesh;
use crate::vulkan_pipeline::VulkanPipeline;
use crate::vulkan_render_pass::{color_clear_value, depth_clear_value, VulkanPass};
use crate::vulkan_shader::VulkanShader;
use crate::vulkan_swapchain::{VulkanSwapchain, SCREEN_DEPTH_FORMAT};
use crate::vulkan_texture::VulkanTexture;

/// Clear color of the default pass when the action leaves it unset
const DEFAULT_CLEAR_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

// ============================================================================
// Pure helpers
// ============================================================================

/// Capabilities derived from device limits, minus the features disabled in
/// the config. Returns (features, max color attachments, max sample count).
pub fn capabilities_from_limits(
    limits: &vk::PhysicalDeviceLimits,
    disabled: DeviceFeatures,
) -> (DeviceFeatures, u32, u32) {
    let mut features = DeviceFeatures::empty();
    let mut max_color_attachments = limits.max_color_attachments.max(1);
    let mut max_samples = max_sample_count(
        limits.framebuffer_color_sample_counts & limits.framebuffer_depth_sample_counts,
    );

    if max_color_attachments >= 2 {
        features |= DeviceFeatures::MULTIPLE_RENDER_TARGET;
    }
    if max_samples > 1 {
        features |= DeviceFeatures::MSAA_RENDER_TARGETS;
    }

    features -= disabled;
    if !features.contains(DeviceFeatures::MULTIPLE_RENDER_TARGET) {
        max_color_attachments = 1;
    }
    if !features.contains(DeviceFeatures::MSAA_RENDER_TARGETS) {
        max_samples = 1;
    }
    (features, max_color_attachments, max_samples)
}

/// Viewport for `rect` with y pointing up in clip space.
///
/// With `origin_top_left == false`, `rect.y` counts from the bottom row of
/// a target `target_height` pixels high.
pub fn flipped_viewport(rect: ViewportRect, origin_top_left: bool, target_height: u32) -> vk::Viewport {
    let height = rect.height as i32;
    let top = if origin_top_left {
        rect.y
    } else {
        target_height as i32 - (rect.y + height)
    };
    vk::Viewport {
        x: rect.x as f32,
        y: (top + height) as f32,
        width: rect.width as f32,
        height: -(rect.height as f32),
        min_depth: 0.0,
        max_depth: 1.0,
    }
}

/// Clip top-left-origin rectangles to the target; empty results are dropped
pub fn clear_rects(rects: &[ViewportRect], extent: vk::Extent2D) -> Vec<vk::ClearRect> {
    rects
        .iter()
        .filter_map(|r| {
            let x0 = r.x.max(0);
            let y0 = r.y.max(0);
            let x1 = r.right().min(extent.width as i32);
            let y1 = r.bottom().min(extent.height as i32);
            (x1 > x0 && y1 > y0).then(|| vk::ClearRect {
                rect: vk::Rect2D {
                    offset: vk::Offset2D { x: x0, y: y0 },
                    extent: vk::Extent2D { width: (x1 - x0) as u32, height: (y1 - y0) as u32 },
                },
                base_array_layer: 0,
                layer_count: 1,
            })
        })
        .collect()
}

fn outside_pass(what: &str) -> Error {
    engine_err!("mrt::vulkan", "{} called outside of a pass", what)
}

// ============================================================================
// Recording state
// ============================================================================

/// State of the frame being recorded
struct FrameState {
    /// Swapchain image acquired for the default pass
    image_index: Option<u32>,
    acquire_attempted: bool,
    screen_pass_recorded: bool,
}

/// Attachment signature and bindings of the pass being recorded
struct ActivePass {
    pass: Option<PassId>,
    extent: vk::Extent2D,
    color_count: u32,
    color_format: TextureFormat,
    depth_format: Option<TextureFormat>,
    sample_count: u32,
    attachments: Vec<TextureId>,
    resolves: bool,
    pipeline: Option<PipelineId>,
    mesh: Option<MeshId>,

    /// False when no swapchain image was available: commands are checked
    /// but nothing reaches the command buffer
    recording: bool,
}

/// Pass target resolved at `begin_pass`
struct PassTarget {
    render_pass: vk::RenderPass,
    framebuffer: vk::Framebuffer,
    clear_values: Vec<vk::ClearValue>,
}

// ============================================================================
// VulkanGraphicsDevice
// ============================================================================

pub struct VulkanGraphicsDevice {
    _entry: ash::Entry,
    instance: ash::Instance,
    debug_messenger: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
    ctx: Arc<GpuContext>,

    features: DeviceFeatures,
    max_color_attachments: u32,
    max_sample_count: u32,

    swapchain: ManuallyDrop<VulkanSwapchain>,
    frame_command_pool: vk::CommandPool,
    frames: Vec<FrameResources>,
    sampler: vk::Sampler,

    textures: SlotMap<TextureId, VulkanTexture>,
    meshes: SlotMap<MeshId, VulkanMesh>,
    shaders: SlotMap<ShaderId, VulkanShader>,
    pipelines: SlotMap<PipelineId, VulkanPipeline>,
    passes: SlotMap<PassId, VulkanPass>,

    window_size: (u32, u32),
    frame_index: usize,
    frame: Option<FrameState>,
    active: Option<ActivePass>,
    quit: bool,
}

impl VulkanGraphicsDevice {
    /// Create the device for `window`, whose drawable area is `width` x `height`
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(
        window: &W,
        width: u32,
        height: u32,
        config: VulkanConfig,
    ) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load().map_err(|e| {
                engine_error!("mrt::vulkan", "Failed to load Vulkan library: {:?}", e);
                Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
            })?;

            let app_name = std::ffi::CString::new(config.app_name.as_str())
                .map_err(|_| Error::InitializationFailed("application name contains a NUL byte".to_string()))?;
            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, 1, 0, 0))
                .engine_name(c"MRT Engine")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_1);

            let display_handle = window.display_handle().map_err(|e| {
                engine_error!("mrt::vulkan", "Failed to get display handle: {}", e);
                Error::InitializationFailed(format!("Failed to get display handle: {}", e))
            })?;
            let mut extension_names = ash_window::enumerate_required_extensions(display_handle.as_raw())
                .map_err(|e| {
                    engine_error!("mrt::vulkan", "Failed to get required extensions: {}", e);
                    Error::InitializationFailed(format!("Failed to get required extensions: {}", e))
                })?
                .to_vec();

            let validation = config.validation_active() && Self::validation_layer_present(&entry);
            if config.validation_active() && !validation {
                engine_warn!("mrt::vulkan", "VK_LAYER_KHRONOS_validation not installed, validation disabled");
            }
            let layer_names = if validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
                vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
            } else {
                Vec::new()
            };

            let instance_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);
            let instance = entry.create_instance(&instance_info, None).map_err(|e| {
                engine_error!("mrt::vulkan", "Failed to create Vulkan instance: {:?}", e);
                Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
            })?;

            let debug_messenger = if validation {
                Some(Self::create_debug_messenger(&entry, &instance, &config)?)
            } else {
                None
            };

            let window_handle = window.window_handle().map_err(|e| {
                engine_error!("mrt::vulkan", "Failed to get window handle: {}", e);
                Error::InitializationFailed(format!("Failed to get window handle: {}", e))
            })?;
            let surface = ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| {
                engine_error!("mrt::vulkan", "Failed to create surface: {:?}", e);
                Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
            })?;
            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

            let (physical_device, queue_family) = Self::pick_physical_device(&instance, &surface_loader, surface)?;
            let properties = instance.get_physical_device_properties(physical_device);
            let (features, max_color_attachments, max_sample_count) =
                capabilities_from_limits(&properties.limits, config.disabled_features);

            let queue_priorities = [1.0];
            let queue_infos = [vk::DeviceQueueCreateInfo::default()
                .queue_family_index(queue_family)
                .queue_priorities(&queue_priorities)];
            let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];
            let device_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_infos)
                .enabled_extension_names(&device_extension_names);
            let device = instance.create_device(physical_device, &device_info, None).map_err(|e| {
                engine_error!("mrt::vulkan", "Failed to create logical device: {:?}", e);
                Error::InitializationFailed(format!("Failed to create device: {:?}", e))
            })?;
            let queue = device.get_device_queue(queue_family, 0);

            let allocator = Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            })
            .map_err(|e| {
                engine_error!("mrt::vulkan", "Failed to create GPU allocator: {:?}", e);
                Error::InitializationFailed(format!("Failed to create allocator: {:?}", e))
            })?;

            let upload_pool_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(queue_family)
                .flags(vk::CommandPoolCreateFlags::TRANSIENT | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
            let upload_command_pool = device.create_command_pool(&upload_pool_info, None).map_err(|e| {
                engine_error!("mrt::vulkan", "Failed to create upload command pool: {:?}", e);
                Error::InitializationFailed(format!("Failed to create upload command pool: {:?}", e))
            })?;
            let frame_pool_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(queue_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
            let frame_command_pool = device.create_command_pool(&frame_pool_info, None).map_err(|e| {
                engine_error!("mrt::vulkan", "Failed to create frame command pool: {:?}", e);
                Error::InitializationFailed(format!("Failed to create frame command pool: {:?}", e))
            })?;

            let combined_depth_format = Self::pick_combined_depth_format(&instance, physical_device);
            let ctx = Arc::new(GpuContext::new(
                device,
                allocator,
                queue,
                upload_command_pool,
                combined_depth_format,
            ));

            let frames_in_flight = config.frames_in_flight.max(1);
            let frames = (0..frames_in_flight)
                .map(|_| FrameResources::new(&ctx, frame_command_pool))
                .collect::<Result<Vec<_>>>()?;

            let swapchain = VulkanSwapchain::new(
                &ctx,
                &instance,
                physical_device,
                surface,
                surface_loader,
                queue,
                width,
                height,
                config.vsync,
                frames_in_flight,
            )?;

            let sampler_info = vk::SamplerCreateInfo::default()
                .mag_filter(vk::Filter::LINEAR)
                .min_filter(vk::Filter::LINEAR)
                .mipmap_mode(vk::SamplerMipmapMode::NEAREST)
                .address_mode_u(vk::SamplerAddressMode::CLAMP_TO_EDGE)
                .address_mode_v(vk::SamplerAddressMode::CLAMP_TO_EDGE)
                .address_mode_w(vk::SamplerAddressMode::CLAMP_TO_EDGE)
                .max_lod(0.0);
            let sampler = ctx.device.create_sampler(&sampler_info, None).map_err(|e| {
                engine_error!("mrt::vulkan", "Failed to create sampler: {:?}", e);
                Error::InitializationFailed(format!("Failed to create sampler: {:?}", e))
            })?;

            let gpu_name = properties
                .device_name_as_c_str()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            engine_info!("mrt::vulkan", "GPU '{}': {} color attachment(s), up to {}x MSAA, features {:?}",
                gpu_name, max_color_attachments, max_sample_count, features);
            if combined_depth_format != vk::Format::D24_UNORM_S8_UINT {
                engine_debug!("mrt::vulkan", "D24S8 unsupported, using {:?}", combined_depth_format);
            }

            Ok(Self {
                _entry: entry,
                instance,
                debug_messenger,
                ctx,
                features,
                max_color_attachments,
                max_sample_count,
                swapchain: ManuallyDrop::new(swapchain),
                frame_command_pool,
                frames,
                sampler,
                textures: SlotMap::with_key(),
                meshes: SlotMap::with_key(),
                shaders: SlotMap::with_key(),
                pipelines: SlotMap::with_key(),
                passes: SlotMap::with_key(),
                window_size: (width, height),
                frame_index: 0,
                frame: None,
                active: None,
                quit: false,
            })
        }
    }

    /// Rebuild the swapchain for a new window size at the next frame
    pub fn resize(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
        self.swapchain.needs_recreate = true;
    }

    unsafe fn validation_layer_present(entry: &ash::Entry) -> bool {
        entry
            .enumerate_instance_layer_properties()
            .unwrap_or_default()
            .iter()
            .any(|layer| layer.layer_name_as_c_str().is_ok_and(|name| name == c"VK_LAYER_KHRONOS_validation"))
    }

    unsafe fn create_debug_messenger(
        entry: &ash::Entry,
        instance: &ash::Instance,
        config: &VulkanConfig,
    ) -> Result<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)> {
        debug::init_debug_config(debug::Config {
            severity: config.debug_severity,
            output: config.debug_output.clone(),
            break_on_error: config.break_on_validation_error,
        });

        let debug_utils = ash::ext::debug_utils::Instance::new(entry, instance);
        let messenger_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(debug::severity_flags(config.debug_severity))
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug::vulkan_debug_callback));

        let messenger = debug_utils.create_debug_utils_messenger(&messenger_info, None).map_err(|e| {
            engine_error!("mrt::vulkan", "Failed to create debug messenger: {:?}", e);
            Error::InitializationFailed(format!("Failed to create debug messenger: {:?}", e))
        })?;
        Ok((debug_utils, messenger))
    }

    /// GPU with a queue family that can both draw and present, discrete first
    unsafe fn pick_physical_device(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
    ) -> Result<(vk::PhysicalDevice, u32)> {
        let physical_devices = instance.enumerate_physical_devices().map_err(|e| {
            engine_error!("mrt::vulkan", "Failed to enumerate physical devices: {:?}", e);
            Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
        })?;

        let mut best: Option<(u32, vk::PhysicalDevice, u32)> = None;
        for physical_device in physical_devices {
            let families = instance.get_physical_device_queue_family_properties(physical_device);
            let family = (0..families.len() as u32).find(|&i| {
                families[i as usize].queue_flags.contains(vk::QueueFlags::GRAPHICS)
                    && surface_loader
                        .get_physical_device_surface_support(physical_device, i, surface)
                        .unwrap_or(false)
            });
            let Some(family) = family else { continue };

            let score = match instance.get_physical_device_properties(physical_device).device_type {
                vk::PhysicalDeviceType::DISCRETE_GPU => 2,
                vk::PhysicalDeviceType::INTEGRATED_GPU => 1,
                _ => 0,
            };
            if best.map_or(true, |(best_score, _, _)| score > best_score) {
                best = Some((score, physical_device, family));
            }
        }

        best.map(|(_, physical_device, family)| (physical_device, family)).ok_or_else(|| {
            engine_error!("mrt::vulkan", "No GPU can render to this window");
            Error::InitializationFailed("No Vulkan-capable GPU with a present queue found".to_string())
        })
    }

    /// D24S8 where supported as an attachment, D32S8 otherwise
    unsafe fn pick_combined_depth_format(instance: &ash::Instance, physical_device: vk::PhysicalDevice) -> vk::Format {
        [vk::Format::D24_UNORM_S8_UINT, vk::Format::D32_SFLOAT_S8_UINT]
            .into_iter()
            .find(|&format| {
                instance
                    .get_physical_device_format_properties(physical_device, format)
                    .optimal_tiling_features
                    .contains(vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT)
            })
            .unwrap_or(vk::Format::D32_SFLOAT_S8_UINT)
    }

    fn command_buffer(&self) -> vk::CommandBuffer {
        self.frames[self.frame_index].command_buffer
    }

    /// Start recording the frame on first use
    fn ensure_frame(&mut self) -> Result<()> {
        if self.frame.is_none() {
            self.frames[self.frame_index].begin()?;
            self.frame = Some(FrameState {
                image_index: None,
                acquire_attempted: false,
                screen_pass_recorded: false,
            });
        }
        Ok(())
    }

    /// Swapchain image for the default pass, acquired once per frame.
    /// `None` when the window cannot be presented to right now.
    fn acquire_screen_image(&mut self) -> Result<Option<u32>> {
        let Some(frame) = self.frame.as_mut() else {
            engine_bail!("mrt::vulkan", "no frame is being recorded");
        };
        if frame.acquire_attempted {
            return Ok(frame.image_index);
        }
        frame.acquire_attempted = true;

        if self.swapchain.needs_recreate {
            let (width, height) = self.window_size;
            self.swapchain.recreate(width, height)?;
            if self.swapchain.needs_recreate {
                return Ok(None);
            }
        }

        let image_index = self.swapchain.acquire(self.frame_index)?;
        if let Some(frame) = self.frame.as_mut() {
            frame.image_index = image_index;
        }
        Ok(image_index)
    }

    /// Offscreen pass signature and target
    fn offscreen_target(&self, id: PassId, action: &PassAction) -> Result<(ActivePass, PassTarget)> {
        let pass = self
            .passes
            .get(id)
            .ok_or_else(|| Error::InvalidResource("begin_pass with an unknown pass".to_string()))?;
        if pass.color_textures.iter().any(|t| !self.textures.contains_key(*t)) {
            return Err(Error::InvalidResource(format!("pass '{}' has a released attachment", pass.name)));
        }
        Ok((
            ActivePass {
                pass: Some(id),
                extent: pass.extent,
                color_count: pass.color_textures.len() as u32,
                color_format: pass.color_format,
                depth_format: pass.depth_format,
                sample_count: pass.sample_count,
                attachments: pass.color_textures.clone(),
                resolves: pass.resolves,
                pipeline: None,
                mesh: None,
                recording: true,
            },
            PassTarget {
                render_pass: pass.render_pass,
                framebuffer: pass.framebuffer,
                clear_values: pass.clear_values(action),
            },
        ))
    }
}

impl GraphicsDevice for VulkanGraphicsDevice {
    fn features(&self) -> DeviceFeatures {
        self.features
    }

    fn max_color_attachments(&self) -> u32 {
        self.max_color_attachments
    }

    fn display_attributes(&self) -> DisplayAttributes {
        DisplayAttributes {
            framebuffer_width: self.swapchain.extent.width,
            framebuffer_height: self.swapchain.extent.height,
            color_format: self.swapchain.color_format,
            depth_format: Some(SCREEN_DEPTH_FORMAT),
            sample_count: 1,
        }
    }

    // ===== RESOURCES =====

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureId> {
        if desc.sample_count > self.max_sample_count {
            return Err(Error::InvalidResource(format!(
                "texture '{}' wants {} samples, device supports {}",
                desc.name, desc.sample_count, self.max_sample_count
            )));
        }
        let texture = VulkanTexture::new(&self.ctx, desc)?;
        engine_debug!("mrt::vulkan", "Texture '{}' {}x{} {:?} x{}",
            desc.name, desc.width, desc.height, desc.format, desc.sample_count);
        Ok(self.textures.insert(texture))
    }

    fn create_mesh(&mut self, desc: &MeshDesc) -> Result<MeshId> {
        let mesh = VulkanMesh::new(&self.ctx, desc)?;
        Ok(self.meshes.insert(mesh))
    }

    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<ShaderId> {
        let shader = VulkanShader::new(&self.ctx, desc)?;
        Ok(self.shaders.insert(shader))
    }

    fn create_pipeline(&mut self, desc: &PipelineDesc) -> Result<PipelineId> {
        let shader = self.shaders.get(desc.shader).ok_or_else(|| {
            Error::InvalidResource(format!("pipeline '{}' references an unknown shader", desc.name))
        })?;
        let pipeline = VulkanPipeline::new(&self.ctx, desc, shader)?;
        Ok(self.pipelines.insert(pipeline))
    }

    fn create_pass(&mut self, desc: &RenderPassDesc) -> Result<PassId> {
        let pass = VulkanPass::new(&self.ctx, desc, &self.textures, self.max_color_attachments)?;
        engine_debug!("mrt::vulkan", "Pass '{}': {} color attachment(s), {}x{}, resolves: {}",
            pass.name, pass.color_textures.len(), pass.extent.width, pass.extent.height, pass.resolves);
        Ok(self.passes.insert(pass))
    }

    fn destroy(&mut self, id: ResourceId) -> Result<()> {
        if self.frame.is_some() {
            engine_bail!("mrt::vulkan", "cannot release {:?} while a frame is being recorded", id);
        }
        unsafe {
            self.ctx.device.device_wait_idle()
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to wait idle before release: {:?}", e))?;
        }
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
        Ok(())
    }

    // ===== COMMANDS =====

    fn begin_pass(&mut self, pass: Option<PassId>, action: &PassAction) -> Result<()> {
        if self.active.is_some() {
            engine_bail!("mrt::vulkan", "begin_pass called while another pass is active");
        }

        let offscreen = match pass {
            Some(id) => Some(self.offscreen_target(id, action)?),
            None => None,
        };
        self.ensure_frame()?;

        let (mut active, target) = match offscreen {
            Some((active, target)) => (active, Some(target)),
            None => {
                if let Some(frame) = self.frame.as_mut() {
                    frame.screen_pass_recorded = true;
                }
                let image_index = self.acquire_screen_image()?;
                let active = ActivePass {
                    pass: None,
                    extent: self.swapchain.extent,
                    color_count: 1,
                    color_format: self.swapchain.color_format,
                    depth_format: Some(SCREEN_DEPTH_FORMAT),
                    sample_count: 1,
                    attachments: Vec::new(),
                    resolves: false,
                    pipeline: None,
                    mesh: None,
                    recording: image_index.is_some(),
                };
                let target = image_index.map(|index| PassTarget {
                    render_pass: self.swapchain.render_pass,
                    framebuffer: self.swapchain.framebuffer(index),
                    clear_values: vec![
                        color_clear_value(action.color.unwrap_or(DEFAULT_CLEAR_COLOR)),
                        depth_clear_value(action.depth.unwrap_or(1.0), action.stencil.unwrap_or(0)),
                    ],
                });
                (active, target)
            }
        };

        if let Some(target) = target {
            let cb = self.command_buffer();
            let full = vk::Rect2D { offset: vk::Offset2D { x: 0, y: 0 }, extent: active.extent };
            let begin_info = vk::RenderPassBeginInfo::default()
                .render_pass(target.render_pass)
                .framebuffer(target.framebuffer)
                .render_area(full)
                .clear_values(&target.clear_values);
            let viewport = flipped_viewport(
                ViewportRect::new(0, 0, active.extent.width, active.extent.height),
                true,
                active.extent.height,
            );
            unsafe {
                self.ctx.device.cmd_begin_render_pass(cb, &begin_info, vk::SubpassContents::INLINE);
                self.ctx.device.cmd_set_viewport(cb, 0, &[viewport]);
                self.ctx.device.cmd_set_scissor(cb, 0, &[full]);
            }
        } else {
            active.recording = false;
        }

        self.active = Some(active);
        Ok(())
    }

    fn apply_viewport(&mut self, rect: ViewportRect, origin_top_left: bool) -> Result<()> {
        let active = self.active.as_ref().ok_or_else(|| outside_pass("apply_viewport"))?;
        if active.recording {
            let viewport = flipped_viewport(rect, origin_top_left, active.extent.height);
            unsafe { self.ctx.device.cmd_set_viewport(self.command_buffer(), 0, &[viewport]) };
        }
        Ok(())
    }

    fn apply_draw_state(&mut self, state: &DrawState) -> Result<()> {
        let pipeline = self
            .pipelines
            .get(state.pipeline)
            .ok_or_else(|| Error::InvalidResource("draw state references an unknown pipeline".to_string()))?;
        let mesh = self
            .meshes
            .get(state.mesh)
            .ok_or_else(|| Error::InvalidResource("draw state references an unknown mesh".to_string()))?;

        let mut views = Vec::with_capacity(state.fs_textures.len());
        for texture_id in &state.fs_textures {
            let texture = self
                .textures
                .get(*texture_id)
                .ok_or_else(|| Error::InvalidResource("draw state references an unknown texture".to_string()))?;
            if !texture.is_sampleable() {
                engine_bail!("mrt::vulkan", "texture '{}' cannot be sampled yet (not sampled usage or not resolved)",
                    texture.name);
            }
            if let Some(view) = texture.sampled_view() {
                views.push(view);
            }
        }
        if views.len() < pipeline.sampled_bindings.len() {
            engine_bail!("mrt::vulkan", "pipeline '{}' samples {} texture(s), draw state binds {}",
                pipeline.name, pipeline.sampled_bindings.len(), views.len());
        }

        let active = self.active.as_mut().ok_or_else(|| outside_pass("apply_draw_state"))?;
        if state.fs_textures.iter().any(|t| active.attachments.contains(t)) {
            engine_bail!("mrt::vulkan", "texture sampled while bound as an attachment");
        }
        if pipeline.color_attachment_count != active.color_count
            || pipeline.color_format != active.color_format
            || pipeline.depth_format != active.depth_format
            || pipeline.sample_count != active.sample_count
        {
            engine_bail!(
                "mrt::vulkan",
                "pipeline '{}' ({} x {:?}, {} samples) does not match pass ({} x {:?}, {} samples)",
                pipeline.name,
                pipeline.color_attachment_count,
                pipeline.color_format,
                pipeline.sample_count,
                active.color_count,
                active.color_format,
                active.sample_count
            );
        }
        active.pipeline = Some(state.pipeline);
        active.mesh = Some(state.mesh);
        if !active.recording {
            return Ok(());
        }

        let frame = &self.frames[self.frame_index];
        let cb = frame.command_buffer;
        let device = &self.ctx.device;
        unsafe {
            device.cmd_bind_pipeline(cb, vk::PipelineBindPoint::GRAPHICS, pipeline.pipeline);
            mesh.bind(device, cb);

            if !pipeline.sampled_bindings.is_empty() {
                let set = frame.allocate_set(pipeline.set_layout)?;
                let image_infos: Vec<vk::DescriptorImageInfo> = views
                    .iter()
                    .take(pipeline.sampled_bindings.len())
                    .map(|&view| vk::DescriptorImageInfo {
                        sampler: self.sampler,
                        image_view: view,
                        image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                    })
                    .collect();
                let writes: Vec<vk::WriteDescriptorSet> = pipeline
                    .sampled_bindings
                    .iter()
                    .zip(image_infos.iter())
                    .map(|(&binding, info)| {
                        vk::WriteDescriptorSet::default()
                            .dst_set(set)
                            .dst_binding(binding)
                            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                            .image_info(std::slice::from_ref(info))
                    })
                    .collect();
                device.update_descriptor_sets(&writes, &[]);
                device.cmd_bind_descriptor_sets(cb, vk::PipelineBindPoint::GRAPHICS, pipeline.layout, 0, &[set], &[]);
            }
        }
        Ok(())
    }

    fn apply_uniforms(&mut self, stage: ShaderStage, data: &[u8]) -> Result<()> {
        let active = self.active.as_ref().ok_or_else(|| outside_pass("apply_uniforms"))?;
        let Some(pipeline_id) = active.pipeline else {
            engine_bail!("mrt::vulkan", "apply_uniforms called before apply_draw_state");
        };
        let pipeline = self
            .pipelines
            .get(pipeline_id)
            .ok_or_else(|| Error::InvalidResource("bound pipeline was released".to_string()))?;

        if !pipeline.push_constant_stages.contains(shader_stage_to_vk(stage)) {
            engine_bail!("mrt::vulkan", "pipeline '{}' has no {:?} uniform block", pipeline.name, stage);
        }
        if data.len() > pipeline.push_constant_size as usize || data.len() % 4 != 0 {
            engine_bail!("mrt::vulkan", "uniform data of {} bytes does not fit the {}-byte block of '{}'",
                data.len(), pipeline.push_constant_size, pipeline.name);
        }
        if active.recording {
            unsafe {
                self.ctx.device.cmd_push_constants(
                    self.command_buffer(),
                    pipeline.layout,
                    pipeline.push_constant_stages,
                    0,
                    data,
                );
            }
        }
        Ok(())
    }

    fn draw(&mut self, primitive_group: usize) -> Result<()> {
        let active = self.active.as_ref().ok_or_else(|| outside_pass("draw"))?;
        let Some(mesh_id) = active.mesh else {
            engine_bail!("mrt::vulkan", "draw called before apply_draw_state");
        };
        let mesh = self
            .meshes
            .get(mesh_id)
            .ok_or_else(|| Error::InvalidResource("bound mesh was released".to_string()))?;
        let Some(group) = mesh.primitive_groups.get(primitive_group) else {
            engine_bail!("mrt::vulkan", "primitive group {} out of range ({} groups)",
                primitive_group, mesh.primitive_groups.len());
        };
        if active.recording {
            mesh.record_draw(&self.ctx.device, self.command_buffer(), group);
        }
        Ok(())
    }

    fn fill_rects(&mut self, color: Vec4, rects: &[ViewportRect]) -> Result<()> {
        let active = self.active.as_ref().ok_or_else(|| outside_pass("fill_rects"))?;
        if !active.recording {
            return Ok(());
        }
        let clear_rects = clear_rects(rects, active.extent);
        if clear_rects.is_empty() {
            return Ok(());
        }
        let attachments: Vec<vk::ClearAttachment> = (0..active.color_count)
            .map(|i| vk::ClearAttachment {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                color_attachment: i,
                clear_value: color_clear_value(color),
            })
            .collect();
        unsafe {
            self.ctx.device.cmd_clear_attachments(self.command_buffer(), &attachments, &clear_rects);
        }
        Ok(())
    }

    fn end_pass(&mut self) -> Result<()> {
        let Some(active) = self.active.take() else {
            engine_bail!("mrt::vulkan", "end_pass called without begin_pass");
        };
        if active.recording {
            unsafe { self.ctx.device.cmd_end_render_pass(self.command_buffer()) };
        }
        if active.resolves {
            for id in &active.attachments {
                if let Some(texture) = self.textures.get_mut(*id) {
                    texture.resolved = true;
                }
            }
        }
        Ok(())
    }

    fn commit_frame(&mut self) -> Result<()> {
        if self.active.is_some() {
            engine_bail!("mrt::vulkan", "commit_frame called inside a pass");
        }
        self.ensure_frame()?;

        // something has to be presented every frame
        if !self.frame.as_ref().is_some_and(|f| f.screen_pass_recorded) {
            self.begin_pass(None, &PassAction::default())?;
            self.end_pass()?;
        }

        let image_index = self.frame.take().and_then(|f| f.image_index);
        let sync = image_index.map(|index| {
            (self.swapchain.image_available(self.frame_index), self.swapchain.render_finished(index))
        });
        self.frames[self.frame_index].submit(sync)?;
        if let Some(index) = image_index {
            self.swapchain.present(index)?;
        }
        self.frame_index = (self.frame_index + 1) % self.frames.len();
        Ok(())
    }

    // ===== WINDOW =====

    fn quit_requested(&self) -> bool {
        self.quit
    }

    fn request_quit(&mut self) {
        self.quit = true;
    }
}

impl Drop for VulkanGraphicsDevice {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.device_wait_idle().ok();

            // 1. Resources and everything else holding an Arc<GpuContext>
            self.passes.clear();
            self.pipelines.clear();
            self.shaders.clear();
            self.meshes.clear();
            self.textures.clear();
            self.frames.clear();
            ManuallyDrop::drop(&mut self.swapchain);

            // 2. Device-owned objects
            self.ctx.device.destroy_sampler(self.sampler, None);
            self.ctx.device.destroy_command_pool(self.frame_command_pool, None);
            self.ctx.device.destroy_command_pool(self.ctx.upload_command_pool, None);

            // 3. Allocator frees its memory blocks while the device is alive
            match Arc::get_mut(&mut self.ctx) {
                Some(ctx) => ManuallyDrop::drop(&mut ctx.allocator),
                None => engine_warn!("mrt::vulkan", "GPU context still shared at shutdown, leaking allocator"),
            }

            // 4. No validation callbacks past this point
            debug::cleanup_debug_config();
            if let Some((debug_utils, messenger)) = self.debug_messenger.take() {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }

            // 5. Device and instance
            self.ctx.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_device_tests.rs"]
mod tests;
