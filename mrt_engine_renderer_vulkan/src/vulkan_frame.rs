/// Per-frame command recording resources
///
/// Each frame in flight owns a primary command buffer, the fence signalled
/// when its submission completes and a descriptor pool for the texture sets
/// bound during that frame. The pool is reset once the fence is waited on.

use ash::vk;
use mrt_engine::mrt::{Error, Result};
use mrt_engine::{engine_err, engine_error};
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Texture descriptor sets one frame can allocate
const SETS_PER_FRAME: u32 = 256;
/// Combined image samplers one frame can allocate
const SAMPLERS_PER_FRAME: u32 = 1024;

pub struct FrameResources {
    ctx: Arc<GpuContext>,
    pub(crate) command_buffer: vk::CommandBuffer,
    pub(crate) in_flight: vk::Fence,
    pub(crate) descriptor_pool: vk::DescriptorPool,
}

impl FrameResources {
    pub fn new(ctx: &Arc<GpuContext>, command_pool: vk::CommandPool) -> Result<Self> {
        unsafe {
            let alloc_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);
            let command_buffer = ctx.device.allocate_command_buffers(&alloc_info)
                .map_err(|e| {
                    engine_error!("mrt::vulkan", "Failed to allocate frame command buffer: {:?}", e);
                    Error::InitializationFailed(format!("Failed to allocate command buffer: {:?}", e))
                })?
                .into_iter()
                .next()
                .ok_or_else(|| Error::InitializationFailed("Driver returned no command buffer".to_string()))?;

            let mut this = Self {
                ctx: Arc::clone(ctx),
                command_buffer,
                in_flight: vk::Fence::null(),
                descriptor_pool: vk::DescriptorPool::null(),
            };

            // signalled so the first wait returns immediately
            let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);
            this.in_flight = ctx.device.create_fence(&fence_info, None).map_err(|e| {
                engine_error!("mrt::vulkan", "Failed to create frame fence: {:?}", e);
                Error::InitializationFailed(format!("Failed to create fence: {:?}", e))
            })?;

            let pool_sizes = [vk::DescriptorPoolSize {
                ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
                descriptor_count: SAMPLERS_PER_FRAME,
            }];
            let pool_info = vk::DescriptorPoolCreateInfo::default()
                .pool_sizes(&pool_sizes)
                .max_sets(SETS_PER_FRAME);
            this.descriptor_pool = ctx.device.create_descriptor_pool(&pool_info, None).map_err(|e| {
                engine_error!("mrt::vulkan", "Failed to create frame descriptor pool: {:?}", e);
                Error::InitializationFailed(format!("Failed to create descriptor pool: {:?}", e))
            })?;

            Ok(this)
        }
    }

    /// Wait until the previous submission of this frame slot retired, then
    /// reset its fence, descriptor pool and command buffer and start recording
    pub fn begin(&self) -> Result<()> {
        let device = &self.ctx.device;
        unsafe {
            device.wait_for_fences(&[self.in_flight], true, u64::MAX)
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to wait for frame fence: {:?}", e))?;
            device.reset_descriptor_pool(self.descriptor_pool, vk::DescriptorPoolResetFlags::empty())
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to reset frame descriptor pool: {:?}", e))?;
            device.reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to reset frame command buffer: {:?}", e))?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            device.begin_command_buffer(self.command_buffer, &begin_info)
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to begin frame command buffer: {:?}", e))?;
        }
        Ok(())
    }

    /// Allocate a set from this frame's pool
    pub fn allocate_set(&self, layout: vk::DescriptorSetLayout) -> Result<vk::DescriptorSet> {
        let layouts = [layout];
        let alloc_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.descriptor_pool)
            .set_layouts(&layouts);
        let sets = unsafe { self.ctx.device.allocate_descriptor_sets(&alloc_info) }
            .map_err(|e| engine_err!("mrt::vulkan",
                "Failed to allocate texture set (limit {} per frame): {:?}", SETS_PER_FRAME, e))?;
        sets.into_iter()
            .next()
            .ok_or_else(|| engine_err!("mrt::vulkan", "Driver returned no descriptor set"))
    }

    /// End recording and submit. With `swapchain_sync` the submission waits for
    /// the acquired image and signals the present semaphore.
    pub fn submit(&self, swapchain_sync: Option<(vk::Semaphore, vk::Semaphore)>) -> Result<()> {
        let device = &self.ctx.device;
        unsafe {
            device.end_command_buffer(self.command_buffer)
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to end frame command buffer: {:?}", e))?;
            device.reset_fences(&[self.in_flight])
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to reset frame fence: {:?}", e))?;

            let command_buffers = [self.command_buffer];
            let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
            let (wait, signal) = match swapchain_sync {
                Some((wait, signal)) => (vec![wait], vec![signal]),
                None => (Vec::new(), Vec::new()),
            };
            let mut submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
            if !wait.is_empty() {
                submit_info = submit_info
                    .wait_semaphores(&wait)
                    .wait_dst_stage_mask(&wait_stages)
                    .signal_semaphores(&signal);
            }

            device.queue_submit(self.ctx.graphics_queue, &[submit_info], self.in_flight)
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to submit frame commands: {:?}", e))?;
        }
        Ok(())
    }
}

impl Drop for FrameResources {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_descriptor_pool(self.descriptor_pool, None);
            self.ctx.device.destroy_fence(self.in_flight, None);
        }
    }
}
