/// GpuContext - device, allocator and upload queue shared by every GPU object
///
/// Textures, buffers, shaders, pipelines and passes keep an `Arc<GpuContext>`
/// and release their Vulkan objects in `Drop`. The logical device itself is
/// destroyed by `VulkanGraphicsDevice::drop` once every resource is gone.

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme, Allocator};
use gpu_allocator::MemoryLocation;
use mrt_engine::mrt::{Error, Result};
use mrt_engine::mrt::device::TextureFormat;
use mrt_engine::{engine_err, engine_error};
use std::mem::ManuallyDrop;
use std::sync::Mutex;

use crate::vulkan_format::texture_format_to_vk;

pub struct GpuContext {
    pub device: ash::Device,

    /// Dropped by hand before the device is destroyed
    pub allocator: ManuallyDrop<Mutex<Allocator>>,

    pub graphics_queue: vk::Queue,

    /// Pool for one-shot transfer and layout-transition commands
    pub upload_command_pool: vk::CommandPool,

    /// Format used wherever the engine asks for D24_UNORM_S8_UINT
    pub combined_depth_format: vk::Format,
}

impl GpuContext {
    pub fn new(
        device: ash::Device,
        allocator: Allocator,
        graphics_queue: vk::Queue,
        upload_command_pool: vk::CommandPool,
        combined_depth_format: vk::Format,
    ) -> Self {
        Self {
            device,
            allocator: ManuallyDrop::new(Mutex::new(allocator)),
            graphics_queue,
            upload_command_pool,
            combined_depth_format,
        }
    }

    /// Vulkan format backing an engine format on this GPU
    pub fn vk_format(&self, format: TextureFormat) -> vk::Format {
        match format {
            TextureFormat::D24_UNORM_S8_UINT => self.combined_depth_format,
            other => texture_format_to_vk(other),
        }
    }

    /// Allocate device memory; allocation failures map to `Error::OutOfMemory`
    pub fn allocate(
        &self,
        name: &str,
        requirements: vk::MemoryRequirements,
        location: MemoryLocation,
        linear: bool,
    ) -> Result<Allocation> {
        let mut allocator = self
            .allocator
            .lock()
            .map_err(|_| engine_err!("mrt::vulkan", "GPU allocator lock poisoned"))?;

        allocator
            .allocate(&AllocationCreateDesc {
                name,
                requirements,
                location,
                linear,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
            .map_err(|e| {
                let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                engine_error!("mrt::vulkan", "Out of GPU memory for '{}' ({:.2} MB): {:?}", name, size_mb, e);
                Error::OutOfMemory
            })
    }

    /// Return memory to the allocator. Used from `Drop`, so failures are ignored.
    pub fn free(&self, allocation: Allocation) {
        if let Ok(mut allocator) = self.allocator.lock() {
            allocator.free(allocation).ok();
        }
    }

    /// Record and submit a command buffer, then wait for the queue to drain
    pub fn one_shot<F>(&self, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        unsafe {
            let alloc_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(self.upload_command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffers = self.device.allocate_command_buffers(&alloc_info)
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to allocate upload command buffer: {:?}", e))?;
            let cb = command_buffers[0];

            let result = self.submit_one_shot(cb, record);
            self.device.free_command_buffers(self.upload_command_pool, &command_buffers);
            result
        }
    }

    unsafe fn submit_one_shot<F>(&self, cb: vk::CommandBuffer, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        self.device.begin_command_buffer(cb, &begin_info)
            .map_err(|e| engine_err!("mrt::vulkan", "Failed to begin upload command buffer: {:?}", e))?;

        record(&self.device, cb);

        self.device.end_command_buffer(cb)
            .map_err(|e| engine_err!("mrt::vulkan", "Failed to end upload command buffer: {:?}", e))?;

        let command_buffers = [cb];
        let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
        self.device.queue_submit(self.graphics_queue, &[submit_info], vk::Fence::null())
            .map_err(|e| engine_err!("mrt::vulkan", "Failed to submit upload commands: {:?}", e))?;
        self.device.queue_wait_idle(self.graphics_queue)
            .map_err(|e| engine_err!("mrt::vulkan", "Failed to wait for upload commands: {:?}", e))?;
        Ok(())
    }
}
