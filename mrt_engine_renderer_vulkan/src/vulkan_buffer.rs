/// Buffer - host-visible vertex and index buffers

use ash::vk;
use gpu_allocator::vulkan::Allocation;
use gpu_allocator::MemoryLocation;
use mrt_engine::mrt::Result;
use mrt_engine::engine_err;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

pub struct Buffer {
    ctx: Arc<GpuContext>,
    pub(crate) buffer: vk::Buffer,
    allocation: Option<Allocation>,
    pub(crate) size: u64,
}

impl Buffer {
    /// Create a CPU-visible buffer holding a copy of `data`
    pub fn with_data(
        ctx: &Arc<GpuContext>,
        name: &str,
        usage: vk::BufferUsageFlags,
        data: &[u8],
    ) -> Result<Self> {
        let size = data.len().max(1) as u64;
        unsafe {
            let buffer_create_info = vk::BufferCreateInfo::default()
                .size(size)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = ctx.device.create_buffer(&buffer_create_info, None)
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to create buffer '{}' of {} bytes: {:?}", name, size, e))?;

            let mut this = Self {
                ctx: Arc::clone(ctx),
                buffer,
                allocation: None,
                size,
            };

            let requirements = ctx.device.get_buffer_memory_requirements(buffer);
            let allocation = this.allocation.insert(
                ctx.allocate(name, requirements, MemoryLocation::CpuToGpu, true)?,
            );
            ctx.device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset())
                .map_err(|e| engine_err!("mrt::vulkan", "Failed to bind memory of buffer '{}': {:?}", name, e))?;

            let mapped = allocation
                .mapped_ptr()
                .ok_or_else(|| engine_err!("mrt::vulkan", "Buffer '{}' is not CPU-accessible", name))?
                .as_ptr() as *mut u8;
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped, data.len());

            Ok(this)
        }
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            if let Some(allocation) = self.allocation.take() {
                self.ctx.free(allocation);
            }
            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
