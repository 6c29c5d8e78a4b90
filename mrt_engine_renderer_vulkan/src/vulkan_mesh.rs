/// Mesh - vertex buffer, optional index buffer and primitive groups

use ash::vk;
use mrt_engine::mrt::Result;
use mrt_engine::mrt::device::{MeshDesc, PrimitiveGroup};
use mrt_engine::engine_debug;
use std::sync::Arc;

use crate::vulkan_buffer::Buffer;
use crate::vulkan_context::GpuContext;
use crate::vulkan_format::index_type_to_vk;

pub struct VulkanMesh {
    pub(crate) vertex_buffer: Buffer,
    pub(crate) index_buffer: Option<(Buffer, vk::IndexType)>,
    pub(crate) primitive_groups: Vec<PrimitiveGroup>,
}

impl VulkanMesh {
    pub fn new(ctx: &Arc<GpuContext>, desc: &MeshDesc) -> Result<Self> {
        desc.validate()?;

        let vertex_buffer = Buffer::with_data(
            ctx,
            &format!("{}_vertices", desc.name),
            vk::BufferUsageFlags::VERTEX_BUFFER,
            &desc.vertex_data,
        )?;

        let index_buffer = match index_type_to_vk(desc.index_type) {
            Some(index_type) => Some((
                Buffer::with_data(
                    ctx,
                    &format!("{}_indices", desc.name),
                    vk::BufferUsageFlags::INDEX_BUFFER,
                    &desc.index_data,
                )?,
                index_type,
            )),
            None => None,
        };

        engine_debug!("mrt::vulkan", "Mesh '{}': {} vertex bytes, {} index bytes",
            desc.name,
            vertex_buffer.size,
            index_buffer.as_ref().map_or(0, |(buffer, _)| buffer.size));

        Ok(Self {
            vertex_buffer,
            index_buffer,
            primitive_groups: desc.primitive_groups.clone(),
        })
    }

    /// Record the draw of one primitive group; buffers must already be bound
    pub fn record_draw(&self, device: &ash::Device, cb: vk::CommandBuffer, group: &PrimitiveGroup) {
        unsafe {
            if self.index_buffer.is_some() {
                device.cmd_draw_indexed(cb, group.num_elements, 1, group.base_element, 0, 0);
            } else {
                device.cmd_draw(cb, group.num_elements, 1, group.base_element, 0);
            }
        }
    }

    pub fn bind(&self, device: &ash::Device, cb: vk::CommandBuffer) {
        unsafe {
            device.cmd_bind_vertex_buffers(cb, 0, &[self.vertex_buffer.buffer], &[0]);
            if let Some((buffer, index_type)) = &self.index_buffer {
                device.cmd_bind_index_buffer(cb, buffer.buffer, 0, *index_type);
            }
        }
    }
}
