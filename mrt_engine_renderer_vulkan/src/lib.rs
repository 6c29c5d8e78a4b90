/*!
# MRT Engine - Vulkan Backend

Vulkan implementation of the `GraphicsDevice` trait from `mrt_engine`,
built on ash for the bindings and gpu-allocator for device memory.

Multisampled render targets carry a single-sample resolve image, passes
resolve into those images, and pipelines write any number of color
attachments. Uniform blocks are push constants; sampled textures are
combined image samplers in descriptor set 0.

```no_run
use mrt_engine_renderer_vulkan::{VulkanConfig, VulkanGraphicsDevice};
# fn demo(window: &winit::window::Window) -> mrt_engine::mrt::Result<()> {
let size = window.inner_size();
let device = VulkanGraphicsDevice::new(window, size.width, size.height, VulkanConfig::default())?;
# Ok(())
# }
```
*/

mod vulkan_config;
mod vulkan_context;
mod vulkan_format;
mod vulkan_buffer;
mod vulkan_texture;
mod vulkan_mesh;
mod vulkan_shader;
mod vulkan_pipeline;
mod vulkan_render_pass;
mod vulkan_swapchain;
mod vulkan_frame;
mod vulkan_device;
mod debug;

pub use vulkan_config::{VulkanConfig, DebugSeverity, DebugOutput};
pub use vulkan_device::VulkanGraphicsDevice;

// Validation layer statistics
pub use debug::{get_validation_stats, print_validation_stats_report, ValidationStats};
