/// Graphics device module - resource service trait, descriptors and handles

pub mod graphics_device;
pub mod handles;
pub mod features;
pub mod texture;
pub mod mesh;
pub mod shader;
pub mod pipeline;
pub mod render_pass;
pub mod draw_state;

pub use graphics_device::*;
pub use handles::*;
pub use features::*;
pub use texture::*;
pub use mesh::*;
pub use shader::*;
pub use pipeline::*;
pub use render_pass::*;
pub use draw_state::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
