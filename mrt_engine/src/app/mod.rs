/// MRT sample application: capability gate, multi-target pass, offscreen and
/// composite stages, fallback display and the Init/Running/Cleanup driver

pub mod config;
pub mod capability;
pub mod resources;
pub mod transform;
pub mod mrt_pass;
pub mod offscreen;
pub mod composite;
pub mod fallback;
pub mod mrt_app;

pub use config::*;
pub use capability::*;
pub use resources::*;
pub use transform::*;
pub use mrt_pass::*;
pub use offscreen::*;
pub use composite::*;
pub use fallback::*;
pub use mrt_app::*;
