/*!
# MRT Engine

Core types for the multiple-render-target sample.

A rotating cube is rendered once per frame into three offscreen surfaces
bound to a single pass, then the resolved surfaces are composited side by
side on screen. Devices without multi-target support get a fallback screen
that names the missing capability.

## Architecture

- **GraphicsDevice**: handle-based resource service implemented by backends
- **MrtApp**: Init / Running / Cleanup state machine driving the sample
- **MrtPassBuilder**: offscreen surfaces and the pass binding them
- **DebugText**: bitmap-font text drawn with solid rectangles
- **ShapeBuilder**: procedural box meshes

Backend implementations (Vulkan) live in their own crates.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod shapes;
pub mod debug_text;
pub mod app;

// Main mrt namespace module
pub mod mrt {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging hub
    pub use crate::engine::Engine;

    // Logging sub-module (types only, macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, format_entry};
    }

    // Graphics device trait and descriptors
    pub mod device {
        pub use crate::graphics_device::*;
    }

    pub mod shapes {
        pub use crate::shapes::*;
    }

    pub mod text {
        pub use crate::debug_text::*;
    }

    // Sample application
    pub mod app {
        pub use crate::app::*;
    }
}

// Re-export math library at crate root
pub use glam;
