/// Vulkan backend configuration

use mrt_engine::mrt::device::DeviceFeatures;

/// Which validation messages reach the debug callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    ErrorsOnly,
    ErrorsAndWarnings,
    All,
}

/// Where validation messages are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugOutput {
    Console,
    File(String),
    Both(String),
}

/// Settings for `VulkanGraphicsDevice::new`
#[derive(Debug, Clone)]
pub struct VulkanConfig {
    /// Reported to the driver in `VkApplicationInfo`
    pub app_name: String,

    /// Enable `VK_LAYER_KHRONOS_validation`. Only honored when the crate is
    /// built with the `vulkan-validation` feature.
    pub enable_validation: bool,

    pub debug_severity: DebugSeverity,

    pub debug_output: DebugOutput,

    /// Abort the process on the first validation error
    pub break_on_validation_error: bool,

    /// Frames recorded ahead of the GPU
    pub frames_in_flight: usize,

    /// FIFO presentation when true, MAILBOX/IMMEDIATE otherwise
    pub vsync: bool,

    /// Features hidden from the application even when the GPU has them
    pub disabled_features: DeviceFeatures,
}

impl Default for VulkanConfig {
    fn default() -> Self {
        Self {
            app_name: "MRT Sample".to_string(),
            enable_validation: cfg!(debug_assertions),
            debug_severity: DebugSeverity::ErrorsAndWarnings,
            debug_output: DebugOutput::Console,
            break_on_validation_error: false,
            frames_in_flight: 2,
            vsync: true,
            disabled_features: DeviceFeatures::empty(),
        }
    }
}

impl VulkanConfig {
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.enable_validation = enabled;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_disabled_features(mut self, features: DeviceFeatures) -> Self {
        self.disabled_features = features;
        self
    }

    /// Validation is active only when requested and compiled in
    pub fn validation_active(&self) -> bool {
        cfg!(feature = "vulkan-validation") && self.enable_validation
    }
}
