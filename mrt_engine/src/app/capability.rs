/// Capability gate: decides once at init whether the multi-target path can run

use crate::graphics_device::{GraphicsDevice, DeviceFeatures};
use crate::{engine_info, engine_warn};

/// Color attachments written by the offscreen pass
pub const MRT_ATTACHMENT_COUNT: usize = 3;

/// Capability the fallback display reports as missing
pub const MRT_FEATURE_NAME: &str = "MultipleRenderTarget";

/// True when `device` can bind all offscreen targets in one pass
///
/// Requires the multiple-render-target feature and at least
/// [`MRT_ATTACHMENT_COUNT`] color attachments.
pub fn mrt_supported(device: &dyn GraphicsDevice) -> bool {
    if !device.query_feature(DeviceFeatures::MULTIPLE_RENDER_TARGET) {
        engine_warn!("mrt::capability", "{} not supported, using fallback display", MRT_FEATURE_NAME);
        return false;
    }
    let max = device.max_color_attachments();
    if (max as usize) < MRT_ATTACHMENT_COUNT {
        engine_warn!(
            "mrt::capability",
            "device binds {} color attachments, {} required, using fallback display",
            max,
            MRT_ATTACHMENT_COUNT
        );
        return false;
    }
    engine_info!("mrt::capability", "{} supported ({} color attachments)", MRT_FEATURE_NAME, max);
    true
}

/// Sample count the offscreen targets can actually use
pub fn effective_sample_count(device: &dyn GraphicsDevice, requested: u32) -> u32 {
    let requested = requested.max(1);
    if requested > 1 && !device.query_feature(DeviceFeatures::MSAA_RENDER_TARGETS) {
        engine_warn!(
            "mrt::capability",
            "multisampled render targets not supported, using 1 sample instead of {}",
            requested
        );
        return 1;
    }
    requested
}

#[cfg(test)]
#[path = "capability_tests.rs"]
mod tests;
