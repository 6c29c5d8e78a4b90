/// Unit tests for the capability gate

use super::*;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;

#[test]
fn test_supported_with_all_features() {
    let device = MockGraphicsDevice::new();
    assert!(mrt_supported(&device));
}

#[test]
fn test_unsupported_without_feature() {
    let device = MockGraphicsDevice::new().with_features(DeviceFeatures::MSAA_RENDER_TARGETS);
    assert!(!mrt_supported(&device));
}

#[test]
fn test_unsupported_with_too_few_attachments() {
    let device = MockGraphicsDevice::new().with_max_color_attachments(2);
    assert!(!mrt_supported(&device));
}

#[test]
fn test_sample_count_kept_with_msaa() {
    let device = MockGraphicsDevice::new();
    assert_eq!(effective_sample_count(&device, 4), 4);
    assert_eq!(effective_sample_count(&device, 0), 1);
}

#[test]
fn test_sample_count_clamped_without_msaa() {
    let device = MockGraphicsDevice::new().with_features(DeviceFeatures::MULTIPLE_RENDER_TARGET);
    assert_eq!(effective_sample_count(&device, 4), 1);
    assert_eq!(effective_sample_count(&device, 1), 1);
}
