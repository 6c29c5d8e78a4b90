//! Unit tests for swapchain parameter selection (no GPU required)

use super::*;

fn capabilities(current: (u32, u32), min_images: u32, max_images: u32) -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
        min_image_count: min_images,
        max_image_count: max_images,
        current_extent: vk::Extent2D { width: current.0, height: current.1 },
        min_image_extent: vk::Extent2D { width: 1, height: 1 },
        max_image_extent: vk::Extent2D { width: 4096, height: 4096 },
        ..Default::default()
    }
}

fn surface_format(format: vk::Format) -> vk::SurfaceFormatKHR {
    vk::SurfaceFormatKHR { format, color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR }
}

// ============================================================================
// FORMAT
// ============================================================================

#[test]
fn test_prefers_srgb_bgra() {
    let available = [
        surface_format(vk::Format::R8G8B8A8_UNORM),
        surface_format(vk::Format::B8G8R8A8_SRGB),
    ];
    let chosen = choose_surface_format(&available).map(|f| f.format);
    assert_eq!(chosen, Some(vk::Format::B8G8R8A8_SRGB));
}

#[test]
fn test_falls_back_to_unorm() {
    let available = [surface_format(vk::Format::R8G8B8A8_UNORM)];
    let chosen = choose_surface_format(&available).map(|f| f.format);
    assert_eq!(chosen, Some(vk::Format::R8G8B8A8_UNORM));
}

#[test]
fn test_no_describable_format() {
    let available = [surface_format(vk::Format::A2B10G10R10_UNORM_PACK32)];
    assert!(choose_surface_format(&available).is_none());
}

// ============================================================================
// PRESENT MODE
// ============================================================================

#[test]
fn test_vsync_uses_fifo() {
    let available = [vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::FIFO];
    assert_eq!(choose_present_mode(&available, true), vk::PresentModeKHR::FIFO);
}

#[test]
fn test_no_vsync_prefers_mailbox() {
    let available = [vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::FIFO];
    assert_eq!(choose_present_mode(&available, false), vk::PresentModeKHR::MAILBOX);
}

#[test]
fn test_no_vsync_without_alternatives() {
    let available = [vk::PresentModeKHR::FIFO];
    assert_eq!(choose_present_mode(&available, false), vk::PresentModeKHR::FIFO);
}

// ============================================================================
// EXTENT AND IMAGE COUNT
// ============================================================================

#[test]
fn test_extent_follows_surface() {
    let caps = capabilities((800, 600), 2, 3);
    assert_eq!(choose_extent(&caps, 640, 480), vk::Extent2D { width: 800, height: 600 });
}

#[test]
fn test_extent_from_window_is_clamped() {
    let caps = capabilities((u32::MAX, u32::MAX), 2, 3);
    assert_eq!(choose_extent(&caps, 640, 480), vk::Extent2D { width: 640, height: 480 });
    assert_eq!(choose_extent(&caps, 9000, 0), vk::Extent2D { width: 4096, height: 1 });
}

#[test]
fn test_image_count() {
    assert_eq!(choose_image_count(&capabilities((1, 1), 2, 3)), 3);
    assert_eq!(choose_image_count(&capabilities((1, 1), 3, 3)), 3);
    assert_eq!(choose_image_count(&capabilities((1, 1), 2, 0)), 3);
}
