/// Unit tests for MrtConfig

use super::*;

#[test]
fn test_defaults() {
    let config = MrtConfig::default();
    assert_eq!((config.display_width, config.display_height), (640, 480));
    assert_eq!((config.offscreen_width, config.offscreen_height), (200, 200));
    assert_eq!(config.sample_count, 4);
    assert_eq!(config.window_title, "MRT Sample");
    assert_eq!(config.attachment_clear_colors[0], Vec4::new(0.25, 0.0, 0.0, 1.0));
    assert_eq!(config.attachment_clear_colors[1], Vec4::new(0.0, 0.25, 0.0, 1.0));
    assert_eq!(config.attachment_clear_colors[2], Vec4::new(0.0, 0.0, 0.25, 1.0));
    assert_eq!(config.display_clear_color, Vec4::new(0.5, 0.5, 0.5, 1.0));
    assert_eq!(config.fallback_clear_color, Vec4::new(0.5, 0.0, 0.0, 1.0));
    assert_eq!(config.angle_step, Vec2::new(0.02, 0.01));
}

#[test]
fn test_builders() {
    let colors = [Vec4::ONE, Vec4::ZERO, Vec4::ONE];
    let config = MrtConfig::default()
        .with_display_size(800, 600)
        .with_window_title("test")
        .with_offscreen_size(100, 50)
        .with_sample_count(1)
        .with_attachment_clear_colors(colors)
        .with_angle_step(0.5, 0.25);

    assert_eq!((config.display_width, config.display_height), (800, 600));
    assert_eq!(config.window_title, "test");
    assert_eq!(config.sample_count, 1);
    assert_eq!(config.attachment_clear_colors, colors);
    assert_eq!(config.angle_step, Vec2::new(0.5, 0.25));
    assert_eq!(config.offscreen_aspect(), 2.0);
}
