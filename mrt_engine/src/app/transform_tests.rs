/// Unit tests for CubeTransform

use super::*;

#[test]
fn test_starts_at_zero() {
    let transform = CubeTransform::new(&MrtConfig::default());
    assert_eq!(transform.angles(), (0.0, 0.0));
}

#[test]
fn test_advance_adds_configured_steps() {
    let mut transform = CubeTransform::new(&MrtConfig::default());
    transform.advance();
    transform.advance();
    let (x, y) = transform.angles();
    assert!((x - 0.04).abs() < 1e-6);
    assert!((y - 0.02).abs() < 1e-6);
}

#[test]
fn test_angles_never_decrease() {
    let mut transform = CubeTransform::new(&MrtConfig::default());
    let mut previous = transform.angles();
    for _ in 0..100 {
        transform.advance();
        let current = transform.angles();
        assert!(current.0 >= previous.0 && current.1 >= previous.1);
        previous = current;
    }
}

#[test]
fn test_mvp_changes_every_frame() {
    let mut transform = CubeTransform::new(&MrtConfig::default());
    let mut previous = transform.model_view_projection();
    for _ in 0..10 {
        transform.advance();
        let current = transform.model_view_projection();
        assert_ne!(current, previous);
        previous = current;
    }
}

#[test]
fn test_zero_step_keeps_mvp() {
    let mut transform = CubeTransform::new(&MrtConfig::default().with_angle_step(0.0, 0.0));
    let before = transform.model_view_projection();
    transform.advance();
    assert_eq!(transform.model_view_projection(), before);
}

#[test]
fn test_initial_mvp_is_projection_times_translation() {
    let config = MrtConfig::default();
    let transform = CubeTransform::new(&config);
    let expected = transform.projection() * Mat4::from_translation(config.cube_position);
    assert!(transform.model_view_projection().abs_diff_eq(expected, 1e-6));
}

#[test]
fn test_uniform_block_layout() {
    assert_eq!(std::mem::size_of::<VsParams>(), 64);
    let transform = CubeTransform::new(&MrtConfig::default());
    let params = transform.uniforms();
    let bytes = bytemuck::bytes_of(&params);
    assert_eq!(bytes.len(), 64);
    assert_eq!(&bytes[..4], &params.model_view_projection.x_axis.x.to_ne_bytes());
}
