/// Unit tests for MrtPassBuilder

use super::*;
use crate::graphics_device::{ResourceId, ResourceKind};
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;

fn builder() -> MrtPassBuilder {
    MrtPassBuilder::new(200, 200, 4).with_clear_colors([
        Vec4::new(0.25, 0.0, 0.0, 1.0),
        Vec4::new(0.0, 0.25, 0.0, 1.0),
        Vec4::new(0.0, 0.0, 0.25, 1.0),
    ])
}

// ============================================================================
// Descriptors
// ============================================================================

#[test]
fn test_only_first_surface_has_depth() {
    let descs = builder().surface_descs();
    assert_eq!(descs[0].depth_format, Some(MRT_DEPTH_FORMAT));
    assert_eq!(descs[1].depth_format, None);
    assert_eq!(descs[2].depth_format, None);
    for desc in &descs {
        assert_eq!((desc.width, desc.height, desc.sample_count), (200, 200, 4));
        assert_eq!(desc.format, MRT_COLOR_FORMAT);
    }
}

#[test]
fn test_store_action_depends_on_sample_count() {
    assert_eq!(MrtPassBuilder::new(8, 8, 4).store_action(), StoreAction::Resolve);
    assert_eq!(MrtPassBuilder::new(8, 8, 1).store_action(), StoreAction::Store);
    assert_eq!(MrtPassBuilder::new(8, 8, 0).sample_count, 1);
}

// ============================================================================
// Build
// ============================================================================

#[test]
fn test_build_creates_three_surfaces_and_one_pass() {
    let mut device = MockGraphicsDevice::new();
    let mut arena = ResourceArena::new();
    let targets = builder().build(&mut device, &mut arena).unwrap();

    assert_eq!(device.created_count(ResourceKind::Texture), 3);
    assert_eq!(device.created_count(ResourceKind::Pass), 1);
    assert_eq!(arena.len(), 4);

    let pass = device.pass_desc(targets.pass).unwrap();
    assert_eq!(pass.color_textures(), targets.surfaces.to_vec());
    assert_eq!(pass.depth_stencil_texture, Some(targets.surfaces[0]));
    assert_eq!(pass.store_action, StoreAction::Resolve);
    assert_eq!(pass.color_attachments[0].clear_color, Vec4::new(0.25, 0.0, 0.0, 1.0));
    assert_eq!(pass.color_attachments[1].clear_color, Vec4::new(0.0, 0.25, 0.0, 1.0));
    assert_eq!(pass.color_attachments[2].clear_color, Vec4::new(0.0, 0.0, 0.25, 1.0));
}

#[test]
fn test_attachment_order_follows_creation_order() {
    let mut device = MockGraphicsDevice::new();
    let mut arena = ResourceArena::new();
    let targets = builder().build(&mut device, &mut arena).unwrap();

    let order: Vec<ResourceId> = targets.surfaces.iter().map(|&t| t.into()).collect();
    assert_eq!(&device.creation_order()[..3], order.as_slice());
    assert!(device.texture_desc(targets.surfaces[0]).unwrap().depth_format.is_some());
}

#[test]
fn test_build_refused_below_attachment_limit() {
    let mut device = MockGraphicsDevice::new().with_max_color_attachments(2);
    let mut arena = ResourceArena::new();
    assert!(builder().build(&mut device, &mut arena).is_err());
    assert_eq!(device.total_created(), 0);
}

#[test]
fn test_surface_failure_is_atomic() {
    let mut device = MockGraphicsDevice::new().fail_creation(ResourceKind::Texture, 3);
    let mut arena = ResourceArena::new();

    assert!(builder().build(&mut device, &mut arena).is_err());
    assert_eq!(device.created_count(ResourceKind::Texture), 2);
    assert_eq!(device.destroyed_count(ResourceKind::Texture), 2);
    assert_eq!(device.created_count(ResourceKind::Pass), 0);
    assert!(arena.is_empty());
}

#[test]
fn test_pass_failure_is_atomic() {
    let mut device = MockGraphicsDevice::new().fail_creation(ResourceKind::Pass, 1);
    let mut arena = ResourceArena::new();

    assert!(builder().build(&mut device, &mut arena).is_err());
    assert_eq!(device.live_count(), 0);
    assert_eq!(device.total_created(), device.total_destroyed());
}

#[test]
fn test_failure_keeps_earlier_arena_entries() {
    let mut device = MockGraphicsDevice::new().fail_creation(ResourceKind::Pass, 1);
    let mut arena = ResourceArena::new();
    let earlier = device.create_texture(&TextureDesc::render_target(4, 4)).unwrap();
    arena.track(earlier);

    assert!(builder().build(&mut device, &mut arena).is_err());
    assert_eq!(arena.len(), 1);
    assert_eq!(device.live_count(), 1);
}
