use super::*;

#[test]
fn test_rect_edges_and_area() {
    let r = ViewportRect::new(200, 0, 200, 100);
    assert_eq!(r.right(), 400);
    assert_eq!(r.bottom(), 100);
    assert_eq!(r.area(), 20_000);
}

#[test]
fn test_adjacent_rects_do_not_overlap() {
    let a = ViewportRect::new(0, 0, 200, 200);
    let b = ViewportRect::new(200, 0, 200, 200);
    assert!(!a.overlaps(&b));
    assert!(!b.overlaps(&a));
    assert!(a.overlaps(&ViewportRect::new(199, 199, 10, 10)));
}

#[test]
fn test_union() {
    let a = ViewportRect::new(0, 0, 200, 200);
    let b = ViewportRect::new(400, 0, 200, 200);
    assert_eq!(a.union(&b), ViewportRect::new(0, 0, 600, 200));
}

#[test]
fn test_draw_state_builder() {
    let state = DrawState::new(PipelineId::default(), MeshId::default())
        .with_fs_texture(TextureId::default());
    assert_eq!(state.fs_textures.len(), 1);
}
