use egui::{Pos2, Rect, Vec2};
use waferview::canvas::ViewTransform;
use waferview::components::selection::{SelectionModel, SelectionPhase, MIN_SELECTION_SIZE};

/// Identity mapping: control size equals image size, zoom 1.
fn identity_view() -> ViewTransform {
    let mut view = ViewTransform::new();
    view.set_control_size(Vec2::new(100.0, 80.0));
    view.set_image_size(100, 80);
    view
}

#[test]
fn drag_produces_the_bounding_box_in_any_direction() {
    let view = identity_view();
    let mut sel = SelectionModel::new();

    // Drag up-left: origin must still be the min corner.
    sel.start(Pos2::new(50.0, 40.0), &view);
    assert_eq!(sel.phase(), SelectionPhase::Dragging);
    sel.update(Pos2::new(20.0, 10.0), &view);
    let rect = sel.rect();
    assert_eq!(rect.min, Pos2::new(20.0, 10.0));
    assert_eq!(rect.max, Pos2::new(50.0, 40.0));

    assert!(sel.finish());
    assert_eq!(sel.phase(), SelectionPhase::Committed);
    assert_eq!(sel.rect(), Rect::from_min_max(Pos2::new(20.0, 10.0), Pos2::new(50.0, 40.0)));
}

#[test]
fn tiny_selection_collapses_on_finish() {
    let view = identity_view();
    let mut sel = SelectionModel::new();

    sel.start(Pos2::new(10.0, 10.0), &view);
    sel.update(Pos2::new(14.0, 30.0), &view); // 4 wide — below threshold
    assert!(!sel.finish());
    assert_eq!(sel.phase(), SelectionPhase::Idle);
    assert!(!sel.is_visible());
    assert_eq!(sel.rect().size(), Vec2::ZERO);
}

#[test]
fn six_by_six_survives_with_exact_bounds() {
    let view = identity_view();
    let mut sel = SelectionModel::new();

    sel.start(Pos2::new(10.0, 10.0), &view);
    sel.update(Pos2::new(16.0, 16.0), &view);
    assert!(sel.finish());
    assert!(sel.is_valid());
    assert_eq!(sel.rect(), Rect::from_min_max(Pos2::new(10.0, 10.0), Pos2::new(16.0, 16.0)));
}

#[test]
fn validity_needs_both_axes_above_threshold() {
    let view = identity_view();
    let mut sel = SelectionModel::new();

    sel.start(Pos2::new(0.0, 0.0), &view);
    sel.update(Pos2::new(50.0, MIN_SELECTION_SIZE), &view); // height == threshold
    // Still dragging: visible but height not *above* the threshold.
    assert!(!sel.is_valid());
    sel.update(Pos2::new(50.0, 50.0), &view);
    assert!(sel.is_valid());
}

#[test]
fn reset_clears_everything() {
    let view = identity_view();
    let mut sel = SelectionModel::new();
    sel.start(Pos2::new(5.0, 5.0), &view);
    sel.update(Pos2::new(60.0, 60.0), &view);
    sel.finish();

    sel.reset();
    assert_eq!(sel.phase(), SelectionPhase::Idle);
    assert!(!sel.is_visible());
    assert!(!sel.is_valid());
    assert_eq!(sel.rect().size(), Vec2::ZERO);
}

#[test]
fn drag_outside_the_image_pins_to_the_edge() {
    let view = identity_view();
    let mut sel = SelectionModel::new();

    sel.start(Pos2::new(90.0, 70.0), &view);
    // The pointer leaves the image; the anchor normalization clamps the
    // moving corner to the image bounds.
    sel.update(Pos2::new(150.0, 120.0), &view);
    let rect = sel.rect();
    assert_eq!(rect.max, Pos2::new(100.0, 80.0));
    assert_eq!(rect.min, Pos2::new(90.0, 70.0));
}

#[test]
fn committed_rect_can_be_installed_directly() {
    let mut sel = SelectionModel::new();
    let rect = Rect::from_min_size(Pos2::new(12.0, 8.0), Vec2::new(40.0, 30.0));
    sel.set_committed_rect(rect);
    assert_eq!(sel.phase(), SelectionPhase::Committed);
    assert!(sel.is_valid());
    assert_eq!(sel.rect(), rect);
}

#[test]
fn update_after_finish_is_ignored() {
    let view = identity_view();
    let mut sel = SelectionModel::new();
    sel.start(Pos2::new(10.0, 10.0), &view);
    sel.update(Pos2::new(40.0, 40.0), &view);
    sel.finish();

    let before = sel.rect();
    sel.update(Pos2::new(70.0, 70.0), &view);
    assert_eq!(sel.rect(), before);
}
