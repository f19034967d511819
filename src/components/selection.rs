// ============================================================================
// SELECTION MODEL — rectangular drag selection in view coordinates
// ============================================================================

use eframe::egui;
use egui::{Pos2, Rect};

use crate::canvas::ViewTransform;

/// Selections narrower or shorter than this many view units collapse when
/// the drag ends — an accidental click-drag never leaves a sliver selected.
pub const MIN_SELECTION_SIZE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Idle,
    Dragging,
    Committed,
}

/// Rectangular selection driven by pointer-down / pointer-move / pointer-up,
/// expressed in view coordinates.
///
/// The anchor point is normalized through a view→image→view round trip so it
/// sits on the displayed pixel lattice; because the image-bound mapping
/// clamps, dragging outside the displayed image pins the rect to the image
/// edge instead of running off into the letterbox margin.
pub struct SelectionModel {
    phase: SelectionPhase,
    anchor: Pos2,
    rect: Rect,
    visible: bool,
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionModel {
    pub fn new() -> Self {
        Self {
            phase: SelectionPhase::Idle,
            anchor: Pos2::ZERO,
            rect: Rect::from_min_size(Pos2::ZERO, egui::Vec2::ZERO),
            visible: false,
        }
    }

    /// Pointer-down: begin a drag with a zero-size rect at the anchor.
    pub fn start(&mut self, view_pt: Pos2, view: &ViewTransform) {
        let anchor = view.to_view(view.to_image(view_pt));
        self.phase = SelectionPhase::Dragging;
        self.anchor = anchor;
        self.rect = Rect::from_min_size(anchor, egui::Vec2::ZERO);
        self.visible = true;
    }

    /// Pointer-move while dragging: the rect is the axis-aligned bounding box
    /// of the anchor and the current (normalized) point.
    pub fn update(&mut self, view_pt: Pos2, view: &ViewTransform) {
        if self.phase != SelectionPhase::Dragging {
            return;
        }
        let current = view.to_view(view.to_image(view_pt));
        let min = Pos2::new(self.anchor.x.min(current.x), self.anchor.y.min(current.y));
        let max = Pos2::new(self.anchor.x.max(current.x), self.anchor.y.max(current.y));
        self.rect = Rect::from_min_max(min, max);
    }

    /// Pointer-up: commit the rect, or collapse it when it is below the
    /// minimum size on either axis. Returns whether a selection survived.
    pub fn finish(&mut self) -> bool {
        if self.phase != SelectionPhase::Dragging {
            return self.phase == SelectionPhase::Committed;
        }
        if self.rect.width() < MIN_SELECTION_SIZE || self.rect.height() < MIN_SELECTION_SIZE {
            self.reset();
            false
        } else {
            self.phase = SelectionPhase::Committed;
            true
        }
    }

    /// Collapse to Idle: hidden, zero rect. Called after any operation that
    /// consumes the selection.
    pub fn reset(&mut self) {
        self.phase = SelectionPhase::Idle;
        self.rect = Rect::from_min_size(Pos2::ZERO, egui::Vec2::ZERO);
        self.visible = false;
    }

    /// Install a committed, visible rect directly — paste uses this to make
    /// the pasted region the new selection.
    pub fn set_committed_rect(&mut self, view_rect: Rect) {
        self.phase = SelectionPhase::Committed;
        self.rect = view_rect;
        self.visible = true;
    }

    /// A selection is usable once it is visible and exceeds the minimum
    /// size on both axes. The session adds the image-loaded condition.
    pub fn is_valid(&self) -> bool {
        self.visible
            && self.rect.width() > MIN_SELECTION_SIZE
            && self.rect.height() > MIN_SELECTION_SIZE
    }

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == SelectionPhase::Dragging
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Current rect in view coordinates.
    pub fn rect(&self) -> Rect {
        self.rect
    }
}
