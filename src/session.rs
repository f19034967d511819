// ============================================================================
// EDIT SESSION — orchestrates history, selection, view mapping and the
// operation gateway around the current image snapshot
// ============================================================================

use eframe::egui::{Pos2, Rect, Vec2};
use std::time::Instant;

use crate::canvas::{PixelBuffer, ViewTransform};
use crate::components::history::HistoryManager;
use crate::components::processor::{FilterOp, ImageProcessor, ProcessError};
use crate::components::selection::SelectionModel;
use crate::ops::clipboard;

/// Engine-level error taxonomy. Every variant is recoverable: the session
/// stays usable, and failed operations leave the current snapshot and the
/// history untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An operation was requested with no loaded image.
    NoImage,
    /// A region edit was requested without a valid selection where one is
    /// mandatory.
    NoSelection,
    /// Paste requested while both clipboard slots are empty.
    EmptyClipboard,
    /// The gateway rejected the operation (bad parameter, missing forward
    /// transform).
    Process(ProcessError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NoImage => write!(f, "no image is loaded"),
            EngineError::NoSelection => write!(f, "no valid selection"),
            EngineError::EmptyClipboard => write!(f, "clipboard is empty"),
            EngineError::Process(e) => write!(f, "{}", e),
        }
    }
}

impl From<ProcessError> for EngineError {
    fn from(e: ProcessError) -> Self {
        EngineError::Process(e)
    }
}

/// What a committed operation reports back to the UI: the history
/// description and how long the pixels took to process.
#[derive(Debug, Clone)]
pub struct OpReport {
    pub description: String,
    pub elapsed_ms: u128,
}

/// One interactive editing session over one image.
///
/// Owns the current snapshot and its collaborators — history, selection,
/// gateway, view transform — injected at construction. No globals: two
/// sessions never share state (the process-wide clipboard slot is the one
/// deliberate exception).
///
/// All mutating entry points are synchronous and run to completion; a
/// failed operation performs no partial mutation and records no history.
pub struct EditSession {
    current: Option<PixelBuffer>,
    history: HistoryManager,
    selection: SelectionModel,
    processor: ImageProcessor,
    view: ViewTransform,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditSession {
    pub fn new() -> Self {
        Self {
            current: None,
            history: HistoryManager::default(),
            selection: SelectionModel::new(),
            processor: ImageProcessor::new(),
            view: ViewTransform::new(),
        }
    }

    // -- image lifecycle -------------------------------------------------

    /// Install a freshly decoded image as the current snapshot. Clears the
    /// history, the selection, and any stored Fourier spectrum.
    pub fn load(&mut self, image: PixelBuffer) {
        self.view.set_image_size(image.width(), image.height());
        self.current = Some(image);
        self.history.clear();
        self.selection.reset();
        self.processor.clear_fourier_data();
    }

    pub fn has_image(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&PixelBuffer> {
        self.current.as_ref()
    }

    // -- filters ---------------------------------------------------------

    /// Run a named gateway operation against the current image and commit
    /// the result. The kernel runs on a working copy, so a gateway error
    /// leaves both the snapshot and the history exactly as they were.
    pub fn apply_filter(
        &mut self,
        op: FilterOp,
        param: Option<i32>,
    ) -> Result<OpReport, EngineError> {
        let current = self.current.as_ref().ok_or(EngineError::NoImage)?;

        let start = Instant::now();
        let mut working = current.clone();
        self.processor.apply(op, &mut working, param)?;
        let elapsed_ms = start.elapsed().as_millis();

        self.commit(working, op.label());
        Ok(OpReport {
            description: op.label().to_string(),
            elapsed_ms,
        })
    }

    // -- undo / redo -----------------------------------------------------

    /// Step back one snapshot. Returns the undone operation's description,
    /// or `None` when the undo stack is empty (a no-op, not an error).
    pub fn undo(&mut self) -> Option<String> {
        let current = self.current.as_mut()?;
        let description = self.history.undo(current)?;
        // The stored spectrum was computed from the snapshot we just left;
        // once history moves it is stale.
        self.processor.clear_fourier_data();
        self.view.set_image_size(current.width(), current.height());
        Some(description)
    }

    /// Step forward one snapshot; symmetric to [`EditSession::undo`].
    pub fn redo(&mut self) -> Option<String> {
        let current = self.current.as_mut()?;
        let description = self.history.redo(current)?;
        self.processor.clear_fourier_data();
        self.view.set_image_size(current.width(), current.height());
        Some(description)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    // -- clipboard-backed region editing ---------------------------------

    /// Copy the selected region into the clipboard. Does not mutate the
    /// image and therefore records no history. Returns `Ok(None)` when the
    /// clamped region is empty (silent no-op).
    pub fn copy(&mut self) -> Result<Option<OpReport>, EngineError> {
        let rect = self.selection_image_rect()?;
        let current = self.current.as_ref().ok_or(EngineError::NoImage)?;

        let start = Instant::now();
        let Some(region) = clipboard::crop(current, rect) else {
            return Ok(None);
        };
        clipboard::set_clipboard(region);
        Ok(Some(OpReport {
            description: "Copy".into(),
            elapsed_ms: start.elapsed().as_millis(),
        }))
    }

    /// Cut: copy the selected region into the clipboard, then zero it in
    /// the image. Commits one history entry and consumes the selection.
    pub fn cut(&mut self) -> Result<Option<OpReport>, EngineError> {
        let rect = self.selection_image_rect()?;
        let current = self.current.as_ref().ok_or(EngineError::NoImage)?;

        let start = Instant::now();
        let Some(region) = clipboard::crop(current, rect) else {
            return Ok(None);
        };
        let Some(cleared) = clipboard::clear_region(current, rect) else {
            return Ok(None);
        };
        clipboard::set_clipboard(region);
        self.commit(cleared, "Cut");
        self.selection.reset();
        Ok(Some(OpReport {
            description: "Cut".into(),
            elapsed_ms: start.elapsed().as_millis(),
        }))
    }

    /// Delete: zero the selected region without touching the clipboard.
    /// Commits one history entry and consumes the selection.
    pub fn delete_selection(&mut self) -> Result<Option<OpReport>, EngineError> {
        let rect = self.selection_image_rect()?;
        let current = self.current.as_ref().ok_or(EngineError::NoImage)?;

        let start = Instant::now();
        let Some(cleared) = clipboard::clear_region(current, rect) else {
            return Ok(None);
        };
        self.commit(cleared, "Delete Selection");
        self.selection.reset();
        Ok(Some(OpReport {
            description: "Delete Selection".into(),
            elapsed_ms: start.elapsed().as_millis(),
        }))
    }

    /// Paste the clipboard at the valid selection's top-left (image space),
    /// or at the origin when there is no valid selection. The pasted
    /// rectangle becomes the new committed selection so it can be moved or
    /// cut again immediately.
    pub fn paste(&mut self) -> Result<OpReport, EngineError> {
        let current = self.current.as_ref().ok_or(EngineError::NoImage)?;
        let region = clipboard::get_clipboard().ok_or(EngineError::EmptyClipboard)?;

        let (x, y) = if self.has_valid_selection() {
            let anchor = self.view.to_image(self.selection.rect().min);
            (anchor.x as i32, anchor.y as i32)
        } else {
            (0, 0)
        };

        let start = Instant::now();
        let pasted = clipboard::paste_over(current, &region, x, y);
        let elapsed_ms = start.elapsed().as_millis();

        self.commit(pasted, "Paste");

        let pasted_rect = Rect::from_min_size(
            Pos2::new(x as f32, y as f32),
            Vec2::new(region.width() as f32, region.height() as f32),
        );
        self.selection.set_committed_rect(self.view.to_view_rect(pasted_rect));

        Ok(OpReport {
            description: "Paste".into(),
            elapsed_ms,
        })
    }

    /// Whether paste currently has anything to paste.
    pub fn can_paste(&self) -> bool {
        self.has_image() && clipboard::has_clipboard_content()
    }

    // -- selection -------------------------------------------------------

    pub fn start_selection(&mut self, view_pt: Pos2) {
        if !self.has_image() {
            return;
        }
        self.selection.start(view_pt, &self.view);
    }

    pub fn update_selection(&mut self, view_pt: Pos2) {
        self.selection.update(view_pt, &self.view);
    }

    pub fn finish_selection(&mut self) -> bool {
        self.selection.finish()
    }

    pub fn reset_selection(&mut self) {
        self.selection.reset();
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Image loaded ∧ selection visible ∧ above the minimum size.
    pub fn has_valid_selection(&self) -> bool {
        self.has_image() && self.selection.is_valid()
    }

    // -- view ------------------------------------------------------------

    pub fn set_control_size(&mut self, size: Vec2) {
        self.view.set_control_size(size);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.view.set_zoom(zoom);
    }

    pub fn zoom(&self) -> f32 {
        self.view.zoom()
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn has_fourier_data(&self) -> bool {
        self.processor.has_fourier_data()
    }

    // -- internals -------------------------------------------------------

    /// Push the replaced snapshot onto the undo stack and install the new
    /// one as current. Checkpoint-then-swap keeps the two stacks and the
    /// snapshot consistent even mid-panic.
    fn commit(&mut self, new_current: PixelBuffer, description: &str) {
        if let Some(slot) = self.current.as_mut() {
            let replaced = std::mem::replace(slot, new_current);
            self.history.checkpoint(replaced, description);
        }
    }

    /// The committed selection mapped to image space, or `NoSelection`.
    fn selection_image_rect(&self) -> Result<Rect, EngineError> {
        if !self.has_valid_selection() {
            return Err(EngineError::NoSelection);
        }
        Ok(self.view.to_image_rect(self.selection.rect()))
    }
}
