// ============================================================================
// APPLICATION SHELL — menus, canvas display, selection drag, dialogs
// ============================================================================

use eframe::egui;
use egui::{Color32, Key, Pos2, Rect, Stroke, TextureHandle, TextureOptions, Vec2};

use crate::components::processor::FilterOp;
use crate::io::FileHandler;
use crate::logger;
use crate::session::{EditSession, OpReport};
use crate::settings::AppSettings;
use crate::{log_err, log_info, log_warn};

/// Modal prompt for the operations that take one integer parameter.
struct ParamDialog {
    op: FilterOp,
    prompt: &'static str,
    input: String,
}

/// Top-level egui application: one edit session plus the surrounding shell.
pub struct WaferViewApp {
    session: EditSession,
    files: FileHandler,
    settings: AppSettings,

    texture: Option<TextureHandle>,
    texture_dirty: bool,

    /// Transient warning/info line in the status bar.
    status: String,
    last_report: Option<OpReport>,
    param_dialog: Option<ParamDialog>,
    show_log_panel: bool,
    pointer_coords: String,
}

impl WaferViewApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            session: EditSession::new(),
            files: FileHandler::new(),
            settings: AppSettings::load(),
            texture: None,
            texture_dirty: false,
            status: String::new(),
            last_report: None,
            param_dialog: None,
            show_log_panel: false,
            pointer_coords: "X=0, Y=0".into(),
        }
    }

    // -- operation plumbing ----------------------------------------------

    /// Run a filter and route the outcome to the log and status bar.
    fn run_filter(&mut self, op: FilterOp, param: Option<i32>) {
        match self.session.apply_filter(op, param) {
            Ok(report) => self.finish_op(report),
            Err(e) => {
                self.status = e.to_string();
                log_warn!("{} rejected: {}", op.label(), e);
            }
        }
    }

    /// Open the parameter prompt for an op, seeded from the saved defaults.
    fn prompt_for_param(&mut self, op: FilterOp) {
        let Some(spec) = op.parameter() else {
            self.run_filter(op, None);
            return;
        };
        let default = match op {
            FilterOp::Binarize => self.settings.default_threshold,
            _ => self.settings.default_kernel_size,
        };
        self.param_dialog = Some(ParamDialog {
            op,
            prompt: spec.prompt,
            input: default.to_string(),
        });
    }

    fn finish_op(&mut self, report: OpReport) {
        logger::add_operation(&report.description, report.elapsed_ms);
        self.last_report = Some(report);
        self.texture_dirty = true;
        self.status.clear();
    }

    fn undo(&mut self) {
        if let Some(description) = self.session.undo() {
            log_info!("Undo: {}", description);
            self.texture_dirty = true;
            self.status.clear();
        }
    }

    fn redo(&mut self) {
        if let Some(description) = self.session.redo() {
            log_info!("Redo: {}", description);
            self.texture_dirty = true;
            self.status.clear();
        }
    }

    fn cut(&mut self) {
        match self.session.cut() {
            Ok(Some(report)) => self.finish_op(report),
            Ok(None) => {} // degenerate region — deliberate silent no-op
            Err(e) => self.status = e.to_string(),
        }
    }

    fn copy(&mut self) {
        match self.session.copy() {
            Ok(Some(report)) => self.finish_op(report),
            Ok(None) => {}
            Err(e) => self.status = e.to_string(),
        }
    }

    fn paste(&mut self) {
        match self.session.paste() {
            Ok(report) => self.finish_op(report),
            Err(e) => self.status = e.to_string(),
        }
    }

    fn delete_selection(&mut self) {
        match self.session.delete_selection() {
            Ok(Some(report)) => self.finish_op(report),
            Ok(None) => {}
            Err(e) => self.status = e.to_string(),
        }
    }

    // -- file plumbing ---------------------------------------------------

    fn open_image(&mut self) {
        match self.files.open_image(self.settings.dialog_start_dir().as_deref()) {
            Ok(Some((buffer, path))) => {
                log_info!(
                    "Loaded {} ({}x{})",
                    path.display(),
                    buffer.width(),
                    buffer.height()
                );
                self.session.load(buffer);
                self.settings.remember_path(&path);
                self.texture_dirty = true;
                self.status.clear();
            }
            Ok(None) => {} // dialog cancelled
            Err(e) => {
                self.status = e.clone();
                log_err!("{}", e);
            }
        }
    }

    fn reload_image(&mut self) {
        match self.files.reload_image() {
            Ok(Some(buffer)) => {
                log_info!("Reloaded current image from disk");
                self.session.load(buffer);
                self.texture_dirty = true;
                self.status.clear();
            }
            Ok(None) => self.status = "No file to reload".into(),
            Err(e) => {
                self.status = e.clone();
                log_err!("{}", e);
            }
        }
    }

    fn save_image_as(&mut self) {
        let Some(buffer) = self.session.current().cloned() else {
            self.status = "no image is loaded".into();
            return;
        };
        match self
            .files
            .save_image_as(&buffer, self.settings.dialog_start_dir().as_deref())
        {
            Ok(Some(path)) => {
                log_info!("Saved {}", path.display());
                self.settings.remember_path(&path);
                self.status.clear();
            }
            Ok(None) => {}
            Err(e) => {
                self.status = e.clone();
                log_err!("{}", e);
            }
        }
    }

    // -- UI sections -----------------------------------------------------

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open…").clicked() {
                        ui.close_menu();
                        self.open_image();
                    }
                    if ui
                        .add_enabled(self.files.current_path().is_some(), egui::Button::new("Reload"))
                        .clicked()
                    {
                        ui.close_menu();
                        self.reload_image();
                    }
                    if ui
                        .add_enabled(self.session.has_image(), egui::Button::new("Save As…"))
                        .clicked()
                    {
                        ui.close_menu();
                        self.save_image_as();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let undo_label = match self.session.history().undo_description() {
                        Some(d) => format!("Undo {}", d),
                        None => "Undo".into(),
                    };
                    if ui
                        .add_enabled(self.session.can_undo(), egui::Button::new(undo_label))
                        .clicked()
                    {
                        ui.close_menu();
                        self.undo();
                    }
                    let redo_label = match self.session.history().redo_description() {
                        Some(d) => format!("Redo {}", d),
                        None => "Redo".into(),
                    };
                    if ui
                        .add_enabled(self.session.can_redo(), egui::Button::new(redo_label))
                        .clicked()
                    {
                        ui.close_menu();
                        self.redo();
                    }
                    ui.separator();
                    let has_selection = self.session.has_valid_selection();
                    if ui.add_enabled(has_selection, egui::Button::new("Cut")).clicked() {
                        ui.close_menu();
                        self.cut();
                    }
                    if ui.add_enabled(has_selection, egui::Button::new("Copy")).clicked() {
                        ui.close_menu();
                        self.copy();
                    }
                    if ui
                        .add_enabled(self.session.can_paste(), egui::Button::new("Paste"))
                        .clicked()
                    {
                        ui.close_menu();
                        self.paste();
                    }
                    if ui
                        .add_enabled(has_selection, egui::Button::new("Delete Selection"))
                        .clicked()
                    {
                        ui.close_menu();
                        self.delete_selection();
                    }
                    ui.separator();
                    if ui.button("Deselect").clicked() {
                        ui.close_menu();
                        self.session.reset_selection();
                    }
                });

                ui.menu_button("Filter", |ui| {
                    let enabled = self.session.has_image();
                    for op in [
                        FilterOp::Grayscale,
                        FilterOp::GaussianBlur,
                        FilterOp::Sobel,
                        FilterOp::Laplacian,
                    ] {
                        if ui.add_enabled(enabled, egui::Button::new(op.label())).clicked() {
                            ui.close_menu();
                            self.run_filter(op, None);
                        }
                    }
                    ui.separator();
                    for op in [
                        FilterOp::Binarize,
                        FilterOp::Dilate,
                        FilterOp::Erode,
                        FilterOp::Median,
                    ] {
                        let label = format!("{}…", op.label());
                        if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                            ui.close_menu();
                            self.prompt_for_param(op);
                        }
                    }
                });

                ui.menu_button("Transform", |ui| {
                    if ui
                        .add_enabled(
                            self.session.has_image(),
                            egui::Button::new(FilterOp::Fft.label()),
                        )
                        .clicked()
                    {
                        ui.close_menu();
                        self.run_filter(FilterOp::Fft, None);
                    }
                    if ui
                        .add_enabled(
                            self.session.has_fourier_data(),
                            egui::Button::new(FilterOp::Ifft.label()),
                        )
                        .clicked()
                    {
                        ui.close_menu();
                        self.run_filter(FilterOp::Ifft, None);
                    }
                });

                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.show_log_panel, "Operation Log");
                });
            });
        });
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.pointer_coords);
                ui.separator();

                let mut zoom = self.session.zoom();
                ui.label("Zoom");
                if ui
                    .add(egui::Slider::new(&mut zoom, crate::canvas::MIN_ZOOM..=crate::canvas::MAX_ZOOM))
                    .changed()
                {
                    self.session.set_zoom(zoom);
                }
                ui.separator();

                if let Some(report) = &self.last_report {
                    ui.label(format!("{}: {} ms", report.description, report.elapsed_ms));
                }

                if !self.status.is_empty() {
                    ui.separator();
                    ui.colored_label(Color32::YELLOW, &self.status);
                }
            });
        });
    }

    fn log_panel(&mut self, ctx: &egui::Context) {
        if !self.show_log_panel {
            return;
        }
        egui::TopBottomPanel::bottom("log_panel")
            .resizable(true)
            .default_height(120.0)
            .show(ctx, |ui| {
                ui.heading("Operation Log");
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let entries = logger::recent_operations();
                    if entries.is_empty() {
                        ui.weak("No operations yet");
                    }
                    for entry in entries {
                        ui.label(format!(
                            "[{}] {} — {} ms",
                            entry.timestamp, entry.operation, entry.elapsed_ms
                        ));
                    }
                });
            });
    }

    fn show_param_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = &mut self.param_dialog else {
            return;
        };
        let mut run: Option<(FilterOp, String)> = None;
        let mut close = false;

        egui::Window::new(dialog.op.label())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(dialog.prompt);
                ui.text_edit_singleline(&mut dialog.input);
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        run = Some((dialog.op, dialog.input.clone()));
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });

        if let Some((op, raw)) = run {
            match raw.trim().parse::<i32>() {
                Ok(value) => {
                    self.param_dialog = None;
                    self.run_filter(op, Some(value));
                }
                Err(_) => {
                    // Validation failure: warn, leave the dialog open, touch
                    // neither the image nor the history.
                    self.status = format!("Not a number: '{}'", raw.trim());
                    log_warn!("{} rejected: {}", op.label(), self.status);
                }
            }
        } else if close {
            self.param_dialog = None;
        }
    }

    fn canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let (canvas_rect, response) =
                ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
            let origin = canvas_rect.min;
            self.session.set_control_size(canvas_rect.size());

            // Re-upload the display texture after any mutation.
            if self.texture_dirty {
                self.texture = self
                    .session
                    .current()
                    .map(|buf| ctx.load_texture("canvas", buf.to_color_image(), TextureOptions::NEAREST));
                self.texture_dirty = false;
            }

            let painter = ui.painter_at(canvas_rect);
            if let Some(texture) = &self.texture {
                let image_rect = self.session.view().image_rect();
                let screen_rect = Rect::from_min_size(
                    origin + image_rect.min.to_vec2(),
                    image_rect.size(),
                );
                painter.image(
                    texture.id(),
                    screen_rect,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
            } else {
                painter.text(
                    canvas_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "File → Open… to load an image",
                    egui::FontId::proportional(16.0),
                    ui.visuals().weak_text_color(),
                );
            }

            // Pointer coordinate readout (image space).
            if let Some(hover) = response.hover_pos() {
                let img = self.session.view().to_image(hover - origin.to_vec2());
                self.pointer_coords = format!("X={:.0}, Y={:.0}", img.x, img.y);
            } else {
                self.pointer_coords = "X=0, Y=0".into();
            }

            // Selection drag state machine.
            if response.drag_started_by(egui::PointerButton::Primary) {
                if let Some(pos) = response.interact_pointer_pos() {
                    self.session.start_selection(pos - origin.to_vec2());
                }
            } else if response.dragged_by(egui::PointerButton::Primary) {
                if let Some(pos) = response.interact_pointer_pos() {
                    self.session.update_selection(pos - origin.to_vec2());
                }
            } else if response.drag_released() {
                self.session.finish_selection();
            }

            // Selection overlay.
            let selection = self.session.selection();
            if selection.is_visible() {
                let rect = selection.rect().translate(origin.to_vec2());
                painter.rect(
                    rect,
                    0.0,
                    Color32::from_rgba_unmultiplied(200, 200, 255, 50),
                    Stroke::new(1.0, Color32::WHITE),
                );
            }
        });
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // Skip while the parameter dialog owns the keyboard.
        if self.param_dialog.is_some() {
            return;
        }
        let input = ctx.input(|i| {
            (
                i.modifiers.command && i.key_pressed(Key::Z) && !i.modifiers.shift,
                i.modifiers.command && (i.key_pressed(Key::Y) || (i.modifiers.shift && i.key_pressed(Key::Z))),
                i.modifiers.command && i.key_pressed(Key::X),
                i.modifiers.command && i.key_pressed(Key::C),
                i.modifiers.command && i.key_pressed(Key::V),
                i.key_pressed(Key::Delete),
                i.key_pressed(Key::Escape),
            )
        });
        let (undo, redo, cut, copy, paste, delete, escape) = input;
        if undo {
            self.undo();
        }
        if redo {
            self.redo();
        }
        if cut {
            self.cut();
        }
        if copy {
            self.copy();
        }
        if paste {
            self.paste();
        }
        if delete {
            self.delete_selection();
        }
        if escape {
            self.session.reset_selection();
        }
    }
}

impl eframe::App for WaferViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);
        self.menu_bar(ctx);
        self.status_bar(ctx);
        self.log_panel(ctx);
        self.show_param_dialog(ctx);
        self.canvas(ctx);
    }
}
