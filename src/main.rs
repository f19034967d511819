// GUI-subsystem binary on Windows: no console window is ever allocated.
#![windows_subsystem = "windows"]

use eframe::egui;
use waferview::app::WaferViewApp;
use waferview::logger;

fn main() -> Result<(), eframe::Error> {
    // Initialize session log (overwrites previous session log)
    logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("WaferView"),
        ..Default::default()
    };

    eframe::run_native(
        "WaferView",
        options,
        Box::new(|cc| Box::new(WaferViewApp::new(cc))),
    )
}
