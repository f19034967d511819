// ============================================================================
// SETTINGS — persisted application state (last path, parameter defaults)
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Settings persisted across sessions as JSON in the OS data directory.
/// A missing or unreadable file is a normal state and yields the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Directory/file of the most recently opened or saved image; seeds the
    /// next file dialog.
    pub last_image_path: Option<PathBuf>,
    /// Default threshold offered by the binarization parameter dialog.
    pub default_threshold: i32,
    /// Default kernel size offered by dilate/erode/median dialogs.
    pub default_kernel_size: i32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            last_image_path: None,
            default_threshold: 128,
            default_kernel_size: 3,
        }
    }
}

impl AppSettings {
    /// Load from disk, falling back to defaults when the file is absent or
    /// does not parse (e.g. written by a newer version).
    pub fn load() -> Self {
        let path = settings_path();
        match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Best-effort save; a failure is logged but never fatal.
    pub fn save(&self) {
        let path = settings_path();
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(&path, json) {
                    crate::log_warn!("Failed to write settings {}: {}", path.display(), e);
                }
            }
            Err(e) => crate::log_warn!("Failed to serialize settings: {}", e),
        }
    }

    /// Record the directory of the most recent image and persist.
    pub fn remember_path(&mut self, path: &std::path::Path) {
        self.last_image_path = Some(path.to_path_buf());
        self.save();
    }

    /// Directory to seed the next file dialog with.
    pub fn dialog_start_dir(&self) -> Option<PathBuf> {
        let p = self.last_image_path.as_ref()?;
        if p.is_dir() {
            Some(p.clone())
        } else {
            p.parent().map(|d| d.to_path_buf())
        }
    }
}

fn settings_path() -> PathBuf {
    app_data_dir().join("settings.json")
}

/// Per-app data directory (settings, session log). `WAFERVIEW_DATA_DIR`
/// overrides the platform default so tests and portable installs can
/// redirect it.
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("WAFERVIEW_DATA_DIR") {
        return PathBuf::from(dir);
    }
    data_dir().join("WaferView")
}

/// Platform data directory (without the app sub-folder).
fn data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata);
        }
    }
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support");
        }
    }
    // Linux / fallback
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort: current working directory
    PathBuf::from(".")
}
