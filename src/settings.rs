//! Game settings and preferences
//!
//! Persisted as a JSON file in the working directory, separately from any
//! run state.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Radians of yaw per unit of pointer motion
    pub mouse_sensitivity: f32,
    /// Fixed seed for reproducible runs; None draws one from the clock
    pub seed: Option<u64>,

    // === HUD ===
    /// Draw the live scan beams, not just the returns
    pub show_beams: bool,
    /// Show FPS counter
    pub show_fps: bool,

    // === Accessibility ===
    /// High contrast mode
    pub high_contrast: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.002,
            seed: None,
            show_beams: true,
            show_fps: false,
            high_contrast: false,
        }
    }
}

impl Settings {
    /// Settings file name
    pub const FILE_NAME: &'static str = "darkfield_settings.json";

    /// Load from the default location, falling back to defaults if the file
    /// is missing or unreadable
    pub fn load() -> Self {
        Self::load_from(Path::new(Self::FILE_NAME))
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(err) => {
                    log::warn!("Malformed settings file {}: {err}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        self.save_to(Path::new(Self::FILE_NAME));
    }

    pub fn save_to(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(err) = fs::write(path, json) {
                    log::warn!("Failed to save settings to {}: {err}", path.display());
                } else {
                    log::info!("Settings saved");
                }
            }
            Err(err) => log::warn!("Failed to serialize settings: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = Settings::load_from(Path::new("/nonexistent/nowhere.json"));
        assert_eq!(settings.mouse_sensitivity, 0.002);
        assert!(settings.seed.is_none());
    }

    #[test]
    fn test_malformed_file_yields_defaults() {
        let path = std::env::temp_dir().join("darkfield_settings_malformed.json");
        fs::write(&path, "not json {").unwrap();
        let settings = Settings::load_from(&path);
        assert!(settings.show_beams);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let path = std::env::temp_dir().join("darkfield_settings_roundtrip.json");
        let settings = Settings {
            mouse_sensitivity: 0.005,
            seed: Some(77),
            ..Settings::default()
        };
        settings.save_to(&path);

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.mouse_sensitivity, 0.005);
        assert_eq!(loaded.seed, Some(77));
        let _ = fs::remove_file(&path);
    }
}
