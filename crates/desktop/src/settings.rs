use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use eyepong_core::annotation::domain::highlight_style::HighlightStyle;
use eyepong_core::detection::domain::detection_params::DetectionParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    System,
    Dark,
    Light,
}

impl Appearance {
    pub const ALL: &[Appearance] = &[Appearance::System, Appearance::Dark, Appearance::Light];
}

impl std::fmt::Display for Appearance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Appearance::System => write!(f, "System"),
            Appearance::Dark => write!(f, "Dark"),
            Appearance::Light => write!(f, "Light"),
        }
    }
}

/// Persisted user preferences. Missing fields fall back to defaults so
/// older settings files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Highlight opacity in percent.
    pub opacity: u32,
    pub face_min_neighbors: u32,
    pub eye_min_neighbors: u32,
    pub appearance: Appearance,
    pub font_scale: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            opacity: 35,
            face_min_neighbors: DetectionParams::face().min_neighbors,
            eye_min_neighbors: DetectionParams::eye().min_neighbors,
            appearance: Appearance::System,
            font_scale: 1.0,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("EyePong").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            match serde_json::to_string_pretty(self) {
                Ok(json) => {
                    if let Err(e) = fs::write(&path, json) {
                        log::warn!("Could not save settings to {}: {e}", path.display());
                    }
                }
                Err(e) => log::warn!("Could not serialize settings: {e}"),
            }
        }
    }

    pub fn highlight_style(&self) -> HighlightStyle {
        HighlightStyle::default().with_overlay_weight(self.opacity.min(100) as f32 / 100.0)
    }

    pub fn face_params(&self) -> DetectionParams {
        DetectionParams {
            min_neighbors: self.face_min_neighbors,
            ..DetectionParams::face()
        }
    }

    pub fn eye_params(&self) -> DetectionParams {
        DetectionParams {
            min_neighbors: self.eye_min_neighbors,
            ..DetectionParams::eye()
        }
    }
}
