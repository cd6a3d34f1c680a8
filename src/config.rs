use egui::Color32;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::brush::BrushModel;
use crate::buffer::Size;
use crate::error::CanvasResult;
use crate::history::HISTORY_LIMIT;

/// Errors that can occur while loading or storing settings
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to (de)serialize settings: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Parameters a canvas is created with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing fields fall back to their defaults
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Color of a blank canvas
    pub background: Color32,
    /// Maximum number of undo checkpoints
    pub history_limit: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            background: Color32::WHITE,
            history_limit: HISTORY_LIMIT,
        }
    }
}

impl CanvasConfig {
    pub fn size(&self) -> CanvasResult<Size> {
        Size::new(self.width, self.height)
    }
}

/// Everything persisted between sessions: the canvas setup and the last brush
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub canvas: CanvasConfig,
    pub brush: BrushModel,
}

impl Settings {
    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> PersistenceResult<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> PersistenceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> PersistenceResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Write settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> PersistenceResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        log::info!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> PersistenceResult<()> {
        self.canvas
            .size()
            .map_err(|err| PersistenceError::InvalidSettings(err.to_string()))?;
        if self.canvas.history_limit == 0 {
            return Err(PersistenceError::InvalidSettings(
                "history limit must be at least 1".to_owned(),
            ));
        }
        self.brush
            .validate()
            .map_err(|err| PersistenceError::InvalidSettings(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::{BrushMode, CapStyle};

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings = Settings::from_json(r#"{ "canvas": { "width": 800 } }"#).unwrap();
        assert_eq!(settings.canvas.width, 800);
        assert_eq!(settings.canvas.height, 400);
        assert_eq!(settings.canvas.history_limit, HISTORY_LIMIT);
        assert_eq!(settings.brush, BrushModel::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = Settings::default();
        settings.brush.set_mode(BrushMode::StraightLine);
        settings.brush.set_cap(CapStyle::Square);
        settings.brush.set_color(Color32::DARK_GREEN);

        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let zero_width = Settings::from_json(r#"{ "canvas": { "width": 0 } }"#);
        assert!(matches!(zero_width, Err(PersistenceError::InvalidSettings(_))));

        let zero_history = Settings::from_json(r#"{ "canvas": { "history_limit": 0 } }"#);
        assert!(matches!(zero_history, Err(PersistenceError::InvalidSettings(_))));

        let zero_brush = Settings::from_json(r#"{ "brush": { "size": 0 } }"#);
        assert!(matches!(zero_brush, Err(PersistenceError::InvalidSettings(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(PersistenceError::Serialization(_))
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings::default();
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }
}
