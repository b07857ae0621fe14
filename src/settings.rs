//! Tuning and host preferences
//!
//! Read once at startup: LocalStorage on web, a JSON file on native.
//! Missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Why settings could not be used
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid { field: &'static str, reason: String },
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "failed to read settings: {}", e),
            SettingsError::Parse(e) => write!(f, "malformed settings JSON: {}", e),
            SettingsError::Invalid { field, reason } => {
                write!(f, "invalid setting `{}`: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
            SettingsError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Square ===
    /// Side length in pixels
    pub square_size: f32,
    /// Velocity at speed factor 1 (pixels per frame)
    pub base_velocity: [f32; 2],

    // === Motion ===
    /// Starting speed factor (0-5)
    pub initial_speed: u8,
    /// Whether the square moves before the first tap
    pub start_moving: bool,

    // === Gestures ===
    pub double_tap_window_ms: f64,
    pub long_press_ms: f64,

    // === Host ===
    /// RNG seed; the host derives one from its clock when absent
    pub seed: Option<u64>,
    pub show_speed_label: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            square_size: SQUARE_SIZE,
            base_velocity: [INITIAL_VELOCITY_X, INITIAL_VELOCITY_Y],

            initial_speed: INITIAL_SPEED_FACTOR,
            start_moving: true,

            double_tap_window_ms: DOUBLE_TAP_WINDOW_MS,
            long_press_ms: LONG_PRESS_MS,

            seed: None,
            show_speed_label: true,
        }
    }
}

impl Settings {
    /// Parse and validate
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Report the first field that would break the simulation
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
            SettingsError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if !(self.square_size.is_finite() && self.square_size > 0.0) {
            return Err(invalid("square_size", "must be a positive number"));
        }
        if self
            .base_velocity
            .iter()
            .any(|v| !v.is_finite() || *v == 0.0)
        {
            return Err(invalid("base_velocity", "components must be finite and non-zero"));
        }
        if self.initial_speed > MAX_SPEED_FACTOR {
            return Err(invalid(
                "initial_speed",
                format!("must be between {} and {}", MIN_SPEED_FACTOR, MAX_SPEED_FACTOR),
            ));
        }
        if !(self.double_tap_window_ms.is_finite() && self.double_tap_window_ms > 0.0) {
            return Err(invalid("double_tap_window_ms", "must be a positive duration"));
        }
        if !(self.long_press_ms.is_finite() && self.long_press_ms > 0.0) {
            return Err(invalid("long_press_ms", "must be a positive duration"));
        }
        Ok(())
    }

    /// Parse, falling back to defaults with a warning
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "bounce_tap_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json_or_default(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native has no ambient store; see `load_from_path`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    /// Read settings from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.square_size, 50.0);
        assert_eq!(settings.base_velocity, [2.0, 3.0]);
        assert_eq!(settings.double_tap_window_ms, 200.0);
        assert_eq!(settings.long_press_ms, 500.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "initial_speed": 3, "seed": 12 }"#).unwrap();
        assert_eq!(settings.initial_speed, 3);
        assert_eq!(settings.seed, Some(12));
        assert_eq!(settings.square_size, SQUARE_SIZE);
        assert!(settings.start_moving);
    }

    #[test]
    fn test_rejects_out_of_range_speed() {
        let err = Settings::from_json(r#"{ "initial_speed": 6 }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "initial_speed",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_zero_velocity() {
        let err = Settings::from_json(r#"{ "base_velocity": [0.0, 3.0] }"#).unwrap_err();
        assert!(err.to_string().contains("base_velocity"));
    }

    #[test]
    fn test_malformed_json_falls_back() {
        assert!(matches!(
            Settings::from_json("{ nope"),
            Err(SettingsError::Parse(_))
        ));
        assert_eq!(Settings::from_json_or_default("{ nope"), Settings::default());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_missing_file_is_io_error() {
        let err = Settings::load_from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }
}
