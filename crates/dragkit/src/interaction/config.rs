use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

pub const DRAG_THRESHOLD_ENV_VAR: &str = "DRAGKIT_DRAG_THRESHOLD_PX";
pub const DETAILED_LOG_ENV_VAR: &str = "DRAGKIT_DETAILED_LOG";
pub const DEFAULT_DRAG_THRESHOLD_PX: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DragConfig {
    /// Minimum start-to-end screen distance for a release to count as a drag.
    pub drag_threshold_px: f32,
    pub detailed_logging: bool,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
            detailed_logging: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read drag config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse drag config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl DragConfig {
    pub fn effective_threshold_px(&self) -> f32 {
        sanitize_threshold(self.drag_threshold_px)
    }

    /// Applies `DRAGKIT_*` environment overrides on top of `self`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(raw) = read_env(DRAG_THRESHOLD_ENV_VAR) {
            match parse_threshold(&raw) {
                Some(threshold) => self.drag_threshold_px = threshold,
                None => warn!(
                    env_var = DRAG_THRESHOLD_ENV_VAR,
                    value = raw.as_str(),
                    "invalid drag threshold env var value; keeping configured value"
                ),
            }
        }
        if let Some(raw) = read_env(DETAILED_LOG_ENV_VAR) {
            match parse_flag(&raw) {
                Some(enabled) => self.detailed_logging = enabled,
                None => warn!(
                    env_var = DETAILED_LOG_ENV_VAR,
                    value = raw.as_str(),
                    "invalid detailed-log env var value; keeping configured value"
                ),
            }
        }
        self
    }
}

pub fn load_drag_config(path: &Path) -> Result<DragConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_env(var: &'static str) -> Option<String> {
    match env::var(var) {
        Ok(value) => Some(value),
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(env_var = var, error = %err, "unable to read env var; ignoring");
            None
        }
    }
}

fn sanitize_threshold(threshold: f32) -> f32 {
    if threshold.is_finite() && threshold >= 0.0 {
        threshold
    } else {
        DEFAULT_DRAG_THRESHOLD_PX
    }
}

fn parse_threshold(raw: &str) -> Option<f32> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = DragConfig::default();
        assert_eq!(config.drag_threshold_px, 10.0);
        assert!(!config.detailed_logging);
    }

    #[test]
    fn invalid_thresholds_fall_back_to_default() {
        for bad in [f32::NAN, f32::INFINITY, -1.0] {
            let config = DragConfig {
                drag_threshold_px: bad,
                ..DragConfig::default()
            };
            assert_eq!(config.effective_threshold_px(), DEFAULT_DRAG_THRESHOLD_PX);
        }
        let zero = DragConfig {
            drag_threshold_px: 0.0,
            ..DragConfig::default()
        };
        assert_eq!(zero.effective_threshold_px(), 0.0);
    }

    #[test]
    fn env_value_parsers_reject_garbage() {
        assert_eq!(parse_threshold(" 12.5 "), Some(12.5));
        assert_eq!(parse_threshold("-3"), None);
        assert_eq!(parse_threshold("ten"), None);
        assert_eq!(parse_flag("ON"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn config_file_fills_missing_fields_with_defaults() {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "detailed_logging": true }}"#).expect("write");

        let config = load_drag_config(file.path()).expect("config");
        assert!(config.detailed_logging);
        assert_eq!(config.drag_threshold_px, DEFAULT_DRAG_THRESHOLD_PX);
    }

    #[test]
    fn config_file_with_unknown_field_is_a_parse_error() {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "drag_threshold": 4 }}"#).expect("write");

        let err = load_drag_config(file.path()).expect_err("unknown field");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_config_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_drag_config(&dir.path().join("missing.json")).expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
