//! Guidance Configuration
//!
//! Every tunable the engine uses is a field in this module, loadable from a
//! TOML file.
//!
//! ## Loading Order
//!
//! 1. `SIGHTLINE_CONFIG` environment variable (path to TOML file)
//! 2. `guidance.toml` in the current working directory
//! 3. Built-in defaults

pub mod defaults;

use crate::types::SensitivityLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a guidance deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuidanceConfig {
    /// Engine timing and filtering
    #[serde(default)]
    pub engine: EngineConfig,

    /// Vision bridge connection
    #[serde(default)]
    pub vision: VisionConfig,
}

/// Engine timing and filtering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Time between analysis ticks (milliseconds)
    #[serde(default = "default_analysis_interval_ms")]
    pub analysis_interval_ms: u64,

    /// Announcement cooldown window (seconds)
    #[serde(default = "default_announcement_cooldown_secs")]
    pub announcement_cooldown_secs: u64,

    /// Sensitivity level: "low" | "medium" | "high"
    #[serde(default = "default_sensitivity")]
    pub sensitivity: String,
}

/// Vision bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Bridge endpoint URL; empty selects the scripted simulation client
    #[serde(default)]
    pub endpoint: String,

    /// Prompt sent with every frame
    #[serde(default = "default_vision_prompt")]
    pub prompt: String,

    /// Request timeout (seconds)
    #[serde(default = "default_vision_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_analysis_interval_ms() -> u64 {
    defaults::ANALYSIS_INTERVAL_MS
}
fn default_announcement_cooldown_secs() -> u64 {
    defaults::ANNOUNCEMENT_COOLDOWN_SECS
}
fn default_sensitivity() -> String {
    defaults::SENSITIVITY.to_string()
}
fn default_vision_prompt() -> String {
    defaults::VISION_PROMPT.to_string()
}
fn default_vision_timeout_secs() -> u64 {
    defaults::VISION_REQUEST_TIMEOUT_SECS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            analysis_interval_ms: default_analysis_interval_ms(),
            announcement_cooldown_secs: default_announcement_cooldown_secs(),
            sensitivity: default_sensitivity(),
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            prompt: default_vision_prompt(),
            request_timeout_secs: default_vision_timeout_secs(),
        }
    }
}

impl EngineConfig {
    /// Parsed sensitivity, warning and falling back to Medium on an
    /// unrecognized name.
    pub fn sensitivity_level(&self) -> SensitivityLevel {
        match self.sensitivity.parse::<SensitivityLevel>() {
            Ok(level) => level,
            Err(()) => {
                warn!(value = %self.sensitivity, "Unknown sensitivity in config, using medium");
                SensitivityLevel::Medium
            }
        }
    }
}

impl GuidanceConfig {
    /// Load configuration using the standard search order:
    /// 1. `$SIGHTLINE_CONFIG` environment variable
    /// 2. `./guidance.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("SIGHTLINE_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from SIGHTLINE_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from SIGHTLINE_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "SIGHTLINE_CONFIG points to non-existent file, falling back");
            }
        }

        let local = Path::new("guidance.toml");
        if local.exists() {
            match Self::load_from_file(local) {
                Ok(config) => {
                    info!(path = %local.display(), "Loaded config from guidance.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load guidance.toml, using defaults");
                }
            }
        }

        Self::default()
    }

    /// Load and parse a specific TOML file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn analysis_interval(&self) -> Duration {
        Duration::from_millis(self.engine.analysis_interval_ms)
    }

    pub fn announcement_cooldown(&self) -> Duration {
        Duration::from_secs(self.engine.announcement_cooldown_secs)
    }

    pub fn vision_request_timeout(&self) -> Duration {
        Duration::from_secs(self.vision.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_named_constants() {
        let config = GuidanceConfig::default();
        assert_eq!(config.engine.analysis_interval_ms, 1500);
        assert_eq!(config.engine.announcement_cooldown_secs, 5);
        assert_eq!(config.engine.sensitivity_level(), SensitivityLevel::Medium);
        assert!(config.vision.endpoint.is_empty());
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_fields() {
        let config: GuidanceConfig = toml::from_str(
            r#"
            [engine]
            analysis_interval_ms = 500
            sensitivity = "high"
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.engine.analysis_interval_ms, 500);
        assert_eq!(config.engine.sensitivity_level(), SensitivityLevel::High);
        assert_eq!(config.engine.announcement_cooldown_secs, 5);
        assert_eq!(config.vision.request_timeout_secs, 10);
    }

    #[test]
    fn unknown_sensitivity_falls_back_to_medium() {
        let config: GuidanceConfig = toml::from_str(
            r#"
            [engine]
            sensitivity = "turbo"
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.engine.sensitivity_level(), SensitivityLevel::Medium);
    }
}
