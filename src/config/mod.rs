//! Carousel configuration: layered YAML plus command-line overrides.
//!
//! User-level config: `~/.storyreel/config.yaml`
//! Project-level config: `.storyreel/config.yaml`
//!
//! Resolution: defaults → user config → project config → CLI flags.
//! Each layer only overrides the fields it sets.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Shortest autoplay interval: one tick.
pub const MIN_AUTOPLAY_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Fully resolved carousel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Host element inside a markup source (`#id`, `.class`, `[attr]`, `tag`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Slide shown first (within the first group).
    pub initial_index: usize,
    /// Loop forever, or tear down after the last slide.
    pub infinite: bool,
    pub autoplay_interval_ms: u64,
    /// Hold time that turns a press into a preview.
    pub long_press_ms: u64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            selector: None,
            initial_index: 0,
            infinite: true,
            autoplay_interval_ms: 3000,
            long_press_ms: 500,
        }
    }
}

/// One config layer. Unset fields leave the lower layer alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOverlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infinite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoplay_interval_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_press_ms: Option<u64>,
}

/// Path to `~/.storyreel/`.
fn dirs_path() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|p| PathBuf::from(p).join(".storyreel"))
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME")
            .ok()
            .map(|p| PathBuf::from(p).join(".storyreel"))
    }
}

/// Path to the user-level config file.
fn user_config_path() -> Option<PathBuf> {
    dirs_path().map(|p| p.join("config.yaml"))
}

impl CarouselConfig {
    /// Load defaults merged with the user and project config files.
    pub fn load() -> Self {
        Self::load_from(
            user_config_path().as_deref(),
            Path::new(".storyreel/config.yaml"),
        )
    }

    /// Load with explicit file locations. Missing files are skipped.
    pub fn load_from(user: Option<&Path>, project: &Path) -> Self {
        let mut config = Self::default();
        if let Some(path) = user {
            config.apply(read_overlay(path));
        }
        config.apply(read_overlay(project));
        config
    }

    /// Apply one layer on top of this config.
    pub fn apply(&mut self, overlay: ConfigOverlay) {
        if let Some(selector) = overlay.selector {
            self.selector = Some(selector);
        }
        if let Some(index) = overlay.initial_index {
            self.initial_index = index;
        }
        if let Some(infinite) = overlay.infinite {
            self.infinite = infinite;
        }
        if let Some(interval) = overlay.autoplay_interval_ms {
            self.autoplay_interval_ms = interval;
        }
        if let Some(long_press) = overlay.long_press_ms {
            self.long_press_ms = long_press;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.autoplay_interval_ms < MIN_AUTOPLAY_INTERVAL_MS {
            return Err(ConfigError::Invalid(format!(
                "autoplay_interval_ms must be at least {MIN_AUTOPLAY_INTERVAL_MS}, got {}",
                self.autoplay_interval_ms
            )));
        }
        if self.long_press_ms == 0 {
            return Err(ConfigError::Invalid("long_press_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }
}

/// Read one overlay file. Missing → empty; malformed → warn and empty.
fn read_overlay(path: &Path) -> ConfigOverlay {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!("Ignoring malformed config {}: {e}", path.display());
            ConfigOverlay::default()
        }),
        Err(_) => ConfigOverlay::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = CarouselConfig::default();
        assert_eq!(config.initial_index, 0);
        assert!(config.infinite);
        assert_eq!(config.autoplay_interval_ms, 3000);
        assert_eq!(config.long_press(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_from_yaml_string() {
        let yaml = r##"
selector: "#stories"
infinite: false
autoplay_interval_ms: 5000
"##;
        let config: CarouselConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.selector.as_deref(), Some("#stories"));
        assert!(!config.infinite);
        assert_eq!(config.autoplay_interval_ms, 5000);
        // Unset fields keep their defaults.
        assert_eq!(config.long_press_ms, 500);
    }

    #[test]
    fn project_layer_overrides_user_layer() {
        let dir = TempDir::new().unwrap();
        let user = dir.path().join("user.yaml");
        let project = dir.path().join("project.yaml");
        std::fs::write(&user, "autoplay_interval_ms: 4000\ninfinite: false\n").unwrap();
        std::fs::write(&project, "autoplay_interval_ms: 6000\n").unwrap();

        let config = CarouselConfig::load_from(Some(&user), &project);
        assert_eq!(config.autoplay_interval_ms, 6000);
        assert!(!config.infinite);
    }

    #[test]
    fn missing_and_malformed_files_fall_back() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, "autoplay_interval_ms: [not a number").unwrap();
        let config = CarouselConfig::load_from(Some(&dir.path().join("absent.yaml")), &bad);
        assert_eq!(config, CarouselConfig::default());
    }

    #[test]
    fn cli_overlay_wins() {
        let mut config = CarouselConfig::default();
        config.apply(ConfigOverlay {
            initial_index: Some(2),
            selector: Some(".feed".into()),
            ..ConfigOverlay::default()
        });
        assert_eq!(config.initial_index, 2);
        assert_eq!(config.selector.as_deref(), Some(".feed"));
        assert!(config.infinite);
    }

    #[test]
    fn validate_rejects_sub_tick_interval() {
        let config = CarouselConfig {
            autoplay_interval_ms: 999,
            ..CarouselConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn validate_rejects_zero_long_press() {
        let config = CarouselConfig {
            long_press_ms: 0,
            ..CarouselConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trip_yaml() {
        let config = CarouselConfig {
            selector: Some("#s".into()),
            initial_index: 1,
            infinite: false,
            autoplay_interval_ms: 2000,
            long_press_ms: 400,
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: CarouselConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }
}
