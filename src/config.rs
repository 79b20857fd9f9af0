//! Configuration management for Reprise.
//!
//! Settings live in a TOML file (`.reprise/config.toml` by default). Every
//! field has a default, so a missing file or a partial file is valid.
//!
//! # Example config.toml
//!
//! ```toml
//! [controller]
//! poll_interval_ms = 300
//! hysteresis_margin = 1.0
//!
//! [simulation]
//! sample_interval_ms = 500
//! rate = 1.0
//! ```

use crate::error::{RepriseError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default supervisor poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 300;

/// Default distance below the window end that re-arms boundary detection
pub const DEFAULT_HYSTERESIS_MARGIN: f64 = 1.0;

/// Default capacity of the progress event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Default cadence of the simulated player's position feed
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 500;

/// Tunables for the repeat-loop controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Interval between supervisor ticks.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Seconds below the window end the position must fall before another
    /// crossing can be counted.
    #[serde(default = "default_hysteresis_margin")]
    pub hysteresis_margin: f64,

    /// Buffered progress events per subscriber before the oldest are dropped.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_hysteresis_margin() -> f64 {
    DEFAULT_HYSTERESIS_MARGIN
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            hysteresis_margin: DEFAULT_HYSTERESIS_MARGIN,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ControllerConfig {
    /// Poll interval as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Validates the controller configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The poll interval is zero
    /// - The hysteresis margin is negative, NaN or infinite
    /// - The event capacity is zero
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be greater than zero".to_string());
        }
        if !self.hysteresis_margin.is_finite() {
            return Err("hysteresis_margin must be a finite number".to_string());
        }
        if self.hysteresis_margin < 0.0 {
            return Err(format!(
                "hysteresis_margin is negative: {}",
                self.hysteresis_margin
            ));
        }
        if self.event_capacity == 0 {
            return Err("event_capacity must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Settings for the simulated player driven by `reprise run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Interval between pushed position samples.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    /// Playback speed multiplier.
    #[serde(default = "default_rate")]
    pub rate: f64,

    /// Media length in seconds; unknown when absent.
    #[serde(default)]
    pub duration: Option<f64>,
}

fn default_sample_interval_ms() -> u64 {
    DEFAULT_SAMPLE_INTERVAL_MS
}

fn default_rate() -> f64 {
    1.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            rate: 1.0,
            duration: None,
        }
    }
}

impl SimulationConfig {
    /// Sample interval as a [`Duration`].
    #[must_use]
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Validates the simulation configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the sample interval is zero, the rate is not a
    /// positive finite number, or the duration is not positive.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.sample_interval_ms == 0 {
            return Err("sample_interval_ms must be greater than zero".to_string());
        }
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(format!("rate must be positive: {}", self.rate));
        }
        if let Some(duration) = self.duration {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(format!("duration must be positive: {}", duration));
            }
        }
        Ok(())
    }
}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepriseConfig {
    #[serde(default)]
    pub controller: ControllerConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl RepriseConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed or
    /// fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: RepriseConfig = toml::from_str(&content).map_err(|e| {
            RepriseError::config_with_path(e.to_string(), path.to_path_buf())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns [`RepriseError::InvalidConfig`] naming the failing section.
    pub fn validate(&self) -> Result<()> {
        self.controller
            .validate()
            .map_err(|reason| RepriseError::InvalidConfig {
                field: "controller".to_string(),
                reason,
            })?;
        self.simulation
            .validate()
            .map_err(|reason| RepriseError::InvalidConfig {
                field: "simulation".to_string(),
                reason,
            })?;
        Ok(())
    }

    /// Default configuration file location under a base directory.
    pub fn default_path(base_dir: &Path) -> PathBuf {
        base_dir.join(".reprise/config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_controller_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.poll_interval_ms, 300);
        assert_eq!(config.hysteresis_margin, 1.0);
        assert_eq!(config.poll_interval(), Duration::from_millis(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_controller_validate_rejects_bad_values() {
        let zero_poll = ControllerConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert!(zero_poll.validate().is_err());

        let negative_margin = ControllerConfig {
            hysteresis_margin: -0.5,
            ..Default::default()
        };
        assert!(negative_margin.validate().unwrap_err().contains("negative"));

        let nan_margin = ControllerConfig {
            hysteresis_margin: f64::NAN,
            ..Default::default()
        };
        assert!(nan_margin.validate().is_err());

        let zero_capacity = ControllerConfig {
            event_capacity: 0,
            ..Default::default()
        };
        assert!(zero_capacity.validate().is_err());
    }

    #[test]
    fn test_simulation_validate() {
        assert!(SimulationConfig::default().validate().is_ok());

        let bad_rate = SimulationConfig {
            rate: 0.0,
            ..Default::default()
        };
        assert!(bad_rate.validate().is_err());

        let bad_duration = SimulationConfig {
            duration: Some(-1.0),
            ..Default::default()
        };
        assert!(bad_duration.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = RepriseConfig::load(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config, RepriseConfig::default());
    }

    #[test]
    fn test_load_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "[controller]\nhysteresis_margin = 0.5\n\n[simulation]\nrate = 2.0\n",
        )
        .unwrap();

        let config = RepriseConfig::load(&path).unwrap();
        assert_eq!(config.controller.hysteresis_margin, 0.5);
        assert_eq!(config.controller.poll_interval_ms, 300);
        assert_eq!(config.simulation.rate, 2.0);
        assert_eq!(config.simulation.sample_interval_ms, 500);
    }

    #[test]
    fn test_load_invalid_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[controller]\npoll_interval_ms = 0\n").unwrap();

        let err = RepriseConfig::load(&path).unwrap_err();
        assert!(matches!(err, RepriseError::InvalidConfig { .. }));
    }

    #[test]
    fn test_load_malformed_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[controller\n").unwrap();

        let err = RepriseConfig::load(&path).unwrap_err();
        assert!(matches!(err, RepriseError::Config { path: Some(_), .. }));
    }

    #[test]
    fn test_load_unreadable_path_is_io_error() {
        let temp = TempDir::new().unwrap();

        // A directory exists but cannot be read as a file.
        let err = RepriseConfig::load(temp.path()).unwrap_err();
        assert!(matches!(err, RepriseError::Io(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_default_path() {
        let path = RepriseConfig::default_path(Path::new("/project"));
        assert_eq!(path, PathBuf::from("/project/.reprise/config.toml"));
    }
}
