//! Settings: built-in defaults, an optional TOML file, then `PLAINSPEAK_URL`.
//! Command-line overrides are applied by the binary on top.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::backend::DEFAULT_BASE_URL;
use crate::error::ConfigError;
use crate::progress::ProgressConfig;

pub const URL_ENV: &str = "PLAINSPEAK_URL";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub base_url: String,
    pub show_intro: bool,
    pub progress: ProgressSettings,
}

/// File form of [`ProgressConfig`], with durations in milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProgressSettings {
    pub tick_ms: u64,
    pub cap: f64,
    pub step_min: f64,
    pub step_max: f64,
    pub settle_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            show_intro: true,
            progress: ProgressSettings::default(),
        }
    }
}

impl Default for ProgressSettings {
    fn default() -> Self {
        let c = ProgressConfig::default();
        Self {
            tick_ms: c.tick.as_millis() as u64,
            cap: c.cap,
            step_min: c.step_min,
            step_max: c.step_max,
            settle_ms: c.settle.as_millis() as u64,
        }
    }
}

impl ProgressSettings {
    pub fn to_config(&self) -> ProgressConfig {
        ProgressConfig {
            tick: Duration::from_millis(self.tick_ms),
            cap: self.cap,
            step_min: self.step_min,
            step_max: self.step_max,
            settle: Duration::from_millis(self.settle_ms),
        }
    }
}

impl Settings {
    /// Defaults, overlaid with `path` when given, then with `PLAINSPEAK_URL`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        if let Ok(url) = std::env::var(URL_ENV) {
            if !url.trim().is_empty() {
                settings.base_url = url.trim().to_string();
            }
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Apply the command-line `--url`, the highest-precedence layer.
    pub fn with_url_override(mut self, url: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(url) = url {
            self.base_url = url.trim().to_string();
            self.validate()?;
        }
        Ok(self)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".into()));
        }
        let p = &self.progress;
        if p.tick_ms == 0 {
            return Err(ConfigError::Invalid("progress.tick_ms must be positive".into()));
        }
        if !(p.cap.is_finite() && p.cap > 0.0 && p.cap <= 100.0) {
            return Err(ConfigError::Invalid(format!(
                "progress.cap must be within (0, 100], got {}",
                p.cap
            )));
        }
        if !(p.step_min.is_finite()
            && p.step_max.is_finite()
            && p.step_min > 0.0
            && p.step_min <= p.step_max)
        {
            return Err(ConfigError::Invalid(format!(
                "progress steps need 0 < step_min <= step_max, got {}..{}",
                p.step_min, p.step_max
            )));
        }
        Ok(())
    }
}
