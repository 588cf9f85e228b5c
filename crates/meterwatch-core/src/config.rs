use std::path::Path;

use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::estimator::EstimatorConfig;
use crate::gauge::{GaugeBounds, GaugeConfig, GaugeError};
use crate::monitor::MonitorConfig;
use crate::render::DisplayConfig;
use crate::series::SeriesWindow;

/// Environment variables override file settings, e.g.
/// `METERWATCH__WINDOW__MAX_SAMPLES=300`.
pub const ENV_PREFIX: &str = "METERWATCH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error(transparent)]
    Gauge(#[from] GaugeError),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    pub window: SeriesWindow,
    pub estimator: EstimatorConfig,
    pub gauge: GaugeConfig,
    pub display: DisplayConfig,
    pub monitor: MonitorConfig,
}

impl MeterConfig {
    /// Defaults, then the optional TOML file, then `METERWATCH__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );
        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = config::Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.max_samples < 2 {
            return Err(invalid("window.max_samples", "must be at least 2"));
        }
        if let Some(secs) = self.window.retention_secs {
            if !(secs.is_finite() && secs > 0.0) {
                return Err(invalid("window.retention_secs", "must be a positive number"));
            }
        }
        if self.estimator.lookback < 2 {
            return Err(invalid("estimator.lookback", "must be at least 2"));
        }
        GaugeBounds::from_config(&self.gauge)?;
        if self.display.utc_offset_minutes.unsigned_abs() >= 24 * 60 {
            return Err(invalid(
                "display.utc_offset_minutes",
                "must be within one day of UTC",
            ));
        }
        if self.monitor.max_topics == 0 {
            return Err(invalid("monitor.max_topics", "must be at least 1"));
        }
        if !self.monitor.default_threshold.is_finite() {
            return Err(invalid("monitor.default_threshold", "must be finite"));
        }
        if !(self.monitor.change_epsilon_secs >= 0.0) {
            return Err(invalid("monitor.change_epsilon_secs", "must be >= 0"));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
