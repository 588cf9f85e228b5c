use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    pub min: f64,
    pub max: f64,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            min: -500.0,
            max: 500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GaugeError {
    #[error("gauge minimum must be less than maximum (min={min}, max={max})")]
    InvertedBounds { min: f64, max: f64 },
    #[error("gauge bounds must be finite (min={min}, max={max})")]
    NonFinite { min: f64, max: f64 },
}

/// Validated dial range for a digital meter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeBounds {
    min: f64,
    max: f64,
}

impl GaugeBounds {
    pub fn new(min: f64, max: f64) -> Result<Self, GaugeError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(GaugeError::NonFinite { min, max });
        }
        if min >= max {
            return Err(GaugeError::InvertedBounds { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn from_config(cfg: &GaugeConfig) -> Result<Self, GaugeError> {
        Self::new(cfg.min, cfg.max)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Pin a reading to the dial range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Needle position in `0.0..=1.0`.
    pub fn fraction(&self, value: f64) -> f64 {
        (self.clamp(value) - self.min) / (self.max - self.min)
    }
}

impl Default for GaugeBounds {
    fn default() -> Self {
        let cfg = GaugeConfig::default();
        Self {
            min: cfg.min,
            max: cfg.max,
        }
    }
}
