use serde::{Deserialize, Serialize};

/// A colored threshold level attached to a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    pub value: f64,
    pub color: String,
}

impl ThresholdBand {
    pub fn new(value: f64, color: impl Into<String>) -> Self {
        Self {
            value,
            color: color.into(),
        }
    }
}

/// Threshold levels kept in ascending order of `value`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ThresholdBand>", into = "Vec<ThresholdBand>")]
pub struct ThresholdBands {
    bands: Vec<ThresholdBand>,
}

impl ThresholdBands {
    pub fn new(bands: Vec<ThresholdBand>) -> Self {
        let mut bands: Vec<ThresholdBand> =
            bands.into_iter().filter(|b| b.value.is_finite()).collect();
        bands.sort_by(|a, b| a.value.total_cmp(&b.value));
        Self { bands }
    }

    /// Highest band the value is strictly above, if any.
    pub fn classify(&self, value: f64) -> Option<&ThresholdBand> {
        self.bands.iter().rev().find(|b| value > b.value)
    }

    pub fn as_slice(&self) -> &[ThresholdBand] {
        &self.bands
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

impl From<Vec<ThresholdBand>> for ThresholdBands {
    fn from(bands: Vec<ThresholdBand>) -> Self {
        Self::new(bands)
    }
}

impl From<ThresholdBands> for Vec<ThresholdBand> {
    fn from(bands: ThresholdBands) -> Self {
        bands.bands
    }
}
