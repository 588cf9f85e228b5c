//! Threshold-crossing trend estimator.
//!
//! Given a time-ordered series and a threshold, reports either the
//! interpolated instant the series already crossed the threshold, a linear
//! extrapolation of when it will, or why no crossing is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sample::Sample;

/// Number of trailing samples fed to the trend fit.
pub const DEFAULT_LOOKBACK: usize = 5;

/// Why no crossing time could be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotExpectedReason {
    /// Fewer than two samples, or a degenerate regression window.
    InsufficientData,
    /// Fitted slope is zero or negative.
    TrendNotIncreasing,
    /// The first two samples of the window share a timestamp.
    DegenerateInterval,
    /// The extrapolated crossing lies at or before `now`.
    StaleExtrapolation,
}

impl NotExpectedReason {
    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InsufficientData => "insufficient_data",
            Self::TrendNotIncreasing => "trend_not_increasing",
            Self::DegenerateInterval => "degenerate_interval",
            Self::StaleExtrapolation => "stale_extrapolation",
        }
    }

    /// Display text for dashboards.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InsufficientData => "Not enough data to predict",
            Self::TrendNotIncreasing => "Trend not increasing - threshold not expected",
            Self::DegenerateInterval => "Sampling interval too small to predict",
            Self::StaleExtrapolation => "Threshold not expected to be reached with current trend",
        }
    }
}

impl fmt::Display for NotExpectedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of one estimation pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimateResult {
    /// The series crossed the threshold between two consecutive samples.
    AlreadyCrossed { crossing_time: f64 },
    /// No crossing yet; the rising trend reaches the threshold after `now`.
    PredictedCrossing { crossing_time: f64 },
    NotExpected { reason: NotExpectedReason },
}

impl EstimateResult {
    pub const fn not_expected(reason: NotExpectedReason) -> Self {
        Self::NotExpected { reason }
    }

    pub const fn crossing_time(&self) -> Option<f64> {
        match self {
            Self::AlreadyCrossed { crossing_time } | Self::PredictedCrossing { crossing_time } => {
                Some(*crossing_time)
            }
            Self::NotExpected { .. } => None,
        }
    }

    pub const fn reason(&self) -> Option<NotExpectedReason> {
        match self {
            Self::NotExpected { reason } => Some(*reason),
            _ => None,
        }
    }

    pub const fn is_crossed(&self) -> bool {
        matches!(self, Self::AlreadyCrossed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Trailing samples used for the trend fit; values below 2 act as 2.
    pub lookback: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_LOOKBACK,
        }
    }
}

/// Least-squares line of value against sample index (`0..n`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

/// Fit `value = slope * i + intercept` over the window's sample indices.
///
/// Returns `None` when the normal equations are singular (fewer than two
/// samples).
pub fn fit_trend(window: &[Sample]) -> Option<TrendLine> {
    let n = window.len() as f64;
    let (mut sum_i, mut sum_y, mut sum_iy, mut sum_ii) = (0.0, 0.0, 0.0, 0.0);
    for (i, s) in window.iter().enumerate() {
        let i = i as f64;
        sum_i += i;
        sum_y += s.value;
        sum_iy += i * s.value;
        sum_ii += i * i;
    }

    let denom = n * sum_ii - sum_i * sum_i;
    if denom.abs() <= f64::EPSILON {
        return None;
    }
    let slope = (n * sum_iy - sum_i * sum_y) / denom;
    let intercept = (sum_y - slope * sum_i) / n;
    Some(TrendLine { slope, intercept })
}

/// Interpolated time of the earliest upward crossing, if any.
///
/// A pair counts only when `prev <= threshold < curr`; landing exactly on
/// the threshold is not a crossing.
pub fn find_crossing(series: &[Sample], threshold: f64) -> Option<f64> {
    series.windows(2).find_map(|pair| {
        let (prev, curr) = (pair[0], pair[1]);
        if prev.value <= threshold && curr.value > threshold {
            let t = (threshold - prev.value) / (curr.value - prev.value);
            Some(prev.time + t * (curr.time - prev.time))
        } else {
            None
        }
    })
}

/// Stateless estimator; the config only tunes the trend window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThresholdTrendEstimator {
    pub cfg: EstimatorConfig,
}

impl ThresholdTrendEstimator {
    pub fn new(cfg: EstimatorConfig) -> Self {
        Self { cfg }
    }

    /// Evaluate `series` against `threshold` as of `now` (Unix seconds).
    ///
    /// Crossing detection runs first and wins over any extrapolation.
    pub fn estimate(&self, series: &[Sample], threshold: f64, now: f64) -> EstimateResult {
        if let Some(crossing_time) = find_crossing(series, threshold) {
            return EstimateResult::AlreadyCrossed { crossing_time };
        }
        if series.len() < 2 {
            return EstimateResult::not_expected(NotExpectedReason::InsufficientData);
        }

        let lookback = self.cfg.lookback.max(2);
        let window = &series[series.len().saturating_sub(lookback)..];
        let Some(line) = fit_trend(window) else {
            return EstimateResult::not_expected(NotExpectedReason::InsufficientData);
        };
        // NaN slope falls through here as well
        if !(line.slope > 0.0) {
            return EstimateResult::not_expected(NotExpectedReason::TrendNotIncreasing);
        }

        // Index steps are converted to seconds using the window's first
        // interval; irregular sampling inside the window is not corrected.
        let time_step = window[1].time - window[0].time;
        if !(time_step > 0.0) {
            return EstimateResult::not_expected(NotExpectedReason::DegenerateInterval);
        }

        let points_to_threshold = (threshold - line.intercept) / line.slope;
        let last = window[window.len() - 1];
        let crossing_time = last.time + points_to_threshold * time_step;
        if !crossing_time.is_finite() {
            return EstimateResult::not_expected(NotExpectedReason::DegenerateInterval);
        }

        if crossing_time > now {
            EstimateResult::PredictedCrossing { crossing_time }
        } else {
            EstimateResult::not_expected(NotExpectedReason::StaleExtrapolation)
        }
    }
}

/// [`ThresholdTrendEstimator::estimate`] with the default five-sample window.
pub fn estimate(series: &[Sample], threshold: f64, now: f64) -> EstimateResult {
    ThresholdTrendEstimator::default().estimate(series, threshold, now)
}
