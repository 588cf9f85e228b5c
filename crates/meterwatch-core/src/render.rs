use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::estimator::EstimateResult;
use crate::monitor::MonitorStatus;

const CLOCK_FORMAT: &str = "%H:%M:%S";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Offset applied to rendered timestamps, e.g. 330 for IST.
    pub utc_offset_minutes: i32,
}

impl DisplayConfig {
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }
}

/// Styling hint for a rendered status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Warning,
    Estimate,
    Info,
}

fn format_with(secs: f64, cfg: &DisplayConfig, fmt: &str) -> String {
    if !secs.is_finite() {
        return format!("{secs}s");
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;
    match DateTime::<Utc>::from_timestamp(whole as i64, nanos.min(999_999_999)) {
        Some(dt) => dt.with_timezone(&cfg.offset()).format(fmt).to_string(),
        None => format!("{secs}s"),
    }
}

/// `HH:MM:SS` in the configured offset.
pub fn format_clock(secs: f64, cfg: &DisplayConfig) -> String {
    format_with(secs, cfg, CLOCK_FORMAT)
}

/// `YYYY-MM-DD HH:MM:SS` in the configured offset.
pub fn format_datetime(secs: f64, cfg: &DisplayConfig) -> String {
    format_with(secs, cfg, DATETIME_FORMAT)
}

pub fn render_estimate(result: &EstimateResult, cfg: &DisplayConfig) -> String {
    match result {
        EstimateResult::AlreadyCrossed { crossing_time } => {
            format!("Threshold reached at {}", format_clock(*crossing_time, cfg))
        }
        EstimateResult::PredictedCrossing { crossing_time } => format!(
            "Estimated to reach threshold at {}",
            format_datetime(*crossing_time, cfg)
        ),
        EstimateResult::NotExpected { reason } => reason.description().to_string(),
    }
}

pub fn render_status(status: &MonitorStatus, cfg: &DisplayConfig) -> String {
    match status {
        MonitorStatus::ReachedNow { at } => {
            format!("Threshold reached at {}", format_clock(*at, cfg))
        }
        MonitorStatus::Estimate(result) => render_estimate(result, cfg),
    }
}

pub fn status_kind(status: &MonitorStatus) -> StatusKind {
    match status {
        MonitorStatus::ReachedNow { .. }
        | MonitorStatus::Estimate(EstimateResult::AlreadyCrossed { .. }) => StatusKind::Warning,
        MonitorStatus::Estimate(EstimateResult::PredictedCrossing { .. }) => StatusKind::Estimate,
        MonitorStatus::Estimate(EstimateResult::NotExpected { .. }) => StatusKind::Info,
    }
}
