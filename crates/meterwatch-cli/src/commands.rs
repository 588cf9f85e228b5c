use std::fmt::Write as _;
use std::io::BufRead;

use log::{info, warn};
use meterwatch_core::{
    decode_any, decode_live, export_csv, format_clock, render_estimate, render_status, ConfigError,
    FeedError, MeterConfig, MonitorRegistry, Series, SignalGenerator, ThresholdTrendEstimator,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn estimate(
    input: &str,
    threshold: f64,
    now: f64,
    json: bool,
    cfg: &MeterConfig,
) -> Result<String, CliError> {
    let series = Series::from_history(decode_any(input)?, cfg.window);
    info!("estimating over {} samples", series.len());
    let result =
        ThresholdTrendEstimator::new(cfg.estimator).estimate(series.as_slice(), threshold, now);
    if json {
        Ok(serde_json::to_string(&result)?)
    } else {
        Ok(render_estimate(&result, &cfg.display))
    }
}

/// Feed live-event lines through a monitor, one status line per change.
///
/// The replay clock is the timestamp of the event being processed.
pub fn replay<R: BufRead>(
    reader: R,
    topic: &str,
    threshold: Option<f64>,
    cfg: &MeterConfig,
) -> Result<String, CliError> {
    let mut registry = MonitorRegistry::from_config(cfg)?;
    let monitor = registry.monitor(topic);
    if let Some(threshold) = threshold {
        monitor.set_threshold(threshold);
    }

    let mut out = String::new();
    let (mut accepted, mut skipped) = (0usize, 0usize);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let sample = match decode_live(&line) {
            Ok(sample) => sample,
            Err(e) => {
                warn!("line {}: {e}", lineno + 1);
                skipped += 1;
                continue;
            }
        };
        if !monitor.push_live(sample).accepted() {
            skipped += 1;
            continue;
        }
        accepted += 1;
        if let Some(status) = monitor.poll(sample.time) {
            let _ = writeln!(
                out,
                "[{}] {}",
                format_clock(sample.time, &cfg.display),
                render_status(&status, &cfg.display)
            );
        }
    }
    info!("replayed {accepted} samples, skipped {skipped}");
    let _ = writeln!(out, "fingerprint {}", hex::encode(monitor.live().fingerprint()));
    Ok(out)
}

pub fn simulate(count: usize, seed: u64, start: f64, step_secs: f64) -> Result<String, CliError> {
    let samples: Vec<_> = SignalGenerator::new(seed, start)
        .with_step(step_secs)
        .take(count)
        .collect();
    Ok(serde_json::to_string_pretty(&samples)?)
}

pub fn export(input: &str, cfg: &MeterConfig) -> Result<String, CliError> {
    let series = Series::from_history(decode_any(input)?, cfg.window);
    Ok(export_csv(series.as_slice(), &cfg.display))
}

pub fn show_config(cfg: &MeterConfig) -> Result<String, CliError> {
    Ok(cfg.to_toml()?)
}
