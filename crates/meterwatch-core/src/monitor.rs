use std::borrow::Cow;
use std::num::NonZeroUsize;

use log::{debug, info, warn};
use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::bands::{ThresholdBand, ThresholdBands};
use crate::config::{ConfigError, MeterConfig};
use crate::estimator::{EstimateResult, EstimatorConfig, ThresholdTrendEstimator};
use crate::gauge::GaugeBounds;
use crate::sample::Sample;
use crate::series::{IngestOutcome, Series, SeriesWindow};

/// Which series a monitor evaluates against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationSource {
    Live,
    Forecast,
    /// Live samples followed by forecast samples newer than the last live one.
    #[default]
    Combined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub max_topics: usize,
    pub default_threshold: f64,
    pub source: EvaluationSource,
    /// Crossing-time movement below this is not reported as a change.
    pub change_epsilon_secs: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_topics: 64,
            default_threshold: 99.0,
            source: EvaluationSource::Combined,
            change_epsilon_secs: 1.0,
        }
    }
}

/// Validated per-monitor settings derived from [`MeterConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    pub window: SeriesWindow,
    pub estimator: EstimatorConfig,
    pub gauge: GaugeBounds,
    pub monitor: MonitorConfig,
}

impl MonitorSettings {
    pub fn from_config(cfg: &MeterConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            window: cfg.window,
            estimator: cfg.estimator,
            gauge: GaugeBounds::from_config(&cfg.gauge)?,
            monitor: cfg.monitor.clone(),
        })
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            window: SeriesWindow::default(),
            estimator: EstimatorConfig::default(),
            gauge: GaugeBounds::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonitorStatus {
    /// The newest evaluated value sits at or above the threshold without a
    /// recorded upward crossing (e.g. the series started above it).
    ReachedNow { at: f64 },
    Estimate(EstimateResult),
}

impl MonitorStatus {
    fn differs_from(&self, other: &Self, epsilon_secs: f64) -> bool {
        match (self, other) {
            // `at` follows the clock; staying above the threshold is not news
            (Self::ReachedNow { .. }, Self::ReachedNow { .. }) => false,
            (Self::Estimate(a), Self::Estimate(b)) => {
                if std::mem::discriminant(a) != std::mem::discriminant(b) {
                    return true;
                }
                match (a.crossing_time(), b.crossing_time()) {
                    (Some(x), Some(y)) => (x - y).abs() > epsilon_secs,
                    _ => a != b,
                }
            }
            _ => true,
        }
    }
}

/// Live and forecast series plus threshold state for one topic.
#[derive(Debug, Clone)]
pub struct TopicMonitor {
    topic: String,
    threshold: f64,
    live: Series,
    forecast: Series,
    estimator: ThresholdTrendEstimator,
    gauge: GaugeBounds,
    bands: ThresholdBands,
    cfg: MonitorConfig,
    last_reported: Option<MonitorStatus>,
}

impl TopicMonitor {
    pub fn new(topic: impl Into<String>, settings: &MonitorSettings) -> Self {
        Self {
            topic: topic.into(),
            threshold: settings.monitor.default_threshold,
            live: Series::new(settings.window),
            forecast: Series::new(settings.window),
            estimator: ThresholdTrendEstimator::new(settings.estimator),
            gauge: settings.gauge,
            bands: ThresholdBands::default(),
            cfg: settings.monitor.clone(),
            last_reported: None,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        if threshold.is_finite() && threshold != self.threshold {
            info!(
                "topic {}: threshold {} -> {}",
                self.topic, self.threshold, threshold
            );
            self.threshold = threshold;
        }
    }

    pub fn set_bands(&mut self, bands: ThresholdBands) {
        self.bands = bands;
    }

    /// Replace the live series with a history batch.
    pub fn load_history(&mut self, samples: Vec<Sample>) {
        self.live = Series::from_history(samples, self.live.window());
        debug!("topic {}: loaded {} history samples", self.topic, self.live.len());
    }

    pub fn push_live(&mut self, sample: Sample) -> IngestOutcome {
        self.live.push(sample)
    }

    pub fn push_forecast(&mut self, sample: Sample) -> IngestOutcome {
        self.forecast.push(sample)
    }

    pub fn live(&self) -> &Series {
        &self.live
    }

    pub fn forecast(&self) -> &Series {
        &self.forecast
    }

    /// Band the newest live reading falls into.
    pub fn band(&self) -> Option<&ThresholdBand> {
        self.live.last().and_then(|s| self.bands.classify(s.value))
    }

    /// Newest live reading pinned to the gauge range.
    pub fn gauge_reading(&self) -> Option<f64> {
        self.live.last().map(|s| self.gauge.clamp(s.value))
    }

    fn evaluation_series(&self) -> Cow<'_, [Sample]> {
        match self.cfg.source {
            EvaluationSource::Live => Cow::Borrowed(self.live.as_slice()),
            EvaluationSource::Forecast => Cow::Borrowed(self.forecast.as_slice()),
            EvaluationSource::Combined => match self.live.last() {
                None => Cow::Borrowed(self.forecast.as_slice()),
                Some(last) => {
                    let tail = self.forecast.after(last.time);
                    if tail.is_empty() {
                        Cow::Borrowed(self.live.as_slice())
                    } else {
                        let mut joined = Vec::with_capacity(self.live.len() + tail.len());
                        joined.extend_from_slice(self.live.as_slice());
                        joined.extend_from_slice(tail);
                        Cow::Owned(joined)
                    }
                }
            },
        }
    }

    /// Current status as of `now`. Does not touch change tracking.
    pub fn evaluate(&self, now: f64) -> MonitorStatus {
        let series = self.evaluation_series();
        let result = self.estimator.estimate(&series, self.threshold, now);
        if result.is_crossed() {
            return MonitorStatus::Estimate(result);
        }
        match series.last() {
            Some(newest) if newest.value >= self.threshold => MonitorStatus::ReachedNow { at: now },
            _ => MonitorStatus::Estimate(result),
        }
    }

    /// Evaluate and return the status only if it changed materially since
    /// the last reported one.
    pub fn poll(&mut self, now: f64) -> Option<MonitorStatus> {
        let status = self.evaluate(now);
        let changed = match &self.last_reported {
            Some(prev) => prev.differs_from(&status, self.cfg.change_epsilon_secs),
            None => true,
        };
        if changed {
            self.last_reported = Some(status);
            Some(status)
        } else {
            None
        }
    }
}

/// Topic-keyed monitors, bounded with least-recently-used eviction.
#[derive(Debug)]
pub struct MonitorRegistry {
    monitors: LruCache<String, TopicMonitor>,
    settings: MonitorSettings,
}

impl MonitorRegistry {
    pub fn new(settings: MonitorSettings) -> Self {
        let cap = NonZeroUsize::new(settings.monitor.max_topics).unwrap_or(NonZeroUsize::MIN);
        Self {
            monitors: LruCache::new(cap),
            settings,
        }
    }

    pub fn from_config(cfg: &MeterConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(MonitorSettings::from_config(cfg)?))
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Monitor for `topic`, creating it if needed.
    pub fn monitor(&mut self, topic: &str) -> &mut TopicMonitor {
        if !self.monitors.contains(topic) {
            if self.monitors.len() == self.monitors.cap().get() {
                if let Some((evicted, _)) = self.monitors.peek_lru() {
                    warn!("evicting monitor for topic {evicted}");
                }
            }
            info!("creating monitor for topic {topic}");
        }
        let settings = &self.settings;
        self.monitors
            .get_or_insert_mut(topic.to_string(), || TopicMonitor::new(topic, settings))
    }

    pub fn get(&mut self, topic: &str) -> Option<&mut TopicMonitor> {
        self.monitors.get_mut(topic)
    }

    pub fn remove(&mut self, topic: &str) -> Option<TopicMonitor> {
        self.monitors.pop(topic)
    }

    /// Route a live sample to its topic's monitor.
    pub fn ingest_live(&mut self, topic: &str, sample: Sample) -> IngestOutcome {
        self.monitor(topic).push_live(sample)
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.monitors.iter().map(|(k, _)| k.as_str())
    }
}
