use log::debug;
use serde::{Deserialize, Serialize};

use crate::sample::Sample;
use crate::validation::validate_sample;

/// Window size used by the live prediction chart.
pub const DEFAULT_MAX_SAMPLES: usize = 200;

/// Retention bounds applied after every append.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesWindow {
    /// Hard cap on retained samples; oldest are evicted first.
    pub max_samples: usize,
    /// Drop samples older than `newest.time - retention_secs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_secs: Option<f64>,
}

impl Default for SeriesWindow {
    fn default() -> Self {
        Self {
            max_samples: DEFAULT_MAX_SAMPLES,
            retention_secs: None,
        }
    }
}

impl SeriesWindow {
    pub const fn with_max_samples(max_samples: usize) -> Self {
        Self {
            max_samples,
            retention_secs: None,
        }
    }
}

/// Result of offering one sample to a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Appended without eviction.
    Appended,
    /// Appended, and this many old samples were evicted.
    Evicted(usize),
    /// Rejected: not strictly newer than the last sample, or not finite.
    Dropped,
}

impl IngestOutcome {
    pub const fn accepted(&self) -> bool {
        !matches!(self, Self::Dropped)
    }
}

/// Time-ordered samples with strictly increasing `time`.
///
/// The only mutation path is [`Series::push`], which keeps the ordering
/// invariant and the window bounds. Deserialized series go through
/// [`Series::from_history`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SeriesRepr")]
pub struct Series {
    samples: Vec<Sample>,
    window: SeriesWindow,
}

#[derive(Deserialize)]
struct SeriesRepr {
    #[serde(default)]
    samples: Vec<Sample>,
    #[serde(default)]
    window: SeriesWindow,
}

impl From<SeriesRepr> for Series {
    fn from(repr: SeriesRepr) -> Self {
        Self::from_history(repr.samples, repr.window)
    }
}

impl Series {
    pub fn new(window: SeriesWindow) -> Self {
        Self {
            samples: Vec::new(),
            window,
        }
    }

    /// Build a series from an unordered batch (e.g. a history fetch).
    ///
    /// Samples are sorted by time; of several samples sharing a timestamp the
    /// first one wins. Non-finite samples are skipped.
    pub fn from_history<I>(samples: I, window: SeriesWindow) -> Self
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut batch: Vec<Sample> = samples
            .into_iter()
            .filter(|s| validate_sample(s).is_ok())
            .collect();
        // stable sort keeps arrival order among equal timestamps
        batch.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut series = Self::new(window);
        for sample in batch {
            series.push(sample);
        }
        series
    }

    /// Append `sample` if it is strictly newer than the last one, then apply
    /// the window. Older or duplicate samples are dropped silently.
    pub fn push(&mut self, sample: Sample) -> IngestOutcome {
        if let Err(e) = validate_sample(&sample) {
            debug!("dropping sample: {e}");
            return IngestOutcome::Dropped;
        }
        if let Some(last) = self.samples.last() {
            if sample.time <= last.time {
                debug!(
                    "dropping out-of-order sample at t={} (last t={})",
                    sample.time, last.time
                );
                return IngestOutcome::Dropped;
            }
        }
        self.samples.push(sample);

        let evicted = self.enforce_window();
        if evicted > 0 {
            IngestOutcome::Evicted(evicted)
        } else {
            IngestOutcome::Appended
        }
    }

    fn enforce_window(&mut self) -> usize {
        let Some(newest) = self.samples.last().copied() else {
            return 0;
        };
        let mut cut = 0;
        if let Some(retention) = self.window.retention_secs {
            let earliest = newest.time - retention;
            cut = self.samples.partition_point(|s| s.time < earliest);
        }
        let max = self.window.max_samples.max(1);
        let over = self.samples.len().saturating_sub(cut).saturating_sub(max);
        cut += over;
        if cut > 0 {
            self.samples.drain(..cut);
        }
        cut
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn window(&self) -> SeriesWindow {
        self.window
    }

    /// Samples strictly newer than `time`.
    pub fn after(&self, time: f64) -> &[Sample] {
        let start = self.samples.partition_point(|s| s.time <= time);
        &self.samples[start..]
    }

    /// BLAKE3 digest over the sample bit patterns, for replay comparisons.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        for s in &self.samples {
            hasher.update(&s.time.to_le_bytes());
            hasher.update(&s.value.to_le_bytes());
        }
        *hasher.finalize().as_bytes()
    }
}

impl AsRef<[Sample]> for Series {
    fn as_ref(&self) -> &[Sample] {
        &self.samples
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Value-in, value-out form of [`Series::push`].
pub fn ingest(mut series: Series, sample: Sample) -> Series {
    series.push(sample);
    series
}
