use thiserror::Error;

use crate::sample::Sample;

/// Input validation layer for telemetry samples.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("non-finite sample time: {0}")]
    NonFiniteTime(f64),
    #[error("non-finite sample value: {0}")]
    NonFiniteValue(f64),
}

/// Validate a sample before it enters a series.
pub fn validate_sample(sample: &Sample) -> Result<(), SampleError> {
    if !sample.time.is_finite() {
        return Err(SampleError::NonFiniteTime(sample.time));
    }
    if !sample.value.is_finite() {
        return Err(SampleError::NonFiniteValue(sample.value));
    }
    Ok(())
}

/// Validate a batch, reporting the first offending sample.
pub fn validate_samples(samples: &[Sample]) -> Result<(), SampleError> {
    samples.iter().try_for_each(validate_sample)
}
