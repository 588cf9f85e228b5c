//! Decoding of live-feed events and history payloads into samples.
//!
//! Live events look like
//! `{"success": true, "message": {"message": {"message": "42.5"}, "timestamp": "..."}}`;
//! history fetches return `{"messages": [{"timestamp": ..., "message": "42.5"}]}`.
//! Timestamps are RFC 3339 strings or epoch milliseconds and are floored to
//! whole seconds.

use chrono::{DateTime, NaiveDateTime};
use log::warn;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::sample::Sample;
use crate::validation::{validate_sample, validate_samples, SampleError};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid timestamp: {0}")]
    Timestamp(String),
    #[error("invalid reading: {0}")]
    Value(String),
    #[error("feed reported an unsuccessful message")]
    Rejected,
    #[error("unrecognised payload shape")]
    UnknownShape,
    #[error(transparent)]
    Sample(#[from] SampleError),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawReading {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct LiveEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<LiveMessage>,
}

#[derive(Debug, Deserialize)]
struct LiveMessage {
    message: LivePayload,
    timestamp: RawTimestamp,
}

#[derive(Debug, Deserialize)]
struct LivePayload {
    message: RawReading,
}

#[derive(Debug, Deserialize)]
struct HistoryPayload {
    #[serde(default)]
    messages: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
    timestamp: RawTimestamp,
    message: RawReading,
}

fn parse_timestamp(raw: &RawTimestamp) -> Result<f64, FeedError> {
    let secs = match raw {
        RawTimestamp::Millis(ms) => (ms / 1000.0).floor(),
        RawTimestamp::Text(text) => {
            let text = text.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                dt.timestamp() as f64
            } else if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
                // no offset given: treat as UTC
                naive.and_utc().timestamp() as f64
            } else {
                return Err(FeedError::Timestamp(text.to_string()));
            }
        }
    };
    if secs.is_finite() {
        Ok(secs)
    } else {
        Err(FeedError::Timestamp(format!("{secs}")))
    }
}

/// Longest leading decimal number in `text`, so `"42.5 °C"` reads as 42.5.
fn leading_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let digits = |from: usize| {
        bytes
            .get(from..)
            .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int = digits(end);
    end += int;
    let mut frac = 0;
    if bytes.get(end) == Some(&b'.') {
        frac = digits(end + 1);
        end += 1 + frac;
    }
    if int + frac == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let n = digits(exp);
        if n > 0 {
            end = exp + n;
        }
    }
    text[..end].parse().ok()
}

fn parse_reading(raw: &RawReading) -> Result<f64, FeedError> {
    match raw {
        RawReading::Number(v) => Ok(*v),
        RawReading::Text(text) => {
            leading_number(text.trim_start()).ok_or_else(|| FeedError::Value(text.clone()))
        }
    }
}

fn to_sample(timestamp: &RawTimestamp, reading: &RawReading) -> Result<Sample, FeedError> {
    let sample = Sample::new(parse_timestamp(timestamp)?, parse_reading(reading)?);
    validate_sample(&sample)?;
    Ok(sample)
}

/// Decode one live-feed event.
pub fn decode_live(json: &str) -> Result<Sample, FeedError> {
    let envelope: LiveEnvelope = serde_json::from_str(json)?;
    if !envelope.success {
        return Err(FeedError::Rejected);
    }
    let msg = envelope.message.ok_or(FeedError::UnknownShape)?;
    to_sample(&msg.timestamp, &msg.message.message)
}

fn history_samples(payload: HistoryPayload) -> Vec<Sample> {
    payload
        .messages
        .iter()
        .filter_map(|entry| match to_sample(&entry.timestamp, &entry.message) {
            Ok(sample) => Some(sample),
            Err(e) => {
                warn!("skipping history entry: {e}");
                None
            }
        })
        .collect()
}

/// Decode a history payload. Entries that fail to decode are skipped.
///
/// The result keeps payload order; use [`crate::Series::from_history`] to
/// sort and de-duplicate.
pub fn decode_history(json: &str) -> Result<Vec<Sample>, FeedError> {
    let payload: HistoryPayload = serde_json::from_str(json)?;
    Ok(history_samples(payload))
}

/// Decode a plain `[{"time": .., "value": ..}]` list.
pub fn decode_samples(json: &str) -> Result<Vec<Sample>, FeedError> {
    let samples: Vec<Sample> = serde_json::from_str(json)?;
    validate_samples(&samples)?;
    Ok(samples)
}

/// Decode either a plain sample list or a history payload.
pub fn decode_any(json: &str) -> Result<Vec<Sample>, FeedError> {
    match serde_json::from_str::<Value>(json)? {
        v @ Value::Array(_) => {
            let samples: Vec<Sample> = serde_json::from_value(v)?;
            validate_samples(&samples)?;
            Ok(samples)
        }
        v @ Value::Object(_) => {
            let payload: HistoryPayload = serde_json::from_value(v)?;
            Ok(history_samples(payload))
        }
        _ => Err(FeedError::UnknownShape),
    }
}
