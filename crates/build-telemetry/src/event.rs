// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Event records as written to a job's status blob.
//!
//! A status blob is a JSON array of records, each with a tag, a time offset in
//! seconds since the job started and a free-form `data` payload. Records are kept
//! with their payload untouched so unknown tags survive decoding; the memory
//! payload is only given a typed shape when a memory sample is interpreted.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::constants::KIB;
use crate::errors::{DecodeError, MalformedMetricError};

/// One entry of a build job's raw log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Semantic tag of the record. The worker writes it as `msg`.
    #[serde(rename = "msg", alias = "kind")]
    pub kind: String,
    /// Seconds since the job started.
    pub time: f64,
    pub data: Value,
}

impl EventRecord {
    pub fn new(kind: impl Into<String>, time: f64, data: Value) -> Self {
        Self {
            kind: kind.into(),
            time,
            data,
        }
    }

    /// The text carried by a log line record, if any.
    pub fn text_line(&self) -> Option<&str> {
        self.data.get("msg").and_then(Value::as_str)
    }
}

/// Decodes a raw status blob into its ordered records.
pub fn decode_events(bytes: &[u8]) -> Result<Vec<EventRecord>, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)?;
    decode_value(value)
}

/// Decodes an already parsed JSON document into its ordered records.
pub fn decode_value(value: Value) -> Result<Vec<EventRecord>, DecodeError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(DecodeError::NotASequence {
                found: json_type_name(&other),
            })
        }
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<EventRecord>(item)
                .map_err(|source| DecodeError::InvalidRecord { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(index) = records.windows(2).position(|pair| pair[1].time < pair[0].time) {
        warn!(
            "Record {} goes back in time ({} < {}), keeping emission order",
            index + 1,
            records[index + 1].time,
            records[index].time
        );
    }

    Ok(records)
}

/// Serializes records back into the blob format.
pub fn encode_events(records: &[EventRecord]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(records)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Memory reading of a sample, by the tool that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemoryReading {
    /// Reported by the compiler itself, in kibibytes.
    Native { kib: f64 },
    /// Resident set size reported by the worker's runtime sampler, in bytes.
    Runtime { rss_bytes: u64 },
}

impl MemoryReading {
    pub fn bytes(&self) -> u64 {
        match *self {
            MemoryReading::Native { kib } => kib_to_bytes(kib),
            MemoryReading::Runtime { rss_bytes } => rss_bytes,
        }
    }
}

// Float to int casts saturate, so oversized readings clamp to u64::MAX.
fn kib_to_bytes(kib: f64) -> u64 {
    (kib * KIB as f64).round() as u64
}

/// Reads a non-negative number given either as a JSON number or a numeric string.
fn numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (number.is_finite() && number >= 0.0).then_some(number)
}

/// One row of a `df` style disk usage table.
///
/// Rows are kept loosely typed: only the row for the mount being read has to
/// carry a usable `Used` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskUsage {
    pub mounted: Option<String>,
    pub used: Value,
}

impl DiskUsage {
    fn from_row(row: &Value) -> Self {
        Self {
            mounted: row
                .get("Mounted")
                .and_then(Value::as_str)
                .map(str::to_string),
            used: row.get("Used").cloned().unwrap_or(Value::Null),
        }
    }
}

/// Typed payload of a memory sample record.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryPayload {
    pub reading: MemoryReading,
    pub disk: Option<Vec<DiskUsage>>,
}

#[derive(Deserialize)]
struct RawMemoryPayload {
    #[serde(rename = "memoryUsage")]
    memory_usage: Option<Value>,
    memory: Option<RuntimeMemory>,
    disk: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct RuntimeMemory {
    rss: Value,
}

impl MemoryPayload {
    /// Interprets the payload of a memory sample record.
    ///
    /// Exactly one of the native (`memoryUsage`) and runtime (`memory.rss`)
    /// readings must be present. Readings may be integers, fractions or
    /// numeric strings.
    pub fn from_record(record: &EventRecord) -> Result<Self, MalformedMetricError> {
        let time = record.time;
        if record.data.is_null() {
            return Err(MalformedMetricError::MissingReading { time });
        }
        let raw = RawMemoryPayload::deserialize(&record.data)
            .map_err(|source| MalformedMetricError::InvalidPayload { time, source })?;

        let read = |value: &Value| {
            numeric(value).ok_or_else(|| MalformedMetricError::InvalidReading {
                time,
                value: value.to_string(),
            })
        };
        let reading = match (raw.memory_usage, raw.memory) {
            (Some(kib), None) => MemoryReading::Native { kib: read(&kib)? },
            (None, Some(memory)) => MemoryReading::Runtime {
                rss_bytes: read(&memory.rss)?.round() as u64,
            },
            (Some(_), Some(_)) => return Err(MalformedMetricError::AmbiguousReading { time }),
            (None, None) => return Err(MalformedMetricError::MissingReading { time }),
        };

        Ok(Self {
            reading,
            disk: raw
                .disk
                .map(|rows| rows.iter().map(DiskUsage::from_row).collect()),
        })
    }

    /// Bytes used on `mount`, or 0 when the sample has no entry for it.
    pub fn disk_used_bytes(&self, mount: &str, time: f64) -> Result<u64, MalformedMetricError> {
        let Some(entry) = self
            .disk
            .as_deref()
            .and_then(|rows| rows.iter().find(|row| row.mounted.as_deref() == Some(mount)))
        else {
            return Ok(0);
        };

        numeric(&entry.used)
            .map(kib_to_bytes)
            .ok_or_else(|| MalformedMetricError::InvalidDiskUsage {
                time,
                value: entry.used.to_string(),
            })
    }
}

/// Identifier of a build job, used to key status blobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(String);

impl JobId {
    /// Validates a job identifier.
    ///
    /// Identifiers end up in the blob URL path, so only ASCII alphanumerics,
    /// `-` and `_` are accepted.
    pub fn new(id: &str) -> Option<Self> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Some(invalid_char) = trimmed
            .chars()
            .find(|&ch| !ch.is_ascii_alphanumeric() && ch != '-' && ch != '_')
        {
            tracing::error!(
                "Job id '{}' contains invalid character '{}'. Only ASCII alphanumerics, '-' and '_' are allowed.",
                trimmed,
                invalid_char
            );
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
