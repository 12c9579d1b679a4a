// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types for the telemetry pipeline.
//!
//! Each stage has its own error; [`LoadError`] is what a failed load reports.

use reqwest::StatusCode;

/// Network or transport failure while fetching a status blob.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build blob url for job {job_id}: {reason}")]
    Url { job_id: String, reason: String },
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
}

/// The fetched blob is not a sequence of event records.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("blob is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a sequence of records, found {found}")]
    NotASequence { found: &'static str },
    #[error("record {index} is not a valid event: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// A memory event whose payload is not exactly one recognised reading.
#[derive(Debug, thiserror::Error)]
pub enum MalformedMetricError {
    #[error("memory event at t={time} carries both a native and a runtime reading")]
    AmbiguousReading { time: f64 },
    #[error("memory event at t={time} carries neither a native nor a runtime reading")]
    MissingReading { time: f64 },
    #[error("memory event at t={time} has an invalid payload: {source}")]
    InvalidPayload {
        time: f64,
        #[source]
        source: serde_json::Error,
    },
    #[error("memory event at t={time} has an unreadable memory reading {value}")]
    InvalidReading { time: f64, value: String },
    #[error("memory event at t={time} has an unreadable disk usage value {value}")]
    InvalidDiskUsage { time: f64, value: String },
}

/// The ANSI converter rejected the transcript.
///
/// The joined, unconverted text is kept so callers can still show it.
#[derive(Debug, thiserror::Error)]
#[error("failed to convert transcript escape sequences: {reason}")]
pub struct RenderError {
    pub reason: String,
    pub raw: String,
}

impl RenderError {
    pub fn raw_text(&self) -> &str {
        &self.raw
    }

    pub fn into_raw_text(self) -> String {
        self.raw
    }
}

/// Why a load ended in the failed state.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    MalformedMetric(#[from] MalformedMetricError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("status log contains no records")]
    EmptyLog,
}

/// Errors that can occur while reading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
