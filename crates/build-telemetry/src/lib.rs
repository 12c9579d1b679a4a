// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! # Build Telemetry
//!
//! Ingestion and normalization of the status blobs written by asynchronous build
//! jobs. A status blob is a flat, timestamped event log; this crate turns it into
//! a styled transcript of the compiler output and a memory/disk usage series.
//!
//! ## Pipeline
//!
//! - [`event`]: decoding of raw bytes into ordered [`event::EventRecord`]s
//! - [`classify`]: partitioning of records into log lines and memory samples
//! - [`metrics`]: normalization of memory samples into a byte-valued series
//! - [`transcript`]: joining of log lines and conversion of escape sequences
//! - [`orchestrator`]: the single fetch-and-derive cycle per job, memoized by job id

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod ansi;
pub mod classify;
pub mod config;
pub mod constants;
pub mod errors;
pub mod event;
pub mod fetch;
pub mod format;
pub mod metrics;
pub mod orchestrator;
pub mod transcript;

pub use config::TelemetryConfig;
pub use errors::{
    ConfigError, DecodeError, FetchError, LoadError, MalformedMetricError, RenderError,
};
pub use event::{EventRecord, JobId};
pub use fetch::{BlobFetcher, HttpBlobFetcher};
pub use metrics::MetricSample;
pub use orchestrator::{LoadOrchestrator, LoadResult, LoadState};
pub use transcript::Transcript;
