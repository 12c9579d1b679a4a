// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Fetch-and-derive cycle for build status blobs.
//!
//! A [`LoadOrchestrator`] owns one memoized outcome per job identifier. The first
//! [`LoadOrchestrator::load`] for a job fetches its blob, decodes it and derives
//! the transcript and usage series; concurrent and later calls for the same job
//! wait for and reuse that outcome instead of fetching again. Loads of different
//! jobs share nothing and cannot affect each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::{debug, error, warn};

use crate::ansi::AnsiConverter;
use crate::classify::{Classifier, EventKinds};
use crate::config::TelemetryConfig;
use crate::errors::{FetchError, LoadError};
use crate::event::{decode_events, EventRecord, JobId};
use crate::fetch::{BlobFetcher, HttpBlobFetcher};
use crate::metrics::{extract_series, peak, MetricSample};
use crate::transcript::{render_transcript, Transcript};

/// Everything derived from one job's status blob.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult {
    transcript: Transcript,
    duration: f64,
    series: Vec<MetricSample>,
}

impl LoadResult {
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Seconds from job start to its last record.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn duration_display(&self) -> String {
        format!("{:.2}", self.duration)
    }

    pub fn series(&self) -> &[MetricSample] {
        &self.series
    }

    /// The usage chart and duration are only worth showing with samples.
    pub fn has_series(&self) -> bool {
        !self.series.is_empty()
    }

    pub fn peak_memory_bytes(&self) -> u64 {
        peak(&self.series).memory_bytes
    }

    pub fn peak_disk_bytes(&self) -> u64 {
        peak(&self.series).disk_bytes
    }
}

/// Load state of a job as seen by presentation.
#[derive(Debug, Clone)]
pub enum LoadState {
    Pending,
    Failed(Arc<LoadError>),
    Ready(Arc<LoadResult>),
}

impl LoadState {
    pub fn tag(&self) -> &'static str {
        match self {
            LoadState::Pending => "pending",
            LoadState::Failed(_) => "failed",
            LoadState::Ready(_) => "ready",
        }
    }

    pub fn status_message(&self) -> &'static str {
        match self {
            LoadState::Pending => "Loading build status...",
            LoadState::Failed(_) => "Error loading build status!",
            LoadState::Ready(_) => "Build status loaded",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadState::Pending)
    }
}

type Outcome = Result<Arc<LoadResult>, Arc<LoadError>>;

pub struct LoadOrchestrator {
    fetcher: Arc<dyn BlobFetcher>,
    classifier: Classifier,
    converter: AnsiConverter,
    strict_render: bool,
    jobs: Mutex<HashMap<JobId, Arc<OnceCell<Outcome>>>>,
}

impl LoadOrchestrator {
    pub fn new(fetcher: Arc<dyn BlobFetcher>) -> Self {
        Self {
            fetcher,
            classifier: Classifier::default(),
            converter: AnsiConverter::default(),
            strict_render: false,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Builds an orchestrator fetching over HTTP as configured.
    pub fn from_config(config: &TelemetryConfig) -> Result<Self, FetchError> {
        let fetcher = HttpBlobFetcher::from_config(config)?;
        Ok(Self::new(Arc::new(fetcher))
            .with_converter(AnsiConverter::new(config.escape_html))
            .with_strict_render(config.strict_render))
    }

    pub fn with_kinds(mut self, kinds: EventKinds) -> Self {
        self.classifier = Classifier::new(kinds);
        self
    }

    pub fn with_converter(mut self, converter: AnsiConverter) -> Self {
        self.converter = converter;
        self
    }

    /// Fail loads whose transcript cannot be styled instead of keeping plain text.
    pub fn with_strict_render(mut self, strict_render: bool) -> Self {
        self.strict_render = strict_render;
        self
    }

    fn cell(&self, job_id: &JobId) -> Arc<OnceCell<Outcome>> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(jobs.entry(job_id.clone()).or_default())
    }

    /// Loads a job, fetching its blob only the first time it is asked for.
    #[tracing::instrument(name = "load", skip_all, fields(job_id = %job_id))]
    pub async fn load(&self, job_id: &JobId) -> Result<Arc<LoadResult>, Arc<LoadError>> {
        let cell = self.cell(job_id);
        if cell.initialized() {
            debug!("Reusing memoized status for job {job_id}");
        }
        cell.get_or_init(|| async {
            match self.fetch_and_derive(job_id).await {
                Ok(result) => Ok(Arc::new(result)),
                Err(e) => {
                    error!("Failed to load build status for job {job_id}: {e}");
                    Err(Arc::new(e))
                }
            }
        })
        .await
        .clone()
    }

    /// Current state of a job. Jobs never asked for are pending.
    pub fn state(&self, job_id: &JobId) -> LoadState {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        match jobs.get(job_id).and_then(|cell| cell.get()) {
            None => LoadState::Pending,
            Some(Ok(result)) => LoadState::Ready(Arc::clone(result)),
            Some(Err(e)) => LoadState::Failed(Arc::clone(e)),
        }
    }

    /// Drops the memoized outcome of a job so the next load fetches again.
    pub fn forget(&self, job_id: &JobId) -> bool {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.remove(job_id).is_some()
    }

    async fn fetch_and_derive(&self, job_id: &JobId) -> Result<LoadResult, LoadError> {
        let bytes = self.fetcher.fetch(job_id).await?;
        let records = decode_events(&bytes)?;
        debug!("Decoded {} records", records.len());
        self.derive(&records)
    }

    /// Derives the transcript, duration and usage series from decoded records.
    pub fn derive(&self, records: &[EventRecord]) -> Result<LoadResult, LoadError> {
        let last = records.last().ok_or(LoadError::EmptyLog)?;
        let classified = self.classifier.classify(records);

        let series = extract_series(classified.memory_events.iter().copied())?;
        let transcript =
            match render_transcript(classified.text_events.iter().copied(), &self.converter) {
                Ok(transcript) => transcript,
                Err(e) if !self.strict_render => {
                    warn!("Showing plain transcript: {e}");
                    Transcript::Plain(e.into_raw_text())
                }
                Err(e) => return Err(e.into()),
            };

        Ok(LoadResult {
            transcript,
            duration: last.time,
            series,
        })
    }
}
