// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod logger;

use std::{env, process, sync::Arc};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use build_telemetry::{
    constants::DEFAULT_LOG_LEVEL,
    format::{format_bytes, format_duration},
    JobId, LoadError, LoadOrchestrator, LoadResult, TelemetryConfig,
};

fn init_logging(log_level: &str) {
    let env_filter = format!("h2=off,hyper=off,rustls=off,reqwest=off,{log_level}");

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_writer(std::io::stderr)
        .event_format(logger::Formatter)
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");
}

/// Validated, de-duplicated job ids in argument order, plus whether any argument was rejected.
fn parse_job_ids<I>(args: I) -> (Vec<JobId>, bool)
where
    I: IntoIterator<Item = String>,
{
    let mut job_ids: Vec<JobId> = Vec::new();
    let mut rejected = false;
    for arg in args {
        match JobId::new(&arg) {
            Some(job_id) if !job_ids.contains(&job_id) => job_ids.push(job_id),
            Some(_) => {}
            None => rejected = true,
        }
    }
    (job_ids, rejected)
}

fn summary_line(job_id: &JobId, outcome: &Result<Arc<LoadResult>, Arc<LoadError>>) -> String {
    match outcome {
        Ok(result) => format!(
            "job {job_id}: ready duration={} samples={} peak_memory={} peak_disk={}",
            format_duration(result.duration()),
            result.series().len(),
            format_bytes(result.peak_memory_bytes()),
            format_bytes(result.peak_disk_bytes()),
        ),
        Err(e) => format!("job {job_id}: failed ({e})"),
    }
}

fn print_transcript_enabled() -> bool {
    env::var("BUILD_STATUS_PRINT_TRANSCRIPT")
        .map(|val| val.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[tokio::main]
pub async fn main() {
    let config = TelemetryConfig::from_env();
    let log_level = config
        .as_ref()
        .map(|config| config.log_level.clone())
        .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    init_logging(&log_level);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let (job_ids, rejected) = parse_job_ids(env::args().skip(1));
    if job_ids.is_empty() {
        error!("Usage: build-status <job-id>...");
        process::exit(1);
    }

    let orchestrator = match LoadOrchestrator::from_config(&config) {
        Ok(orchestrator) => Arc::new(orchestrator),
        Err(e) => {
            error!("Unable to create blob fetcher: {e}");
            process::exit(1);
        }
    };
    info!("Loading {} job(s) from {}", job_ids.len(), config.blob_url);

    let mut handles = Vec::with_capacity(job_ids.len());
    for job_id in job_ids {
        let orchestrator = Arc::clone(&orchestrator);
        handles.push(tokio::spawn(async move {
            let outcome = orchestrator.load(&job_id).await;
            (job_id, outcome)
        }));
    }

    let print_transcript = print_transcript_enabled();
    let mut failed = rejected;
    for handle in handles {
        let (job_id, outcome) = match handle.await {
            Ok(joined) => joined,
            Err(e) => {
                error!("Load task panicked: {e}");
                failed = true;
                continue;
            }
        };

        println!("{}", summary_line(&job_id, &outcome));
        match outcome {
            Ok(result) if print_transcript => println!("{}", result.transcript()),
            Ok(_) => {}
            Err(_) => failed = true,
        }
    }

    if failed {
        process::exit(1);
    }
}
