// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use build_telemetry::classify::EventKinds;
use build_telemetry::fetch::{build_client, BlobUrl};
use build_telemetry::{
    HttpBlobFetcher, JobId, LoadError, LoadOrchestrator, MetricSample, TelemetryConfig,
};
use mockito::{Mock, Server, ServerGuard};

async fn mock_status(server: &mut ServerGuard, job_id: &str, body: &str) -> Mock {
    server
        .mock("GET", format!("/status/{job_id}.json").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(1)
        .create_async()
        .await
}

fn orchestrator(server: &ServerGuard) -> LoadOrchestrator {
    let fetcher = HttpBlobFetcher::new(
        build_client(None, Duration::from_secs(5)).expect("failed to build client"),
        BlobUrl::new(&server.url()).expect("failed to create URL"),
    );
    LoadOrchestrator::new(Arc::new(fetcher)).with_kinds(EventKinds::new(
        "log",
        "native-sample",
        "runtime-sample",
    ))
}

fn job(id: &str) -> JobId {
    JobId::new(id).expect("valid job id")
}

#[tokio::test]
async fn scenario_a_transcript_series_and_duration() {
    let mut server = Server::new_async().await;
    let mock = mock_status(
        &mut server,
        "scenario-a",
        r#"[
            {"kind": "log", "time": 0.1, "data": {"msg": "hello"}},
            {"kind": "runtime-sample", "time": 0.2, "data": {"memory": {"rss": 2048}}},
            {"kind": "log", "time": 0.3, "data": {"msg": "done"}}
        ]"#,
    )
    .await;

    let orchestrator = orchestrator(&server);
    let result = orchestrator
        .load(&job("scenario-a"))
        .await
        .expect("load should succeed");

    mock.assert_async().await;
    assert_eq!(result.transcript().as_str(), "hello\n\ndone");
    assert_eq!(
        result.series(),
        &[MetricSample {
            time: 0.2,
            memory_bytes: 2048,
            disk_bytes: 0
        }]
    );
    assert_eq!(result.duration(), 0.3);
    assert_eq!(orchestrator.state(&job("scenario-a")).tag(), "ready");
}

#[tokio::test]
async fn scenario_b_native_sample_without_disk_table() {
    let mut server = Server::new_async().await;
    let _mock = mock_status(
        &mut server,
        "scenario-b",
        r#"[{"kind": "native-sample", "time": 1.0, "data": {"memoryUsage": 10}}]"#,
    )
    .await;

    let result = orchestrator(&server)
        .load(&job("scenario-b"))
        .await
        .expect("load should succeed");

    assert_eq!(
        result.series(),
        &[MetricSample {
            time: 1.0,
            memory_bytes: 10240,
            disk_bytes: 0
        }]
    );
    assert!(result.transcript().is_empty());
}

#[tokio::test]
async fn scenario_c_empty_log_fails() {
    let mut server = Server::new_async().await;
    let _mock = mock_status(&mut server, "scenario-c", "[]").await;

    let orchestrator = orchestrator(&server);
    let err = orchestrator
        .load(&job("scenario-c"))
        .await
        .expect_err("empty log must fail");

    assert!(matches!(*err, LoadError::EmptyLog));
    assert_eq!(orchestrator.state(&job("scenario-c")).tag(), "failed");
}

#[tokio::test]
async fn scenario_d_memory_event_without_reading_fails() {
    let mut server = Server::new_async().await;
    let _mock = mock_status(
        &mut server,
        "scenario-d",
        r#"[
            {"kind": "log", "time": 0.1, "data": {"msg": "start"}},
            {"kind": "runtime-sample", "time": 0.2, "data": {"uptime": 12}}
        ]"#,
    )
    .await;

    let orchestrator = orchestrator(&server);
    let err = orchestrator
        .load(&job("scenario-d"))
        .await
        .expect_err("malformed sample must fail");

    assert!(matches!(*err, LoadError::MalformedMetric(_)));
    assert_eq!(orchestrator.state(&job("scenario-d")).tag(), "failed");
}

#[tokio::test]
async fn worker_blob_with_default_tags() {
    let mut server = Server::new_async().await;
    let _mock = mock_status(
        &mut server,
        "worker",
        r#"[
            {"msg": "Circomkit Log", "time": 0.5, "data": {"msg": "\u001b[1mCompiling\u001b[0m main.circom"}},
            {"msg": "Circom memory usage", "time": 1.0, "data": {"memoryUsage": 2048, "disk": [
                {"Filesystem": "/dev/root", "Used": "5000", "Mounted": "/"},
                {"Filesystem": "tmpfs", "Used": "300", "Mounted": "/tmp"}
            ]}},
            {"msg": "Memory Usage Update", "time": 1.5, "data": {"memory": {"rss": 7340032}}},
            {"msg": "Request Complete", "time": 2.75, "data": {}}
        ]"#,
    )
    .await;

    let fetcher = HttpBlobFetcher::new(
        build_client(None, Duration::from_secs(5)).expect("failed to build client"),
        BlobUrl::new(&server.url()).expect("failed to create URL"),
    );
    let orchestrator = LoadOrchestrator::new(Arc::new(fetcher));
    let result = orchestrator
        .load(&job("worker"))
        .await
        .expect("load should succeed");

    assert_eq!(result.transcript().as_str(), "<b>Compiling</b> main.circom");
    assert_eq!(result.duration(), 2.75);
    assert_eq!(result.series().len(), 2);
    assert_eq!(result.series()[0].memory_bytes, 2048 * 1024);
    assert_eq!(result.series()[0].disk_bytes, 300 * 1024);
    assert_eq!(result.series()[1].memory_bytes, 7_340_032);
    assert_eq!(result.peak_memory_bytes(), 7_340_032);
}

#[tokio::test]
async fn same_job_is_fetched_once() {
    let mut server = Server::new_async().await;
    let mock = mock_status(
        &mut server,
        "once",
        r#"[{"kind": "log", "time": 0.1, "data": {"msg": "hello"}}]"#,
    )
    .await;

    let orchestrator = Arc::new(orchestrator(&server));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.load(&job("once")).await.is_ok() })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.expect("load task panicked"));
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn server_error_and_malformed_json_fail() {
    let mut server = Server::new_async().await;
    let _error = server
        .mock("GET", "/status/broken.json")
        .with_status(500)
        .create_async()
        .await;
    let _garbage = mock_status(&mut server, "garbage", "{not json").await;

    let orchestrator = orchestrator(&server);

    let err = orchestrator
        .load(&job("broken"))
        .await
        .expect_err("server error must fail");
    assert!(matches!(*err, LoadError::Fetch(_)));

    let err = orchestrator
        .load(&job("garbage"))
        .await
        .expect_err("malformed json must fail");
    assert!(matches!(*err, LoadError::Decode(_)));
}

#[tokio::test]
async fn orchestrator_from_config() {
    let mut server = Server::new_async().await;
    let _mock = mock_status(
        &mut server,
        "configured",
        r#"[{"msg": "Circomkit Log", "time": 4.0, "data": {"msg": "a < b"}}]"#,
    )
    .await;

    let config = TelemetryConfig {
        blob_url: server.url(),
        escape_html: true,
        ..Default::default()
    };
    let orchestrator = LoadOrchestrator::from_config(&config).expect("valid config");
    let result = orchestrator
        .load(&job("configured"))
        .await
        .expect("load should succeed");

    assert_eq!(result.transcript().as_str(), "a &lt; b");
    assert_eq!(result.duration(), 4.0);
}
