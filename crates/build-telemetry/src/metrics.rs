// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Memory and disk usage series extracted from memory sample records.
//!
//! Every sample is normalized to bytes: native compiler readings and `df`
//! tables are reported in kibibytes, runtime readings already in bytes. The
//! series is sparse and kept in emission order; charts consume it as-is.

use serde::Serialize;

use crate::constants::TEMP_STORAGE_MOUNT;
use crate::errors::MalformedMetricError;
use crate::event::{EventRecord, MemoryPayload};

/// One point of the resource usage series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    pub time: f64,
    pub memory_bytes: u64,
    pub disk_bytes: u64,
}

impl MetricSample {
    pub fn from_record(record: &EventRecord) -> Result<Self, MalformedMetricError> {
        let payload = MemoryPayload::from_record(record)?;
        Ok(Self {
            time: record.time,
            memory_bytes: payload.reading.bytes(),
            // A sample without a /tmp entry reports no disk usage
            disk_bytes: payload.disk_used_bytes(TEMP_STORAGE_MOUNT, record.time)?,
        })
    }
}

/// Maps memory records to samples, one per record, in the same order.
pub fn extract_series<'a, I>(memory_events: I) -> Result<Vec<MetricSample>, MalformedMetricError>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    memory_events
        .into_iter()
        .map(MetricSample::from_record)
        .collect()
}

/// Highest memory and disk usage seen in a series.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Peak {
    pub memory_bytes: u64,
    pub disk_bytes: u64,
}

pub fn peak(series: &[MetricSample]) -> Peak {
    series.iter().fold(Peak::default(), |peak, sample| Peak {
        memory_bytes: peak.memory_bytes.max(sample.memory_bytes),
        disk_bytes: peak.disk_bytes.max(sample.disk_bytes),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_native_reading_is_kibibytes() {
        let record = EventRecord::new("native-sample", 1.0, json!({"memoryUsage": 10}));
        let sample = MetricSample::from_record(&record).unwrap();
        assert_eq!(
            sample,
            MetricSample {
                time: 1.0,
                memory_bytes: 10240,
                disk_bytes: 0
            }
        );
    }

    #[test]
    fn test_runtime_reading_is_bytes() {
        let record = EventRecord::new("runtime-sample", 0.2, json!({"memory": {"rss": 2048}}));
        let sample = MetricSample::from_record(&record).unwrap();
        assert_eq!(sample.memory_bytes, 2048);
        assert_eq!(sample.disk_bytes, 0);
        assert_eq!(sample.time, 0.2);
    }

    #[test]
    fn test_disk_reading_from_tmp_mount() {
        let record = EventRecord::new(
            "runtime-sample",
            5.0,
            json!({
                "memory": {"rss": 1},
                "disk": [
                    {"Used": "100", "Mounted": "/"},
                    {"Used": "250", "Mounted": "/tmp"}
                ]
            }),
        );
        assert_eq!(MetricSample::from_record(&record).unwrap().disk_bytes, 250 * 1024);
    }

    #[test]
    fn test_disk_table_without_tmp_mount_is_zero() {
        let record = EventRecord::new(
            "runtime-sample",
            5.0,
            json!({"memory": {"rss": 1}, "disk": [{"Used": "100", "Mounted": "/"}]}),
        );
        assert_eq!(MetricSample::from_record(&record).unwrap().disk_bytes, 0);

        let empty_table =
            EventRecord::new("runtime-sample", 5.0, json!({"memory": {"rss": 1}, "disk": []}));
        assert_eq!(MetricSample::from_record(&empty_table).unwrap().disk_bytes, 0);
    }

    #[test]
    fn test_zero_used_tmp_mount_is_zero() {
        let record = EventRecord::new(
            "runtime-sample",
            5.0,
            json!({"memory": {"rss": 1}, "disk": [{"Used": "0", "Mounted": "/tmp"}]}),
        );
        assert_eq!(MetricSample::from_record(&record).unwrap().disk_bytes, 0);
    }

    #[test]
    fn test_extract_series_keeps_order_and_duplicates() {
        let records = [
            EventRecord::new("n", 1.0, json!({"memoryUsage": 1})),
            EventRecord::new("n", 1.0, json!({"memoryUsage": 2})),
            EventRecord::new("r", 0.5, json!({"memory": {"rss": 3}})),
        ];
        let series = extract_series(records.iter()).unwrap();
        let memory: Vec<u64> = series.iter().map(|s| s.memory_bytes).collect();
        assert_eq!(memory, vec![1024, 2048, 3]);
        assert_eq!(series[2].time, 0.5);
    }

    #[test]
    fn test_extract_series_fails_on_malformed_sample() {
        let records = [
            EventRecord::new("n", 1.0, json!({"memoryUsage": 1})),
            EventRecord::new("n", 2.0, json!({"cpu": 1})),
        ];
        let err = extract_series(records.iter()).unwrap_err();
        assert!(matches!(err, MalformedMetricError::MissingReading { time } if time == 2.0));
    }

    #[test]
    fn test_extract_series_empty() {
        assert!(extract_series(std::iter::empty::<&EventRecord>()).unwrap().is_empty());
    }

    #[test]
    fn test_sample_serializes_camel_case() {
        let sample = MetricSample {
            time: 0.2,
            memory_bytes: 2048,
            disk_bytes: 0,
        };
        assert_eq!(
            serde_json::to_value(sample).unwrap(),
            json!({"time": 0.2, "memoryBytes": 2048, "diskBytes": 0})
        );
    }

    #[test]
    fn test_peak() {
        let series = [
            MetricSample {
                time: 0.0,
                memory_bytes: 5,
                disk_bytes: 9,
            },
            MetricSample {
                time: 1.0,
                memory_bytes: 7,
                disk_bytes: 0,
            },
        ];
        assert_eq!(
            peak(&series),
            Peak {
                memory_bytes: 7,
                disk_bytes: 9
            }
        );
        assert_eq!(peak(&[]), Peak::default());
    }
}
