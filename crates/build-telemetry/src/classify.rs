// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Splits a decoded event log into the subsets the derivations read.

use tracing::trace;

use crate::constants::{LOG_LINE_KIND, NATIVE_MEMORY_KIND, RUNTIME_MEMORY_KIND};
use crate::event::EventRecord;

/// Tag vocabulary used to recognise record kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventKinds {
    pub log_line: String,
    pub native_memory: String,
    pub runtime_memory: String,
}

impl Default for EventKinds {
    fn default() -> Self {
        Self {
            log_line: LOG_LINE_KIND.to_string(),
            native_memory: NATIVE_MEMORY_KIND.to_string(),
            runtime_memory: RUNTIME_MEMORY_KIND.to_string(),
        }
    }
}

impl EventKinds {
    pub fn new(
        log_line: impl Into<String>,
        native_memory: impl Into<String>,
        runtime_memory: impl Into<String>,
    ) -> Self {
        Self {
            log_line: log_line.into(),
            native_memory: native_memory.into(),
            runtime_memory: runtime_memory.into(),
        }
    }

    pub fn is_log_line(&self, kind: &str) -> bool {
        kind == self.log_line
    }

    pub fn is_memory_sample(&self, kind: &str) -> bool {
        kind == self.native_memory || kind == self.runtime_memory
    }
}

/// Borrowed views over a record sequence, each in original order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClassifiedEvents<'a> {
    pub text_events: Vec<&'a EventRecord>,
    pub memory_events: Vec<&'a EventRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    kinds: EventKinds,
}

impl Classifier {
    pub fn new(kinds: EventKinds) -> Self {
        Self { kinds }
    }

    pub fn kinds(&self) -> &EventKinds {
        &self.kinds
    }

    /// Partitions `records` in a single pass. Unrecognised kinds are skipped.
    pub fn classify<'a>(&self, records: &'a [EventRecord]) -> ClassifiedEvents<'a> {
        let mut classified = ClassifiedEvents::default();
        for record in records {
            if self.kinds.is_log_line(&record.kind) {
                classified.text_events.push(record);
            } else if self.kinds.is_memory_sample(&record.kind) {
                classified.memory_events.push(record);
            } else {
                trace!("Ignoring record of kind '{}' at t={}", record.kind, record.time);
            }
        }
        classified
    }
}
