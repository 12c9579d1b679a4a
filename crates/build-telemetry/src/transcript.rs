// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Rendering of a job's log lines into a single styled transcript.

use std::fmt;

use tracing::debug;

use crate::ansi::AnsiConverter;
use crate::constants::TRANSCRIPT_SEPARATOR;
use crate::errors::RenderError;
use crate::event::EventRecord;

/// Rendered log output of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcript {
    /// Markup with escape sequences converted to inline styles.
    Styled(String),
    /// Joined text without styling, kept when conversion failed.
    Plain(String),
}

impl Transcript {
    pub fn as_str(&self) -> &str {
        match self {
            Transcript::Styled(text) | Transcript::Plain(text) => text,
        }
    }

    pub fn is_styled(&self) -> bool {
        matches!(self, Transcript::Styled(_))
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joins the text of every log line record, separated by a blank line.
pub fn join_lines<'a, I>(text_events: I) -> String
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let lines: Vec<&str> = text_events
        .into_iter()
        .map(|record| {
            record.text_line().unwrap_or_else(|| {
                debug!("Log record at t={} has no text", record.time);
                ""
            })
        })
        .collect();
    lines.join(TRANSCRIPT_SEPARATOR)
}

/// Joins log lines and converts their escape sequences into markup.
///
/// On failure the error carries the joined text so it can still be shown.
pub fn render_transcript<'a, I>(
    text_events: I,
    converter: &AnsiConverter,
) -> Result<Transcript, RenderError>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let raw = join_lines(text_events);
    match converter.to_html(&raw) {
        Ok(markup) => Ok(Transcript::Styled(markup)),
        Err(e) => Err(RenderError {
            reason: e.to_string(),
            raw,
        }),
    }
}
