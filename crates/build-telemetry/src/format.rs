// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Human readable values for presenting a load result.

const BYTE_UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

/// Formats an elapsed time in seconds, e.g. `"2m 3.45s"`.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0.00s".to_string();
    }
    // Round first so a value like 59.996 is not shown as "60.00s".
    let seconds = (seconds * 100.0).round() / 100.0;
    if seconds < 60.0 {
        return format!("{seconds:.2}s");
    }

    let whole = seconds.floor() as u64;
    if whole < 3600 {
        let minutes = whole / 60;
        let rest = seconds - (minutes * 60) as f64;
        return format!("{minutes}m {rest:.2}s");
    }

    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let secs = whole % 60;
    format!("{hours}h {minutes}m {secs}s")
}

/// Formats a byte count with binary units, e.g. `"1.50 MB"`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = BYTE_UNITS[0];
    for next in &BYTE_UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.2} {unit}")
}
