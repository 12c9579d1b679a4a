// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

// Event tags written by the build worker
pub const LOG_LINE_KIND: &str = "Circomkit Log";
pub const NATIVE_MEMORY_KIND: &str = "Circom memory usage";
pub const RUNTIME_MEMORY_KIND: &str = "Memory Usage Update";

/// Mount point whose usage is reported as the job's disk consumption.
pub const TEMP_STORAGE_MOUNT: &str = "/tmp";

/// Native tool readings and `df` tables are reported in kibibytes.
pub const KIB: u64 = 1024;

/// Separator placed between consecutive log lines in a transcript.
pub const TRANSCRIPT_SEPARATOR: &str = "\n\n";

pub const DEFAULT_BLOB_URL: &str = "http://localhost:8080/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_LOG_LEVEL: &str = "info";
