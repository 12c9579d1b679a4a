// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::constants::{DEFAULT_BLOB_URL, DEFAULT_LOG_LEVEL, DEFAULT_TIMEOUT};
use crate::errors::ConfigError;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration for loading build status blobs
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Base URL of the blob store, always ending with '/'
    pub blob_url: String,
    /// Timeout applied to each blob request
    pub timeout: Duration,
    /// HTTPS proxy URL
    pub https_proxy: Option<String>,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
    /// Escape HTML special characters in transcript text
    pub escape_html: bool,
    /// Fail a load when the transcript cannot be styled instead of keeping plain text
    pub strict_render: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            blob_url: DEFAULT_BLOB_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            https_proxy: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            escape_html: false,
            strict_render: false,
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|val| val.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Appends the trailing '/' blob paths are resolved against.
pub fn normalize_blob_url(blob_url: &str) -> String {
    let trimmed = blob_url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let blob_url = env::var("BUILD_STATUS_BLOB_URL")
            .map(|val| normalize_blob_url(&val))
            .unwrap_or_else(|_| DEFAULT_BLOB_URL.to_string());
        let timeout = env::var("BUILD_STATUS_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        let https_proxy = env::var("BUILD_STATUS_PROXY_HTTPS")
            .or_else(|_| env::var("HTTPS_PROXY"))
            .ok();
        let log_level = env::var("BUILD_STATUS_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        let config = Self {
            blob_url,
            timeout,
            https_proxy,
            log_level,
            escape_html: env_flag("BUILD_STATUS_ESCAPE_HTML"),
            strict_render: env_flag("BUILD_STATUS_STRICT_RENDER"),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.blob_url).map_err(|e| {
            ConfigError::InvalidConfig(format!("Invalid blob url '{}': {e}", self.blob_url))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidConfig(format!(
                "Blob url '{}' must use http or https",
                self.blob_url
            )));
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "Blob request timeout must be greater than 0".to_string(),
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }
}
