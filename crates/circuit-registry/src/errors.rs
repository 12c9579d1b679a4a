// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Failure of the backing store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("query failed: {0}")]
    Query(String),
}

/// Rejected requests. The display form is the code reported to clients.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid_body")]
    InvalidBody,
    #[error("invalid_command")]
    InvalidCommand,
    #[error("missing_payload")]
    MissingPayload,
    #[error("invalid_offset")]
    InvalidOffset,
    #[error("invalid_limit")]
    InvalidLimit,
    #[error("invalid_address")]
    InvalidAddress,
    #[error("missing_chainId")]
    MissingChainId,
    #[error("invalid_chainId")]
    InvalidChainId,
    #[error(transparent)]
    Store(#[from] StoreError),
}
