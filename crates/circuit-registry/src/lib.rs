// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Read-only query service over verified circuits.
//!
//! Requests name an action and carry a payload; see [`handler::Registry`].

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod address;
pub mod chain;
pub mod errors;
pub mod handler;
pub mod store;

pub use address::Address;
pub use errors::{RegistryError, StoreError};
pub use handler::{Registry, Response};
pub use store::{CircuitStore, MemoryStore, PackageAssociation, VerifiedCircuit};
