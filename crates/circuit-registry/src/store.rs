// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::address::Address;
use crate::errors::StoreError;

/// A circuit whose deployed verifier has been checked against its source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifiedCircuit {
    #[serde(skip)]
    pub id: u64,
    pub chainid: u64,
    pub address: Address,
    pub created_at: String,
    pub tpl: Value,
    pub params: Value,
    pub protocol: Value,
}

/// Package published for a deployed verifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageAssociation {
    pub chainid: u64,
    pub address: Address,
    pub package: Value,
    pub created_at: String,
}

#[async_trait]
pub trait CircuitStore: Send + Sync {
    /// Verified circuits, most recently added first.
    async fn newest(&self, offset: u64, limit: u64) -> Result<Vec<VerifiedCircuit>, StoreError>;

    async fn package_associations(
        &self,
        chain_id: u64,
        address: &Address,
    ) -> Result<Vec<PackageAssociation>, StoreError>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    circuits: RwLock<Vec<VerifiedCircuit>>,
    associations: RwLock<Vec<PackageAssociation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_circuit(&self, circuit: VerifiedCircuit) {
        let mut circuits = self.circuits.write().unwrap_or_else(PoisonError::into_inner);
        circuits.push(circuit);
    }

    pub fn insert_association(&self, association: PackageAssociation) {
        let mut associations = self
            .associations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        associations.push(association);
    }
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[async_trait]
impl CircuitStore for MemoryStore {
    async fn newest(&self, offset: u64, limit: u64) -> Result<Vec<VerifiedCircuit>, StoreError> {
        let circuits = self.circuits.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<VerifiedCircuit> = circuits.clone();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows
            .into_iter()
            .skip(to_usize(offset))
            .take(to_usize(limit))
            .collect())
    }

    async fn package_associations(
        &self,
        chain_id: u64,
        address: &Address,
    ) -> Result<Vec<PackageAssociation>, StoreError> {
        let associations = self
            .associations
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(associations
            .iter()
            .filter(|row| row.chainid == chain_id && row.address == *address)
            .cloned()
            .collect())
    }
}
