// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Action dispatch for registry requests.
//!
//! A request is a JSON event whose `payload.action` selects the query. Events
//! delivered through an API gateway carry the request as a JSON string in `body`.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::address::Address;
use crate::chain::find_chain;
use crate::errors::{RegistryError, StoreError};
use crate::store::CircuitStore;

/// Largest page `newest` will return.
pub const MAX_LIMIT: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub body: Value,
}

impl Response {
    fn ok(body: Value) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }

    fn error(error: &RegistryError) -> Self {
        Self {
            status_code: 400,
            body: json!({
                "errorType": "error",
                "errorMessage": error.to_string(),
            }),
        }
    }
}

/// Reads a number given either as a JSON number or a numeric string.
fn numeric(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn to_body<T: Serialize>(rows: &T) -> Result<Value, RegistryError> {
    serde_json::to_value(rows).map_err(|e| StoreError::Query(e.to_string()).into())
}

fn unwrap_gateway_body(event: Value) -> Result<Value, RegistryError> {
    match event.get("body") {
        Some(Value::String(body)) => serde_json::from_str(body).map_err(|e| {
            debug!("Gateway body is not JSON: {e}");
            RegistryError::InvalidBody
        }),
        _ => Ok(event),
    }
}

pub struct Registry {
    store: Arc<dyn CircuitStore>,
}

impl Registry {
    pub fn new(store: Arc<dyn CircuitStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, event: Value) -> Response {
        match self.dispatch(event).await {
            Ok(body) => Response::ok(body),
            Err(e) => {
                error!("Registry request failed: {e}");
                Response::error(&e)
            }
        }
    }

    async fn dispatch(&self, event: Value) -> Result<Value, RegistryError> {
        let event = unwrap_gateway_body(event)?;
        let payload = event
            .get("payload")
            .filter(|payload| !payload.is_null())
            .ok_or(RegistryError::MissingPayload)?;
        match payload.get("action").and_then(Value::as_str) {
            Some("newest") => self.newest(payload).await,
            Some("pkg-assoc") => self.package_associations(payload).await,
            other => {
                debug!("Unsupported action {other:?}");
                Err(RegistryError::InvalidCommand)
            }
        }
    }

    async fn newest(&self, payload: &Value) -> Result<Value, RegistryError> {
        let offset = numeric(payload.get("offset"))
            .filter(|offset| *offset >= 0.0)
            .ok_or(RegistryError::InvalidOffset)?;
        let limit = numeric(payload.get("limit"))
            .filter(|limit| (0.0..=MAX_LIMIT).contains(limit))
            .ok_or(RegistryError::InvalidLimit)?;

        let rows = self
            .store
            .newest(offset.floor() as u64, limit.floor() as u64)
            .await?;
        to_body(&rows)
    }

    async fn package_associations(&self, payload: &Value) -> Result<Value, RegistryError> {
        let address: Address = payload
            .get("address")
            .and_then(Value::as_str)
            .and_then(|address| address.parse().ok())
            .ok_or(RegistryError::InvalidAddress)?;

        let chain_id = match payload.get("chainId") {
            // Falsy ids count as absent.
            None | Some(Value::Null) | Some(Value::Bool(false)) => {
                return Err(RegistryError::MissingChainId)
            }
            Some(Value::String(text)) if text.is_empty() => {
                return Err(RegistryError::MissingChainId)
            }
            Some(Value::Number(number)) if number.as_f64() == Some(0.0) => {
                return Err(RegistryError::MissingChainId)
            }
            chain_id => numeric(chain_id)
                .filter(|id| *id > 0.0 && id.fract() == 0.0)
                .map(|id| id as u64)
                .ok_or(RegistryError::InvalidChainId)?,
        };
        let chain = find_chain(chain_id).ok_or(RegistryError::InvalidChainId)?;
        debug!("Looking up package associations on {}", chain.name);

        let rows = self.store.package_associations(chain.id, &address).await?;
        to_body(&rows)
    }
}
