// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Optimistic local copies of entities the server has not confirmed yet.
//!
//! A [`LocalDataItem`] carries a temporary identity of the form
//! `temp_{wall_ms}_{hash}`. Server identities never use the `temp_` prefix,
//! so the two can always be told apart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};
use crate::item::Method;

/// Prefix of every temporary identity.
pub const TEMP_ID_PREFIX: &str = "temp_";
/// Payload field holding the temporary identity.
pub const TEMP_ID_FIELD: &str = "_tempId";
/// Payload field flagging an entity as not yet synced.
pub const PENDING_FIELD: &str = "_pendingSync";

static TEMP_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a temporary identity.
/// Format: temp_{wall_ms}_{hash} where hash is the first 9 hex chars of
/// SHA256(seed + wall_ms + per-process counter).
pub fn generate_temp_id(seed: &str, created_at: &DateTime<Utc>) -> String {
    let wall_ms = created_at.timestamp_millis();
    let counter = TEMP_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let input = format!("{seed}{wall_ms}{counter}{}", std::process::id());
    let hash = Sha256::digest(input.as_bytes());
    let short_hash = hex::encode(&hash[..5]);
    format!("{TEMP_ID_PREFIX}{wall_ms}_{}", &short_hash[..9])
}

/// Returns true if the id was generated locally.
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Returns true if the entity is an optimistic copy waiting for sync.
pub fn is_pending(entity: &Value) -> bool {
    entity
        .get(PENDING_FIELD)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Reduce an endpoint to the collection path used for staging lookups.
///
/// Drops the scheme and host of absolute URLs, the query string, the
/// fragment and any trailing slash, so `https://host/api/users/?page=2`
/// and `/api/users` name the same collection.
pub fn normalize_endpoint(endpoint: &str) -> String {
    let mut path = endpoint.trim();

    if let Some(scheme_end) = path.find("://") {
        let after_scheme = &path[scheme_end + 3..];
        path = match after_scheme.find('/') {
            Some(slash) => &after_scheme[slash..],
            None => "/",
        };
    }

    if let Some(cut) = path.find(['?', '#']) {
        path = &path[..cut];
    }

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// An optimistic client-side shadow of a created entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalDataItem {
    pub temp_id: String,
    /// Normalized collection endpoint.
    pub endpoint: String,
    pub method: Method,
    /// The entity, tagged with its temporary identity and pending marker.
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

impl LocalDataItem {
    /// Build a staged entity from a create payload.
    ///
    /// The payload must be a JSON object. Its `id` is replaced by a fresh
    /// temporary identity and the pending markers are added.
    pub fn new(
        endpoint: &str,
        method: Method,
        payload: Value,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let Value::Object(mut entity) = payload else {
            return Err(Error::InvalidInput(
                "staged payload must be a JSON object".to_string(),
            ));
        };

        let endpoint = normalize_endpoint(endpoint);
        let temp_id = generate_temp_id(&endpoint, &created_at);
        entity.insert("id".to_string(), Value::String(temp_id.clone()));
        entity.insert(TEMP_ID_FIELD.to_string(), Value::String(temp_id.clone()));
        entity.insert(PENDING_FIELD.to_string(), Value::Bool(true));

        Ok(LocalDataItem {
            temp_id,
            endpoint,
            method,
            payload: Value::Object(entity),
            created_at,
        })
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
