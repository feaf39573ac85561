// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Optimistic local copies merged into server collections.
//!
//! Only creates are staged. A staged entity is new by construction, so a
//! merge simply puts staged entities in front of the server's collection.
//! Updates to existing entities would need matching by id and are rejected.

use std::sync::{Arc, Mutex, MutexGuard};

use outbox_core::{normalize_endpoint, ClockSource, Database, LocalDataItem, Method};
use serde_json::Value;

use crate::error::{Error, Result};

/// Staging area for entities created while offline.
pub struct LocalDataMerger {
    db: Mutex<Database>,
    clock: Arc<dyn ClockSource>,
}

impl LocalDataMerger {
    pub fn new(db: Database, clock: Arc<dyn ClockSource>) -> Self {
        LocalDataMerger {
            db: Mutex::new(db),
            clock,
        }
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Build a staged entity without storing it.
    ///
    /// Fails with [`Error::UnsupportedStage`] for anything but a create.
    pub fn prepare(&self, endpoint: &str, method: Method, payload: Value) -> Result<LocalDataItem> {
        if !method.is_create() {
            return Err(Error::UnsupportedStage(method));
        }
        Ok(LocalDataItem::new(
            endpoint,
            method,
            payload,
            self.clock.now_utc(),
        )?)
    }

    /// Store a prepared entity.
    pub fn insert(&self, item: &LocalDataItem) -> Result<()> {
        self.db().insert_local_item(item)?;
        tracing::debug!(temp_id = %item.temp_id, endpoint = %item.endpoint, "entity staged");
        Ok(())
    }

    /// Stage an optimistic copy of a created entity and return its temporary id.
    pub fn stage(&self, endpoint: &str, method: Method, payload: Value) -> Result<String> {
        let item = self.prepare(endpoint, method, payload)?;
        self.insert(&item)?;
        Ok(item.temp_id)
    }

    /// Staged entities for `endpoint` followed by `server` unchanged.
    ///
    /// If the staging area cannot be read the server collection is returned
    /// alone.
    pub fn merge(&self, endpoint: &str, server: Vec<Value>) -> Vec<Value> {
        let staged = match self.staged(Some(endpoint)) {
            Ok(staged) => staged,
            Err(e) => {
                tracing::warn!(endpoint, error = %e, "staging area unreadable, showing server data only");
                return server;
            }
        };

        let mut merged = Vec::with_capacity(staged.len() + server.len());
        merged.extend(staged.into_iter().map(|item| item.payload));
        merged.extend(server);
        merged
    }

    /// Staged entities in creation order, optionally for one endpoint.
    pub fn staged(&self, endpoint: Option<&str>) -> Result<Vec<LocalDataItem>> {
        let endpoint = endpoint.map(normalize_endpoint);
        Ok(self.db().list_local_items(endpoint.as_deref())?)
    }

    pub fn staged_count(&self) -> Result<usize> {
        Ok(self.db().count_local_items()?)
    }

    pub fn remove(&self, temp_id: &str) -> Result<bool> {
        Ok(self.db().delete_local_item(temp_id)?)
    }

    /// Drop every staged entity. Called after a drain with at least one success.
    pub fn evict_completed(&self) -> Result<usize> {
        let evicted = self.db().clear_local_items()?;
        if evicted > 0 {
            tracing::info!(evicted, "staged entities evicted");
        }
        Ok(evicted)
    }
}
