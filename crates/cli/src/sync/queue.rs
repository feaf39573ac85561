// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable queue of writes made while offline.
//!
//! Writes are appended to SQLite immediately, so nothing is lost if the
//! process dies before connectivity returns. A drain replays them to the
//! server in creation order. Acknowledged writes are deleted; rejected ones
//! stay queued with an incremented retry count.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use outbox_core::{
    ClockSource, Database, ItemId, Method, NewQueueItem, QueueItem, QueueStatus,
};
use serde::Serialize;
use serde_json::Value;

use super::transport::{Request, Transport, TransportError};
use crate::config::QueueSettings;
use crate::error::{Error, Result};

/// Header carrying a stable per-write key so the server can drop replays.
pub const IDEMPOTENCY_HEADER: &str = "idempotency-key";

/// Outcome of one drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Writes acknowledged and deleted.
    pub succeeded: usize,
    /// Writes that failed and will be retried by the next drain.
    pub failed: usize,
    /// Writes that failed and hit the retry ceiling.
    pub abandoned: usize,
}

impl DrainReport {
    /// Number of writes replayed.
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed + self.abandoned
    }

    /// Returns true if any replay did not succeed.
    pub fn has_failures(&self) -> bool {
        self.failed + self.abandoned > 0
    }
}

/// Clears the in-flight flag when a drain ends, however it ends.
struct DrainGuard<'a>(&'a AtomicBool);

impl<'a> DrainGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DrainGuard(flag))
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Durable, ordered log of pending writes.
pub struct SyncQueue {
    db: Mutex<Database>,
    clock: Arc<dyn ClockSource>,
    request_timeout: Duration,
    max_retries: Option<u32>,
    draining: AtomicBool,
}

impl SyncQueue {
    pub fn new(db: Database, settings: &QueueSettings, clock: Arc<dyn ClockSource>) -> Self {
        SyncQueue {
            db: Mutex::new(db),
            clock,
            request_timeout: settings.request_timeout(),
            max_retries: settings.max_retries,
            draining: AtomicBool::new(false),
        }
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a write. Does not touch the network.
    pub fn enqueue(
        &self,
        endpoint: &str,
        method: Method,
        payload: Option<Value>,
        headers: BTreeMap<String, String>,
    ) -> Result<ItemId> {
        let item = NewQueueItem::new(endpoint, method, payload, headers, self.clock.now_utc())?;
        self.enqueue_item(&item)
    }

    /// Append a fully built write.
    pub fn enqueue_item(&self, item: &NewQueueItem) -> Result<ItemId> {
        let id = self.db().insert_queue_item(item)?;
        tracing::info!(%id, endpoint = %item.endpoint, method = %item.method, "write queued");
        Ok(id)
    }

    /// Writes the next drain will replay, oldest first.
    pub fn pending_items(&self) -> Result<Vec<QueueItem>> {
        Ok(self.db().list_drainable_items()?)
    }

    pub fn pending_count(&self) -> Result<usize> {
        Ok(self.db().count_drainable_items()?)
    }

    /// All writes, optionally restricted to one status.
    pub fn items(&self, status: Option<QueueStatus>) -> Result<Vec<QueueItem>> {
        Ok(self.db().list_queue_items(status)?)
    }

    pub fn get(&self, id: ItemId) -> Result<QueueItem> {
        Ok(self.db().get_queue_item(id)?)
    }

    /// Count of writes per status, including statuses with no writes.
    pub fn stats(&self) -> Result<BTreeMap<String, usize>> {
        Ok(self.db().count_queue_items_by_status()?)
    }

    /// Put a failed or abandoned write back to pending.
    pub fn retry(&self, id: ItemId) -> Result<QueueItem> {
        let mut db = self.db();
        let item = db.get_queue_item(id)?;
        if !matches!(item.status, QueueStatus::Failed | QueueStatus::Abandoned) {
            return Err(outbox_core::Error::InvalidTransition {
                from: item.status.to_string(),
                to: QueueStatus::Pending.to_string(),
            }
            .into());
        }
        db.set_queue_status(id, QueueStatus::Pending)?;
        tracing::info!(%id, "write scheduled for retry");
        Ok(db.get_queue_item(id)?)
    }

    /// Remove writes lingering in `completed`.
    pub fn clear_completed(&self) -> Result<usize> {
        Ok(self.db().delete_queue_items_with_status(QueueStatus::Completed)?)
    }

    /// Return writes stranded in `syncing` by an interrupted drain to `pending`.
    pub fn recover_interrupted(&self) -> Result<usize> {
        let recovered = self.db().reset_syncing_items()?;
        if recovered > 0 {
            tracing::warn!(recovered, "recovered writes from an interrupted drain");
        }
        Ok(recovered)
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Replay every drainable write through `transport`, oldest first.
    ///
    /// A write is deleted only after a 2xx response. Any other status, a
    /// transport error or a timeout marks it failed and the drain moves on.
    /// Storage errors on a single write are logged and do not stop the batch.
    /// Returns [`Error::DrainInProgress`] without touching any write if
    /// another drain is running on this queue.
    pub async fn drain<T: Transport + ?Sized>(&self, transport: &T) -> Result<DrainReport> {
        let _guard = DrainGuard::acquire(&self.draining).ok_or(Error::DrainInProgress)?;

        let items = self.pending_items()?;
        let mut report = DrainReport::default();
        if items.is_empty() {
            return Ok(report);
        }
        tracing::info!(count = items.len(), "draining queued writes");

        for item in items {
            // Another process may have moved the write since it was listed.
            let claimed = self.db().set_queue_status(item.id, QueueStatus::Syncing);
            if let Err(e) = claimed {
                tracing::warn!(id = %item.id, error = %e, "write skipped");
                continue;
            }

            match self.replay(transport, &item).await {
                Ok(()) => {
                    self.acknowledge(&item);
                    report.succeeded += 1;
                }
                Err(message) => {
                    let recorded = self
                        .db()
                        .record_queue_failure(item.id, &message, self.max_retries);
                    match recorded {
                        Ok(updated) if updated.status == QueueStatus::Abandoned => {
                            report.abandoned += 1;
                            tracing::warn!(
                                id = %item.id,
                                retries = updated.retries,
                                error = %message,
                                "write abandoned"
                            );
                        }
                        Ok(updated) => {
                            report.failed += 1;
                            tracing::warn!(
                                id = %item.id,
                                retries = updated.retries,
                                error = %message,
                                "write replay failed"
                            );
                        }
                        Err(e) => {
                            report.failed += 1;
                            tracing::warn!(
                                id = %item.id,
                                error = %message,
                                storage_error = %e,
                                "write replay failed and could not be recorded"
                            );
                        }
                    }
                }
            }
        }

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            abandoned = report.abandoned,
            "drain finished"
        );
        Ok(report)
    }

    /// Remove an acknowledged write, whatever its current status.
    fn acknowledge(&self, item: &QueueItem) {
        let mut db = self.db();
        if let Err(e) = db.set_queue_status(item.id, QueueStatus::Completed) {
            tracing::debug!(id = %item.id, error = %e, "write moved during replay");
        }
        match db.delete_queue_item(item.id) {
            Ok(_) => tracing::debug!(id = %item.id, endpoint = %item.endpoint, "write replayed"),
            Err(e) => tracing::warn!(
                id = %item.id,
                error = %e,
                "write replayed but could not be removed"
            ),
        }
    }

    async fn replay<T: Transport + ?Sized>(
        &self,
        transport: &T,
        item: &QueueItem,
    ) -> std::result::Result<(), String> {
        let request = replay_request(item);
        match tokio::time::timeout(self.request_timeout, transport.send(request)).await {
            Ok(Ok(response)) if response.is_success() => Ok(()),
            Ok(Ok(response)) => Err(format!("server responded with status {}", response.status)),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(TransportError::Timeout(self.request_timeout).to_string()),
        }
    }
}

/// Build the request that replays a queued write.
pub fn replay_request(item: &QueueItem) -> Request {
    let mut request = Request::new(item.method, item.endpoint.clone());
    request.headers = item.headers.clone();
    request.body = item.payload.clone();
    request
        .headers
        .entry(IDEMPOTENCY_HEADER.to_string())
        .or_insert_with(|| format!("outbox-{}-{}", item.id, item.created_at.timestamp_millis()));
    request
}
