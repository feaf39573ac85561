// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed notifications between sync components and their consumers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use outbox_core::ItemId;
use serde::Serialize;
use tokio::sync::mpsc;

use super::queue::DrainReport;

/// Something observable happened in the sync layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// The number of drainable items may have changed.
    QueueChanged { pending: usize },
    /// A write was captured while offline.
    WriteQueued {
        id: ItemId,
        endpoint: String,
        /// Resource category the write belongs to, e.g. `users`.
        category: Option<String>,
    },
    /// A drain finished.
    SyncComplete(DrainReport),
    /// A drain could not run to completion.
    SyncError { message: String },
    /// The connectivity signal flipped.
    Connectivity { online: bool },
    /// The host reported a completed background wake.
    BackgroundSyncCompleted {
        succeeded: usize,
        failed: usize,
        total: usize,
    },
    /// The host reported a failed background wake.
    BackgroundSyncFailed { error: String },
    /// Views showing server data should refetch.
    ReloadRequested,
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&SyncEvent) + Send + Sync>;

/// Synchronous fan-out of [`SyncEvent`]s to registered callbacks.
#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(SubscriptionId, Callback)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked for every published event.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SyncEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.lock();
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        subscribers.len() != before
    }

    /// Deliver an event to every subscriber.
    ///
    /// Callbacks run outside the lock, so they may subscribe or publish.
    pub fn publish(&self, event: SyncEvent) {
        let callbacks: Vec<Callback> = self.lock().iter().map(|(_, cb)| cb.clone()).collect();
        for callback in callbacks {
            callback(&event);
        }
    }

    /// Subscribe with an unbounded channel for consumption from async code.
    pub fn channel(&self) -> (SubscriptionId, mpsc::UnboundedReceiver<SyncEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.subscribe(move |event| {
            let _ = tx.send(event.clone());
        });
        (id, rx)
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Callback)>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
