// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background wake registration.
//!
//! The host may offer a way to run the application later, outside normal
//! foreground activity. [`BackgroundSyncCoordinator`] asks for such wakes by
//! tag and enforces a cooldown per tag, so a burst of offline writes results
//! in a single host registration.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use outbox_core::{ClockSource, RegistrationStatus, SyncRegistration};
use tokio::sync::mpsc;

use super::events::{EventBus, SyncEvent};
use crate::config::BackgroundSettings;

/// Tag of the general catch-all sync.
pub const GENERAL_SYNC_TAG: &str = "background-sync";

/// Returns the tag used for a resource category, e.g. `sync-users`.
pub fn type_sync_tag(category: &str) -> String {
    format!("sync-{}", category)
}

/// The host refused a wake registration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("wake registration rejected: {0}")]
pub struct WakeError(pub String);

/// Host facility for deferred wakes.
pub trait WakeScheduler: Send + Sync {
    /// Returns true if the host offers deferred wakes at all.
    fn is_available(&self) -> bool;

    /// Ask the host to wake the application for `tag`.
    fn register(
        &self,
        tag: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), WakeError>> + Send + '_>>;
}

impl<S: WakeScheduler + ?Sized> WakeScheduler for Arc<S> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn register(
        &self,
        tag: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), WakeError>> + Send + '_>> {
        (**self).register(tag)
    }
}

/// Scheduler for hosts without deferred wakes.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedScheduler;

impl WakeScheduler for UnsupportedScheduler {
    fn is_available(&self) -> bool {
        false
    }

    fn register(
        &self,
        _tag: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), WakeError>> + Send + '_>> {
        Box::pin(async { Err(WakeError("background sync is not supported".to_string())) })
    }
}

/// In-process scheduler delivering wake requests over a channel.
///
/// The receiving end is typically polled by a long-running worker which
/// drains the queue when a tag arrives.
#[derive(Debug, Clone)]
pub struct LocalWakeScheduler {
    tx: mpsc::UnboundedSender<String>,
}

impl LocalWakeScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (LocalWakeScheduler { tx }, rx)
    }
}

impl WakeScheduler for LocalWakeScheduler {
    fn is_available(&self) -> bool {
        !self.tx.is_closed()
    }

    fn register(
        &self,
        tag: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), WakeError>> + Send + '_>> {
        let result = self
            .tx
            .send(tag.to_string())
            .map_err(|_| WakeError("wake worker has stopped".to_string()));
        Box::pin(async move { result })
    }
}

/// Outcome of a wake, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WakeSignal {
    Completed {
        succeeded: usize,
        failed: usize,
        total: usize,
    },
    Failed {
        error: String,
    },
}

/// Requests background wakes with per-tag cooldowns.
pub struct BackgroundSyncCoordinator {
    scheduler: Arc<dyn WakeScheduler>,
    clock: Arc<dyn ClockSource>,
    events: Arc<EventBus>,
    settings: BackgroundSettings,
    registrations: Mutex<HashMap<String, SyncRegistration>>,
}

impl BackgroundSyncCoordinator {
    pub fn new(
        scheduler: Arc<dyn WakeScheduler>,
        clock: Arc<dyn ClockSource>,
        events: Arc<EventBus>,
        settings: BackgroundSettings,
    ) -> Self {
        BackgroundSyncCoordinator {
            scheduler,
            clock,
            events,
            settings,
            registrations: Mutex::new(HashMap::new()),
        }
    }

    fn registrations_lock(&self) -> MutexGuard<'_, HashMap<String, SyncRegistration>> {
        self.registrations.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_supported(&self) -> bool {
        self.scheduler.is_available()
    }

    /// Register a wake for `tag` unless it was registered less than
    /// `min_interval` ago.
    ///
    /// Returns false on cooldown, when the host has no wake facility, or
    /// when the host rejects the request.
    pub async fn register_sync(&self, tag: &str, min_interval: Duration) -> bool {
        self.register(tag, Some(min_interval)).await
    }

    /// Register the general sync tag with its cooldown.
    pub async fn register_general_sync(&self) -> bool {
        self.register_sync(GENERAL_SYNC_TAG, self.settings.general_interval())
            .await
    }

    /// Register the sync tag of one resource category with its cooldown.
    pub async fn register_type_sync(&self, category: &str) -> bool {
        self.register_sync(&type_sync_tag(category), self.settings.type_interval())
            .await
    }

    /// Register the general tag and every configured category, ignoring
    /// cooldowns. Returns how many registrations the host accepted.
    pub async fn force_sync(&self) -> usize {
        let mut tags = vec![GENERAL_SYNC_TAG.to_string()];
        tags.extend(self.settings.categories.iter().map(|c| type_sync_tag(c)));

        let mut accepted = 0;
        for tag in &tags {
            if self.register(tag, None).await {
                accepted += 1;
            }
        }
        tracing::info!(accepted, requested = tags.len(), "forced background sync");
        accepted
    }

    async fn register(&self, tag: &str, min_interval: Option<Duration>) -> bool {
        if !self.scheduler.is_available() {
            tracing::debug!(tag, "background sync not supported");
            return false;
        }

        let now_ms = self.clock.now_ms();
        // Reserve the tag before awaiting so concurrent callers see the cooldown.
        let previous = {
            let mut registrations = self.registrations_lock();
            if let (Some(existing), Some(interval)) = (registrations.get(tag), min_interval) {
                if existing.in_cooldown(now_ms, interval) {
                    tracing::debug!(tag, "registration skipped, cooldown active");
                    return false;
                }
            }
            let mut reservation = SyncRegistration::new(tag, now_ms);
            reservation.status = RegistrationStatus::Pending;
            registrations.insert(tag.to_string(), reservation)
        };

        match self.scheduler.register(tag).await {
            Ok(()) => {
                if let Some(registration) = self.registrations_lock().get_mut(tag) {
                    registration.status = RegistrationStatus::Registered;
                }
                tracing::info!(tag, "background sync registered");
                true
            }
            Err(e) => {
                let mut registrations = self.registrations_lock();
                match previous {
                    Some(previous) => registrations.insert(tag.to_string(), previous),
                    None => registrations.remove(tag),
                };
                tracing::warn!(tag, error = %e, "background sync registration failed");
                false
            }
        }
    }

    /// Apply a wake outcome reported by the host to every registration and
    /// republish it as an event.
    pub fn handle_wake(&self, signal: WakeSignal) {
        {
            let mut registrations = self.registrations_lock();
            for registration in registrations.values_mut() {
                match &signal {
                    WakeSignal::Completed { .. } => {
                        registration.status = RegistrationStatus::Completed;
                    }
                    WakeSignal::Failed { .. } => {
                        registration.status = RegistrationStatus::Failed;
                        registration.retry_count += 1;
                    }
                }
            }
        }

        match signal {
            WakeSignal::Completed {
                succeeded,
                failed,
                total,
            } => {
                tracing::info!(succeeded, failed, total, "background sync completed");
                self.events.publish(SyncEvent::BackgroundSyncCompleted {
                    succeeded,
                    failed,
                    total,
                });
            }
            WakeSignal::Failed { error } => {
                tracing::warn!(%error, "background sync failed");
                self.events.publish(SyncEvent::BackgroundSyncFailed { error });
            }
        }
    }

    /// Snapshot of all registrations, sorted by tag.
    pub fn registrations(&self) -> Vec<SyncRegistration> {
        let mut registrations: Vec<_> = self.registrations_lock().values().cloned().collect();
        registrations.sort_by(|a, b| a.tag.cmp(&b.tag));
        registrations
    }

    /// Forget registrations older than the configured maximum age.
    pub fn cleanup_old_registrations(&self) -> usize {
        let now_ms = self.clock.now_ms();
        let max_age = self.settings.registration_max_age();
        let mut registrations = self.registrations_lock();
        let before = registrations.len();
        registrations.retain(|_, r| !r.is_expired(now_ms, max_age));
        let removed = before - registrations.len();
        if removed > 0 {
            tracing::debug!(removed, "old registrations cleaned up");
        }
        removed
    }
}
