// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync status state machine.
//!
//! ```text
//! idle ──write──► pending ──trigger──► syncing ──► succeeded │ partial │ failed
//!   ▲                                                  │
//!   └──────────────── queue empty / refresh ◄──────────┘
//! ```
//!
//! Triggers are: connectivity regained, an explicit [`SyncObserver::sync_now`],
//! the periodic poll while writes are pending, and a host wake request.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::coordinator::WakeSignal;
use super::events::SyncEvent;
use super::queue::DrainReport;
use super::session::OfflineSession;
use super::transport::Transport;
use crate::config::ObserverSettings;
use crate::error::{Error, Result};

/// Where the sync layer currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    Pending,
    Syncing,
    Succeeded,
    /// Some writes went through, some did not.
    Partial,
    Failed,
}

/// Snapshot published to status subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncStatus {
    pub phase: SyncPhase,
    pub pending: usize,
    pub online: bool,
    pub last_report: Option<DrainReport>,
    pub last_error: Option<String>,
}

impl SyncStatus {
    fn initial(pending: usize, online: bool) -> Self {
        SyncStatus {
            phase: if pending > 0 {
                SyncPhase::Pending
            } else {
                SyncPhase::Idle
            },
            pending,
            online,
            last_report: None,
            last_error: None,
        }
    }
}

/// Phase reached after a drain produced `report`.
pub fn phase_after(report: &DrainReport) -> SyncPhase {
    match (report.succeeded > 0, report.has_failures()) {
        (true, false) => SyncPhase::Succeeded,
        (true, true) => SyncPhase::Partial,
        (false, true) => SyncPhase::Failed,
        (false, false) => SyncPhase::Idle,
    }
}

/// Drives drains from triggers and publishes [`SyncStatus`].
pub struct SyncObserver<T> {
    session: Arc<OfflineSession<T>>,
    settings: ObserverSettings,
    state: watch::Sender<SyncStatus>,
}

impl<T: Transport + 'static> SyncObserver<T> {
    pub fn new(session: Arc<OfflineSession<T>>, settings: ObserverSettings) -> Self {
        let pending = session.queue().pending_count().unwrap_or(0);
        let (state, _) = watch::channel(SyncStatus::initial(pending, session.is_online()));
        SyncObserver {
            session,
            settings,
            state,
        }
    }

    /// Receive every status change.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.state.subscribe()
    }

    pub fn status(&self) -> SyncStatus {
        self.state.borrow().clone()
    }

    /// Re-read the pending count and settle into idle or pending.
    ///
    /// A failed outcome stays visible while its writes are still pending,
    /// and a success stays visible until new writes arrive.
    pub fn refresh(&self) {
        let pending = match self.session.queue().pending_count() {
            Ok(pending) => pending,
            Err(e) => {
                tracing::warn!(error = %e, "could not count pending writes");
                return;
            }
        };
        let online = self.session.is_online();
        let draining = self.session.queue().is_draining();
        self.state.send_modify(|status| {
            status.pending = pending;
            status.online = online;
            status.phase = match (status.phase, pending) {
                (SyncPhase::Syncing, _) if draining => SyncPhase::Syncing,
                (phase @ (SyncPhase::Partial | SyncPhase::Failed), n) if n > 0 => phase,
                (_, n) if n > 0 => SyncPhase::Pending,
                (SyncPhase::Succeeded, _) => SyncPhase::Succeeded,
                _ => SyncPhase::Idle,
            };
        });
    }

    /// Drain now if online.
    ///
    /// Returns `None` when offline or when another drain is already running.
    /// After a drain with at least one success a reload is requested once
    /// the configured delay elapsed.
    pub async fn sync_now(&self) -> Option<DrainReport> {
        if !self.session.is_online() {
            tracing::debug!("offline, sync deferred");
            self.refresh();
            return None;
        }

        let previous = self.status().phase;
        self.state.send_modify(|status| status.phase = SyncPhase::Syncing);
        let outcome = self.session.sync().await;
        let pending = self.session.queue().pending_count().unwrap_or(0);

        match outcome {
            Ok(report) => {
                self.state.send_modify(|status| {
                    status.phase = phase_after(&report);
                    status.pending = pending;
                    status.last_report = Some(report);
                    status.last_error = None;
                });
                if report.succeeded > 0 {
                    self.schedule_reload();
                }
                Some(report)
            }
            Err(Error::DrainInProgress) => {
                tracing::debug!("drain already running");
                self.state.send_modify(|status| status.phase = previous);
                self.refresh();
                None
            }
            Err(e) => {
                self.state.send_modify(|status| {
                    status.phase = SyncPhase::Failed;
                    status.pending = pending;
                    status.last_error = Some(e.to_string());
                });
                None
            }
        }
    }

    fn schedule_reload(&self) {
        let events = self.session.events().clone();
        let delay = self.settings.reload_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            events.publish(SyncEvent::ReloadRequested);
        });
    }

    /// Serve a host wake: drain and report the outcome to the coordinator.
    pub async fn handle_wake(&self, tag: &str) {
        tracing::info!(tag, "background wake");
        let signal = match self.sync_now().await {
            Some(report) => WakeSignal::Completed {
                succeeded: report.succeeded,
                failed: report.failed + report.abandoned,
                total: report.attempted(),
            },
            None => WakeSignal::Failed {
                error: self
                    .status()
                    .last_error
                    .unwrap_or_else(|| "sync did not run".to_string()),
            },
        };
        self.session.coordinator().handle_wake(signal);
    }

    async fn handle_event(&self, event: SyncEvent) {
        match event {
            SyncEvent::Connectivity { online: true } => {
                self.sync_now().await;
            }
            SyncEvent::Connectivity { online: false } | SyncEvent::QueueChanged { .. } => {
                self.refresh();
            }
            SyncEvent::WriteQueued {
                category: Some(category),
                ..
            } => {
                self.session.coordinator().register_type_sync(&category).await;
            }
            _ => {}
        }
    }

    /// Run until `cancel` fires.
    ///
    /// `wakes` carries tags from a [`LocalWakeScheduler`](super::LocalWakeScheduler).
    pub async fn run(
        &self,
        cancel: CancellationToken,
        mut wakes: Option<mpsc::UnboundedReceiver<String>>,
    ) -> Result<()> {
        let (subscription, mut events) = self.session.events().channel();
        let mut poll = tokio::time::interval(self.settings.poll_interval());
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        self.refresh();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                Some(event) = events.recv() => self.handle_event(event).await,
                _ = poll.tick() => {
                    self.session.coordinator().cleanup_old_registrations();
                    self.refresh();
                    if self.status().pending > 0 {
                        self.sync_now().await;
                    }
                }
                Some(tag) = next_wake(&mut wakes) => self.handle_wake(&tag).await,
            }
        }

        self.session.events().unsubscribe(subscription);
        Ok(())
    }
}

async fn next_wake(wakes: &mut Option<mpsc::UnboundedReceiver<String>>) -> Option<String> {
    match wakes {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
