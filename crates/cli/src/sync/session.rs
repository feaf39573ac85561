// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit wiring of the sync components for one application session.

use std::path::Path;
use std::sync::Arc;

use outbox_core::{ClockSource, Database, SystemClock};
use serde_json::Value;

use super::connectivity::Connectivity;
use super::coordinator::{BackgroundSyncCoordinator, UnsupportedScheduler, WakeScheduler};
use super::events::{EventBus, SyncEvent};
use super::interceptor::OfflineInterceptor;
use super::merger::LocalDataMerger;
use super::queue::{DrainReport, SyncQueue};
use super::transport::{Request, Response, Transport, TransportResult};
use crate::config::Config;
use crate::error::{Error, Result};

/// Builder for [`OfflineSession`].
pub struct SessionBuilder<T> {
    transport: T,
    config: Config,
    online: bool,
    scheduler: Arc<dyn WakeScheduler>,
    clock: Arc<dyn ClockSource>,
    recover: bool,
}

impl<T: Transport + 'static> SessionBuilder<T> {
    pub fn new(transport: T) -> Self {
        SessionBuilder {
            transport,
            config: Config::default(),
            online: true,
            scheduler: Arc::new(UnsupportedScheduler),
            clock: Arc::new(SystemClock),
            recover: false,
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Initial value of the connectivity signal (default: online).
    pub fn online(mut self, online: bool) -> Self {
        self.online = online;
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn WakeScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Reset writes stranded in `syncing` when the session opens.
    ///
    /// Only the process that owns draining should ask for this. A short-lived
    /// reader that recovered would reset the write a running drain is
    /// replaying.
    pub fn recover_interrupted(mut self, recover: bool) -> Self {
        self.recover = recover;
        self
    }

    /// Open the session over the database at `path`.
    pub fn open(self, path: &Path) -> Result<OfflineSession<T>> {
        let queue_db = Database::open(path)?;
        let staging_db = Database::open(path)?;
        self.build(queue_db, staging_db)
    }

    /// Open the session over throwaway in-memory storage.
    pub fn open_in_memory(self) -> Result<OfflineSession<T>> {
        self.build(Database::open_in_memory()?, Database::open_in_memory()?)
    }

    fn build(self, queue_db: Database, staging_db: Database) -> Result<OfflineSession<T>> {
        let events = Arc::new(EventBus::new());
        let connectivity = Arc::new(Connectivity::new(self.online, events.clone()));
        let queue = Arc::new(SyncQueue::new(
            queue_db,
            &self.config.queue,
            self.clock.clone(),
        ));
        if self.recover {
            queue.recover_interrupted()?;
        }
        let merger = Arc::new(LocalDataMerger::new(staging_db, self.clock.clone()));

        let transport = Arc::new(self.transport);
        let interceptor = OfflineInterceptor::new(
            transport.clone(),
            queue.clone(),
            merger.clone(),
            connectivity.clone(),
            events.clone(),
            self.clock.clone(),
            self.config.interceptor.clone(),
        );
        let coordinator = BackgroundSyncCoordinator::new(
            self.scheduler,
            self.clock,
            events.clone(),
            self.config.background.clone(),
        );

        Ok(OfflineSession {
            config: self.config,
            transport,
            queue,
            merger,
            interceptor,
            coordinator,
            connectivity,
            events,
        })
    }
}

/// The sync components of one application session.
pub struct OfflineSession<T> {
    config: Config,
    transport: Arc<T>,
    queue: Arc<SyncQueue>,
    merger: Arc<LocalDataMerger>,
    interceptor: OfflineInterceptor<Arc<T>>,
    coordinator: BackgroundSyncCoordinator,
    connectivity: Arc<Connectivity>,
    events: Arc<EventBus>,
}

impl<T: Transport + 'static> OfflineSession<T> {
    pub fn builder(transport: T) -> SessionBuilder<T> {
        SessionBuilder::new(transport)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The raw transport, bypassing offline capture.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn queue(&self) -> &SyncQueue {
        &self.queue
    }

    pub fn merger(&self) -> &LocalDataMerger {
        &self.merger
    }

    pub fn interceptor(&self) -> &OfflineInterceptor<Arc<T>> {
        &self.interceptor
    }

    pub fn coordinator(&self) -> &BackgroundSyncCoordinator {
        &self.coordinator
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// Update the connectivity signal. Returns true if it changed.
    pub fn set_online(&self, online: bool) -> bool {
        self.connectivity.set_online(online)
    }

    /// Send a request through the offline interceptor.
    pub async fn send(&self, request: Request) -> TransportResult<Response> {
        self.interceptor.send(request).await
    }

    /// Fetch a collection and put staged entities in front of it.
    ///
    /// When the server cannot be reached, or does not answer with a JSON
    /// array, only the staged entities are returned.
    pub async fn list(&self, endpoint: &str) -> Vec<Value> {
        let server = match self.send(Request::get(endpoint)).await {
            Ok(Response {
                status,
                body: Some(Value::Array(items)),
                ..
            }) if (200..300).contains(&status) => items,
            Ok(response) => {
                tracing::debug!(endpoint, status = response.status, "no server collection");
                Vec::new()
            }
            Err(e) => {
                tracing::debug!(endpoint, error = %e, "server collection unavailable");
                Vec::new()
            }
        };
        self.merger.merge(endpoint, server)
    }

    /// Drain the queue through the raw transport.
    ///
    /// Staged entities are evicted once at least one write succeeded.
    /// Publishes [`SyncEvent::SyncComplete`] or [`SyncEvent::SyncError`].
    pub async fn sync(&self) -> Result<DrainReport> {
        match self.queue.drain(self.transport.as_ref()).await {
            Ok(report) => {
                if report.succeeded > 0 {
                    if let Err(e) = self.merger.evict_completed() {
                        tracing::warn!(error = %e, "could not evict staged entities");
                    }
                }
                self.events.publish(SyncEvent::SyncComplete(report));
                self.publish_pending();
                Ok(report)
            }
            Err(Error::DrainInProgress) => Err(Error::DrainInProgress),
            Err(e) => {
                self.events.publish(SyncEvent::SyncError {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn publish_pending(&self) {
        match self.queue.pending_count() {
            Ok(pending) => self.events.publish(SyncEvent::QueueChanged { pending }),
            Err(e) => tracing::warn!(error = %e, "could not count pending writes"),
        }
    }
}
