// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline write capture.
//!
//! [`OfflineInterceptor`] decorates a [`Transport`]. While the connectivity
//! signal is offline, API writes are appended to the [`SyncQueue`] instead of
//! being sent, creates are staged in the [`LocalDataMerger`], and the caller
//! receives a synthetic `200` flagged with [`QUEUED_HEADER`]. Everything
//! else goes straight to the wrapped transport.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use outbox_core::{ClockSource, NewQueueItem};
use serde_json::{json, Value};

use super::connectivity::Connectivity;
use super::events::{EventBus, SyncEvent};
use super::merger::LocalDataMerger;
use super::queue::SyncQueue;
use super::transport::{
    Request, Response, Transport, TransportError, TransportResult, QUEUED_HEADER,
};
use crate::config::InterceptorSettings;

/// Transport decorator that diverts API writes into the queue while offline.
pub struct OfflineInterceptor<T> {
    inner: T,
    queue: Arc<SyncQueue>,
    merger: Arc<LocalDataMerger>,
    connectivity: Arc<Connectivity>,
    events: Arc<EventBus>,
    clock: Arc<dyn ClockSource>,
    settings: InterceptorSettings,
    enabled: AtomicBool,
}

impl<T: Transport> OfflineInterceptor<T> {
    pub fn new(
        inner: T,
        queue: Arc<SyncQueue>,
        merger: Arc<LocalDataMerger>,
        connectivity: Arc<Connectivity>,
        events: Arc<EventBus>,
        clock: Arc<dyn ClockSource>,
        settings: InterceptorSettings,
    ) -> Self {
        OfflineInterceptor {
            inner,
            queue,
            merger,
            connectivity,
            events,
            clock,
            settings,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Turn capture on. Returns false if it was already on.
    pub fn enable(&self) -> bool {
        !self.enabled.swap(true, Ordering::SeqCst)
    }

    /// Turn capture off. Returns false if it was already off.
    pub fn disable(&self) -> bool {
        self.enabled.swap(false, Ordering::SeqCst)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Returns true if `request` is an API write eligible for capture.
    ///
    /// Connectivity is not considered here.
    pub fn is_capturable(&self, request: &Request) -> bool {
        request.method.is_write()
            && request.url.contains(&self.settings.api_prefix)
            && !self
                .settings
                .excluded_endpoints
                .iter()
                .any(|excluded| request.url.contains(excluded.as_str()))
    }

    /// Returns true if `request` would be captured right now.
    pub fn should_intercept(&self, request: &Request) -> bool {
        self.is_enabled() && !self.connectivity.is_online() && self.is_capturable(request)
    }

    /// Resource category of an API URL: the first path segment after the
    /// API prefix, e.g. `users` for `/api/users/42`.
    pub fn category(&self, url: &str) -> Option<String> {
        let (_, rest) = url.split_once(self.settings.api_prefix.as_str())?;
        let segment = rest.split(['/', '?', '#']).next()?;
        (!segment.is_empty()).then(|| segment.to_string())
    }

    /// Persist a write and answer it with a synthetic success.
    ///
    /// If the write cannot be appended the call fails with
    /// [`TransportError::Unreachable`]; a queued response is never returned
    /// for a write that is not durably stored.
    pub fn capture(&self, request: &Request) -> TransportResult<Response> {
        let created_at = self.clock.now_utc();

        let staged = match (&request.body, request.method.is_create()) {
            (Some(body @ Value::Object(_)), true) => {
                match self.merger.prepare(&request.url, request.method, body.clone()) {
                    Ok(item) => Some(item),
                    Err(e) => {
                        tracing::warn!(url = %request.url, error = %e, "could not stage entity");
                        None
                    }
                }
            }
            _ => None,
        };

        let mut item = NewQueueItem::new(
            request.url.clone(),
            request.method,
            request.body.clone(),
            request.headers.clone(),
            created_at,
        )
        .map_err(|e| TransportError::Unreachable(format!("offline and not queued: {}", e)))?;
        if let Some(staged) = &staged {
            item = item.with_temp_id(staged.temp_id.clone());
        }

        let id = self
            .queue
            .enqueue_item(&item)
            .map_err(|e| TransportError::Unreachable(format!("offline and not queued: {}", e)))?;

        let temp_id = match staged {
            Some(staged) => match self.merger.insert(&staged) {
                Ok(()) => Some(staged.temp_id),
                Err(e) => {
                    tracing::warn!(%id, error = %e, "write queued but entity not staged");
                    None
                }
            },
            None => None,
        };

        self.events.publish(SyncEvent::WriteQueued {
            id,
            endpoint: request.url.clone(),
            category: self.category(&request.url),
        });
        match self.queue.pending_count() {
            Ok(pending) => self.events.publish(SyncEvent::QueueChanged { pending }),
            Err(e) => tracing::warn!(error = %e, "could not count pending writes"),
        }

        Ok(Response::ok(json!({
            "success": true,
            "offline": true,
            "queued": true,
            "queueId": id,
            "tempId": temp_id,
        }))
        .with_header(QUEUED_HEADER, "true"))
    }
}

impl<T: Transport> Transport for OfflineInterceptor<T> {
    fn send(
        &self,
        request: Request,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Response>> + Send + '_>> {
        if self.should_intercept(&request) {
            let result = self.capture(&request);
            return Box::pin(async move { result });
        }
        tracing::debug!(method = %request.method, url = %request.url, "passing request through");
        self.inner.send(request)
    }
}
