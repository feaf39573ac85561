// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use outbox_core::{Database, ManualClock};

use super::coordinator::{WakeError, WakeScheduler};
use super::events::{EventBus, SyncEvent};
use super::transport::{Request, Response, Transport, TransportResult};

/// Mock transport for testing without real sockets.
///
/// Replies with scripted results in order; once the script runs out every
/// request gets an empty `200`.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<TransportResult<Response>>>,
    requests: Mutex<Vec<Request>>,
    delay: Mutex<Option<Duration>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: Response) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_status(&self, status: u16) {
        self.push_response(Response::new(status));
    }

    pub fn push_result(&self, result: TransportResult<Response>) {
        self.responses.lock().unwrap().push_back(result);
    }

    /// Delay every reply by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

impl Transport for MockTransport {
    fn send(
        &self,
        request: Request,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Response>> + Send + '_>> {
        self.requests.lock().unwrap().push(request);
        let result = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Response::new(200)));
        let delay = *self.delay.lock().unwrap();
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }
}

/// Scheduler that records registrations.
pub struct MockScheduler {
    available: bool,
    reject: Mutex<bool>,
    registered: Mutex<Vec<String>>,
}

impl MockScheduler {
    pub fn new() -> Self {
        MockScheduler {
            available: true,
            reject: Mutex::new(false),
            registered: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        MockScheduler {
            available: false,
            ..Self::new()
        }
    }

    pub fn set_reject(&self, reject: bool) {
        *self.reject.lock().unwrap() = reject;
    }

    /// Tags the host accepted, in order.
    pub fn registered(&self) -> Vec<String> {
        self.registered.lock().unwrap().clone()
    }
}

impl WakeScheduler for MockScheduler {
    fn is_available(&self) -> bool {
        self.available
    }

    fn register(
        &self,
        tag: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), WakeError>> + Send + '_>> {
        let result = if *self.reject.lock().unwrap() {
            Err(WakeError("quota exceeded".to_string()))
        } else {
            self.registered.lock().unwrap().push(tag.to_string());
            Ok(())
        };
        Box::pin(async move { result })
    }
}

/// A manual clock starting at a fixed, realistic time.
pub fn test_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(1_767_225_600_000))
}

pub fn memory_db() -> Database {
    Database::open_in_memory().unwrap()
}

/// Collect every event published on `bus`.
pub fn record_events(bus: &EventBus) -> Arc<Mutex<Vec<SyncEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    bus.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    seen
}
