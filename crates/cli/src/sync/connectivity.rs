// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::events::{EventBus, SyncEvent};

/// Shared reachable/unreachable signal.
#[derive(Debug)]
pub struct Connectivity {
    online: AtomicBool,
    events: Arc<EventBus>,
}

impl Connectivity {
    pub fn new(online: bool, events: Arc<EventBus>) -> Self {
        Connectivity {
            online: AtomicBool::new(online),
            events,
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Update the signal. Publishes [`SyncEvent::Connectivity`] and returns
    /// true only when the value actually changed.
    pub fn set_online(&self, online: bool) -> bool {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous == online {
            return false;
        }
        tracing::info!(online, "connectivity changed");
        self.events.publish(SyncEvent::Connectivity { online });
        true
    }
}
