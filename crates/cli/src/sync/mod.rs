// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first write synchronization.
//!
//! Lets callers keep writing while the server is unreachable and replays
//! those writes once it is reachable again.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐     ┌────────────────────┐     ┌───────────┐
//! │  Caller  │────►│ OfflineInterceptor │────►│ Transport │────► Server
//! └──────────┘     └────────────────────┘     └───────────┘
//!                    │ offline   │ creates           ▲
//!                    ▼           ▼                   │ drain
//!              ┌───────────┐ ┌─────────────────┐     │
//!              │ SyncQueue │ │ LocalDataMerger │     │
//!              └───────────┘ └─────────────────┘     │
//!                    │                               │
//!                    └──────── SyncObserver ─────────┘
//!                         (connectivity, poll, wake)
//! ```
//!
//! # Features
//!
//! - Durable SQLite queue replayed in creation order
//! - Optimistic staging of created entities with temporary ids
//! - Per-tag cooldowns for host background wakes
//! - Typed event subscriptions instead of ambient broadcasts
//! - Injectable transport and scheduler traits for testing

mod connectivity;
mod coordinator;
mod events;
mod interceptor;
mod merger;
mod observer;
mod queue;
mod session;
mod transport;

pub use connectivity::Connectivity;
pub use coordinator::{
    type_sync_tag, BackgroundSyncCoordinator, LocalWakeScheduler, UnsupportedScheduler,
    WakeError, WakeScheduler, WakeSignal, GENERAL_SYNC_TAG,
};
pub use events::{EventBus, SubscriptionId, SyncEvent};
pub use interceptor::OfflineInterceptor;
pub use merger::LocalDataMerger;
pub use observer::{phase_after, SyncObserver, SyncPhase, SyncStatus};
pub use queue::{replay_request, DrainReport, SyncQueue, IDEMPOTENCY_HEADER};
pub use session::{OfflineSession, SessionBuilder};
pub use transport::{
    HttpTransport, Request, Response, Transport, TransportError, TransportResult, QUEUED_HEADER,
};

#[cfg(test)]
mod test_helpers;

#[cfg(test)]
mod coordinator_tests;

#[cfg(test)]
mod events_tests;
