// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! outbox-core: data model and durable storage for the offline write queue.
//!
//! This crate provides the records that survive a restart (queued writes and
//! staged optimistic entities), the in-memory background registration record,
//! and the SQLite storage primitive shared by the `outbox` library and CLI.

pub mod clock;
pub mod db;
pub mod error;
pub mod item;
pub mod local;
pub mod registration;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use db::Database;
pub use error::{Error, Result};
pub use item::{ItemId, Method, NewQueueItem, QueueItem, QueueStatus};
pub use local::{generate_temp_id, is_pending, is_temp_id, normalize_endpoint, LocalDataItem};
pub use registration::{RegistrationStatus, SyncRegistration};
