// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! outbox - offline-first write synchronization for JSON APIs.
//!
//! This crate provides the sync layer behind the `outbox` CLI: writes made
//! while the server is unreachable are stored in SQLite and replayed in
//! order once it is reachable again.
//!
//! # Main Components
//!
//! - [`sync::OfflineInterceptor`] - captures API writes while offline
//! - [`sync::SyncQueue`] - durable, ordered log of pending writes
//! - [`sync::LocalDataMerger`] - optimistic copies of created entities
//! - [`sync::BackgroundSyncCoordinator`] - host wake registration with cooldowns
//! - [`sync::SyncObserver`] - status state machine driving drains
//! - [`Config`] - client configuration (`outbox.toml`)
//!
//! # Usage
//!
//! ```rust,ignore
//! use outbox::sync::{HttpTransport, OfflineSession, Request};
//!
//! let session = OfflineSession::builder(HttpTransport::new("http://localhost:3000"))
//!     .online(false)
//!     .open(Path::new("outbox.db"))?;
//!
//! // Queued, answered with a synthetic success.
//! session.send(Request::post("/api/users", json!({ "name": "Ana" }))).await?;
//!
//! session.set_online(true);
//! let report = session.sync().await?;
//! ```

mod cli;
mod commands;
mod display;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat};
pub use config::Config;
pub use error::{Error, Result};

use commands::Context;

/// Run the command-line interface.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = Context::load(cli.config, cli.db, cli.server)?;
    match cli.command {
        Command::Status { output } => commands::status::run(&ctx, output),
        Command::List { status, output } => commands::list::run(&ctx, status, output),
        Command::Enqueue {
            method,
            endpoint,
            data,
            headers,
            output,
        } => commands::enqueue::run(
            &ctx,
            &method,
            &endpoint,
            data.as_deref(),
            &headers,
            output,
        ),
        Command::Staged { endpoint, output } => commands::staged::run(&ctx, endpoint, output),
        Command::Drain { output } => commands::drain::run(&ctx, output),
        Command::Retry { id } => commands::maintenance::retry(&ctx, &id),
        Command::ClearCompleted => commands::maintenance::clear_completed(&ctx),
        Command::Watch { output } => commands::watch::run(&ctx, output),
    }
}
