// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for outbox-core operations.

use thiserror::Error;

/// All possible errors that can occur in outbox-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("queue item not found: {0}")]
    ItemNotFound(i64),

    #[error("invalid status transition: cannot go from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("invalid method: '{0}'\n  hint: valid methods are: GET, POST, PUT, PATCH, DELETE")]
    InvalidMethod(String),

    #[error("method {0} is not a write\n  hint: only POST, PUT, PATCH and DELETE can be queued")]
    NotAWrite(String),

    #[error("invalid status: '{0}'\n  hint: valid statuses are: pending, syncing, completed, failed, abandoned")]
    InvalidStatus(String),

    #[error("invalid registration status: '{0}'")]
    InvalidRegistrationStatus(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for outbox-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
