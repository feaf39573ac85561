// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use outbox_core::Method;
use thiserror::Error;

use crate::sync::TransportError;

/// All possible errors that can occur in the outbox library.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] outbox_core::Error),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("a drain is already in progress")]
    DrainInProgress,

    #[error("staging {0} writes is not supported\n  hint: only creates (POST) are merged into collections")]
    UnsupportedStage(Method),

    #[error("invalid header '{0}'\n  hint: headers are written as name:value")]
    InvalidHeader(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// A specialized Result type for outbox operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
