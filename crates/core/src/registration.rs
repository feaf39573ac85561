// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background wake registrations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Status of a wake request for a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Accepted by the host scheduler.
    Registered,
    /// Waiting on the host to deliver the wake.
    Pending,
    /// The host reported a completed wake.
    Completed,
    /// The host reported a failed wake.
    Failed,
}

impl RegistrationStatus {
    /// Returns the string representation used in display.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Completed => "completed",
            RegistrationStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "registered" => Ok(RegistrationStatus::Registered),
            "pending" => Ok(RegistrationStatus::Pending),
            "completed" => Ok(RegistrationStatus::Completed),
            "failed" => Ok(RegistrationStatus::Failed),
            _ => Err(Error::InvalidRegistrationStatus(s.to_string())),
        }
    }
}

/// Record that a wake request for a tag was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRegistration {
    pub tag: String,
    /// Time of the last successful registration, in ms since Unix epoch.
    pub registered_at_ms: u64,
    pub status: RegistrationStatus,
    pub retry_count: u32,
}

impl SyncRegistration {
    /// Creates a freshly registered record.
    pub fn new(tag: impl Into<String>, registered_at_ms: u64) -> Self {
        SyncRegistration {
            tag: tag.into(),
            registered_at_ms,
            status: RegistrationStatus::Registered,
            retry_count: 0,
        }
    }

    /// Returns true if `now_ms` is still within `min_interval` of the last registration.
    pub fn in_cooldown(&self, now_ms: u64, min_interval: Duration) -> bool {
        now_ms.saturating_sub(self.registered_at_ms) < min_interval.as_millis() as u64
    }

    /// Returns true if the record is older than `max_age`.
    pub fn is_expired(&self, now_ms: u64, max_age: Duration) -> bool {
        now_ms.saturating_sub(self.registered_at_ms) > max_age.as_millis() as u64
    }
}

#[cfg(test)]
#[path = "registration_tests.rs"]
mod tests;
