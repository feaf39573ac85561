// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued write records.
//!
//! A [`QueueItem`] is one deferred network mutation. Items are created when a
//! write is captured offline, moved through [`QueueStatus`] by the drainer,
//! and deleted once the server acknowledged them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Identity of a queued write.
///
/// Allocated by storage in strictly increasing order, so sorting by id is
/// sorting by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(ItemId)
            .map_err(|_| Error::InvalidInput(format!("invalid queue item id '{s}'")))
    }
}

/// HTTP-style verb of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    /// Create.
    Post,
    /// Replace.
    Put,
    /// Partial update.
    Patch,
    Delete,
}

impl Method {
    /// Returns the string representation used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Returns true for verbs that mutate server state and can be queued.
    pub fn is_write(&self) -> bool {
        !matches!(self, Method::Get)
    }

    /// Returns true for the verb that creates a new entity.
    pub fn is_create(&self) -> bool {
        matches!(self, Method::Post)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

/// Lifecycle status of a queued write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    /// Waiting for the next drain.
    Pending,
    /// A drain is replaying this item right now.
    Syncing,
    /// The server acknowledged the write. Items are deleted right after.
    Completed,
    /// The last replay failed. Still drained on the next pass.
    Failed,
    /// Gave up after reaching the retry ceiling. Only a manual retry revives it.
    Abandoned,
}

impl QueueStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Syncing => "syncing",
            QueueStatus::Completed => "completed",
            QueueStatus::Failed => "failed",
            QueueStatus::Abandoned => "abandoned",
        }
    }

    /// All statuses, in lifecycle order.
    pub fn all() -> [QueueStatus; 5] {
        [
            QueueStatus::Pending,
            QueueStatus::Syncing,
            QueueStatus::Completed,
            QueueStatus::Failed,
            QueueStatus::Abandoned,
        ]
    }

    /// Returns true if the next drain should replay an item in this status.
    pub fn is_drainable(&self) -> bool {
        matches!(self, QueueStatus::Pending | QueueStatus::Failed)
    }

    /// Check if a transition from this status to target is valid.
    ///
    /// Statuses only move forward, except that a failed or abandoned item can
    /// be put back to pending by a manual retry, and an item stranded in
    /// syncing by an interrupted drain can be recovered to pending.
    pub fn can_transition_to(&self, target: QueueStatus) -> bool {
        use QueueStatus::*;
        matches!(
            (self, target),
            (Pending, Syncing)
                | (Syncing, Completed)
                | (Syncing, Failed)
                | (Syncing, Abandoned)
                | (Syncing, Pending)
                | (Failed, Syncing)
                | (Failed, Pending)
                | (Abandoned, Pending)
        )
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QueueStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(QueueStatus::Pending),
            "syncing" => Ok(QueueStatus::Syncing),
            "completed" => Ok(QueueStatus::Completed),
            "failed" => Ok(QueueStatus::Failed),
            "abandoned" => Ok(QueueStatus::Abandoned),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// A write about to be appended to the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQueueItem {
    pub endpoint: String,
    pub method: Method,
    pub payload: Option<serde_json::Value>,
    pub headers: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    /// Temporary identity of the optimistic entity staged for this write.
    pub temp_id: Option<String>,
}

impl NewQueueItem {
    /// Creates a new write, rejecting verbs that are not mutations.
    pub fn new(
        endpoint: impl Into<String>,
        method: Method,
        payload: Option<serde_json::Value>,
        headers: BTreeMap<String, String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        if !method.is_write() {
            return Err(Error::NotAWrite(method.to_string()));
        }
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(Error::InvalidInput("endpoint cannot be empty".to_string()));
        }
        Ok(NewQueueItem {
            endpoint,
            method,
            payload,
            headers,
            created_at,
            temp_id: None,
        })
    }

    /// Links the write to a staged optimistic entity.
    pub fn with_temp_id(mut self, temp_id: impl Into<String>) -> Self {
        self.temp_id = Some(temp_id.into());
        self
    }
}

/// A durable record of one deferred network mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: ItemId,
    pub endpoint: String,
    pub method: Method,
    pub payload: Option<serde_json::Value>,
    pub headers: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub status: QueueStatus,
    pub retries: u32,
    /// Description of the most recent replay failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_id: Option<String>,
}

impl QueueItem {
    /// Returns true if the next drain should replay this item.
    pub fn is_drainable(&self) -> bool {
        self.status.is_drainable()
    }
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
