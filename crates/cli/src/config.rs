// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is read from `outbox.toml` and includes:
//! - `server_url`: base URL that queued writes are replayed against
//! - `database`: optional path of the durable store
//! - `[queue]`, `[interceptor]`, `[background]` and `[observer]` tuning
//!
//! Every field has a default, so a missing file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "outbox.toml";
const DATA_DIR_NAME: &str = "outbox";
const DB_FILE_NAME: &str = "outbox.db";

/// Client configuration stored in `outbox.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the remote API (e.g. `http://localhost:3000`).
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Optional path for the database. Defaults to the user data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    #[serde(default)]
    pub queue: QueueSettings,
    #[serde(default)]
    pub interceptor: InterceptorSettings,
    #[serde(default)]
    pub background: BackgroundSettings,
    #[serde(default)]
    pub observer: ObserverSettings,
}

/// Replay settings for the sync queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSettings {
    /// Upper bound for a single replayed request, in seconds (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Failures after which an item is abandoned. Absent means retry forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

/// Which requests the write interceptor considers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterceptorSettings {
    /// Only URLs containing this prefix are captured (default: `/api/`).
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Endpoints that must never be queued, such as authentication.
    #[serde(default = "default_excluded_endpoints")]
    pub excluded_endpoints: Vec<String>,
}

/// Cooldowns for background wake registrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundSettings {
    /// Cooldown of the general sync tag, in seconds (default: 300).
    #[serde(default = "default_general_interval_secs")]
    pub general_interval_secs: u64,
    /// Cooldown of per-category sync tags, in seconds (default: 120).
    #[serde(default = "default_type_interval_secs")]
    pub type_interval_secs: u64,
    /// Categories registered by a forced sync.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    /// Registrations older than this are garbage-collected (default: 3600).
    #[serde(default = "default_registration_max_age_secs")]
    pub registration_max_age_secs: u64,
}

/// Timing of the sync status observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverSettings {
    /// Poll interval while items are pending, in seconds (default: 10).
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Delay between a successful drain and the reload request (default: 1500).
    #[serde(default = "default_reload_delay_ms")]
    pub reload_delay_ms: u64,
    /// Endpoint probed by `watch` to detect connectivity.
    #[serde(default = "default_health_endpoint")]
    pub health_endpoint: String,
}

fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_api_prefix() -> String {
    "/api/".to_string()
}

fn default_excluded_endpoints() -> Vec<String> {
    ["/api/auth/login", "/api/auth/logout", "/api/auth/register"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_general_interval_secs() -> u64 {
    300
}

fn default_type_interval_secs() -> u64 {
    120
}

fn default_categories() -> Vec<String> {
    ["users", "tasks", "calendar"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_registration_max_age_secs() -> u64 {
    3600
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_reload_delay_ms() -> u64 {
    1500
}

fn default_health_endpoint() -> String {
    "/api/health".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_url: default_server_url(),
            database: None,
            queue: QueueSettings::default(),
            interceptor: InterceptorSettings::default(),
            background: BackgroundSettings::default(),
            observer: ObserverSettings::default(),
        }
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        QueueSettings {
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: None,
        }
    }
}

impl Default for InterceptorSettings {
    fn default() -> Self {
        InterceptorSettings {
            api_prefix: default_api_prefix(),
            excluded_endpoints: default_excluded_endpoints(),
        }
    }
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        BackgroundSettings {
            general_interval_secs: default_general_interval_secs(),
            type_interval_secs: default_type_interval_secs(),
            categories: default_categories(),
            registration_max_age_secs: default_registration_max_age_secs(),
        }
    }
}

impl Default for ObserverSettings {
    fn default() -> Self {
        ObserverSettings {
            poll_interval_secs: default_poll_interval_secs(),
            reload_delay_ms: default_reload_delay_ms(),
            health_endpoint: default_health_endpoint(),
        }
    }
}

impl QueueSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl BackgroundSettings {
    pub fn general_interval(&self) -> Duration {
        Duration::from_secs(self.general_interval_secs)
    }

    pub fn type_interval(&self) -> Duration {
        Duration::from_secs(self.type_interval_secs)
    }

    pub fn registration_max_age(&self) -> Duration {
        Duration::from_secs(self.registration_max_age_secs)
    }
}

impl ObserverSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }
}

impl Config {
    /// Loads configuration from `path`.
    ///
    /// A missing file yields the defaults; an unreadable or malformed file
    /// is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse config: {}", e)))
    }

    /// Returns the database path, falling back to the user data directory.
    pub fn db_path(&self) -> PathBuf {
        match &self.database {
            Some(path) => path.clone(),
            None => default_data_dir().join(DB_FILE_NAME),
        }
    }
}

/// Directory for client state: `$XDG_DATA_HOME/outbox` or the platform
/// equivalent, falling back to the current directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
