// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod drain;
pub mod enqueue;
pub mod list;
pub mod maintenance;
pub mod staged;
pub mod status;
pub mod watch;

use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE_NAME};
use crate::error::Result;
use crate::sync::{HttpTransport, OfflineSession, SessionBuilder};

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub db_path: PathBuf,
}

impl Context {
    /// Load the configuration and apply command-line overrides.
    pub fn load(
        config_path: Option<PathBuf>,
        db: Option<PathBuf>,
        server: Option<String>,
    ) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        let mut config = Config::load(&config_path)?;
        if let Some(server) = server {
            config.server_url = server;
        }
        if let Some(db) = db {
            config.database = Some(db);
        }
        let db_path = config.db_path();
        Ok(Context { config, db_path })
    }

    pub fn session_builder(&self) -> SessionBuilder<HttpTransport> {
        OfflineSession::builder(HttpTransport::new(self.config.server_url.clone()))
            .config(self.config.clone())
    }

    /// Open a session over the configured database.
    ///
    /// Commands that only inspect or edit the queue start offline so nothing
    /// is sent by accident.
    pub fn open_session(&self, online: bool) -> Result<OfflineSession<HttpTransport>> {
        self.session_builder().online(online).open(&self.db_path)
    }
}

/// Print `value` as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
