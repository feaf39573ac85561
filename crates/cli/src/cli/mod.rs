// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "outbox")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first write queue for a JSON API")]
#[command(
    long_about = "Offline-first write queue for a JSON API.\n\n\
    Writes made while the server is unreachable are stored locally and replayed \
    in order once it is reachable again."
)]
pub struct Cli {
    /// Configuration file (default: ./outbox.toml)
    #[arg(short = 'c', long = "config", global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Database file (overrides the configured database)
    #[arg(long = "db", global = true, value_name = "path")]
    pub db: Option<PathBuf>,

    /// Server base URL (overrides the configured server_url)
    #[arg(long = "server", global = true, value_name = "url")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show queue and staging counts
    Status {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List queued writes
    #[command(after_help = "\
Examples:
  outbox list                  All queued writes
  outbox list --status failed  Writes whose last replay failed
  outbox list -o json          Machine-readable output")]
    List {
        /// Only writes in this status (pending, syncing, completed, failed, abandoned)
        #[arg(long, short)]
        status: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Queue a write for later replay
    #[command(after_help = "\
Examples:
  outbox enqueue POST /api/users --data '{\"name\":\"Ana\"}'
  outbox enqueue DELETE /api/tasks/12 -H 'Authorization: Bearer t0k3n'")]
    Enqueue {
        /// HTTP method (POST, PUT, PATCH, DELETE)
        method: String,

        /// Endpoint path or URL
        #[arg(value_parser = non_empty_string)]
        endpoint: String,

        /// JSON request body
        #[arg(long, short)]
        data: Option<String>,

        /// Request header as name:value (repeatable)
        #[arg(long = "header", short = 'H', value_name = "name:value")]
        headers: Vec<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show entities created offline and not yet synced
    Staged {
        /// Only entities for this endpoint
        endpoint: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Replay queued writes against the server now
    Drain {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Put a failed or abandoned write back in line
    Retry {
        /// Queue item id
        id: String,
    },

    /// Remove writes left in the completed state
    ClearCompleted,

    /// Keep running and replay writes whenever the server is reachable
    Watch {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
