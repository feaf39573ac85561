// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Nothing listens on the discard port, so drains fail fast.
pub const UNREACHABLE_SERVER: &str = "http://127.0.0.1:9";

pub fn outbox() -> Command {
    cargo_bin_cmd!("outbox")
}

/// Command bound to a database inside `temp`, ignoring any ambient config.
pub fn outbox_in(temp: &TempDir) -> Command {
    let mut cmd = outbox();
    cmd.current_dir(temp.path())
        .arg("--config")
        .arg(temp.path().join("missing.toml"))
        .arg("--db")
        .arg(temp.path().join("outbox.db"))
        .env("RUST_LOG", "warn");
    cmd
}

/// Queue a write and return its queue id.
pub fn enqueue(temp: &TempDir, method: &str, endpoint: &str, data: &str) -> String {
    let output = outbox_in(temp)
        .args(["enqueue", method, endpoint, "-d", data, "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "enqueue failed: {:?}", output);

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    body["queueId"].to_string()
}
