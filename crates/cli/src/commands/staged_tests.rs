// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::commands::testing::offline_session;
use crate::sync::Request;
use serde_json::json;
use yare::parameterized;

#[parameterized(
    text_all = { OutputFormat::Text, None },
    text_endpoint = { OutputFormat::Text, Some("/api/users") },
    json_all = { OutputFormat::Json, None },
    json_endpoint = { OutputFormat::Json, Some("/api/users?page=1") },
)]
fn staged_renders_every_format(output: OutputFormat, endpoint: Option<&str>) {
    let session = offline_session();
    session
        .interceptor()
        .capture(&Request::post("/api/users", json!({ "name": "A" })))
        .unwrap();
    run_impl(&session, endpoint, output).unwrap();
}
