// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;

use outbox_core::Method;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::sync::{OfflineSession, Request, Response, Transport};

use super::{print_json, Context};

pub fn run(
    ctx: &Context,
    method: &str,
    endpoint: &str,
    data: Option<&str>,
    headers: &[String],
    output: OutputFormat,
) -> Result<()> {
    let session = ctx.open_session(false)?;
    run_impl(&session, method, endpoint, data, headers, output)?;
    Ok(())
}

/// Parse `name:value` header arguments.
pub(crate) fn parse_headers(headers: &[String]) -> Result<BTreeMap<String, String>> {
    let mut parsed = BTreeMap::new();
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| Error::InvalidHeader(header.clone()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidHeader(header.clone()));
        }
        parsed.insert(name.to_string(), value.trim().to_string());
    }
    Ok(parsed)
}

/// Build the write a user asked to queue.
pub(crate) fn build_request(
    method: &str,
    endpoint: &str,
    data: Option<&str>,
    headers: &[String],
) -> Result<Request> {
    let method: Method = method.parse()?;
    if !method.is_write() {
        return Err(outbox_core::Error::NotAWrite(method.to_string()).into());
    }
    let body = data
        .map(serde_json::from_str::<Value>)
        .transpose()
        .map_err(|e| Error::InvalidInput(format!("invalid --data JSON: {}", e)))?;

    let mut request = Request::new(method, endpoint);
    request.headers = parse_headers(headers)?;
    request.body = body;
    Ok(request)
}

pub(crate) fn run_impl<T: Transport + 'static>(
    session: &OfflineSession<T>,
    method: &str,
    endpoint: &str,
    data: Option<&str>,
    headers: &[String],
    output: OutputFormat,
) -> Result<Response> {
    let request = build_request(method, endpoint, data, headers)?;
    let response = session.interceptor().capture(&request)?;
    let body = response.body.clone().unwrap_or(Value::Null);

    match output {
        OutputFormat::Json => print_json(&body)?,
        OutputFormat::Text => {
            let id = body.get("queueId").cloned().unwrap_or(Value::Null);
            match body.get("tempId").and_then(Value::as_str) {
                Some(temp_id) => println!("queued {} (staged as {})", id, temp_id),
                None => println!("queued {}", id),
            }
        }
    }
    Ok(response)
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
