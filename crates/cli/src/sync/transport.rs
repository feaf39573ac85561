// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for HTTP-style requests.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP connections for production ([`HttpTransport`])
//! - Decorators such as the offline interceptor
//! - Mock transports for unit testing

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use outbox_core::Method;
use serde_json::Value;

/// Header set on synthetic responses produced for a queued write.
pub const QUEUED_HEADER: &str = "x-outbox-queued";

/// Error type for transport operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// The server could not be reached.
    #[error("network unreachable: {0}")]
    Unreachable(String),

    /// The request did not complete in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The request could not be built or sent.
    #[error("request failed: {0}")]
    Request(String),

    /// The response could not be read.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// An outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Absolute URL or a path resolved against the transport's base URL.
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Request {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, url).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// A received (or synthesized) response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Response {
            status,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// A `200` response carrying `body`.
    pub fn ok(body: Value) -> Self {
        Self::new(200).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true if this response stands in for a write that was queued.
    pub fn is_queued(&self) -> bool {
        self.headers
            .get(QUEUED_HEADER)
            .is_some_and(|v| v == "true")
    }
}

/// Transport trait for request/response communication.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send + Sync {
    /// Send a request and wait for its response.
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    fn send(
        &self,
        request: Request,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Response>> + Send + '_>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(
        &self,
        request: Request,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Response>> + Send + '_>> {
        (**self).send(request)
    }
}

/// HTTP transport implementation using reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport that resolves relative URLs against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpTransport {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Returns the absolute URL for a request target.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if url.starts_with('/') {
            format!("{}{}", base, url)
        } else {
            format!("{}/{}", base, url)
        }
    }

    async fn send_http(&self, request: Request) -> TransportResult<Response> {
        let url = self.resolve(&request.url);
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let mut builder = self.client.request(method, &url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;
        let body = if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            }))
        };

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Unreachable(err.to_string())
    } else if err.is_timeout() {
        TransportError::Unreachable(format!("timed out: {}", err))
    } else {
        TransportError::Request(err.to_string())
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: Request,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Response>> + Send + '_>> {
        Box::pin(self.send_http(request))
    }
}
