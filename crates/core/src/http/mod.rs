//! HTTP boundary.
//!
//! Providers never talk to the network directly; they go through an injected
//! [`HttpClient`] so tests can count calls and serve canned payloads.

mod reqwest_client;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use reqwest_client::ReqwestHttpClient;

use crate::signer::SignedParams;

/// Errors surfaced by an [`HttpClient`].
#[derive(Error, Debug, Clone)]
pub enum HttpError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body was not valid JSON.
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl HttpError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// HTTP status code, when the server answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Query parameters, headers and timeout for one request.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub params: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, params: SignedParams) -> Self {
        self.params = params.into_inner();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// JSON-over-HTTP client used by every provider.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, options: RequestOptions) -> Result<Value, HttpError>;

    async fn post(
        &self,
        url: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<Value, HttpError>;
}
