use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use super::{HttpClient, HttpError, RequestOptions};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = concat!("cashback-hub/", env!("CARGO_PKG_VERSION"));

/// Longest error body kept in an [`HttpError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// [`HttpClient`] backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl ReqwestHttpClient {
    /// Create a client whose requests time out after `timeout` unless a
    /// request sets its own.
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn prepare(&self, mut request: RequestBuilder, options: &RequestOptions) -> RequestBuilder {
        request = request.header(reqwest::header::ACCEPT, "application/json");
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !options.params.is_empty() {
            request = request.query(&options.params);
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }
        request
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Value, HttpError> {
        let response = request
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(HttpError::status(status.as_u16(), body));
        }

        let text = response
            .text()
            .await
            .map_err(|e| HttpError::Transport(format!("Failed to read response: {}", e)))?;
        serde_json::from_str(&text).map_err(|e| HttpError::Decode(e.to_string()))
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, options: RequestOptions) -> Result<Value, HttpError> {
        debug!("GET {} with {} params", url, options.params.len());
        let request = self.prepare(self.client.get(url), &options);
        self.execute(request).await
    }

    async fn post(
        &self,
        url: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<Value, HttpError> {
        debug!("POST {} with {} params", url, options.params.len());
        let mut request = self.prepare(self.client.post(url), &options);
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.execute(request).await
    }
}
