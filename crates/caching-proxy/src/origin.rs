//! Requests to the origin server

use crate::error::{ProxyError, Result};
use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// A fully buffered origin response
#[derive(Debug)]
pub struct OriginResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// HTTP client bound to a single origin
#[derive(Clone)]
pub struct OriginClient {
    client: Client,
    base: String,
}

impl OriginClient {
    /// Create a client for `origin`. Every request is bounded by `timeout`.
    pub fn new(origin: &Url, timeout: Duration) -> Result<Self> {
        // The origin is always contacted directly, never via HTTP_PROXY
        let client = Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .map_err(|e| ProxyError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base: origin.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Full URL fetched for a request path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// GET `<origin><path>` and read the whole body. Non-2xx statuses are
    /// returned as-is; only transport failures are errors.
    pub async fn fetch(&self, path: &str) -> Result<OriginResponse> {
        let url = self.url_for(path);
        debug!(url = %url, "Sending request to origin");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        debug!(url = %url, status = %status, size = body.len(), "Origin responded");

        Ok(OriginResponse {
            status,
            headers,
            body,
        })
    }
}
