//! rpcbridge Client Library
//!
//! Forwards JSON-RPC payloads to an HTTP endpoint and hands back the raw
//! response body.

pub mod error;

pub use error::{Result, TransportError};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

/// Sends a payload to an upstream endpoint and returns the response body.
///
/// The bridge only depends on this capability, which keeps the HTTP stack
/// swappable in tests.
pub trait Forwarder: Send + Sync {
    fn post<T>(
        &self,
        endpoint: &str,
        payload: Option<&T>,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send
    where
        T: Serialize + Sync + ?Sized;
}

/// HTTP forwarding client
pub struct ForwardingClient {
    base_url: String,
    http: reqwest::Client,
    timeout: Duration,
    headers: HeaderMap,
}

impl ForwardingClient {
    /// Create a new client. Every request is bounded by `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut client = Self {
            base_url: String::new(),
            http,
            timeout,
            headers,
        };
        client.set_base_url(base_url)?;
        Ok(client)
    }

    /// Replace the upstream base URL. A trailing slash is dropped so that
    /// endpoint paths can always start with `/`.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> Result<()> {
        let base_url = base_url.into();
        reqwest::Url::parse(&base_url).map_err(|e| TransportError::InvalidUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;

        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(())
    }

    /// Add or replace a header sent with every request.
    pub fn set_header(&mut self, key: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| TransportError::InvalidHeader(format!("{}: {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::InvalidHeader(format!("{}: {}", key, e)))?;

        self.headers.insert(name, value);
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl Forwarder for ForwardingClient {
    async fn post<T>(&self, endpoint: &str, payload: Option<&T>) -> Result<Vec<u8>>
    where
        T: Serialize + Sync + ?Sized,
    {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut request = self.http.post(&url).headers(self.headers.clone());
        if let Some(payload) = payload {
            let body = serde_json::to_vec(payload).map_err(TransportError::Serialize)?;
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(%url, %status, "upstream responded");

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
