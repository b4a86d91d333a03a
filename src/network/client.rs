//! HTTP client implementation

use super::{Request, Response};
use crate::utils::Result;
use std::collections::HashMap;
use std::time::Duration;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("Vista/", env!("CARGO_PKG_VERSION"));

/// HTTP client with connection pooling
#[derive(Debug, Clone)]
pub struct NetworkClient {
    inner: reqwest::Client,
}

impl NetworkClient {
    /// Create a new HTTP client
    pub fn new(timeout: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { inner })
    }

    /// Execute an HTTP request, buffering the whole body
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let mut builder = self.inner.get(request.url().clone());
        for (key, value) in request.headers() {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response.bytes().await?;

        log::debug!("GET {} -> {} ({} bytes)", request.url(), status, body.len());
        Ok(Response::with_headers(status, body.to_vec(), headers))
    }
}
