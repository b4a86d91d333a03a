//! Network stack for Vista
//!
//! Thin async HTTP layer used by both the content listing and the image
//! fetch workers.

mod client;
mod request;
mod response;

pub use client::{NetworkClient, USER_AGENT};
pub use request::Request;
pub use response::Response;

use crate::utils::{NetworkError, Result};
use std::time::Duration;

/// `Accept` sent with image fetches
pub const ACCEPT_IMAGES: &str = "image/avif,image/webp,image/png,image/jpeg,image/*;q=0.8";
/// `Accept` sent with listing fetches
pub const ACCEPT_JSON: &str = "application/json";

/// Network stack handling all HTTP communications
#[derive(Debug, Clone)]
pub struct NetworkStack {
    client: NetworkClient,
}

impl NetworkStack {
    /// Create a new network stack
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: NetworkClient::new(timeout)?,
        })
    }

    /// Send a request and fail on any non-2xx status
    pub async fn send(&self, request: Request) -> Result<Response> {
        let url = request.url().to_string();
        let response = self.client.execute(request).await?;
        if !response.is_success() {
            return Err(NetworkError::Http(response.status(), url).into());
        }
        Ok(response)
    }

    /// Fetch a JSON document
    pub async fn fetch_json(&self, url: &str) -> Result<Response> {
        self.send(Request::get(url)?.header("Accept", ACCEPT_JSON)).await
    }

    /// Fetch image bytes, rejecting bodies the server declared as text
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        self.send(Request::image(url)?).await?.into_image_body(url)
    }
}
