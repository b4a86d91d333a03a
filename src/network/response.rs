//! HTTP response types

use crate::utils::{NetworkError, Result};
use std::collections::HashMap;

/// HTTP response with a fully buffered body
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl Response {
    /// Create a new response
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Create a new response with headers
    pub fn with_headers(
        status: u16,
        body: impl Into<Vec<u8>>,
        headers: HashMap<String, String>,
    ) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Get the status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Check if the response was successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response body
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Get the content type from headers
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(|s| s.as_str())
    }

    /// Body of an image response.
    ///
    /// Fails when the server declared a text type, e.g. an HTML error page
    /// served with 200. An undeclared or generic binary type passes through
    /// to the decoder.
    pub fn into_image_body(self, url: &str) -> Result<Vec<u8>> {
        if let Some(content_type) = self.content_type() {
            let media_type = content_type
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase();
            if media_type.starts_with("text/") || media_type == "application/json" {
                return Err(NetworkError::Decode(format!("{url} served {media_type}, not an image")).into());
            }
        }
        Ok(self.body)
    }
}
