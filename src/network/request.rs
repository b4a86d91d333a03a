//! HTTP request types

use super::ACCEPT_IMAGES;
use crate::utils::{NetworkError, Result};
use std::collections::HashMap;
use url::Url;

/// Outgoing GET request for a gallery resource
#[derive(Debug, Clone)]
pub struct Request {
    url: Url,
    headers: HashMap<String, String>,
}

impl Request {
    /// Create a GET request, rejecting anything that is not http(s)
    pub fn get(url: impl AsRef<str>) -> Result<Self> {
        let raw = url.as_ref();
        let url = Url::parse(raw)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(NetworkError::InvalidUrl(raw.to_string()).into());
        }
        Ok(Self {
            url,
            headers: HashMap::new(),
        })
    }

    /// GET request negotiating an image body
    pub fn image(url: impl AsRef<str>) -> Result<Self> {
        Ok(Self::get(url)?.header("Accept", ACCEPT_IMAGES))
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Get the URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
}
