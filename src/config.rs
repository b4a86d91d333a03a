//! Application configuration
//!
//! Loaded from a JSON file; every field is optional and falls back to its
//! default. Command-line flags override whatever the file provides.

use crate::content::{CmsSource, ContentSource, FileSource};
use crate::gallery::UiConfig;
use crate::loader::LoaderConfig;
use crate::network::NetworkStack;
use crate::utils::{ConfigError, Result};
use crate::visibility::VisibilityOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VistaConfig {
    /// CMS origin (`http(s)://...`) or path to a JSON listing
    pub source: Option<String>,
    /// CMS collection slug
    pub collection: String,
    /// Base for relative media references
    pub media_base_url: Option<String>,
    /// Only list records flagged for the gallery
    pub gallery_only: bool,
    pub loader: LoaderConfig,
    pub visibility: VisibilityOptions,
    pub ui: UiConfig,
}

impl Default for VistaConfig {
    fn default() -> Self {
        Self {
            source: None,
            collection: "gallery".to_string(),
            media_base_url: None,
            gallery_only: true,
            loader: LoaderConfig::default(),
            visibility: VisibilityOptions::default(),
            ui: UiConfig::default(),
        }
    }
}

impl VistaConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.loader.validate()?;
        self.visibility.validate()?;
        if self.collection.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "collection",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Build the listing source named by `source`
    pub fn content_source(&self, network: NetworkStack) -> Result<Box<dyn ContentSource>> {
        let Some(source) = self.source.as_deref() else {
            return Err(ConfigError::Invalid {
                field: "source",
                reason: "no content source given".to_string(),
            }
            .into());
        };
        let media_base = self.media_base_url.as_deref();

        if source.starts_with("http://") || source.starts_with("https://") {
            let cms = CmsSource::new(network, source, &self.collection, media_base, self.gallery_only)?;
            Ok(Box::new(cms))
        } else {
            Ok(Box::new(FileSource::new(source, media_base, self.gallery_only)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn test_empty_json_is_default() {
        let config = VistaConfig::from_json("{}").unwrap();
        assert_eq!(config, VistaConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_sections() {
        let config = VistaConfig::from_json(
            r#"{
                "source": "https://cms.example",
                "loader": {"max_concurrent": 2},
                "visibility": {"root_margin": 50.0},
                "ui": {"theme": "dark"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.loader.max_concurrent, 2);
        assert_eq!(config.loader.tick_interval_ms, 100);
        assert_eq!(config.visibility.root_margin, 50.0);
        assert_eq!(config.visibility.threshold, 0.1);
        assert_eq!(config.ui.theme, crate::gallery::Theme::Dark);
    }

    #[test]
    fn test_parse_error() {
        let err = VistaConfig::from_json("{not json").unwrap_err();
        assert!(err.to_string().starts_with("Config error: parse"));
    }

    #[test]
    fn test_validate_delegates() {
        let mut config = VistaConfig::default();
        config.visibility.threshold = 2.0;
        assert!(config.validate().is_err());

        let mut config = VistaConfig::default();
        config.loader.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_content_source_selection() {
        let network = NetworkStack::new(Duration::from_secs(5)).unwrap();

        let mut config = VistaConfig::default();
        assert!(config.content_source(network.clone()).is_err());

        config.source = Some("https://cms.example".to_string());
        let source = config.content_source(network.clone()).unwrap();
        assert!(source.describe().starts_with("https://cms.example/api/gallery"));

        config.source = Some("listing.json".to_string());
        let source = config.content_source(network).unwrap();
        assert_eq!(source.describe(), "listing.json");
    }
}
