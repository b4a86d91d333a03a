//! Gallery content source
//!
//! Fetches the ordered list of gallery images from the CMS REST API or from
//! a local JSON export, and resolves media references into
//! [`ImageDescriptor`]s.

mod media;

pub use media::{MediaRef, parse_listing};

use crate::network::NetworkStack;
use crate::utils::{NetworkError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// One gallery item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    /// Stable unique id
    pub id: String,
    /// Absolute resource location
    pub url: String,
    /// Human-readable description
    pub alt: Option<String>,
}

/// Source of the gallery list
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// All gallery images, in display order
    async fn list_images(&self) -> Result<Vec<ImageDescriptor>>;

    /// Human-readable origin, for logs
    fn describe(&self) -> String;
}

/// Payload-style CMS over HTTP
pub struct CmsSource {
    network: NetworkStack,
    endpoint: Url,
    media_base: Url,
}

impl CmsSource {
    /// `site` is the CMS origin, `collection` the gallery collection slug
    pub fn new(
        network: NetworkStack,
        site: &str,
        collection: &str,
        media_base: Option<&str>,
        gallery_only: bool,
    ) -> Result<Self> {
        let site = directory_url(Url::parse(site)?);
        let mut endpoint = site.join(&format!("api/{collection}"))?;
        {
            let mut query = endpoint.query_pairs_mut();
            query.append_pair("limit", "0");
            query.append_pair("depth", "1");
            if gallery_only {
                query.append_pair("where[showInGallery][equals]", "true");
            }
        }
        let media_base = match media_base {
            Some(base) => directory_url(Url::parse(base)?),
            None => site.join("media/")?,
        };
        Ok(Self {
            network,
            endpoint,
            media_base,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ContentSource for CmsSource {
    async fn list_images(&self) -> Result<Vec<ImageDescriptor>> {
        let response = self.network.fetch_json(self.endpoint.as_str()).await?;
        let body = String::from_utf8_lossy(response.body());
        // The server already filtered on the gallery flag
        parse_listing(&body, &self.media_base, false)
    }

    fn describe(&self) -> String {
        self.endpoint.to_string()
    }
}

/// JSON export on disk; relative media resolve next to the file
pub struct FileSource {
    path: PathBuf,
    media_base: Url,
    gallery_only: bool,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, media_base: Option<&str>, gallery_only: bool) -> Result<Self> {
        let path = path.into();
        let media_base = match media_base {
            Some(base) => directory_url(Url::parse(base)?),
            None => file_dir_url(&path)?,
        };
        Ok(Self {
            path,
            media_base,
            gallery_only,
        })
    }
}

#[async_trait]
impl ContentSource for FileSource {
    async fn list_images(&self) -> Result<Vec<ImageDescriptor>> {
        let body = tokio::fs::read_to_string(&self.path).await?;
        parse_listing(&body, &self.media_base, self.gallery_only)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Ensure a trailing slash so `join` appends instead of replacing
fn directory_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn file_dir_url(path: &Path) -> Result<Url> {
    let absolute = std::path::absolute(path)?;
    let dir = absolute.parent().unwrap_or(&absolute);
    Url::from_directory_path(dir)
        .map_err(|_| NetworkError::InvalidUrl(dir.display().to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn network() -> NetworkStack {
        NetworkStack::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_cms_endpoint_query() {
        let source = CmsSource::new(network(), "https://site.example", "gallery", None, true).unwrap();
        let endpoint = source.endpoint().as_str();
        assert!(endpoint.starts_with("https://site.example/api/gallery?limit=0&depth=1"));
        assert!(endpoint.contains("showInGallery"));
        assert_eq!(source.media_base.as_str(), "https://site.example/media/");
    }

    #[test]
    fn test_cms_without_gallery_filter() {
        let source =
            CmsSource::new(network(), "https://site.example/cms", "photos", Some("https://cdn.example/m"), false)
                .unwrap();
        assert_eq!(
            source.endpoint().as_str(),
            "https://site.example/cms/api/photos?limit=0&depth=1"
        );
        assert_eq!(source.media_base.as_str(), "https://cdn.example/m/");
    }

    #[test]
    fn test_cms_rejects_bad_site() {
        assert!(CmsSource::new(network(), "::nope::", "gallery", None, true).is_err());
    }

    #[tokio::test]
    async fn test_file_source_resolves_next_to_listing() {
        let dir = std::env::temp_dir().join(format!("vista-content-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let listing = dir.join("gallery.json");
        std::fs::write(
            &listing,
            r#"[{"id": "a", "url": "photos/a.jpg", "alt": "Seedlings"}, {"id": "b", "url": "https://cdn.example/b.jpg"}]"#,
        )
        .unwrap();

        let source = FileSource::new(&listing, None, true).unwrap();
        let images = source.list_images().await.unwrap();
        assert_eq!(images.len(), 2);
        assert!(images[0].url.starts_with("file://"));
        assert!(images[0].url.ends_with("/photos/a.jpg"));
        assert_eq!(images[0].alt.as_deref(), Some("Seedlings"));
        assert_eq!(images[1].url, "https://cdn.example/b.jpg");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_source_missing_file() {
        let source = FileSource::new("/definitely/not/here.json", None, true).unwrap();
        let err = tokio_test::block_on(source.list_images()).unwrap_err();
        assert!(matches!(err, crate::utils::VistaError::Io(_)));
    }
}
