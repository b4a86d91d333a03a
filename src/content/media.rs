//! CMS listing wire shapes
//!
//! The content layer hands media out in several shapes. They are resolved
//! here, once, into canonical [`ImageDescriptor`]s so nothing downstream has
//! to care.

use super::ImageDescriptor;
use crate::utils::{ContentError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use url::Url;

/// A media field as it appears in a listing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MediaRef {
    /// Bare URL, absolute or site-relative
    Url(String),
    /// Populated media document with a public URL
    Hosted {
        url: String,
        #[serde(default)]
        alt: Option<String>,
    },
    /// Media document that only carries its stored filename
    Stored {
        filename: String,
        #[serde(default)]
        alt: Option<String>,
    },
    /// Anything else: an unpopulated relation id, a document without a
    /// location. Never resolves, so only its own record is skipped.
    Unresolved(serde_json::Value),
}

impl MediaRef {
    /// Absolute URL for this media, relative forms joined onto `media_base`
    pub fn resolve(&self, media_base: &Url) -> std::result::Result<String, String> {
        match self {
            Self::Url(raw) | Self::Hosted { url: raw, .. } => join(media_base, raw),
            Self::Stored { filename, .. } => {
                if filename.trim().is_empty() {
                    return Err("empty filename".to_string());
                }
                media_base
                    .join(filename)
                    .map(String::from)
                    .map_err(|e| e.to_string())
            }
            Self::Unresolved(value) => Err(format!("unsupported media field {value}")),
        }
    }

    pub fn alt(&self) -> Option<&str> {
        match self {
            Self::Url(_) | Self::Unresolved(_) => None,
            Self::Hosted { alt, .. } | Self::Stored { alt, .. } => alt.as_deref(),
        }
    }
}

fn join(base: &Url, raw: &str) -> std::result::Result<String, String> {
    if raw.trim().is_empty() {
        return Err("empty url".to_string());
    }
    match Url::parse(raw) {
        Ok(absolute) => Ok(absolute.into()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            base.join(raw).map(String::from).map_err(|e| e.to_string())
        }
        Err(e) => Err(e.to_string()),
    }
}

/// Record ids come back as strings or numbers depending on the database
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RecordId {
    Text(String),
    Number(i64),
}

impl RecordId {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// One gallery document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GalleryRecord {
    id: RecordId,
    #[serde(default)]
    alt: Option<String>,
    #[serde(default)]
    image: Option<MediaRef>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    show_in_gallery: Option<bool>,
}

impl GalleryRecord {
    /// The record's media, preferring the `image` relation over inline fields
    fn media(&self) -> Option<MediaRef> {
        if let Some(image) = &self.image {
            return Some(image.clone());
        }
        if let Some(url) = &self.url {
            return Some(MediaRef::Url(url.clone()));
        }
        self.filename.as_ref().map(|filename| MediaRef::Stored {
            filename: filename.clone(),
            alt: None,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing {
    Paged { docs: Vec<GalleryRecord> },
    Bare(Vec<GalleryRecord>),
}

/// Parse a listing body into descriptors, in listing order.
///
/// With `gallery_only`, records explicitly flagged off are dropped. Records
/// whose media cannot be resolved and repeated ids are skipped with a
/// warning.
pub fn parse_listing(body: &str, media_base: &Url, gallery_only: bool) -> Result<Vec<ImageDescriptor>> {
    let records = match serde_json::from_str::<Listing>(body)? {
        Listing::Paged { docs } => docs,
        Listing::Bare(records) => records,
    };

    let mut seen = HashSet::new();
    let mut images = Vec::with_capacity(records.len());
    for record in records {
        if gallery_only && record.show_in_gallery == Some(false) {
            continue;
        }
        let media = record.media();
        let alt = record
            .alt
            .clone()
            .or_else(|| media.as_ref().and_then(|m| m.alt().map(str::to_string)))
            .filter(|alt| !alt.trim().is_empty());
        let id = record.id.into_string();

        let url = match media.as_ref().map(|m| m.resolve(media_base)) {
            Some(Ok(url)) => url,
            Some(Err(reason)) => {
                log::warn!("{}", ContentError::UnresolvableMedia { id, reason });
                continue;
            }
            None => {
                log::warn!(
                    "{}",
                    ContentError::UnresolvableMedia {
                        id,
                        reason: "no media field".to_string()
                    }
                );
                continue;
            }
        };

        if !seen.insert(id.clone()) {
            log::warn!("duplicate gallery id {}, keeping the first", id);
            continue;
        }
        images.push(ImageDescriptor { id, url, alt });
    }
    Ok(images)
}
