//! Photo gallery view
//!
//! Composes one visibility detector per image with a single
//! [`LoadScheduler`], decides what each grid cell shows, and drives the
//! lightbox.

mod app;
mod headless;
mod lightbox;

pub use app::{GalleryApp, run};
pub use headless::{HeadlessReport, load_all, run_headless};
pub use lightbox::{GalleryKey, Lightbox, LightboxState, ScrollGuard, ScrollLock};

use crate::content::ImageDescriptor;
use crate::loader::{DecodedImage, LoadScheduler, LoadStatus, Priority};
use crate::visibility::{Rect, VisibilityOptions, VisibilityTracker};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub window_width: u32,
    pub window_height: u32,
    /// Edge length of a grid cell
    pub thumbnail_size: f32,
    /// Gap between grid cells
    pub spacing: f32,
    pub theme: Theme,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            thumbnail_size: 240.0,
            spacing: 8.0,
            theme: Theme::System,
        }
    }
}

/// UI theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
}

/// What a grid cell renders
#[derive(Debug, Clone)]
pub enum ItemView {
    /// Not near the viewport yet, nothing requested
    Placeholder,
    /// Requested or in flight
    Loading,
    /// The attempt failed
    Failed { reason: Option<String> },
    /// Ready to draw
    Loaded {
        image: Arc<DecodedImage>,
        alt: Option<String>,
    },
}

/// Gallery grid plus lightbox
pub struct Gallery {
    images: Vec<ImageDescriptor>,
    scheduler: LoadScheduler,
    visibility: VisibilityTracker,
    lightbox: Lightbox,
}

impl Gallery {
    /// Mount a gallery: one observed target per image
    pub fn new(
        images: Vec<ImageDescriptor>,
        scheduler: LoadScheduler,
        options: VisibilityOptions,
        scroll: ScrollLock,
    ) -> Self {
        let mut visibility = VisibilityTracker::new(options);
        for image in &images {
            visibility.observe(&image.id);
        }
        let lightbox = Lightbox::new(images.len(), scroll);
        log::info!("gallery mounted with {} image(s)", images.len());

        Self {
            images,
            scheduler,
            visibility,
            lightbox,
        }
    }

    pub fn images(&self) -> &[ImageDescriptor] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn scheduler(&self) -> &LoadScheduler {
        &self.scheduler
    }

    /// Report where cell `index` sits relative to the viewport.
    ///
    /// The first time the cell comes near the viewport it is enqueued at its
    /// position-derived priority. Returns `true` when that happened.
    pub fn layout(&mut self, index: usize, cell: Rect, viewport: Option<Rect>) -> bool {
        let Some(image) = self.images.get(index) else {
            return false;
        };
        if !self.visibility.update(&image.id, cell, viewport) {
            return false;
        }

        let priority = Priority::for_index(index);
        log::debug!("{} near viewport, requesting at {}", image.id, priority);
        self.scheduler.enqueue(&image.id, &image.url, priority)
    }

    /// Cell content for `index`, `None` when out of range
    pub fn item_view(&self, index: usize) -> Option<ItemView> {
        let image = self.images.get(index)?;
        let view = match self.scheduler.status(&image.id) {
            LoadStatus::Idle
                if !self.visibility.should_load(&image.id) && !self.scheduler.is_pending(&image.id) =>
            {
                ItemView::Placeholder
            }
            LoadStatus::Idle | LoadStatus::Loading => ItemView::Loading,
            LoadStatus::Error => ItemView::Failed {
                reason: self.scheduler.failure(&image.id),
            },
            LoadStatus::Loaded => match self.scheduler.image(&image.id) {
                Some(decoded) => ItemView::Loaded {
                    image: decoded,
                    alt: image.alt.clone(),
                },
                None => ItemView::Loading,
            },
        };
        Some(view)
    }

    /// Manually retry a failed cell
    pub fn retry(&self, index: usize) -> bool {
        self.images
            .get(index)
            .is_some_and(|image| self.scheduler.retry(&image.id))
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    /// Open the lightbox on `index`
    pub fn open(&mut self, index: usize) -> bool {
        self.lightbox.open(index)
    }

    pub fn close(&mut self) {
        self.lightbox.close();
    }

    pub fn show_next(&mut self) {
        self.lightbox.next();
    }

    pub fn show_previous(&mut self) {
        self.lightbox.previous();
    }

    pub fn click_outside(&mut self) {
        self.lightbox.click_outside();
    }

    pub fn handle_key(&mut self, key: GalleryKey) -> bool {
        self.lightbox.handle_key(key)
    }

    /// Image shown in the lightbox, with its index
    pub fn current(&self) -> Option<(usize, &ImageDescriptor)> {
        let index = self.lightbox.current()?;
        self.images.get(index).map(|image| (index, image))
    }
}

impl Drop for Gallery {
    fn drop(&mut self) {
        self.lightbox.close();
        self.visibility.disconnect();
        self.scheduler.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{LoaderConfig, MockImageFetcher};
    use crate::utils::NetworkError;
    use tokio::runtime::Handle;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);
    const OFFSCREEN: Rect = Rect::new(0.0, 5000.0, 200.0, 200.0);
    const ONSCREEN: Rect = Rect::new(0.0, 0.0, 200.0, 200.0);

    fn images(n: usize) -> Vec<ImageDescriptor> {
        (0..n)
            .map(|i| ImageDescriptor {
                id: format!("img{i}"),
                url: format!("https://site.example/media/{i}.jpg"),
                alt: (i % 2 == 0).then(|| format!("Photo {i}")),
            })
            .collect()
    }

    fn fetcher() -> MockImageFetcher {
        let mut fetcher = MockImageFetcher::new();
        fetcher.expect_fetch().returning(|url| {
            if url.ends_with("1.jpg") {
                Err(NetworkError::Http(404, url.to_string()).into())
            } else {
                Ok(DecodedImage::solid(4, 4, [0, 128, 0, 255]))
            }
        });
        fetcher
    }

    fn gallery(n: usize) -> (Gallery, ScrollLock) {
        let scroll = ScrollLock::new();
        let scheduler = LoadScheduler::new(&LoaderConfig::default(), Arc::new(fetcher()));
        let gallery = Gallery::new(images(n), scheduler, VisibilityOptions::default(), scroll.clone());
        (gallery, scroll)
    }

    #[test]
    fn test_offscreen_is_placeholder() {
        let (mut gallery, _) = gallery(3);
        assert!(!gallery.layout(0, OFFSCREEN, Some(VIEWPORT)));
        assert!(matches!(gallery.item_view(0), Some(ItemView::Placeholder)));
        assert_eq!(gallery.scheduler().stats().pending, 0);
    }

    #[test]
    fn test_visible_enqueues_once_with_position_priority() {
        let (mut gallery, _) = gallery(10);
        assert!(gallery.layout(7, ONSCREEN, Some(VIEWPORT)));
        assert!(!gallery.layout(7, ONSCREEN, Some(VIEWPORT)));

        let state = gallery.scheduler().load_state("img7").unwrap();
        assert_eq!(state.priority, Priority::new(10));
        assert_eq!(gallery.scheduler().stats().pending, 1);
        assert!(matches!(gallery.item_view(7), Some(ItemView::Loading)));
    }

    #[test]
    fn test_queued_cell_scrolled_away_stays_loading() {
        let options = VisibilityOptions {
            trigger_once: false,
            ..VisibilityOptions::default()
        };
        let scheduler = LoadScheduler::new(&LoaderConfig::default(), Arc::new(fetcher()));
        let mut gallery = Gallery::new(images(2), scheduler, options, ScrollLock::new());

        assert!(gallery.layout(0, ONSCREEN, Some(VIEWPORT)));
        assert!(!gallery.layout(0, OFFSCREEN, Some(VIEWPORT)));

        assert!(gallery.scheduler().is_pending("img0"));
        assert!(matches!(gallery.item_view(0), Some(ItemView::Loading)));
        assert!(matches!(gallery.item_view(1), Some(ItemView::Placeholder)));
    }

    #[test]
    fn test_no_viewport_fails_open() {
        let (mut gallery, _) = gallery(2);
        assert!(gallery.layout(1, OFFSCREEN, None));
    }

    #[test]
    fn test_out_of_range_index() {
        let (mut gallery, _) = gallery(2);
        assert!(!gallery.layout(5, ONSCREEN, Some(VIEWPORT)));
        assert!(gallery.item_view(5).is_none());
        assert!(!gallery.retry(5));
        assert!(!gallery.open(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cells_follow_load_outcome() {
        let (mut gallery, _) = gallery(3);
        gallery.scheduler.start(&Handle::current());
        for i in 0..3 {
            gallery.layout(i, ONSCREEN, Some(VIEWPORT));
        }
        tokio::time::sleep(std::time::Duration::from_millis(250)).await;

        match gallery.item_view(0) {
            Some(ItemView::Loaded { image, alt }) => {
                assert_eq!(image.width, 4);
                assert_eq!(alt.as_deref(), Some("Photo 0"));
            }
            other => panic!("unexpected {other:?}"),
        }
        match gallery.item_view(1) {
            Some(ItemView::Failed { reason }) => assert!(reason.unwrap().contains("404")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(gallery.item_view(2), Some(ItemView::Loaded { alt: Some(_), .. })));

        assert!(gallery.retry(1));
        assert!(matches!(gallery.item_view(1), Some(ItemView::Loading)));
    }

    #[test]
    fn test_lightbox_navigation_through_gallery() {
        let (mut gallery, scroll) = gallery(3);
        assert!(gallery.open(0));
        gallery.show_previous();
        assert_eq!(gallery.current().map(|(i, img)| (i, img.id.as_str())), Some((2, "img2")));
        gallery.show_next();
        assert_eq!(gallery.current().unwrap().0, 0);
        assert!(scroll.is_locked());

        assert!(gallery.handle_key(GalleryKey::Escape));
        assert!(!scroll.is_locked());
        assert!(gallery.current().is_none());
    }

    #[test]
    fn test_unmount_with_open_lightbox_restores_scroll() {
        let (mut gallery, scroll) = gallery(3);
        gallery.open(1);
        assert!(scroll.is_locked());
        drop(gallery);
        assert!(!scroll.is_locked());
    }
}
