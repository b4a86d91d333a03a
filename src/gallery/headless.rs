//! Windowless gallery run
//!
//! Lists the gallery, treats every cell as visible and waits for the
//! scheduler to settle. Used by `--headless` and for smoke-testing a source.

use super::{Gallery, ScrollLock};
use crate::config::VistaConfig;
use crate::loader::{DefaultFetcher, LoadScheduler, LoadStatus, QueueStats};
use crate::network::NetworkStack;
use crate::utils::Result;
use crate::visibility::Rect;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;

/// Outcome of a headless run
#[derive(Debug, Clone)]
pub struct HeadlessReport {
    /// Images in the listing
    pub images: usize,
    pub stats: QueueStats,
    /// `(id, reason)` for every image that ended in error
    pub failures: Vec<(String, String)>,
    pub elapsed: Duration,
}

impl HeadlessReport {
    pub fn all_loaded(&self) -> bool {
        self.failures.is_empty() && self.stats.loaded == self.images
    }
}

/// Request every cell and wait until nothing is pending or in flight.
///
/// Returns early, leaving work unfinished, when the scheduler is not running:
/// never started, or already shut down.
pub async fn load_all(gallery: &mut Gallery, poll: Duration) {
    for index in 0..gallery.len() {
        // No viewport: every cell counts as visible
        gallery.layout(index, Rect::default(), None);
    }
    loop {
        let scheduler = gallery.scheduler();
        if scheduler.is_settled() {
            return;
        }
        if !scheduler.is_running() {
            let stats = scheduler.stats();
            log::warn!(
                "scheduler not running, giving up with {} pending and {} in flight",
                stats.pending,
                stats.in_flight
            );
            return;
        }
        tokio::time::sleep(poll).await;
    }
}

/// List, load and report without opening a window
pub async fn run_headless(config: &VistaConfig) -> Result<HeadlessReport> {
    let started = Instant::now();
    let network = NetworkStack::new(config.loader.fetch_timeout())?;
    let source = config.content_source(network.clone())?;
    log::info!("listing gallery from {}", source.describe());
    let images = source.list_images().await?;
    log::info!("{} image(s) listed", images.len());

    let mut scheduler = LoadScheduler::new(&config.loader, Arc::new(DefaultFetcher::new(network)));
    scheduler.start(&Handle::current());
    let mut gallery = Gallery::new(images, scheduler, config.visibility, ScrollLock::new());

    load_all(&mut gallery, config.loader.tick_interval()).await;

    let failures = gallery
        .images()
        .iter()
        .filter(|image| gallery.scheduler().status(&image.id) == LoadStatus::Error)
        .map(|image| {
            let reason = gallery.scheduler().failure(&image.id).unwrap_or_default();
            (image.id.clone(), reason)
        })
        .collect();

    Ok(HeadlessReport {
        images: gallery.len(),
        stats: gallery.scheduler().stats(),
        failures,
        elapsed: started.elapsed(),
    })
}
