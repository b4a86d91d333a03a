//! # Vista - Progressive Image Gallery
//!
//! A photo gallery that only fetches what is about to be seen, in the order
//! it will be seen, without saturating the network.
//!
//! ## Architecture
//!
//! - **loader**: priority queue, bounded-concurrency scheduler and fetch workers
//! - **visibility**: viewport intersection detection with a pre-load margin
//! - **content**: gallery listing from a CMS or a local JSON export
//! - **gallery**: grid and lightbox composition, egui window and headless runner
//! - **network**: async HTTP layer
//! - **config**: JSON configuration
//! - **utils**: shared error types

pub mod config;
pub mod content;
pub mod gallery;
pub mod loader;
pub mod network;
pub mod utils;
pub mod visibility;

// Re-export main types for convenience
pub use config::VistaConfig;
pub use gallery::Gallery;
pub use loader::LoadScheduler;
pub use utils::{Result, VistaError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "Vista";

/// Loading defaults
pub mod defaults {
    pub use crate::loader::{
        DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENT, DEFAULT_TICK_MS, EAGER_BAND, LOWEST_PRIORITY,
    };
    pub use crate::visibility::{DEFAULT_ROOT_MARGIN, DEFAULT_THRESHOLD};
}
