//! Viewport visibility detection for lazy loading

mod detector;
mod geometry;

pub use detector::{VisibilityDetector, VisibilityTracker};
pub use geometry::Rect;

use crate::utils::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Pre-load margin around the viewport, in logical pixels
pub const DEFAULT_ROOT_MARGIN: f32 = 100.0;
/// Fraction of a target that must be inside the expanded viewport
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// Detection tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityOptions {
    /// Distance outside the viewport that still counts as visible
    pub root_margin: f32,
    /// Fraction of the target that must fall in the expanded viewport
    pub threshold: f32,
    /// Keep reporting visible after the first hit
    pub trigger_once: bool,
}

impl VisibilityOptions {
    pub fn validate(&self) -> Result<()> {
        if self.root_margin.is_nan() || self.root_margin < 0.0 {
            return Err(ConfigError::Invalid {
                field: "root_margin",
                reason: format!("{} is negative", self.root_margin),
            }
            .into());
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::Invalid {
                field: "threshold",
                reason: format!("{} is outside [0, 1]", self.threshold),
            }
            .into());
        }
        Ok(())
    }
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            root_margin: DEFAULT_ROOT_MARGIN,
            threshold: DEFAULT_THRESHOLD,
            trigger_once: true,
        }
    }
}
