//! Position-derived load priorities
//!
//! Gallery order is the ranking signal: the first few images form an eager
//! band with strictly increasing priorities, the long tail grows slowly and
//! is clamped so late images all share the lowest rank.

use std::fmt;

/// Number of leading images in the eager band
pub const EAGER_BAND: usize = 6;

/// Offset applied to tail indices
const TAIL_OFFSET: usize = 3;

/// Largest (least urgent) priority value handed out
pub const LOWEST_PRIORITY: u32 = 20;

/// Load priority, lower values are serviced first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u32);

impl Priority {
    /// Most urgent priority
    pub const HIGHEST: Self = Self(1);
    /// Least urgent priority
    pub const LOWEST: Self = Self(LOWEST_PRIORITY);

    /// Wrap a raw value
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Priority for the image at zero-based `index` in gallery order
    pub fn for_index(index: usize) -> Self {
        if index < EAGER_BAND {
            return Self(index as u32 + 1);
        }
        let tail = index.saturating_add(TAIL_OFFSET).min(LOWEST_PRIORITY as usize);
        Self(tail as u32)
    }

    /// Raw value
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}
