//! Viewport proximity detection
//!
//! Mirrors the intersection observer pattern: a target is "about to be
//! visible" once enough of it falls inside the viewport grown by a margin.

use super::VisibilityOptions;
use super::geometry::Rect;
use std::collections::HashMap;

/// Tracks one target
#[derive(Debug, Clone)]
pub struct VisibilityDetector {
    options: VisibilityOptions,
    should_load: bool,
}

impl VisibilityDetector {
    pub fn new(options: VisibilityOptions) -> Self {
        Self {
            options,
            should_load: false,
        }
    }

    /// Feed the latest layout. `viewport == None` means the viewport cannot
    /// be observed, in which case the target counts as visible.
    pub fn update(&mut self, target: Rect, viewport: Option<Rect>) -> bool {
        let visible = match viewport {
            Some(viewport) if !viewport.is_degenerate() => self.intersects(target, viewport),
            _ => true,
        };

        if self.options.trigger_once {
            self.should_load |= visible;
        } else {
            self.should_load = visible;
        }
        self.should_load
    }

    fn intersects(&self, target: Rect, viewport: Rect) -> bool {
        let root = viewport.expand(self.options.root_margin);
        match target.intersection_ratio(&root) {
            Some(ratio) => ratio >= self.options.threshold,
            None => false,
        }
    }

    pub fn should_load(&self) -> bool {
        self.should_load
    }
}

/// One detector per mounted target, keyed by id
#[derive(Debug, Default)]
pub struct VisibilityTracker {
    options: VisibilityOptions,
    targets: HashMap<String, VisibilityDetector>,
}

impl VisibilityTracker {
    pub fn new(options: VisibilityOptions) -> Self {
        Self {
            options,
            targets: HashMap::new(),
        }
    }

    /// Register a target. Returns `false` if it was already observed.
    pub fn observe(&mut self, id: &str) -> bool {
        if self.targets.contains_key(id) {
            return false;
        }
        self.targets
            .insert(id.to_string(), VisibilityDetector::new(self.options));
        true
    }

    /// Drop a target
    pub fn unobserve(&mut self, id: &str) -> bool {
        self.targets.remove(id).is_some()
    }

    /// Drop every target
    pub fn disconnect(&mut self) {
        self.targets.clear();
    }

    /// Update one target's layout.
    ///
    /// Returns `true` exactly when the target's `should_load` flips on in
    /// this call. Unobserved ids are ignored.
    pub fn update(&mut self, id: &str, target: Rect, viewport: Option<Rect>) -> bool {
        let Some(detector) = self.targets.get_mut(id) else {
            return false;
        };
        let before = detector.should_load();
        detector.update(target, viewport) && !before
    }

    pub fn should_load(&self, id: &str) -> bool {
        self.targets.get(id).is_some_and(VisibilityDetector::should_load)
    }

    pub fn is_observed(&self, id: &str) -> bool {
        self.targets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
