//! Full-screen viewer state
//!
//! `Closed` / `Open(index)` with wrap-around navigation. While open the page
//! scroll lock is held; the lock's previous value comes back when the viewer
//! closes, however that happens.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Page-level scroll suppression flag
#[derive(Debug, Clone, Default)]
pub struct ScrollLock(Arc<AtomicBool>);

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Lock scrolling until the returned guard drops
    pub fn hold(&self) -> ScrollGuard {
        let previous = self.0.swap(true, Ordering::SeqCst);
        ScrollGuard {
            lock: self.clone(),
            previous,
        }
    }
}

/// Restores the prior scroll-lock state on drop
#[derive(Debug)]
pub struct ScrollGuard {
    lock: ScrollLock,
    previous: bool,
}

impl Drop for ScrollGuard {
    fn drop(&mut self) {
        self.lock.0.store(self.previous, Ordering::SeqCst);
    }
}

/// Lightbox state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightboxState {
    #[default]
    Closed,
    Open(usize),
}

/// Keyboard input the lightbox reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryKey {
    Escape,
    Previous,
    Next,
}

/// Lightbox over a fixed-length image list
#[derive(Debug)]
pub struct Lightbox {
    state: LightboxState,
    len: usize,
    scroll: ScrollLock,
    guard: Option<ScrollGuard>,
}

impl Lightbox {
    pub fn new(len: usize, scroll: ScrollLock) -> Self {
        Self {
            state: LightboxState::Closed,
            len,
            scroll,
            guard: None,
        }
    }

    pub fn state(&self) -> LightboxState {
        self.state
    }

    pub fn current(&self) -> Option<usize> {
        match self.state {
            LightboxState::Open(index) => Some(index),
            LightboxState::Closed => None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.current().is_some()
    }

    /// Open on `index`. Out-of-range indices are ignored.
    pub fn open(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.state = LightboxState::Open(index);
        if self.guard.is_none() {
            self.guard = Some(self.scroll.hold());
        }
        true
    }

    pub fn close(&mut self) {
        self.state = LightboxState::Closed;
        self.guard = None;
    }

    pub fn next(&mut self) {
        if let Some(index) = self.current() {
            self.state = LightboxState::Open((index + 1) % self.len);
        }
    }

    pub fn previous(&mut self) {
        if let Some(index) = self.current() {
            self.state = LightboxState::Open((index + self.len - 1) % self.len);
        }
    }

    /// Click on the backdrop around the image
    pub fn click_outside(&mut self) {
        self.close();
    }

    /// Returns `true` if the key was consumed
    pub fn handle_key(&mut self, key: GalleryKey) -> bool {
        if !self.is_open() {
            return false;
        }
        match key {
            GalleryKey::Escape => self.close(),
            GalleryKey::Previous => self.previous(),
            GalleryKey::Next => self.next(),
        }
        true
    }
}

impl Drop for Lightbox {
    fn drop(&mut self) {
        self.close();
    }
}
