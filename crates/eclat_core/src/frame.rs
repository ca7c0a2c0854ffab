//! Per-frame scheduling seam
//!
//! Work that reacts to high-frequency input (scroll events) is deferred to
//! the next rendered frame. Components ask for a frame through a
//! [`FrameRequester`]; the host event loop checks for outstanding requests
//! and runs one evaluation per display refresh.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Something that can schedule a callback on the next rendered frame
pub trait FrameRequester {
    /// Ask the host to run one more frame
    ///
    /// Multiple requests before the frame runs collapse into one.
    fn request_frame(&self);
}

impl<F: Fn()> FrameRequester for F {
    fn request_frame(&self) {
        self()
    }
}

/// Atomic "needs frame" flag shared between components and the event loop
///
/// Cloning yields another handle to the same flag. The host polls
/// [`FrameFlag::take`] once per display refresh.
#[derive(Clone, Debug, Default)]
pub struct FrameFlag {
    needs_frame: Arc<AtomicBool>,
    requests: Arc<AtomicU64>,
}

impl FrameFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and clear the flag
    pub fn take(&self) -> bool {
        self.needs_frame.swap(false, Ordering::Acquire)
    }

    /// Check the flag without clearing it
    pub fn is_set(&self) -> bool {
        self.needs_frame.load(Ordering::Acquire)
    }

    /// Total number of frame requests observed (including collapsed ones)
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}

impl FrameRequester for FrameFlag {
    fn request_frame(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.needs_frame.store(true, Ordering::Release);
    }
}

/// A requester that drops every request, for hosts that render continuously
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopFrames;

impl FrameRequester for NoopFrames {
    fn request_frame(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_flag_take_clears() {
        let flag = FrameFlag::new();
        assert!(!flag.take());

        flag.request_frame();
        flag.request_frame();
        assert!(flag.is_set());
        assert!(flag.take());
        assert!(!flag.take());
        assert_eq!(flag.request_count(), 2);
    }

    #[test]
    fn test_flag_clones_share_state() {
        let flag = FrameFlag::new();
        let other = flag.clone();
        other.request_frame();
        assert!(flag.take());
    }

    #[test]
    fn test_closure_requester() {
        let hits = Cell::new(0);
        let requester = || hits.set(hits.get() + 1);
        requester.request_frame();
        assert_eq!(hits.get(), 1);
    }
}
