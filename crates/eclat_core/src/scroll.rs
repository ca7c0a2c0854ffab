//! Scroll source metrics
//!
//! A snapshot of the document's vertical scroll state as reported by the host.

use serde::{Deserialize, Serialize};

/// Vertical scroll metrics of a document
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top of the document (px)
    pub offset: f32,
    /// Total document height (px)
    pub document_height: f32,
    /// Visible viewport height (px)
    pub viewport_height: f32,
}

impl ScrollMetrics {
    pub const fn new(offset: f32, document_height: f32, viewport_height: f32) -> Self {
        Self {
            offset,
            document_height,
            viewport_height,
        }
    }

    /// Scrollable distance, 0 when the document fits in the viewport
    pub fn scroll_range(&self) -> f32 {
        let range = self.document_height - self.viewport_height;
        if range.is_finite() && range > 0.0 {
            range
        } else {
            0.0
        }
    }

    /// Normalized scroll progress in `[0, 1]`
    ///
    /// A document without a scrollable range, or non-finite metrics, reports 0.
    pub fn progress(&self) -> f32 {
        let range = self.scroll_range();
        if range <= 0.0 || !self.offset.is_finite() {
            return 0.0;
        }
        (self.offset / range).clamp(0.0, 1.0)
    }

    /// Copy with a new offset, clamped to the scrollable range
    pub fn with_offset(self, offset: f32) -> Self {
        Self {
            offset: offset.clamp(0.0, self.scroll_range()),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_basic() {
        let metrics = ScrollMetrics::new(300.0, 1600.0, 1000.0);
        assert!((metrics.progress() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_progress_clamped() {
        assert_eq!(ScrollMetrics::new(-50.0, 1600.0, 1000.0).progress(), 0.0);
        assert_eq!(ScrollMetrics::new(900.0, 1600.0, 1000.0).progress(), 1.0);
    }

    #[test]
    fn test_progress_without_scroll_range() {
        let metrics = ScrollMetrics::new(120.0, 800.0, 800.0);
        assert_eq!(metrics.progress(), 0.0);

        let shorter = ScrollMetrics::new(120.0, 600.0, 800.0);
        assert_eq!(shorter.progress(), 0.0);
    }

    #[test]
    fn test_progress_non_finite() {
        assert_eq!(ScrollMetrics::new(f32::NAN, 1600.0, 1000.0).progress(), 0.0);
        assert_eq!(ScrollMetrics::new(10.0, f32::INFINITY, 1000.0).progress(), 0.0);
    }

    #[test]
    fn test_with_offset_clamps() {
        let metrics = ScrollMetrics::new(0.0, 1600.0, 1000.0).with_offset(5000.0);
        assert_eq!(metrics.offset, 600.0);
    }
}
