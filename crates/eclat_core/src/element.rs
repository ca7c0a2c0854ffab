//! Element handles and the geometry seam
//!
//! The engine never owns page elements. Hosts hand out opaque [`ElementId`]s
//! and answer geometry queries through [`GeometrySource`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Opaque handle identifying a host element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(u64);

impl ElementId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Hands out unique element ids
#[derive(Debug)]
pub struct ElementIdGenerator {
    next: AtomicU64,
}

impl ElementIdGenerator {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next(&self) -> ElementId {
        ElementId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ElementIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Element geometry as seen by the host's layout
///
/// Both the viewport and element bounds are expressed in the same
/// (document) coordinate space.
pub trait GeometrySource {
    /// Current visible viewport rect
    fn viewport(&self) -> Rect;

    /// Bounding box of an element, `None` if the host does not know it (yet)
    fn bounds(&self, element: ElementId) -> Option<Rect>;
}

impl<T: GeometrySource + ?Sized> GeometrySource for &T {
    fn viewport(&self) -> Rect {
        (**self).viewport()
    }

    fn bounds(&self, element: ElementId) -> Option<Rect> {
        (**self).bounds(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_is_unique() {
        let ids = ElementIdGenerator::new();
        let a = ids.next();
        let b = ids.next();
        assert_ne!(a, b);
        assert_eq!(a.to_raw() + 1, b.to_raw());
    }

    #[test]
    fn test_display() {
        assert_eq!(ElementId::from_raw(7).to_string(), "element#7");
    }
}
