//! Éclat Core
//!
//! Foundational primitives shared by the Éclat motion engine:
//!
//! - **Geometry**: document-space points, sizes and rects with visibility math
//! - **Elements**: opaque element handles and the [`GeometrySource`] seam
//! - **Scroll**: [`ScrollMetrics`] snapshots and normalized progress
//! - **Frames**: the [`FrameRequester`] seam for one-evaluation-per-frame work
//!
//! # Example
//!
//! ```rust
//! use eclat_core::{Rect, ScrollMetrics};
//!
//! let metrics = ScrollMetrics::new(300.0, 1600.0, 1000.0);
//! assert_eq!(metrics.progress(), 0.5);
//!
//! let viewport = Rect::new(0.0, 0.0, 1280.0, 800.0);
//! let card = Rect::new(0.0, 740.0, 300.0, 200.0);
//! assert!((card.visible_fraction(&viewport) - 0.3).abs() < 1e-5);
//! ```

pub mod element;
pub mod frame;
pub mod geometry;
pub mod scroll;

pub use element::{ElementId, ElementIdGenerator, GeometrySource};
pub use frame::{FrameFlag, FrameRequester, NoopFrames};
pub use geometry::{Point, Rect, Size};
pub use scroll::ScrollMetrics;
