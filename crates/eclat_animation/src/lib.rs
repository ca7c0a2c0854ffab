//! Éclat Animation Engine
//!
//! Scroll-synchronized motion for the storefront page.
//!
//! # Features
//!
//! - **Scroll Progress**: normalized `[0, 1]` document progress, coalesced to
//!   one evaluation per rendered frame
//! - **Scroll Mappings**: piecewise-linear progress → value functions for
//!   parallax offsets and fades, published to subscribers
//! - **Viewport Reveals**: fire-once reveal animations triggered by the first
//!   qualifying viewport intersection
//! - **Stagger**: caller-side delay cascades for sibling reveals
//! - **Easing**: CSS-compatible curves, ease-out by default
//!
//! The two engines are independent: the tracker listens to scroll offsets,
//! the reveal controller to element visibility. A page runtime composes them.

pub mod easing;
pub mod error;
pub mod mapping;
pub mod reveal;
pub mod scroll;
pub mod stagger;
pub mod values;

pub use easing::Easing;
pub use error::{AnimationError, Result};
pub use mapping::ScrollMapping;
pub use reveal::{
    RevealConfig, RevealEvent, RevealId, RevealListener, RevealPhase, RevealState, RevealStats,
    ViewportRevealController,
};
pub use scroll::{
    MappingCallback, MappingId, ScrollProgressTracker, SubscriptionId, TrackerState, TrackerStats,
};
pub use stagger::{stagger_delay, Stagger, StaggerDirection};
pub use values::{Interpolate, VisualStyle};
