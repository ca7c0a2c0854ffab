//! Viewport reveal controller
//!
//! One-shot "animate when scrolled into view" transitions. Every registered
//! element starts `Pending`. The first visibility evaluation in which enough
//! of its bounding box lies inside the viewport flips it to `Triggered`;
//! from then on it is never evaluated again, even if it leaves and re-enters
//! the viewport. A triggered reveal waits for its delay, then eases each
//! style property from `from` to `to` over its duration.
//!
//! The controller only keeps an association table from host element ids to
//! its own registration handles. It never owns or outlives host elements:
//! deregistering drops the entry (and its listener) immediately, even in the
//! middle of an animation.
//!
//! # Example
//!
//! ```rust
//! use eclat_animation::{RevealConfig, RevealState, ViewportRevealController, VisualStyle};
//! use eclat_core::{ElementId, GeometrySource, Rect};
//!
//! struct Page;
//!
//! impl GeometrySource for Page {
//!     fn viewport(&self) -> Rect {
//!         Rect::new(0.0, 0.0, 1280.0, 800.0)
//!     }
//!     fn bounds(&self, _element: ElementId) -> Option<Rect> {
//!         Some(Rect::new(0.0, 600.0, 400.0, 400.0))
//!     }
//! }
//!
//! let mut reveals = ViewportRevealController::new();
//! let card = reveals
//!     .register(
//!         ElementId::from_raw(1),
//!         RevealConfig::new(800)
//!             .threshold(0.3)
//!             .delay_ms(100)
//!             .from(VisualStyle::hidden_below(20.0).with_scale(0.98)),
//!     )
//!     .unwrap();
//!
//! // Half of the card is visible
//! reveals.on_visibility_change(&Page);
//! assert_eq!(reveals.state(card), Some(RevealState::Triggered));
//!
//! reveals.advance(900.0);
//! assert_eq!(reveals.style(card), Some(VisualStyle::IDENTITY));
//! ```

use eclat_core::{ElementId, GeometrySource};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::values::{Interpolate, VisualStyle};

new_key_type! {
    /// Handle to a reveal registration
    pub struct RevealId;
}

/// Slack for float error when comparing a visible fraction with its threshold
const THRESHOLD_EPSILON: f32 = 1e-4;

// ============================================================================
// Configuration
// ============================================================================

/// Timing, trigger and style parameters of one reveal
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealConfig {
    /// Minimum visible fraction of the element's bounding box, in `[0, 1]`
    ///
    /// 0 means "any visible pixel".
    pub threshold: f32,
    /// Wait after triggering before the transition starts (ms)
    pub delay_ms: u32,
    /// Length of the transition (ms), must be positive
    pub duration_ms: u32,
    pub from: VisualStyle,
    pub to: VisualStyle,
    pub easing: Easing,
}

impl RevealConfig {
    /// Fade-and-rise reveal with the given duration
    pub fn new(duration_ms: u32) -> Self {
        Self {
            threshold: 0.0,
            delay_ms: 0,
            duration_ms,
            from: VisualStyle::hidden_below(20.0),
            to: VisualStyle::IDENTITY,
            easing: Easing::EaseOut,
        }
    }

    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn delay_ms(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn duration_ms(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn from(mut self, style: VisualStyle) -> Self {
        self.from = style;
        self
    }

    pub fn to(mut self, style: VisualStyle) -> Self {
        self.to = style;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Check ranges; called by [`ViewportRevealController::register`]
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(AnimationError::reveal(format!(
                "threshold {} must lie in [0, 1]",
                self.threshold
            )));
        }
        if self.duration_ms == 0 {
            return Err(AnimationError::reveal("duration must be positive"));
        }
        if !self.from.is_finite() || !self.to.is_finite() {
            return Err(AnimationError::reveal("style values must be finite"));
        }
        Ok(())
    }

    /// Style at `elapsed_ms` since the trigger
    fn style_at(&self, elapsed_ms: f32) -> VisualStyle {
        let active = elapsed_ms - self.delay_ms as f32;
        if active <= 0.0 {
            return self.from;
        }
        let t = active / self.duration_ms as f32;
        if t >= 1.0 {
            return self.to;
        }
        self.from.lerp(&self.to, self.easing.apply(t))
    }

    fn total_ms(&self) -> f32 {
        self.delay_ms as f32 + self.duration_ms as f32
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self::new(300)
    }
}

// ============================================================================
// State
// ============================================================================

/// Trigger state of a reveal; `Triggered` is terminal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealState {
    Pending,
    Triggered,
}

/// Finer-grained progress of a reveal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealPhase {
    /// Waiting for a qualifying intersection
    Pending,
    /// Triggered, inside the start delay
    Delayed,
    /// Transition in progress
    Running,
    /// Transition complete, holding the final style
    Finished,
}

/// Notifications delivered to a reveal's listener
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RevealEvent {
    /// The element qualified and the reveal is scheduled
    Triggered,
    /// A new interpolated style for this frame
    Frame(VisualStyle),
    /// The final style has been reached
    Completed,
}

/// Callback receiving a reveal's events
pub type RevealListener = Box<dyn FnMut(RevealEvent)>;

struct RevealEntry {
    element: ElementId,
    config: RevealConfig,
    state: RevealState,
    /// Time since trigger (ms)
    elapsed_ms: f32,
    completed: bool,
    listener: Option<RevealListener>,
}

impl RevealEntry {
    fn phase(&self) -> RevealPhase {
        match self.state {
            RevealState::Pending => RevealPhase::Pending,
            RevealState::Triggered if self.completed => RevealPhase::Finished,
            RevealState::Triggered if self.elapsed_ms <= self.config.delay_ms as f32 => {
                RevealPhase::Delayed
            }
            RevealState::Triggered => RevealPhase::Running,
        }
    }

    fn style(&self) -> VisualStyle {
        match self.state {
            RevealState::Pending => self.config.from,
            RevealState::Triggered if self.completed => self.config.to,
            RevealState::Triggered => self.config.style_at(self.elapsed_ms),
        }
    }

    fn emit(&mut self, event: RevealEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener(event);
        }
    }

    fn trigger(&mut self) {
        self.state = RevealState::Triggered;
        self.elapsed_ms = 0.0;
        self.emit(RevealEvent::Triggered);
    }
}

/// Counters useful for diagnostics and tests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RevealStats {
    pub registered: u64,
    pub deregistered: u64,
    pub triggered: u64,
    pub completed: u64,
    /// Visibility evaluations performed
    pub evaluations: u64,
}

// ============================================================================
// Controller
// ============================================================================

/// Detects first viewport entry and drives one-shot reveal animations
pub struct ViewportRevealController {
    reveals: SlotMap<RevealId, RevealEntry>,
    by_element: FxHashMap<ElementId, RevealId>,
    stats: RevealStats,
}

impl ViewportRevealController {
    pub fn new() -> Self {
        Self {
            reveals: SlotMap::with_key(),
            by_element: FxHashMap::default(),
            stats: RevealStats::default(),
        }
    }

    /// Start observing `element`
    ///
    /// Fails with [`AnimationError::DuplicateRegistration`] if the element is
    /// still registered, or [`AnimationError::InvalidReveal`] for
    /// out-of-range parameters.
    pub fn register(&mut self, element: ElementId, config: RevealConfig) -> Result<RevealId> {
        config.validate()?;
        if self.by_element.contains_key(&element) {
            return Err(AnimationError::DuplicateRegistration(element));
        }

        let id = self.reveals.insert(RevealEntry {
            element,
            config,
            state: RevealState::Pending,
            elapsed_ms: 0.0,
            completed: false,
            listener: None,
        });
        self.by_element.insert(element, id);
        self.stats.registered += 1;

        tracing::debug!(
            %element,
            threshold = config.threshold,
            delay_ms = config.delay_ms,
            duration_ms = config.duration_ms,
            "ViewportRevealController: registered"
        );
        Ok(id)
    }

    /// Stop observing and drop the registration
    ///
    /// Safe at any point, including mid-animation: the listener is dropped
    /// and never called again. Returns `false` if the handle was already
    /// gone.
    pub fn deregister(&mut self, id: RevealId) -> bool {
        let Some(entry) = self.reveals.remove(id) else {
            return false;
        };
        if self.by_element.get(&entry.element) == Some(&id) {
            self.by_element.remove(&entry.element);
        }
        self.stats.deregistered += 1;
        tracing::debug!(
            element = %entry.element,
            phase = ?entry.phase(),
            "ViewportRevealController: deregistered"
        );
        true
    }

    /// Deregister by host element id
    pub fn deregister_element(&mut self, element: ElementId) -> bool {
        match self.by_element.get(&element).copied() {
            Some(id) => self.deregister(id),
            None => false,
        }
    }

    /// Attach (or replace) the listener for a reveal
    pub fn set_listener<F>(&mut self, id: RevealId, listener: F) -> bool
    where
        F: FnMut(RevealEvent) + 'static,
    {
        match self.reveals.get_mut(id) {
            Some(entry) => {
                entry.listener = Some(Box::new(listener));
                true
            }
            None => false,
        }
    }

    /// Evaluate visibility of every pending element
    ///
    /// Call on layout or visibility changes. Elements without known bounds or
    /// with a zero-area box are skipped until they are laid out. Returns the
    /// number of reveals triggered by this evaluation.
    pub fn on_visibility_change<G>(&mut self, geometry: &G) -> usize
    where
        G: GeometrySource + ?Sized,
    {
        self.stats.evaluations += 1;
        let viewport = geometry.viewport();
        if viewport.is_empty() {
            tracing::trace!("ViewportRevealController: empty viewport, nothing visible");
            return 0;
        }

        let mut triggered = 0;
        for (_, entry) in self.reveals.iter_mut() {
            if entry.state != RevealState::Pending {
                continue;
            }
            let Some(bounds) = geometry.bounds(entry.element) else {
                continue;
            };
            if bounds.is_empty() {
                continue;
            }

            let fraction = bounds.visible_fraction(&viewport);
            if fraction > 0.0 && fraction + THRESHOLD_EPSILON >= entry.config.threshold {
                tracing::debug!(
                    element = %entry.element,
                    fraction,
                    threshold = entry.config.threshold,
                    "ViewportRevealController: triggered"
                );
                entry.trigger();
                triggered += 1;
            }
        }

        self.stats.triggered += triggered as u64;
        triggered
    }

    /// Trigger a pending reveal without waiting for visibility
    ///
    /// Used for intro animations that play on mount. Returns `false` if the
    /// reveal is unknown or already triggered.
    pub fn trigger_now(&mut self, id: RevealId) -> bool {
        match self.reveals.get_mut(id) {
            Some(entry) if entry.state == RevealState::Pending => {
                tracing::debug!(element = %entry.element, "ViewportRevealController: triggered on mount");
                entry.trigger();
                self.stats.triggered += 1;
                true
            }
            _ => false,
        }
    }

    /// Advance every triggered reveal by `dt_ms`
    ///
    /// Listeners receive a `Frame` for each running reveal and `Completed`
    /// once. Returns `true` while any reveal is still delayed or running.
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        let mut active = false;
        let mut completed = 0;

        for (_, entry) in self.reveals.iter_mut() {
            if entry.state != RevealState::Triggered || entry.completed {
                continue;
            }
            entry.elapsed_ms += dt_ms;

            if entry.elapsed_ms > entry.config.delay_ms as f32 {
                let style = entry.config.style_at(entry.elapsed_ms);
                entry.emit(RevealEvent::Frame(style));
            }

            if entry.elapsed_ms >= entry.config.total_ms() {
                entry.completed = true;
                entry.emit(RevealEvent::Completed);
                completed += 1;
            } else {
                active = true;
            }
        }

        self.stats.completed += completed;
        active
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn state(&self, id: RevealId) -> Option<RevealState> {
        self.reveals.get(id).map(|entry| entry.state)
    }

    pub fn phase(&self, id: RevealId) -> Option<RevealPhase> {
        self.reveals.get(id).map(RevealEntry::phase)
    }

    /// Current style of a reveal (its `from` style while pending)
    pub fn style(&self, id: RevealId) -> Option<VisualStyle> {
        self.reveals.get(id).map(RevealEntry::style)
    }

    pub fn config(&self, id: RevealId) -> Option<&RevealConfig> {
        self.reveals.get(id).map(|entry| &entry.config)
    }

    pub fn element(&self, id: RevealId) -> Option<ElementId> {
        self.reveals.get(id).map(|entry| entry.element)
    }

    /// Registration handle for a host element, if it is registered
    pub fn lookup(&self, element: ElementId) -> Option<RevealId> {
        self.by_element.get(&element).copied()
    }

    pub fn contains(&self, id: RevealId) -> bool {
        self.reveals.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.reveals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reveals.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.reveals
            .values()
            .filter(|entry| entry.state == RevealState::Pending)
            .count()
    }

    /// Whether any triggered reveal has not finished yet
    pub fn is_animating(&self) -> bool {
        self.reveals
            .values()
            .any(|entry| entry.state == RevealState::Triggered && !entry.completed)
    }

    pub fn stats(&self) -> RevealStats {
        self.stats
    }

    /// Iterate over `(handle, element, phase)` for every registration
    pub fn iter(&self) -> impl Iterator<Item = (RevealId, ElementId, RevealPhase)> + '_ {
        self.reveals
            .iter()
            .map(|(id, entry)| (id, entry.element, entry.phase()))
    }
}

impl Default for ViewportRevealController {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ViewportRevealController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportRevealController")
            .field("registered", &self.reveals.len())
            .field("pending", &self.pending_count())
            .field("stats", &self.stats)
            .finish()
    }
}
