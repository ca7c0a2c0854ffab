//! Scroll progress tracking
//!
//! [`ScrollProgressTracker`] turns raw scroll metrics into a normalized
//! progress value and publishes the outputs of every registered
//! [`ScrollMapping`] to subscribers.
//!
//! Scroll events arrive far more often than frames are drawn, so the tracker
//! never evaluates inside `on_scroll`. It records the latest metrics and asks
//! the host for a frame; all events that land before that frame collapse into
//! a single evaluation in [`ScrollProgressTracker::on_frame`].
//!
//! # Example
//!
//! ```rust
//! use eclat_animation::ScrollProgressTracker;
//! use eclat_core::{FrameFlag, ScrollMetrics};
//!
//! let frames = FrameFlag::new();
//! let mut tracker = ScrollProgressTracker::new();
//! tracker.initialize(ScrollMetrics::new(0.0, 2000.0, 800.0), frames.clone());
//!
//! let parallax = tracker.register_mapping(&[0.0, 1.0], &[0.0, -120.0]).unwrap();
//!
//! tracker.on_scroll(ScrollMetrics::new(600.0, 2000.0, 800.0));
//! if frames.take() {
//!     tracker.on_frame();
//! }
//! assert_eq!(tracker.value(parallax), Some(-60.0));
//! ```

use eclat_core::{FrameRequester, ScrollMetrics};
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use smallvec::SmallVec;

use crate::error::Result;
use crate::mapping::ScrollMapping;
use crate::values::Interpolate;

new_key_type! {
    /// Handle to a registered scroll mapping
    pub struct MappingId;
    /// Handle to a mapping subscription
    pub struct SubscriptionId;
}

/// Output changes smaller than this are not republished
const CHANGE_EPSILON: f32 = 1e-4;

/// Callback invoked with a mapping's freshly evaluated output
pub type MappingCallback = Box<dyn FnMut(f32)>;

struct MappingEntry {
    mapping: ScrollMapping,
    /// Last published output
    value: f32,
    subscribers: SmallVec<[SubscriptionId; 2]>,
}

struct Subscription {
    mapping: MappingId,
    callback: MappingCallback,
}

/// Lifecycle of the tracker's attachment to the scroll source
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerState {
    /// Not listening to scroll events
    Detached,
    /// Listening; scroll events schedule frame evaluations
    Attached,
}

/// Counters useful for diagnostics and tests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackerStats {
    /// Scroll events received while attached
    pub scroll_events: u64,
    /// Frames that actually evaluated the mappings
    pub evaluations: u64,
    /// Callback invocations
    pub notifications: u64,
}

/// Tracks normalized document scroll progress and derived mapping outputs
pub struct ScrollProgressTracker {
    state: TrackerState,
    metrics: ScrollMetrics,
    progress: f32,
    mappings: SlotMap<MappingId, MappingEntry>,
    subscriptions: SlotMap<SubscriptionId, Subscription>,
    frames: Option<Box<dyn FrameRequester>>,
    frame_pending: bool,
    stats: TrackerStats,
}

impl ScrollProgressTracker {
    pub fn new() -> Self {
        Self {
            state: TrackerState::Detached,
            metrics: ScrollMetrics::default(),
            progress: 0.0,
            mappings: SlotMap::with_key(),
            subscriptions: SlotMap::with_key(),
            frames: None,
            frame_pending: false,
            stats: TrackerStats::default(),
        }
    }

    /// Attach to the scroll source
    ///
    /// Progress is computed from `metrics` right away and every existing
    /// mapping is re-evaluated. A document without a scrollable range simply
    /// reports progress 0. Re-initializing an attached tracker replaces its
    /// frame requester and metrics.
    pub fn initialize<F>(&mut self, metrics: ScrollMetrics, frames: F)
    where
        F: FrameRequester + 'static,
    {
        if self.state == TrackerState::Attached {
            tracing::debug!("ScrollProgressTracker: re-initializing attached tracker");
        }
        self.state = TrackerState::Attached;
        self.frames = Some(Box::new(frames));
        self.frame_pending = false;
        self.metrics = metrics;

        if metrics.scroll_range() <= 0.0 {
            tracing::debug!(
                document_height = metrics.document_height,
                viewport_height = metrics.viewport_height,
                "ScrollProgressTracker: no scrollable range, progress pinned to 0"
            );
        }

        self.evaluate_all();
    }

    /// Detach from the scroll source
    ///
    /// Idempotent. A pending frame is abandoned and subscribers are dropped,
    /// so no callback fires after this returns. Mappings stay registered and
    /// can still be evaluated on demand.
    pub fn teardown(&mut self) {
        if self.state == TrackerState::Detached && self.frames.is_none() {
            return;
        }
        tracing::debug!(
            mappings = self.mappings.len(),
            subscriptions = self.subscriptions.len(),
            "ScrollProgressTracker: teardown"
        );
        self.state = TrackerState::Detached;
        self.frames = None;
        self.frame_pending = false;
        self.subscriptions.clear();
        for (_, entry) in self.mappings.iter_mut() {
            entry.subscribers.clear();
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.state == TrackerState::Attached
    }

    /// Current normalized progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Metrics used by the last evaluation (or the latest pending ones)
    pub fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    /// Whether a scroll event is waiting for the next frame
    pub fn has_pending_frame(&self) -> bool {
        self.frame_pending
    }

    // =========================================================================
    // Mappings
    // =========================================================================

    /// Register a piecewise-linear mapping from progress to an output value
    ///
    /// Fails with [`AnimationError::InvalidMapping`](crate::AnimationError)
    /// when the breakpoints are malformed.
    pub fn register_mapping(&mut self, input: &[f32], output: &[f32]) -> Result<MappingId> {
        let mapping = ScrollMapping::new(input, output)?;
        Ok(self.insert_mapping(mapping))
    }

    /// Register an already validated mapping
    pub fn insert_mapping(&mut self, mapping: ScrollMapping) -> MappingId {
        let value = mapping.evaluate(self.progress);
        let id = self.mappings.insert(MappingEntry {
            mapping,
            value,
            subscribers: SmallVec::new(),
        });
        tracing::debug!(?id, value, "ScrollProgressTracker: mapping registered");
        id
    }

    /// Remove a mapping together with its subscriptions
    pub fn remove_mapping(&mut self, id: MappingId) -> Option<ScrollMapping> {
        let entry = self.mappings.remove(id)?;
        for sub in entry.subscribers {
            self.subscriptions.remove(sub);
        }
        Some(entry.mapping)
    }

    pub fn mapping(&self, id: MappingId) -> Option<&ScrollMapping> {
        self.mappings.get(id).map(|entry| &entry.mapping)
    }

    pub fn mapping_count(&self) -> usize {
        self.mappings.len()
    }

    /// Evaluate a mapping at an arbitrary progress value
    ///
    /// Does not touch the published value. Returns `None` for unknown handles.
    pub fn evaluate(&self, id: MappingId, progress: f32) -> Option<f32> {
        self.mappings
            .get(id)
            .map(|entry| entry.mapping.evaluate(progress))
    }

    /// Last published output of a mapping
    pub fn value(&self, id: MappingId) -> Option<f32> {
        self.mappings.get(id).map(|entry| entry.value)
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Subscribe to a mapping's output
    ///
    /// The callback receives the current value immediately and then every
    /// time a frame changes it. Returns `None` for unknown mappings.
    pub fn subscribe<F>(&mut self, id: MappingId, callback: F) -> Option<SubscriptionId>
    where
        F: FnMut(f32) + 'static,
    {
        let entry = self.mappings.get_mut(id)?;
        let mut callback: MappingCallback = Box::new(callback);
        callback(entry.value);
        self.stats.notifications += 1;

        let sub = self.subscriptions.insert(Subscription {
            mapping: id,
            callback,
        });
        entry.subscribers.push(sub);
        Some(sub)
    }

    /// Remove a subscription; unknown or already removed ids are ignored
    pub fn unsubscribe(&mut self, sub: SubscriptionId) -> bool {
        let Some(subscription) = self.subscriptions.remove(sub) else {
            return false;
        };
        if let Some(entry) = self.mappings.get_mut(subscription.mapping) {
            entry.subscribers.retain(|s| *s != sub);
        }
        true
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    // =========================================================================
    // Event handling
    // =========================================================================

    /// Record a scroll event
    ///
    /// Only the latest metrics are kept. The first event after a frame asks
    /// the host for another frame; later ones piggyback on that request.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) {
        if self.state == TrackerState::Detached {
            tracing::trace!("ScrollProgressTracker: scroll event ignored while detached");
            return;
        }
        self.stats.scroll_events += 1;
        self.metrics = metrics;

        if !self.frame_pending {
            self.frame_pending = true;
            if let Some(frames) = &self.frames {
                frames.request_frame();
            }
        }
    }

    /// Run the coalesced evaluation for this frame
    ///
    /// Returns `true` if there was pending scroll input to evaluate.
    pub fn on_frame(&mut self) -> bool {
        if !self.frame_pending || self.state == TrackerState::Detached {
            return false;
        }
        self.frame_pending = false;
        self.evaluate_all();
        true
    }

    fn evaluate_all(&mut self) {
        self.progress = self.metrics.progress();
        self.stats.evaluations += 1;
        tracing::trace!(progress = self.progress, "ScrollProgressTracker: evaluate");

        for (_, entry) in self.mappings.iter_mut() {
            let next = entry.mapping.evaluate(self.progress);
            if next.approx_eq(&entry.value, CHANGE_EPSILON) {
                continue;
            }
            entry.value = next;

            for sub in &entry.subscribers {
                if let Some(subscription) = self.subscriptions.get_mut(*sub) {
                    (subscription.callback)(next);
                    self.stats.notifications += 1;
                }
            }
        }
    }

    /// Snapshot of every mapping's published value
    pub fn values(&self) -> SecondaryMap<MappingId, f32> {
        self.mappings
            .iter()
            .map(|(id, entry)| (id, entry.value))
            .collect()
    }
}

impl Default for ScrollProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScrollProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollProgressTracker")
            .field("state", &self.state)
            .field("progress", &self.progress)
            .field("metrics", &self.metrics)
            .field("mappings", &self.mappings.len())
            .field("subscriptions", &self.subscriptions.len())
            .field("frame_pending", &self.frame_pending)
            .finish()
    }
}
