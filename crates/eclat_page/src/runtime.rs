//! Page runtime
//!
//! Glues the page layout to the motion engine. The host feeds scroll
//! positions and calls [`PageRuntime::frame`] once per display refresh:
//!
//! 1. pending scroll input is evaluated once by the progress tracker, whose
//!    subscribers write binding outputs into the layer styles
//! 2. element visibility is re-evaluated against the (possibly moved) layout
//! 3. running reveals advance by the frame delta
//!
//! ```rust
//! use eclat_core::Size;
//! use eclat_page::{PageConfig, PageRuntime};
//!
//! let config = PageConfig::storefront().unwrap();
//! let mut page = PageRuntime::mount(config, Size::new(1280.0, 800.0)).unwrap();
//!
//! page.scroll_to(400.0);
//! let report = page.frame(16.0);
//! assert!(report.progress > 0.0);
//!
//! page.unmount();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use eclat_animation::{
    MappingId, RevealEvent, RevealId, RevealState, ScrollProgressTracker,
    ViewportRevealController, VisualStyle,
};
use eclat_core::{ElementId, ElementIdGenerator, FrameFlag, ScrollMetrics, Size};
use serde::Serialize;

use crate::config::{BoundProperty, PageConfig};
use crate::error::{PageError, Result};
use crate::layout::{LayerKey, LayerStyles, PageLayout, Slot};

/// A scroll binding wired to the tracker
#[derive(Debug, Clone)]
struct ActiveBinding {
    name: String,
    mapping: MappingId,
}

/// Current output of a binding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingValue {
    pub name: String,
    pub value: f32,
}

/// What happened during one frame
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameReport {
    /// Frame number since mount, starting at 1
    pub frame: u64,
    /// Time since mount (ms)
    pub time_ms: f64,
    pub scroll_offset: f32,
    pub progress: f32,
    pub bindings: Vec<BindingValue>,
    /// Labels of elements whose reveal triggered this frame
    pub triggered: Vec<String>,
    /// Labels of elements whose reveal finished this frame
    pub completed: Vec<String>,
    /// Whether any reveal is still running
    pub animating: bool,
}

impl FrameReport {
    /// Nothing changed and nothing is running
    pub fn is_idle(&self) -> bool {
        self.triggered.is_empty() && self.completed.is_empty() && !self.animating
    }
}

type EventLog = Rc<RefCell<Vec<(ElementId, RevealEvent)>>>;

/// A mounted storefront page driving scroll-linked motion
pub struct PageRuntime {
    config: PageConfig,
    layout: PageLayout,
    scroll_offset: f32,
    tracker: ScrollProgressTracker,
    reveals: ViewportRevealController,
    frames: FrameFlag,
    bindings: Vec<ActiveBinding>,
    layers: Rc<RefCell<LayerStyles>>,
    registrations: Vec<(ElementId, RevealId)>,
    events: EventLog,
    geometry_dirty: bool,
    frame_count: u64,
    time_ms: f64,
    mounted: bool,
}

impl PageRuntime {
    /// Lay out the page and start the motion engine
    ///
    /// Scroll bindings are registered and subscribed, every revealable
    /// element is registered with its (staggered) reveal and section intros
    /// are triggered right away.
    pub fn mount(config: PageConfig, viewport: Size) -> Result<Self> {
        config.validate()?;

        let ids = ElementIdGenerator::new();
        let layout = PageLayout::build(&config, viewport, &ids);
        let frames = FrameFlag::new();

        let mut tracker = ScrollProgressTracker::new();
        tracker.initialize(
            ScrollMetrics::new(0.0, layout.document_height(), viewport.height),
            frames.clone(),
        );

        let layers: Rc<RefCell<LayerStyles>> = Rc::new(RefCell::new(LayerStyles::default()));
        let mut bindings = Vec::with_capacity(config.bindings.len());
        for binding in &config.bindings {
            let key = binding
                .target_parts()
                .and_then(|(section, layer)| {
                    layout
                        .section_index(section)
                        .map(|section| LayerKey { section, layer })
                })
                .ok_or_else(|| PageError::UnknownTarget {
                    binding: binding.name.clone(),
                    target: binding.target.clone(),
                })?;

            let mapping = tracker.insert_mapping(binding.mapping()?);
            let property = binding.property;
            let sink = Rc::clone(&layers);
            tracker.subscribe(mapping, move |value| {
                let mut layers = sink.borrow_mut();
                apply(layers.entry(key).or_default(), property, value);
            });

            bindings.push(ActiveBinding {
                name: binding.name.clone(),
                mapping,
            });
        }

        let events: EventLog = Rc::new(RefCell::new(Vec::new()));
        let mut reveals = ViewportRevealController::new();
        let mut registrations = Vec::new();

        for element in layout.elements() {
            let Some(section) = config.sections.get(element.section) else {
                continue;
            };
            let (reveal, intro) = match element.slot {
                Slot::Intro => match &section.intro {
                    Some(preset) => (preset.config_for(0, 1), true),
                    None => continue,
                },
                Slot::Item(index) => match &section.reveal {
                    Some(preset) => (preset.config_for(index, section.items.len()), false),
                    None => continue,
                },
                Slot::Scene => continue,
            };

            let id = reveals.register(element.id, reveal)?;
            let sink = Rc::clone(&events);
            let element_id = element.id;
            reveals.set_listener(id, move |event| {
                if !matches!(event, RevealEvent::Frame(_)) {
                    sink.borrow_mut().push((element_id, event));
                }
            });
            if intro {
                reveals.trigger_now(id);
            }
            registrations.push((element.id, id));
        }

        tracing::info!(
            brand = %config.brand.name,
            bindings = bindings.len(),
            reveals = registrations.len(),
            document_height = layout.document_height(),
            "PageRuntime: mounted"
        );

        Ok(Self {
            config,
            layout,
            scroll_offset: 0.0,
            tracker,
            reveals,
            frames,
            bindings,
            layers,
            registrations,
            events,
            geometry_dirty: true,
            frame_count: 0,
            time_ms: 0.0,
            mounted: true,
        })
    }

    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(
            self.scroll_offset,
            self.layout.document_height(),
            self.layout.viewport().height,
        )
    }

    /// Scroll to a document offset, clamped to the scrollable range
    pub fn scroll_to(&mut self, offset: f32) {
        if !self.mounted {
            return;
        }
        let offset = if offset.is_finite() { offset } else { 0.0 };
        let metrics = self.metrics().with_offset(offset);
        self.scroll_offset = metrics.offset;
        self.tracker.on_scroll(metrics);
        self.geometry_dirty = true;
    }

    /// Scroll by a relative amount
    pub fn scroll_by(&mut self, delta: f32) {
        self.scroll_to(self.scroll_offset + delta);
    }

    /// Re-layout for a new viewport size
    pub fn resize(&mut self, viewport: Size) {
        if !self.mounted {
            return;
        }
        self.layout.relayout(&self.config, viewport);
        let metrics = self.metrics().with_offset(self.scroll_offset);
        self.scroll_offset = metrics.offset;
        self.tracker.on_scroll(metrics);
        self.geometry_dirty = true;
    }

    /// Run one rendering frame
    pub fn frame(&mut self, dt_ms: f32) -> FrameReport {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        self.frame_count += 1;
        self.time_ms += f64::from(dt_ms);

        if !self.mounted {
            return FrameReport {
                frame: self.frame_count,
                time_ms: self.time_ms,
                scroll_offset: self.scroll_offset,
                ..Default::default()
            };
        }

        if self.frames.take() && self.tracker.on_frame() {
            self.geometry_dirty = true;
        }

        if self.geometry_dirty {
            self.geometry_dirty = false;
            let layers = self.layers.borrow();
            let view = self.layout.view(self.scroll_offset, &layers);
            self.reveals.on_visibility_change(&view);
        }

        let animating = self.reveals.advance(dt_ms);

        let mut report = FrameReport {
            frame: self.frame_count,
            time_ms: self.time_ms,
            scroll_offset: self.scroll_offset,
            progress: self.tracker.progress(),
            bindings: self.binding_values(),
            animating,
            ..Default::default()
        };

        for (element, event) in self.events.borrow_mut().drain(..) {
            let label = self.label(element);
            match event {
                RevealEvent::Triggered => report.triggered.push(label),
                RevealEvent::Completed => report.completed.push(label),
                RevealEvent::Frame(_) => {}
            }
        }

        if !report.triggered.is_empty() {
            tracing::debug!(
                frame = report.frame,
                triggered = ?report.triggered,
                "PageRuntime: reveals triggered"
            );
        }
        report
    }

    /// Stop all motion and release every registration
    ///
    /// Idempotent. No listener or subscriber runs after this returns.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        for (_, id) in self.registrations.drain(..) {
            self.reveals.deregister(id);
        }
        self.tracker.teardown();
        self.events.borrow_mut().clear();
        self.frames.take();
        self.mounted = false;
        tracing::info!("PageRuntime: unmounted");
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn tracker(&self) -> &ScrollProgressTracker {
        &self.tracker
    }

    pub fn reveals(&self) -> &ViewportRevealController {
        &self.reveals
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn progress(&self) -> f32 {
        self.tracker.progress()
    }

    /// Current output of a named binding
    pub fn binding_value(&self, name: &str) -> Option<f32> {
        self.bindings
            .iter()
            .find(|binding| binding.name == name)
            .and_then(|binding| self.tracker.value(binding.mapping))
    }

    pub fn binding_values(&self) -> Vec<BindingValue> {
        self.bindings
            .iter()
            .filter_map(|binding| {
                self.tracker.value(binding.mapping).map(|value| BindingValue {
                    name: binding.name.clone(),
                    value,
                })
            })
            .collect()
    }

    /// Reveal state of an element, if it is registered
    pub fn reveal_state(&self, element: ElementId) -> Option<RevealState> {
        self.reveals
            .lookup(element)
            .and_then(|id| self.reveals.state(id))
    }

    /// Effective style of an element: its reveal composed with its layer binding
    pub fn element_style(&self, element: ElementId) -> Option<VisualStyle> {
        let layout_element = self.layout.element(element)?;
        let reveal = self
            .reveals
            .lookup(element)
            .and_then(|id| self.reveals.style(id))
            .unwrap_or_default();
        let layer = layout_element
            .layer_key()
            .and_then(|key| self.layers.borrow().get(&key).copied())
            .unwrap_or_default();
        Some(compose(reveal, layer))
    }

    /// Elements whose reveal has not triggered yet
    pub fn pending(&self) -> Vec<&str> {
        self.registrations
            .iter()
            .filter(|(_, id)| self.reveals.state(*id) == Some(RevealState::Pending))
            .filter_map(|(element, _)| self.layout.element(*element))
            .map(|element| element.label.as_str())
            .collect()
    }

    fn label(&self, element: ElementId) -> String {
        self.layout
            .element(element)
            .map(|element| element.label.clone())
            .unwrap_or_else(|| element.to_string())
    }
}

impl Drop for PageRuntime {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for PageRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRuntime")
            .field("mounted", &self.mounted)
            .field("scroll_offset", &self.scroll_offset)
            .field("tracker", &self.tracker)
            .field("reveals", &self.reveals)
            .field("frame_count", &self.frame_count)
            .finish()
    }
}

fn apply(style: &mut VisualStyle, property: BoundProperty, value: f32) {
    match property {
        BoundProperty::TranslateY => style.translate_y = value,
        BoundProperty::Opacity => style.opacity = value,
        BoundProperty::Scale => style.scale = value,
    }
}

/// Nested transforms: offsets add, opacity and scale multiply
fn compose(inner: VisualStyle, outer: VisualStyle) -> VisualStyle {
    VisualStyle::new(
        inner.opacity * outer.opacity,
        inner.translate_y + outer.translate_y,
        inner.scale * outer.scale,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use eclat_animation::RevealPhase;

    fn mount(width: f32, height: f32) -> PageRuntime {
        PageRuntime::mount(PageConfig::storefront().unwrap(), Size::new(width, height)).unwrap()
    }

    fn element_id(page: &PageRuntime, label: &str) -> ElementId {
        page.layout()
            .elements()
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.id)
            .unwrap()
    }

    fn run_until_idle(page: &mut PageRuntime) -> Vec<FrameReport> {
        let mut reports = Vec::new();
        for _ in 0..1000 {
            let report = page.frame(16.0);
            let idle = report.is_idle();
            reports.push(report);
            if idle {
                break;
            }
        }
        reports
    }

    #[test]
    fn test_mount_registers_everything() {
        let page = mount(1280.0, 800.0);
        assert_eq!(page.reveals().len(), 9);
        assert_eq!(page.tracker().mapping_count(), 3);
        assert_eq!(page.tracker().subscription_count(), 3);
        assert_eq!(page.progress(), 0.0);

        let intro = element_id(&page, "hero.intro");
        assert_eq!(page.reveal_state(intro), Some(RevealState::Triggered));
        let scene = element_id(&page, "hero.scene");
        assert_eq!(page.reveal_state(scene), None);
    }

    #[test]
    fn test_intro_plays_on_mount() {
        let mut page = mount(1280.0, 800.0);
        let first = page.frame(16.0);
        assert!(first.animating);

        let reports = run_until_idle(&mut page);
        assert!(reports
            .iter()
            .any(|r| r.completed.iter().any(|label| label == "hero.intro")));

        let intro = element_id(&page, "hero.intro");
        assert_eq!(page.element_style(intro), Some(VisualStyle::IDENTITY));
    }

    #[test]
    fn test_scroll_drives_bindings() {
        let mut page = mount(1280.0, 800.0);
        let range = page.layout().document_height() - 800.0;

        page.scroll_to(range / 2.0);
        let report = page.frame(16.0);
        assert!((report.progress - 0.5).abs() < 1e-4);
        assert!((page.binding_value("hero_scene_y").unwrap() + 60.0).abs() < 1e-2);
        assert!((page.binding_value("hero_cards_y").unwrap() + 30.0).abs() < 1e-2);

        // Past 0.6 the scene has faded to its floor
        page.scroll_to(range);
        page.frame(16.0);
        assert_eq!(page.progress(), 1.0);
        assert!((page.binding_value("hero_scene_opacity").unwrap() - 0.2).abs() < 1e-4);

        let scene = element_id(&page, "hero.scene");
        let style = page.element_style(scene).unwrap();
        assert!((style.translate_y + 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_scrolls_coalesce_into_one_frame() {
        let mut page = mount(1280.0, 800.0);
        let before = page.tracker().stats().evaluations;
        for offset in [50.0, 120.0, 300.0, 410.0] {
            page.scroll_to(offset);
        }
        page.frame(16.0);
        page.frame(16.0);
        assert_eq!(page.tracker().stats().evaluations, before + 1);
        assert_eq!(page.scroll_offset(), 410.0);
    }

    #[test]
    fn test_scrolling_reveals_everything_once() {
        let mut page = mount(1280.0, 800.0);
        run_until_idle(&mut page);
        assert!(!page.pending().is_empty());

        let bottom = page.layout().document_height();
        let mut triggered = Vec::new();
        let mut offset = 0.0;
        while offset < bottom {
            offset += 120.0;
            page.scroll_to(offset);
            triggered.extend(page.frame(16.0).triggered);
        }
        // Scroll back up, nothing fires again
        page.scroll_to(0.0);
        triggered.extend(page.frame(16.0).triggered);
        for report in run_until_idle(&mut page) {
            triggered.extend(report.triggered);
        }

        assert!(page.pending().is_empty(), "{:?}", page.pending());
        assert_eq!(triggered.len(), 8);
        let mut unique = triggered.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), triggered.len());

        for (_, id) in &page.registrations {
            assert_eq!(page.reveals().phase(*id), Some(RevealPhase::Finished));
        }
    }

    #[test]
    fn test_hero_cards_stagger() {
        let mut page = mount(1280.0, 800.0);
        assert_eq!(page.frame(16.0).triggered, vec!["hero.intro"]);

        // Bring the whole hero grid into view
        let hero = page.layout().section_index("hero").unwrap();
        let card = page.layout().find(hero, Slot::Item(0)).unwrap().rect;
        page.scroll_to(card.bottom() - 700.0);
        let report = page.frame(16.0);
        assert_eq!(
            report.triggered,
            vec!["hero.items[0]", "hero.items[1]", "hero.items[2]"]
        );

        // 150ms in: first card (100ms delay) moving, third (300ms) still held
        for _ in 0..9 {
            page.frame(16.0);
        }
        let style = |label: &str| {
            let id = element_id(&page, label);
            page.reveals()
                .style(page.reveals().lookup(id).unwrap())
                .unwrap()
        };
        assert!(style("hero.items[0]").opacity > 0.0);
        assert_eq!(style("hero.items[2]").opacity, 0.0);
        assert_eq!(style("hero.items[2]").scale, 0.98);
    }

    #[test]
    fn test_degenerate_viewport() {
        // Viewport taller than the whole document: nothing to scroll
        let mut config = PageConfig::storefront().unwrap();
        config.sections[0].fill_viewport = false;
        let mut page = PageRuntime::mount(config, Size::new(1280.0, 100_000.0)).unwrap();
        page.scroll_to(500.0);
        let report = page.frame(16.0);
        assert_eq!(report.progress, 0.0);
        assert_eq!(report.scroll_offset, 0.0);
        assert_eq!(page.binding_value("hero_scene_opacity"), Some(1.0));
        // Everything is visible at once
        assert!(page.pending().is_empty());
    }

    #[test]
    fn test_resize_relayouts() {
        let mut page = mount(1280.0, 800.0);
        let wide = page.layout().document_height();
        page.scroll_to(wide);
        page.frame(16.0);

        page.resize(Size::new(375.0, 800.0));
        page.frame(16.0);
        assert!(page.layout().document_height() > wide);
        assert!(page.progress() < 1.0);
    }

    #[test]
    fn test_unmount_is_idempotent() {
        let mut page = mount(1280.0, 800.0);
        page.scroll_to(300.0);
        page.unmount();
        page.unmount();

        assert!(!page.is_mounted());
        assert!(page.reveals().is_empty());
        assert!(!page.tracker().is_attached());
        assert_eq!(page.tracker().subscription_count(), 0);

        page.scroll_to(900.0);
        let report = page.frame(16.0);
        assert!(report.is_idle());
        assert!(report.bindings.is_empty());
    }

    #[test]
    fn test_report_serializes() {
        let mut page = mount(1280.0, 800.0);
        let report = page.frame(16.0);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["frame"], 1);
        assert_eq!(json["bindings"].as_array().unwrap().len(), 3);
        assert_eq!(json["animating"], true);
    }
}
