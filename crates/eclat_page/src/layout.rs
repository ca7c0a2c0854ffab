//! Headless page layout
//!
//! A deliberately small block layout: sections stack vertically, each with
//! padding, a header block and an optional responsive grid of items. The
//! result is a flat list of elements with document-space rects, which is all
//! the motion engine needs to decide visibility.

use eclat_animation::VisualStyle;
use eclat_core::{ElementId, ElementIdGenerator, GeometrySource, Rect, Size};
use rustc_hash::FxHashMap;

use crate::config::{PageConfig, SectionConfig, TargetLayer};

/// What part of a section an element represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Full-bleed background scene
    Scene,
    /// Heading block, revealed on mount
    Intro,
    /// Grid item by index
    Item(usize),
}

impl Slot {
    /// Binding layer that moves this slot, if any
    pub fn layer(self) -> Option<TargetLayer> {
        match self {
            Slot::Scene => Some(TargetLayer::Scene),
            Slot::Item(_) => Some(TargetLayer::Items),
            Slot::Intro => None,
        }
    }
}

/// Identifies a bound layer: section index plus layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerKey {
    pub section: usize,
    pub layer: TargetLayer,
}

/// Styles written by scroll bindings, per layer
pub type LayerStyles = FxHashMap<LayerKey, VisualStyle>;

/// A laid-out element
#[derive(Debug, Clone)]
pub struct LayoutElement {
    pub id: ElementId,
    /// Index into [`PageLayout::sections`]
    pub section: usize,
    pub slot: Slot,
    /// Untransformed document-space bounds
    pub rect: Rect,
    /// Stable human-readable name, e.g. `hero.items[1]`
    pub label: String,
    pub title: Option<String>,
}

impl LayoutElement {
    pub fn layer_key(&self) -> Option<LayerKey> {
        self.slot.layer().map(|layer| LayerKey {
            section: self.section,
            layer,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SectionLayout {
    pub id: String,
    pub rect: Rect,
}

/// Positions of every section and element for one viewport size
#[derive(Debug, Clone)]
pub struct PageLayout {
    viewport: Size,
    sections: Vec<SectionLayout>,
    elements: Vec<LayoutElement>,
    by_id: FxHashMap<ElementId, usize>,
    document_height: f32,
}

impl PageLayout {
    /// Lay out `config` and assign fresh element ids
    pub fn build(config: &PageConfig, viewport: Size, ids: &ElementIdGenerator) -> Self {
        let placement = place(config, viewport);
        let elements: Vec<LayoutElement> = placement
            .elements
            .into_iter()
            .map(|placed| LayoutElement {
                id: ids.next(),
                section: placed.section,
                slot: placed.slot,
                rect: placed.rect,
                label: placed.label,
                title: placed.title,
            })
            .collect();
        let by_id = elements
            .iter()
            .enumerate()
            .map(|(index, element)| (element.id, index))
            .collect();

        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            elements = elements.len(),
            document_height = placement.document_height,
            "PageLayout: built"
        );

        Self {
            viewport,
            sections: placement.sections,
            elements,
            by_id,
            document_height: placement.document_height,
        }
    }

    /// Recompute rects for a new viewport, keeping element ids
    pub fn relayout(&mut self, config: &PageConfig, viewport: Size) {
        let placement = place(config, viewport);
        if placement.elements.len() != self.elements.len() {
            tracing::warn!(
                before = self.elements.len(),
                after = placement.elements.len(),
                "PageLayout: element count changed on relayout"
            );
        }
        for (element, placed) in self.elements.iter_mut().zip(placement.elements) {
            element.rect = placed.rect;
        }
        self.viewport = viewport;
        self.sections = placement.sections;
        self.document_height = placement.document_height;
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn document_height(&self) -> f32 {
        self.document_height
    }

    pub fn sections(&self) -> &[SectionLayout] {
        &self.sections
    }

    pub fn elements(&self) -> &[LayoutElement] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&LayoutElement> {
        self.by_id
            .get(&id)
            .and_then(|index| self.elements.get(*index))
    }

    pub fn find(&self, section: usize, slot: Slot) -> Option<&LayoutElement> {
        self.elements
            .iter()
            .find(|element| element.section == section && element.slot == slot)
    }

    pub fn section_index(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|section| section.id == id)
    }

    /// Geometry as seen at a scroll offset with binding styles applied
    pub fn view<'a>(&'a self, scroll_offset: f32, layers: &'a LayerStyles) -> PageView<'a> {
        PageView {
            layout: self,
            scroll_offset,
            layers,
        }
    }
}

/// A [`PageLayout`] at a scroll position
pub struct PageView<'a> {
    layout: &'a PageLayout,
    scroll_offset: f32,
    layers: &'a LayerStyles,
}

impl GeometrySource for PageView<'_> {
    fn viewport(&self) -> Rect {
        Rect::new(
            0.0,
            self.scroll_offset,
            self.layout.viewport.width,
            self.layout.viewport.height,
        )
    }

    fn bounds(&self, element: ElementId) -> Option<Rect> {
        let element = self.layout.element(element)?;
        let style = element
            .layer_key()
            .and_then(|key| self.layers.get(&key))
            .copied()
            .unwrap_or_default();
        Some(transform(element.rect, style))
    }
}

/// Bounding box of `rect` after translating and scaling about its center
pub fn transform(rect: Rect, style: VisualStyle) -> Rect {
    let scale = if style.scale.is_finite() && style.scale > 0.0 {
        style.scale
    } else {
        1.0
    };
    let width = rect.width() * scale;
    let height = rect.height() * scale;
    let x = rect.x() + (rect.width() - width) / 2.0;
    let y = rect.y() + (rect.height() - height) / 2.0 + style.translate_y;
    Rect::new(x, y, width, height)
}

// =============================================================================
// Placement
// =============================================================================

struct Placed {
    section: usize,
    slot: Slot,
    rect: Rect,
    label: String,
    title: Option<String>,
}

struct Placement {
    sections: Vec<SectionLayout>,
    elements: Vec<Placed>,
    document_height: f32,
}

/// Horizontal content box for a viewport width
fn content_box(config: &PageConfig, viewport_width: f32) -> (f32, f32) {
    let width = viewport_width.max(0.0);
    let container = width.min(config.container.max_width);
    let padding = config.container.padding.at(width);
    let content_width = (container - 2.0 * padding).max(0.0);
    let x = (width - container) / 2.0 + padding;
    (x, content_width)
}

fn place(config: &PageConfig, viewport: Size) -> Placement {
    let (content_x, content_width) = content_box(config, viewport.width);
    let mut sections = Vec::with_capacity(config.sections.len());
    let mut elements = Vec::new();
    let mut top = 0.0_f32;

    for (index, section) in config.sections.iter().enumerate() {
        let header_top = top + section.padding_top;
        let mut content_bottom = header_top + section.header_height;

        if section.intro.is_some() {
            elements.push(Placed {
                section: index,
                slot: Slot::Intro,
                rect: Rect::new(content_x, header_top, content_width, section.header_height),
                label: format!("{}.intro", section.id),
                title: section.title.clone(),
            });
        }

        if let Some(grid) = &section.grid {
            let grid_top = content_bottom + grid.margin_top;
            let grid_height = place_grid(
                section,
                index,
                (content_x, grid_top, content_width),
                viewport.width,
                &mut elements,
            );
            if grid_height > 0.0 {
                content_bottom = grid_top + grid_height;
            }
        }

        let mut height = content_bottom + section.padding_bottom - top;
        if section.fill_viewport {
            height = height.max(viewport.height);
        }
        let rect = Rect::new(0.0, top, viewport.width, height);

        if section.scene.is_some() {
            // Rendered first, behind the content
            let at = elements
                .iter()
                .position(|placed| placed.section == index)
                .unwrap_or(elements.len());
            elements.insert(
                at,
                Placed {
                    section: index,
                    slot: Slot::Scene,
                    rect,
                    label: format!("{}.scene", section.id),
                    title: None,
                },
            );
        }

        sections.push(SectionLayout {
            id: section.id.clone(),
            rect,
        });
        top += height;
    }

    Placement {
        sections,
        elements,
        document_height: top,
    }
}

/// Place a section's grid items; returns the grid height
fn place_grid(
    section: &SectionConfig,
    index: usize,
    (x, y, width): (f32, f32, f32),
    viewport_width: f32,
    elements: &mut Vec<Placed>,
) -> f32 {
    let Some(grid) = &section.grid else {
        return 0.0;
    };
    if section.items.is_empty() {
        return 0.0;
    }

    let columns = grid.columns.at(viewport_width).max(1) as usize;
    let item_width = ((width - grid.gap * (columns - 1) as f32) / columns as f32).max(0.0);
    let item_height = grid.item_height(item_width);

    for (i, item) in section.items.iter().enumerate() {
        let column = i % columns;
        let row = i / columns;
        elements.push(Placed {
            section: index,
            slot: Slot::Item(i),
            rect: Rect::new(
                x + column as f32 * (item_width + grid.gap),
                y + row as f32 * (item_height + grid.gap),
                item_width,
                item_height,
            ),
            label: format!("{}.items[{}]", section.id, i),
            title: Some(item.title.clone()),
        });
    }

    let rows = section.items.len().div_ceil(columns);
    rows as f32 * item_height + (rows - 1) as f32 * grid.gap
}
