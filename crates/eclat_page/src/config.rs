//! Page configuration
//!
//! The storefront is static content: navigation, sections, product items,
//! scroll bindings and reveal presets. It is loaded once at startup from
//! TOML (the embedded [`STOREFRONT_TOML`] by default) and never mutated.

use std::fs;
use std::path::Path;

use eclat_animation::{Easing, RevealConfig, ScrollMapping, Stagger, VisualStyle};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{PageError, Result};

/// The built-in storefront page
pub const STOREFRONT_TOML: &str = include_str!("../assets/storefront.toml");

// =============================================================================
// Top level
// =============================================================================

/// Complete page description
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageConfig {
    pub brand: BrandConfig,
    #[serde(default)]
    pub nav: Vec<NavLink>,
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
    #[serde(default)]
    pub container: ContainerConfig,
}

/// Brand and chrome copy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrandConfig {
    pub name: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub cart_count: u32,
    #[serde(default)]
    pub copyright: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NavLink {
    pub name: String,
    pub href: String,
}

/// Horizontal content container (centered, max width, responsive padding)
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub max_width: f32,
    pub padding: Responsive<f32>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_width: 1280.0,
            padding: Responsive {
                base: 16.0,
                sm: Some(24.0),
                lg: Some(32.0),
            },
        }
    }
}

/// Breakpoint widths (px) matching the page's `sm` and `lg` media queries
pub const SM_BREAKPOINT: f32 = 640.0;
pub const LG_BREAKPOINT: f32 = 1024.0;

/// A value that changes at the `sm` and `lg` breakpoints
///
/// Missing breakpoints inherit from the next smaller one.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Responsive<T> {
    pub base: T,
    #[serde(default)]
    pub sm: Option<T>,
    #[serde(default)]
    pub lg: Option<T>,
}

impl<T: Copy> Responsive<T> {
    pub fn fixed(value: T) -> Self {
        Self {
            base: value,
            sm: None,
            lg: None,
        }
    }

    /// Resolve for a viewport width
    pub fn at(&self, viewport_width: f32) -> T {
        let sm = self.sm.unwrap_or(self.base);
        let lg = self.lg.unwrap_or(sm);
        if viewport_width >= LG_BREAKPOINT {
            lg
        } else if viewport_width >= SM_BREAKPOINT {
            sm
        } else {
            self.base
        }
    }
}

// =============================================================================
// Bindings
// =============================================================================

/// Style property a scroll binding drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundProperty {
    TranslateY,
    Opacity,
    Scale,
}

/// A named scroll mapping applied to a section layer
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BindingConfig {
    pub name: String,
    /// `"<section>.scene"` or `"<section>.items"`
    pub target: String,
    pub property: BoundProperty,
    pub input: Vec<f32>,
    pub output: Vec<f32>,
}

impl BindingConfig {
    pub fn mapping(&self) -> Result<ScrollMapping> {
        ScrollMapping::new(&self.input, &self.output).map_err(|source| PageError::Binding {
            binding: self.name.clone(),
            source,
        })
    }

    /// Section id and layer name of the target
    pub fn target_parts(&self) -> Option<(&str, TargetLayer)> {
        let (section, layer) = self.target.split_once('.')?;
        let layer = match layer {
            "scene" => TargetLayer::Scene,
            "items" => TargetLayer::Items,
            _ => return None,
        };
        Some((section, layer))
    }
}

/// Which layer of a section a binding moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetLayer {
    /// Full-bleed background media
    Scene,
    /// The section's item grid
    Items,
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SectionConfig {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Section is at least as tall as the viewport
    #[serde(default)]
    pub fill_viewport: bool,
    #[serde(default)]
    pub padding_top: f32,
    #[serde(default)]
    pub padding_bottom: f32,
    /// Height of the heading/copy block above the grid
    #[serde(default)]
    pub header_height: f32,
    /// Opaque background scene URL
    #[serde(default)]
    pub scene: Option<String>,
    /// Reveal played on mount for the header block
    #[serde(default)]
    pub intro: Option<RevealPreset>,
    #[serde(default)]
    pub grid: Option<GridConfig>,
    /// Reveal applied to every grid item, staggered by index
    #[serde(default)]
    pub reveal: Option<RevealPreset>,
    #[serde(default)]
    pub items: Vec<ItemConfig>,
    #[serde(default)]
    pub links: Vec<String>,
}

/// Grid layout of a section's items
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct GridConfig {
    pub columns: Responsive<u32>,
    #[serde(default)]
    pub gap: f32,
    /// Space between the header block and the grid
    #[serde(default)]
    pub margin_top: f32,
    /// Item height as a multiple of its width
    #[serde(default)]
    pub aspect: Option<f32>,
    /// Fixed item height; wins over `aspect`
    #[serde(default)]
    pub fixed_height: Option<f32>,
    /// Caption area added below the media
    #[serde(default)]
    pub extra_height: f32,
}

impl GridConfig {
    pub fn item_height(&self, item_width: f32) -> f32 {
        let media = match (self.fixed_height, self.aspect) {
            (Some(height), _) => height,
            (None, Some(aspect)) => item_width * aspect,
            (None, None) => item_width,
        };
        media + self.extra_height
    }
}

/// Static content of a card or block
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ItemConfig {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Reveal parameters as written in the config file
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct RevealPreset {
    pub threshold: f32,
    pub delay_ms: u32,
    pub duration_ms: u32,
    pub easing: Easing,
    pub from: VisualStyle,
    pub to: VisualStyle,
    pub stagger: Stagger,
}

impl Default for RevealPreset {
    fn default() -> Self {
        let base = RevealConfig::default();
        Self {
            threshold: base.threshold,
            delay_ms: base.delay_ms,
            duration_ms: base.duration_ms,
            easing: base.easing,
            from: base.from,
            to: base.to,
            stagger: Stagger::default(),
        }
    }
}

impl RevealPreset {
    /// Reveal config for the sibling at `index` of `total`
    pub fn config_for(&self, index: usize, total: usize) -> RevealConfig {
        let stagger = self.stagger.delay_for_index(index, total);
        RevealConfig::new(self.duration_ms)
            .threshold(self.threshold)
            .delay_ms(self.delay_ms.saturating_add(stagger))
            .easing(self.easing)
            .from(self.from)
            .to(self.to)
    }
}

// =============================================================================
// Loading and validation
// =============================================================================

impl PageConfig {
    /// The embedded storefront page
    pub fn storefront() -> Result<Self> {
        Self::from_toml_str(STOREFRONT_TOML)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PageConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| PageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn section(&self, id: &str) -> Option<&SectionConfig> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn binding(&self, name: &str) -> Option<&BindingConfig> {
        self.bindings.iter().find(|binding| binding.name == name)
    }

    /// Number of elements that register a reveal when the page mounts
    pub fn reveal_count(&self) -> usize {
        self.sections
            .iter()
            .map(|section| {
                let intro = usize::from(section.intro.is_some());
                let items = if section.reveal.is_some() && section.grid.is_some() {
                    section.items.len()
                } else {
                    0
                };
                intro + items
            })
            .sum()
    }

    /// Check cross references and ranges
    pub fn validate(&self) -> Result<()> {
        let mut section_ids = FxHashSet::default();
        for section in &self.sections {
            if section.id.is_empty() {
                return Err(PageError::invalid("section with empty id"));
            }
            if !section_ids.insert(section.id.as_str()) {
                return Err(PageError::invalid(format!(
                    "duplicate section id '{}'",
                    section.id
                )));
            }
            if let Some(grid) = &section.grid {
                if grid.columns.base == 0
                    || grid.columns.sm == Some(0)
                    || grid.columns.lg == Some(0)
                {
                    return Err(PageError::invalid(format!(
                        "section '{}' grid needs at least one column",
                        section.id
                    )));
                }
            }
            for preset in section.intro.iter().chain(section.reveal.iter()) {
                preset
                    .config_for(0, 1)
                    .validate()
                    .map_err(|source| PageError::Reveal {
                        section: section.id.clone(),
                        source,
                    })?;
            }
        }

        let mut binding_names = FxHashSet::default();
        for binding in &self.bindings {
            if !binding_names.insert(binding.name.as_str()) {
                return Err(PageError::invalid(format!(
                    "duplicate binding '{}'",
                    binding.name
                )));
            }
            binding.mapping()?;
            match binding.target_parts() {
                Some((section, _)) if section_ids.contains(section) => {}
                _ => {
                    return Err(PageError::UnknownTarget {
                        binding: binding.name.clone(),
                        target: binding.target.clone(),
                    })
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storefront_parses() {
        let config = PageConfig::storefront().unwrap();
        assert_eq!(config.brand.name, "ÉCLAT");
        assert_eq!(config.nav.len(), 5);
        assert_eq!(config.bindings.len(), 3);
        assert_eq!(
            config
                .sections
                .iter()
                .map(|s| s.id.as_str())
                .collect::<Vec<_>>(),
            vec!["hero", "new", "collections", "footer"]
        );
        // Hero intro + 3 cards + 3 arrivals + 2 collection blocks
        assert_eq!(config.reveal_count(), 9);
    }

    #[test]
    fn test_hero_card_reveals() {
        let config = PageConfig::storefront().unwrap();
        let reveal = config.section("hero").unwrap().reveal.unwrap();

        let delays: Vec<u32> = (0..3).map(|i| reveal.config_for(i, 3).delay_ms).collect();
        assert_eq!(delays, vec![100, 200, 300]);

        let card = reveal.config_for(0, 3);
        assert_eq!(card.threshold, 0.3);
        assert_eq!(card.duration_ms, 800);
        assert_eq!(card.easing, Easing::EaseOut);
        assert_eq!(card.from, VisualStyle::new(0.0, 20.0, 0.98));
        assert_eq!(card.to, VisualStyle::IDENTITY);
    }

    #[test]
    fn test_new_arrivals_stagger() {
        let config = PageConfig::storefront().unwrap();
        let reveal = config.section("new").unwrap().reveal.unwrap();
        let delays: Vec<u32> = (0..3).map(|i| reveal.config_for(i, 3).delay_ms).collect();
        assert_eq!(delays, vec![0, 80, 160]);
        assert_eq!(reveal.duration_ms, 700);
        assert_eq!(reveal.threshold, 0.0);
    }

    #[test]
    fn test_bindings_match_hero_motion() {
        let config = PageConfig::storefront().unwrap();
        let scene_y = config.binding("hero_scene_y").unwrap().mapping().unwrap();
        assert_eq!(scene_y.evaluate(0.5), -60.0);

        let cards_y = config.binding("hero_cards_y").unwrap().mapping().unwrap();
        assert_eq!(cards_y.evaluate(1.0), -60.0);

        let fade = config.binding("hero_scene_opacity").unwrap();
        assert_eq!(fade.property, BoundProperty::Opacity);
        assert_eq!(fade.target_parts(), Some(("hero", TargetLayer::Scene)));
    }

    #[test]
    fn test_responsive_inherits() {
        let columns = Responsive {
            base: 1,
            sm: None,
            lg: Some(2),
        };
        assert_eq!(columns.at(375.0), 1);
        assert_eq!(columns.at(800.0), 1);
        assert_eq!(columns.at(1280.0), 2);
        assert_eq!(Responsive::fixed(4).at(2000.0), 4);
    }

    #[test]
    fn test_rejects_bad_binding() {
        let toml = r#"
            [brand]
            name = "x"

            [[sections]]
            id = "hero"

            [[bindings]]
            name = "broken"
            target = "hero.scene"
            property = "opacity"
            input = [0.6, 0.2]
            output = [1.0, 0.0]
        "#;
        let err = PageConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, PageError::Binding { .. }), "{err}");
    }

    #[test]
    fn test_rejects_unknown_target() {
        let toml = r#"
            [brand]
            name = "x"

            [[bindings]]
            name = "ghost"
            target = "missing.items"
            property = "translate_y"
            input = [0.0, 1.0]
            output = [0.0, 1.0]
        "#;
        let err = PageConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, PageError::UnknownTarget { .. }));
    }

    #[test]
    fn test_rejects_bad_reveal_and_duplicates() {
        let zero_duration = r#"
            [brand]
            name = "x"

            [[sections]]
            id = "a"
            [sections.reveal]
            duration_ms = 0
        "#;
        assert!(matches!(
            PageConfig::from_toml_str(zero_duration),
            Err(PageError::Reveal { .. })
        ));

        let duplicate = r#"
            [brand]
            name = "x"

            [[sections]]
            id = "a"

            [[sections]]
            id = "a"
        "#;
        assert!(matches!(
            PageConfig::from_toml_str(duplicate),
            Err(PageError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_parse_error_surfaces() {
        assert!(matches!(
            PageConfig::from_toml_str("brand = ["),
            Err(PageError::Parse(_))
        ));
    }
}
