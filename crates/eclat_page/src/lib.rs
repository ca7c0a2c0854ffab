//! Éclat Page
//!
//! The storefront landing page as data plus a headless runtime:
//!
//! - [`PageConfig`]: brand, navigation, sections, items, scroll bindings and
//!   reveal presets, loaded from TOML
//! - [`PageLayout`]: responsive block/grid layout producing document-space
//!   element bounds
//! - [`PageRuntime`]: wires the layout to the scroll tracker and the reveal
//!   controller and runs them once per frame

pub mod config;
pub mod error;
pub mod layout;
pub mod runtime;

pub use config::{
    BindingConfig, BoundProperty, BrandConfig, ContainerConfig, GridConfig, ItemConfig, NavLink,
    PageConfig, Responsive, RevealPreset, SectionConfig, TargetLayer, STOREFRONT_TOML,
};
pub use error::{PageError, Result};
pub use layout::{LayerKey, LayerStyles, LayoutElement, PageLayout, PageView, SectionLayout, Slot};
pub use runtime::{BindingValue, FrameReport, PageRuntime};
