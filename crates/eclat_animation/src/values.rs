//! Animatable value types
//!
//! Provides the [`Interpolate`] trait and the [`VisualStyle`] record that
//! reveal animations transition between.

use serde::{Deserialize, Serialize};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal (for change detection)
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

// ============================================================================
// f32 Implementation
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

// ============================================================================
// Visual Style
// ============================================================================

/// The visual properties a reveal animates
///
/// `translate_y` is in pixels (positive moves down), `scale` is uniform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualStyle {
    pub opacity: f32,
    #[serde(alias = "y")]
    pub translate_y: f32,
    pub scale: f32,
}

impl VisualStyle {
    /// Fully visible, untransformed
    pub const IDENTITY: VisualStyle = VisualStyle {
        opacity: 1.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    pub const fn new(opacity: f32, translate_y: f32, scale: f32) -> Self {
        Self {
            opacity,
            translate_y,
            scale,
        }
    }

    /// Hidden and pushed down by `offset` pixels
    pub const fn hidden_below(offset: f32) -> Self {
        Self {
            opacity: 0.0,
            translate_y: offset,
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn is_finite(&self) -> bool {
        self.opacity.is_finite() && self.translate_y.is_finite() && self.scale.is_finite()
    }
}

impl Default for VisualStyle {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Interpolate for VisualStyle {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            opacity: self.opacity.lerp(&other.opacity, t),
            translate_y: self.translate_y.lerp(&other.translate_y, t),
            scale: self.scale.lerp(&other.scale, t),
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.opacity.approx_eq(&other.opacity, epsilon)
            && self.translate_y.approx_eq(&other.translate_y, epsilon)
            && self.scale.approx_eq(&other.scale, epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_interpolation() {
        assert!((0.0_f32.lerp(&1.0, 0.5) - 0.5).abs() < 1e-6);
        assert!((10.0_f32.lerp(&20.0, 0.25) - 12.5).abs() < 1e-6);
    }

    #[test]
    fn test_style_interpolation() {
        let from = VisualStyle::hidden_below(20.0).with_scale(0.98);
        let mid = from.lerp(&VisualStyle::IDENTITY, 0.5);

        assert!((mid.opacity - 0.5).abs() < 1e-6);
        assert!((mid.translate_y - 10.0).abs() < 1e-6);
        assert!((mid.scale - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_style_endpoints() {
        let from = VisualStyle::hidden_below(20.0);
        assert_eq!(from.lerp(&VisualStyle::IDENTITY, 0.0), from);
        assert!(from
            .lerp(&VisualStyle::IDENTITY, 1.0)
            .approx_eq(&VisualStyle::IDENTITY, 1e-6));
    }
}
