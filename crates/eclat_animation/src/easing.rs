//! Easing curves
//!
//! Maps normalized animation time to normalized progress. The named CSS
//! curves (`ease-in`, `ease-out`, `ease-in-out`) are evaluated as the cubic
//! béziers browsers use, so reveals feel the same as their CSS counterparts.

use serde::{Deserialize, Serialize};

/// Easing function applied to normalized time
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed
    Linear,
    /// `cubic-bezier(0.42, 0, 1, 1)`
    EaseIn,
    /// `cubic-bezier(0, 0, 0.58, 1)`: fast start, slow finish
    #[default]
    EaseOut,
    /// `cubic-bezier(0.42, 0, 0.58, 1)`
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInCubic,
    EaseOutCubic,
    /// Custom CSS-style bézier with control points `(x1, y1, x2, y2)`
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Apply the curve to `t`, clamped to `[0, 1]`
    ///
    /// Every curve maps 0 to 0 and 1 to 1.
    pub fn apply(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        match *self {
            Easing::Linear => t,
            Easing::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Easing::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Easing::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(x1, y1, x2, y2, t),
        }
    }
}

/// Evaluate a CSS cubic bézier (endpoints fixed at (0,0) and (1,1)) at `x`
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    // CSS requires x control points inside [0, 1] so the curve is a function of x
    let x1 = x1.clamp(0.0, 1.0);
    let x2 = x2.clamp(0.0, 1.0);

    let sample = |a1: f32, a2: f32, t: f32| {
        let u = 1.0 - t;
        3.0 * u * u * t * a1 + 3.0 * u * t * t * a2 + t * t * t
    };
    let slope = |a1: f32, a2: f32, t: f32| {
        let u = 1.0 - t;
        3.0 * u * u * a1 + 6.0 * u * t * (a2 - a1) + 3.0 * t * t * (1.0 - a2)
    };

    // Newton-Raphson first, bisection if the slope flattens out
    let mut t = x;
    for _ in 0..8 {
        let err = sample(x1, x2, t) - x;
        if err.abs() < 1e-6 {
            return sample(y1, y2, t);
        }
        let d = slope(x1, x2, t);
        if d.abs() < 1e-6 {
            break;
        }
        t = (t - err / d).clamp(0.0, 1.0);
    }

    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    t = x;
    for _ in 0..32 {
        let current = sample(x1, x2, t);
        if (current - x).abs() < 1e-6 {
            break;
        }
        if current < x {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) * 0.5;
    }

    sample(y1, y2, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 9] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::CubicBezier(0.25, 0.1, 0.25, 1.0),
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?}");
        }
    }

    #[test]
    fn test_out_of_range_clamps() {
        for easing in ALL {
            assert_eq!(easing.apply(-0.5), 0.0);
            assert_eq!(easing.apply(1.5), 1.0);
            assert_eq!(easing.apply(f32::NAN), 0.0);
        }
    }

    #[test]
    fn test_ease_out_is_front_loaded() {
        // Fast start, slow finish: more than half the distance in the first half
        let mid = Easing::EaseOut.apply(0.5);
        assert!(mid > 0.5, "ease-out at 0.5 was {mid}");
        assert!(Easing::EaseIn.apply(0.5) < 0.5);
        assert!((Easing::EaseInOut.apply(0.5) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_monotonic() {
        for easing in ALL {
            let mut prev = 0.0;
            for i in 1..=100 {
                let v = easing.apply(i as f32 / 100.0);
                assert!(v + 1e-4 >= prev, "{easing:?} not monotonic at {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn test_linear_bezier_matches_linear() {
        let bezier = Easing::CubicBezier(0.0, 0.0, 1.0, 1.0);
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!((bezier.apply(t) - t).abs() < 1e-3);
        }
    }
}
