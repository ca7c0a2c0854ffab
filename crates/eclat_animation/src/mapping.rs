//! Piecewise-linear scroll mappings
//!
//! A mapping turns scroll progress into a derived value such as a parallax
//! offset or an opacity. Between two breakpoints the output is linearly
//! interpolated; outside the covered range it holds the first/last output.
//!
//! ```rust
//! use eclat_animation::ScrollMapping;
//!
//! let parallax = ScrollMapping::new(&[0.0, 1.0], &[0.0, -120.0]).unwrap();
//! assert_eq!(parallax.evaluate(0.5), -60.0);
//!
//! let fade = ScrollMapping::new(&[0.0, 0.2, 0.6], &[1.0, 1.0, 0.2]).unwrap();
//! assert_eq!(fade.evaluate(0.1), 1.0);
//! assert_eq!(fade.evaluate(0.9), 0.2);
//! ```

use smallvec::SmallVec;

use crate::error::{AnimationError, Result};
use crate::values::Interpolate;

/// Breakpoints are almost always 2-4 entries long
type Points = SmallVec<[f32; 4]>;

/// A validated piecewise-linear function of scroll progress
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollMapping {
    input: Points,
    output: Points,
}

impl ScrollMapping {
    /// Build a mapping from breakpoints and the outputs at those breakpoints
    ///
    /// Breakpoints must be finite, strictly increasing and inside `[0, 1]`;
    /// there must be at least two of them and exactly one output per
    /// breakpoint.
    pub fn new(input: &[f32], output: &[f32]) -> Result<Self> {
        if input.len() != output.len() {
            return Err(AnimationError::mapping(format!(
                "{} breakpoints but {} output values",
                input.len(),
                output.len()
            )));
        }
        if input.len() < 2 {
            return Err(AnimationError::mapping(
                "at least two breakpoints are required",
            ));
        }
        if let Some(bad) = input.iter().chain(output).find(|v| !v.is_finite()) {
            return Err(AnimationError::mapping(format!(
                "non-finite value {bad} in mapping"
            )));
        }
        if let Some(bad) = input.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(AnimationError::mapping(format!(
                "breakpoint {bad} lies outside [0, 1]"
            )));
        }
        if let Some(pair) = input.windows(2).find(|w| w[1] <= w[0]) {
            return Err(AnimationError::mapping(format!(
                "breakpoints must be strictly increasing ({} then {})",
                pair[0], pair[1]
            )));
        }

        Ok(Self {
            input: SmallVec::from_slice(input),
            output: SmallVec::from_slice(output),
        })
    }

    pub fn breakpoints(&self) -> &[f32] {
        &self.input
    }

    pub fn outputs(&self) -> &[f32] {
        &self.output
    }

    /// Output at the first breakpoint
    pub fn first(&self) -> f32 {
        self.output[0]
    }

    /// Output at the last breakpoint
    pub fn last(&self) -> f32 {
        self.output[self.output.len() - 1]
    }

    /// Evaluate the mapping at `progress`
    ///
    /// Progress outside the breakpoint range (and NaN, which is read as 0)
    /// clamps to the nearest end.
    pub fn evaluate(&self, progress: f32) -> f32 {
        let progress = if progress.is_nan() { 0.0 } else { progress };
        let last = self.input.len() - 1;

        if progress <= self.input[0] {
            return self.first();
        }
        if progress >= self.input[last] {
            return self.last();
        }

        // First breakpoint strictly greater than progress; never 0 or past the end here
        let upper = self.input.partition_point(|p| *p <= progress);
        let lower = upper - 1;

        let span = self.input[upper] - self.input[lower];
        let t = (progress - self.input[lower]) / span;
        self.output[lower].lerp(&self.output[upper], t)
    }
}
