//! Stagger helpers
//!
//! Cascading reveals are plain per-element delays. The controller never
//! derives them; callers compute one delay per sibling with [`Stagger`] and
//! pass it in the element's [`RevealConfig`](crate::RevealConfig).

use serde::{Deserialize, Serialize};

/// Order in which siblings start
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaggerDirection {
    /// First to last
    #[default]
    Forward,
    /// Last to first
    Reverse,
    /// From the center outward
    FromCenter,
}

/// Delay cascade for a group of siblings
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stagger {
    /// Delay before the first sibling starts (ms)
    pub base_ms: u32,
    /// Delay added per sibling (ms)
    pub step_ms: u32,
    pub direction: StaggerDirection,
    /// Cap the cascade after N steps
    pub limit: Option<usize>,
}

impl Stagger {
    pub fn new(step_ms: u32) -> Self {
        Self {
            step_ms,
            ..Default::default()
        }
    }

    /// Start the cascade after `base_ms`
    pub fn starting_at(mut self, base_ms: u32) -> Self {
        self.base_ms = base_ms;
        self
    }

    pub fn reverse(mut self) -> Self {
        self.direction = StaggerDirection::Reverse;
        self
    }

    pub fn from_center(mut self) -> Self {
        self.direction = StaggerDirection::FromCenter;
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Delay for the sibling at `index` out of `total`
    pub fn delay_for_index(&self, index: usize, total: usize) -> u32 {
        let effective_index = match self.direction {
            StaggerDirection::Forward => index,
            StaggerDirection::Reverse => total.saturating_sub(1).saturating_sub(index),
            StaggerDirection::FromCenter => index.abs_diff(total / 2),
        };

        let capped_index = match self.limit {
            Some(limit) => effective_index.min(limit),
            None => effective_index,
        };

        self.base_ms
            .saturating_add(self.step_ms.saturating_mul(capped_index as u32))
    }
}

/// `index * step_ms`, the common forward cascade
pub fn stagger_delay(index: usize, step_ms: u32) -> u32 {
    Stagger::new(step_ms).delay_for_index(index, index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward() {
        let stagger = Stagger::new(80);
        let delays: Vec<u32> = (0..3).map(|i| stagger.delay_for_index(i, 3)).collect();
        assert_eq!(delays, vec![0, 80, 160]);
        assert_eq!(stagger_delay(2, 100), 200);
    }

    #[test]
    fn test_base_offset() {
        // Hero cards: 100ms, 200ms, 300ms
        let stagger = Stagger::new(100).starting_at(100);
        let delays: Vec<u32> = (0..3).map(|i| stagger.delay_for_index(i, 3)).collect();
        assert_eq!(delays, vec![100, 200, 300]);
    }

    #[test]
    fn test_reverse_and_center() {
        let reverse = Stagger::new(10).reverse();
        assert_eq!(reverse.delay_for_index(0, 4), 30);
        assert_eq!(reverse.delay_for_index(3, 4), 0);

        let center = Stagger::new(10).from_center();
        assert_eq!(center.delay_for_index(2, 5), 0);
        assert_eq!(center.delay_for_index(0, 5), 20);
        assert_eq!(center.delay_for_index(4, 5), 20);
    }

    #[test]
    fn test_limit() {
        let stagger = Stagger::new(50).limit(2);
        assert_eq!(stagger.delay_for_index(10, 12), 100);
    }
}
