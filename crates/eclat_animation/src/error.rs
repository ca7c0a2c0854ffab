//! Error types for eclat_animation

use eclat_core::ElementId;
use thiserror::Error;

/// Misconfiguration detected when registering animations
///
/// These are development-time errors: the caller has to fix the
/// configuration, nothing is retried. Degenerate geometry (no scroll range,
/// zero-area elements) is not an error and never surfaces here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Scroll mapping breakpoints/outputs are malformed
    #[error("invalid scroll mapping: {reason}")]
    InvalidMapping { reason: String },

    /// The element already has a live reveal registration
    #[error("{0} is already registered for a reveal; deregister it first")]
    DuplicateRegistration(ElementId),

    /// Reveal parameters are out of range
    #[error("invalid reveal configuration: {reason}")]
    InvalidReveal { reason: String },
}

impl AnimationError {
    pub(crate) fn mapping(reason: impl Into<String>) -> Self {
        AnimationError::InvalidMapping {
            reason: reason.into(),
        }
    }

    pub(crate) fn reveal(reason: impl Into<String>) -> Self {
        AnimationError::InvalidReveal {
            reason: reason.into(),
        }
    }
}

/// Result type for eclat_animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
