//! Error types for eclat_page

use std::path::PathBuf;

use eclat_animation::AnimationError;
use thiserror::Error;

/// Errors raised while loading or mounting a page
#[derive(Error, Debug)]
pub enum PageError {
    /// Config file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid TOML for this schema
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Structurally valid config with inconsistent content
    #[error("invalid page config: {0}")]
    InvalidConfig(String),

    /// A scroll binding has malformed breakpoints
    #[error("binding '{binding}': {source}")]
    Binding {
        binding: String,
        #[source]
        source: AnimationError,
    },

    /// A binding targets a section layer that does not exist
    #[error("binding '{binding}' targets unknown layer '{target}'")]
    UnknownTarget { binding: String, target: String },

    /// A section's reveal preset is out of range
    #[error("section '{section}': {source}")]
    Reveal {
        section: String,
        #[source]
        source: AnimationError,
    },

    /// Registration failed while mounting
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

impl PageError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        PageError::InvalidConfig(reason.into())
    }
}

/// Result type for eclat_page operations
pub type Result<T> = std::result::Result<T, PageError>;
