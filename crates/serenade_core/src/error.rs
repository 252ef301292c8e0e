//! Error types shared across the serenade crates

use thiserror::Error;

use crate::element::ElementId;

/// Errors that can occur while wiring or driving page animations
///
/// None of these are fatal to the page: callers degrade to a static,
/// unanimated presentation.
#[derive(Error, Debug)]
pub enum SerenadeError {
    /// Target element is not mounted yet, so it cannot be measured
    #[error("element {0:?} is not mounted")]
    ElementNotMounted(ElementId),

    /// Boundary expression could not be parsed
    #[error("invalid trigger boundary: {0}")]
    InvalidBoundary(String),

    /// Easing name could not be parsed
    #[error("unknown easing function: {0}")]
    InvalidEasing(String),

    /// Timeline definition is malformed
    #[error("invalid timeline: {0}")]
    InvalidTimeline(String),

    /// Image or video failed to load
    #[error("media failed to load for {element:?}: {reason}")]
    MediaLoad { element: ElementId, reason: String },

    /// Configuration could not be read
    #[error("configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for SerenadeError {
    fn from(err: anyhow::Error) -> Self {
        SerenadeError::Other(err.to_string())
    }
}

/// Result type for serenade operations
pub type Result<T> = std::result::Result<T, SerenadeError>;
