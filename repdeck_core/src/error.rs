//! Error types for the repdeck_core library.

use crate::PhaseState;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for repdeck_core operations
///
/// None of these are fatal: every domain error is local to one card or
/// session and can be recovered from by resetting that card.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Exercise has both or neither base value, or a zero base value
    #[error("Invalid exercise definition '{exercise_id}': {reason}")]
    InvalidExerciseDefinition { exercise_id: String, reason: String },

    /// Operation not allowed in the current phase (UI/engine desync)
    #[error("Illegal transition: cannot {operation} while {state}")]
    IllegalTransition {
        operation: &'static str,
        state: PhaseState,
    },

    /// Skip requested without privilege
    #[error("Skip denied: caller is not authorized")]
    UnauthorizedSkip,

    /// Card operation issued with no card drawn
    #[error("No card is currently in play")]
    NoActiveCard,

    /// Draw attempted while the previous card is unresolved
    #[error("Card '{0}' is still in play")]
    CardInProgress(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error is a recoverable desync diagnostic
    pub fn is_illegal_transition(&self) -> bool {
        matches!(self, Error::IllegalTransition { .. })
    }
}
