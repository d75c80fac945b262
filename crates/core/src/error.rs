//! Validation error model.

use thiserror::Error;

/// Result type used by target resolution and command building.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Local, fail-fast validation failure.
///
/// These are raised before anything is sent; a command that fails validation never
/// reaches the dispatcher.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No environment, platform, uuid or hostname survived resolution.
    #[error("no targets have been specified")]
    NoTargets,

    /// Query text or carve path was empty or whitespace-only.
    #[error("{what} can not be empty")]
    EmptyPayload { what: &'static str },

    /// A named entity (user, setting, environment, tag) had a blank name.
    #[error("name can not be empty")]
    EmptyName,

    /// An identifier failed to parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A destructive action was built without an affirmed confirmation.
    #[error("destructive action requires confirmation")]
    Unconfirmed,
}

impl ValidationError {
    pub fn empty_payload(what: &'static str) -> Self {
        Self::EmptyPayload { what }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
