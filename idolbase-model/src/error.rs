//! Error types for entities.

use crate::urn::UrnError;
use crate::validate::ValidationError;
use thiserror::Error;

/// Result type for entity operations.
pub type EntityResult<T> = Result<T, EntityError>;

/// Errors raised by the entity contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// Entity constructed without a kind tag.
    #[error("You must assign a type")]
    MissingTypeTag,

    /// Schema validation failed. `kind` is the capitalized entity kind.
    #[error("{kind} validation has failed: {source}")]
    Validation {
        kind: String,
        #[source]
        source: ValidationError,
    },

    /// Operation needs a persisted identity.
    #[error("Failed to validate {kind} ID")]
    MissingIdentity { kind: String },

    /// A payload declared a different kind than the entity's own.
    #[error("Failed to validate type. Expected '{expected}', instead got '{actual}'")]
    KindMismatch { expected: String, actual: String },

    /// Relationship token could not be built or read.
    #[error(transparent)]
    Urn(#[from] UrnError),

    /// A helper was called without a required argument.
    #[error("{0}")]
    MissingArgument(String),
}

impl EntityError {
    /// The inner validation error, if this is a validation failure.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation { source, .. } => Some(source),
            _ => None,
        }
    }
}
