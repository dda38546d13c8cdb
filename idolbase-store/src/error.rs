//! Error types for the storage layer.

use idolbase_model::EntityError;
use thiserror::Error;

/// Result type for collection operations.
pub type CollectionResult<T> = Result<T, CollectionError>;

/// Errors that can occur in collection operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    /// Collection constructed with an empty name.
    #[error("You must assign a collection name, usually the pluralized entity kind")]
    MissingCollectionName,

    /// Collection bound to an entity type without a kind tag.
    #[error("You must assign an entity kind")]
    MissingEntityKind,

    /// The data passed in carries an identity other than the key it was
    /// passed with.
    #[error(
        "The provided id '{identity}' and the id inside the data object '{embedded}' do not match"
    )]
    IdentityConflict { identity: String, embedded: String },

    /// No record under that identity.
    #[error("Failed to find record of id {identity} in {collection}")]
    RecordNotFound { identity: String, collection: String },

    /// Construction, merge or validation of a record failed.
    #[error(transparent)]
    Entity(#[from] EntityError),
}
