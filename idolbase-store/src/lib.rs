//! In-memory storage layer for Idolbase.
//!
//! A [`Collection`] holds records of one entity kind keyed by identity and
//! tracks whether it has changed since it was seeded or last refreshed.
//! Persisting a collection is left to the host: it reads
//! [`Entity::persistence_payload`](idolbase_model::Entity::persistence_payload)
//! from each record while [`Collection::is_dirty`] is set, then calls
//! [`Collection::refresh`].

mod collection;
mod error;

pub use collection::{Collection, Incoming};
pub use error::{CollectionError, CollectionResult};
