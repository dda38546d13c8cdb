//! Entity model for Idolbase.
//!
//! Defines the framework every catalog record is built on:
//! - [`Schema`] / [`FieldDescriptor`]: declarative field lists
//! - [`validate()`]: fail-fast schema validation
//! - [`Entity`] / [`EntityCore`]: identity, kind, merge, normalized views and
//!   persistence payloads with known-value suppression
//! - [`urn`]: the colon-delimited relationship token codec
//!
//! plus the concrete record kinds ([`Artist`], [`Member`], [`Unit`],
//! [`Album`]) and [`connect`] helpers that wire them together.

pub mod connect;
mod entity;
mod error;
pub mod records;
mod schema;
pub mod urn;
mod validate;

pub use connect::{ConnectOutcome, connect_artist_member, connect_artist_unit};
pub use entity::{Entity, EntityCore, MergePolicy, PersistencePayload, is_falsy};
pub use error::{EntityError, EntityResult};
pub use records::{Album, Artist, Member, Typeahead, Unit};
pub use schema::{FieldDescriptor, FieldKind, Schema};
pub use urn::{Relationship, Snippet, UrnError};
pub use validate::{ValidationError, split_date8, validate, value_category};
