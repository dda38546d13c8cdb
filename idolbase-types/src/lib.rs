//! Core type definitions for Idolbase.
//!
//! This crate defines the leaf types every other crate depends on:
//! - The enumeration registry (genres, nationalities, positions, ...)
//! - Record identifiers
//! - Monotonic timestamps used for collection dirty tracking
//!
//! Record schemas, validation and the relationship codec live in
//! `idolbase-model`.

pub mod enums;
mod ids;
mod timestamp;

pub use enums::{
    AlbumCategory, EnumError, EnumSet, Gender, Genre, NOT_AVAILABLE, Nationality, Position,
    UNKNOWN, UnitKind, is_known_value, is_member, list_values,
};
pub use ids::RecordId;
pub use timestamp::CollectionTimestamp;
