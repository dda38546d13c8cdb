//! Catalog record kinds.
//!
//! Each kind is a thin wrapper over [`EntityCore`](crate::EntityCore): a
//! schema, initial attribute values, a typed read view and a few helpers for
//! maintaining its relationship tokens.

mod album;
mod artist;
mod member;
mod unit;

pub use album::{Album, AlbumView, Track};
pub use artist::{Artist, ArtistView};
pub use member::{Member, MemberView, age_on};
pub use unit::{Unit, UnitMemberSnippet, UnitMemberStats, UnitView};

use serde::Serialize;

/// Compact projection used by search-as-you-type widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Typeahead {
    pub value: Option<String>,
    pub text: String,
    pub query: String,
}

/// Unwraps a `json!({...})` literal into its map.
fn attribute_map(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}
