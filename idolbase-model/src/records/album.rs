use super::{Typeahead, attribute_map};
use crate::entity::{Entity, EntityCore};
use crate::error::EntityResult;
use crate::schema::{FieldKind, Schema};
use crate::urn::{self, AlbumArtistRef, AlbumSongRef, Relationship, Snippet};
use idolbase_types::{AlbumCategory, EnumSet};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::sync::LazyLock;

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(Album::KIND)
        .required("name", FieldKind::String)
        .required("artistUrn", FieldKind::String)
        .required("category", FieldKind::Enum(EnumSet::Albums))
        .optional("isPrivate", FieldKind::Boolean)
        .optional("releaseDate", FieldKind::Date8)
        .optional("tracklistUrns", FieldKind::Array)
});

/// A release. The credited artist is an `AlbumArtistUrn`; the tracklist is an
/// ordered list of `AlbumSongUrn`s.
#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    core: EntityCore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumView {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub is_private: bool,
    pub category: AlbumCategory,
    pub release_date: Option<u32>,
    pub tracklist: Vec<Track>,
    pub artist_name: String,
    pub artist_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub title: String,
    pub id: Option<String>,
    pub track_number: usize,
}

impl Entity for Album {
    const KIND: &'static str = "album";
    type View = AlbumView;

    fn schema() -> &'static Schema {
        &SCHEMA
    }

    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn from_core(core: EntityCore) -> Self {
        Self { core }
    }

    fn initial_attributes() -> Map<String, Value> {
        attribute_map(json!({
            "category": AlbumCategory::Unknown,
            "isPrivate": false,
            "tracklistUrns": [],
        }))
    }

    fn build_view(&self) -> EntityResult<AlbumView> {
        let core = &self.core;
        let artist = self.artist_snippet()?.into_inner();
        Ok(AlbumView {
            id: core.identity().map(str::to_string),
            kind: Self::KIND,
            name: self.name().to_string(),
            is_private: core.get_bool("isPrivate"),
            category: core
                .get_str("category")
                .and_then(|c| c.parse().ok())
                .unwrap_or_default(),
            release_date: core
                .get_u64("releaseDate")
                .and_then(|d| u32::try_from(d).ok()),
            tracklist: self.tracklist()?,
            artist_name: artist.name,
            artist_id: artist.id,
        })
    }
}

impl Album {
    pub fn name(&self) -> &str {
        self.core.get_str("name").unwrap_or_default()
    }

    pub fn artist_snippet(&self) -> EntityResult<Snippet<AlbumArtistRef>> {
        let token = self.core.get_str("artistUrn").unwrap_or_default();
        Ok(urn::decode::<AlbumArtistRef>(token)?)
    }

    /// Tracks in stored order; numbering starts at 1.
    pub fn tracklist(&self) -> EntityResult<Vec<Track>> {
        self.core
            .get_strings("tracklistUrns")
            .iter()
            .enumerate()
            .map(|(index, token)| -> EntityResult<Track> {
                let song = urn::decode::<AlbumSongRef>(token)?.into_inner();
                Ok(Track {
                    title: song.title,
                    id: song.id,
                    track_number: index + 1,
                })
            })
            .collect()
    }

    pub fn query(&self) -> EntityResult<String> {
        let titles: Vec<String> = self.tracklist()?.into_iter().map(|t| t.title).collect();
        let query = format!(
            "{} {} {}",
            self.name(),
            self.artist_snippet()?.name,
            titles.join(" ")
        );
        Ok(query.to_lowercase().trim().to_string())
    }

    pub fn typeahead(&self) -> EntityResult<Typeahead> {
        Ok(Typeahead {
            value: self.core.identity().map(str::to_string),
            text: format!("{} ({})", self.name(), self.artist_snippet()?.name),
            query: self.query()?,
        })
    }

    /// JSON:API relationships object. Unlinked artists and tracks are left out.
    pub fn relationships(&self) -> EntityResult<Value> {
        let mut result = Map::new();

        if let Some(artist_id) = self.artist_snippet()?.into_inner().id {
            result.insert(
                "artist".to_string(),
                json!({ "data": { "type": "artist", "id": artist_id } }),
            );
        }

        let songs: Vec<Value> = self
            .tracklist()?
            .into_iter()
            .filter_map(|track| track.id)
            .map(|id| json!({ "type": "song", "id": id }))
            .collect();
        if !songs.is_empty() {
            result.insert("songs".to_string(), json!({ "data": songs }));
        }

        Ok(Value::Object(result))
    }

    /// Places a track at `track_number` (1-based), replacing what was there.
    /// Zero, or a number past the end, appends.
    pub fn add_track(
        &mut self,
        title: &str,
        song_id: Option<&str>,
        track_number: usize,
    ) -> EntityResult<Vec<Track>> {
        let token = AlbumSongRef {
            title: title.to_string(),
            id: song_id.map(str::to_string),
        }
        .encode()?;

        let mut tokens = self.core.get_strings("tracklistUrns");
        match track_number.checked_sub(1) {
            Some(position) if position < tokens.len() => tokens[position] = token,
            _ => tokens.push(token),
        }
        self.core.set("tracklistUrns", json!(tokens));
        self.tracklist()
    }
}
