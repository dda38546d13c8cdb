use super::{Typeahead, attribute_map};
use crate::connect::ConnectOutcome;
use crate::entity::{Entity, EntityCore};
use crate::error::{EntityError, EntityResult};
use crate::schema::{FieldKind, Schema};
use crate::urn::{self, MemberArtistRef, Relationship, Snippet};
use crate::validate::split_date8;
use chrono::{Local, NaiveDate};
use idolbase_types::{EnumSet, Gender, Genre, Nationality};
use serde::Serialize;
use serde_json::{Map, Number, Value, json};
use std::sync::LazyLock;

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(Member::KIND)
        .required("name", FieldKind::String)
        .required("color", FieldKind::Number)
        .optional("birthdate", FieldKind::Date8)
        .optional("initials", FieldKind::String)
        .optional("isHidden", FieldKind::Boolean)
        .optional("isPrivate", FieldKind::Boolean)
        .required("gender", FieldKind::Enum(EnumSet::Genders))
        .required("nationality", FieldKind::Enum(EnumSet::Nationalities))
        .required("primaryGenre", FieldKind::Enum(EnumSet::Genres))
        .optional("meta", FieldKind::Object)
        .optional("positions", FieldKind::Array)
        .optional("tags", FieldKind::Array)
        .required("referenceArtists", FieldKind::Object)
});

/// A person performing in one or more artists.
///
/// The artists a member belongs to are kept as the keys of the
/// `referenceArtists` object, each a `MemberArtistUrn`.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    core: EntityCore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub initials: String,
    pub color: Number,
    pub birthdate: Option<u32>,
    pub age: u32,
    pub is_hidden: bool,
    pub is_private: bool,
    pub gender: Gender,
    pub nationality: Nationality,
    pub primary_genre: Genre,
    pub positions: Vec<String>,
    pub reference_artists_snippet: Vec<Snippet<MemberArtistRef>>,
    pub tags: Vec<String>,
    pub meta: Map<String, Value>,
}

impl Entity for Member {
    const KIND: &'static str = "member";
    type View = MemberView;

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
            "isHidden": false,
            "isPrivate": false,
            "gender": Gender::Unknown,
            "nationality": Nationality::Unknown,
            "primaryGenre": Genre::Unknown,
            "meta": {},
            "positions": [],
            "tags": [],
            "referenceArtists": {},
        }))
    }

    fn build_view(&self) -> EntityResult<MemberView> {
        let core = &self.core;
        let birthdate = self.birthdate();
        Ok(MemberView {
            id: core.identity().map(str::to_string),
            kind: Self::KIND,
            name: self.name().to_string(),
            initials: self.initials(),
            color: self.color(),
            birthdate,
            age: birthdate.map_or(0, |b| age_on(b, Local::now().date_naive())),
            is_hidden: core.get_bool("isHidden"),
            is_private: core.get_bool("isPrivate"),
            gender: parse_or_default(core.get_str("gender")),
            nationality: parse_or_default(core.get_str("nationality")),
            primary_genre: parse_or_default(core.get_str("primaryGenre")),
            positions: self.positions(),
            reference_artists_snippet: self.reference_artists_snippet()?,
            tags: core.get_strings("tags"),
            meta: core.get_object("meta").cloned().unwrap_or_default(),
        })
    }

    fn prepare_payload(&self, body: &mut Map<String, Value>) {
        if let Some(Value::Array(_)) = body.get("positions") {
            body.insert("positions".to_string(), json!(unique_sorted(self.positions())));
        }
    }
}

fn parse_or_default<T: std::str::FromStr + Default>(value: Option<&str>) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

fn unique_sorted(mut list: Vec<String>) -> Vec<String> {
    list.sort();
    list.dedup();
    list
}

/// Whole years between a `YYYYMMDD` birthdate and `today`. Zero when the
/// birthdate is not a real calendar date or lies in the future.
#[must_use]
pub fn age_on(birthdate: u32, today: NaiveDate) -> u32 {
    split_date8(u64::from(birthdate))
        .and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y as i32, m, d))
        .and_then(|born| today.years_since(born))
        .unwrap_or(0)
}

impl Member {
    pub fn name(&self) -> &str {
        self.core.get_str("name").unwrap_or_default()
    }

    pub fn color(&self) -> Number {
        match self.core.get("color") {
            Some(Value::Number(n)) => n.clone(),
            _ => Number::from(0),
        }
    }

    pub fn birthdate(&self) -> Option<u32> {
        self.core
            .get_u64("birthdate")
            .and_then(|b| u32::try_from(b).ok())
    }

    /// Stored initials, or the first and middle letters of the name.
    pub fn initials(&self) -> String {
        if let Some(initials) = self.core.get_str("initials").filter(|i| !i.is_empty()) {
            return initials.to_string();
        }
        let chars: Vec<char> = self.name().chars().collect();
        match (chars.first(), chars.get(chars.len() / 2)) {
            (Some(first), Some(middle)) => format!("{first}{middle}").to_uppercase(),
            _ => String::new(),
        }
    }

    pub fn positions(&self) -> Vec<String> {
        self.core.get_strings("positions")
    }

    pub fn reference_artists_snippet(&self) -> EntityResult<Vec<Snippet<MemberArtistRef>>> {
        let tokens = self.core.get_object("referenceArtists");
        let tokens = tokens.into_iter().flat_map(|m| m.keys().map(String::as_str));
        Ok(urn::decode_sorted(tokens)?)
    }

    /// Artist names joined, lower-cased, with brackets stripped.
    pub fn reference_artists_query(&self) -> EntityResult<String> {
        let names: String = self
            .reference_artists_snippet()?
            .iter()
            .map(|a| format!(" {}", a.name))
            .collect();
        let stripped: String = names
            .chars()
            .filter(|c| !matches!(c, '{' | '(' | ')' | '}'))
            .collect();
        Ok(stripped.to_lowercase().trim().to_string())
    }

    pub fn typeahead(&self) -> EntityResult<Typeahead> {
        let artists = self.reference_artists_snippet()?;
        let main_artist = artists.first().map(|a| a.name.as_str()).unwrap_or_default();
        Ok(Typeahead {
            value: self.core.identity().map(str::to_string),
            text: format!("{} ({main_artist})", self.name()),
            query: format!("{} {}", self.name(), self.reference_artists_query()?),
        })
    }

    /// JSON:API relationships object.
    pub fn relationships(&self) -> EntityResult<Value> {
        let artists: Vec<Value> = self
            .reference_artists_snippet()?
            .iter()
            .map(|a| json!({ "type": "artist", "id": a.id }))
            .collect();
        Ok(json!({
            "artists": { "data": artists },
            "color": { "data": { "type": "color", "id": self.color() } },
        }))
    }

    /// Records membership in an artist.
    pub fn add_reference_artist(
        &mut self,
        artist_id: &str,
        artist_name: &str,
    ) -> EntityResult<Vec<Snippet<MemberArtistRef>>> {
        self.connect_reference_artist(artist_id, artist_name)?;
        self.reference_artists_snippet()
    }

    /// Like [`Member::add_reference_artist`], reporting whether the link was new.
    pub fn connect_reference_artist(
        &mut self,
        artist_id: &str,
        artist_name: &str,
    ) -> EntityResult<ConnectOutcome> {
        if artist_id.is_empty() || artist_name.is_empty() {
            return Err(EntityError::MissingArgument(
                "artistID and artistName are required to add referenceArtistUrn".to_string(),
            ));
        }
        let token = MemberArtistRef {
            id: artist_id.to_string(),
            name: artist_name.to_string(),
        }
        .encode()?;

        let mut references = self
            .core
            .get_object("referenceArtists")
            .cloned()
            .unwrap_or_default();
        if references.contains_key(&token) {
            return Ok(ConnectOutcome::AlreadyConnected);
        }
        references.insert(token, Value::Bool(true));
        self.core.set("referenceArtists", Value::Object(references));
        Ok(ConnectOutcome::Connected)
    }

    /// Adds a position, keeping the list unique and sorted.
    pub fn add_position(&mut self, position: &str) -> EntityResult<Vec<String>> {
        if position.is_empty() {
            return Err(EntityError::MissingArgument("position is required".to_string()));
        }
        let mut positions = self.positions();
        positions.push(position.to_string());
        let positions = unique_sorted(positions);
        self.core.set("positions", json!(positions));
        Ok(positions)
    }

    pub fn remove_position(&mut self, position: &str) -> EntityResult<Vec<String>> {
        if position.is_empty() {
            return Err(EntityError::MissingArgument("position is required".to_string()));
        }
        let mut positions = self.positions();
        if let Some(index) = positions.iter().position(|p| p == position) {
            positions.remove(index);
        }
        self.core.set("positions", json!(positions));
        Ok(positions)
    }
}
