use super::attribute_map;
use crate::connect::ConnectOutcome;
use crate::entity::{Entity, EntityCore};
use crate::error::EntityResult;
use crate::schema::{FieldKind, Schema};
use crate::urn::{self, ArtistMemberRef, Relationship, Snippet};
use idolbase_types::{EnumSet, Genre, UNKNOWN};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::sync::LazyLock;

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(Artist::KIND)
        .required("name", FieldKind::String)
        .required("genre", FieldKind::Enum(EnumSet::Genres))
        .optional("agency", FieldKind::String)
        .optional("otherNames", FieldKind::String)
        .optional("isPrivate", FieldKind::Boolean)
        .optional("isDisbanded", FieldKind::Boolean)
        .optional("disbandYear", FieldKind::Year4)
        .optional("isSoloist", FieldKind::Boolean)
        .optional("unitIDs", FieldKind::Array)
        .optional("memberUrns", FieldKind::Array)
});

/// A group or soloist act.
///
/// Members are embedded as `ArtistMemberUrn` tokens; units are referenced by
/// identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    core: EntityCore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistView {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub agency: String,
    pub genre: Genre,
    pub other_names: String,
    pub is_private: bool,
    pub is_disbanded: bool,
    pub disband_year: Option<u16>,
    pub is_soloist: bool,
    #[serde(rename = "unitIDs")]
    pub unit_ids: Vec<String>,
    pub members_snippet: Vec<Snippet<ArtistMemberRef>>,
    pub query: String,
}

impl Entity for Artist {
    const KIND: &'static str = "artist";
    type View = ArtistView;

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
            "genre": Genre::Unknown,
            "otherNames": "",
            "isPrivate": false,
            "isDisbanded": false,
            "isSoloist": false,
            "unitIDs": [],
            "memberUrns": [],
        }))
    }

    fn build_view(&self) -> EntityResult<ArtistView> {
        let core = &self.core;
        let disband_year = core.get_u64("disbandYear").map(|y| y as u16);
        Ok(ArtistView {
            id: core.identity().map(str::to_string),
            kind: Self::KIND,
            name: self.name().to_string(),
            agency: core.get_str("agency").unwrap_or(UNKNOWN).to_string(),
            genre: self.genre(),
            other_names: core.get_str("otherNames").unwrap_or_default().to_string(),
            is_private: core.get_bool("isPrivate"),
            is_disbanded: core.get_bool("isDisbanded") || disband_year.is_some(),
            disband_year,
            is_soloist: core.get_bool("isSoloist"),
            unit_ids: core.get_strings("unitIDs"),
            members_snippet: self.members_snippet()?,
            query: self.query()?,
        })
    }
}

impl Artist {
    pub fn name(&self) -> &str {
        self.core.get_str("name").unwrap_or_default()
    }

    pub fn genre(&self) -> Genre {
        self.core
            .get_str("genre")
            .and_then(|g| g.parse().ok())
            .unwrap_or_default()
    }

    /// Member tokens decoded in token order.
    pub fn members_snippet(&self) -> EntityResult<Vec<Snippet<ArtistMemberRef>>> {
        let tokens = self.core.get_strings("memberUrns");
        Ok(urn::decode_sorted(tokens.iter().map(String::as_str))?)
    }

    /// Lower-cased search string: name, other names, member names, agency.
    pub fn query(&self) -> EntityResult<String> {
        let member_names: Vec<String> = self
            .members_snippet()?
            .into_iter()
            .map(|m| m.into_inner().name)
            .collect();
        let query = format!(
            "{} {} {} {}",
            self.name(),
            self.core.get_str("otherNames").unwrap_or_default(),
            member_names.join(" "),
            self.core.get_str("agency").unwrap_or_default(),
        );
        Ok(query.to_lowercase().trim().to_string())
    }

    /// Appends a member token and returns the updated snippet list.
    pub fn add_member_urn(
        &mut self,
        member: &ArtistMemberRef,
    ) -> EntityResult<Vec<Snippet<ArtistMemberRef>>> {
        let token = member.encode()?;
        let mut tokens = self.core.get_strings("memberUrns");
        tokens.push(token);
        self.core.set("memberUrns", json!(tokens));
        self.members_snippet()
    }

    /// Adds a member token unless an identical one is already present.
    pub fn connect_member(&mut self, member: &ArtistMemberRef) -> EntityResult<ConnectOutcome> {
        let token = member.encode()?;
        if self.core.get_strings("memberUrns").contains(&token) {
            return Ok(ConnectOutcome::AlreadyConnected);
        }
        self.add_member_urn(member)?;
        Ok(ConnectOutcome::Connected)
    }

    /// Adds a unit identity unless it is already listed.
    pub fn connect_unit(&mut self, unit_id: &str) -> ConnectOutcome {
        let mut unit_ids = self.core.get_strings("unitIDs");
        if unit_ids.iter().any(|id| id == unit_id) {
            return ConnectOutcome::AlreadyConnected;
        }
        unit_ids.push(unit_id.to_string());
        self.core.set("unitIDs", json!(unit_ids));
        ConnectOutcome::Connected
    }
}
