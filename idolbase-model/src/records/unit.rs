use super::attribute_map;
use crate::connect::ConnectOutcome;
use crate::entity::{Entity, EntityCore};
use crate::error::EntityResult;
use crate::schema::{FieldKind, Schema};
use crate::urn::DELIMITER;
use idolbase_types::{EnumSet, UnitKind};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(Unit::KIND)
        .required("name", FieldKind::String)
        .required("debutYear", FieldKind::Year4)
        .required("kind", FieldKind::Enum(EnumSet::Units))
        .optional("isPrivate", FieldKind::Boolean)
        .optional("isCustom", FieldKind::Boolean)
        .optional("artistID", FieldKind::String)
        .optional("albumIDs", FieldKind::Array)
        .optional("distributionIDs", FieldKind::Array)
        .optional("membersPositionHash", FieldKind::Object)
        .optional("membersStatsHash", FieldKind::Object)
});

/// Level meaning "no prefix" in the position hash.
const REGULAR_LEVEL: &str = "REGULAR";

/// A lineup of an artist: the main group, a sub-unit, a solo project.
///
/// Member data lives in two hashes:
/// - `membersPositionHash`: `memberID:name:POSITION` → level (`true`,
///   `"REGULAR"`, `"MAIN"`, `"LEAD"`, ...)
/// - `membersStatsHash`: `memberID` → `official:custom:total`
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    core: EntityCore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitView {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub debut_year: u16,
    #[serde(rename = "kind")]
    pub unit_kind: UnitKind,
    pub is_private: bool,
    pub is_custom: bool,
    #[serde(rename = "artistID")]
    pub artist_id: Option<String>,
    #[serde(rename = "albumIDs")]
    pub album_ids: Vec<String>,
    #[serde(rename = "distributionIDs")]
    pub distribution_ids: Vec<String>,
    pub members_snippet: Vec<UnitMemberSnippet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnitMemberSnippet {
    pub id: String,
    pub name: Option<String>,
    pub positions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<UnitMemberStats>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UnitMemberStats {
    pub official: f64,
    pub custom: f64,
    pub total: f64,
}

impl Entity for Unit {
    const KIND: &'static str = "unit";
    type View = UnitView;

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
            "kind": UnitKind::NotAvailable,
            "isPrivate": false,
            "isCustom": false,
            "albumIDs": [],
            "distributionIDs": [],
            "membersPositionHash": {},
            "membersStatsHash": {},
        }))
    }

    fn build_view(&self) -> EntityResult<UnitView> {
        let core = &self.core;
        Ok(UnitView {
            id: core.identity().map(str::to_string),
            kind: Self::KIND,
            name: core.get_str("name").unwrap_or_default().to_string(),
            debut_year: core.get_u64("debutYear").unwrap_or_default() as u16,
            unit_kind: core
                .get_str("kind")
                .and_then(|k| k.parse().ok())
                .unwrap_or_default(),
            is_private: core.get_bool("isPrivate"),
            is_custom: core.get_bool("isCustom"),
            artist_id: core.get_str("artistID").map(str::to_string),
            album_ids: core.get_strings("albumIDs"),
            distribution_ids: core.get_strings("distributionIDs"),
            members_snippet: self.members_snippet(),
        })
    }
}

impl Unit {
    /// Members assembled from the position and stats hashes, ordered by id.
    pub fn members_snippet(&self) -> Vec<UnitMemberSnippet> {
        let mut members: BTreeMap<String, UnitMemberSnippet> = BTreeMap::new();

        for (key, level) in self.core.get_object("membersPositionHash").into_iter().flatten() {
            let mut parts = key.splitn(3, DELIMITER);
            let id = parts.next().unwrap_or_default();
            let name = parts.next();
            let position = parts.next().unwrap_or_default();

            let entry = members.entry(id.to_string()).or_insert_with(|| UnitMemberSnippet {
                id: id.to_string(),
                ..Default::default()
            });
            if let Some(name) = name {
                entry.name = Some(name.to_string());
            }
            entry.positions.push(leveled_position(position, level));
        }

        for (id, stats) in self.core.get_object("membersStatsHash").into_iter().flatten() {
            let entry = members.entry(id.clone()).or_insert_with(|| UnitMemberSnippet {
                id: id.clone(),
                ..Default::default()
            });
            entry.stats = Some(parse_stats(stats.as_str().unwrap_or_default()));
        }

        members.into_values().collect()
    }

    /// Identities of every member named in either hash.
    pub fn member_ids(&self) -> Vec<String> {
        self.members_snippet().into_iter().map(|m| m.id).collect()
    }

    /// Points the unit at its artist.
    pub fn connect_artist(&mut self, artist_id: &str) -> ConnectOutcome {
        if self.core.get_str("artistID") == Some(artist_id) {
            return ConnectOutcome::AlreadyConnected;
        }
        self.core.set("artistID", json!(artist_id));
        ConnectOutcome::Connected
    }
}

/// `VOCALIST` at level `MAIN` becomes `MAIN_VOCALIST`; a regular level keeps
/// the bare position.
fn leveled_position(position: &str, level: &Value) -> String {
    match level {
        Value::String(l) if !l.is_empty() && l != REGULAR_LEVEL => format!("{l}_{position}"),
        _ => position.to_string(),
    }
}

fn parse_stats(raw: &str) -> UnitMemberStats {
    let mut parts = raw
        .split(DELIMITER)
        .map(|p| p.parse::<f64>().unwrap_or_default());
    UnitMemberStats {
        official: parts.next().unwrap_or_default(),
        custom: parts.next().unwrap_or_default(),
        total: parts.next().unwrap_or_default(),
    }
}
