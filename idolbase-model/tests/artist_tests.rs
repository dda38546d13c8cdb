use idolbase_model::urn::ArtistMemberRef;
use idolbase_model::{Artist, ConnectOutcome, Entity, EntityError, UrnError};
use idolbase_types::Genre;
use pretty_assertions::assert_eq;
use serde_json::json;

fn member(id: &str, birthdate: &str, name: &str, color: &str) -> ArtistMemberRef {
    ArtistMemberRef {
        id: id.into(),
        birthdate: birthdate.into(),
        name: name.into(),
        color_id: color.into(),
    }
}

fn artist() -> Artist {
    Artist::with_attributes(
        Some("a1"),
        &json!({ "name": "BLACKPINK", "genre": "KPOP", "otherNames": "BP" }),
    )
    .unwrap()
}

// ── View ─────────────────────────────────────────────────────────

#[test]
fn view_fills_defaults() {
    let view = Artist::with_attributes(None, &json!({ "name": "IU" }))
        .unwrap()
        .normalized_view()
        .unwrap();
    assert_eq!(view.kind, "artist");
    assert_eq!(view.agency, "UNKNOWN");
    assert_eq!(view.genre, Genre::Unknown);
    assert_eq!(view.other_names, "");
    assert!(!view.is_private);
    assert!(!view.is_disbanded);
    assert_eq!(view.disband_year, None);
    assert!(view.unit_ids.is_empty());
    assert!(view.members_snippet.is_empty());
    assert_eq!(view.query, "iu");
}

#[test]
fn disband_year_implies_disbanded() {
    let mut a = artist();
    let view = a.merge(&json!({ "disbandYear": 2023 })).unwrap();
    assert!(view.is_disbanded);
    assert_eq!(view.disband_year, Some(2023));
}

#[test]
fn view_serializes_with_wire_names() {
    let view = artist().normalized_view().unwrap();
    let value = serde_json::to_value(&view).unwrap();
    assert_eq!(value["type"], "artist");
    assert_eq!(value["id"], "a1");
    assert_eq!(value["otherNames"], "BP");
    assert_eq!(value["unitIDs"], json!([]));
    assert_eq!(value["membersSnippet"], json!([]));
    assert_eq!(value["genre"], "KPOP");
}

// ── Members ──────────────────────────────────────────────────────

#[test]
fn members_are_listed_oldest_first() {
    let mut a = artist();
    a.add_member_urn(&member("m4", "19970327", "Lisa", "1")).unwrap();
    a.add_member_urn(&member("m1", "19950103", "Jisoo", "7")).unwrap();
    let snippet = a.add_member_urn(&member("m2", "19960116", "Jennie", "2")).unwrap();

    let names: Vec<&str> = snippet.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Jisoo", "Jennie", "Lisa"]);
    assert!(snippet.iter().all(|m| m.snippet_type == "member/snippet"));
}

#[test]
fn query_includes_member_names_and_agency() {
    let mut a = artist();
    a.add_member_urn(&member("m1", "19950103", "Jisoo", "7")).unwrap();
    a.merge(&json!({ "agency": "YG Entertainment" })).unwrap();
    assert_eq!(a.query().unwrap(), "blackpink bp jisoo yg entertainment");
}

#[test]
fn connect_member_is_idempotent() {
    let mut a = artist();
    let jisoo = member("m1", "19950103", "Jisoo", "7");
    assert_eq!(a.connect_member(&jisoo).unwrap(), ConnectOutcome::Connected);
    assert_eq!(a.connect_member(&jisoo).unwrap(), ConnectOutcome::AlreadyConnected);
    assert_eq!(a.members_snippet().unwrap().len(), 1);
}

#[test]
fn incomplete_member_is_not_added() {
    let mut a = artist();
    let err = a.add_member_urn(&member("m1", "", "Jisoo", "7")).unwrap_err();
    assert_eq!(
        err,
        EntityError::Urn(UrnError::MissingUrnField {
            field: "birthdate",
            urn: "ArtistMemberUrn",
        })
    );
    assert!(a.members_snippet().unwrap().is_empty());
}

#[test]
fn legacy_member_token_without_birthdate_still_renders() {
    let mut a = artist();
    let view = a
        .merge(&json!({ "memberUrns": ["member:undefined:m2:Lisa:3"] }))
        .unwrap();
    assert_eq!(view.members_snippet.len(), 1);
    assert_eq!(view.members_snippet[0].birthdate, "undefined");
    assert_eq!(view.query, "blackpink bp lisa");
}

#[test]
fn corrupt_member_token_fails_the_view() {
    let mut a = artist();
    a.merge(&json!({ "memberUrns": ["member:oops"] })).unwrap_err();
    assert!(a.normalized_view().is_err());
}

// ── Units ────────────────────────────────────────────────────────

#[test]
fn connect_unit_lists_each_unit_once() {
    let mut a = artist();
    assert_eq!(a.connect_unit("u1"), ConnectOutcome::Connected);
    assert_eq!(a.connect_unit("u2"), ConnectOutcome::Connected);
    assert_eq!(a.connect_unit("u1"), ConnectOutcome::AlreadyConnected);
    assert_eq!(a.normalized_view().unwrap().unit_ids, vec!["u1", "u2"]);
}

// ── Payload ──────────────────────────────────────────────────────

#[test]
fn payload_keeps_populated_relationships() {
    let mut a = artist();
    a.connect_unit("u1");
    a.add_member_urn(&member("m1", "19950103", "Jisoo", "7")).unwrap();
    let body = a.persistence_payload().unwrap().body;
    assert_eq!(body["unitIDs"], json!(["u1"]));
    assert_eq!(body["memberUrns"], json!(["member:19950103:m1:Jisoo:7"]));
    assert_eq!(body["otherNames"], "BP");
    assert_eq!(body["isSoloist"], json!(null));
}
