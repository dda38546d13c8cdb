use idolbase_model::{Artist, Entity, EntityCore, EntityError, EntityResult, Schema};
use idolbase_store::{Collection, CollectionError, Incoming};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{Value, json};
use std::sync::LazyLock;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn bag(value: Value) -> Incoming<Artist> {
    Incoming::Attributes(value)
}

fn seeded() -> Collection<Artist> {
    init_tracing();
    Collection::with_seed(
        "artists",
        [bag(json!({ "id": "abc", "name": "Test", "isPrivate": true }))],
    )
    .unwrap()
}

static UNTYPED_SCHEMA: LazyLock<Schema> = LazyLock::new(|| Schema::new(""));

#[derive(Debug)]
struct Untyped {
    core: EntityCore,
}

impl Entity for Untyped {
    const KIND: &'static str = "";
    type View = ();

    fn schema() -> &'static Schema {
        &UNTYPED_SCHEMA
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
    fn build_view(&self) -> EntityResult<()> {
        Ok(())
    }
}

// ── Construction ─────────────────────────────────────────────────

#[test]
fn new_collection_is_empty_and_clean() {
    let c = Collection::<Artist>::new("artists").unwrap();
    assert!(c.is_empty());
    assert!(!c.is_dirty());
    assert_eq!(c.name(), "artists");
    assert_eq!(c.kind(), "artist");
    assert_eq!(c.created_at(), c.last_updated_at());
}

#[test]
fn name_is_required() {
    let err = Collection::<Artist>::new("").unwrap_err();
    assert_eq!(err, CollectionError::MissingCollectionName);
    assert_eq!(
        err.to_string(),
        "You must assign a collection name, usually the pluralized entity kind"
    );
}

#[test]
fn entity_kind_is_required() {
    let err = Collection::<Untyped>::new("things").unwrap_err();
    assert_eq!(err, CollectionError::MissingEntityKind);
}

#[test]
fn schema_is_the_entity_schema() {
    let c = seeded();
    assert_eq!(c.schema().kind(), "artist");
    assert!(c.schema().field("genre").is_some());
}

// ── Seeding & batch add ──────────────────────────────────────────

#[test]
fn seeding_does_not_mark_dirty() {
    let c = seeded();
    assert_eq!(c.len(), 1);
    assert!(!c.is_dirty());
    assert_eq!(c.find_by_identity("abc").unwrap().name(), "Test");
}

#[test]
fn batch_add_accepts_records_and_bags() {
    let mut c = seeded();
    let record = Artist::with_attributes(Some("r1"), &json!({ "name": "Rec" })).unwrap();
    let added = c
        .batch_add(
            [Incoming::Record(record), bag(json!({ "id": "b1", "name": "Bag" }))],
            false,
        )
        .unwrap();
    assert_eq!(added, 2);
    assert!(c.is_dirty());

    let ids: Vec<&str> = c.records_dict().keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["abc", "b1", "r1"]);
}

#[test]
fn batch_add_requires_identities() {
    let mut c = seeded();
    let err = c
        .batch_add(
            [bag(json!({ "id": "ok", "name": "Fine" })), bag(json!({ "name": "Anon" }))],
            false,
        )
        .unwrap_err();
    assert_eq!(
        err,
        CollectionError::Entity(EntityError::MissingIdentity { kind: "Artist".into() })
    );
    // entries before the failure stay
    assert!(c.contains("ok"));
    assert!(c.is_dirty());
}

#[test]
fn batch_add_propagates_validation_errors() {
    let mut c = seeded();
    let err = c
        .batch_add([bag(json!({ "id": "x", "genre": "KPOP" }))], true)
        .unwrap_err();
    assert!(matches!(err, CollectionError::Entity(EntityError::Validation { .. })));
    assert!(!c.is_dirty());
}

// ── Single-record mutations ──────────────────────────────────────

#[test]
fn add_inserts_and_marks_dirty() {
    let mut c = seeded();
    let added = c.add("bcd", bag(json!({ "name": "Test" }))).unwrap();
    assert_eq!(added.identity(), Some("bcd"));
    assert_eq!(c.len(), 2);
    assert!(c.is_dirty());
    assert!(c.last_updated_at() > c.created_at());
}

#[test]
fn add_overwrites_existing_key() {
    let mut c = seeded();
    c.add("abc", bag(json!({ "name": "Other" }))).unwrap();
    assert_eq!(c.len(), 1);
    assert_eq!(c.find_by_identity("abc").unwrap().name(), "Other");
}

#[test]
fn add_rejects_conflicting_identity() {
    let mut c = seeded();
    let err = c
        .add("bcd", bag(json!({ "id": "xyz", "name": "Test" })))
        .unwrap_err();
    assert_eq!(
        err,
        CollectionError::IdentityConflict {
            identity: "bcd".into(),
            embedded: "xyz".into(),
        }
    );
    assert!(!c.is_dirty());

    let record = Artist::with_attributes(Some("xyz"), &json!({ "name": "Rec" })).unwrap();
    assert!(matches!(
        c.add("bcd", Incoming::Record(record)),
        Err(CollectionError::IdentityConflict { .. })
    ));
}

#[test]
fn add_keys_anonymous_record() {
    let mut c = seeded();
    let record = Artist::with_attributes(None, &json!({ "name": "Rec" })).unwrap();
    c.add("r1", Incoming::Record(record)).unwrap();
    assert_eq!(c.find_by_identity("r1").unwrap().identity(), Some("r1"));
}

#[test]
fn insert_new_generates_identity() {
    let mut c = seeded();
    let identity = c
        .insert_new(json!({ "name": "Fresh" }))
        .unwrap()
        .identity()
        .map(str::to_string)
        .unwrap();
    assert!(!identity.is_empty());
    assert_eq!(c.find_by_identity(&identity).unwrap().name(), "Fresh");
    assert_eq!(c.len(), 2);
}

#[test]
fn update_merges_into_existing_record() {
    let mut c = seeded();
    let view = c.update("abc", &json!({ "name": "Bola" })).unwrap();
    assert_eq!(view.name, "Bola");
    assert!(view.is_private);
    assert!(c.is_dirty());
}

#[test]
fn update_of_missing_record_fails() {
    let mut c = seeded();
    let err = c.update("nope", &json!({ "name": "Bola" })).unwrap_err();
    assert_eq!(
        err,
        CollectionError::RecordNotFound {
            identity: "nope".into(),
            collection: "artists".into(),
        }
    );
}

#[test]
fn update_rejects_conflicting_identity() {
    let mut c = seeded();
    let err = c.update("abc", &json!({ "id": "other" })).unwrap_err();
    assert!(matches!(err, CollectionError::IdentityConflict { .. }));
}

#[test]
fn rejected_update_leaves_collection_clean() {
    let mut c = seeded();
    let before = c.find_by_identity("abc").unwrap().core().clone();

    let err = c.update("abc", &json!({ "type": "member", "name": "Other" })).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to validate type. Expected 'artist', instead got 'member'"
    );
    assert!(matches!(err, CollectionError::Entity(EntityError::KindMismatch { .. })));

    let err = c.update("abc", &json!(["not", "a", "bag"])).unwrap_err();
    assert!(matches!(err, CollectionError::Entity(EntityError::Validation { .. })));

    assert_eq!(c.find_by_identity("abc").unwrap().core(), &before);
    assert!(!c.is_dirty());
}

#[test]
fn update_that_wrote_fields_before_failing_marks_dirty() {
    let mut c = seeded();
    let err = c.update("abc", &json!({ "disbandYear": 99 })).unwrap_err();
    assert!(matches!(err, CollectionError::Entity(EntityError::Validation { .. })));
    assert!(c.is_dirty());
}

#[test]
fn replace_builds_a_fresh_record() {
    let mut c = seeded();
    c.replace("abc", bag(json!({ "name": "Bola" }))).unwrap();
    let view = c.find_by_identity("abc").unwrap().normalized_view().unwrap();
    assert_eq!(view.name, "Bola");
    assert!(!view.is_private);
    assert!(c.is_dirty());
}

#[test]
fn remove_returns_record() {
    let mut c = seeded();
    let removed = c.remove("abc").unwrap();
    assert_eq!(removed.name(), "Test");
    assert!(c.is_empty());
    assert!(c.is_dirty());
}

#[test]
fn remove_of_absent_key_is_not_an_error() {
    let mut c = seeded();
    assert!(c.remove("nope").is_none());
    assert_eq!(c.len(), 1);
    assert!(c.is_dirty());
}

// ── Lookup ───────────────────────────────────────────────────────

#[test]
fn lookup_failure_names_identity_and_collection() {
    let c = Collection::<Artist>::new("widgets").unwrap();
    let err = c.find_by_identity("x").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("x"));
    assert!(message.contains("widgets"));
    assert_eq!(message, "Failed to find record of id x in widgets");
}

#[test]
fn mutable_lookup() {
    let mut c = seeded();
    c.find_by_identity_mut("abc")
        .unwrap()
        .merge(&json!({ "agency": "YG" }))
        .unwrap();
    let view = c.find_by_identity("abc").unwrap().normalized_view().unwrap();
    assert_eq!(view.agency, "YG");
    assert!(matches!(
        c.find_by_identity_mut("nope"),
        Err(CollectionError::RecordNotFound { .. })
    ));
}

#[test]
fn records_iterate_in_identity_order() {
    let mut c = seeded();
    c.add("aaa", bag(json!({ "name": "First" }))).unwrap();
    let names: Vec<&str> = c.records().map(Artist::name).collect();
    assert_eq!(names, vec!["First", "Test"]);
}

// ── Dirty tracking ───────────────────────────────────────────────

#[test]
fn refresh_clears_dirtiness_and_keeps_records() {
    let mut c = seeded();
    c.add("bcd", bag(json!({ "name": "Test" }))).unwrap();
    assert!(c.is_dirty());
    c.refresh();
    assert!(!c.is_dirty());
    assert_eq!(c.len(), 2);

    c.remove("bcd");
    assert!(c.is_dirty());
}

#[test]
fn reset_clears_everything() {
    let mut c = seeded();
    c.add("bcd", bag(json!({ "name": "Test" }))).unwrap();
    c.reset();
    assert!(c.is_empty());
    assert!(!c.is_dirty());
}

#[derive(Debug, Clone)]
enum Op {
    Add(u8),
    Update(u8),
    Replace(u8),
    Remove(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..4).prop_map(Op::Add),
        (0u8..4).prop_map(Op::Update),
        (0u8..4).prop_map(Op::Replace),
        (0u8..4).prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn every_mutation_marks_dirty(ops in proptest::collection::vec(op(), 1..20)) {
        let mut c = Collection::<Artist>::with_seed(
            "artists",
            (0u8..4).map(|i| bag(json!({ "id": format!("k{i}"), "name": "Seed" }))),
        )
        .unwrap();
        prop_assert!(!c.is_dirty());

        for op in ops {
            let before = c.last_updated_at();
            let touched = match op {
                Op::Add(k) => c.add(&format!("k{k}"), bag(json!({ "name": "Added" }))).is_ok(),
                Op::Update(k) => !matches!(
                    c.update(&format!("k{k}"), &json!({ "agency": "YG" })),
                    Err(CollectionError::RecordNotFound { .. })
                ),
                Op::Replace(k) => c.replace(&format!("k{k}"), bag(json!({ "name": "New" }))).is_ok(),
                Op::Remove(k) => {
                    c.remove(&format!("k{k}"));
                    true
                }
            };
            prop_assert_eq!(c.is_dirty(), touched);
            if touched {
                prop_assert!(c.last_updated_at() > before);
            }

            c.refresh();
            prop_assert!(!c.is_dirty());
        }
    }
}
