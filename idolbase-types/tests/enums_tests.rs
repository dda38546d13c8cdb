use idolbase_types::{
    AlbumCategory, EnumError, EnumSet, Genre, NOT_AVAILABLE, Nationality, Position, UNKNOWN,
    UnitKind, is_known_value, is_member, list_values,
};
use pretty_assertions::assert_eq;

// ── list_values ──────────────────────────────────────────────────

#[test]
fn list_values_in_declaration_order() {
    assert_eq!(
        list_values("GENRES").unwrap(),
        &["CPOP", "JPOP", "KPOP", "OTHER", "POP", "UNKNOWN"]
    );
    assert_eq!(
        list_values("ALBUMS").unwrap(),
        &["ALBUM", "EP", "SINGLE", "UNKNOWN"]
    );
}

#[test]
fn list_values_unknown_set() {
    let err = list_values("COLORS").unwrap_err();
    assert_eq!(err, EnumError::UnknownEnumeration("COLORS".into()));
    assert_eq!(err.to_string(), "Invalid Enum type 'COLORS'");
}

#[test]
fn every_set_has_unknown() {
    for set in EnumSet::ALL {
        assert!(set.contains(UNKNOWN), "{set} lacks UNKNOWN");
    }
}

#[test]
fn only_units_has_not_available() {
    assert!(EnumSet::Units.contains(NOT_AVAILABLE));
    assert!(!EnumSet::Genres.contains(NOT_AVAILABLE));
}

// ── is_member ────────────────────────────────────────────────────

#[test]
fn is_member_accepts_declared_value() {
    assert_eq!(is_member("GENRES", Some("POP")), Ok(true));
    assert_eq!(is_member("NATIONALITIES", Some("KOREAN")), Ok(true));
}

#[test]
fn is_member_rejects_undeclared_value() {
    let err = is_member("GENRES", Some("MARIACHI")).unwrap_err();
    assert_eq!(
        err,
        EnumError::InvalidEnumValue {
            set: "GENRES".into(),
            value: "MARIACHI".into(),
        }
    );
    let msg = err.to_string();
    assert!(msg.contains("GENRES"));
    assert!(msg.contains("MARIACHI"));
}

#[test]
fn is_member_treats_absent_as_non_member() {
    let err = is_member("GENDERS", None).unwrap_err();
    assert!(matches!(err, EnumError::InvalidEnumValue { .. }));
}

#[test]
fn is_member_unknown_set_wins_over_value() {
    let err = is_member("MOODS", Some("POP")).unwrap_err();
    assert_eq!(err, EnumError::UnknownEnumeration("MOODS".into()));
}

#[test]
fn membership_is_by_value_not_symbol() {
    // Symbolic key is VOCALIST.MAIN, value is MAIN_VOCALIST
    assert_eq!(is_member("POSITIONS", Some("MAIN_VOCALIST")), Ok(true));
    assert!(is_member("POSITIONS", Some("MAIN")).is_err());
}

// ── Typed enums ──────────────────────────────────────────────────

#[test]
fn typed_enums_parse_and_display() {
    assert_eq!("KPOP".parse::<Genre>().unwrap(), Genre::Kpop);
    assert_eq!(Genre::Kpop.to_string(), "KPOP");
    assert_eq!(Position::LeadDancer.as_str(), "LEAD_DANCER");
    assert_eq!(UnitKind::NotAvailable.as_str(), "NA");
}

#[test]
fn typed_enum_parse_failure_names_set() {
    let err = "POLKA".parse::<Genre>().unwrap_err();
    assert_eq!(
        err,
        EnumError::InvalidEnumValue {
            set: "GENRES".into(),
            value: "POLKA".into(),
        }
    );
}

#[test]
fn defaults_are_sentinels() {
    assert_eq!(Genre::default(), Genre::Unknown);
    assert_eq!(AlbumCategory::default(), AlbumCategory::Unknown);
    assert_eq!(UnitKind::default(), UnitKind::NotAvailable);
    assert_eq!(EnumSet::Units.default_value(), NOT_AVAILABLE);
    assert_eq!(EnumSet::Nationalities.default_value(), UNKNOWN);
}

#[test]
fn typed_values_match_registry() {
    assert_eq!(Nationality::ALL.len(), Nationality::VALUES.len());
    for n in Nationality::ALL {
        assert!(EnumSet::Nationalities.contains(n.as_str()));
    }
}

#[test]
fn serde_uses_wire_values() {
    let json = serde_json::to_string(&Position::MainRapper).unwrap();
    assert_eq!(json, "\"MAIN_RAPPER\"");
    let parsed: UnitKind = serde_json::from_str("\"NA\"").unwrap();
    assert_eq!(parsed, UnitKind::NotAvailable);
    let set: EnumSet = serde_json::from_str("\"NATIONALITIES\"").unwrap();
    assert_eq!(set, EnumSet::Nationalities);
}

#[test]
fn set_names_parse() {
    assert_eq!("UNITS".parse::<EnumSet>().unwrap(), EnumSet::Units);
    assert_eq!(EnumSet::Albums.to_string(), "ALBUMS");
}

#[test]
fn known_value_sentinels() {
    assert!(!is_known_value(UNKNOWN));
    assert!(!is_known_value(NOT_AVAILABLE));
    assert!(is_known_value("KPOP"));
}
