//! Enumeration registry.
//!
//! Every enumerated catalog attribute (genre, nationality, album category, ...)
//! is a closed Rust enum declared once through [`enumeration!`]. Each set also
//! has an entry in [`EnumSet`], so attribute bags that carry plain strings can
//! be checked against the registry by set name.
//!
//! Values serialize as their SCREAMING_SNAKE_CASE wire string (`"KPOP"`,
//! `"MAIN_VOCALIST"`), which is also what appears in persisted documents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel for "not set yet". Present in every set.
pub const UNKNOWN: &str = "UNKNOWN";

/// Sentinel for "does not apply". Only present in some sets.
pub const NOT_AVAILABLE: &str = "NA";

/// Returns false for the `UNKNOWN` and `NA` sentinels.
#[must_use]
pub fn is_known_value(value: &str) -> bool {
    value != UNKNOWN && value != NOT_AVAILABLE
}

/// Errors raised by registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnumError {
    /// The set name is not registered.
    #[error("Invalid Enum type '{0}'")]
    UnknownEnumeration(String),

    /// The set exists but does not declare the value.
    #[error("'{value}' is not part of Enum({set})")]
    InvalidEnumValue { set: String, value: String },
}

impl EnumError {
    fn invalid_value(set: &str, value: Option<&str>) -> Self {
        Self::InvalidEnumValue {
            set: set.to_string(),
            value: value.unwrap_or("undefined").to_string(),
        }
    }
}

macro_rules! enumeration {
    (
        $(#[$meta:meta])*
        $name:ident in $set:literal, default = $default:ident {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            /// Registry name of this set.
            pub const SET: &'static str = $set;

            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Every wire value, in declaration order.
            pub const VALUES: &'static [&'static str] = &[$($value),+];

            /// Returns the wire value.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = EnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok(Self::$variant),)+
                    other => Err(EnumError::invalid_value($set, Some(other))),
                }
            }
        }
    };
}

enumeration! {
    /// Release format of an album.
    AlbumCategory in "ALBUMS", default = Unknown {
        Album => "ALBUM",
        Ep => "EP",
        Single => "SINGLE",
        Unknown => "UNKNOWN",
    }
}

enumeration! {
    Gender in "GENDERS", default = Unknown {
        Female => "FEMALE",
        Male => "MALE",
        Unknown => "UNKNOWN",
    }
}

enumeration! {
    /// Musical genre of an artist or member.
    Genre in "GENRES", default = Unknown {
        Cpop => "CPOP",
        Jpop => "JPOP",
        Kpop => "KPOP",
        Other => "OTHER",
        Pop => "POP",
        Unknown => "UNKNOWN",
    }
}

enumeration! {
    Nationality in "NATIONALITIES", default = Unknown {
        American => "AMERICAN",
        Brazilian => "BRAZILIAN",
        British => "BRITISH",
        Canadian => "CANADIAN",
        Chinese => "CHINESE",
        Indian => "INDIAN",
        Indonesian => "INDONESIAN",
        Filipino => "FILIPINO",
        Japanese => "JAPANESE",
        Korean => "KOREAN",
        Other => "OTHER",
        Taiwanese => "TAIWANESE",
        Thai => "THAI",
        Vietnamese => "VIETNAMESE",
        Plantian => "PLANTIAN",
        Unknown => "UNKNOWN",
    }
}

enumeration! {
    /// Role of a member inside a group. Vocal, dance and rap roles come in
    /// main/lead/regular levels.
    Position in "POSITIONS", default = Unknown {
        MainVocalist => "MAIN_VOCALIST",
        LeadVocalist => "LEAD_VOCALIST",
        Vocalist => "VOCALIST",
        SubVocalist => "SUB_VOCALIST",
        MainDancer => "MAIN_DANCER",
        LeadDancer => "LEAD_DANCER",
        Dancer => "DANCER",
        MainRapper => "MAIN_RAPPER",
        LeadRapper => "LEAD_RAPPER",
        Rapper => "RAPPER",
        Performer => "PERFORMER",
        Leader => "LEADER",
        Face => "FACE",
        Center => "CENTER",
        Maknae => "MAKNAE",
        Visual => "VISUAL",
        Other => "OTHER",
        Unknown => "UNKNOWN",
    }
}

enumeration! {
    /// Kind of a unit. Units that are the artist's main lineup use `NA`.
    UnitKind in "UNITS", default = NotAvailable {
        Custom => "CUSTOM",
        NotAvailable => "NA",
        Solo => "SOLO",
        Special => "SPECIAL",
        Subunit => "SUBUNIT",
        Unknown => "UNKNOWN",
    }
}

/// Names of the registered enumeration sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnumSet {
    Albums,
    Genders,
    Genres,
    Nationalities,
    Positions,
    Units,
}

impl EnumSet {
    pub const ALL: &'static [Self] = &[
        Self::Albums,
        Self::Genders,
        Self::Genres,
        Self::Nationalities,
        Self::Positions,
        Self::Units,
    ];

    /// Registry name, e.g. `"GENRES"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Albums => AlbumCategory::SET,
            Self::Genders => Gender::SET,
            Self::Genres => Genre::SET,
            Self::Nationalities => Nationality::SET,
            Self::Positions => Position::SET,
            Self::Units => UnitKind::SET,
        }
    }

    /// Declared values, in declaration order.
    #[must_use]
    pub const fn values(self) -> &'static [&'static str] {
        match self {
            Self::Albums => AlbumCategory::VALUES,
            Self::Genders => Gender::VALUES,
            Self::Genres => Genre::VALUES,
            Self::Nationalities => Nationality::VALUES,
            Self::Positions => Position::VALUES,
            Self::Units => UnitKind::VALUES,
        }
    }

    /// Value an absent field of this set defaults to.
    #[must_use]
    pub fn default_value(self) -> &'static str {
        match self {
            Self::Albums => AlbumCategory::default().as_str(),
            Self::Genders => Gender::default().as_str(),
            Self::Genres => Genre::default().as_str(),
            Self::Nationalities => Nationality::default().as_str(),
            Self::Positions => Position::default().as_str(),
            Self::Units => UnitKind::default().as_str(),
        }
    }

    #[must_use]
    pub fn contains(self, value: &str) -> bool {
        self.values().contains(&value)
    }

    /// Fails with `InvalidEnumValue` unless `value` is a declared member.
    /// An absent value is a non-member.
    pub fn check(self, value: Option<&str>) -> Result<(), EnumError> {
        match value {
            Some(v) if self.contains(v) => Ok(()),
            _ => Err(EnumError::invalid_value(self.name(), value)),
        }
    }
}

impl fmt::Display for EnumSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EnumSet {
    type Err = EnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|set| set.name() == s)
            .ok_or_else(|| EnumError::UnknownEnumeration(s.to_string()))
    }
}

/// Lists the values of a set by name.
pub fn list_values(set_name: &str) -> Result<&'static [&'static str], EnumError> {
    Ok(set_name.parse::<EnumSet>()?.values())
}

/// Checks `value` against the set named `set_name`.
///
/// Returns `Ok(true)` for members. Non-members, absent values included, are
/// reported as `InvalidEnumValue` rather than `Ok(false)`.
pub fn is_member(set_name: &str, value: Option<&str>) -> Result<bool, EnumError> {
    set_name.parse::<EnumSet>()?.check(value)?;
    Ok(true)
}
