//! Relationship tokens ("urns").
//!
//! A urn packs a lightweight reference into one colon-delimited string so it
//! can live inside an array or object field of another record:
//!
//! ```text
//! member:19921204:m-01:Jisoo:7
//! ^tag   ^positional fields, fixed order per relationship kind
//! ```
//!
//! The layout is the stored wire format and must stay byte-exact. Optional
//! trailing fields are written as empty segments and read back as `None`.
//! There is no escaping, so encoding refuses field values that contain the
//! delimiter.

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use thiserror::Error;

/// Segment separator.
pub const DELIMITER: char = ':';

/// Suffix appended to the tag in a decoded snippet's `type`.
const SNIPPET_SUFFIX: &str = "/snippet";

/// Errors raised while building or reading tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrnError {
    #[error("{field} is required to build an {urn}")]
    MissingUrnField {
        field: &'static str,
        urn: &'static str,
    },

    #[error("{field} must not contain ':' to build an {urn}")]
    DelimiterInField {
        field: &'static str,
        urn: &'static str,
    },

    #[error("malformed {urn} '{token}': expected {expected} segments, got {actual}")]
    MalformedUrn {
        urn: &'static str,
        token: String,
        expected: usize,
        actual: usize,
    },

    #[error("{urn} '{token}' must start with '{expected}'")]
    UnexpectedTag {
        urn: &'static str,
        token: String,
        expected: &'static str,
    },
}

/// Accumulates segments for one token, checking each field as it is added.
#[derive(Debug)]
pub struct UrnBuilder {
    urn: &'static str,
    segments: Vec<String>,
}

impl UrnBuilder {
    #[must_use]
    pub fn new(urn: &'static str, tag: &'static str) -> Self {
        Self {
            urn,
            segments: vec![tag.to_string()],
        }
    }

    /// Appends a required field. Empty counts as missing.
    pub fn required(self, field: &'static str, value: &str) -> Result<Self, UrnError> {
        if value.is_empty() {
            return Err(UrnError::MissingUrnField {
                field,
                urn: self.urn,
            });
        }
        self.push(field, value)
    }

    /// Appends an optional field, written as an empty segment when absent.
    pub fn optional(self, field: &'static str, value: Option<&str>) -> Result<Self, UrnError> {
        self.push(field, value.unwrap_or_default())
    }

    fn push(mut self, field: &'static str, value: &str) -> Result<Self, UrnError> {
        if value.contains(DELIMITER) {
            return Err(UrnError::DelimiterInField {
                field,
                urn: self.urn,
            });
        }
        self.segments.push(value.to_string());
        Ok(self)
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.segments.join(&DELIMITER.to_string())
    }
}

/// A relationship kind with a fixed positional layout.
pub trait Relationship: Sized {
    /// Name used in error messages, e.g. `ArtistMemberUrn`.
    const NAME: &'static str;
    /// Literal first segment.
    const TAG: &'static str;
    /// Positional field names, after the tag.
    const FIELDS: &'static [&'static str];

    fn encode(&self) -> Result<String, UrnError>;

    /// Rebuilds the value from the segments following the tag. `segments`
    /// always has `FIELDS.len()` entries.
    fn from_segments(segments: &[&str]) -> Self;
}

/// Decoded relationship, tagged with `<tag>/snippet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet<R> {
    #[serde(rename = "type")]
    pub snippet_type: String,
    #[serde(flatten)]
    pub data: R,
}

impl<R> Snippet<R> {
    #[must_use]
    pub fn into_inner(self) -> R {
        self.data
    }
}

impl<R> Deref for Snippet<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.data
    }
}

/// Decodes one token.
pub fn decode<R: Relationship>(token: &str) -> Result<Snippet<R>, UrnError> {
    let segments: Vec<&str> = token.split(DELIMITER).collect();
    let expected = R::FIELDS.len() + 1;
    if segments.len() != expected {
        return Err(UrnError::MalformedUrn {
            urn: R::NAME,
            token: token.to_string(),
            expected,
            actual: segments.len(),
        });
    }
    if segments[0] != R::TAG {
        return Err(UrnError::UnexpectedTag {
            urn: R::NAME,
            token: token.to_string(),
            expected: R::TAG,
        });
    }

    let data = R::from_segments(&segments[1..]);
    Ok(Snippet {
        snippet_type: format!("{}{SNIPPET_SUFFIX}", segments[0]),
        data,
    })
}

/// Decodes tokens in lexicographic token order, regardless of input order.
pub fn decode_sorted<'a, R, I>(tokens: I) -> Result<Vec<Snippet<R>>, UrnError>
where
    R: Relationship,
    I: IntoIterator<Item = &'a str>,
{
    let mut tokens: Vec<&str> = tokens.into_iter().collect();
    tokens.sort_unstable();
    tokens.into_iter().map(decode::<R>).collect()
}

fn non_empty(segment: &str) -> Option<String> {
    (!segment.is_empty()).then(|| segment.to_string())
}

// ── Relationship kinds ───────────────────────────────────────────

/// Album → artist credit: `artist:<name>:<artistID?>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlbumArtistRef {
    pub name: String,
    pub id: Option<String>,
}

impl Relationship for AlbumArtistRef {
    const NAME: &'static str = "AlbumArtistUrn";
    const TAG: &'static str = "artist";
    const FIELDS: &'static [&'static str] = &["name", "artistID"];

    fn encode(&self) -> Result<String, UrnError> {
        Ok(UrnBuilder::new(Self::NAME, Self::TAG)
            .required("name", &self.name)?
            .optional("artistID", self.id.as_deref())?
            .finish())
    }

    fn from_segments(segments: &[&str]) -> Self {
        Self {
            name: segments[0].to_string(),
            id: non_empty(segments[1]),
        }
    }
}

/// Album → track: `song:<title>:<songID?>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlbumSongRef {
    pub title: String,
    pub id: Option<String>,
}

impl Relationship for AlbumSongRef {
    const NAME: &'static str = "AlbumSongUrn";
    const TAG: &'static str = "song";
    const FIELDS: &'static [&'static str] = &["title", "songID"];

    fn encode(&self) -> Result<String, UrnError> {
        Ok(UrnBuilder::new(Self::NAME, Self::TAG)
            .required("title", &self.title)?
            .optional("songID", self.id.as_deref())?
            .finish())
    }

    fn from_segments(segments: &[&str]) -> Self {
        Self {
            title: segments[0].to_string(),
            id: non_empty(segments[1]),
        }
    }
}

/// Artist → member: `member:<birthdate>:<memberID>:<name>:<colorID>`.
///
/// Birthdate leads so that sorted tokens list members oldest first. It is
/// kept as the stored segment text; tokens written by older clients may hold
/// anything there.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistMemberRef {
    pub id: String,
    pub birthdate: String,
    pub name: String,
    #[serde(rename = "colorID")]
    pub color_id: String,
}

impl Relationship for ArtistMemberRef {
    const NAME: &'static str = "ArtistMemberUrn";
    const TAG: &'static str = "member";
    const FIELDS: &'static [&'static str] = &["birthdate", "id", "name", "colorID"];

    fn encode(&self) -> Result<String, UrnError> {
        Ok(UrnBuilder::new(Self::NAME, Self::TAG)
            .required("birthdate", &self.birthdate)?
            .required("id", &self.id)?
            .required("name", &self.name)?
            .required("colorID", &self.color_id)?
            .finish())
    }

    fn from_segments(segments: &[&str]) -> Self {
        Self {
            birthdate: segments[0].to_string(),
            id: segments[1].to_string(),
            name: segments[2].to_string(),
            color_id: segments[3].to_string(),
        }
    }
}

/// Member → artist they belong to: `artist:<artistID>:<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemberArtistRef {
    pub id: String,
    pub name: String,
}

impl Relationship for MemberArtistRef {
    const NAME: &'static str = "MemberArtistUrn";
    const TAG: &'static str = "artist";
    const FIELDS: &'static [&'static str] = &["artistID", "name"];

    fn encode(&self) -> Result<String, UrnError> {
        Ok(UrnBuilder::new(Self::NAME, Self::TAG)
            .required("artistID", &self.id)?
            .required("name", &self.name)?
            .finish())
    }

    fn from_segments(segments: &[&str]) -> Self {
        Self {
            id: segments[0].to_string(),
            name: segments[1].to_string(),
        }
    }
}
