//! Two-sided relationship wiring between records.
//!
//! Each function updates both records and reports whether anything changed,
//! leaving it to the caller to log or ignore duplicates.

use crate::entity::Entity;
use crate::error::EntityResult;
use crate::records::{Artist, Member, Unit};
use crate::urn::ArtistMemberRef;

/// Result of a connect call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// At least one side gained the link.
    Connected,
    /// Both sides already carried the link; nothing changed.
    AlreadyConnected,
}

impl ConnectOutcome {
    /// Combines the outcomes of the two sides of one relationship.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        if self == Self::AlreadyConnected && other == Self::AlreadyConnected {
            Self::AlreadyConnected
        } else {
            Self::Connected
        }
    }

    #[must_use]
    pub fn is_new(self) -> bool {
        self == Self::Connected
    }
}

/// Artist ⇄ unit: the artist lists the unit id, the unit points back.
pub fn connect_artist_unit(artist: &mut Artist, unit: &mut Unit) -> EntityResult<ConnectOutcome> {
    let artist_id = artist.identity_check()?.to_string();
    let unit_id = unit.identity_check()?.to_string();

    let forward = artist.connect_unit(&unit_id);
    let backward = unit.connect_artist(&artist_id);
    Ok(forward.and(backward))
}

/// Artist ⇄ member: the artist embeds an `ArtistMemberUrn`, the member gains
/// a `MemberArtistUrn`. The member needs a birthdate and a color.
pub fn connect_artist_member(
    artist: &mut Artist,
    member: &mut Member,
) -> EntityResult<ConnectOutcome> {
    let artist_id = artist.identity_check()?.to_string();
    let member_ref = ArtistMemberRef {
        id: member.identity_check()?.to_string(),
        birthdate: member.birthdate().map(|b| b.to_string()).unwrap_or_default(),
        name: member.name().to_string(),
        color_id: member.color().to_string(),
    };

    let forward = artist.connect_member(&member_ref)?;
    let artist_name = artist.name().to_string();
    let backward = member.connect_reference_artist(&artist_id, &artist_name)?;
    Ok(forward.and(backward))
}
