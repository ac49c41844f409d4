//! Domain model for song requests.

use crate::error::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque unique identifier of a song request.
///
/// Assigned once at creation, immutable, never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of an operator account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ActorId(pub Uuid);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role carried by an authenticated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActorRole {
    /// May transition and delete requests.
    Operator,
    /// May only submit and read public projections.
    Guest,
}

/// An already-authorized identity, resolved by the calling collaborator.
///
/// The engine trusts the identity it is handed; role checks happen at the
/// boundary that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Account id recorded on transitions.
    pub id: ActorId,
    /// Role granted by the identity collaborator.
    pub role: ActorRole,
}

impl Actor {
    /// Returns `true` for operator-role actors.
    #[must_use]
    pub const fn is_operator(&self) -> bool {
        matches!(self.role, ActorRole::Operator)
    }
}

/// Lifecycle status of a song request.
///
/// A closed enumeration: no other value is ever persisted, and invalid wire
/// values are rejected at the boundary (`EngineError::InvalidStatus`). No
/// status is terminal; any status reaches any other status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "request_status", rename_all = "UPPERCASE")
)]
pub enum RequestStatus {
    /// Awaiting triage (initial).
    Pending,
    /// In the playback queue.
    Approved,
    /// Passed over by the operator.
    Skipped,
    /// Taken out of consideration.
    Removed,
    /// Has been played.
    Played,
}

impl RequestStatus {
    /// Statuses that count as "in line": pending or approved.
    pub const ACTIVE: [Self; 2] = [Self::Pending, Self::Approved];

    /// Statuses that count as discarded: skipped or removed.
    pub const DISCARDED: [Self; 2] = [Self::Skipped, Self::Removed];

    /// Wire representation, as persisted and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Skipped => "SKIPPED",
            Self::Removed => "REMOVED",
            Self::Played => "PLAYED",
        }
    }

    /// Returns `true` for requests still in line (pending or approved).
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "SKIPPED" => Ok(Self::Skipped),
            "REMOVED" => Ok(Self::Removed),
            "PLAYED" => Ok(Self::Played),
            other => Err(EngineError::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// A guest-submitted song request tracked through the lifecycle.
///
/// `requester_name`, `requester_email` and `song_title` are immutable after
/// creation; only `status` and its attribution fields ever change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRequest {
    /// Unique id, assigned at creation.
    pub id: RequestId,

    /// Display name supplied by the guest.
    pub requester_name: String,

    /// Contact email, stored verbatim when supplied.
    pub requester_email: Option<String>,

    /// Requested song title.
    pub song_title: String,

    /// Current lifecycle status.
    pub status: RequestStatus,

    /// Submission timestamp; the ordering key within a status bucket.
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last explicit transition; `None` until the first one.
    pub status_changed_at: Option<DateTime<Utc>>,

    /// Actor of the last transition; `None` for actor-less creation.
    pub status_changed_by: Option<ActorId>,
}

/// Submission payload for [`crate::QueueEngine::submit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRequest {
    /// Guest display name (required, trimmed).
    pub requester_name: String,

    /// Requested song title (required, trimmed).
    pub song_title: String,

    /// Contact email (optional, stored verbatim).
    #[serde(default)]
    pub requester_email: Option<String>,
}

/// Guest-facing projection of an approved request.
///
/// Same ordering guarantee as the full queue listing, narrower field set:
/// no email, no actor attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Request id.
    pub id: RequestId,

    /// Requested song title.
    pub song_title: String,

    /// Guest display name.
    pub requester_name: String,

    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<SongRequest> for QueueEntry {
    fn from(request: SongRequest) -> Self {
        Self {
            id: request.id,
            song_title: request.song_title,
            requester_name: request.requester_name,
            created_at: request.created_at,
        }
    }
}

/// Normalize a title for duplicate comparison: trimmed, lowercased.
#[must_use]
pub fn normalized_title(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_form() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Skipped,
            RequestStatus::Removed,
            RequestStatus::Played,
        ] {
            assert_eq!(status.as_str().parse::<RequestStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "QUEUED".parse::<RequestStatus>();
        assert_eq!(
            err,
            Err(EngineError::InvalidStatus {
                value: "QUEUED".to_string()
            })
        );
    }

    #[test]
    fn active_statuses_are_pending_and_approved() {
        assert!(RequestStatus::Pending.is_active());
        assert!(RequestStatus::Approved.is_active());
        assert!(!RequestStatus::Skipped.is_active());
        assert!(!RequestStatus::Removed.is_active());
        assert!(!RequestStatus::Played.is_active());
    }

    #[test]
    fn titles_normalize_case_and_whitespace() {
        assert_eq!(normalized_title("  Bohemian Rhapsody "), "bohemian rhapsody");
        assert_eq!(normalized_title("IMAGINE"), normalized_title("imagine"));
    }
}
