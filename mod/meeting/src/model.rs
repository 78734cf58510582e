use serde::{Deserialize, Deserializer, Serialize};

/// An identity record. Owned by the auth collaborator — the meeting
/// gateway only ever reads `id` and `email` from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User id (UUIDv4, no dashes).
    pub id: String,

    /// Login email, unique.
    pub email: String,

    /// Argon2id password hash. Absent for external-provider accounts.
    /// Never serialized outward — see [`UserPublic`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    /// External provider linkage, if the account came from OAuth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last-update timestamp.
    pub updated_at: String,
}

/// The only outward projection of a user: id and email, never the
/// credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: String,
    pub email: String,
}

impl From<User> for UserPublic {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
        }
    }
}

/// One scheduled or ad-hoc meeting, owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    /// Meeting id (UUIDv4, no dashes), store-assigned.
    pub id: String,

    /// Owning user id. Immutable after creation.
    pub owner_id: String,

    /// Meeting link. Required, otherwise opaque.
    pub link: String,

    /// Provider-specific meeting identifier, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_meeting_id: Option<String>,

    /// Duration in minutes. Callers send this as text or as a number;
    /// it is kept as an opaque string so it round-trips unchanged.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "opaque_string"
    )]
    pub duration: Option<String>,

    /// RFC 3339 scheduled start. Absent means no scheduled dispatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    /// RFC 3339 creation timestamp, store-managed.
    pub created_at: String,

    /// RFC 3339 last-update timestamp, store-managed.
    pub updated_at: String,
}

/// A meeting as returned on the per-user machine read path: the caller
/// already named the owner explicitly, so `owner_id` is omitted to
/// avoid echoing internal linkage back out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingPublic {
    pub id: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_meeting_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Meeting> for MeetingPublic {
    fn from(m: Meeting) -> Self {
        Self {
            id: m.id,
            link: m.link,
            external_meeting_id: m.external_meeting_id,
            duration: m.duration,
            start_time: m.start_time,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Request body for meeting creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMeeting {
    /// Meeting link. Required, validated non-empty by the gateway.
    #[serde(default)]
    pub link: String,

    #[serde(default)]
    pub external_meeting_id: Option<String>,

    #[serde(default, deserialize_with = "opaque_string")]
    pub duration: Option<String>,

    #[serde(default)]
    pub start_time: Option<String>,
}

/// Deserialize a JSON string or number into an opaque string.
///
/// Existing clients are inconsistent about `duration` — some send
/// `"60"`, some send `60`. Both are accepted and kept verbatim.
pub fn opaque_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
