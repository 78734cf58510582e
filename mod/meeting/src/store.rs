//! Meeting record store — a narrow CRUD collaborator.
//!
//! The gateway and the dispatch path only ever see the [`MeetingStore`]
//! and [`UserStore`] traits; [`SqliteStore`] is one implementation,
//! backed by bundled SQLite. Records are stored as a JSON `data` column
//! plus the columns the queries filter and sort on.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use meetmash_core::ServiceError;

use crate::model::{Meeting, User};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id          TEXT PRIMARY KEY,
    data        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS meetings (
    id          TEXT PRIMARY KEY,
    data        TEXT NOT NULL,
    owner_id    TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_meeting_owner ON meetings(owner_id);
CREATE INDEX IF NOT EXISTS idx_meeting_created_at ON meetings(created_at);
";

/// Durable keyed storage for meetings. Listing order is always
/// newest-created-first.
pub trait MeetingStore: Send + Sync {
    /// Insert a new meeting record.
    fn insert(&self, meeting: &Meeting) -> Result<(), ServiceError>;

    /// Get a meeting by id, only if it is owned by `owner_id`.
    /// Absent and present-but-not-owned are indistinguishable.
    fn get_owned(&self, id: &str, owner_id: &str) -> Result<Option<Meeting>, ServiceError>;

    /// All meetings owned by `owner_id`, newest-created-first.
    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Meeting>, ServiceError>;

    /// Every meeting in the store, newest-created-first.
    fn list_all(&self) -> Result<Vec<Meeting>, ServiceError>;
}

/// Durable keyed storage for users. Owned by the auth collaborator;
/// the gateway only performs lookups.
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `Conflict` if the email is taken.
    fn insert(&self, user: &User) -> Result<(), ServiceError>;

    /// Get a user by id.
    fn get(&self, id: &str) -> Result<Option<User>, ServiceError>;

    /// Get a user by email.
    fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;
}

/// SQLite-backed implementation of both stores.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self, ServiceError> {
        let conn = Connection::open(path)
            .map_err(|e| ServiceError::Storage(format!("open database: {e}")))?;

        // Enable WAL mode for better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| ServiceError::Storage(format!("set WAL mode: {e}")))?;

        Self::init(conn)
    }

    /// Create an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self, ServiceError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ServiceError::Storage(format!("open in-memory database: {e}")))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, ServiceError> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| ServiceError::Storage(format!("schema init: {e}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, ServiceError> {
        self.conn
            .lock()
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn decode<T: serde::de::DeserializeOwned>(data: String) -> Result<T, ServiceError> {
    serde_json::from_str(&data).map_err(|e| ServiceError::Internal(format!("decode record: {e}")))
}

impl MeetingStore for SqliteStore {
    fn insert(&self, meeting: &Meeting) -> Result<(), ServiceError> {
        let data = serde_json::to_string(meeting)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.lock()?
            .execute(
                "INSERT INTO meetings (id, data, owner_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                (&meeting.id, &data, &meeting.owner_id, &meeting.created_at),
            )
            .map_err(|e| ServiceError::Storage(format!("insert meeting: {e}")))?;
        Ok(())
    }

    fn get_owned(&self, id: &str, owner_id: &str) -> Result<Option<Meeting>, ServiceError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT data FROM meetings WHERE id = ?1 AND owner_id = ?2")
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let data: Option<String> = stmt
            .query_row((id, owner_id), |row| row.get(0))
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(ServiceError::Storage(other.to_string())),
            })?;
        data.map(decode).transpose()
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Meeting>, ServiceError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT data FROM meetings WHERE owner_id = ?1 \
                 ORDER BY created_at DESC, rowid DESC",
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let rows = stmt
            .query_map((owner_id,), |row| row.get::<_, String>(0))
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut meetings = Vec::new();
        for row in rows {
            let data = row.map_err(|e| ServiceError::Storage(e.to_string()))?;
            meetings.push(decode(data)?);
        }
        Ok(meetings)
    }

    fn list_all(&self) -> Result<Vec<Meeting>, ServiceError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT data FROM meetings ORDER BY created_at DESC, rowid DESC")
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let rows = stmt
            .query_map((), |row| row.get::<_, String>(0))
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut meetings = Vec::new();
        for row in rows {
            let data = row.map_err(|e| ServiceError::Storage(e.to_string()))?;
            meetings.push(decode(data)?);
        }
        Ok(meetings)
    }
}

impl UserStore for SqliteStore {
    fn insert(&self, user: &User) -> Result<(), ServiceError> {
        let data =
            serde_json::to_string(user).map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.lock()?
            .execute(
                "INSERT INTO users (id, data, email, created_at) VALUES (?1, ?2, ?3, ?4)",
                (&user.id, &data, &user.email, &user.created_at),
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ServiceError::Conflict(format!("user with email '{}' already exists", user.email))
                } else {
                    ServiceError::Storage(format!("insert user: {e}"))
                }
            })?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<User>, ServiceError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT data FROM users WHERE id = ?1")
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let data: Option<String> = stmt
            .query_row((id,), |row| row.get(0))
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(ServiceError::Storage(other.to_string())),
            })?;
        data.map(decode).transpose()
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT data FROM users WHERE email = ?1")
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let data: Option<String> = stmt
            .query_row((email,), |row| row.get(0))
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(ServiceError::Storage(other.to_string())),
            })?;
        data.map(decode).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meetmash_core::{new_id, now_rfc3339};

    fn user(email: &str) -> User {
        let now = now_rfc3339();
        User {
            id: new_id(),
            email: email.to_string(),
            password_hash: None,
            provider: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    fn meeting(owner_id: &str, link: &str, created_at: &str) -> Meeting {
        Meeting {
            id: new_id(),
            owner_id: owner_id.to_string(),
            link: link.to_string(),
            external_meeting_id: None,
            duration: None,
            start_time: None,
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    #[test]
    fn user_roundtrip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let u = user("alice@example.com");
        UserStore::insert(&store, &u).unwrap();

        let by_id = store.get(&u.id).unwrap().unwrap();
        assert_eq!(by_id.email, "alice@example.com");
        let by_email = store.find_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, u.id);
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_conflict() {
        let store = SqliteStore::open_in_memory().unwrap();
        UserStore::insert(&store, &user("dup@example.com")).unwrap();
        let err = UserStore::insert(&store, &user("dup@example.com")).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn get_owned_requires_matching_owner() {
        let store = SqliteStore::open_in_memory().unwrap();
        let m = meeting("owner-a", "https://meet/1", "2026-01-01T10:00:00Z");
        MeetingStore::insert(&store, &m).unwrap();

        assert!(store.get_owned(&m.id, "owner-a").unwrap().is_some());
        assert!(store.get_owned(&m.id, "owner-b").unwrap().is_none());
        assert!(store.get_owned("missing", "owner-a").unwrap().is_none());
    }

    #[test]
    fn listings_are_newest_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        let old = meeting("owner-a", "https://meet/old", "2026-01-01T10:00:00Z");
        let mid = meeting("owner-b", "https://meet/mid", "2026-01-02T10:00:00Z");
        let new = meeting("owner-a", "https://meet/new", "2026-01-03T10:00:00Z");
        for m in [&old, &mid, &new] {
            MeetingStore::insert(&store, m).unwrap();
        }

        let owned = store.list_by_owner("owner-a").unwrap();
        assert_eq!(
            owned.iter().map(|m| m.link.as_str()).collect::<Vec<_>>(),
            vec!["https://meet/new", "https://meet/old"],
        );

        let all = store.list_all().unwrap();
        assert_eq!(
            all.iter().map(|m| m.link.as_str()).collect::<Vec<_>>(),
            vec!["https://meet/new", "https://meet/mid", "https://meet/old"],
        );
    }

    #[test]
    fn same_timestamp_breaks_ties_by_insertion_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = meeting("owner-a", "https://meet/first", "2026-01-01T10:00:00Z");
        let second = meeting("owner-a", "https://meet/second", "2026-01-01T10:00:00Z");
        MeetingStore::insert(&store, &first).unwrap();
        MeetingStore::insert(&store, &second).unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(all[0].link, "https://meet/second");
        assert_eq!(all[1].link, "https://meet/first");
    }
}
