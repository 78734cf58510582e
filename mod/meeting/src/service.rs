//! Meeting Access Gateway — ownership scoping over the record store.
//!
//! Every operation states explicitly which [`Identity`] variants it
//! accepts; authorization failures short-circuit before the store is
//! touched. The two machine scopes exist for least privilege: the
//! orchestrator legitimately needs the full collection to plan
//! dispatch, while the per-user integration must not be able to
//! enumerate anyone else.

use std::sync::Arc;

use meetmash_core::{Identity, ServiceError, new_id, now_rfc3339};

use crate::model::{CreateMeeting, Meeting, MeetingPublic, UserPublic};
use crate::store::{MeetingStore, UserStore};

pub struct MeetingGateway {
    meetings: Arc<dyn MeetingStore>,
    users: Arc<dyn UserStore>,
}

impl MeetingGateway {
    pub fn new(meetings: Arc<dyn MeetingStore>, users: Arc<dyn UserStore>) -> Self {
        Self { meetings, users }
    }

    /// Create a meeting owned by the session caller.
    ///
    /// Requires a session identity and a non-empty link. `owner_id` is
    /// always taken from the session, never from the request body.
    pub fn create_meeting(
        &self,
        identity: &Identity,
        fields: CreateMeeting,
    ) -> Result<Meeting, ServiceError> {
        let Identity::Session { user_id, .. } = identity else {
            return Err(ServiceError::Unauthorized("no valid session".into()));
        };

        if fields.link.trim().is_empty() {
            return Err(ServiceError::Validation("meeting link is required".into()));
        }

        let now = now_rfc3339();
        let meeting = Meeting {
            id: new_id(),
            owner_id: user_id.clone(),
            link: fields.link,
            external_meeting_id: fields.external_meeting_id,
            duration: fields.duration,
            start_time: fields.start_time,
            created_at: now.clone(),
            updated_at: now,
        };
        self.meetings.insert(&meeting)?;

        tracing::info!(meeting_id = %meeting.id, owner_id = %meeting.owner_id, "meeting created");
        Ok(meeting)
    }

    /// List the session caller's own meetings, newest-created-first.
    pub fn list_own_meetings(&self, identity: &Identity) -> Result<Vec<Meeting>, ServiceError> {
        let Identity::Session { user_id, .. } = identity else {
            return Err(ServiceError::Unauthorized("no valid session".into()));
        };
        self.meetings.list_by_owner(user_id)
    }

    /// List every meeting in the store, newest-created-first.
    ///
    /// This is an elevated, cross-tenant read path: only the
    /// orchestrator machine scope is accepted. A valid session is
    /// rejected like any other identity.
    pub fn list_all_meetings(&self, identity: &Identity) -> Result<Vec<Meeting>, ServiceError> {
        if *identity != Identity::Orchestrator {
            return Err(ServiceError::Unauthorized("invalid API key".into()));
        }
        self.meetings.list_all()
    }

    /// List one named user's meetings for the per-user machine scope.
    ///
    /// The returned user carries only public fields, and `owner_id` is
    /// omitted from each meeting — the caller supplied the id
    /// explicitly and gains nothing from having it echoed back.
    ///
    /// Authorization is checked before the target parameter: a caller
    /// without the right credential learns nothing about what the
    /// endpoint expects.
    pub fn list_meetings_for_user(
        &self,
        identity: &Identity,
        target_user_id: Option<&str>,
    ) -> Result<(UserPublic, Vec<MeetingPublic>), ServiceError> {
        if *identity != Identity::UserReader {
            return Err(ServiceError::Unauthorized("invalid API key".into()));
        }

        let target_user_id = target_user_id
            .ok_or_else(|| ServiceError::Validation("missing user_id parameter".into()))?;

        let user = self
            .users
            .get(target_user_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("user '{target_user_id}' not found")))?;

        let meetings = self
            .meetings
            .list_by_owner(target_user_id)?
            .into_iter()
            .map(MeetingPublic::from)
            .collect();

        Ok((user.into(), meetings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::User;
    use crate::store::SqliteStore;

    fn gateway() -> (Arc<SqliteStore>, MeetingGateway) {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let gw = MeetingGateway::new(store.clone(), store.clone());
        (store, gw)
    }

    fn session(user_id: &str) -> Identity {
        Identity::Session {
            user_id: user_id.to_string(),
            email: format!("{user_id}@example.com"),
        }
    }

    fn seed_user(store: &SqliteStore, id: &str) {
        let now = now_rfc3339();
        UserStore::insert(
            store,
            &User {
                id: id.to_string(),
                email: format!("{id}@example.com"),
                password_hash: Some("$argon2id$stub".into()),
                provider: None,
                created_at: now.clone(),
                updated_at: now,
            },
        )
        .unwrap();
    }

    fn create(gw: &MeetingGateway, identity: &Identity, link: &str) -> Meeting {
        gw.create_meeting(
            identity,
            CreateMeeting {
                link: link.to_string(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn create_requires_session() {
        let (_, gw) = gateway();
        for identity in [Identity::Anonymous, Identity::Orchestrator, Identity::UserReader] {
            let err = gw
                .create_meeting(&identity, CreateMeeting { link: "x".into(), ..Default::default() })
                .unwrap_err();
            assert!(matches!(err, ServiceError::Unauthorized(_)));
        }
    }

    #[test]
    fn create_requires_link() {
        let (_, gw) = gateway();
        let err = gw
            .create_meeting(&session("u1"), CreateMeeting::default())
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = gw
            .create_meeting(&session("u1"), CreateMeeting { link: "   ".into(), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn created_meeting_round_trips_fields() {
        let (_, gw) = gateway();
        let created = gw
            .create_meeting(
                &session("u1"),
                CreateMeeting {
                    link: "https://zoom.us/j/42".into(),
                    external_meeting_id: Some("z-42".into()),
                    duration: Some("90".into()),
                    start_time: None,
                },
            )
            .unwrap();
        assert_eq!(created.owner_id, "u1");

        let listed = gw.list_own_meetings(&session("u1")).unwrap();
        assert_eq!(listed.len(), 1);
        let m = &listed[0];
        assert_eq!(m.id, created.id);
        assert_eq!(m.link, "https://zoom.us/j/42");
        assert_eq!(m.external_meeting_id.as_deref(), Some("z-42"));
        assert_eq!(m.duration.as_deref(), Some("90"));
        assert!(!m.created_at.is_empty());
        assert!(!m.updated_at.is_empty());
    }

    #[test]
    fn own_listing_never_crosses_owners() {
        let (_, gw) = gateway();
        create(&gw, &session("u1"), "https://meet/u1-a");
        create(&gw, &session("u2"), "https://meet/u2-a");
        create(&gw, &session("u1"), "https://meet/u1-b");

        let mine = gw.list_own_meetings(&session("u1")).unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|m| m.owner_id == "u1"));

        let theirs = gw.list_own_meetings(&session("u2")).unwrap();
        assert_eq!(theirs.len(), 1);
        assert_eq!(theirs[0].owner_id, "u2");
    }

    #[test]
    fn list_all_requires_orchestrator_scope() {
        let (_, gw) = gateway();
        create(&gw, &session("u1"), "https://meet/1");

        for identity in [Identity::Anonymous, Identity::UserReader, session("u1")] {
            let err = gw.list_all_meetings(&identity).unwrap_err();
            assert!(matches!(err, ServiceError::Unauthorized(_)));
        }

        let all = gw.list_all_meetings(&Identity::Orchestrator).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn per_user_listing_requires_user_reader_scope() {
        let (store, gw) = gateway();
        seed_user(&store, "u1");
        create(&gw, &session("u1"), "https://meet/1");

        for identity in [Identity::Anonymous, Identity::Orchestrator, session("u1")] {
            let err = gw.list_meetings_for_user(&identity, Some("u1")).unwrap_err();
            assert!(matches!(err, ServiceError::Unauthorized(_)));
        }

        let (user, meetings) = gw
            .list_meetings_for_user(&Identity::UserReader, Some("u1"))
            .unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.email, "u1@example.com");
        assert_eq!(meetings.len(), 1);
    }

    #[test]
    fn per_user_listing_unknown_user_is_not_found() {
        let (_, gw) = gateway();
        let err = gw
            .list_meetings_for_user(&Identity::UserReader, Some("ghost"))
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn per_user_listing_checks_credential_before_parameter() {
        let (_, gw) = gateway();
        // Wrong scope and missing parameter: the credential failure wins.
        let err = gw
            .list_meetings_for_user(&Identity::Anonymous, None)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        // Right scope, missing parameter: caller error.
        let err = gw
            .list_meetings_for_user(&Identity::UserReader, None)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
