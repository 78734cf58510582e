//! Dispatch Admission Control — the time-window gate for bot creation.
//!
//! A dispatch request is admitted when the requested start time is at
//! most one hour ahead of the wall clock. Past-due meetings pass: the
//! gate only blocks meetings that are comfortably far in the future,
//! and there is no lower bound on how late a meeting may be.
//!
//! Two concurrent admitted requests for the same meeting will create
//! two bot instances — there is no idempotency key and no dispatched
//! flag on the meeting record. Accepted risk; the orchestrator names
//! instances deterministically per (user, meeting) and deduplicates
//! on its side if it cares to.

use std::sync::Arc;

use chrono::Utc;

use meeting::store::MeetingStore;
use meetmash_core::{Identity, ServiceError};

use crate::model::{BotInstance, DispatchOutcome, DispatchRequest, MeetingData};
use crate::orchestrator::Orchestrator;

/// Dispatch window: meetings starting more than this many hours from
/// now are denied (non-error) admission.
pub const ADMISSION_WINDOW_HOURS: f64 = 1.0;

/// Duration forwarded to the orchestrator when neither the request nor
/// the stored meeting carries one.
pub const DEFAULT_DURATION_MINUTES: &str = "60";

pub struct DispatchService {
    meetings: Arc<dyn MeetingStore>,
    orchestrator: Arc<dyn Orchestrator>,
}

impl DispatchService {
    pub fn new(meetings: Arc<dyn MeetingStore>, orchestrator: Arc<dyn Orchestrator>) -> Self {
        Self {
            meetings,
            orchestrator,
        }
    }

    /// Run the full admission flow for one dispatch request.
    ///
    /// The admission decision itself is never retried here: on
    /// orchestrator failure the caller gets a dispatch error and is
    /// responsible for re-invocation.
    pub async fn dispatch(
        &self,
        identity: &Identity,
        req: DispatchRequest,
    ) -> Result<DispatchOutcome, ServiceError> {
        let Identity::Session { user_id, email } = identity else {
            return Err(ServiceError::Unauthorized("no valid session".into()));
        };

        if req.meeting_id.trim().is_empty() {
            return Err(ServiceError::Validation("meeting_id is required".into()));
        }

        let meeting = self
            .meetings
            .get_owned(&req.meeting_id, user_id)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("meeting '{}' not found", req.meeting_id))
            })?;

        let start_time = req
            .start_time
            .as_deref()
            .ok_or_else(|| ServiceError::Validation("start_time is required".into()))?;
        let start = chrono::DateTime::parse_from_rfc3339(start_time).map_err(|_| {
            ServiceError::Validation("start_time must be an RFC 3339 timestamp".into())
        })?;

        let delta_hours =
            (start.with_timezone(&Utc) - Utc::now()).num_milliseconds() as f64 / 3_600_000.0;
        if delta_hours > ADMISSION_WINDOW_HOURS {
            return Ok(DispatchOutcome {
                scheduled: false,
                instance_id: None,
                message: "meeting is not upcoming (more than 1 hour away)".into(),
            });
        }

        let meeting_data = MeetingData {
            link: meeting.link.clone(),
            meeting_id: meeting.external_meeting_id.clone(),
            start_time: start_time.to_string(),
            duration: req
                .duration
                .or(meeting.duration)
                .unwrap_or_else(|| DEFAULT_DURATION_MINUTES.to_string()),
            title: format!("Meeting for {email}"),
        };

        let instance_id = self
            .orchestrator
            .create_instance(user_id, &meeting.id, &meeting_data)
            .await?;

        tracing::info!(
            meeting_id = %meeting.id,
            instance_id = %instance_id,
            "bot instance dispatched"
        );

        Ok(DispatchOutcome {
            scheduled: true,
            instance_id: Some(instance_id),
            message: "bot instance created successfully".into(),
        })
    }

    /// Proxy the caller's own instance listing to the orchestrator.
    pub async fn list_instances(
        &self,
        identity: &Identity,
    ) -> Result<Vec<BotInstance>, ServiceError> {
        let Identity::Session { user_id, .. } = identity else {
            return Err(ServiceError::Unauthorized("no valid session".into()));
        };
        self.orchestrator.list_instances_for_user(user_id).await
    }
}
