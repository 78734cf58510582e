use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;

use meetmash_core::{Identity, ServiceError};

use crate::model::CreateMeeting;
use crate::service::MeetingGateway;

type GatewayState = Arc<MeetingGateway>;

/// Build the meeting API router. The binary applies the identity
/// middleware on top, so every handler receives an [`Identity`]
/// extension.
pub fn router(gateway: Arc<MeetingGateway>) -> Router {
    Router::new()
        .route("/meetings", get(list_my_meetings).post(create_meeting))
        .route("/orchestrator/meetings", get(list_all_meetings))
        .route("/user-meetings", get(list_user_meetings))
        .with_state(gateway)
}

// ---------------------------------------------------------------------------
// POST /meetings
// ---------------------------------------------------------------------------

async fn create_meeting(
    State(gateway): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Json(fields): Json<CreateMeeting>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let meeting = gateway.create_meeting(&identity, fields)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "meeting": meeting,
        })),
    ))
}

// ---------------------------------------------------------------------------
// GET /meetings
// ---------------------------------------------------------------------------

async fn list_my_meetings(
    State(gateway): State<GatewayState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let meetings = gateway.list_own_meetings(&identity)?;
    Ok(Json(serde_json::json!({ "meetings": meetings })))
}

// ---------------------------------------------------------------------------
// GET /orchestrator/meetings
// ---------------------------------------------------------------------------

async fn list_all_meetings(
    State(gateway): State<GatewayState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let meetings = gateway.list_all_meetings(&identity)?;
    Ok(Json(serde_json::json!({ "meetings": meetings })))
}

// ---------------------------------------------------------------------------
// GET /user-meetings?userId=ID
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct UserMeetingsQuery {
    /// The documented parameter name is `userId`; `user_id` is also
    /// accepted.
    #[serde(default, alias = "userId")]
    user_id: Option<String>,
}

async fn list_user_meetings(
    State(gateway): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<UserMeetingsQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let (user, meetings) = gateway.list_meetings_for_user(&identity, query.user_id.as_deref())?;
    Ok(Json(serde_json::json!({
        "success": true,
        "user": user,
        "count": meetings.len(),
        "meetings": meetings,
    })))
}
