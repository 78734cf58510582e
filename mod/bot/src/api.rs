use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;

use meetmash_core::{Identity, ServiceError};

use crate::dispatch::DispatchService;
use crate::model::DispatchRequest;

pub fn router(service: Arc<DispatchService>) -> Router {
    Router::new()
        .route("/bot-instances", get(list_bot_instances).post(dispatch_bot))
        .with_state(service)
}

async fn dispatch_bot(
    State(service): State<Arc<DispatchService>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<DispatchRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let outcome = service.dispatch(&identity, req).await?;
    if outcome.scheduled {
        Ok(Json(json!({
            "success": true,
            "scheduled": true,
            "instance_id": outcome.instance_id,
            "message": outcome.message,
        })))
    } else {
        Ok(Json(json!({
            "scheduled": false,
            "message": outcome.message,
        })))
    }
}

async fn list_bot_instances(
    State(service): State<Arc<DispatchService>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let instances = service.list_instances(&identity).await?;
    Ok(Json(json!({ "instances": instances })))
}
