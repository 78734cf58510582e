use serde::{Deserialize, Serialize};

use meeting::model::opaque_string;

/// Request body for bot dispatch.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchRequest {
    /// Target meeting id. The meeting is resolved scoped to the
    /// caller's session. Presence is validated by admission control so
    /// an omitted field is a caller error, not a body-shape rejection.
    #[serde(default)]
    pub meeting_id: String,

    /// Requested RFC 3339 start time. Required — admission control
    /// cannot evaluate proximity without it.
    #[serde(default)]
    pub start_time: Option<String>,

    /// Duration override, opaque string (string or number accepted).
    #[serde(default, deserialize_with = "opaque_string")]
    pub duration: Option<String>,
}

/// Result of one admission decision.
///
/// `scheduled == false` is not an error: the meeting is simply too far
/// in the future and the caller may retry later.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub scheduled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    pub message: String,
}

/// Meeting payload forwarded to the orchestrator.
///
/// Field names follow the orchestrator's wire format exactly —
/// `meetingId` is the one camelCase holdout it expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingData {
    pub link: String,

    #[serde(rename = "meetingId", skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<String>,

    pub start_time: String,

    pub duration: String,

    pub title: String,
}

/// An ephemeral bot instance summary as reported by the orchestrator.
/// The core never persists these; unknown fields pass through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotInstance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meeting_data_wire_format() {
        let data = MeetingData {
            link: "https://zoom.us/j/42".into(),
            meeting_id: Some("z-42".into()),
            start_time: "2026-08-27T10:00:00Z".into(),
            duration: "60".into(),
            title: "Meeting for alice@example.com".into(),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "link": "https://zoom.us/j/42",
                "meetingId": "z-42",
                "start_time": "2026-08-27T10:00:00Z",
                "duration": "60",
                "title": "Meeting for alice@example.com",
            })
        );
    }

    #[test]
    fn dispatch_request_duration_accepts_number() {
        let req: DispatchRequest = serde_json::from_value(serde_json::json!({
            "meeting_id": "m1",
            "start_time": "2026-08-27T10:00:00Z",
            "duration": 30,
        }))
        .unwrap();
        assert_eq!(req.duration.as_deref(), Some("30"));
    }

    #[test]
    fn bot_instance_passes_unknown_fields_through() {
        let raw = serde_json::json!({
            "instance_id": "bot-u1-m1",
            "status": "running",
            "pod_name": "bot-u1-m1",
        });
        let instance: BotInstance = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(instance.instance_id.as_deref(), Some("bot-u1-m1"));
        assert_eq!(serde_json::to_value(&instance).unwrap(), raw);
    }
}
