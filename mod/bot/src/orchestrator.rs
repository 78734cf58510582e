//! Orchestrator client — the outbound boundary to the bot service.
//!
//! The core talks to the trait, never to reqwest directly, so tests
//! and alternative transports plug in without touching admission
//! control. A non-2xx response or transport failure always surfaces
//! as [`ServiceError::Dispatch`]; the underlying cause is logged here
//! and never echoed to the caller.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use meetmash_core::ServiceError;

use crate::model::{BotInstance, MeetingData};

/// The two orchestrator operations the core uses.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Ask the orchestrator to launch a bot for a meeting. Returns the
    /// opaque instance id.
    async fn create_instance(
        &self,
        user_id: &str,
        meeting_id: &str,
        meeting_data: &MeetingData,
    ) -> Result<String, ServiceError>;

    /// List the bot instances the orchestrator is running for a user.
    async fn list_instances_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<BotInstance>, ServiceError>;
}

/// Constant-backoff retry with a capped attempt count.
///
/// The default is a single attempt — admission control itself never
/// retries, and the caller is responsible for re-invocation. Operators
/// who want retries opt in through configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

/// HTTP implementation of [`Orchestrator`].
pub struct HttpOrchestrator {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct CreateInstanceRequest<'a> {
    user_id: &'a str,
    meeting_id: &'a str,
    meeting_data: &'a MeetingData,
}

#[derive(Deserialize)]
struct CreateInstanceResponse {
    instance_id: String,
}

impl HttpOrchestrator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_retry(base_url, RetryPolicy::default())
    }

    pub fn with_retry(base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        }
    }

    /// Send a request, retrying transport errors and 5xx responses up
    /// to the configured attempt count with constant backoff. Other
    /// non-2xx responses are returned to the caller unretried.
    async fn send(
        &self,
        what: &str,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ServiceError> {
        let attempts = self.retry.attempts.max(1);

        for attempt in 1..=attempts {
            let result = build().send().await;
            let retryable = match &result {
                Ok(resp) => resp.status().is_server_error(),
                Err(_) => true,
            };

            if retryable && attempt < attempts {
                match &result {
                    Ok(resp) => tracing::warn!(
                        endpoint = what,
                        status = %resp.status(),
                        attempt,
                        "orchestrator returned a server error, retrying"
                    ),
                    Err(e) => tracing::warn!(
                        endpoint = what,
                        error = %e,
                        attempt,
                        "orchestrator request failed, retrying"
                    ),
                }
                tokio::time::sleep(self.retry.backoff).await;
                continue;
            }

            return result.map_err(|e| {
                tracing::error!(endpoint = what, error = %e, "orchestrator unreachable");
                ServiceError::Dispatch("bot dispatch failed".into())
            });
        }

        Err(ServiceError::Dispatch("bot dispatch failed".into()))
    }
}

#[async_trait]
impl Orchestrator for HttpOrchestrator {
    async fn create_instance(
        &self,
        user_id: &str,
        meeting_id: &str,
        meeting_data: &MeetingData,
    ) -> Result<String, ServiceError> {
        let url = format!("{}/create-instance", self.base_url);
        let payload = CreateInstanceRequest {
            user_id,
            meeting_id,
            meeting_data,
        };

        let resp = self
            .send("create-instance", || self.http.post(&url).json(&payload))
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "orchestrator rejected create-instance");
            return Err(ServiceError::Dispatch("bot dispatch failed".into()));
        }

        let out: CreateInstanceResponse = resp.json().await.map_err(|e| {
            tracing::error!(error = %e, "orchestrator returned an unreadable create-instance response");
            ServiceError::Dispatch("bot dispatch failed".into())
        })?;
        Ok(out.instance_id)
    }

    async fn list_instances_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<BotInstance>, ServiceError> {
        let url = format!("{}/user-instances/{}", self.base_url, user_id);

        let resp = self.send("user-instances", || self.http.get(&url)).await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "orchestrator rejected user-instances");
            return Err(ServiceError::Dispatch("failed to fetch bot instances".into()));
        }

        resp.json().await.map_err(|e| {
            tracing::error!(error = %e, "orchestrator returned an unreadable user-instances response");
            ServiceError::Dispatch("failed to fetch bot instances".into())
        })
    }
}
