//! Request identity resolution.
//!
//! Every inbound request is classified exactly once into an [`Identity`],
//! which handlers then pattern-match explicitly. Three credential kinds
//! exist: an interactive session (JWT), and two independent machine
//! shared secrets with different scopes. The two secrets are different
//! trust domains — a token valid for one scope is never accepted for
//! the other.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// The resolved identity of one request.
///
/// Produced once per request by [`IdentityResolver::resolve`] and stored
/// in request extensions. Every gateway operation states which variants
/// it accepts; anything else is rejected at that boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Interactive session, established via login.
    Session { user_id: String, email: String },

    /// Machine caller holding the orchestrator shared secret.
    /// Authorizes cross-tenant reads of the full meeting collection.
    Orchestrator,

    /// Machine caller holding the per-user read shared secret.
    /// Authorizes reading one explicitly named user's meetings.
    UserReader,

    /// No valid credential found.
    Anonymous,
}

/// Session JWT claims payload. Signed by the login endpoint, validated
/// here. The signing material belongs to the auth collaborator; the
/// resolver only holds the decoding half.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: user id.
    pub sub: String,

    /// User email, carried so handlers don't need a store round-trip.
    pub email: String,

    /// Session id.
    pub sid: String,

    /// Issued at (unix timestamp).
    pub iat: i64,

    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Classifies request headers into an [`Identity`]. Pure — no I/O, no
/// side effects; error signaling is deferred to the calling gateway.
pub struct IdentityResolver {
    orchestrator_key: String,
    user_reader_key: String,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl IdentityResolver {
    pub fn new(session_secret: &str, orchestrator_key: String, user_reader_key: String) -> Self {
        Self {
            orchestrator_key,
            user_reader_key,
            decoding_key: DecodingKey::from_secret(session_secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Resolve the request headers into exactly one identity.
    ///
    /// Order: orchestrator secret (exact, case-sensitive), per-user
    /// secret (exact, case-sensitive), then session JWT. An empty
    /// configured secret never matches anything.
    pub fn resolve(&self, headers: &HeaderMap) -> Identity {
        let Some(token) = bearer_token(headers) else {
            return Identity::Anonymous;
        };

        if !self.orchestrator_key.is_empty() && token == self.orchestrator_key {
            return Identity::Orchestrator;
        }
        if !self.user_reader_key.is_empty() && token == self.user_reader_key {
            return Identity::UserReader;
        }

        match jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Identity::Session {
                user_id: data.claims.sub,
                email: data.claims.email,
            },
            Err(_) => Identity::Anonymous,
        }
    }
}

/// Extract the value of `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Middleware that resolves the identity once and stores it in request
/// extensions for handlers to pattern-match.
pub async fn identity_middleware(
    State(resolver): State<Arc<IdentityResolver>>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = resolver.resolve(request.headers());
    request.extensions_mut().insert(identity);
    next.run(request).await
}
