//! Account endpoints — registration and session login.
//!
//! Login verifies the argon2id hash stored on the user record and
//! issues an HS256 session token carrying the user id and email.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use meeting::model::{User, UserPublic};
use meetmash_core::{new_id, now_rfc3339, ServiceError, SessionClaims};

use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .with_state(state)
}

async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ServiceError::Validation("a valid email is required".into()));
    }
    if body.password.len() < 8 {
        return Err(ServiceError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }

    let password_hash = hash_password(&body.password)?;
    let now = now_rfc3339();
    let user = User {
        id: new_id(),
        email,
        password_hash: Some(password_hash),
        provider: None,
        created_at: now.clone(),
        updated_at: now,
    };
    state.users.insert(&user)?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "user": UserPublic::from(user),
        })),
    ))
}

async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    let email = body.email.trim().to_lowercase();
    let user = state
        .users
        .find_by_email(&email)?
        .ok_or_else(|| ServiceError::Unauthorized("invalid email or password".into()))?;

    let Some(hash) = user.password_hash.as_deref() else {
        // External-provider account without a local password.
        return Err(ServiceError::Unauthorized("invalid email or password".into()));
    };
    if !verify_password(&body.password, hash) {
        return Err(ServiceError::Unauthorized("invalid email or password".into()));
    }

    let expire_secs = state.config.session.expire_secs;
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user.id.clone(),
        email: user.email.clone(),
        sid: new_id(),
        iat: now,
        exp: now + expire_secs as i64,
    };
    let access_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.session.secret.as_bytes()),
    )
    .map_err(|e| ServiceError::Internal(format!("failed to sign session token: {e}")))?;

    tracing::info!(user_id = %user.id, "session issued");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: expire_secs,
    }))
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
    use argon2::Argon2;
    use password_hash::rand_core::OsRng;
    use password_hash::{PasswordHasher, SaltString};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ServiceError::Internal(format!("failed to hash password: {e}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::Argon2;
    use password_hash::{PasswordHash, PasswordVerifier};

    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
