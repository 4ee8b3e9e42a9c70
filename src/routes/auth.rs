// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, profile and logout routes.

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::{session_token, AuthUser};
use crate::models::UserProfile;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/profile", post(create_profile_session))
        .route("/api/logout", post(logout))
}

/// Routes that need an authenticated caller.
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/user/profile", get(get_user_profile))
}

// ─── Login ───────────────────────────────────────────────────

/// Login request carrying the identity service's session ID.
#[derive(Debug, Deserialize, Validate)]
pub struct AuthProfileRequest {
    #[validate(length(min = 1, max = 512))]
    pub session_id: String,
}

/// Public user profile.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: String,
}

impl From<UserProfile> for UserResponse {
    fn from(user: UserProfile) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            picture: user.picture,
        }
    }
}

/// Login response.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthProfileResponse {
    pub user: UserResponse,
    pub session_token: String,
    /// RFC3339
    pub expires_at: String,
}

/// Exchange an identity-service session ID for a local session token.
async fn create_profile_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AuthProfileRequest>,
) -> Result<Json<AuthProfileResponse>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(format!("Invalid session_id: {}", e)))?;

    // The session ID is forwarded as a header value
    let session_id = body.session_id.trim();
    if HeaderValue::from_str(session_id).is_err() {
        return Err(AppError::BadRequest(
            "Invalid session_id: contains characters not allowed in a header".to_string(),
        ));
    }

    let identity = state.identity.verify_session(session_id).await?;

    let candidate = UserProfile {
        id: identity.id,
        email: identity.email,
        name: identity.name,
        picture: identity.picture,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    let user = state.sessions.upsert_user(&candidate).await?;
    let issued = state.sessions.create_session(&user.id).await?;

    tracing::info!(user_id = %user.id, "User authenticated");

    Ok(Json(AuthProfileResponse {
        user: user.into(),
        session_token: issued.token,
        expires_at: format_utc_rfc3339(issued.expires_at),
    }))
}

// ─── Profile ─────────────────────────────────────────────────

/// Get the caller's profile.
async fn get_user_profile(Extension(caller): Extension<AuthUser>) -> Json<UserResponse> {
    Json(caller.user.into())
}

// ─── Logout ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub message: String,
}

/// Revoke the presented session, if any. Always succeeds.
async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<MessageResponse> {
    if let Some(token) = session_token(&headers) {
        if let Err(e) = state.sessions.invalidate_session(token).await {
            tracing::warn!(error = %e, "Failed to delete session on logout");
        }
    }

    Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}
