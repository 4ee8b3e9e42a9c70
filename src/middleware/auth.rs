// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.
//!
//! [`attach_session`] runs on every API route and, when the request carries
//! a live `X-Session-Id`, stores the caller as an [`AuthUser`] extension.
//! Routes that need a caller add [`require_auth`]; others read the optional
//! caller through [`MaybeUser`].

use crate::error::AppError;
use crate::models::UserProfile;
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::sync::Arc;

/// Header carrying the local session token.
pub const SESSION_HEADER: &str = "x-session-id";

/// Authenticated caller resolved from a session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: UserProfile,
}

impl AuthUser {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

/// Session token presented by the client, if any.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the presented session token and attach the caller, if valid.
///
/// Unknown or expired tokens leave the request anonymous.
pub async fn attach_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(request.headers()).map(str::to_string);

    if let Some(token) = token {
        if let Some((_, user)) = state.sessions.resolve_session(&token).await? {
            request.extensions_mut().insert(AuthUser { user });
        }
    }

    Ok(next.run(request).await)
}

/// Middleware that rejects requests without a resolved caller.
pub async fn require_auth(request: Request, next: Next) -> Result<Response, AppError> {
    if request.extensions().get::<AuthUser>().is_none() {
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Optional caller for routes that also serve anonymous requests.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<AuthUser>().cloned()))
    }
}
