// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session issuing and lookup over any [`SessionStore`] backend.

use crate::db::SessionStore;
use crate::error::AppError;
use crate::models::{Session, UserProfile};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;

const TOKEN_BYTES: usize = 32;
/// Longest token accepted from a client before touching storage.
const MAX_TOKEN_LEN: usize = 128;

/// A freshly issued session token.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Session service: user upserts plus token issue, resolve and revoke.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    rng: SystemRandom,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            rng: SystemRandom::new(),
        }
    }

    /// Insert `profile` if no profile exists for its email.
    ///
    /// Returns the canonical profile; its `id` is the user ID for sessions.
    pub async fn upsert_user(&self, profile: &UserProfile) -> Result<UserProfile, AppError> {
        self.store.insert_user_if_absent(profile).await
    }

    /// Issue a new session for `user_id`.
    pub async fn create_session(&self, user_id: &str) -> Result<IssuedSession, AppError> {
        let token = self.generate_token()?;
        let session = Session::issue(token, user_id.to_string(), Utc::now());

        self.store.insert_session(&session).await?;

        tracing::info!(user_id, expires_at = %session.expires_at, "Session created");

        Ok(IssuedSession {
            token: session.session_token,
            expires_at: session.expires_at,
        })
    }

    /// Resolve a token to its session and owner, if still active now.
    pub async fn resolve_session(
        &self,
        token: &str,
    ) -> Result<Option<(Session, UserProfile)>, AppError> {
        self.resolve_session_at(token, Utc::now()).await
    }

    /// Resolve a token as of `now`. Unknown, malformed and expired tokens
    /// all resolve to `None`.
    pub async fn resolve_session_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<(Session, UserProfile)>, AppError> {
        if !is_well_formed_token(token) {
            return Ok(None);
        }

        let Some(session) = self.store.get_session(token).await? else {
            return Ok(None);
        };

        if !session.is_active_at(now) {
            tracing::debug!(user_id = %session.user_id, "Ignoring expired session");
            return Ok(None);
        }

        match self.store.get_user(&session.user_id).await? {
            Some(user) => Ok(Some((session, user))),
            None => {
                tracing::warn!(user_id = %session.user_id, "Session references missing user");
                Ok(None)
            }
        }
    }

    /// Delete the session for `token`, if any.
    pub async fn invalidate_session(&self, token: &str) -> Result<(), AppError> {
        if !is_well_formed_token(token) {
            return Ok(());
        }
        self.store.delete_session(token).await
    }

    fn generate_token(&self) -> Result<String, AppError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }
}

/// Tokens double as document IDs, so reject anything that could not have
/// been issued here.
fn is_well_formed_token(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
