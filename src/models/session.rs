// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local login sessions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long an issued session token stays valid.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Session record stored in Firestore (document ID is the token).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_token: String,
    /// Owning [`UserProfile`](super::UserProfile) ID
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Build a session issued at `now`, expiring [`SESSION_TTL_DAYS`] later.
    pub fn issue(session_token: String, user_id: String, now: DateTime<Utc>) -> Self {
        Self {
            session_token,
            user_id,
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
            created_at: now,
        }
    }

    /// A session is usable strictly before its expiry instant.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
