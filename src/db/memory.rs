// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process session store.
//!
//! Used by tests and by local runs with `SESSION_STORE=memory`. Contents are
//! lost on restart.

use crate::db::SessionStore;
use crate::error::AppError;
use crate::models::{Session, UserProfile};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryDb {
    /// Keyed by normalized email
    users: DashMap<String, UserProfile>,
    /// Keyed by session token
    sessions: DashMap<String, Session>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[async_trait]
impl SessionStore for MemoryDb {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().id == user_id)
            .map(|entry| entry.value().clone()))
    }

    async fn insert_user_if_absent(&self, profile: &UserProfile) -> Result<UserProfile, AppError> {
        let stored = self
            .users
            .entry(profile.storage_key())
            .or_insert_with(|| profile.clone());
        Ok(stored.value().clone())
    }

    async fn insert_session(&self, session: &Session) -> Result<(), AppError> {
        match self.sessions.entry(session.session_token.clone()) {
            Entry::Occupied(_) => Err(AppError::Database(
                "Session token already exists".to_string(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(session.clone());
                Ok(())
            }
        }
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session>, AppError> {
        Ok(self.sessions.get(token).map(|entry| entry.value().clone()))
    }

    async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        self.sessions.remove(token);
        Ok(())
    }
}
