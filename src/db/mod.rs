//! Database layer (Firestore, plus an in-process store for tests and local runs).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Session, UserProfile};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// User profiles, keyed by normalized email
    pub const USERS: &str = "users";
    /// Login sessions, keyed by session token
    pub const SESSIONS: &str = "user_sessions";
}

/// Storage primitives for users and sessions.
///
/// Expiry and token rules live in [`crate::services::SessionService`];
/// backends only store and fetch records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Get a user by ID.
    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, AppError>;

    /// Store `profile` unless a profile with the same email exists.
    ///
    /// Returns whichever profile is stored afterwards.
    async fn insert_user_if_absent(&self, profile: &UserProfile) -> Result<UserProfile, AppError>;

    /// Store a new session. Fails if the token is already present.
    async fn insert_session(&self, session: &Session) -> Result<(), AppError>;

    /// Get a session by token, expired or not.
    async fn get_session(&self, token: &str) -> Result<Option<Session>, AppError>;

    /// Delete a session. Deleting a missing token succeeds.
    async fn delete_session(&self, token: &str) -> Result<(), AppError>;
}
