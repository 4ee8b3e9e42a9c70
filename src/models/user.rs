//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
///
/// Document ID is the normalized email (see [`UserProfile::storage_key`]),
/// so an email maps to at most one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID issued by the identity service on first login
    pub id: String,
    pub email: String,
    /// Display name
    pub name: String,
    /// Profile picture URL
    pub picture: String,
    /// When the profile was first created (RFC3339)
    pub created_at: String,
}

impl UserProfile {
    /// Key under which the profile is stored.
    pub fn storage_key(&self) -> String {
        email_key(&self.email)
    }
}

/// Normalize an email for use as a document ID.
///
/// Firestore document IDs must not contain `/`, so the lowercased email is
/// percent-encoded.
pub fn email_key(email: &str) -> String {
    urlencoding::encode(&email.trim().to_lowercase()).into_owned()
}
