// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_IDENTITY_BASE_URL: &str = "https://demobackend.emergentagent.com";
const DEFAULT_FIRESTORE_DATABASE: &str = "phool";

/// Which backend holds users and sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStoreKind {
    Firestore,
    /// In-process store; sessions are lost on restart.
    Memory,
}

impl std::str::FromStr for SessionStoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid("SESSION_STORE", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key. Identification requests fail with a configuration
    /// error while this is unset.
    pub gemini_api_key: Option<String>,
    /// Gemini model selector
    pub gemini_model: String,
    /// Gemini REST API base URL
    pub gemini_api_url: String,
    /// Base URL of the external identity service
    pub identity_base_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Firestore database ID
    pub firestore_database: String,
    pub session_store: SessionStoreKind,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            gemini_api_key: env::var("GEMINI_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_url: env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_URL.to_string()),
            identity_base_url: env::var("IDENTITY_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_IDENTITY_BASE_URL.to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            firestore_database: env::var("FIRESTORE_DATABASE")
                .unwrap_or_else(|_| DEFAULT_FIRESTORE_DATABASE.to_string()),
            session_store: env::var("SESSION_STORE")
                .unwrap_or_else(|_| "firestore".to_string())
                .parse()?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8001".to_string())
                .parse()
                .unwrap_or(8001),
        })
    }

    /// Config for tests: in-memory store, dummy credential, no network defaults.
    pub fn test_default() -> Self {
        Self {
            gemini_api_key: Some("test_gemini_key".to_string()),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_url: "http://127.0.0.1:9".to_string(),
            identity_base_url: "http://127.0.0.1:9".to_string(),
            gcp_project_id: "test-project".to_string(),
            firestore_database: DEFAULT_FIRESTORE_DATABASE.to_string(),
            session_store: SessionStoreKind::Memory,
            frontend_url: "http://localhost:3000".to_string(),
            port: 8001,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
