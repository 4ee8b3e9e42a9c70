// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client for the external identity service that issues login session IDs.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const SESSION_DATA_PATH: &str = "/auth/v1/env/oauth/session-data";
const SESSION_HEADER: &str = "X-Session-ID";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Profile returned by the identity service for a valid session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdentityProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: String,
}

/// Identity verification failures.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The service answered and did not accept the session ID.
    #[error("Invalid session (identity service returned {0})")]
    Rejected(StatusCode),
    /// The service could not be reached or answered with garbage.
    #[error("Identity service unavailable: {0}")]
    Unreachable(String),
}

/// Verifies opaque external session IDs.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_session(&self, session_id: &str) -> Result<IdentityProfile, IdentityError>;
}

/// HTTP implementation of [`IdentityProvider`].
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building identity HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    async fn verify_session(&self, session_id: &str) -> Result<IdentityProfile, IdentityError> {
        let url = format!("{}{}", self.base_url, SESSION_DATA_PATH);

        let response = self
            .http
            .get(&url)
            .header(SESSION_HEADER, session_id)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Identity service request failed");
                IdentityError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Rejected(status));
        }

        response.json::<IdentityProfile>().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse identity service response");
            IdentityError::Unreachable(format!("malformed session data: {}", e))
        })
    }
}
