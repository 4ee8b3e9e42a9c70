// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Phool: flower identification API
//!
//! This crate provides the backend API that identifies flowers in uploaded
//! photos with Gemini, plus a small session layer on top of an external
//! identity service.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{FlowerClassifier, IdentityProvider, SessionService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionService,
    pub identity: Arc<dyn IdentityProvider>,
    /// `None` when no Gemini API key is configured.
    pub classifier: Option<Arc<dyn FlowerClassifier>>,
}
