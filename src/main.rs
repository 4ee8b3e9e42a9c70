// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Phool API Server
//!
//! Identifies flowers in uploaded photos and manages login sessions issued
//! on top of an external identity service.

use phool_api::{
    config::{Config, SessionStoreKind},
    db::{FirestoreDb, MemoryDb, SessionStore},
    services::{FlowerClassifier, GeminiClassifier, IdentityClient, SessionService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Phool API");

    let store: Arc<dyn SessionStore> = match config.session_store {
        SessionStoreKind::Firestore => Arc::new(
            FirestoreDb::new(&config.gcp_project_id, &config.firestore_database).await?,
        ),
        SessionStoreKind::Memory => {
            tracing::warn!("Using in-memory session store; sessions are lost on restart");
            Arc::new(MemoryDb::new())
        }
    };

    let identity = Arc::new(IdentityClient::new(&config.identity_base_url)?);
    tracing::info!(base_url = %config.identity_base_url, "Identity client initialized");

    let classifier: Option<Arc<dyn FlowerClassifier>> = match &config.gemini_api_key {
        Some(key) => {
            let client = GeminiClassifier::new(&config.gemini_api_url, &config.gemini_model, key)?;
            tracing::info!(model = %config.gemini_model, "Gemini classifier initialized");
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set; flower identification will fail");
            None
        }
    };

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        sessions: SessionService::new(store),
        identity,
        classifier,
    });

    // Build router
    let app = phool_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("phool_api=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
