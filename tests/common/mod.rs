// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
};
use phool_api::config::Config;
use phool_api::db::{FirestoreDb, MemoryDb};
use phool_api::routes::create_router;
use phool_api::services::{
    ClassificationError, FlowerClassifier, IdentityError, IdentityProfile, IdentityProvider,
    SessionService, StagedImage,
};
use phool_api::AppState;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Session ID the stub identity service accepts.
#[allow(dead_code)]
pub const VALID_EXTERNAL_SESSION: &str = "ext-session-rose";
/// Session ID that makes the stub identity service look unreachable.
#[allow(dead_code)]
pub const UNREACHABLE_EXTERNAL_SESSION: &str = "ext-session-timeout";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection against the emulator.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project", "phool-test")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Identity service stand-in.
pub struct StubIdentity;

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn verify_session(&self, session_id: &str) -> Result<IdentityProfile, IdentityError> {
        match session_id {
            VALID_EXTERNAL_SESSION => Ok(IdentityProfile {
                id: "user-rose".to_string(),
                email: "rose@example.com".to_string(),
                name: "Rose Gardener".to_string(),
                picture: "https://example.com/rose.png".to_string(),
            }),
            UNREACHABLE_EXTERNAL_SESSION => Err(IdentityError::Unreachable(
                "operation timed out".to_string(),
            )),
            _ => Err(IdentityError::Rejected(reqwest::StatusCode::UNAUTHORIZED)),
        }
    }
}

/// Classifier stand-in that records what it was given.
pub struct StubClassifier {
    reply: Result<String, String>,
    pub calls: AtomicUsize,
    /// Path of the staged file seen on the last call
    pub last_path: Mutex<Option<PathBuf>>,
    /// Staged bytes seen on the last call
    pub last_bytes: Mutex<Option<Vec<u8>>>,
    pub last_mime: Mutex<Option<String>>,
}

#[allow(dead_code)]
impl StubClassifier {
    pub fn replying(reply: &str) -> Self {
        Self::with_result(Ok(reply.to_string()))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_result(Err(message.to_string()))
    }

    fn with_result(reply: Result<String, String>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_path: Mutex::new(None),
            last_bytes: Mutex::new(None),
            last_mime: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn staged_path(&self) -> Option<PathBuf> {
        self.last_path.lock().unwrap().clone()
    }
}

#[async_trait]
impl FlowerClassifier for StubClassifier {
    async fn classify(&self, image: &StagedImage) -> Result<String, ClassificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_path.lock().unwrap() = Some(image.path().to_path_buf());
        *self.last_bytes.lock().unwrap() = std::fs::read(image.path()).ok();
        *self.last_mime.lock().unwrap() = Some(image.mime_type().to_string());

        self.reply
            .clone()
            .map_err(|message| ClassificationError::Request(message))
    }
}

/// Test app wired to an in-memory store and stub collaborators.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub db: Arc<MemoryDb>,
    pub classifier: Arc<StubClassifier>,
}

/// Create a test app whose classifier returns `reply`.
#[allow(dead_code)]
pub fn create_test_app(reply: &str) -> TestApp {
    create_test_app_with(Arc::new(StubClassifier::replying(reply)), true)
}

/// Create a test app with a given classifier; `configured = false` mimics a
/// missing Gemini API key.
#[allow(dead_code)]
pub fn create_test_app_with(classifier: Arc<StubClassifier>, configured: bool) -> TestApp {
    let mut config = Config::test_default();
    if !configured {
        config.gemini_api_key = None;
    }

    let db = Arc::new(MemoryDb::new());
    let state = Arc::new(AppState {
        config,
        sessions: SessionService::new(db.clone()),
        identity: Arc::new(StubIdentity),
        classifier: configured.then(|| classifier.clone() as Arc<dyn FlowerClassifier>),
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        db,
        classifier,
    }
}

/// Build a single-file multipart body. Returns (content type header, body).
#[allow(dead_code)]
pub fn multipart_body(field: &str, content_type: &str, data: &[u8]) -> (String, Vec<u8>) {
    let boundary = "phool-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"upload\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={boundary}"), body)
}

/// Build an identify-flower request, optionally with a session token.
#[allow(dead_code)]
pub fn identify_request(content_type: &str, data: &[u8], token: Option<&str>) -> Request<Body> {
    let (multipart_type, body) = multipart_body("file", content_type, data);
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/identify-flower")
        .header(header::CONTENT_TYPE, multipart_type);
    if let Some(token) = token {
        builder = builder.header("X-Session-Id", token);
    }
    builder.body(Body::from(body)).unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log in through the API and return the issued session token.
#[allow(dead_code)]
pub async fn login(router: &axum::Router) -> String {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/profile")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({ "session_id": VALID_EXTERNAL_SESSION }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await["session_token"]
        .as_str()
        .unwrap()
        .to_string()
}
