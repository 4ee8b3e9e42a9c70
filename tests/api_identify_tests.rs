// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flower identification endpoint tests.
//!
//! These tests verify that:
//! 1. Non-image uploads are rejected before the classifier runs
//! 2. Model replies are normalized and defaulted into a full result
//! 3. The staged upload is removed whether classification succeeds or fails
//! 4. Results carry the caller's user ID only for valid sessions

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use phool_api::routes::identify::MAX_UPLOAD_BYTES;
use std::sync::Arc;
use tower::ServiceExt;

mod common;

use common::{StubClassifier, create_test_app, create_test_app_with, identify_request, json_body};

const ROSE_REPLY: &str = "```json\n{\"flower_name\":\"Rose\",\"confidence\":\"High\"}\n```";

#[tokio::test]
async fn test_health() {
    let app = create_test_app(ROSE_REPLY);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "Phool Flower Identification API");
}

#[tokio::test]
async fn test_non_image_rejected_without_classifying() {
    let app = create_test_app(ROSE_REPLY);

    for content_type in ["text/plain", "application/pdf", "imagex/png"] {
        let response = app
            .router
            .clone()
            .oneshot(identify_request(content_type, b"not an image", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["details"], "File must be an image");
    }

    assert_eq!(app.classifier.call_count(), 0);
}

#[tokio::test]
async fn test_missing_file_field() {
    let app = create_test_app(ROSE_REPLY);
    let (content_type, body) = common::multipart_body("photo", "image/png", b"png");

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/identify-flower")
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.classifier.call_count(), 0);
}

#[tokio::test]
async fn test_upload_at_size_cap_accepted() {
    let app = create_test_app(ROSE_REPLY);
    let image = vec![0u8; MAX_UPLOAD_BYTES];

    let response = app
        .router
        .oneshot(identify_request("image/png", &image, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.classifier.call_count(), 1);
}

#[tokio::test]
async fn test_upload_over_size_cap_rejected() {
    let app = create_test_app(ROSE_REPLY);

    // One byte over the cap still fits the body limit and hits the size check;
    // a much larger body is cut off by the body limit itself.
    for size in [MAX_UPLOAD_BYTES + 1, 11 * 1024 * 1024] {
        let image = vec![0u8; size];
        let response = app
            .router
            .clone()
            .oneshot(identify_request("image/png", &image, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "size {size}");
    }

    assert_eq!(app.classifier.call_count(), 0);
}

#[tokio::test]
async fn test_fenced_reply_fills_defaults() {
    let app = create_test_app(ROSE_REPLY);

    let response = app
        .router
        .oneshot(identify_request("image/jpeg", b"\xff\xd8\xff jpeg", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["flower_name"], "Rose");
    assert_eq!(body["confidence"], "High");
    assert_eq!(body["scientific_name"], "Unknown");
    assert_eq!(body["family"], "Unknown");
    assert_eq!(body["basic_facts"], "No basic facts available");
    assert_eq!(body["care_instructions"], "No care instructions available");
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(body["timestamp"].as_str().is_some_and(|t| t.ends_with('Z')));
    assert!(body.get("user_id").is_none());

    assert_eq!(app.classifier.call_count(), 1);
    assert_eq!(
        app.classifier.last_bytes.lock().unwrap().as_deref(),
        Some(&b"\xff\xd8\xff jpeg"[..])
    );
    assert_eq!(
        app.classifier.last_mime.lock().unwrap().as_deref(),
        Some("image/jpeg")
    );
}

#[tokio::test]
async fn test_prose_reply_falls_back() {
    let app = create_test_app("Sorry, I cannot tell.");

    let response = app
        .router
        .oneshot(identify_request("image/png", b"png", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["flower_name"], "Identification Result");
    assert_eq!(body["basic_facts"], "Sorry, I cannot tell.");
    assert_eq!(body["confidence"], "Low");
    assert_eq!(body["seasonal_info"], "Unable to parse seasonal information");
}

#[tokio::test]
async fn test_staged_file_removed_after_success() {
    let app = create_test_app(ROSE_REPLY);

    let response = app
        .router
        .oneshot(identify_request("image/png", b"png", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let path = app.classifier.staged_path().expect("classifier saw a file");
    assert!(!path.exists(), "staged file {} left behind", path.display());
}

#[tokio::test]
async fn test_classifier_failure_is_500_and_cleans_up() {
    let app = create_test_app_with(Arc::new(StubClassifier::failing("quota exceeded")), true);

    let response = app
        .router
        .oneshot(identify_request("image/png", b"png", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    let details = body["details"].as_str().unwrap();
    assert!(details.starts_with("Error identifying flower:"));
    assert!(details.contains("quota exceeded"));

    let path = app.classifier.staged_path().expect("classifier saw a file");
    assert!(!path.exists());
}

#[tokio::test]
async fn test_missing_api_key_is_500() {
    let app = create_test_app_with(Arc::new(StubClassifier::replying(ROSE_REPLY)), false);

    let response = app
        .router
        .oneshot(identify_request("image/png", b"png", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["details"], "Gemini API key not configured");
    assert_eq!(app.classifier.call_count(), 0);
}

#[tokio::test]
async fn test_result_carries_user_id_for_valid_session() {
    let app = create_test_app(ROSE_REPLY);
    let token = common::login(&app.router).await;

    let response = app
        .router
        .clone()
        .oneshot(identify_request("image/png", b"png", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["user_id"], "user-rose");
}

#[tokio::test]
async fn test_unknown_session_is_anonymous() {
    let app = create_test_app(ROSE_REPLY);

    let response = app
        .router
        .oneshot(identify_request("image/png", b"png", Some("not-a-real-token")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body.get("user_id").is_none());
}
