// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gemini client for flower classification.
//!
//! Sends one `generateContent` request per image: a fixed system
//! instruction describing the expected JSON schema, plus a user turn with
//! the instruction text and the staged image inlined as base64.

use crate::services::staging::StagedImage;
use anyhow::Context;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::Instrument;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_PROMPT: &str = r#"You are an expert botanist and flower identification specialist.
When given an image of a flower, provide comprehensive information in the following JSON format:
{
    "flower_name": "Common name of the flower",
    "scientific_name": "Scientific/Latin name",
    "family": "Plant family name",
    "basic_facts": "Key characteristics and basic information",
    "care_instructions": "How to care for this flower if grown",
    "symbolic_meanings": "Cultural and symbolic significance",
    "cultivation_tips": "Growing and cultivation advice",
    "seasonal_info": "Blooming season and seasonal care",
    "interesting_story": "Fascinating historical facts, legends, or stories about this flower",
    "confidence": "High/Medium/Low - your confidence in this identification"
}

If you cannot clearly identify the flower, be honest about it and provide your best guess with lower confidence.
Make all responses detailed and informative."#;

const USER_PROMPT: &str =
    "Please identify this flower and provide comprehensive information about it in JSON format.";

/// Classification failures.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error("failed to read staged image: {0}")]
    StagedFile(#[source] std::io::Error),

    #[error("LLM API error: {0}")]
    Request(String),

    #[error("LLM API returned error: {status} - {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse LLM response: {0}")]
    Decode(String),

    #[error("No response from LLM")]
    EmptyReply,
}

/// Produces a raw text description of a staged flower image.
#[async_trait]
pub trait FlowerClassifier: Send + Sync {
    async fn classify(&self, image: &StagedImage) -> Result<String, ClassificationError>;
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

/// Gemini REST client.
#[derive(Debug, Clone)]
pub struct GeminiClassifier {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClassifier {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed building Gemini HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    async fn call_gemini_api(&self, request: &GeminiRequest) -> Result<String, ClassificationError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Gemini API request failed");
                ClassificationError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "Gemini API error");
            return Err(ClassificationError::Status { status, body });
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Gemini response");
            ClassificationError::Decode(e.to_string())
        })?;

        gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty())
            .ok_or(ClassificationError::EmptyReply)
    }
}

#[async_trait]
impl FlowerClassifier for GeminiClassifier {
    async fn classify(&self, image: &StagedImage) -> Result<String, ClassificationError> {
        let conversation_id = format!("flower-identification-{}", uuid::Uuid::new_v4());
        let span = tracing::info_span!("classify", %conversation_id, model = %self.model);

        async {
            let bytes = tokio::fs::read(image.path())
                .await
                .map_err(ClassificationError::StagedFile)?;

            tracing::info!(
                mime_type = image.mime_type(),
                bytes = bytes.len(),
                "Sending image to Gemini"
            );

            let request = GeminiRequest {
                system_instruction: Content {
                    role: None,
                    parts: vec![Part::Text {
                        text: SYSTEM_PROMPT.to_string(),
                    }],
                },
                contents: vec![Content {
                    role: Some("user"),
                    parts: vec![
                        Part::Text {
                            text: USER_PROMPT.to_string(),
                        },
                        Part::InlineData {
                            inline_data: InlineData {
                                mime_type: image.mime_type().to_string(),
                                data: BASE64.encode(&bytes),
                            },
                        },
                    ],
                }],
            };

            let reply = self.call_gemini_api(&request).await?;
            tracing::debug!(chars = reply.len(), "Gemini reply received");
            Ok::<_, ClassificationError>(reply)
        }
        .instrument(span)
        .await
    }
}
