// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flower identification result returned to clients.
//!
//! Results are built once per classification request and are not stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::format_utc_rfc3339;

/// The model's stated confidence in an identification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
    /// Anything the model returned that is not one of the known levels.
    Other(String),
}

impl Confidence {
    pub fn as_str(&self) -> &str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
            Confidence::Other(s) => s,
        }
    }
}

impl From<&str> for Confidence {
    fn from(s: &str) -> Self {
        match s {
            "High" => Confidence::High,
            "Medium" => Confidence::Medium,
            "Low" => Confidence::Low,
            _ => Confidence::Other(s.to_string()),
        }
    }
}

impl Serialize for Confidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Confidence::from(s.as_str()))
    }
}

/// Structured botanical description of an uploaded flower.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct IdentificationResult {
    pub id: String,
    pub flower_name: String,
    pub scientific_name: String,
    pub family: String,
    pub basic_facts: String,
    pub care_instructions: String,
    pub symbolic_meanings: String,
    pub cultivation_tips: String,
    pub seasonal_info: String,
    pub interesting_story: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub confidence: Confidence,
    /// Creation instant (RFC3339)
    pub timestamp: String,
    /// Set when the request carried a valid session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl IdentificationResult {
    /// Build a result from a normalized model reply.
    ///
    /// Missing or null keys fall back to fixed placeholders; non-string
    /// values are rendered as JSON text.
    pub fn from_reply(
        reply: &Map<String, Value>,
        user_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let field = |key: &str, default: &str| -> String {
            match reply.get(key) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => default.to_string(),
                Some(other) => other.to_string(),
            }
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            flower_name: field("flower_name", "Unknown Flower"),
            scientific_name: field("scientific_name", "Unknown"),
            family: field("family", "Unknown"),
            basic_facts: field("basic_facts", "No basic facts available"),
            care_instructions: field("care_instructions", "No care instructions available"),
            symbolic_meanings: field("symbolic_meanings", "No symbolic meanings available"),
            cultivation_tips: field("cultivation_tips", "No cultivation tips available"),
            seasonal_info: field("seasonal_info", "No seasonal information available"),
            interesting_story: field("interesting_story", "No interesting stories available"),
            confidence: Confidence::from(field("confidence", "Medium").as_str()),
            timestamp: format_utc_rfc3339(now),
            user_id,
        }
    }
}
