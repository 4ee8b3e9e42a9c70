// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod gemini;
pub mod identity;
pub mod normalizer;
pub mod sessions;
pub mod staging;

pub use gemini::{ClassificationError, FlowerClassifier, GeminiClassifier};
pub use identity::{IdentityClient, IdentityError, IdentityProfile, IdentityProvider};
pub use normalizer::normalize_reply;
pub use sessions::{IssuedSession, SessionService};
pub use staging::StagedImage;
