// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod identification;
pub mod session;
pub mod user;

pub use identification::{Confidence, IdentificationResult};
pub use session::Session;
pub use user::UserProfile;
