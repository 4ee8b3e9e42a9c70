// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transient on-disk copies of uploaded images.
//!
//! The classifier consumes a file path, so uploads are written to a named
//! temporary file that is removed when the [`StagedImage`] is dropped.

use anyhow::Context;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// An uploaded image staged on disk for the lifetime of one request.
#[derive(Debug)]
pub struct StagedImage {
    file: NamedTempFile,
    mime_type: String,
}

impl StagedImage {
    /// Write `bytes` to a new temporary file.
    pub async fn write(bytes: Vec<u8>, mime_type: &str) -> anyhow::Result<Self> {
        let suffix = suffix_for(mime_type);

        let file = tokio::task::spawn_blocking(move || -> anyhow::Result<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix("flower-upload-")
                .suffix(&suffix)
                .tempfile()
                .context("failed creating staging file")?;
            file.write_all(&bytes)
                .context("failed writing staging file")?;
            file.flush().context("failed flushing staging file")?;
            Ok(file)
        })
        .await
        .context("staging task panicked")??;

        Ok(Self {
            file,
            mime_type: mime_type.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

impl Drop for StagedImage {
    fn drop(&mut self) {
        // NamedTempFile removes the file itself; errors there are ignored.
        tracing::debug!(path = %self.file.path().display(), "Removing staged upload");
    }
}

/// File suffix for a MIME type, e.g. `image/png` -> `.png`.
fn suffix_for(mime_type: &str) -> String {
    let subtype = mime_type
        .split_once('/')
        .map(|(_, sub)| sub)
        .unwrap_or("")
        .split(';')
        .next()
        .unwrap_or("")
        .trim();

    match subtype {
        "" => ".jpg".to_string(),
        "jpeg" | "pjpeg" => ".jpg".to_string(),
        "svg+xml" => ".svg".to_string(),
        other if other.bytes().all(|b| b.is_ascii_alphanumeric()) => format!(".{}", other),
        _ => ".img".to_string(),
    }
}
