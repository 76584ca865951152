// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server-side persistence of received files
//!
//! The peer-supplied file name is untrusted: only its final path component
//! is kept, and empty, `.` or `..` names are refused.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{TransferError, TransferResult};

/// Destination for verified file contents
#[async_trait]
pub trait ReceivedFileSink: Send + Sync {
    /// Persist `data` under a name derived from `file_name`; returns the
    /// written location.
    async fn persist(&self, file_name: &str, data: &[u8]) -> TransferResult<PathBuf>;
}

/// Writes `<dir>/<prefix><name>`
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    prefix: String,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn target_path(&self, file_name: &str) -> TransferResult<PathBuf> {
        let name = sanitize_file_name(file_name)?;
        Ok(self.dir.join(format!("{}{}", self.prefix, name)))
    }
}

#[async_trait]
impl ReceivedFileSink for DirectorySink {
    async fn persist(&self, file_name: &str, data: &[u8]) -> TransferResult<PathBuf> {
        let target = self.target_path(file_name)?;

        tokio::fs::write(&target, data).await.map_err(|e| {
            TransferError::Storage(format!("failed to write {}: {}", target.display(), e))
        })?;

        info!("💾 Saved {} bytes to {}", data.len(), target.display());
        Ok(target)
    }
}

/// Reduce a peer-supplied name to a safe single path component
pub fn sanitize_file_name(file_name: &str) -> TransferResult<String> {
    // Treat both separators as path separators regardless of platform
    let last = file_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    match Path::new(last).file_name() {
        Some(name) if !last.is_empty() && last != "." && last != ".." => {
            Ok(name.to_string_lossy().into_owned())
        }
        _ => Err(TransferError::Storage(format!(
            "invalid file name: {:?}",
            file_name
        ))),
    }
}
