// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Client-side file loading
//!
//! The whole file is read into memory and hashed before encryption; there is
//! no chunked streaming, so file size is bounded by available memory.

use std::path::Path;
use tracing::debug;

use crate::crypto::sha256_digest;
use crate::error::{TransferError, TransferResult};
use crate::HASH_SIZE;

/// Read `path` fully and compute its SHA-256 digest
pub async fn read_file_and_hash(path: &Path) -> TransferResult<(Vec<u8>, [u8; HASH_SIZE])> {
    let data = tokio::fs::read(path).await.map_err(|e| {
        TransferError::Storage(format!("failed to read {}: {}", path.display(), e))
    })?;
    let hash = sha256_digest(&data);

    debug!(
        "Loaded {} ({} bytes, sha256={})",
        path.display(),
        data.len(),
        hex::encode(hash)
    );
    Ok((data, hash))
}

/// Final path component of `path`, as sent in `FileTransferMessage::file_name`
pub fn base_name(path: &Path) -> TransferResult<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            TransferError::Storage(format!("{} has no file name component", path.display()))
        })
}
