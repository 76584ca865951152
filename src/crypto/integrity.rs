// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! SHA-256 content digests and post-decrypt verification
//!
//! The sender hashes the plaintext before encryption; the receiver recomputes
//! the digest after a successful AEAD open and compares. Verification only
//! ever runs on authenticated plaintext.

use sha2::{Digest, Sha256};

use crate::error::{TransferError, TransferResult};
use crate::HASH_SIZE;

/// SHA-256 digest of `data`
pub fn sha256_digest(data: &[u8]) -> [u8; HASH_SIZE] {
    Sha256::digest(data).into()
}

/// Compare the sender's digest with the recomputed one
///
/// A candidate of the wrong length is a mismatch.
pub fn verify(candidate: &[u8], recomputed: &[u8]) -> TransferResult<()> {
    if candidate == recomputed {
        return Ok(());
    }

    Err(TransferError::IntegrityFailure {
        expected: hex::encode(candidate),
        actual: hex::encode(recomputed),
    })
}
