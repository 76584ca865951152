// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! AES-256-GCM sealing and opening of file contents
//!
//! **Format**: the ciphertext carries the 16-byte authentication tag appended
//! at the end; the 12-byte nonce travels in its own message field.
//!
//! - Nonce: 12 bytes (96 bits), fresh from the OS CSPRNG per seal
//! - Algorithm: AES-256-GCM
//! - No Additional Authenticated Data (AAD)

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use rand::{rngs::OsRng, RngCore};

use crate::error::{TransferError, TransferResult};
use crate::{KEY_SIZE, NONCE_SIZE};

/// Encrypt and authenticate `plaintext` under `key`
///
/// # Returns
///
/// `(nonce, ciphertext_with_tag)`. The nonce is generated here and never
/// supplied by the caller, so a key/nonce pair cannot be reused by mistake.
///
/// # Errors
///
/// - `CipherSetup` if the key is not exactly 32 bytes (a caller bug)
pub fn seal(key: &[u8], plaintext: &[u8]) -> TransferResult<([u8; NONCE_SIZE], Vec<u8>)> {
    let cipher = new_cipher(key)?;

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad: b"",
            },
        )
        .map_err(|e| TransferError::Codec(format!("AES-GCM encryption failed: {}", e)))?;

    Ok((nonce, ciphertext))
}

/// Verify and decrypt `ciphertext` (tag appended) under `key`
///
/// # Errors
///
/// - `CipherSetup` if the key is not exactly 32 bytes
/// - `AuthenticationFailure` if the nonce is not 12 bytes or the tag does
///   not verify. No plaintext is returned in that case.
pub fn open(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> TransferResult<Vec<u8>> {
    let cipher = new_cipher(key)?;

    if nonce.len() != NONCE_SIZE {
        return Err(TransferError::AuthenticationFailure(format!(
            "invalid nonce size: expected {} bytes, got {}",
            NONCE_SIZE,
            nonce.len()
        )));
    }

    cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad: b"",
            },
        )
        .map_err(|_| {
            TransferError::AuthenticationFailure(
                "GCM tag verification failed (tampered data or key mismatch)".to_string(),
            )
        })
}

fn new_cipher(key: &[u8]) -> TransferResult<Aes256Gcm> {
    if key.len() != KEY_SIZE {
        return Err(TransferError::CipherSetup {
            expected: KEY_SIZE,
            actual: key.len(),
        });
    }

    Aes256Gcm::new_from_slice(key).map_err(|_| TransferError::CipherSetup {
        expected: KEY_SIZE,
        actual: key.len(),
    })
}
