// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for secure file transfer sessions
//!
//! Every failure a session can hit maps onto one variant:
//! - Transport errors (socket I/O, peer hung up, deadline elapsed)
//! - Handshake errors (invalid peer point, degenerate shared secret)
//! - Cipher errors (bad key length, AEAD tag rejected)
//! - Integrity errors (post-decrypt hash mismatch)
//! - Codec and storage errors

use thiserror::Error;

/// Errors that can occur while establishing or running a transfer session
#[derive(Error, Debug)]
pub enum TransferError {
    /// I/O failure on the stream. Fatal to the session, never retried.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Peer closed the stream before the expected message arrived
    #[error("Connection closed by peer during {0}")]
    ConnectionClosed(&'static str),

    /// A socket operation exceeded its deadline
    #[error("Operation '{operation}' timed out after {secs}s")]
    Timeout { operation: &'static str, secs: u64 },

    /// Peer sent a malformed, off-curve or identity public point
    #[error("Invalid peer public key: {0}")]
    InvalidPeerKey(String),

    /// ECDH produced a degenerate shared secret
    #[error("Key agreement failed: {0}")]
    KeyAgreement(String),

    /// AES-256-GCM was handed a key of the wrong size
    #[error("Cipher setup failed: expected {expected}-byte key, got {actual} bytes")]
    CipherSetup { expected: usize, actual: usize },

    /// AEAD tag did not verify (tampering or key mismatch)
    #[error("Authentication failure: {0}")]
    AuthenticationFailure(String),

    /// Decrypted content does not match the sender's digest
    #[error("Integrity failure: expected hash {expected}, computed {actual}")]
    IntegrityFailure { expected: String, actual: String },

    /// A wire message could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(String),

    /// Local file could not be read or persisted
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias for transfer operations
pub type TransferResult<T> = Result<T, TransferError>;

impl TransferError {
    /// Whether the failure happened before a session key existed.
    ///
    /// The server closes the stream silently on these; later failures are
    /// reported back to the client as a text line.
    pub fn is_handshake_failure(&self) -> bool {
        matches!(
            self,
            TransferError::InvalidPeerKey(_) | TransferError::KeyAgreement(_)
        )
    }
}
