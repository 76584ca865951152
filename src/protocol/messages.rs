// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Wire messages exchanged over one transfer connection
//!
//! In order: server `PublicPointMessage`, client `PublicPointMessage`,
//! client `FileTransferMessage`, then the server's plain-text outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::{open, seal, EphemeralKeyPair, PeerPublicKey, SessionKey};
use crate::error::TransferResult;

/// Encoding bound for [`PublicPointMessage`]; a valid one is under 80 bytes
pub const MAX_POINT_MESSAGE_BYTES: u64 = 256;

/// Public point of an ephemeral key pair, as big-endian coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPointMessage {
    #[serde(with = "byte_buf")]
    pub x: Vec<u8>,
    #[serde(with = "byte_buf")]
    pub y: Vec<u8>,
}

impl PublicPointMessage {
    pub fn from_key_pair(key_pair: &EphemeralKeyPair) -> Self {
        let (x, y) = key_pair.public_coordinates();
        Self { x, y }
    }

    /// Validate the point and turn it into a usable peer key
    pub fn to_public_key(&self) -> TransferResult<PeerPublicKey> {
        PeerPublicKey::from_coordinates(&self.x, &self.y)
    }
}

/// Encrypted file plus the metadata needed to open and verify it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTransferMessage {
    /// Base name of the sent file (never a path)
    pub file_name: String,
    /// AES-256-GCM ciphertext with the tag appended
    #[serde(with = "byte_buf")]
    pub encrypted_data: Vec<u8>,
    /// 12-byte GCM nonce
    #[serde(with = "byte_buf")]
    pub nonce: Vec<u8>,
    /// SHA-256 of the plaintext, computed before encryption
    #[serde(with = "byte_buf")]
    pub original_hash: Vec<u8>,
}

impl FileTransferMessage {
    /// Encrypt `plaintext` under the session key with a fresh nonce
    pub fn seal(
        key: &SessionKey,
        file_name: impl Into<String>,
        plaintext: &[u8],
        original_hash: &[u8],
    ) -> TransferResult<Self> {
        let (nonce, encrypted_data) = seal(key.as_bytes(), plaintext)?;

        Ok(Self {
            file_name: file_name.into(),
            encrypted_data,
            nonce: nonce.to_vec(),
            original_hash: original_hash.to_vec(),
        })
    }

    /// Authenticate and decrypt the payload
    pub fn open(&self, key: &SessionKey) -> TransferResult<Vec<u8>> {
        open(key.as_bytes(), &self.nonce, &self.encrypted_data)
    }
}

const SUCCESS_PREFIX: &str = "transfer succeeded, ";

/// Final result the server reports to the client as plain text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Decrypted, verified and persisted
    Succeeded { file_name: String },
    /// Decrypted and verified, but the local write failed
    NotSaved { file_name: String, reason: String },
    /// Recomputed digest differs from the sender's
    HashMismatch,
    /// AEAD open failed
    AuthenticationFailed,
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Succeeded { .. })
    }

    /// Whether a raw server response reports a fully successful transfer
    pub fn response_is_success(response: &str) -> bool {
        response.starts_with(SUCCESS_PREFIX)
    }
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferOutcome::Succeeded { file_name } => {
                write!(f, "{}filename={}", SUCCESS_PREFIX, file_name)
            }
            TransferOutcome::NotSaved { file_name, reason } => write!(
                f,
                "transfer succeeded but could not be saved: filename={}, reason={}",
                file_name, reason
            ),
            TransferOutcome::HashMismatch => write!(f, "transfer failed: hash mismatch"),
            TransferOutcome::AuthenticationFailed => write!(
                f,
                "transfer failed: authentication failure (tampered data or key mismatch)"
            ),
        }
    }
}

/// Serde adapter that encodes `Vec<u8>` as a native byte string
///
/// Plain `Vec<u8>` goes through serde as a sequence, which CBOR writes as an
/// array of integers.
mod byte_buf {
    use serde::de::{self, SeqAccess, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(bytes)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        deserializer.deserialize_byte_buf(ByteBufVisitor)
    }

    struct ByteBufVisitor;

    impl<'de> Visitor<'de> for ByteBufVisitor {
        type Value = Vec<u8>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a byte buffer")
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Vec<u8>, E> {
            Ok(v.to_vec())
        }

        fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Vec<u8>, E> {
            Ok(v)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<u8>, A::Error> {
            let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
            while let Some(b) = seq.next_element()? {
                bytes.push(b);
            }
            Ok(bytes)
        }
    }
}
