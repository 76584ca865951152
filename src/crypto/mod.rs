// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cryptographic primitives for secure file transfer
//!
//! - **ECDH**: ephemeral-ephemeral key agreement on NIST P-256
//! - **Key derivation**: SHA-256 over the shared X-coordinate
//! - **Encryption**: AES-256-GCM with a random 96-bit nonce per seal
//! - **Integrity**: SHA-256 digest of the plaintext, checked after decryption
//!
//! ## Security Considerations
//!
//! - Key pairs and session keys live for one connection only
//! - Private scalars and session keys are zeroized on drop
//! - Peer points are validated before any scalar multiplication
//! - No peer authentication: an active man-in-the-middle is out of scope

pub mod aes_gcm;
pub mod ecdh;
pub mod integrity;

pub use self::aes_gcm::{open, seal};
pub use ecdh::{derive_session_key, EphemeralKeyPair, PeerPublicKey, SessionKey, SharedSecret};
pub use integrity::{sha256_digest, verify};
