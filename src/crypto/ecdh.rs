// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ECDH Key Exchange Implementation
//!
//! Implements ephemeral-ephemeral Elliptic Curve Diffie-Hellman over NIST
//! P-256. Each side generates a fresh key pair per connection, exchanges the
//! affine coordinates of its public point and hashes the X-coordinate of the
//! shared point with SHA-256 to obtain the AES-256 session key.
//!
//! Coordinates travel as minimal big-endian unsigned integers (leading zero
//! bytes stripped), so a coordinate may be shorter than 32 bytes on the wire.

use p256::{
    ecdh::EphemeralSecret,
    elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint},
    EncodedPoint, FieldBytes, PublicKey,
};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroize;

use crate::error::{TransferError, TransferResult};
use crate::KEY_SIZE;

/// Size of one P-256 field element in bytes
pub const COORDINATE_SIZE: usize = 32;

/// Ephemeral key pair used for exactly one handshake
///
/// The private scalar is zeroized on drop by `p256` and is consumed by
/// [`EphemeralKeyPair::agree`], so it cannot outlive the key agreement.
pub struct EphemeralKeyPair {
    secret: EphemeralSecret,
    public: PublicKey,
}

impl EphemeralKeyPair {
    /// Generate a new key pair from the OS CSPRNG
    pub fn generate() -> Self {
        let secret = EphemeralSecret::random(&mut OsRng);
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Affine coordinates of the public point as minimal big-endian integers
    pub fn public_coordinates(&self) -> (Vec<u8>, Vec<u8>) {
        let encoded = self.public.to_encoded_point(false);
        // Uncompressed, non-identity points always carry both coordinates
        let x = encoded.x().map(|x| strip_leading_zeros(x)).unwrap_or_default();
        let y = encoded.y().map(|y| strip_leading_zeros(y)).unwrap_or_default();
        (x, y)
    }

    /// Compute the shared secret with the peer's validated public key
    ///
    /// Consumes the key pair: the private scalar is dropped (and zeroized)
    /// as soon as the shared point has been computed.
    pub fn agree(self, peer: &PeerPublicKey) -> TransferResult<SharedSecret> {
        let shared = self.secret.diffie_hellman(&peer.0);
        let x = strip_leading_zeros(shared.raw_secret_bytes());

        if x.is_empty() {
            tracing::error!("ECDH produced a zero shared X-coordinate");
            return Err(TransferError::KeyAgreement(
                "shared X-coordinate is zero".to_string(),
            ));
        }

        Ok(SharedSecret(x))
    }
}

/// A peer public key that has passed curve validation
#[derive(Debug, Clone)]
pub struct PeerPublicKey(PublicKey);

impl PeerPublicKey {
    /// Rebuild and validate a public point from big-endian coordinates
    ///
    /// Rejects coordinates wider than a field element, zero coordinates,
    /// and points that are not on P-256. No scalar multiplication happens
    /// before these checks pass.
    pub fn from_coordinates(x: &[u8], y: &[u8]) -> TransferResult<Self> {
        let x = pad_coordinate(x, "x")?;
        let y = pad_coordinate(y, "y")?;

        let encoded = EncodedPoint::from_affine_coordinates(&x, &y, false);
        let public: Option<PublicKey> = PublicKey::from_encoded_point(&encoded).into();

        public.map(PeerPublicKey).ok_or_else(|| {
            TransferError::InvalidPeerKey("point is not on the P-256 curve".to_string())
        })
    }
}

/// Raw ECDH output: X-coordinate of the shared point, minimal big-endian
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// 32-byte AES-256 key derived from the shared secret
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey([u8; KEY_SIZE]);

impl SessionKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(<redacted>)")
    }
}

impl Drop for SessionKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Derive the session key: SHA-256 over the shared X-coordinate bytes
///
/// Deterministic, so both peers reach the same key from the same secret.
pub fn derive_session_key(shared: &SharedSecret) -> SessionKey {
    let digest = Sha256::digest(shared.as_bytes());
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&digest[..KEY_SIZE]);
    SessionKey(key)
}

fn strip_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

fn pad_coordinate(raw: &[u8], name: &str) -> TransferResult<FieldBytes> {
    let significant = &raw[raw.iter().position(|&b| b != 0).unwrap_or(raw.len())..];

    if significant.is_empty() {
        return Err(TransferError::InvalidPeerKey(format!(
            "{} coordinate is zero",
            name
        )));
    }
    if significant.len() > COORDINATE_SIZE {
        return Err(TransferError::InvalidPeerKey(format!(
            "{} coordinate too long: {} bytes (max {})",
            name,
            significant.len(),
            COORDINATE_SIZE
        )));
    }

    let mut padded = [0u8; COORDINATE_SIZE];
    padded[COORDINATE_SIZE - significant.len()..].copy_from_slice(significant);
    Ok(FieldBytes::from(padded))
}
