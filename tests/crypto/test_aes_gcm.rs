// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Tests for AES-256-GCM sealing and opening

use ecdh_transfer::crypto::{open, seal};
use ecdh_transfer::{TransferError, NONCE_SIZE};
use rand::{rngs::OsRng, RngCore};
use std::collections::HashSet;

fn random_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    key
}

#[test]
fn test_seal_open_with_random_payload() {
    let key = random_key();
    let mut plaintext = vec![0u8; 4096];
    OsRng.fill_bytes(&mut plaintext);

    let (nonce, ciphertext) = seal(&key, &plaintext).unwrap();
    assert_eq!(nonce.len(), NONCE_SIZE);
    assert_eq!(ciphertext.len(), plaintext.len() + 16, "tag is appended");

    assert_eq!(open(&key, &nonce, &ciphertext).unwrap(), plaintext);
}

#[test]
fn test_every_single_byte_flip_fails() {
    let key = random_key();
    let (nonce, ciphertext) = seal(&key, b"hello12345").unwrap();

    for i in 0..ciphertext.len() {
        let mut tampered = ciphertext.clone();
        tampered[i] ^= 0x80;
        assert!(
            matches!(
                open(&key, &nonce, &tampered),
                Err(TransferError::AuthenticationFailure(_))
            ),
            "flip at byte {} must be detected",
            i
        );
    }
}

#[test]
fn test_wrong_key_or_nonce_fails() {
    let key = random_key();
    let (nonce, ciphertext) = seal(&key, b"secret").unwrap();

    assert!(open(&random_key(), &nonce, &ciphertext).is_err());

    let mut other_nonce = nonce;
    other_nonce[0] ^= 1;
    assert!(open(&key, &other_nonce, &ciphertext).is_err());
    assert!(open(&key, &nonce[..8], &ciphertext).is_err());
}

#[test]
fn test_nonce_uniqueness() {
    let key = random_key();
    let mut seen = HashSet::new();

    for _ in 0..1000 {
        let (nonce, _) = seal(&key, b"x").unwrap();
        assert!(seen.insert(nonce), "nonce reused");
    }
}

#[test]
fn test_wrong_key_length_is_setup_error() {
    let result = seal(&[0u8; 16], b"data");
    assert!(matches!(
        result,
        Err(TransferError::CipherSetup {
            expected: 32,
            actual: 16
        })
    ));
}
