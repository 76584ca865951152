// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ecdh_transfer::crypto::{sha256_digest, verify};
use ecdh_transfer::TransferError;

#[test]
fn test_verify_matching_digests() {
    let data = b"hello12345";
    assert!(verify(&sha256_digest(data), &sha256_digest(data)).is_ok());
}

#[test]
fn test_verify_rejects_different_content() {
    let result = verify(&sha256_digest(b"hello12345"), &sha256_digest(b"hello12346"));
    match result {
        Err(TransferError::IntegrityFailure { expected, actual }) => {
            assert_eq!(expected.len(), 64);
            assert_ne!(expected, actual);
        }
        other => panic!("expected integrity failure, got {:?}", other),
    }
}

#[test]
fn test_verify_rejects_truncated_digest() {
    let digest = sha256_digest(b"abc");
    assert!(verify(&digest[..31], &digest).is_err());
    assert!(verify(&[], &digest).is_err());
}
