// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for ecdh-transfer

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Wire protocol revision; bump when message layout changes
pub const PROTOCOL_VERSION: u32 = 1;

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "ecdh-p256-ephemeral",
    "sha256-key-derivation",
    "aes-256-gcm",
    "sha256-integrity",
    "cbor-wire-format",
    "io-deadlines",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!(
        "ecdh-transfer {} (protocol v{}; features: {})",
        VERSION_NUMBER,
        PROTOCOL_VERSION,
        FEATURES.join(", ")
    )
}
