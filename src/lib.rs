// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Secure single-file transfer over TCP
//!
//! Ephemeral P-256 ECDH per connection, SHA-256 of the shared X-coordinate
//! as the AES-256-GCM key, SHA-256 of the plaintext checked after
//! decryption and before anything is written to disk.

pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod protocol;
pub mod session;
pub mod storage;
pub mod version;

/// Default TCP port for both server and client
pub const DEFAULT_PORT: u16 = 8080;

/// AES-256 key size in bytes
pub const KEY_SIZE: usize = 32;

/// AES-GCM nonce size in bytes
pub const NONCE_SIZE: usize = 12;

/// SHA-256 digest size in bytes
pub const HASH_SIZE: usize = 32;

pub use config::{ClientConfig, ServerConfig};
pub use error::{TransferError, TransferResult};
pub use protocol::{FileTransferMessage, PublicPointMessage, TransferOutcome};
pub use session::{
    send_file, ClientSession, EstablishedSession, SessionReport, TransferServer,
};
pub use storage::{DirectorySink, ReceivedFileSink};
