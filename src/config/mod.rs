// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server and client configuration
//!
//! Both configs are plain values passed into the server/client entry points;
//! nothing is read from process-wide state after startup.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::DEFAULT_PORT;

/// Default deadline for a single socket operation
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Default upper bound on one decoded wire message (512 MiB)
pub const DEFAULT_MAX_MESSAGE_BYTES: u64 = 512 * 1024 * 1024;

/// Default prefix prepended to persisted file names
pub const DEFAULT_RECEIVED_PREFIX: &str = "RECEIVED_";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub output_dir: PathBuf,
    pub received_prefix: String,
    pub io_timeout: Duration,
    pub max_message_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: format!("0.0.0.0:{}", DEFAULT_PORT),
            output_dir: PathBuf::from("."),
            received_prefix: DEFAULT_RECEIVED_PREFIX.to_string(),
            io_timeout: DEFAULT_IO_TIMEOUT,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `TRANSFER_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            listen_addr: lookup("TRANSFER_LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            output_dir: lookup("TRANSFER_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            received_prefix: lookup("TRANSFER_RECEIVED_PREFIX")
                .unwrap_or(defaults.received_prefix),
            io_timeout: io_timeout_from(&lookup).unwrap_or(defaults.io_timeout),
            max_message_bytes: max_message_bytes_from(&lookup)
                .unwrap_or(defaults.max_message_bytes),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_addr: String,
    pub io_timeout: Duration,
    pub max_message_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: format!("127.0.0.1:{}", DEFAULT_PORT),
            io_timeout: DEFAULT_IO_TIMEOUT,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `TRANSFER_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            server_addr: lookup("TRANSFER_SERVER_ADDR").unwrap_or(defaults.server_addr),
            io_timeout: io_timeout_from(&lookup).unwrap_or(defaults.io_timeout),
            max_message_bytes: max_message_bytes_from(&lookup)
                .unwrap_or(defaults.max_message_bytes),
        }
    }
}

fn io_timeout_from(lookup: &impl Fn(&str) -> Option<String>) -> Option<Duration> {
    lookup("TRANSFER_IO_TIMEOUT_SECS")
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

fn max_message_bytes_from(lookup: &impl Fn(&str) -> Option<String>) -> Option<u64> {
    lookup("TRANSFER_MAX_MESSAGE_BYTES")
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|n| *n > 0)
}
