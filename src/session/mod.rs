// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Transfer sessions
//!
//! One TCP connection carries exactly one session: handshake, one encrypted
//! file, one plain-text outcome, close. Every socket operation runs under
//! the configured deadline.

pub mod client;
pub mod handshake;
pub mod server;

use futures::{SinkExt, StreamExt};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;

use crate::config::{ClientConfig, ServerConfig};
use crate::error::{TransferError, TransferResult};
use crate::protocol::WireCodec;

pub use client::{send_file, ClientSession, EstablishedSession};
pub use handshake::{client_handshake, server_handshake};
pub use server::{serve_session, SessionPhase, SessionReport, TransferServer};

/// Per-session deadline and message bound
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub io_timeout: Duration,
    pub max_message_bytes: u64,
}

impl From<&ServerConfig> for SessionLimits {
    fn from(config: &ServerConfig) -> Self {
        Self {
            io_timeout: config.io_timeout,
            max_message_bytes: config.max_message_bytes,
        }
    }
}

impl From<&ClientConfig> for SessionLimits {
    fn from(config: &ClientConfig) -> Self {
        Self {
            io_timeout: config.io_timeout,
            max_message_bytes: config.max_message_bytes,
        }
    }
}

/// Run `fut` to completion or fail with `Timeout` once `limit` elapses
pub async fn with_deadline<F: Future>(
    limit: Duration,
    operation: &'static str,
    fut: F,
) -> TransferResult<F::Output> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| TransferError::Timeout {
            operation,
            secs: limit.as_secs(),
        })
}

pub(crate) async fn send_message<S, T>(
    framed: &mut Framed<S, WireCodec<T>>,
    message: T,
    io_timeout: Duration,
    operation: &'static str,
) -> TransferResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
    T: Serialize,
{
    with_deadline(io_timeout, operation, framed.send(message)).await?
}

pub(crate) async fn recv_message<S, T>(
    framed: &mut Framed<S, WireCodec<T>>,
    io_timeout: Duration,
    operation: &'static str,
) -> TransferResult<T>
where
    S: AsyncRead + AsyncWrite + Unpin,
    T: Serialize + DeserializeOwned,
{
    match with_deadline(io_timeout, operation, framed.next()).await? {
        Some(message) => message,
        None => Err(TransferError::ConnectionClosed(operation)),
    }
}
