// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Transfer client
//!
//! `Connecting -> HandshakeInProgress -> Encrypting -> Sending ->
//! AwaitingResponse -> Done`. Every failure is fatal to the session.

use std::net::SocketAddr;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, info};

use super::handshake::client_handshake;
use super::{send_message, with_deadline, SessionLimits};
use crate::config::ClientConfig;
use crate::crypto::SessionKey;
use crate::error::TransferResult;
use crate::protocol::{FileTransferMessage, PublicPointMessage, WireCodec, MAX_POINT_MESSAGE_BYTES};
use crate::storage::{base_name, read_file_and_hash};

/// Connected socket, before the handshake
pub struct ClientSession {
    framed: Framed<TcpStream, WireCodec<PublicPointMessage>>,
    server_addr: SocketAddr,
    limits: SessionLimits,
}

impl ClientSession {
    pub async fn connect(config: &ClientConfig) -> TransferResult<Self> {
        let limits = SessionLimits::from(config);
        let stream = with_deadline(
            limits.io_timeout,
            "connect",
            TcpStream::connect(&config.server_addr),
        )
        .await??;
        let server_addr = stream.peer_addr()?;
        debug!("Connected to {}", server_addr);

        Ok(Self {
            framed: Framed::new(stream, WireCodec::new(MAX_POINT_MESSAGE_BYTES)),
            server_addr,
            limits,
        })
    }

    /// Run the ECDH exchange; the server's point is validated first
    pub async fn handshake(mut self) -> TransferResult<EstablishedSession> {
        let key = client_handshake(&mut self.framed, self.limits.io_timeout).await?;
        info!("🔑 Secure session established with {}", self.server_addr);

        let max_message_bytes = self.limits.max_message_bytes;
        Ok(EstablishedSession {
            framed: self
                .framed
                .map_codec(|codec| codec.cast::<FileTransferMessage>(max_message_bytes)),
            key,
            server_addr: self.server_addr,
            limits: self.limits,
        })
    }
}

/// Session with a derived key, ready to carry one file
pub struct EstablishedSession {
    framed: Framed<TcpStream, WireCodec<FileTransferMessage>>,
    key: SessionKey,
    server_addr: SocketAddr,
    limits: SessionLimits,
}

impl EstablishedSession {
    pub fn session_key(&self) -> &SessionKey {
        &self.key
    }

    /// Encrypt file contents under the session key
    pub fn seal_file(
        &self,
        file_name: &str,
        data: &[u8],
        original_hash: &[u8],
    ) -> TransferResult<FileTransferMessage> {
        FileTransferMessage::seal(&self.key, file_name, data, original_hash)
    }

    pub async fn send_payload(&mut self, message: FileTransferMessage) -> TransferResult<()> {
        let size = message.encrypted_data.len();
        send_message(&mut self.framed, message, self.limits.io_timeout, "send payload").await?;
        debug!("Sent {} encrypted bytes to {}", size, self.server_addr);
        Ok(())
    }

    /// Read until the server closes the stream; returns the raw outcome text
    pub async fn await_response(self) -> TransferResult<String> {
        let parts = self.framed.into_parts();
        let mut response = parts.read_buf.to_vec();
        let mut stream = parts.io;

        with_deadline(
            self.limits.io_timeout,
            "await response",
            stream.read_to_end(&mut response),
        )
        .await??;

        Ok(String::from_utf8_lossy(&response).into_owned())
    }
}

/// Read, hash, encrypt and send `path`; returns the server's response text
pub async fn send_file(config: &ClientConfig, path: &Path) -> TransferResult<String> {
    let file_name = base_name(path)?;
    let (data, hash) = read_file_and_hash(path).await?;

    let session = ClientSession::connect(config).await?;
    let mut session = session.handshake().await?;

    let message = session.seal_file(&file_name, &data, &hash)?;
    session.send_payload(message).await?;

    let response = session.await_response().await?;
    info!("📨 Server response for {}: {}", file_name, response);
    Ok(response)
}
