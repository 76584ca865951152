// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ephemeral ECDH handshake sequencing
//!
//! The server speaks first. Each side validates the peer point before any
//! scalar multiplication and derives the session key from the shared
//! X-coordinate. A failed handshake is never retried.

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::debug;

use super::{recv_message, send_message};
use crate::crypto::{derive_session_key, EphemeralKeyPair, SessionKey};
use crate::error::TransferResult;
use crate::protocol::{PublicPointMessage, WireCodec};

/// Server side: send own point, then receive and validate the client's
pub async fn server_handshake<S>(
    framed: &mut Framed<S, WireCodec<PublicPointMessage>>,
    io_timeout: Duration,
) -> TransferResult<SessionKey>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let key_pair = EphemeralKeyPair::generate();
    send_message(
        framed,
        PublicPointMessage::from_key_pair(&key_pair),
        io_timeout,
        "send server public point",
    )
    .await?;

    let client_point = recv_message(framed, io_timeout, "receive client public point").await?;
    let peer = client_point.to_public_key()?;
    let shared = key_pair.agree(&peer)?;

    debug!("Server handshake complete");
    Ok(derive_session_key(&shared))
}

/// Client side: receive and validate the server's point, then send own
pub async fn client_handshake<S>(
    framed: &mut Framed<S, WireCodec<PublicPointMessage>>,
    io_timeout: Duration,
) -> TransferResult<SessionKey>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let server_point = recv_message(framed, io_timeout, "receive server public point").await?;
    let peer = server_point.to_public_key()?;

    let key_pair = EphemeralKeyPair::generate();
    let own_point = PublicPointMessage::from_key_pair(&key_pair);
    let shared = key_pair.agree(&peer)?;

    send_message(framed, own_point, io_timeout, "send client public point").await?;

    debug!("Client handshake complete");
    Ok(derive_session_key(&shared))
}
