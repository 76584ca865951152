// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Transfer server
//!
//! One accept loop; every connection runs in its own task that exclusively
//! owns its key pair, session key and buffers. A failing session never
//! affects the loop or other sessions.
//!
//! Per-session state machine, terminal on the first failure:
//!
//! ```text
//! Listening -> HandshakeInProgress -> AwaitingPayload -> Decrypting
//!           -> Verifying -> Reporting -> Closed
//! ```
//!
//! Handshake and payload decode failures close the stream without a reply.
//! A payload that fails authentication is reported and never verified.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::handshake::server_handshake;
use super::{recv_message, with_deadline, SessionLimits};
use crate::config::ServerConfig;
use crate::crypto::{sha256_digest, verify, SessionKey};
use crate::error::{TransferError, TransferResult};
use crate::protocol::{
    FileTransferMessage, PublicPointMessage, TransferOutcome, WireCodec, MAX_POINT_MESSAGE_BYTES,
};
use crate::storage::{DirectorySink, ReceivedFileSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Listening,
    HandshakeInProgress,
    AwaitingPayload,
    Decrypting,
    Verifying,
    Reporting,
    Closed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Listening => "listening",
            SessionPhase::HandshakeInProgress => "handshake",
            SessionPhase::AwaitingPayload => "awaiting payload",
            SessionPhase::Decrypting => "decrypting",
            SessionPhase::Verifying => "verifying",
            SessionPhase::Reporting => "reporting",
            SessionPhase::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// What happened on one connection
#[derive(Debug)]
pub struct SessionReport {
    pub peer_addr: SocketAddr,
    /// Phase the session was in when it ended; `Closed` after a completed reply
    pub phase: SessionPhase,
    /// Outcome sent to the client, if the session got that far
    pub outcome: Option<TransferOutcome>,
    /// First error hit, if any
    pub error: Option<TransferError>,
}

impl SessionReport {
    fn new(peer_addr: SocketAddr) -> Self {
        Self {
            peer_addr,
            phase: SessionPhase::Listening,
            outcome: None,
            error: None,
        }
    }

    fn fail(mut self, err: TransferError) -> Self {
        self.error = Some(err);
        self
    }

    pub fn is_success(&self) -> bool {
        self.phase == SessionPhase::Closed
            && self.outcome.as_ref().map_or(false, |o| o.is_success())
    }

    fn log(&self) {
        match (&self.outcome, &self.error) {
            (Some(outcome), _) if outcome.is_success() && self.phase == SessionPhase::Closed => {
                info!("✅ [{}] {}", self.peer_addr, outcome);
            }
            (Some(outcome), Some(err)) => {
                warn!("[{}] {} ({})", self.peer_addr, outcome, err);
            }
            (_, Some(err)) if err.is_handshake_failure() => {
                warn!("[{}] handshake rejected: {}", self.peer_addr, err);
            }
            (_, Some(err)) => {
                warn!(
                    "[{}] session aborted during {}: {}",
                    self.peer_addr, self.phase, err
                );
            }
            (Some(outcome), None) => {
                info!("[{}] {}", self.peer_addr, outcome);
            }
            (None, None) => {
                debug!("[{}] session ended in phase {}", self.peer_addr, self.phase);
            }
        }
    }
}

/// Run one server-side session over an accepted stream
pub async fn serve_session<S>(
    stream: S,
    peer_addr: SocketAddr,
    limits: SessionLimits,
    sink: &dyn ReceivedFileSink,
) -> SessionReport
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut report = SessionReport::new(peer_addr);
    let mut framed = Framed::new(
        stream,
        WireCodec::<PublicPointMessage>::new(MAX_POINT_MESSAGE_BYTES),
    );

    report.phase = SessionPhase::HandshakeInProgress;
    let key = match server_handshake(&mut framed, limits.io_timeout).await {
        Ok(key) => key,
        Err(e) => return report.fail(e),
    };

    report.phase = SessionPhase::AwaitingPayload;
    let mut framed =
        framed.map_codec(|codec| codec.cast::<FileTransferMessage>(limits.max_message_bytes));
    let message = match recv_message(&mut framed, limits.io_timeout, "receive payload").await {
        Ok(message) => message,
        Err(e) => return report.fail(e),
    };
    debug!(
        "[{}] Received payload for {} ({} encrypted bytes)",
        peer_addr,
        message.file_name,
        message.encrypted_data.len()
    );

    let outcome = process_payload(&mut report, &key, &message, sink).await;
    drop(key);

    report.phase = SessionPhase::Reporting;
    let response = outcome.to_string();
    report.outcome = Some(outcome);

    let mut stream = framed.into_inner();
    let written = with_deadline(limits.io_timeout, "send outcome", async {
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await
    })
    .await;

    match written {
        Ok(Ok(())) => report.phase = SessionPhase::Closed,
        Ok(Err(e)) => return report.fail(e.into()),
        Err(e) => return report.fail(e),
    }
    report
}

/// Decrypt, verify, persist. Errors are recorded on the report and mapped
/// to the outcome the client is told about.
async fn process_payload(
    report: &mut SessionReport,
    key: &SessionKey,
    message: &FileTransferMessage,
    sink: &dyn ReceivedFileSink,
) -> TransferOutcome {
    report.phase = SessionPhase::Decrypting;
    let plaintext = match message.open(key) {
        Ok(plaintext) => plaintext,
        Err(e) => {
            report.error = Some(e);
            return TransferOutcome::AuthenticationFailed;
        }
    };

    report.phase = SessionPhase::Verifying;
    if let Err(e) = verify(&message.original_hash, &sha256_digest(&plaintext)) {
        report.error = Some(e);
        return TransferOutcome::HashMismatch;
    }

    match sink.persist(&message.file_name, &plaintext).await {
        Ok(_) => TransferOutcome::Succeeded {
            file_name: message.file_name.clone(),
        },
        Err(e) => {
            let reason = e.to_string();
            report.error = Some(e);
            TransferOutcome::NotSaved {
                file_name: message.file_name.clone(),
                reason,
            }
        }
    }
}

/// TCP listener plus the collaborators every session needs
pub struct TransferServer {
    listener: TcpListener,
    limits: SessionLimits,
    sink: Arc<dyn ReceivedFileSink>,
    reports: Option<mpsc::UnboundedSender<SessionReport>>,
}

impl TransferServer {
    pub async fn bind(
        config: ServerConfig,
        sink: Arc<dyn ReceivedFileSink>,
    ) -> TransferResult<Self> {
        let listener = TcpListener::bind(&config.listen_addr).await?;
        info!("🔐 Transfer server listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            limits: SessionLimits::from(&config),
            sink,
            reports: None,
        })
    }

    /// Bind with a [`DirectorySink`] built from the config's output settings
    pub async fn bind_to_directory(config: ServerConfig) -> TransferResult<Self> {
        let sink = Arc::new(DirectorySink::new(
            config.output_dir.clone(),
            config.received_prefix.clone(),
        ));
        Self::bind(config, sink).await
    }

    /// Forward every finished session's report to `tx`
    pub fn with_reports(mut self, tx: mpsc::UnboundedSender<SessionReport>) -> Self {
        self.reports = Some(tx);
        self
    }

    pub fn local_addr(&self) -> TransferResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` is cancelled. In-flight sessions
    /// keep running to completion.
    pub async fn run(self, shutdown: CancellationToken) -> TransferResult<()> {
        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            debug!("Accepted connection from {}", peer_addr);
                            let limits = self.limits;
                            let sink = self.sink.clone();
                            let reports = self.reports.clone();

                            tokio::spawn(async move {
                                let report = serve_session(stream, peer_addr, limits, sink.as_ref()).await;
                                report.log();
                                if let Some(tx) = reports {
                                    tx.send(report).ok();
                                }
                            });
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                        }
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Shutting down transfer server");
                    break;
                }
            }
        }
        Ok(())
    }
}
