// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared fixtures: a server on an ephemeral port writing into a temp dir

use ecdh_transfer::session::SessionReport;
use ecdh_transfer::{ClientConfig, DirectorySink, ReceivedFileSink, ServerConfig, TransferServer};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TestServer {
    pub addr: SocketAddr,
    pub output: TempDir,
    pub shutdown: CancellationToken,
    pub reports: mpsc::UnboundedReceiver<SessionReport>,
    pub handle: JoinHandle<ecdh_transfer::TransferResult<()>>,
}

impl TestServer {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            server_addr: self.addr.to_string(),
            io_timeout: TEST_TIMEOUT,
            ..ClientConfig::default()
        }
    }

    pub fn received_path(&self, name: &str) -> PathBuf {
        self.output.path().join(format!("RECEIVED_{}", name))
    }

    pub fn received_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.output.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    pub async fn next_report(&mut self) -> SessionReport {
        tokio::time::timeout(TEST_TIMEOUT, self.reports.recv())
            .await
            .expect("timed out waiting for session report")
            .expect("server dropped report channel")
    }
}

fn server_config() -> ServerConfig {
    ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        io_timeout: TEST_TIMEOUT,
        ..ServerConfig::default()
    }
}

pub async fn start_server() -> TestServer {
    let output = tempfile::tempdir().unwrap();
    let sink = Arc::new(DirectorySink::new(output.path(), "RECEIVED_"));
    start_with_sink(output, sink).await
}

pub async fn start_server_with_sink(sink: Arc<dyn ReceivedFileSink>) -> TestServer {
    start_with_sink(tempfile::tempdir().unwrap(), sink).await
}

async fn start_with_sink(output: TempDir, sink: Arc<dyn ReceivedFileSink>) -> TestServer {
    let (tx, reports) = mpsc::unbounded_channel();
    let server = TransferServer::bind(server_config(), sink)
        .await
        .unwrap()
        .with_reports(tx);
    let addr = server.local_addr().unwrap();

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(server.run(shutdown.clone()));

    TestServer {
        addr,
        output,
        shutdown,
        reports,
        handle,
    }
}

/// Write `contents` to `<dir>/<name>` and return the path
pub fn write_source(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
