// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ecdh_transfer::crypto::sha256_digest;
use ecdh_transfer::session::{send_file, ClientSession, SessionPhase};
use ecdh_transfer::TransferOutcome;

use super::support::{start_server, write_source};

#[tokio::test]
async fn test_send_small_file_succeeds() {
    let mut server = start_server().await;
    let source_dir = tempfile::tempdir().unwrap();
    let path = write_source(source_dir.path(), "hello.txt", b"hello12345");

    let response = send_file(&server.client_config(), &path).await.unwrap();

    assert!(response.contains("succeeded"), "response: {}", response);
    assert_eq!(response, "transfer succeeded, filename=hello.txt");
    assert!(TransferOutcome::response_is_success(&response));

    let saved = std::fs::read(server.received_path("hello.txt")).unwrap();
    assert_eq!(saved, b"hello12345");

    let report = server.next_report().await;
    assert!(report.is_success());
    assert_eq!(report.phase, SessionPhase::Closed);
    assert!(report.error.is_none());

    server.shutdown.cancel();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_empty_file_round_trips() {
    let server = start_server().await;
    let source_dir = tempfile::tempdir().unwrap();
    let path = write_source(source_dir.path(), "empty.bin", b"");

    let response = send_file(&server.client_config(), &path).await.unwrap();
    assert!(TransferOutcome::response_is_success(&response));
    assert!(std::fs::read(server.received_path("empty.bin"))
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_larger_binary_file() {
    let server = start_server().await;
    let source_dir = tempfile::tempdir().unwrap();
    let contents: Vec<u8> = (0..3_000_000u32).map(|i| (i % 251) as u8).collect();
    let path = write_source(source_dir.path(), "blob.bin", &contents);

    let response = send_file(&server.client_config(), &path).await.unwrap();
    assert!(TransferOutcome::response_is_success(&response));

    let saved = std::fs::read(server.received_path("blob.bin")).unwrap();
    assert_eq!(sha256_digest(&saved), sha256_digest(&contents));
}

#[tokio::test]
async fn test_sessions_use_fresh_keys() {
    let server = start_server().await;
    let config = server.client_config();

    let mut keys = Vec::new();
    for name in ["a.txt", "b.txt"] {
        let mut session = ClientSession::connect(&config)
            .await
            .unwrap()
            .handshake()
            .await
            .unwrap();
        keys.push(session.session_key().clone());

        let message = session
            .seal_file(name, b"same bytes", &sha256_digest(b"same bytes"))
            .unwrap();
        session.send_payload(message).await.unwrap();
        let response = session.await_response().await.unwrap();
        assert!(TransferOutcome::response_is_success(&response));
    }

    assert_ne!(keys[0], keys[1], "each connection must derive its own key");
}

#[tokio::test]
async fn test_path_components_are_not_trusted() {
    let server = start_server().await;

    let mut session = ClientSession::connect(&server.client_config())
        .await
        .unwrap()
        .handshake()
        .await
        .unwrap();
    let message = session
        .seal_file("../../escape.txt", b"data", &sha256_digest(b"data"))
        .unwrap();
    session.send_payload(message).await.unwrap();
    let response = session.await_response().await.unwrap();

    assert!(TransferOutcome::response_is_success(&response));
    assert!(server.received_path("escape.txt").exists());
    assert_eq!(server.received_files().len(), 1);
}
