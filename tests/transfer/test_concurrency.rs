// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ecdh_transfer::crypto::sha256_digest;
use ecdh_transfer::session::{send_file, ClientSession};
use ecdh_transfer::{ClientConfig, TransferOutcome};
use futures::future::join_all;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::support::{start_server, write_source};

#[tokio::test]
async fn test_concurrent_sessions_are_isolated() {
    let mut server = start_server().await;
    let source_dir = tempfile::tempdir().unwrap();
    let config = server.client_config();

    let sends = (0..8).map(|i| {
        let contents = format!("payload number {}", i).into_bytes();
        let path = write_source(source_dir.path(), &format!("file{}.txt", i), &contents);
        let config = config.clone();
        tokio::spawn(async move { send_file(&config, &path).await })
    });

    for result in join_all(sends).await {
        let response = result.unwrap().unwrap();
        assert!(TransferOutcome::response_is_success(&response), "{}", response);
    }

    for i in 0..8 {
        let saved = std::fs::read(server.received_path(&format!("file{}.txt", i))).unwrap();
        assert_eq!(saved, format!("payload number {}", i).into_bytes());
    }

    for _ in 0..8 {
        assert!(server.next_report().await.is_success());
    }
}

async fn send_tampered(config: ClientConfig, name: String) -> String {
    let mut session = ClientSession::connect(&config)
        .await
        .unwrap()
        .handshake()
        .await
        .unwrap();
    let contents = name.as_bytes();
    let mut message = session
        .seal_file(&name, contents, &sha256_digest(contents))
        .unwrap();
    message.encrypted_data[0] ^= 0x80;
    session.send_payload(message).await.unwrap();
    session.await_response().await.unwrap()
}

#[tokio::test]
async fn test_failing_sessions_do_not_disturb_others() {
    let mut server = start_server().await;
    let source_dir = tempfile::tempdir().unwrap();
    let config = server.client_config();

    let tampered: Vec<_> = (0..3)
        .map(|i| tokio::spawn(send_tampered(config.clone(), format!("bad{}.txt", i))))
        .collect();

    let addr = server.addr;
    let garbage = tokio::spawn(async move {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let _ = stream.write_all(&[0xFF; 64]).await;
        let mut rest = Vec::new();
        let _ = stream.read_to_end(&mut rest).await;
    });

    let normal: Vec<_> = (0..4)
        .map(|i| {
            let contents = format!("good payload {}", i).into_bytes();
            let path = write_source(source_dir.path(), &format!("good{}.txt", i), &contents);
            let config = config.clone();
            tokio::spawn(async move { send_file(&config, &path).await })
        })
        .collect();

    for result in join_all(normal).await {
        let response = result.unwrap().unwrap();
        assert!(TransferOutcome::response_is_success(&response), "{}", response);
    }
    for result in join_all(tampered).await {
        let response = result.unwrap();
        assert!(response.contains("authentication failure"), "{}", response);
    }
    garbage.await.unwrap();

    let mut successes = 0;
    let mut auth_failures = 0;
    for _ in 0..8 {
        let report = server.next_report().await;
        if report.is_success() {
            successes += 1;
        } else if report.outcome == Some(TransferOutcome::AuthenticationFailed) {
            auth_failures += 1;
        }
    }
    assert_eq!(successes, 4);
    assert_eq!(auth_failures, 3);

    assert_eq!(server.received_files().len(), 4);
    for i in 0..4 {
        let saved = std::fs::read(server.received_path(&format!("good{}.txt", i))).unwrap();
        assert_eq!(saved, format!("good payload {}", i).into_bytes());
    }

    // Still accepting afterwards
    let path = write_source(source_dir.path(), "after.txt", b"still here");
    let response = send_file(&config, &path).await.unwrap();
    assert!(TransferOutcome::response_is_success(&response), "{}", response);
    assert_eq!(std::fs::read(server.received_path("after.txt")).unwrap(), b"still here");
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let server = start_server().await;
    let addr = server.addr;

    server.shutdown.cancel();
    server.handle.await.unwrap().unwrap();

    let source_dir = tempfile::tempdir().unwrap();
    let path = write_source(source_dir.path(), "late.txt", b"too late");
    let config = ClientConfig {
        server_addr: addr.to_string(),
        io_timeout: std::time::Duration::from_millis(500),
        ..Default::default()
    };
    assert!(send_file(&config, &path).await.is_err());
}
