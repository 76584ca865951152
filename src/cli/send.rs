// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::protocol::TransferOutcome;
use crate::session::send_file;

/// Arguments for the send command
#[derive(Args, Debug)]
pub struct SendArgs {
    /// File to send
    #[arg(long)]
    pub file: PathBuf,

    /// Server address (e.g., 127.0.0.1:8080)
    #[arg(long)]
    pub server: Option<String>,

    /// Deadline for each socket operation, in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub io_timeout_secs: Option<u64>,
}

impl SendArgs {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(server) = &self.server {
            config.server_addr = server.clone();
        }
        if let Some(secs) = self.io_timeout_secs {
            config.io_timeout = Duration::from_secs(secs);
        }
        config
    }
}

/// Send one file; fails unless the server reports a saved transfer
pub async fn send(args: SendArgs) -> Result<()> {
    dotenv::dotenv().ok();
    let config = args.client_config();

    println!(
        "📤 Sending {} to {}...",
        args.file.display(),
        config.server_addr
    );
    let response = send_file(&config, &args.file).await?;

    println!("\n========================================");
    println!("Server response: {}", response);
    println!("========================================\n");

    if TransferOutcome::response_is_success(&response) {
        Ok(())
    } else {
        Err(anyhow!("server did not confirm the transfer: {}", response))
    }
}
