// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod send;
pub mod serve;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::version::VERSION_NUMBER;

/// Secure single-file transfer over TCP
#[derive(Parser, Debug)]
#[command(name = "ecdh-transfer")]
#[command(version = VERSION_NUMBER)]
#[command(
    about = "Send one file over TCP with ephemeral ECDH and AES-256-GCM",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Receive files until interrupted
    Serve(serve::ServeArgs),

    /// Send one file and print the server's response
    Send(send::SendArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve(args) => serve::serve(args).await,
        Commands::Send(args) => send::send(args).await,
    }
}
