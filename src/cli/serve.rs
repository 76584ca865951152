// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ServerConfig;
use crate::session::TransferServer;

/// Arguments for the serve command
///
/// Unset flags fall back to `TRANSFER_*` environment variables, then to
/// built-in defaults.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (e.g., 0.0.0.0:8080)
    #[arg(long)]
    pub listen: Option<String>,

    /// Directory received files are written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Prefix prepended to received file names
    #[arg(long)]
    pub prefix: Option<String>,

    /// Deadline for each socket operation, in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub io_timeout_secs: Option<u64>,
}

impl ServeArgs {
    pub fn into_config(self) -> ServerConfig {
        let mut config = ServerConfig::from_env();
        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(prefix) = self.prefix {
            config.received_prefix = prefix;
        }
        if let Some(secs) = self.io_timeout_secs {
            config.io_timeout = Duration::from_secs(secs);
        }
        config
    }
}

/// Run the transfer server until Ctrl-C
pub async fn serve(args: ServeArgs) -> Result<()> {
    dotenv::dotenv().ok();
    let config = args.into_config();

    info!(
        "Writing received files to {} with prefix {:?}",
        config.output_dir.display(),
        config.received_prefix
    );

    let server = TransferServer::bind_to_directory(config).await?;
    let shutdown = CancellationToken::new();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, stopping");
        }
        signal_token.cancel();
    });

    server.run(shutdown).await?;
    Ok(())
}
