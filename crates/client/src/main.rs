//! `brickerp-client` command line.

use std::path::PathBuf;

use anyhow::Context;
use brickerp_client::{Client, ClientConfig};
use brickerp_numbering::DocumentKind;
use brickerp_offline::{ConnectivityState, PendingOperation, SubmitOutcome};
use clap::{Parser, Subcommand};

/// Local utilities of the brickerp client: document numbering and the
/// offline write queue.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL (overrides BRICKERP_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Directory of the local database (overrides BRICKERP_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Track connectivity and replay queued writes until ctrl-c
    Run,
    /// Issue the next document number of a kind (production_order, delivery, sale, quote, invoice)
    NextNumber { kind: DocumentKind },
    /// Print queued operations, one JSON object per line
    Pending,
    /// Run one drain pass now
    Drain,
    /// Apply a write, or queue it if the backend cannot take it now
    Submit {
        /// Operation as JSON, e.g. {"kind":"delete_record","table":"sales","id":"3"}
        operation: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    brickerp_observability::init();

    let args = Args::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = args.api_url {
        config.api_url = url;
    }
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }

    match args.command {
        Command::Run => {
            let initial = Client::detect_connectivity(&config).await?;
            tracing::info!(connectivity = ?initial, "starting client");
            Client::open(config, initial).await?.run_until_shutdown().await?;
        }
        Command::NextNumber { kind } => {
            let client = Client::open(config, ConnectivityState::Offline).await?;
            let number = client
                .numbering
                .next_number(kind)
                .await
                .with_context(|| format!("failed to issue a {kind} number"))?;
            println!("{number}");
        }
        Command::Pending => {
            let client = Client::open(config, ConnectivityState::Offline).await?;
            for entry in client.queue.pending().await {
                println!("{}", serde_json::to_string(&entry)?);
            }
        }
        Command::Drain => {
            let initial = Client::detect_connectivity(&config).await?;
            let client = Client::open(config, initial).await?;
            let report = client.queue.drain().await?;
            println!(
                "applied {} failed {} remaining {}{}",
                report.applied,
                report.failed,
                report.remaining,
                if initial == ConnectivityState::Offline { " (offline)" } else { "" }
            );
        }
        Command::Submit { operation } => {
            let operation: PendingOperation =
                serde_json::from_str(&operation).context("invalid operation JSON")?;
            let initial = Client::detect_connectivity(&config).await?;
            let client = Client::open(config, initial).await?;
            match client.queue.submit(operation).await? {
                SubmitOutcome::Applied => println!("applied"),
                SubmitOutcome::Queued(entry) => println!("queued {}", entry.id),
            }
        }
    }

    Ok(())
}
