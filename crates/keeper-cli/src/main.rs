//! Keeper interactive shell.
//!
//! Composition root: wires the file-backed durable store, the state
//! container, and the persistence gateway together, then hands control to
//! the command loop. The session survives process restarts; records live in
//! memory only.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use keeper_core::store::Store;
use keeper_infrastructure::{FileDurableStore, KeeperPaths, PersistenceGateway};

mod repl;

#[derive(Parser)]
#[command(name = "keeper")]
#[command(about = "Keeper - durable session and record keeper", long_about = None)]
struct Cli {
    /// Directory for durable state (defaults to the platform data dir).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log filter, e.g. "info" or "keeper_infrastructure=debug".
    #[arg(long, default_value = "warn")]
    log_filter: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_filter)),
        )
        .init();

    let state_dir = match cli.data_dir {
        Some(dir) => dir,
        None => KeeperPaths::state_dir()?,
    };
    tracing::info!(?state_dir, "starting keeper");

    let durable = Arc::new(FileDurableStore::new(&state_dir).await?);
    let store = Arc::new(Store::new());

    // Hydrate before accepting any input: nothing session-dependent runs
    // until the store is ready.
    let gateway = PersistenceGateway::bootstrap(&store, durable).await?;

    repl::run(&store).await?;

    // Let in-flight durable writes settle before the process exits.
    gateway.flush().await;
    Ok(())
}
