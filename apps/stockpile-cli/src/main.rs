//! # Stockpile CLI
//!
//! Runs one sync operation for an owner against SQLite-backed stores.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          stockpile <command>                            │
//! │                                                                         │
//! │  status   print owner, status, metadata and snapshot counts             │
//! │  check    validate the local snapshot                                   │
//! │  push     push the local snapshot for --owner                           │
//! │  pull     pull --owner's rows into the local snapshot                   │
//! │  migrate  first-login flow: migrate then pull                           │
//! │                                                                         │
//! │  local.db  ──► SqliteLocalStore      (snapshot blob + sync metadata)    │
//! │  remote.db ──► SqliteRemoteTables    (items, profiles, map_pins)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Log Levels
//! - Default: `info`
//! - `RUST_LOG=stockpile_sync=debug` for per-batch detail

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stockpile_core::validation::validate_snapshot;
use stockpile_db::{Database, DbConfig};
use stockpile_sync::adapters::{SqliteLocalStore, SqliteRemoteTables};
use stockpile_sync::{AlwaysReachable, MigrationOutcome, SyncConfig, SyncEngine, SyncEngineBuilder};

#[derive(Parser, Debug)]
#[command(name = "stockpile")]
#[command(about = "Sync a household stockpile between this device and the remote store")]
struct Args {
    /// Owner to act as
    #[arg(long, global = true, env = "STOCKPILE_OWNER")]
    owner: Option<String>,

    /// Path to sync.toml (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show owner, status, metadata and snapshot counts
    Status,
    /// Validate the local snapshot
    Check,
    /// Push the local snapshot
    Push,
    /// Pull remote rows into the local snapshot
    Pull,
    /// Migrate pre-account data, then pull
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = SyncConfig::load(args.config.clone()).context("loading sync config")?;

    let (local_path, remote_path) = database_paths(&config)?;
    let local_db = open_database(&local_path).await?;
    let remote_db = open_database(&remote_path).await?;
    let remote = SqliteRemoteTables::new(remote_db);

    let engine = SyncEngineBuilder::new(config)
        .with_remote(Arc::new(remote.clone()))
        .with_local(Arc::new(SqliteLocalStore::new(local_db)))
        .with_reachability(Arc::new(AlwaysReachable))
        .build()?;

    if let Some(owner) = &args.owner {
        remote.ensure_profile(owner).await?;
        engine.restore_owner(owner.clone());
    }

    match args.command {
        Command::Status => print_status(&engine).await?,
        Command::Check => check(&engine).await?,
        Command::Push => {
            require_owner(&args.owner)?;
            let Some(report) = engine.push().await else {
                bail!("push failed (status: {})", engine.status());
            };
            println!(
                "pushed {} items in {} batches (profile: {}, pins: {})",
                report.items, report.batches, report.profile_synced, report.pins_synced
            );
        }
        Command::Pull => {
            require_owner(&args.owner)?;
            let Some(snapshot) = engine.pull().await else {
                bail!("pull failed (status: {})", engine.status());
            };
            println!(
                "pulled {} items and {} pins",
                snapshot.items.len(),
                snapshot.pins.len()
            );
        }
        Command::Migrate => {
            let owner = require_owner(&args.owner)?;
            let (outcome, snapshot) = engine.sign_in(owner).await;
            match outcome {
                MigrationOutcome::Migrated(report) => println!("migrated {} items", report.items),
                MigrationOutcome::AlreadyMigrated => println!("already migrated for {}", owner),
                MigrationOutcome::NothingToMigrate => println!("nothing to migrate"),
                MigrationOutcome::NoOwner => bail!("no owner"),
                MigrationOutcome::Failed => bail!("migration failed"),
            }
            if snapshot.is_none() {
                warn!("Pull after migration did not complete");
            }
        }
    }

    engine.destroy();
    Ok(())
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides the default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn require_owner(owner: &Option<String>) -> anyhow::Result<&str> {
    owner
        .as_deref()
        .context("--owner (or STOCKPILE_OWNER) is required for this command")
}

/// Resolves the local and remote database files: the configured paths,
/// else `local.db` and `remote.db` under the platform data dir.
fn database_paths(config: &SyncConfig) -> anyhow::Result<(PathBuf, PathBuf)> {
    let data_dir = SyncConfig::default_data_dir();
    let resolve = |configured: &Option<PathBuf>, file: &str| -> anyhow::Result<PathBuf> {
        match (configured, &data_dir) {
            (Some(path), _) => Ok(path.clone()),
            (None, Some(dir)) => Ok(dir.join(file)),
            (None, None) => bail!("no data directory for {}; set the storage paths in sync.toml", file),
        }
    };

    Ok((
        resolve(&config.storage.local_db, "local.db")?,
        resolve(&config.storage.remote_db, "remote.db")?,
    ))
}

async fn open_database(path: &Path) -> anyhow::Result<Database> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    info!(path = %path.display(), "Opening database");
    Database::new(DbConfig::new(path.to_path_buf()))
        .await
        .with_context(|| format!("opening {}", path.display()))
}

async fn print_status(engine: &SyncEngine) -> anyhow::Result<()> {
    println!("owner:    {}", engine.owner().as_deref().unwrap_or("(none)"));
    println!("status:   {}", engine.status());

    match engine.metadata().await {
        Some(meta) => {
            println!("synced as {}", meta.user_id);
            println!("last push: {}", fmt_time(meta.last_push));
            println!("last pull: {}", fmt_time(meta.last_pull));
        }
        None => println!("never synced"),
    }

    match engine.load_snapshot().await? {
        Some(snapshot) => println!(
            "snapshot: {} items, {} pins, saved {}",
            snapshot.items.len(),
            snapshot.pins.len(),
            fmt_time(snapshot.saved_at)
        ),
        None => println!("snapshot: none"),
    }
    Ok(())
}

async fn check(engine: &SyncEngine) -> anyhow::Result<()> {
    let Some(snapshot) = engine.load_snapshot().await? else {
        println!("no local snapshot");
        return Ok(());
    };

    validate_snapshot(&snapshot).context("local snapshot is invalid")?;
    println!("snapshot ok: {} items, {} pins", snapshot.items.len(), snapshot.pins.len());
    Ok(())
}

fn fmt_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.to_rfc3339()).unwrap_or_else(|| "never".into())
}
