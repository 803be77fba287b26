//! Host binary for the Homestead transition engine.
//!
//! The engine is pure; this binary supplies everything around it. It
//! loads configuration, keeps one farm's snapshot on disk, stamps each
//! incoming action with the wall clock, and hands withdrawals to the
//! settlement bridge.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$HOMESTEAD_CONFIG` (default
//!    `homestead.yaml`) and apply environment overrides
//! 2. Initialize structured logging (tracing)
//! 3. Tag the run with a UUID v7 session id
//! 4. Load the farm snapshot, or create a starting farm
//! 5. Settle withdrawals left pending by a previous run
//! 6. Replay the JSON-lines action feed (file argument or stdin)
//! 7. Log the summary
//!
//! ```text
//! homestead-host [FEED]
//! ```

mod config;
mod error;
mod feed;
mod settlement;
mod store;

use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::io::BufReader;
use tracing::{Instrument, info};
use tracing_subscriber::EnvFilter;

use homestead_core::{Session, TransitionEngine};
use homestead_types::Timestamp;
use homestead_world::starting_farm;

use crate::config::{CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH, HostConfig, LogFormat, LoggingConfig};
use crate::error::HostError;
use crate::feed::Replay;
use crate::settlement::{LoggingBridge, settle};
use crate::store::{FileSnapshotStore, SnapshotStore};

/// Application entry point for the host.
///
/// # Errors
///
/// Returns an error if configuration, storage, or the feed itself fails.
/// Rejected actions are not errors.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config_path =
        std::env::var(CONFIG_PATH_VAR).map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let mut config = HostConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    config.apply_env_overrides(|key| std::env::var(key).ok());

    // 2. Initialize structured logging.
    init_logging(&config.logging);

    // 3. Tag the run.
    let session_id = uuid::Uuid::now_v7();
    let span = tracing::info_span!("session", id = %session_id, farm = %config.storage.farm_id);

    let feed = std::env::args_os().nth(1).map(PathBuf::from);
    run(config, &config_path, feed).instrument(span).await
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(config: HostConfig, config_path: &Path, feed: Option<PathBuf>) -> anyhow::Result<()> {
    info!(
        config = %config_path.display(),
        snapshot_dir = %config.storage.snapshot_dir.display(),
        max_actions_per_window = config.engine.integrity.max_actions_per_window,
        "homestead-host starting"
    );

    // 4. Load or create the farm.
    let farm = config.storage.farm_id;
    let store = FileSnapshotStore::new(&config.storage.snapshot_dir);
    let state = if let Some(state) = store.load(farm).await? {
        info!(
            dir = %store.dir().display(),
            last_processed_at = state.bookkeeping.last_processed_at,
            "Farm snapshot loaded"
        );
        state
    } else {
        let state = starting_farm(wall_clock());
        store.save(farm, &state).await?;
        info!("Starting farm created");
        state
    };
    let mut session = Session::new(TransitionEngine::new(config.engine), state);

    // 5. Settle leftovers.
    let mut bridge = LoggingBridge::default();
    if settle(&mut session, &mut bridge, farm, wall_clock) > 0 {
        store.save(farm, session.state()).await?;
    }

    // 6. Replay the feed.
    let mut replay = Replay {
        farm,
        store: &store,
        bridge: &mut bridge,
    };
    let summary = match feed {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .map_err(|err| HostError::io(&path, err))?;
            replay
                .run(&mut session, BufReader::new(file), &path, wall_clock)
                .await?
        }
        None => {
            replay
                .run(
                    &mut session,
                    BufReader::new(tokio::io::stdin()),
                    Path::new("-"),
                    wall_clock,
                )
                .await?
        }
    };

    // 7. Report.
    let stats = session.stats();
    info!(
        committed = stats.committed,
        rejected = stats.rejected,
        settled = summary.settled,
        forwarded = bridge.forwarded(),
        pending = session.pending_settlements().len(),
        "homestead-host finished"
    );
    Ok(())
}

/// Milliseconds since the Unix epoch. A clock before 1970 reads as zero.
fn wall_clock() -> Timestamp {
    Timestamp::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
