mod utils;

pub mod code;
pub mod db;
pub mod entry;
pub mod models;
pub mod observers;
pub mod settings;

use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use code::{FieldGrammar, IncrementalValidator};
use db::Database;
use entry::{
    commands::{handle_line, LineResult},
    EntryConfig, EntryController, EntrySnapshot, KeyOutcome,
};
use models::ObserverSite;
use observers::ObserverDirectory;
use settings::{InputMode, SettingsStore};

const ENABLE_LOGS: bool = true;

pub const DEFAULT_DATA_DIR: &str = "./halo-data";

pub(crate) struct AppState {
    pub(crate) db: Database,
    pub(crate) entry: EntryController<Database>,
    pub(crate) settings: SettingsStore,
}

impl AppState {
    async fn open(data_dir: &Path) -> Result<Self> {
        let database = Database::new(data_dir.join("halo.sqlite3"))?;
        import_observers(&database, &data_dir.join("observers.json")).await?;

        let settings = SettingsStore::new(data_dir.join("settings.json"))?;
        let entry_settings = settings.entry();
        if entry_settings.input_mode == InputMode::Menu {
            warn!("Input mode 'menu' belongs to the form dialog; this driver uses numeric entry");
        }

        let codes = database
            .known_codes(entry_settings.active_observers_only)
            .await?;
        if codes.is_empty() {
            warn!(
                "No observers registered in {}; every observer code will reset the entry",
                database.path().display()
            );
        }
        info!("Loaded {} observer codes", codes.len());

        let entry = EntryController::new(
            IncrementalValidator::new(FieldGrammar::new(codes)),
            Arc::new(database.clone()),
            EntryConfig::from(&entry_settings),
        );

        Ok(Self {
            db: database,
            entry,
            settings,
        })
    }
}

/// Upsert observer site periods from a JSON array, if the file exists.
async fn import_observers(db: &Database, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read observers from {}", path.display()))?;
    let sites: Vec<ObserverSite> = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid observer list in {}", path.display()))?;
    for site in &sites {
        db.insert_observer_site(site).await?;
    }
    info!("Imported {} observer site periods from {}", sites.len(), path.display());
    Ok(())
}

fn print_snapshot(snapshot: &EntrySnapshot) {
    println!("{}", snapshot.guide);
}

async fn drive(state: &AppState) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_snapshot(&state.entry.open().await);

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match handle_line(state, &line).await {
            Ok(LineResult::Typed { outcomes, snapshot }) => {
                for outcome in outcomes {
                    match outcome {
                        KeyOutcome::Reset => println!("unknown observer code, entry cleared"),
                        KeyOutcome::Busy => println!("waiting for region lookup"),
                        KeyOutcome::Backtracked { dropped } if dropped > 1 => {
                            println!("value out of range, {dropped} characters removed")
                        }
                        _ => {}
                    }
                }
                print_snapshot(&snapshot);
            }
            Ok(LineResult::Stored(record)) => {
                println!("stored {}", record.code.trim_end());
                print_snapshot(&state.entry.snapshot().await);
            }
            Ok(LineResult::Cancelled(snapshot)) => print_snapshot(&snapshot),
            Err(err) => {
                log_error!("{err:#}");
                println!("{err}");
            }
        }
    }

    let stored = state.db.list_observations().await?;
    info!(
        "Leaving with {} observations stored (timeout {} ms)",
        stored.len(),
        state.settings.entry().region_lookup_timeout_ms
    );
    Ok(())
}

pub fn run() -> Result<()> {
    let debug_mode = env::var("HALO_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(if debug_mode {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    info!("Halo entry starting up...");

    let data_dir = env::var_os("HALO_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(async {
        let state = AppState::open(&data_dir).await?;
        drive(&state).await
    })
}
