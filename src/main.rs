use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use flatr::FlatrError;
use flatr::calendar::Timeline;
use flatr::cli::Cli;
use flatr::cli::commands::Commands;
use flatr::config::Config;
use flatr::domain::DayIndex;
use flatr::scheduler::{FlattenJob, FlattenRequest, FlattenSummary, ProgressHandle};
use flatr::store::{ReviewStore, Scope, SqliteStore};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flatr")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("flatr.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Flatten { limit, deck, dry_run } => {
            handle_flatten_command(cli, config, *limit, deck.as_deref(), *dry_run)
        }
        Commands::Load { days, deck } => handle_load_command(cli, config, *days, deck.as_deref()),
        Commands::Undo => handle_undo_command(cli, config),
    }
}

/// Open the collection named on the CLI, falling back to the config path.
fn open_store(cli: &Cli, config: &Config) -> Result<SqliteStore> {
    let path = cli
        .collection
        .clone()
        .unwrap_or_else(|| config.collection.path.clone());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create collection directory")?;
    }
    let store =
        SqliteStore::open(&path).with_context(|| format!("Failed to open collection: {}", path.display()))?;
    info!("Opened collection at {}", path.display());
    Ok(store)
}

/// Resolve a deck name to a scope.
fn resolve_scope(store: &SqliteStore, deck: Option<&str>) -> Result<Scope> {
    match deck {
        None => Ok(Scope::All),
        Some(name) => {
            let id = store
                .deck_id_by_name(name)?
                .ok_or_else(|| FlatrError::DeckNotFound(name.to_string()))?;
            Ok(Scope::Deck(id))
        }
    }
}

fn handle_flatten_command(
    cli: &Cli,
    config: &Config,
    limit: Option<i64>,
    deck: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let store = open_store(cli, config)?;
    let timeline = store.timeline()?;
    let today = store.today()?;
    let scope = resolve_scope(&store, deck)?;

    let request = FlattenRequest {
        limit: limit.unwrap_or(config.flatten.default_limit),
        scope,
        easy_days: config.balance.easy_day_set(),
        load_balance: config.balance.load_balance,
        dry_run,
    };
    info!("Flattening with limit {} (dry_run: {})", request.limit, dry_run);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    match runtime.block_on(run_flatten(store, timeline, today, request)) {
        Ok(summary) => {
            report_summary(&summary, dry_run);
            Ok(())
        }
        // Precondition refusals are warnings, not failures.
        Err(e @ FlatrError::AdaptiveSchedulerDisabled) | Err(e @ FlatrError::InvalidLimit(_)) => {
            println!("{} {}", "Warning:".yellow(), e);
            Ok(())
        }
        Err(e) => Err(e).context("Flatten run failed"),
    }
}

/// Drive the background job while the foreground shows progress and
/// listens for ctrl-c.
async fn run_flatten(
    store: SqliteStore,
    timeline: Timeline,
    today: DayIndex,
    request: FlattenRequest,
) -> std::result::Result<FlattenSummary, FlatrError> {
    let progress = Arc::new(ProgressHandle::new());
    let job = FlattenJob::spawn_with(store, timeline, today, request, progress.clone());

    let mut ticker = tokio::time::interval(Duration::from_millis(200));
    let mut last_shown = 0;
    while !job.is_finished() {
        tokio::select! {
            _ = ticker.tick() => {
                let (processed, total) = progress.snapshot();
                if total > 0 && processed > last_shown {
                    println!("  {}/{} items placed", processed, total);
                    last_shown = processed;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Cancelling, committing progress so far...".yellow());
                job.request_cancel();
            }
        }
    }

    job.join().await
}

fn report_summary(summary: &FlattenSummary, dry_run: bool) {
    let verb = if dry_run { "would be flattened" } else { "flattened" };
    let line = format!(
        "{} of {} items {} in {:.2} seconds",
        summary.flattened,
        summary.selected,
        verb,
        summary.elapsed.as_secs_f64()
    );
    println!("{} {}", "Done:".green(), line);
    if summary.cancelled {
        println!("{}", "Run was cancelled; remaining items were left untouched.".yellow());
    }
}

fn handle_load_command(cli: &Cli, config: &Config, days: i64, deck: Option<&str>) -> Result<()> {
    let store = open_store(cli, config)?;
    let timeline = store.timeline()?;
    let today = store.today()?;
    let scope = resolve_scope(&store, deck)?;

    let occupancy = store.due_occupancy(today, scope)?;
    let limit = config.flatten.default_limit as usize;

    println!("{}", format!("Due load for the next {} days:", days).cyan());
    for day in today..today + days.max(0) {
        let count = occupancy.get(&day).copied().unwrap_or(0);
        let date = timeline.date_of(day);
        let bar = "#".repeat(count.min(60));
        let line = format!("  {} {:<9} {:>5}  {}", date, format!("{:?}", timeline.weekday_of(day)), count, bar);
        if count > limit {
            println!("{}", line.red());
        } else {
            println!("{}", line);
        }
    }
    Ok(())
}

fn handle_undo_command(cli: &Cli, config: &Config) -> Result<()> {
    let mut store = open_store(cli, config)?;
    match store.undo_last() {
        Ok((label, count)) => {
            println!("{} reverted '{}' ({} items)", "Undone:".green(), label, count);
            Ok(())
        }
        Err(e @ FlatrError::NothingToUndo(_)) => {
            println!("{} {}", "Warning:".yellow(), e);
            Ok(())
        }
        Err(e) => Err(e).context("Undo failed"),
    }
}

fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
