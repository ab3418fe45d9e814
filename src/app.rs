//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the signal handler, waits
//! for both roots, takes the inventory and runs the engine with the progress
//! reporter alongside.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use verify_move::cli::Args;
use verify_move::config::load_config;
use verify_move::console::{Screen, Terminal};
use verify_move::logging::init_tracing;
use verify_move::output as out;
use verify_move::{
    AvailabilityGate, LocalFs, MoveError, ProgressState, Reporter, TransferEngine, TransferJob,
    scan, shutdown,
};

/// Absolute, without `\\?\` prefixes on Windows. Does not touch the disk,
/// so it works for roots that are currently offline.
fn absolute(path: &Path) -> Result<PathBuf> {
    let abs = std::path::absolute(path)
        .with_context(|| format!("resolve path '{}'", path.display()))?;
    Ok(dunce::simplified(&abs).to_path_buf())
}

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Build config (may read XML). CLI args override config values.
    let mut cfg = load_config()?;
    args.apply_overrides(&mut cfg);
    cfg.source = absolute(&cfg.source)?;
    cfg.destination = absolute(&cfg.destination)?;

    let screen = Screen::shared(Box::new(Terminal::stdout(args.plain)));
    let _guard = init_tracing(cfg.log_level, cfg.log_file.as_deref(), args.json, &screen)
        .map_err(|e| {
            out::print_error(&format!("Failed to initialize logging: {e}"));
            e
        })?;

    cfg.validate()?;

    let notice_screen = Arc::clone(&screen);
    ctrlc::set_handler(move || {
        shutdown::request();
        out::print_warn_on(&notice_screen, "Received interrupt; finishing the current file...");
    })
    .context("install Ctrl-C handler")?;

    debug!("Starting verify_move: {:?}", args);
    if !args.json {
        out::print_info(&format!(
            "Moving '{}' -> '{}'",
            cfg.source.display(),
            cfg.destination.display()
        ));
    }

    let fs = LocalFs::new(cfg.preserve_metadata);
    let gate = AvailabilityGate::new(cfg.retry_interval);
    gate.wait_until_available(&fs, &cfg.source)?;
    gate.wait_until_available(&fs, &cfg.destination)?;

    let inventory = scan(&fs, &cfg.source);
    info!(
        files = inventory.files,
        bytes = inventory.bytes,
        "Found {} files to move",
        inventory.files
    );

    let progress = Arc::new(ProgressState::new());
    progress.set_totals(inventory.files, inventory.bytes);
    let job = TransferJob::new(cfg.source.clone(), cfg.destination.clone(), inventory);

    let reporter = Reporter::new(Arc::clone(&progress), Arc::clone(&screen), cfg.tick_interval)
        .plain_every(cfg.plain_every)
        .spawn()
        .context("start progress reporter")?;

    let summary = TransferEngine::new(&fs, &progress)
        .gate(gate)
        .failure_backoff(cfg.failure_backoff)
        .dry_run(cfg.dry_run)
        .run(&job);

    // The reporter draws one last frame after seeing the flag cleared.
    progress.finish();
    if reporter.join().is_err() {
        warn!("Progress reporter panicked; final frame may be missing");
    }

    info!(
        moved = summary.moved,
        already_present = summary.already_present,
        mismatched = summary.mismatched,
        failed = summary.failed,
        would_move = summary.would_move,
        interrupted = summary.interrupted,
        "Run summary"
    );

    if summary.interrupted {
        out::print_warn("Transfer interrupted; re-run to continue where it stopped.");
        return Err(MoveError::Interrupted.into());
    }
    out::print_run_summary(&summary, cfg.dry_run);
    Ok(())
}
