//! User-facing messages outside the log stream: the startup banner, the
//! interrupt notice and the end-of-run summary. Colors are enabled only when
//! the target stream is a TTY.

use owo_colors::OwoColorize;

use crate::console::{Screen, SharedScreen};
use crate::engine::RunSummary;

fn stdout_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn stderr_tty() -> bool {
    atty::is(atty::Stream::Stderr)
}

pub fn print_info(msg: &str) {
    if stdout_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if stderr_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if stderr_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

/// Warning for while the progress frame is live: goes through the screen so
/// the frame is redrawn below it instead of being torn.
pub fn print_warn_on(screen: &SharedScreen, msg: &str) {
    let mut screen = Screen::lock(screen);
    let line = if screen.is_interactive() {
        format!("{} {}", "warn:".yellow().bold(), msg)
    } else {
        format!("warn: {}", msg)
    };
    let _ = screen.print(&line);
}

/// Print a plain user-facing line (no prefix) that scripts may match on.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}

/// Warnings worth showing after the final frame, one per line.
pub fn summary_notes(summary: &RunSummary, dry_run: bool) -> Vec<String> {
    let mut notes = Vec::new();
    if dry_run {
        notes.push(format!("Dry-run: {} file(s) would move", summary.would_move));
    }
    if summary.already_present > 0 {
        notes.push(format!(
            "{} file(s) were already present at the destination; their sources were left in place",
            summary.already_present
        ));
    }
    if summary.mismatched > 0 {
        notes.push(format!(
            "{} file(s) did not verify after copying; their sources were kept",
            summary.mismatched
        ));
    }
    if summary.failed > 0 {
        notes.push(format!(
            "{} file(s) failed; see the log for details",
            summary.failed
        ));
    }
    notes
}

/// End-of-run report: notes, then the completion line.
pub fn print_run_summary(summary: &RunSummary, dry_run: bool) {
    let clean = !summary.had_failures();
    for note in summary_notes(summary, dry_run) {
        if clean {
            print_info(&note);
        } else {
            print_warn(&note);
        }
    }
    print_user("Transfer complete.");
}
