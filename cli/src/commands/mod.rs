//! # Dunder Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the top-level command groups of the Dunder CLI and
//! the small helpers they share.
//!
//! ## Command Groups
//!
//! - `template`: list templates and create projects from them
//! - `rewrite`: substitute tokens and realign headers in an existing tree
//! - `meta`: show, bump, set and synchronize project metadata
//!
//! Every handler receives the loaded `Config` by reference. Mutating handlers
//! print one line per action and fail with `DunderError::ActionsFailed` when
//! any action did not succeed, which makes the process exit non-zero.
//!
use crate::core::error::{DunderError, Result};
use crate::core::plan::{ActionOutcome, Mode};
use crate::core::walk::WalkReport;

/// Command group for metadata maintenance (`show`, `sync`, `bump`, `set`).
pub mod meta;
/// The `rewrite` command.
pub mod rewrite;
/// Command group for project templates (`list`, `create`).
pub mod template;

/// Parses a `KEY=VALUE` pair given with `--var`.
pub(crate) fn parse_key_val(s: &str) -> Result<(String, String)> {
    let (key, value) = s.split_once('=').ok_or_else(|| {
        DunderError::ArgumentParsing(format!(
            "Invalid variable format: '{}'. Expected format: KEY=VALUE",
            s
        ))
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(DunderError::ArgumentParsing(format!("Missing variable name in '{}'", s)).into());
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Prints one line per outcome and fails if any of them failed.
pub(crate) fn report_outcomes(outcomes: &[ActionOutcome], mode: Mode) -> Result<()> {
    for outcome in outcomes {
        println!("{}", outcome);
    }
    finish(outcomes.iter().filter(|o| o.is_failure()).count(), outcomes.len(), mode)
}

/// Prints a walk report and fails if anything in it failed.
pub(crate) fn report_walk(report: &WalkReport, mode: Mode) -> Result<()> {
    for line in report.lines() {
        println!("{}", line);
    }
    if report.binary_skipped > 0 {
        println!(
            "Skipped contents of {} binary file(s).",
            report.binary_skipped
        );
    }
    finish(report.failure_count(), report.outcomes.len(), mode)
}

fn finish(failed: usize, total: usize, mode: Mode) -> Result<()> {
    if total == 0 && failed == 0 {
        println!("Nothing to do.");
    } else if mode == Mode::DryRun {
        println!("Dry run: {} action(s) planned, nothing was changed.", total);
    }
    if failed > 0 {
        return Err(DunderError::ActionsFailed { count: failed }.into());
    }
    Ok(())
}
