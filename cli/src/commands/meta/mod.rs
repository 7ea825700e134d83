//! # Dunder Meta Command Group
//!
//! File: cli/src/commands/meta/mod.rs
//!
//! ## Overview
//!
//! Entry point and router for `dunder meta`. The `[project]` table of the
//! configuration is the source of truth for a project's name, version,
//! description and keywords; these commands display it, change it and push
//! it into `pyproject.toml`, `setup.cfg` and the package's `__init__.py`.
//!
//! ## Examples
//!
//! ```bash
//! dunder meta show
//! dunder meta sync --dry-run
//! dunder meta bump minor
//! dunder meta set --description "Token rewriting for templates" --keyword cli --keyword python
//! ```
//!
use crate::commands::report_outcomes;
use crate::core::config::Config;
use crate::core::error::{DunderError, Result};
use crate::core::metadata::{set_config_fields, sync_metadata, FieldValue, ProjectMeta};
use crate::core::plan::{Mode, Plan};
use clap::{Parser, Subcommand};
use std::path::Path;

mod bump;
mod set;
mod show;
mod sync;

/// Arguments for the `dunder meta` command group.
#[derive(Parser, Debug)]
pub struct MetaArgs {
    #[command(subcommand)]
    command: MetaCommand,
}

#[derive(Subcommand, Debug)]
enum MetaCommand {
    /// Print the configured project metadata.
    Show(show::ShowArgs),
    /// Write the configured metadata into the project's packaging files.
    Sync(sync::SyncArgs),
    /// Increment the configured version and synchronize it.
    Bump(bump::BumpArgs),
    /// Change metadata fields in the configuration and synchronize them.
    Set(set::SetArgs),
}

/// Dispatches `dunder meta <subcommand>`.
pub fn handle_meta(args: MetaArgs, cfg: &Config) -> Result<()> {
    match args.command {
        MetaCommand::Show(args) => show::handle_show(args, cfg),
        MetaCommand::Sync(args) => sync::handle_sync(args, cfg),
        MetaCommand::Bump(args) => bump::handle_bump(args, cfg),
        MetaCommand::Set(args) => set::handle_set(args, cfg),
    }
}

/// The configuration file that `bump` and `set` write back to.
fn writable_config(cfg: &Config) -> Result<&Path> {
    cfg.source.as_deref().ok_or_else(|| {
        DunderError::Config(
            "No configuration file was loaded. Create a .dunder.toml with a [project] table first."
                .to_string(),
        )
        .into()
    })
}

/// Updates `fields` in the configuration file, then synchronizes `meta`
/// into the project at `root`. Both steps share one plan and one report.
fn update_and_sync(
    cfg: &Config,
    fields: &[(&str, FieldValue)],
    meta: &ProjectMeta,
    root: &Path,
    mode: Mode,
) -> Result<()> {
    let config_path = writable_config(cfg)?;
    let mut plan = Plan::new();
    if let Some(action) = set_config_fields(config_path, fields)? {
        plan.push(action);
    }
    let sync = sync_metadata(root, meta)?;
    // The config file may live in the synced tree; never write it twice.
    for action in sync.actions() {
        if action.path() != config_path {
            plan.push(action.clone());
        }
    }
    report_outcomes(&plan.run(mode), mode)
}
