//! # Dunder Rewrite Command
//!
//! File: cli/src/commands/rewrite.rs
//!
//! ## Overview
//!
//! Implements `dunder rewrite [PATH]`: runs the full walk (header
//! realignment, token substitution, path renames) over an existing tree,
//! using the token map built from the configuration and `--var` overrides.
//!
//! ```bash
//! # Fill in tokens in the current directory
//! dunder rewrite
//!
//! # Preview a rewrite of a vendored template with an extra token
//! dunder rewrite ./vendor/tpl --var ORG=Acme --dry-run
//! ```
//!
use crate::commands::{parse_key_val, report_walk};
use crate::core::config::Config;
use crate::core::context::build_token_map;
use crate::core::error::Result;
use crate::core::plan::Mode;
use crate::core::walk::{walk_and_rewrite, WalkContext};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Arguments for `dunder rewrite`.
#[derive(Parser, Debug)]
pub struct RewriteArgs {
    /// Root of the tree to rewrite.
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Extra tokens as KEY=VALUE (KEY is wrapped as __KEY__ when needed).
    #[arg(long = "var", value_parser = parse_key_val, action = clap::ArgAction::Append)]
    var: Vec<(String, String)>,

    /// Print the planned actions without changing anything.
    #[arg(long)]
    dry_run: bool,
}

pub fn handle_rewrite(args: RewriteArgs, cfg: &Config) -> Result<()> {
    info!("Rewriting tokens under '{}'", args.path.display());
    let mode = Mode::from_dry_run(args.dry_run);
    let tokens = build_token_map(&cfg.project, &cfg.dunders, &args.var)
        .context("Failed to build the token map")?;
    let rules = cfg.header_rules()?;
    let ctx = WalkContext {
        tokens: &tokens,
        rules: &rules,
        blacklists: &cfg.blacklist,
    };

    let report = walk_and_rewrite(&args.path, ctx, mode)
        .with_context(|| format!("Failed to rewrite '{}'", args.path.display()))?;
    info!(
        "Visited {} file(s) and {} director(ies)",
        report.files_visited, report.dirs_visited
    );
    report_walk(&report, mode)
}
