//! # Dunder Meta Bump Command
//!
//! File: cli/src/commands/meta/bump.rs
//!
//! Increments the configured version (`major`, `minor` or `patch`), writes
//! it back to the configuration file and synchronizes the project files.
//!
//! ```bash
//! dunder meta bump patch      # 1.4.2 -> 1.4.3
//! dunder meta bump major      # 1.4.2 -> 2.0.0
//! ```
//!
use super::update_and_sync;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::metadata::{bump_version, BumpPart, FieldValue};
use crate::core::plan::Mode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Part {
    Major,
    Minor,
    Patch,
}

impl From<Part> for BumpPart {
    fn from(part: Part) -> Self {
        match part {
            Part::Major => BumpPart::Major,
            Part::Minor => BumpPart::Minor,
            Part::Patch => BumpPart::Patch,
        }
    }
}

#[derive(Parser, Debug)]
pub struct BumpArgs {
    /// Version component to increment.
    #[arg(value_enum)]
    part: Part,

    /// Project root to synchronize.
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// Print the planned writes without changing anything.
    #[arg(long)]
    dry_run: bool,
}

pub fn handle_bump(args: BumpArgs, cfg: &Config) -> Result<()> {
    let mode = Mode::from_dry_run(args.dry_run);
    let current = &cfg.project.version;
    let next = bump_version(current, args.part.into())?;
    info!("Bumping version {} -> {}", current, next);
    println!("Version: {} -> {}", current, next);

    let mut meta = cfg.project.clone();
    meta.version = next.clone();
    update_and_sync(
        cfg,
        &[("version", FieldValue::Quoted(next))],
        &meta,
        &args.path,
        mode,
    )
}
