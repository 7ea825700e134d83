//! # Dunder Meta Sync Command
//!
//! File: cli/src/commands/meta/sync.rs
//!
//! Pushes the configured metadata into `pyproject.toml`, `setup.cfg` and
//! `__init__.py` under the given project root. Only files that exist and
//! actually change are written.
//!
use crate::commands::report_outcomes;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::metadata::sync_metadata;
use crate::core::plan::Mode;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Project root containing pyproject.toml / setup.cfg.
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Print the planned writes without changing anything.
    #[arg(long)]
    dry_run: bool,
}

pub fn handle_sync(args: SyncArgs, cfg: &Config) -> Result<()> {
    info!("Synchronizing metadata into '{}'", args.path.display());
    let mode = Mode::from_dry_run(args.dry_run);
    let plan = sync_metadata(&args.path, &cfg.project)?;
    report_outcomes(&plan.run(mode), mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::ProjectMeta;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sync_dry_run_then_apply() -> Result<()> {
        let dir = tempdir()?;
        let setup_cfg = dir.path().join("setup.cfg");
        fs::write(&setup_cfg, "[metadata]\ndescription = old\n")?;
        let cfg = Config {
            project: ProjectMeta {
                description: "new".into(),
                ..Default::default()
            },
            ..Default::default()
        };

        let dry = SyncArgs {
            path: dir.path().to_path_buf(),
            dry_run: true,
        };
        handle_sync(dry, &cfg)?;
        assert_eq!(fs::read_to_string(&setup_cfg)?, "[metadata]\ndescription = old\n");

        let apply = SyncArgs {
            path: dir.path().to_path_buf(),
            dry_run: false,
        };
        handle_sync(apply, &cfg)?;
        assert_eq!(fs::read_to_string(&setup_cfg)?, "[metadata]\ndescription = new\n");
        Ok(())
    }
}
