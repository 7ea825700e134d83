//! # Dunder Action Plans
//!
//! File: cli/src/core/plan.rs
//!
//! ## Overview
//!
//! Every mutating operation in Dunder first produces a `Plan`: an ordered list
//! of filesystem actions computed without touching the disk. In
//! `Mode::Apply` the plan is executed; in `Mode::DryRun` it is only reported.
//! This keeps dry runs honest, since the exact same list of actions is either
//! printed or performed.
//!
//! Execution never stops at the first failure. Each action yields an
//! `ActionOutcome` so that the caller can report every path with its result.
//! Once an action on a path fails, later actions on that same path are
//! skipped: a file whose rewrite failed keeps its original name.
//!
use crate::common::fs::{copy, io};
use crate::core::error::Result;
use anyhow::{bail, Context};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Whether a plan is executed or only reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    DryRun,
    Apply,
}

impl Mode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            Mode::DryRun
        } else {
            Mode::Apply
        }
    }
}

/// One filesystem mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replace the contents of an existing file.
    Write { path: PathBuf, contents: String },
    /// Rename a file or directory. Never overwrites an existing destination.
    Rename { from: PathBuf, to: PathBuf },
    /// Recursively copy a directory's contents. Existing files at the
    /// destination are only replaced when `overwrite` is set.
    Copy {
        from: PathBuf,
        to: PathBuf,
        overwrite: bool,
    },
}

impl Action {
    /// Short verb used in reports.
    pub fn verb(&self) -> &'static str {
        match self {
            Action::Write { .. } => "rewrite",
            Action::Rename { .. } => "rename",
            Action::Copy { .. } => "copy",
        }
    }

    /// The path the action is primarily about.
    pub fn path(&self) -> &Path {
        match self {
            Action::Write { path, .. } => path,
            Action::Rename { from, .. } | Action::Copy { from, .. } => from,
        }
    }

    /// The same action with every path passed through `f`.
    pub fn map_paths(self, f: impl Fn(&Path) -> PathBuf) -> Self {
        match self {
            Action::Write { path, contents } => Action::Write {
                path: f(&path),
                contents,
            },
            Action::Rename { from, to } => Action::Rename {
                from: f(&from),
                to: f(&to),
            },
            Action::Copy {
                from,
                to,
                overwrite,
            } => Action::Copy {
                from: f(&from),
                to: f(&to),
                overwrite,
            },
        }
    }

    fn execute(&self) -> Result<()> {
        match self {
            Action::Write { path, contents } => {
                io::write_string_to_file(path, contents)?;
            }
            Action::Rename { from, to } => {
                if to.symlink_metadata().is_ok() {
                    bail!("Cannot rename {:?}: destination {:?} already exists", from, to);
                }
                fs::rename(from, to)
                    .with_context(|| format!("Failed to rename {:?} to {:?}", from, to))?;
            }
            Action::Copy {
                from,
                to,
                overwrite,
            } => {
                copy::copy_directory_contents(from, to, *overwrite)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Write { path, .. } => write!(f, "rewrite {}", path.display()),
            Action::Rename { from, to } => {
                write!(f, "rename  {} -> {}", from.display(), to.display())
            }
            Action::Copy { from, to, .. } => {
                write!(f, "copy    {} -> {}", from.display(), to.display())
            }
        }
    }
}

/// The result of executing (or planning) one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Planned only (dry run).
    Planned,
    Done,
    Failed(String),
    /// Not attempted because an earlier action on the same path failed.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub action: Action,
    pub outcome: Outcome,
}

impl ActionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Planned => write!(f, "[plan] {}", self.action),
            Outcome::Done => write!(f, "[ok]   {}", self.action),
            Outcome::Failed(msg) => write!(f, "[FAIL] {}: {}", self.action, msg),
            Outcome::Skipped => write!(
                f,
                "[skip] {}: an earlier action on this path failed",
                self.action
            ),
        }
    }
}

/// An ordered list of actions.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    actions: Vec<Action>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        debug!("Planned: {}", action);
        self.actions.push(action);
    }

    pub fn extend(&mut self, other: Plan) {
        self.actions.extend(other.actions);
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Executes (Apply) or just reports (DryRun) every action in order.
    /// A failing action is logged and recorded; later actions on other paths
    /// still run, later actions on the failed path are skipped.
    pub fn run(self, mode: Mode) -> Vec<ActionOutcome> {
        let mut failed_paths: HashSet<PathBuf> = HashSet::new();
        self.actions
            .into_iter()
            .map(|action| {
                let outcome = match mode {
                    Mode::DryRun => Outcome::Planned,
                    Mode::Apply if failed_paths.contains(action.path()) => {
                        warn!("Skipping {}: an earlier action on this path failed", action);
                        Outcome::Skipped
                    }
                    Mode::Apply => match action.execute() {
                        Ok(()) => {
                            info!("{}", action);
                            Outcome::Done
                        }
                        Err(e) => {
                            error!("{} failed: {:#}", action, e);
                            failed_paths.insert(action.path().to_path_buf());
                            Outcome::Failed(format!("{:#}", e))
                        }
                    },
                };
                ActionOutcome { action, outcome }
            })
            .collect()
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "old").unwrap();

        let mut plan = Plan::new();
        plan.push(Action::Write {
            path: file.clone(),
            contents: "new".into(),
        });
        plan.push(Action::Rename {
            from: file.clone(),
            to: dir.path().join("b.txt"),
        });

        let outcomes = plan.run(Mode::DryRun);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.outcome == Outcome::Planned));
        assert_eq!(fs::read_to_string(&file).unwrap(), "old");
        assert!(!dir.path().join("b.txt").exists());
    }

    #[test]
    fn test_apply_runs_in_order() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "old").unwrap();

        let mut plan = Plan::new();
        plan.push(Action::Write {
            path: file.clone(),
            contents: "new".into(),
        });
        plan.push(Action::Rename {
            from: file.clone(),
            to: dir.path().join("b.txt"),
        });

        let outcomes = plan.run(Mode::Apply);
        assert!(outcomes.iter().all(|o| o.outcome == Outcome::Done));
        assert_eq!(
            fs::read_to_string(dir.path().join("b.txt")).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_failure_does_not_stop_plan() {
        let dir = tempdir().unwrap();
        let existing = dir.path().join("taken.txt");
        let source = dir.path().join("src.txt");
        let other = dir.path().join("other.txt");
        fs::write(&existing, "x").unwrap();
        fs::write(&source, "y").unwrap();
        fs::write(&other, "z").unwrap();

        let mut plan = Plan::new();
        plan.push(Action::Rename {
            from: source.clone(),
            to: existing.clone(),
        });
        plan.push(Action::Write {
            path: other.clone(),
            contents: "updated".into(),
        });

        let outcomes = plan.run(Mode::Apply);
        assert!(outcomes[0].is_failure());
        assert!(outcomes[0].to_string().contains("already exists"));
        assert_eq!(outcomes[1].outcome, Outcome::Done);
        // Nothing was overwritten.
        assert_eq!(fs::read_to_string(&existing).unwrap(), "x");
        assert_eq!(fs::read_to_string(&other).unwrap(), "updated");
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(Mode::from_dry_run(true), Mode::DryRun);
        assert_eq!(Mode::from_dry_run(false), Mode::Apply);
    }

    #[test]
    fn test_failed_path_skips_later_actions_on_it() {
        let dir = tempdir().unwrap();
        // Writing to a directory fails; its rename must not happen.
        let blocked = dir.path().join("blocked");
        fs::create_dir(&blocked).unwrap();
        let other = dir.path().join("other.txt");
        fs::write(&other, "z").unwrap();

        let mut plan = Plan::new();
        plan.push(Action::Write {
            path: blocked.clone(),
            contents: "new".into(),
        });
        plan.push(Action::Rename {
            from: other.clone(),
            to: dir.path().join("renamed.txt"),
        });
        plan.push(Action::Rename {
            from: blocked.clone(),
            to: dir.path().join("moved"),
        });

        let outcomes = plan.run(Mode::Apply);
        assert!(outcomes[0].is_failure());
        assert_eq!(outcomes[1].outcome, Outcome::Done);
        assert_eq!(outcomes[2].outcome, Outcome::Skipped);
        assert!(!outcomes[2].is_failure());
        assert!(outcomes[2].to_string().starts_with("[skip] rename"));
        assert!(blocked.is_dir());
        assert!(!dir.path().join("moved").exists());
    }

    #[test]
    fn test_map_paths() {
        let action = Action::Rename {
            from: PathBuf::from("/stage/__NAME__"),
            to: PathBuf::from("/stage/foo"),
        };
        let mapped = action.map_paths(|p| Path::new("/out").join(p.strip_prefix("/stage").unwrap()));
        assert_eq!(
            mapped,
            Action::Rename {
                from: PathBuf::from("/out/__NAME__"),
                to: PathBuf::from("/out/foo"),
            }
        );
    }
}
