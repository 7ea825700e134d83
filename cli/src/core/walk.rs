//! # Dunder Directory Walk
//!
//! File: cli/src/core/walk.rs
//!
//! ## Overview
//!
//! Recursively rewrites a directory tree: file contents go through the
//! rewrite pass (`core::rewrite`) and every file or directory whose name
//! contains a token is renamed.
//!
//! ## Architecture
//!
//! The walk is split into planning and execution:
//!
//! 1. **Collect** entries with `walkdir` in sorted, depth-first order.
//!    Entries matched by `skip_all` are pruned with `filter_entry`, so nothing
//!    inside them is listed or read. The root itself is never touched.
//! 2. **Plan content**: for each regular file (in walk order) compute the
//!    rewritten text and plan a `Write` if it changed.
//! 3. **Plan renames**: walk the collected entries in reverse. Because the
//!    listing is depth-first, reversing it puts every descendant before its
//!    ancestors, so a directory is renamed only after everything inside it
//!    has been rewritten and renamed under its original path.
//! 4. **Run** the plan according to `Mode`.
//!
//! Failures (unreadable entries, write/rename errors) are recorded per path
//! and the walk carries on with the next entry. A file that could not be
//! read or rewritten is not renamed either.
//!
use crate::core::blacklist::Blacklists;
use crate::core::error::{DunderError, Result};
use crate::core::header::HeaderRules;
use crate::core::plan::{Action, ActionOutcome, Mode, Plan};
use crate::core::rewrite::{rewrite_text, RewriteScope};
use crate::core::tokens::TokenMap;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A path that could not be processed while planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFailure {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for PathFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FAIL] {}: {}", self.path.display(), self.message)
    }
}

/// Everything that happened during one walk.
#[derive(Debug, Default)]
pub struct WalkReport {
    pub files_visited: usize,
    pub dirs_visited: usize,
    pub binary_skipped: usize,
    /// Failures encountered while planning (listing or reading).
    pub failures: Vec<PathFailure>,
    /// Planned or executed actions with their outcome.
    pub outcomes: Vec<ActionOutcome>,
}

impl WalkReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty() && !self.outcomes.iter().any(ActionOutcome::is_failure)
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len() + self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    /// One line per action and per failure.
    pub fn lines(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(ToString::to_string)
            .chain(self.outcomes.iter().map(ToString::to_string))
            .collect()
    }
}

/// Inputs shared by every file of a walk. Read-only for its duration.
#[derive(Debug, Clone, Copy)]
pub struct WalkContext<'a> {
    pub tokens: &'a TokenMap,
    pub rules: &'a HeaderRules,
    pub blacklists: &'a Blacklists,
}

struct Entry {
    path: PathBuf,
    rel: PathBuf,
    is_file: bool,
    is_dir: bool,
}

/// Rewrites and renames everything under `root` (see module docs).
///
/// # Errors
///
/// Returns an error only if `root` is not a directory; per-path problems are
/// collected in the report.
pub fn walk_and_rewrite(root: &Path, ctx: WalkContext<'_>, mode: Mode) -> Result<WalkReport> {
    let (plan, mut report) = plan_walk(root, ctx)?;
    info!(
        "Walk of '{}' planned {} action(s) ({:?})",
        root.display(),
        plan.len(),
        mode
    );
    report.outcomes = plan.run(mode);
    if !report.is_ok() {
        warn!(
            "{} path(s) under '{}' could not be processed",
            report.failure_count(),
            root.display()
        );
    }
    Ok(report)
}

/// Builds the plan for `root` without touching the filesystem.
pub fn plan_walk(root: &Path, ctx: WalkContext<'_>) -> Result<(Plan, WalkReport)> {
    if !root.is_dir() {
        return Err(DunderError::FileSystem(format!(
            "Walk root is not a directory: {}",
            root.display()
        ))
        .into());
    }
    for descriptor in ctx.rules.descriptors() {
        if !ctx.tokens.contains_key(&descriptor.key) {
            warn!(
                "Header '{}' expects token '{}', which has no value",
                descriptor.label, descriptor.key
            );
        }
    }

    if ctx.tokens.is_empty() {
        info!("No tokens have a value; names and contents under '{}' stay as they are", root.display());
    }

    let mut report = WalkReport::default();
    let entries = collect_entries(root, ctx.blacklists, &mut report);
    let mut plan = Plan::new();

    for entry in entries.iter().filter(|e| e.is_file) {
        report.files_visited += 1;
        if let Some(action) = plan_content(entry, ctx, &mut report) {
            plan.push(action);
        }
    }

    // A path that could not be read keeps its name.
    let unreadable: HashSet<PathBuf> = report.failures.iter().map(|f| f.path.clone()).collect();
    for entry in entries.iter().rev() {
        if entry.is_dir {
            report.dirs_visited += 1;
        }
        if unreadable.contains(&entry.path) {
            debug!("Not renaming '{}' after a read failure", entry.path.display());
            continue;
        }
        if let Some(action) = plan_rename(entry, ctx) {
            plan.push(action);
        }
    }

    Ok((plan, report))
}

fn collect_entries(root: &Path, blacklists: &Blacklists, report: &mut WalkReport) -> Vec<Entry> {
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let rel = e.path().strip_prefix(root).unwrap_or(e.path());
            let pruned = blacklists.prunes(rel);
            if pruned {
                debug!("Pruned by skip_all: {}", e.path().display());
            }
            !pruned
        });

    let mut entries = Vec::new();
    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                warn!("Failed to access entry under '{}': {}", root.display(), e);
                report.failures.push(PathFailure {
                    path,
                    message: e.to_string(),
                });
                continue;
            }
        };
        let rel = match entry.path().strip_prefix(root) {
            Ok(p) => p.to_path_buf(),
            Err(_) => {
                warn!(
                    "Could not determine relative path for '{}'",
                    entry.path().display()
                );
                continue;
            }
        };
        let file_type = entry.file_type();
        entries.push(Entry {
            path: entry.into_path(),
            rel,
            is_file: file_type.is_file(),
            is_dir: file_type.is_dir(),
        });
    }
    entries
}

fn plan_content(entry: &Entry, ctx: WalkContext<'_>, report: &mut WalkReport) -> Option<Action> {
    let scope = RewriteScope {
        headers: !ctx.rules.is_empty() && !ctx.blacklists.skips_header(&entry.rel),
        text: !ctx.blacklists.skips_text(&entry.rel),
    };
    if scope.is_noop() {
        debug!("Contents skipped by blacklist: {}", entry.rel.display());
        return None;
    }

    let bytes = match fs::read(&entry.path) {
        Ok(b) => b,
        Err(e) => {
            warn!("Failed to read '{}': {}", entry.path.display(), e);
            report.failures.push(PathFailure {
                path: entry.path.clone(),
                message: format!("Failed to read file: {}", e),
            });
            return None;
        }
    };
    let original = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(_) => {
            debug!("Skipping contents of binary file: {}", entry.path.display());
            report.binary_skipped += 1;
            return None;
        }
    };

    let rewritten = rewrite_text(&original, ctx.tokens, ctx.rules, scope);
    if rewritten == original {
        return None;
    }
    Some(Action::Write {
        path: entry.path.clone(),
        contents: rewritten,
    })
}

fn plan_rename(entry: &Entry, ctx: WalkContext<'_>) -> Option<Action> {
    let name = entry.path.file_name()?.to_str()?;
    if !ctx.tokens.contains_any(name) {
        return None;
    }
    if ctx.blacklists.keeps_name(&entry.rel) {
        debug!("Name kept by skip_path: {}", entry.rel.display());
        return None;
    }
    let new_name = ctx.tokens.substitute(name);
    if new_name == name || new_name.is_empty() || new_name.contains(['/', '\\']) {
        if new_name != name {
            warn!(
                "Refusing to rename '{}' to invalid name '{}'",
                entry.path.display(),
                new_name
            );
        }
        return None;
    }
    Some(Action::Rename {
        from: entry.path.clone(),
        to: entry.path.with_file_name(new_name),
    })
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::header::HeaderDescriptor;
    use crate::core::plan::Outcome;
    use tempfile::tempdir;

    fn create_file(path: &Path, content: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn fixtures() -> (TokenMap, HeaderRules) {
        let tokens = TokenMap::from_pairs([("__NAME__", "foo"), ("__DESC__", "A tool")]).unwrap();
        let rules =
            HeaderRules::new(&[HeaderDescriptor::new("Project :", "__NAME__", "/  \\")]).unwrap();
        (tokens, rules)
    }

    #[test]
    fn test_walk_rewrites_and_renames() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        create_file(
            &root.join("src/__NAME__/__NAME__.py"),
            b"# Project : __NAME__        /  \\\n\"\"\"__DESC__\"\"\"\n",
        );
        create_file(&root.join("README.md"), b"# __NAME__\n");
        create_file(&root.join("plain.txt"), b"untouched\n");

        let (tokens, rules) = fixtures();
        let blacklists = Blacklists::none();
        let ctx = WalkContext {
            tokens: &tokens,
            rules: &rules,
            blacklists: &blacklists,
        };
        let report = walk_and_rewrite(root, ctx, Mode::Apply)?;

        assert!(report.is_ok(), "{:?}", report.lines());
        assert_eq!(report.files_visited, 3);
        let module = root.join("src/foo/foo.py");
        assert_eq!(
            fs::read_to_string(&module)?,
            "# Project : foo             /  \\\n\"\"\"A tool\"\"\"\n"
        );
        assert_eq!(fs::read_to_string(root.join("README.md"))?, "# foo\n");
        assert!(!root.join("src/__NAME__").exists());
        assert_eq!(fs::read_to_string(root.join("plain.txt"))?, "untouched\n");
        Ok(())
    }

    #[test]
    fn test_children_are_processed_before_parent_rename() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        create_file(&root.join("__NAME__/inner/__NAME__.txt"), b"name=__NAME__");

        let (tokens, rules) = fixtures();
        let blacklists = Blacklists::none();
        let ctx = WalkContext {
            tokens: &tokens,
            rules: &rules,
            blacklists: &blacklists,
        };
        let (plan, _) = plan_walk(root, ctx)?;
        let actions = plan.actions().to_vec();

        // Content first, then the file rename, then its ancestor directory.
        assert_eq!(actions.len(), 3);
        assert!(matches!(&actions[0], Action::Write { path, .. } if path.ends_with("__NAME__/inner/__NAME__.txt")));
        assert!(matches!(&actions[1], Action::Rename { from, .. } if from.ends_with("inner/__NAME__.txt")));
        assert!(matches!(&actions[2], Action::Rename { from, to } if from == &root.join("__NAME__") && to == &root.join("foo")));

        plan.run(Mode::Apply);
        assert_eq!(fs::read_to_string(root.join("foo/inner/foo.txt"))?, "name=foo");
        Ok(())
    }

    #[test]
    fn test_skip_all_prunes_subtree() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        // Undecodable sentinel: reading it would count as a skipped binary.
        create_file(&root.join("vendor/__NAME__/sentinel.bin"), &[0xff, 0xfe, 0x00]);
        create_file(&root.join("vendor/__NAME__.txt"), b"__NAME__");
        create_file(&root.join("keep.txt"), b"__NAME__");

        let (tokens, rules) = fixtures();
        let blacklists = Blacklists {
            skip_all: vec!["vendor".into()],
            ..Blacklists::none()
        };
        let ctx = WalkContext {
            tokens: &tokens,
            rules: &rules,
            blacklists: &blacklists,
        };
        let report = walk_and_rewrite(root, ctx, Mode::Apply)?;

        assert_eq!(report.files_visited, 1);
        assert_eq!(report.binary_skipped, 0);
        assert!(report
            .outcomes
            .iter()
            .all(|o| !o.action.path().starts_with(root.join("vendor"))));
        assert!(root.join("vendor/__NAME__/sentinel.bin").exists());
        assert_eq!(fs::read_to_string(root.join("vendor/__NAME__.txt"))?, "__NAME__");
        assert_eq!(fs::read_to_string(root.join("keep.txt"))?, "foo");
        Ok(())
    }

    #[test]
    fn test_skip_header_skip_text_and_skip_path() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        let content = b"# Project : __NAME__        /  \\\n__NAME__\n";
        create_file(&root.join("docs/__NAME__.md"), content);
        create_file(&root.join("LICENSE"), content);

        let (tokens, rules) = fixtures();
        let blacklists = Blacklists {
            skip_header: vec!["docs".into()],
            skip_text: vec!["LICENSE".into()],
            skip_path: vec!["docs/__NAME__.md".into()],
            ..Blacklists::none()
        };
        let ctx = WalkContext {
            tokens: &tokens,
            rules: &rules,
            blacklists: &blacklists,
        };
        walk_and_rewrite(root, ctx, Mode::Apply)?;

        // Header stage skipped: plain substitution, no realignment, name kept.
        assert_eq!(
            fs::read_to_string(root.join("docs/__NAME__.md"))?,
            "# Project : foo        /  \\\nfoo\n"
        );
        // Text stage skipped: header realigned, body untouched.
        assert_eq!(
            fs::read_to_string(root.join("LICENSE"))?,
            "# Project : foo             /  \\\n__NAME__\n"
        );
        Ok(())
    }

    #[test]
    fn test_dry_run_changes_nothing() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        create_file(&root.join("__NAME__.py"), b"__NAME__");

        let (tokens, rules) = fixtures();
        let blacklists = Blacklists::none();
        let ctx = WalkContext {
            tokens: &tokens,
            rules: &rules,
            blacklists: &blacklists,
        };
        let report = walk_and_rewrite(root, ctx, Mode::DryRun)?;

        assert_eq!(report.outcomes.len(), 2);
        assert!(report.outcomes.iter().all(|o| o.outcome == Outcome::Planned));
        assert_eq!(fs::read_to_string(root.join("__NAME__.py"))?, "__NAME__");
        Ok(())
    }

    #[test]
    fn test_binary_files_are_renamed_but_not_read() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        create_file(&root.join("__NAME__.png"), &[0x89, 0x50, 0xff, 0xfe]);

        let (tokens, rules) = fixtures();
        let blacklists = Blacklists::none();
        let ctx = WalkContext {
            tokens: &tokens,
            rules: &rules,
            blacklists: &blacklists,
        };
        let report = walk_and_rewrite(root, ctx, Mode::Apply)?;

        assert_eq!(report.binary_skipped, 1);
        assert_eq!(fs::read(root.join("foo.png"))?, vec![0x89, 0x50, 0xff, 0xfe]);
        Ok(())
    }

    #[test]
    fn test_rename_conflict_is_reported_and_walk_continues() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        create_file(&root.join("__NAME__.txt"), b"one");
        create_file(&root.join("foo.txt"), b"two");
        create_file(&root.join("z.txt"), b"__NAME__");

        let (tokens, rules) = fixtures();
        let blacklists = Blacklists::none();
        let ctx = WalkContext {
            tokens: &tokens,
            rules: &rules,
            blacklists: &blacklists,
        };
        let report = walk_and_rewrite(root, ctx, Mode::Apply)?;

        assert!(!report.is_ok());
        assert_eq!(report.failure_count(), 1);
        assert_eq!(fs::read_to_string(root.join("foo.txt"))?, "two");
        assert_eq!(fs::read_to_string(root.join("z.txt"))?, "foo");
        Ok(())
    }

    #[test]
    fn test_root_must_be_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "x").unwrap();
        let (tokens, rules) = fixtures();
        let blacklists = Blacklists::none();
        let ctx = WalkContext {
            tokens: &tokens,
            rules: &rules,
            blacklists: &blacklists,
        };
        assert!(walk_and_rewrite(&file, ctx, Mode::Apply).is_err());
    }

    #[test]
    fn test_failed_rewrite_keeps_original_name() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        let file = root.join("__NAME__.txt");
        create_file(&file, b"__NAME__\n");

        let (tokens, rules) = fixtures();
        let blacklists = Blacklists::none();
        let ctx = WalkContext {
            tokens: &tokens,
            rules: &rules,
            blacklists: &blacklists,
        };
        let (plan, _) = plan_walk(root, ctx)?;
        assert_eq!(plan.len(), 2);

        // The path stops being a writable file between planning and applying.
        fs::remove_file(&file)?;
        fs::create_dir(&file)?;
        let outcomes = plan.run(Mode::Apply);

        assert!(outcomes[0].is_failure(), "{}", outcomes[0]);
        assert_eq!(outcomes[1].outcome, Outcome::Skipped);
        assert!(file.is_dir());
        assert!(!root.join("foo.txt").exists());
        Ok(())
    }
}
