//! # Dunder Template Create Command
//!
//! File: cli/src/commands/template/create.rs
//!
//! ## Overview
//!
//! Implements `dunder template create`, which scaffolds a new project:
//!
//! 1. Resolve the template directory and the target `<output>/<name>`
//! 2. Build the token map (`[project]` metadata with `name = <name>`, the
//!    `[dunders]` table, then `--var` overrides)
//! 3. Copy the template contents into a staging directory beside the target
//! 4. Walk the staged copy: realign header banners, substitute tokens in
//!    every text file and rename tokenized paths
//! 5. Copy the finished tree into the target (replacing files the template
//!    provides when `--force` is given), then print the report and next steps
//!
//! Files already in the target that the template does not provide are never
//! read or rewritten. If the rewrite fails, the target is left untouched.
//!
//! With `--dry-run` nothing is copied; the rewrite plan is computed against
//! the template source so the user can see what would change.
//!
//! ## Examples
//!
//! ```bash
//! dunder template create -t python my-tool
//! dunder template create -t python -o ~/src --var ORG=Acme my-tool
//! dunder template create -t python --force my-tool
//! ```
//!
use crate::commands::{parse_key_val, report_outcomes, report_walk};
use crate::common::fs::io;
use crate::core::config::Config;
use crate::core::context::build_token_map;
use crate::core::error::{DunderError, Result};
use crate::core::plan::{Action, ActionOutcome, Mode, Plan};
use crate::core::walk::{plan_walk, walk_and_rewrite, WalkContext, WalkReport};
use anyhow::{bail, Context};
use clap::Parser;
use std::{
    env,
    path::{Component, Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Arguments for `dunder template create`.
#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Template to use (a subdirectory of the templates directory).
    #[arg(long, short = 't')]
    template: String,

    /// Name of the new project; also the value of `__NAME__`.
    project_name: String,

    /// Parent directory for the new project. Defaults to the current directory.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Allow creating the project inside an existing directory, replacing
    /// files that the template also contains.
    #[arg(long, short = 'f')]
    force: bool,

    /// Extra tokens as KEY=VALUE (KEY is wrapped as __KEY__ when needed).
    #[arg(long = "var", value_parser = parse_key_val, action = clap::ArgAction::Append)]
    var: Vec<(String, String)>,

    /// Print the planned actions without copying or changing anything.
    #[arg(long)]
    dry_run: bool,
}

pub fn handle_create(args: CreateArgs, cfg: &Config) -> Result<()> {
    info!(
        "Creating project '{}' from template '{}'",
        args.project_name, args.template
    );
    let mode = Mode::from_dry_run(args.dry_run);

    let (source_path, target_path) = prepare_and_validate_paths(&args, cfg)
        .context("Failed to prepare or validate template paths")?;

    // The project name given on the command line always wins over `[project] name`.
    let mut meta = cfg.project.clone();
    meta.name = args.project_name.clone();
    let tokens = build_token_map(&meta, &cfg.dunders, &args.var)
        .context("Failed to build the token map")?;
    debug!("Token map prepared: {:?}", tokens);
    let rules = cfg.header_rules()?;
    let ctx = WalkContext {
        tokens: &tokens,
        rules: &rules,
        blacklists: &cfg.blacklist,
    };

    // Dry run: show the copy plus the rewrite as computed on the template itself.
    if mode == Mode::DryRun {
        let mut copy = Plan::new();
        copy.push(Action::Copy {
            from: source_path.clone(),
            to: target_path.clone(),
            overwrite: args.force,
        });
        let (plan, report) = plan_walk(&source_path, ctx)?;
        copy.extend(plan);
        let report = WalkReport {
            outcomes: copy.run(mode),
            ..report
        };
        return report_walk(&report, mode);
    }

    // The template is rewritten in a staging directory next to the target,
    // so the target only receives finished files and keeps anything else.
    let base_dir = target_path.parent().ok_or_else(|| {
        DunderError::FileSystem(format!(
            "Target '{}' has no parent directory",
            target_path.display()
        ))
    })?;
    let staging = tempfile::Builder::new()
        .prefix(".dunder-")
        .tempdir_in(base_dir)
        .with_context(|| {
            format!("Failed to create a staging directory in '{}'", base_dir.display())
        })?;
    debug!("Staging template in {}", staging.path().display());

    let mut stage = Plan::new();
    stage.push(Action::Copy {
        from: source_path.clone(),
        to: staging.path().to_path_buf(),
        overwrite: false,
    });
    // A failed copy leaves nothing worth rewriting.
    let staged = stage.run(Mode::Apply);
    if staged.iter().any(ActionOutcome::is_failure) {
        return report_outcomes(&staged, mode);
    }

    // Rewrite the staged copy, then report its actions under the target paths.
    let mut report = walk_and_rewrite(staging.path(), ctx, mode)?;
    let to_target = |path: &Path| rebase(path, staging.path(), &target_path);
    report.outcomes = report
        .outcomes
        .into_iter()
        .map(|o| ActionOutcome {
            action: o.action.map_paths(to_target),
            outcome: o.outcome,
        })
        .collect();
    for failure in &mut report.failures {
        failure.path = to_target(&failure.path);
    }
    if !report.is_ok() {
        warn!("Template rewrite failed; '{}' was not changed", target_path.display());
        return report_walk(&report, mode);
    }

    // Install the finished tree. `staging` is removed when it goes out of scope.
    let mut install = Plan::new();
    install.push(Action::Copy {
        from: staging.path().to_path_buf(),
        to: target_path.clone(),
        overwrite: args.force,
    });
    report.outcomes.extend(install.run(Mode::Apply).into_iter().map(|o| ActionOutcome {
        // Report the template, not the staging directory, as the source.
        action: o.action.map_paths(|path| rebase(path, staging.path(), &source_path)),
        outcome: o.outcome,
    }));
    report_walk(&report, mode)?;
    print_completion_message(&target_path, &args.project_name);
    Ok(())
}

/// `path` moved from under `from_root` to under `to_root`. Paths outside
/// `from_root` are returned unchanged.
fn rebase(path: &Path, from_root: &Path, to_root: &Path) -> PathBuf {
    match path.strip_prefix(from_root) {
        Ok(rel) if rel.as_os_str().is_empty() => to_root.to_path_buf(),
        Ok(rel) => to_root.join(rel),
        Err(_) => path.to_path_buf(),
    }
}

/// Resolves the template source and `<output>/<name>`, checking for
/// collisions and creating the output directory when needed.
fn prepare_and_validate_paths(args: &CreateArgs, cfg: &Config) -> Result<(PathBuf, PathBuf)> {
    let templates_dir = cfg.templates_dir();
    let source_path = templates_dir.join(&args.template);
    debug!("Resolved template source path: {}", source_path.display());

    if !source_path.is_dir() {
        warn!(
            "Template '{}' not found in '{}'",
            args.template,
            templates_dir.display()
        );
        return Err(DunderError::TemplateNotFound {
            name: args.template.clone(),
        })
        .context("Run 'dunder template list' to see available templates");
    }

    let project_name = Path::new(&args.project_name);
    let mut components = project_name.components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if args.project_name.trim().is_empty() || !single_normal {
        bail!(DunderError::ArgumentParsing(format!(
            "Project name '{}' must be a single path component.",
            args.project_name
        )));
    }

    let base_dir = match &args.output {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => env::current_dir()
            .context("Failed to get current directory")?
            .join(dir),
        None => env::current_dir().context("Failed to get current directory")?,
    };
    let target_path = base_dir.join(project_name);
    debug!("Resolved target project path: {}", target_path.display());

    if target_path.exists() {
        if !target_path.is_dir() {
            bail!(
                "Target path '{}' exists but is a file, cannot create project directory.",
                target_path.display()
            );
        }
        if args.force {
            warn!(
                "Target directory '{}' already exists. Proceeding due to --force flag. Existing files may be overwritten.",
                target_path.display()
            );
        } else {
            bail!(
                "Target directory '{}' already exists. Use --force to overwrite or choose a different project name/output directory.",
                target_path.display()
            );
        }
    } else if !args.dry_run {
        io::ensure_dir_exists(&base_dir)?;
    }
    Ok((source_path, target_path))
}

fn print_completion_message(target_path: &Path, project_name: &str) {
    println!("\nProject '{}' created successfully!", project_name);
    println!("   Location: {}", target_path.display());
    println!("\nNext steps:");

    let display_path = env::current_dir()
        .ok()
        .and_then(|cwd| pathdiff::diff_paths(target_path, cwd))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| target_path.display().to_string());
    println!("  1. Navigate to your project: cd {}", display_path);

    let mut step = 2;
    if target_path.join("README.md").exists() {
        println!("  {}. Review project instructions: cat README.md", step);
        step += 1;
    }
    if target_path.join("pyproject.toml").exists() || target_path.join("setup.cfg").exists() {
        println!(
            "  {}. Install it in a virtual environment:",
            step
        );
        println!("     python -m venv .venv && source .venv/bin/activate");
        println!("     pip install -e .");
        step += 1;
    }
    if !target_path.join(".dunder.toml").exists() {
        println!(
            "  {}. Record the project metadata in .dunder.toml to use 'dunder meta'",
            step
        );
    }
}
