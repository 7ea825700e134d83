//! # Dunder Meta Set Command
//!
//! File: cli/src/commands/meta/set.rs
//!
//! Changes `version`, `description` and/or `keywords` in the configuration
//! file and synchronizes them into the project. `--keyword` replaces the
//! whole keyword list and may be repeated.
//!
use super::update_and_sync;
use crate::core::config::Config;
use crate::core::error::{DunderError, Result};
use crate::core::metadata::{parse_version, FieldValue};
use crate::core::plan::Mode;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(disable_version_flag = true)]
pub struct SetArgs {
    /// New version (MAJOR.MINOR.PATCH).
    #[arg(long)]
    version: Option<String>,

    /// New one-line description.
    #[arg(long)]
    description: Option<String>,

    /// Keyword; repeat to set several. Replaces the existing list.
    #[arg(long = "keyword", action = clap::ArgAction::Append)]
    keywords: Vec<String>,

    /// Project root to synchronize.
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// Print the planned writes without changing anything.
    #[arg(long)]
    dry_run: bool,
}

pub fn handle_set(args: SetArgs, cfg: &Config) -> Result<()> {
    let mode = Mode::from_dry_run(args.dry_run);
    let mut meta = cfg.project.clone();
    let mut fields = Vec::new();

    if let Some(version) = &args.version {
        parse_version(version)?;
        meta.version = version.clone();
        fields.push(("version", FieldValue::Quoted(version.clone())));
    }
    if let Some(description) = &args.description {
        meta.description = description.clone();
        fields.push(("description", FieldValue::Quoted(description.clone())));
    }
    if !args.keywords.is_empty() {
        meta.keywords = args.keywords.clone();
        fields.push(("keywords", FieldValue::Array(args.keywords.clone())));
    }
    if fields.is_empty() {
        return Err(DunderError::ArgumentParsing(
            "Nothing to set. Pass --version, --description or --keyword.".to_string(),
        )
        .into());
    }

    update_and_sync(cfg, &fields, &meta, &args.path, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_set_requires_a_field() {
        let args = SetArgs::try_parse_from(["set"]).unwrap();
        assert!(handle_set(args, &Config::default()).is_err());
    }

    #[test]
    fn test_set_validates_version() {
        let args = SetArgs::try_parse_from(["set", "--version", "1.2"]).unwrap();
        let err = handle_set(args, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("Invalid version '1.2'"));
    }

    #[test]
    fn test_set_updates_config_and_setup_cfg() -> Result<()> {
        let dir = tempdir()?;
        let config_path = dir.path().join(".dunder.toml");
        fs::write(&config_path, "[project]\nname = \"pkg\"\n")?;
        fs::write(dir.path().join("setup.cfg"), "[metadata]\nkeywords = old\n")?;
        let cfg = Config {
            source: Some(config_path.clone()),
            ..Default::default()
        };

        let args = SetArgs::try_parse_from([
            "set",
            "--keyword",
            "cli",
            "--keyword",
            "tokens",
            "--path",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        handle_set(args, &cfg)?;

        assert_eq!(
            fs::read_to_string(&config_path)?,
            "[project]\nkeywords = [\"cli\", \"tokens\"]\nname = \"pkg\"\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("setup.cfg"))?,
            "[metadata]\nkeywords = cli, tokens\n"
        );
        Ok(())
    }
}
