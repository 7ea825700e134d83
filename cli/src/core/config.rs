//! # Dunder Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges and validates the Dunder configuration. A
//! configuration describes the project (its metadata), extra tokens, the header
//! fields to realign, the blacklists that steer the walk and where templates
//! live.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. An explicit file given with `--config` or `DUNDER_CONFIG` (used alone)
//! 2. Project-specific `.dunder.toml` in the current directory or ancestors
//!    (the search stops at a directory containing `.git`)
//! 3. User-specific `config.toml` in the platform config directory
//! 4. Default values defined in the code
//!
//! The merged `Config` remembers the file it came from so that `meta bump`
//! and `meta set` can write changes back to it.
//!
//! ## Examples
//!
//! ```toml
//! [project]
//! name = "my-tool"
//! version = "0.3.1"
//! keywords = ["cli"]
//!
//! [dunders]
//! __ORG__ = "Acme"
//!
//! [[headers]]
//! label = "Project :"
//! key = "__NAME__"
//! decoration = "/          \\"
//!
//! [blacklist]
//! skip_text = ["LICENSE.txt"]
//!
//! [templates]
//! directory = "~/src/dunder-templates"
//! ```
//!
//! ```rust
//! let cfg = config::load_config(cli.config.as_deref())?;
//! let rules = cfg.header_rules()?;
//! ```
//!
use crate::core::blacklist::Blacklists;
use crate::core::error::{DunderError, Result};
use crate::core::header::{default_descriptors, HeaderDescriptor, HeaderRules};
use crate::core::metadata::{default_version, ProjectMeta};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)] // Error if unknown fields are in TOML
pub struct Config {
    #[serde(default)]
    pub project: ProjectMeta,
    /// Extra tokens, applied after the ones derived from `[project]`.
    #[serde(default)]
    pub dunders: BTreeMap<String, String>,
    /// Header fields to realign. The built-in set is used when absent.
    #[serde(default = "default_descriptors")]
    pub headers: Vec<HeaderDescriptor>,
    #[serde(default)]
    pub blacklist: Blacklists,
    #[serde(default)]
    pub templates: TemplatesConfig,
    /// File this configuration was loaded from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectMeta::default(),
            dunders: BTreeMap::new(),
            headers: default_descriptors(),
            blacklist: Blacklists::default(),
            templates: TemplatesConfig::default(),
            source: None,
        }
    }
}

impl Config {
    /// Compiles the configured header descriptors.
    pub fn header_rules(&self) -> Result<HeaderRules> {
        HeaderRules::new(&self.headers).context("Invalid [[headers]] configuration")
    }

    pub fn templates_dir(&self) -> PathBuf {
        PathBuf::from(&self.templates.directory)
    }
}

/// Configuration related to project templates (`dunder template ...`).
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Directory where templates are stored (can use ~). Will be expanded.
    #[serde(default = "default_templates_dir")]
    pub directory: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            directory: default_templates_dir(),
        }
    }
}

fn default_templates_dir() -> String {
    "~/.config/dunder/templates".to_string()
}

const PROJECT_CONFIG_FILENAME: &str = ".dunder.toml";

/// Loads the effective configuration.
///
/// With `explicit` set, only that file is read and it must exist. Otherwise
/// the user and project files are merged over the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => {
            // An explicitly named file replaces the lookup entirely, so it must exist.
            if !path.is_file() {
                return Err(anyhow!(DunderError::Config(format!(
                    "Configuration file '{}' does not exist.",
                    path.display()
                ))));
            }
            info!("Loading configuration from: {}", path.display());
            load_config_from_path(path)?
        }
        None => {
            // 1. User-level defaults (optional).
            let user_config = load_user_config()?;
            // 2. Project file in the current directory or an ancestor (optional).
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            let project_config = load_project_config(&cwd)?;
            // 3. Project values win over user values.
            merge_configs(user_config.unwrap_or_default(), project_config)
        }
    };
    // Expand `~` and validate only once, on the merged result.
    expand_config_paths(&mut config).context("Failed to expand paths in configuration")?;
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", config);
    Ok(config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "Dunder", "dunder") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config(start: &Path) -> Result<Option<Config>> {
    if let Some(project_config_path) = find_project_config_path(start) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.dunder.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

/// Searches `start` and its ancestors for `.dunder.toml`, stopping at the
/// first directory that contains `.git`.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let project_config = dir.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if dir.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                dir.display()
            );
            return None;
        }
    }
    None
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))?;
    config.source = Some(path.to_path_buf());

    // Relative template directories are relative to the file declaring them.
    let declared = Path::new(&config.templates.directory);
    if !config.templates.directory.starts_with('~') && declared.is_relative() {
        if let Some(parent) = path.parent() {
            config.templates.directory = parent.join(declared).to_string_lossy().into_owned();
        }
    }
    Ok(config)
}

fn pick(project: String, user: String) -> String {
    if project.is_empty() {
        user
    } else {
        project
    }
}

fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };
    let mut merged = Config::default();

    merged.project = ProjectMeta {
        name: pick(project_cfg.project.name, user.project.name),
        version: if project_cfg.project.version != default_version() {
            project_cfg.project.version
        } else {
            user.project.version
        },
        description: pick(project_cfg.project.description, user.project.description),
        keywords: if !project_cfg.project.keywords.is_empty() {
            project_cfg.project.keywords
        } else {
            user.project.keywords
        },
        author: pick(project_cfg.project.author, user.project.author),
        email: pick(project_cfg.project.email, user.project.email),
        license: pick(project_cfg.project.license, user.project.license),
    };

    merged.dunders = user.dunders;
    merged.dunders.extend(project_cfg.dunders);

    merged.headers = if project_cfg.headers != default_descriptors() {
        project_cfg.headers
    } else {
        user.headers
    };
    merged.blacklist = if project_cfg.blacklist != Blacklists::default() {
        project_cfg.blacklist
    } else {
        user.blacklist
    };
    merged.templates.directory = if project_cfg.templates.directory != default_templates_dir() {
        project_cfg.templates.directory
    } else {
        user.templates.directory
    };
    // Writes go to the most specific file.
    merged.source = project_cfg.source.or(user.source);
    merged
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    debug!("Expanding paths in configuration...");
    config.templates.directory = shellexpand::tilde(&config.templates.directory).into_owned();
    debug!("Expanded templates directory: {}", config.templates.directory);
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    info!("Validating final configuration...");
    let templates_dir = config.templates_dir();
    if !templates_dir.exists() {
        debug!(
            "Configured templates directory '{}' does not exist.",
            templates_dir.display()
        );
    } else if !templates_dir.is_dir() {
        return Err(anyhow!(DunderError::Config(format!(
            "Configured templates path '{}' exists but is not a directory.",
            templates_dir.display()
        ))));
    }
    for key in config.dunders.keys() {
        if key.trim().is_empty() {
            return Err(anyhow!(DunderError::Config(
                "The [dunders] table cannot contain an empty key.".to_string()
            )));
        }
    }
    config.header_rules()?;
    info!("Configuration validation successful.");
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_deserialize_full_toml() {
        let toml_content = r#"
            [project]
            name = "my-tool"
            version = "1.4.2"
            keywords = ["cli", "python"]

            [dunders]
            __ORG__ = "Acme"

            [[headers]]
            label = "Project :"
            key = "__NAME__"
            decoration = "/  \\"

            [blacklist]
            skip_text = ["LICENSE.txt"]

            [templates]
            directory = "/etc/dunder/templates"
        "#;

        let config: Config = toml::from_str(toml_content).expect("Failed to parse TOML");

        assert_eq!(config.project.name, "my-tool");
        assert_eq!(config.project.version, "1.4.2");
        assert_eq!(config.project.keywords, vec!["cli", "python"]);
        assert_eq!(config.dunders.get("__ORG__").map(String::as_str), Some("Acme"));
        assert_eq!(config.headers.len(), 1);
        assert_eq!(config.headers[0].decoration, "/  \\");
        assert_eq!(config.blacklist.skip_text, vec!["LICENSE.txt"]);
        assert_eq!(config.blacklist.skip_all, crate::core::blacklist::default_skip_all());
        assert_eq!(config.templates.directory, "/etc/dunder/templates");
        assert!(config.source.is_none());
    }

    #[test]
    fn test_defaults_when_tables_missing() {
        let config: Config = toml::from_str("").expect("Failed to parse TOML");
        assert_eq!(config, Config::default());
        assert_eq!(config.project.version, default_version());
        assert_eq!(config.headers, default_descriptors());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(toml::from_str::<Config>("[projects]\nname = \"x\"").is_err());
        assert!(toml::from_str::<Config>("[project]\nnmae = \"x\"").is_err());
    }

    #[test]
    fn test_path_expansion() {
        let mut config = Config {
            templates: TemplatesConfig {
                directory: "~/tpl_test".to_string(),
            },
            ..Default::default()
        };
        expand_config_paths(&mut config).unwrap();
        let home_dir = dirs::home_dir().unwrap();
        assert_eq!(
            config.templates.directory,
            home_dir.join("tpl_test").to_string_lossy()
        );
    }

    #[test]
    fn test_relative_templates_dir_resolved_against_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(".dunder.toml");
        fs::write(&path, "[templates]\ndirectory = \"tpl\"\n")?;
        let config = load_config_from_path(&path)?;
        assert_eq!(config.templates_dir(), dir.path().join("tpl"));
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
        Ok(())
    }

    #[test]
    fn test_find_project_config_stops_at_git() -> Result<()> {
        let dir = tempdir()?;
        let outer = dir.path();
        fs::write(outer.join(PROJECT_CONFIG_FILENAME), "")?;
        let repo = outer.join("repo");
        fs::create_dir_all(repo.join(".git"))?;
        fs::create_dir_all(repo.join("src/pkg"))?;

        assert_eq!(find_project_config_path(&repo.join("src/pkg")), None);

        fs::write(repo.join(PROJECT_CONFIG_FILENAME), "")?;
        assert_eq!(
            find_project_config_path(&repo.join("src/pkg")),
            Some(repo.join(PROJECT_CONFIG_FILENAME))
        );
        Ok(())
    }

    #[test]
    fn test_merge_project_overrides_user() {
        let mut user = Config::default();
        user.project.author = "Ada".into();
        user.project.name = "user-name".into();
        user.dunders.insert("__ORG__".into(), "User Org".into());
        user.dunders.insert("__TEAM__".into(), "core".into());
        user.source = Some(PathBuf::from("/home/u/config.toml"));

        let mut project = Config::default();
        project.project.name = "proj".into();
        project.project.version = "2.0.0".into();
        project.dunders.insert("__ORG__".into(), "Proj Org".into());
        project.source = Some(PathBuf::from("/w/.dunder.toml"));

        let merged = merge_configs(user, Some(project));
        assert_eq!(merged.project.name, "proj");
        assert_eq!(merged.project.version, "2.0.0");
        assert_eq!(merged.project.author, "Ada");
        assert_eq!(merged.dunders["__ORG__"], "Proj Org");
        assert_eq!(merged.dunders["__TEAM__"], "core");
        assert_eq!(merged.source, Some(PathBuf::from("/w/.dunder.toml")));
    }

    #[test]
    fn test_load_explicit_config() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[project]\nname = \"explicit\"\n")?;
        let config = load_config(Some(&path))?;
        assert_eq!(config.project.name, "explicit");
        assert_eq!(config.source.as_deref(), Some(path.as_path()));

        let missing = load_config(Some(&dir.path().join("nope.toml")));
        assert!(missing.is_err());
        Ok(())
    }

    #[test]
    fn test_validate_config_rejects_bad_settings() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("not_a_dir");
        fs::write(&file, "")?;

        let config = Config {
            templates: TemplatesConfig {
                directory: file.to_string_lossy().into_owned(),
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.dunders.insert(" ".into(), "x".into());
        assert!(validate_config(&config).is_err());

        let config = Config {
            headers: vec![
                HeaderDescriptor::new("Name", "__NAME__", "|  |"),
                HeaderDescriptor::new("Name :", "__X__", "|  |"),
            ],
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());

        assert!(validate_config(&Config::default()).is_ok());
        Ok(())
    }
}
