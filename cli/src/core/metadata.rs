//! # Dunder Project Metadata
//!
//! File: cli/src/core/metadata.rs
//!
//! ## Overview
//!
//! A Python project repeats its version, description and keywords in several
//! files. The `[project]` table of `.dunder.toml` is the single source of
//! truth; this module pushes it into the other files and bumps versions.
//!
//! ## Architecture
//!
//! Files are edited line by line rather than parsed and re-serialised, so
//! comments, ordering, indentation and quoting survive untouched:
//!
//! - `rewrite_fields` tracks the current `[section]` (TOML and INI files) and
//!   replaces the value of each `key = value` line named by a `FieldEdit`.
//! - `upsert_toml_field` does the same for the tool's own config file and
//!   inserts the key when it is missing.
//! - `sync_metadata` decides which files exist and returns a `Plan` with one
//!   `Write` per file that actually changes.
//!
//! | File                                        | Section      | Fields                          |
//! |---------------------------------------------|--------------|---------------------------------|
//! | `pyproject.toml`                            | `project`    | version, description, keywords  |
//! | `pyproject.toml`                            | `tool.poetry`| version, description, keywords  |
//! | `setup.cfg`                                 | `metadata`   | version, description, keywords  |
//! | `<pkg>/__init__.py`, `src/<pkg>/__init__.py`| -            | `__version__`                   |
//!
use crate::core::context::to_snake_case;
use crate::core::error::{DunderError, Result};
use crate::core::plan::{Action, Plan};
use anyhow::Context;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Matches `[section]` and `[[array.section]]` headers.
static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*\[+[ \t]*([^\[\]]+?)[ \t]*\]+[ \t]*(?:#.*)?$")
        .expect("Failed to compile section header pattern")
});

/// Project metadata, the `[project]` table of the configuration.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub license: String,
}

impl Default for ProjectMeta {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: default_version(),
            description: String::new(),
            keywords: Vec::new(),
            author: String::new(),
            email: String::new(),
            license: String::new(),
        }
    }
}

pub fn default_version() -> String {
    "0.1.0".to_string()
}

/// Which component of a version to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpPart {
    Major,
    Minor,
    Patch,
}

/// Parses `MAJOR.MINOR.PATCH`, accepting a `v` prefix and ignoring any
/// pre-release or build suffix.
pub fn parse_version(version: &str) -> Result<(u64, u64, u64)> {
    let invalid = || DunderError::InvalidVersion(version.to_string());
    let core = version.trim().trim_start_matches('v');
    let core = core.split(['-', '+']).next().unwrap_or_default();
    let numbers = core
        .split('.')
        .map(|n| n.parse::<u64>().map_err(|_| invalid()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let &[major, minor, patch] = numbers.as_slice() else {
        return Err(invalid().into());
    };
    Ok((major, minor, patch))
}

/// Increments one component of `version`. Lower components reset to zero
/// and any suffix is dropped.
pub fn bump_version(version: &str, part: BumpPart) -> Result<String> {
    let (major, minor, patch) = parse_version(version)?;
    let overflow = || DunderError::InvalidVersion(version.to_string());
    let bumped = match part {
        BumpPart::Major => (major.checked_add(1).ok_or_else(overflow)?, 0, 0),
        BumpPart::Minor => (major, minor.checked_add(1).ok_or_else(overflow)?, 0),
        BumpPart::Patch => (major, minor, patch.checked_add(1).ok_or_else(overflow)?),
    };
    Ok(format!("{}.{}.{}", bumped.0, bumped.1, bumped.2))
}

/// Syntax family of an edited file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Ini,
    Python,
}

impl Format {
    fn separator(self) -> &'static str {
        match self {
            Format::Ini => "[=:]",
            Format::Toml | Format::Python => "=",
        }
    }

    fn has_sections(self) -> bool {
        !matches!(self, Format::Python)
    }
}

/// A new value together with how it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A quoted string; the existing quote style is kept when possible.
    Quoted(String),
    /// An unquoted INI value.
    Plain(String),
    /// A single-line TOML array of strings.
    Array(Vec<String>),
    /// An INI comma-separated list.
    CommaList(Vec<String>),
}

impl FieldValue {
    fn pattern(&self) -> &'static str {
        match self {
            FieldValue::Quoted(_) => r#"(?P<value>"(?:[^"\\]|\\.)*"|'[^']*')(?P<trail>.*)$"#,
            FieldValue::Array(_) => r"(?P<value>\[.*\])(?P<trail>[ \t]*(?:#.*)?)$",
            FieldValue::Plain(_) | FieldValue::CommaList(_) => r"(?P<value>.*?)(?P<trail>[ \t]*)$",
        }
    }

    fn render(&self, old: &str) -> String {
        match self {
            FieldValue::Quoted(s) => quote_like(s, old),
            FieldValue::Plain(s) => s.clone(),
            FieldValue::Array(items) => format!(
                "[{}]",
                items
                    .iter()
                    .map(|i| quote_like(i, "\""))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            FieldValue::CommaList(items) => items.join(", "),
        }
    }
}

/// Quotes `value` with the quote character `old` starts with, falling back
/// to an escaped double-quoted string.
fn quote_like(value: &str, old: &str) -> String {
    if old.starts_with('\'') && !value.contains('\'') && !value.contains('\n') {
        format!("'{}'", value)
    } else {
        format!(
            "\"{}\"",
            value
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\n', "\\n")
        )
    }
}

/// Replace the value of `key` inside `section` (`None` = top level).
#[derive(Debug, Clone)]
pub struct FieldEdit {
    pub section: Option<String>,
    pub key: String,
    pub value: FieldValue,
}

impl FieldEdit {
    pub fn new(section: Option<&str>, key: &str, value: FieldValue) -> Self {
        Self {
            section: section.map(str::to_string),
            key: key.to_string(),
            value,
        }
    }

    fn regex(&self, format: Format) -> Result<Regex> {
        let pattern = format!(
            r"^(?P<lead>[ \t]*{}[ \t]*{}[ \t]*){}",
            regex::escape(&self.key),
            format.separator(),
            self.value.pattern()
        );
        Ok(Regex::new(&pattern).map_err(DunderError::from)?)
    }
}

fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

fn section_of(body: &str) -> Option<String> {
    SECTION_HEADER
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Applies `edits` to `content`. Lines that match no edit, including every
/// line terminator, are copied through unchanged.
pub fn rewrite_fields(content: &str, format: Format, edits: &[FieldEdit]) -> Result<String> {
    let compiled = edits
        .iter()
        .map(|edit| Ok((edit, edit.regex(format)?)))
        .collect::<Result<Vec<_>>>()?;

    let mut section: Option<String> = None;
    let mut out = String::with_capacity(content.len());
    for line in content.split_inclusive('\n') {
        let (body, terminator) = split_terminator(line);
        if format.has_sections() {
            if let Some(name) = section_of(body) {
                section = Some(name);
                out.push_str(line);
                continue;
            }
        }

        let mut replaced = None;
        for (edit, regex) in &compiled {
            if edit.section != section {
                continue;
            }
            if let Some(caps) = regex.captures(body) {
                let lead = caps.name("lead").map_or("", |m| m.as_str());
                let old = caps.name("value").map_or("", |m| m.as_str());
                let trail = caps.name("trail").map_or("", |m| m.as_str());
                replaced = Some(format!("{}{}{}", lead, edit.value.render(old), trail));
                break;
            }
        }
        match replaced {
            Some(new_body) => {
                out.push_str(&new_body);
                out.push_str(terminator);
            }
            None => out.push_str(line),
        }
    }
    Ok(out)
}

/// Sets `key` in the TOML `section`, inserting it after the section header
/// (or appending the section) when absent.
pub fn upsert_toml_field(content: &str, section: &str, key: &str, value: FieldValue) -> Result<String> {
    let edit = FieldEdit::new(Some(section), key, value.clone());
    let regex = edit.regex(Format::Toml)?;

    let mut current: Option<String> = None;
    let mut header_end: Option<usize> = None;
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let (body, _) = split_terminator(line);
        if let Some(name) = section_of(body) {
            current = Some(name);
            if current.as_deref() == Some(section) && header_end.is_none() {
                header_end = Some(offset + line.len());
            }
        } else if current.as_deref() == Some(section) && regex.is_match(body) {
            return rewrite_fields(content, Format::Toml, &[edit]);
        }
        offset += line.len();
    }

    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let entry = format!("{} = {}{}", key, value.render("\""), newline);
    let mut out = String::with_capacity(content.len() + entry.len() + section.len() + 4);
    match header_end {
        Some(at) => {
            out.push_str(&content[..at]);
            if !content[..at].ends_with('\n') {
                out.push_str(newline);
            }
            out.push_str(&entry);
            out.push_str(&content[at..]);
        }
        None => {
            out.push_str(content);
            if !content.is_empty() && !content.ends_with('\n') {
                out.push_str(newline);
            }
            if !content.is_empty() {
                out.push_str(newline);
            }
            out.push_str(&format!("[{}]{}", section, newline));
            out.push_str(&entry);
        }
    }
    Ok(out)
}

/// Plans the update of `[project]` fields in the configuration file at
/// `config_path`. Returns `None` when the file already holds these values.
pub fn set_config_fields(config_path: &Path, fields: &[(&str, FieldValue)]) -> Result<Option<Action>> {
    let original = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read configuration file {:?}", config_path))?;
    let mut updated = original.clone();
    for (field, value) in fields {
        updated = upsert_toml_field(&updated, "project", field, value.clone())?;
    }
    if updated == original {
        debug!("Configuration file already up to date: {}", config_path.display());
        return Ok(None);
    }
    Ok(Some(Action::Write {
        path: config_path.to_path_buf(),
        contents: updated,
    }))
}

fn toml_edits(section: &str, meta: &ProjectMeta) -> Vec<FieldEdit> {
    let mut edits = Vec::new();
    if !meta.version.is_empty() {
        edits.push(FieldEdit::new(Some(section), "version", FieldValue::Quoted(meta.version.clone())));
    }
    if !meta.description.is_empty() {
        edits.push(FieldEdit::new(
            Some(section),
            "description",
            FieldValue::Quoted(meta.description.clone()),
        ));
    }
    if !meta.keywords.is_empty() {
        edits.push(FieldEdit::new(Some(section), "keywords", FieldValue::Array(meta.keywords.clone())));
    }
    edits
}

fn cfg_edits(meta: &ProjectMeta) -> Vec<FieldEdit> {
    let mut edits = Vec::new();
    if !meta.version.is_empty() {
        edits.push(FieldEdit::new(Some("metadata"), "version", FieldValue::Plain(meta.version.clone())));
    }
    if !meta.description.is_empty() {
        edits.push(FieldEdit::new(
            Some("metadata"),
            "description",
            FieldValue::Plain(meta.description.clone()),
        ));
    }
    if !meta.keywords.is_empty() {
        edits.push(FieldEdit::new(
            Some("metadata"),
            "keywords",
            FieldValue::CommaList(meta.keywords.clone()),
        ));
    }
    edits
}

/// Plans the writes needed to bring the project's files in line with `meta`.
pub fn sync_metadata(root: &Path, meta: &ProjectMeta) -> Result<Plan> {
    info!("Synchronizing project metadata under '{}'", root.display());
    let mut targets: Vec<(std::path::PathBuf, Format, Vec<FieldEdit>)> = Vec::new();

    let mut pyproject = toml_edits("project", meta);
    pyproject.extend(toml_edits("tool.poetry", meta));
    targets.push((root.join("pyproject.toml"), Format::Toml, pyproject));
    targets.push((root.join("setup.cfg"), Format::Ini, cfg_edits(meta)));

    if !meta.version.is_empty() && !meta.name.is_empty() {
        let package = to_snake_case(&meta.name);
        for init in [
            root.join(&package).join("__init__.py"),
            root.join("src").join(&package).join("__init__.py"),
        ] {
            targets.push((
                init,
                Format::Python,
                vec![FieldEdit::new(None, "__version__", FieldValue::Quoted(meta.version.clone()))],
            ));
        }
    }

    let mut plan = Plan::new();
    for (path, format, edits) in targets {
        if !path.is_file() {
            debug!("Metadata target not present: {}", path.display());
            continue;
        }
        if edits.is_empty() {
            continue;
        }
        let original = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read metadata file {:?}", path))?;
        let updated = rewrite_fields(&original, format, &edits)
            .with_context(|| format!("Failed to update metadata in {:?}", path))?;
        if updated == original {
            debug!("Metadata already up to date: {}", path.display());
            continue;
        }
        plan.push(Action::Write {
            path,
            contents: updated,
        });
    }
    if plan.is_empty() {
        warn!("No metadata changes needed under '{}'", root.display());
    }
    Ok(plan)
}
