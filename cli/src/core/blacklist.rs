//! # Dunder Blacklists
//!
//! File: cli/src/core/blacklist.rs
//!
//! ## Overview
//!
//! Blacklists decide what the rewriter may touch. Each category is a list of
//! path fragments; a fragment matches an entry when it equals the entry's
//! base name or its path relative to the walk root (with `/` separators).
//!
//! | Category      | Effect                                                   | Scope                  |
//! |---------------|----------------------------------------------------------|------------------------|
//! | `skip_all`    | Not descended into, not read, not renamed                | entry and its subtree  |
//! | `skip_header` | Plain substitution only, no header rewriting             | entry and its subtree  |
//! | `skip_text`   | Header rewriting only, no plain substitution             | entry and its subtree  |
//! | `skip_path`   | Contents are processed but the name is never rewritten   | the entry itself       |
//!
//! ```toml
//! [blacklist]
//! skip_all = [".git", ".venv"]
//! skip_text = ["LICENSE.txt"]
//! skip_path = ["src/__NAME__/templates"]
//! ```
//!
use serde::Deserialize;
use std::path::{Component, Path};

/// Directory names that are never worth rewriting.
pub fn default_skip_all() -> Vec<String> {
    [".git", ".venv", "__pycache__", ".mypy_cache", ".pytest_cache"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Per-category path fragments controlling the walk.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Blacklists {
    #[serde(default = "default_skip_all")]
    pub skip_all: Vec<String>,
    #[serde(default)]
    pub skip_header: Vec<String>,
    #[serde(default)]
    pub skip_text: Vec<String>,
    #[serde(default)]
    pub skip_path: Vec<String>,
}

impl Default for Blacklists {
    fn default() -> Self {
        Self {
            skip_all: default_skip_all(),
            skip_header: Vec::new(),
            skip_text: Vec::new(),
            skip_path: Vec::new(),
        }
    }
}

impl Blacklists {
    /// Blacklists with every category empty.
    #[cfg(test)]
    pub fn none() -> Self {
        Self {
            skip_all: Vec::new(),
            ..Self::default()
        }
    }

    /// Whether the entry at `rel` (relative to the walk root) must be pruned.
    pub fn prunes(&self, rel: &Path) -> bool {
        matches_entry(&self.skip_all, rel)
    }

    /// Whether header rewriting is disabled for `rel` or one of its ancestors.
    pub fn skips_header(&self, rel: &Path) -> bool {
        matches_self_or_ancestor(&self.skip_header, rel)
    }

    /// Whether plain substitution is disabled for `rel` or one of its ancestors.
    pub fn skips_text(&self, rel: &Path) -> bool {
        matches_self_or_ancestor(&self.skip_text, rel)
    }

    /// Whether the name of `rel` itself must be kept.
    pub fn keeps_name(&self, rel: &Path) -> bool {
        matches_entry(&self.skip_path, rel)
    }
}

/// `rel` rendered with `/` separators regardless of platform.
fn slash_path(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn matches_entry(fragments: &[String], rel: &Path) -> bool {
    if fragments.is_empty() {
        return false;
    }
    let name = rel
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let full = slash_path(rel);
    fragments.iter().any(|fragment| {
        let fragment = fragment.trim_end_matches('/');
        fragment == name || fragment == full
    })
}

fn matches_self_or_ancestor(fragments: &[String], rel: &Path) -> bool {
    !fragments.is_empty()
        && rel
            .ancestors()
            .filter(|a| !a.as_os_str().is_empty())
            .any(|a| matches_entry(fragments, a))
}
