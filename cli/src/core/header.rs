//! # Dunder Header Rewriter
//!
//! File: cli/src/core/header.rs
//!
//! ## Overview
//!
//! Generated source files start with a small metadata banner. Each banner line
//! carries a label, a value (initially a dunder), some padding, and a piece of
//! ASCII art pinned to the right margin:
//!
//! ```text
//! # Project : __NAME__                                        /          \
//! # Version : __VERSION__                                     |     ()     |
//! ```
//!
//! Replacing `__NAME__` with a value of a different length would shift the art
//! out of its column, so header lines are rewritten here: the value is
//! substituted and the padding is grown or shrunk by the length difference.
//!
//! ## Architecture
//!
//! - `HeaderDescriptor`: one recognised field (`label`, `key`, `decoration`),
//!   deserialised from the `[[headers]]` configuration table.
//! - `HeaderRules`: the validated, compiled descriptor set. Construction
//!   rejects labels that could both match the same line, so at runtime a line
//!   matches at most one descriptor and order never matters.
//! - `HeaderRules::rewrite_line`: the per-line transformation. It returns
//!   `None` for lines that are not (well-formed) header lines so that the
//!   caller can fall back to plain token substitution.
//!
//! ## Padding rule
//!
//! With `delta = len(new_value) - len(old_value)`:
//! - `delta > 0`: drop `delta` characters from the start of the padding, but
//!   always keep at least one. When the padding is too short the decoration
//!   moves right instead of the rewrite failing.
//! - `delta < 0`: prepend `|delta|` spaces.
//!
use crate::core::error::{DunderError, Result};
use crate::core::tokens::TokenMap;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

/// Optional indentation and comment opener accepted in front of a label.
const COMMENT_LEAD: &str = r"[ \t]*(?:#+|<!--)?[ \t]*";

/// One recognised header field.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HeaderDescriptor {
    /// Literal text before the value, e.g. `"Project :"`. Whitespace runs match any amount of blanks.
    pub label: String,
    /// Placeholder expected in the value, e.g. `"__NAME__"`.
    pub key: String,
    /// Literal art that must stay column-aligned, e.g. `"/          \\"`.
    pub decoration: String,
}

impl HeaderDescriptor {
    pub fn new(label: &str, key: &str, decoration: &str) -> Self {
        Self {
            label: label.to_string(),
            key: key.to_string(),
            decoration: decoration.to_string(),
        }
    }

    /// Label with all whitespace and any leading comment opener removed,
    /// used for overlap detection. Every pattern already accepts an optional
    /// opener, so `"# Name :"` and `"Name :"` match the same lines.
    fn normalized_label(&self) -> String {
        let compact: String = self.label.split_whitespace().collect();
        let without_hashes = compact.trim_start_matches('#');
        without_hashes
            .strip_prefix("<!--")
            .unwrap_or(without_hashes)
            .to_string()
    }

    fn label_pattern(&self) -> String {
        self.label
            .split_whitespace()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"[ \t]*")
    }
}

/// The descriptor set used when the configuration defines no `[[headers]]`.
pub fn default_descriptors() -> Vec<HeaderDescriptor> {
    vec![
        HeaderDescriptor::new("Project :", "__NAME__", "/          \\"),
        HeaderDescriptor::new("Version :", "__VERSION__", "|     ()     |"),
        HeaderDescriptor::new("Date    :", "__DATE__", "|            |"),
        HeaderDescriptor::new("Author  :", "__AUTHOR__", "|     ||     |"),
        HeaderDescriptor::new("License :", "__LICENSE__", "\\          /"),
    ]
}

#[derive(Debug, Clone)]
struct CompiledHeader {
    descriptor: HeaderDescriptor,
    /// Matches just the label; used to tell malformed headers from ordinary lines.
    label_only: Regex,
    /// Matches a complete header line and captures its parts.
    full: Regex,
}

/// A validated, compiled set of mutually exclusive header descriptors.
#[derive(Debug, Clone, Default)]
pub struct HeaderRules {
    headers: Vec<CompiledHeader>,
}

impl HeaderRules {
    /// Compiles and validates the descriptors.
    ///
    /// # Errors
    ///
    /// - `DunderError::InvalidHeader` if a label, key or decoration is blank.
    /// - `DunderError::AmbiguousHeader` if two labels could match the same line.
    /// - `DunderError::HeaderPattern` if a pattern fails to compile.
    pub fn new(descriptors: &[HeaderDescriptor]) -> Result<Self> {
        for descriptor in descriptors {
            if descriptor.label.trim().is_empty() {
                return Err(DunderError::InvalidHeader("label cannot be empty".into()).into());
            }
            if descriptor.key.is_empty() {
                return Err(DunderError::InvalidHeader(format!(
                    "key cannot be empty (label '{}')",
                    descriptor.label
                ))
                .into());
            }
            if descriptor.decoration.trim().is_empty() {
                return Err(DunderError::InvalidHeader(format!(
                    "decoration cannot be blank (label '{}')",
                    descriptor.label
                ))
                .into());
            }
        }

        for (i, first) in descriptors.iter().enumerate() {
            for second in &descriptors[i + 1..] {
                let a = first.normalized_label();
                let b = second.normalized_label();
                if a.starts_with(&b) || b.starts_with(&a) {
                    return Err(DunderError::AmbiguousHeader {
                        first: first.label.clone(),
                        second: second.label.clone(),
                    }
                    .into());
                }
            }
        }

        let mut headers = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let prefix = format!(r"{}{}[ \t]*", COMMENT_LEAD, descriptor.label_pattern());
            let label_only = Regex::new(&format!("^{}", prefix)).map_err(DunderError::from)?;
            let full = Regex::new(&format!(
                r"^(?P<prefix>{})(?P<value>\S(?:.*?\S)?)(?P<padding>[ \t]+)(?P<decoration>{})(?P<tail>[ \t]*(?:-->)?[ \t]*)$",
                prefix,
                regex::escape(&descriptor.decoration)
            ))
            .map_err(DunderError::from)?;
            debug!("Compiled header pattern for '{}': {}", descriptor.label, full);
            headers.push(CompiledHeader {
                descriptor: descriptor.clone(),
                label_only,
                full,
            });
        }
        Ok(Self { headers })
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &HeaderDescriptor> {
        self.headers.iter().map(|h| &h.descriptor)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Rewrites one header line (without its terminator).
    ///
    /// Returns `None` when the line is not a well-formed header line for any
    /// descriptor; the caller then applies plain substitution.
    pub fn rewrite_line(&self, line: &str, tokens: &TokenMap) -> Option<String> {
        for header in &self.headers {
            let Some(caps) = header.full.captures(line) else {
                if header.label_only.is_match(line) {
                    debug!(
                        "Malformed '{}' header line left to plain substitution: {:?}",
                        header.descriptor.label, line
                    );
                    return None;
                }
                continue;
            };

            let prefix = caps.name("prefix")?.as_str();
            let old_value = caps.name("value")?.as_str();
            let padding = caps.name("padding")?.as_str();
            let decoration = caps.name("decoration")?.as_str();
            let tail = caps.name("tail").map_or("", |m| m.as_str());

            let new_value = tokens.substitute(old_value);
            let padding = adjust_padding(padding, old_value, &new_value, &header.descriptor);

            return Some(format!(
                "{}{}{}{}{}",
                prefix, new_value, padding, decoration, tail
            ));
        }
        None
    }
}

/// Grows or shrinks `padding` so the decoration keeps its column.
fn adjust_padding(
    padding: &str,
    old_value: &str,
    new_value: &str,
    descriptor: &HeaderDescriptor,
) -> String {
    let old_len = old_value.chars().count();
    let new_len = new_value.chars().count();

    if new_len > old_len {
        let delta = new_len - old_len;
        // Padding is only blanks, so byte offsets are char offsets.
        let removable = padding.len().saturating_sub(1);
        if delta > removable {
            warn!(
                "Value for '{}' is {} character(s) too long; decoration shifted right",
                descriptor.label,
                delta - removable
            );
        }
        padding[delta.min(removable)..].to_string()
    } else {
        let mut grown = " ".repeat(old_len - new_len);
        grown.push_str(padding);
        grown
    }
}
