//! # Dunder Token Map
//!
//! File: cli/src/core/tokens.rs
//!
//! ## Overview
//!
//! A `TokenMap` maps placeholder tokens ("dunders" such as `__NAME__`) to the
//! values that replace them. It is built once per rewrite pass from the
//! project configuration and then only read.
//!
//! ## Substitution rules
//!
//! - Every literal occurrence of every key is replaced.
//! - The text is scanned once. A replacement value is never scanned again, so
//!   a value that happens to contain another key is emitted verbatim.
//! - When two keys start at the same position the one inserted first wins.
//!   Iteration order is insertion order, which keeps passes deterministic.
//!
//! ```rust
//! let mut tokens = TokenMap::new();
//! tokens.insert("__NAME__", "Foo")?;
//! assert_eq!(tokens.substitute("class __NAME__:"), "class Foo:");
//! ```
//!
use crate::core::error::{DunderError, Result};
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Ordered placeholder → value mapping with a single-pass matcher.
#[derive(Debug, Clone, Default)]
pub struct TokenMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
    /// Alternation of every escaped key, in insertion order. `None` when empty.
    matcher: Option<Regex>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from `(key, value)` pairs. Later duplicates overwrite earlier values.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (key, value) in pairs {
            map.insert(key, value)?;
        }
        Ok(map)
    }

    /// Inserts or replaces a token. A replaced key keeps its original position.
    ///
    /// # Errors
    ///
    /// Returns `DunderError::InvalidToken` for an empty key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        if key.is_empty() {
            return Err(DunderError::InvalidToken("token keys cannot be empty".into()).into());
        }
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                self.rebuild_matcher()?;
            }
        }
        Ok(())
    }

    fn rebuild_matcher(&mut self) -> Result<()> {
        let alternation = self
            .entries
            .iter()
            .map(|(key, _)| regex::escape(key))
            .collect::<Vec<_>>()
            .join("|");
        self.matcher = Some(Regex::new(&alternation).map_err(DunderError::from)?);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replaces every key occurring in `text` with its value in one pass.
    pub fn substitute(&self, text: &str) -> String {
        match &self.matcher {
            Some(matcher) => matcher
                .replace_all(text, |caps: &Captures| {
                    // Every match is one of our keys, so the lookup cannot miss.
                    self.get(&caps[0]).unwrap_or(&caps[0]).to_string()
                })
                .into_owned(),
            None => text.to_string(),
        }
    }

    /// Whether any key occurs in `text`.
    pub fn contains_any(&self, text: &str) -> bool {
        self.matcher
            .as_ref()
            .is_some_and(|matcher| matcher.is_match(text))
    }
}

/// Wraps a bare name in double underscores (`NAME` → `__NAME__`).
/// Names that already look like dunders are returned unchanged.
pub fn wrap_key(name: &str) -> String {
    if name.len() > 4 && name.starts_with("__") && name.ends_with("__") {
        name.to_string()
    } else {
        format!("__{}__", name)
    }
}
