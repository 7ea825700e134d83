//! # Dunder Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! The engine behind every command, independent of the CLI layer:
//!
//! - `tokens`: the ordered token map and single-pass substitution
//! - `header`: header banner detection and column-preserving rewriting
//! - `rewrite`: the per-file pass combining headers and plain substitution
//! - `blacklist`: path fragments that prune or restrict the walk
//! - `walk`: recursive rewrite and rename of a directory tree
//! - `plan`: ordered filesystem actions, applied or reported (dry run)
//! - `metadata`: project metadata, version bumps and packaging-file sync
//! - `context`: builds the token map from metadata, config and `--var`
//! - `config`: loading, merging and validation of `.dunder.toml`
//! - `error`: error types and the `Result` alias
//!
//! ```rust
//! use crate::core::config;
//! use crate::core::error::{DunderError, Result};
//! use crate::core::walk::{walk_and_rewrite, WalkContext};
//! ```
//!
pub mod blacklist;
pub mod config;
pub mod context;
pub mod error;
pub mod header;
pub mod metadata;
pub mod plan;
pub mod rewrite;
pub mod tokens;
pub mod walk;
