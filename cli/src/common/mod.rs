//! # Dunder Common Utilities
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared, domain-agnostic helpers used by the core and the commands.
//! Currently only filesystem utilities live here.
//!
//! ```rust
//! use crate::common::fs::io;
//! io::ensure_dir_exists(Path::new("./out"))?;
//! ```
//!

/// Utilities for filesystem operations (copying, I/O).
pub mod fs;
