//! # Dunder Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! - **`copy`**: recursive template copy (`fs_extra`), used by `Action::Copy`.
//! - **`io`**: directory creation and whole-file read/write with path context.
//!
//! Callers import the submodule they need, e.g.
//! `use crate::common::fs::io::ensure_dir_exists;`.
//!

/// Recursive copying of template trees (e.g., `copy_directory_contents`).
pub mod copy;
/// Basic file I/O (e.g., `ensure_dir_exists`, `write_string_to_file`).
pub mod io;
