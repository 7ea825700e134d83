//! # Dunder Filesystem Copy Operations
//!
//! File: cli/src/common/fs/copy.rs
//!
//! ## Overview
//!
//! Copies a template directory tree to the location of a new project. The
//! template's *contents* land directly inside the target, so
//! `templates/python/*` becomes `<output>/<name>/*`.
//!
//! The heavy lifting is done by `fs_extra`. Unless `overwrite` is set, the
//! target must be absent or empty, so existing work is never clobbered.
//!
use crate::core::error::{DunderError, Result}; // Standard error type and Result alias
use anyhow::{anyhow, Context}; // Error construction and context
use std::fs; // Directory inspection and creation
use std::path::Path; // Filesystem path type
use tracing::{debug, info}; // Logging utilities

/// Copies everything inside `source` into `target`, creating `target`.
///
/// # Arguments
///
/// * `source` - The directory whose contents are copied. Must exist.
/// * `target` - The directory receiving the contents. Created when missing.
/// * `overwrite` - Whether files already present in `target` may be replaced.
///   Files in `target` that `source` does not contain are never touched.
///
/// # Errors
///
/// Returns an `Err` if:
/// - `source` is not a directory.
/// - `target` exists, is not empty and `overwrite` is false.
/// - Any file fails to copy (wrapped with context).
pub fn copy_directory_contents(source: &Path, target: &Path, overwrite: bool) -> Result<()> {
    // The source must be a real directory; a file or dangling path is an error.
    if !source.is_dir() {
        return Err(anyhow!(DunderError::FileSystem(format!(
            "Copy source {:?} is not a directory",
            source
        ))));
    }
    // Without `overwrite`, only an empty (or missing) target is acceptable.
    if target.exists() && !overwrite {
        let occupied = fs::read_dir(target)
            .with_context(|| format!("Failed to inspect copy target {:?}", target))?
            .next()
            .is_some();
        if occupied {
            return Err(anyhow!(DunderError::FileSystem(format!(
                "Copy target {:?} already exists and is not empty",
                target
            ))));
        }
    } else if !target.exists() {
        // Create the target (and any parents) so `content_only` has a home.
        fs::create_dir_all(target)
            .with_context(|| format!("Failed to create directory {:?}", target))?;
    }

    info!("Copying {:?} into {:?}", source, target);

    // --- Implementation using fs_extra ---
    let mut options = fs_extra::dir::CopyOptions::new();
    // Replace files at the destination only when the caller allows it.
    options.overwrite = overwrite;
    // Copy what is inside `source`, not `source` itself.
    options.content_only = true;
    // Existing subdirectories are merged into, never recreated.
    fs_extra::dir::copy(source, target, &options).map_err(|e| {
        anyhow!(e).context(format!("Failed to copy dir {:?} to {:?}", source, target))
    })?;
    debug!("Finished copy of {:?}", source);
    Ok(())
}
