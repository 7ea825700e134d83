//! # Dunder Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout the Dunder application.
//! It provides a consistent approach to error management with detailed error
//! information and context.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `DunderError`: A custom error enum using `thiserror` for specific error types
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! The error types cover:
//! - Configuration errors
//! - Filesystem errors
//! - Token map and header descriptor validation
//! - Version parsing for metadata bumps
//! - Template lookup
//! - Partially failed runs (some planned actions could not be applied)
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if key.is_empty() {
//!     return Err(DunderError::InvalidToken("empty key".into()).into());
//! }
//!
//! // Add context to errors using anyhow
//! let content = fs::read_to_string(&path)
//!     .with_context(|| format!("Failed to read file: {}", path.display()))?;
//! ```
//!
use thiserror::Error;

/// Custom error type for the Dunder application.
#[derive(Error, Debug)]
pub enum DunderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid header descriptor: {0}")]
    InvalidHeader(String),

    #[error("Header labels '{first}' and '{second}' overlap; each header line must match exactly one descriptor.")]
    AmbiguousHeader { first: String, second: String },

    #[error("Header pattern failed to compile: {source}")]
    HeaderPattern {
        #[from]
        source: regex::Error,
    },

    #[error("Invalid version '{0}'. Expected MAJOR.MINOR.PATCH.")]
    InvalidVersion(String),

    #[error("Template '{name}' not found.")]
    TemplateNotFound { name: String },

    #[error("Argument parsing error: {0}")]
    ArgumentParsing(String),

    #[error("{count} action(s) failed; see the report above.")]
    ActionsFailed { count: usize },
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
