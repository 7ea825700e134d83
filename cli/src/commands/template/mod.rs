//! # Dunder Template Command Group
//!
//! File: cli/src/commands/template/mod.rs
//!
//! ## Overview
//!
//! Entry point and router for `dunder template`. Templates are plain
//! directory trees stored under the configured templates directory; file
//! contents and names carry dunder tokens that are filled in when a project
//! is created.
//!
//! ## Examples
//!
//! ```bash
//! # List available templates
//! dunder template list
//!
//! # Create ./my-tool from the "python" template
//! dunder template create -t python my-tool
//!
//! # Preview what would be rewritten, without copying anything
//! dunder template create -t python my-tool --dry-run
//! ```
//!
use crate::core::config::Config;
use crate::core::error::Result;
use clap::{Parser, Subcommand};

mod create;
mod list;

/// Arguments for the `dunder template` command group.
#[derive(Parser, Debug)]
pub struct TemplateArgs {
    #[command(subcommand)]
    command: TemplateCommand,
}

#[derive(Subcommand, Debug)]
enum TemplateCommand {
    /// List the templates found in the configured templates directory.
    List(list::ListArgs),
    /// Create a new project directory from a template.
    Create(create::CreateArgs),
}

/// Dispatches `dunder template <subcommand>`.
pub fn handle_template(args: TemplateArgs, cfg: &Config) -> Result<()> {
    match args.command {
        TemplateCommand::List(args) => list::handle_list(args, cfg),
        TemplateCommand::Create(args) => create::handle_create(args, cfg),
    }
}
