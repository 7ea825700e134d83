//! # Dunder Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the Dunder CLI application.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Loading the configuration once and passing it to the handlers
//! - Routing execution to appropriate command handlers
//!
//! ## Architecture
//!
//! - Each top-level command (`template`, `rewrite`, `meta`) is a variant in the `Commands` enum
//! - Commands are mapped to handler functions in their respective modules
//! - All errors are propagated to this level for consistent handling
//!
//! ## Examples
//!
//! ```bash
//! # Get help
//! dunder --help
//!
//! # Scaffold a project with increased verbosity
//! dunder -vv template create -t python my-tool
//!
//! # Use a specific configuration file
//! dunder --config ./release.toml meta bump patch
//! ```
//!
use clap::Parser; // Derive-based argument parsing
use std::path::PathBuf; // Path to an explicit configuration file
use tracing_subscriber::{fmt, EnvFilter}; // Log formatting and level filtering

mod commands; // Command handlers (template, rewrite, meta)
mod common; // Shared utilities (fs)
mod core; // Core infrastructure (config, errors, tokens, headers, walk)

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "dunder",
    about = "Dunder: project templates with __TOKEN__ substitution and header banners",
    long_about = "Create projects from templates, rewrite __TOKEN__ placeholders and header banners\n\
                  in existing trees, and keep project metadata in sync across packaging files.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use this configuration file instead of the user/project lookup.
    #[arg(long, global = true, env = "DUNDER_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Manage project templates.
    #[command(alias = "t")]
    Template(commands::template::TemplateArgs),
    /// Substitute tokens and realign headers in an existing tree.
    #[command(alias = "r")]
    Rewrite(commands::rewrite::RewriteArgs),
    /// Show, bump, set and synchronize project metadata.
    #[command(alias = "m")]
    Meta(commands::meta::MetaArgs),
}

fn main() -> anyhow::Result<()> {
    // Parse arguments first; clap exits on its own for --help, --version and usage errors.
    let cli = Cli::parse();

    // Map the -v count to a default level. RUST_LOG, when set, takes precedence.
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    // Logs go to stderr so command output on stdout stays clean.
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    // Load the configuration once, then hand it to the selected handler.
    let command_result = core::config::load_config(cli.config.as_deref()).and_then(|cfg| {
        match cli.command {
            Commands::Template(args) => commands::template::handle_template(args, &cfg),
            Commands::Rewrite(args) => commands::rewrite::handle_rewrite(args, &cfg),
            Commands::Meta(args) => commands::meta::handle_meta(args, &cfg),
        }
    });

    // Report the full error chain and exit non-zero on any failure.
    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
