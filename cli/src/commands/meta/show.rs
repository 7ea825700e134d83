//! # Dunder Meta Show Command
//!
//! File: cli/src/commands/meta/show.rs
//!
//! Prints the effective `[project]` metadata and the file it came from.
//!
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::metadata::ProjectMeta;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct ShowArgs {}

pub fn handle_show(_args: ShowArgs, cfg: &Config) -> Result<()> {
    let source = cfg
        .source
        .as_ref()
        .map_or_else(|| "(built-in defaults)".to_string(), |p| p.display().to_string());
    println!("Configuration: {}", source);
    for line in format_meta(&cfg.project) {
        println!("{}", line);
    }
    Ok(())
}

fn format_meta(meta: &ProjectMeta) -> Vec<String> {
    let fields = [
        ("name", meta.name.clone()),
        ("version", meta.version.clone()),
        ("description", meta.description.clone()),
        ("keywords", meta.keywords.join(", ")),
        ("author", meta.author.clone()),
        ("email", meta.email.clone()),
        ("license", meta.license.clone()),
    ];
    fields
        .into_iter()
        .map(|(label, value)| {
            let value = if value.is_empty() { "-".to_string() } else { value };
            format!("{:<12} {}", label, value)
        })
        .collect()
}
