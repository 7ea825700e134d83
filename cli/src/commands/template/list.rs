//! # Dunder Template List Command
//!
//! File: cli/src/commands/template/list.rs
//!
//! ## Overview
//!
//! Implements `dunder template list`: scans the configured templates
//! directory and prints each template with a short description taken from its
//! `README.md` (the first paragraph after the title, tokens left as written).
//!
use crate::common::fs::io;
use crate::core::config::Config;
use crate::core::error::{DunderError, Result};
use anyhow::Context;
use clap::Parser;
use std::{fs, path::Path};
use tracing::{debug, info, warn};

/// `dunder template list` takes no options.
#[derive(Parser, Debug)]
pub struct ListArgs {}

pub fn handle_list(_args: ListArgs, cfg: &Config) -> Result<()> {
    info!("Handling template list command...");
    let templates_dir = cfg.templates_dir();
    debug!("Scanning for templates in directory: {}", templates_dir.display());

    if !templates_dir.is_dir() {
        return Err(DunderError::Config(format!(
            "Templates directory '{}' does not exist. Set [templates] directory in your .dunder.toml.",
            templates_dir.display()
        ))
        .into());
    }

    let templates = read_templates_from_dir(&templates_dir).with_context(|| {
        format!(
            "Failed to read templates from directory '{}'",
            templates_dir.display()
        )
    })?;
    print_template_table(&templates, &templates_dir);
    Ok(())
}

/// Returns `(name, description)` for every non-hidden subdirectory, sorted by name.
fn read_templates_from_dir(dir: &Path) -> Result<Vec<(String, String)>> {
    let mut templates = Vec::new();
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read template directory '{}'", dir.display()))?;

    for entry_result in entries {
        let entry = entry_result
            .with_context(|| format!("Failed to process a directory entry in '{}'", dir.display()))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        if !path.is_dir() || name.starts_with('.') {
            debug!("Skipping non-template entry: {}", path.display());
            continue;
        }
        let description = read_template_description(&path)
            .unwrap_or_else(|| "[No README.md or description found]".to_string());
        templates.push((name, description));
    }

    templates.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(templates)
}

fn read_template_description(template_path: &Path) -> Option<String> {
    let readme_path = template_path.join("README.md");
    if !readme_path.is_file() {
        debug!("No README.md found in {}", template_path.display());
        return None;
    }
    match io::read_file_to_string(&readme_path) {
        Ok(content) => extract_description_from_readme(&content),
        Err(e) => {
            warn!("{:#}. Skipping description.", e);
            None
        }
    }
}

/// First paragraph after the first `# ` heading (or the first non-heading
/// line), joined and truncated to 80 characters.
fn extract_description_from_readme(content: &str) -> Option<String> {
    const MAX_LEN: usize = 80;
    let lines: Vec<&str> = content.lines().collect();
    let start = lines
        .iter()
        .position(|line| line.trim().starts_with("# "))
        .map_or(0, |idx| idx + 1);

    let mut paragraph = Vec::new();
    for line in &lines[start..] {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            if paragraph.is_empty() {
                continue;
            }
            break;
        }
        paragraph.push(trimmed);
    }
    if paragraph.is_empty() {
        return None;
    }

    let full = paragraph.join(" ");
    if full.chars().count() > MAX_LEN {
        let mut truncated: String = full.chars().take(MAX_LEN - 3).collect();
        truncated.push_str("...");
        Some(truncated)
    } else {
        Some(full)
    }
}

fn print_template_table(templates: &[(String, String)], dir: &Path) {
    if templates.is_empty() {
        println!("No templates found in '{}'.", dir.display());
        return;
    }

    let name_width = templates
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(10)
        .clamp(10, 30);

    println!("\nAvailable templates in '{}':\n", dir.display());
    println!("{:<width$} | Description", "Name", width = name_width);
    println!("{:-<width$}-+-{:-<50}", "", "", width = name_width);
    for (name, description) in templates {
        println!("{:<width$} | {}", name, description, width = name_width);
    }
    println!("\nFound {} template(s).", templates.len());
    println!("Use 'dunder template create -t <Name> <project>' to use one.");
}
