//! Bounded recent-queries log.
//!
//! A small JSON file holding the last few submitted queries, most recent
//! first. Duplicates are allowed, the list is capped at
//! `history.max_entries` (default 5), and the file format is not a
//! compatibility surface — a missing or unreadable file is simply treated
//! as an empty log.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Config;

/// One logged query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    pub asked_at: DateTime<Utc>,
}

/// Resolve the history file location: config override, else the platform
/// data dir, else the current directory.
pub fn history_path(config: &Config) -> PathBuf {
    if let Some(path) = &config.history.path {
        return path.clone();
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("askbar")
        .join("history.json")
}

/// Load the log, most recent first. Missing or corrupt files yield an
/// empty log rather than an error.
pub fn load(config: &Config) -> Vec<HistoryEntry> {
    let path = history_path(config);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };
    serde_json::from_str(&content).unwrap_or_default()
}

/// Record a query at the front of the log, truncating to the configured
/// cap. The query is stored as submitted (already trimmed by the caller).
pub fn record(config: &Config, query: &str) -> Result<()> {
    let mut entries = load(config);
    entries.insert(
        0,
        HistoryEntry {
            query: query.to_string(),
            asked_at: Utc::now(),
        },
    );
    entries.truncate(config.history.max_entries);

    let path = history_path(config);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create history dir: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&entries)?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write history file: {}", path.display()))?;
    Ok(())
}

/// CLI entry point — print the log to stdout.
pub fn run_list(config: &Config) -> Result<()> {
    let entries = load(config);
    if entries.is_empty() {
        println!("No recent queries.");
        return Ok(());
    }
    println!("--- Recent queries ---");
    for entry in &entries {
        println!(
            "{}  {}",
            entry.asked_at.format("%Y-%m-%dT%H:%M:%SZ"),
            entry.query
        );
    }
    Ok(())
}

/// CLI entry point — delete the log file.
pub fn run_clear(config: &Config) -> Result<()> {
    let path = history_path(config);
    match std::fs::remove_file(&path) {
        Ok(()) => println!("History cleared."),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => println!("No history to clear."),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to remove: {}", path.display()));
        }
    }
    Ok(())
}
