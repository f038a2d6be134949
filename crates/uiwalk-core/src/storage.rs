//! Read/write uiwalk project files: review rules and run history.

use crate::case::ReviewType;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const UIWALK_DIR: &str = ".uiwalk";
const HISTORY_FILE: &str = "history.json";

/// One completed generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    /// Source document, as given on the command line.
    pub source: String,
    pub review_type: ReviewType,
    pub case_count: usize,
    pub module_count: usize,
    pub high_priority: usize,
    /// Modules whose cases came from templates instead of the model.
    #[serde(default)]
    pub fallback_modules: usize,
    pub output_file: Option<String>,
}

/// Get the path to the uiwalk directory for a given project root.
pub fn uiwalk_dir(project_root: &Path) -> PathBuf {
    project_root.join(UIWALK_DIR)
}

/// Get the path to the run history file for a given project root.
pub fn history_file(project_root: &Path) -> PathBuf {
    uiwalk_dir(project_root).join(HISTORY_FILE)
}

/// Load run history, newest first. A missing file is an empty history.
pub fn load_history(project_root: &Path) -> Result<Vec<HistoryEntry>> {
    let path = history_file(project_root);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let json = fs::read_to_string(&path)
        .with_context(|| format!("failed to read history from {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("failed to parse history in {}", path.display()))
}

/// Prepend `entry` to the run history, keeping at most `max_entries` records.
pub fn record_history(project_root: &Path, entry: HistoryEntry, max_entries: usize) -> Result<()> {
    let mut history = load_history(project_root)?;
    history.insert(0, entry);
    history.truncate(max_entries);

    let dir = uiwalk_dir(project_root);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create uiwalk directory {}", dir.display()))?;

    let path = history_file(project_root);
    let json = serde_json::to_string_pretty(&history)?;
    fs::write(&path, json)
        .with_context(|| format!("failed to write history to {}", path.display()))?;
    Ok(())
}

/// Load the review rules document. A missing file yields an empty string.
pub fn load_rules(project_root: &Path, rules_path: &Path) -> Result<String> {
    let path = if rules_path.is_absolute() {
        rules_path.to_path_buf()
    } else {
        project_root.join(rules_path)
    };
    if !path.exists() {
        return Ok(String::new());
    }
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read review rules from {}", path.display()))
}
