use regex::{NoExpand, Regex};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{ActionError, ActionResult};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EnvEntry {
    pub key: String,
    pub value: String,
}

/// The project's `.env` file, edited one key at a time
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
}

impl EnvFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in file order. A missing file reads as empty.
    pub fn read_entries(&self) -> ActionResult<Vec<EnvEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(parse_entries(&content))
    }

    /// Replace `key` in place or append it, leaving every other line alone
    pub fn write_value(&self, key: &str, value: Option<&str>) -> ActionResult<()> {
        if !self.path.is_file() {
            return Err(ActionError::not_found(".env file not found."));
        }
        let metadata = std::fs::metadata(&self.path)?;
        if metadata.permissions().readonly() {
            return Err(ActionError::not_writable(".env file is not writable."));
        }

        let content = std::fs::read_to_string(&self.path)?;
        let updated = upsert(&content, key, &format_value(value.unwrap_or_default()))?;
        std::fs::write(&self.path, updated)?;
        tracing::info!("Updated environment key {}", key);
        Ok(())
    }
}

pub fn parse_entries(content: &str) -> Vec<EnvEntry> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| EnvEntry {
            key: key.trim().to_string(),
            value: unquote(value.trim()).to_string(),
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Quote values that would otherwise be cut at whitespace or `#`
pub fn format_value(value: &str) -> String {
    if value.chars().any(|c| c.is_whitespace() || c == '#' || c == '"') {
        return format!("\"{}\"", value.replace('"', "\\\""));
    }
    value.to_string()
}

fn upsert(content: &str, key: &str, formatted: &str) -> ActionResult<String> {
    let line = format!("{}={}", key, formatted);
    let pattern = Regex::new(&format!(r"(?m)^{}=.*$", regex::escape(key)))
        .map_err(|e| ActionError::execution(e.to_string()))?;

    if pattern.is_match(content) {
        Ok(pattern.replace_all(content, NoExpand(&line)).into_owned())
    } else {
        Ok(format!("{}\n{}", content, line))
    }
}
