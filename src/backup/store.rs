use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ActionError, ActionResult};

const NOT_FOUND: &str = "Backup not found.";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BackupRecord {
    pub filename: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

/// Snapshot files inside one backup directory. The directory listing is
/// the only source of truth.
#[derive(Debug, Clone)]
pub struct BackupStore {
    directory: PathBuf,
}

impl BackupStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Create the directory if needed and return its canonical path
    pub fn ensure_directory(&self) -> ActionResult<PathBuf> {
        if !self.directory.exists() {
            let mut builder = fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                builder.mode(0o755);
            }
            builder.create(&self.directory)?;
            tracing::info!("Created backup directory {}", self.directory.display());
        }
        Ok(self.directory.canonicalize()?)
    }

    /// Newest first, by modification time
    pub fn list(&self) -> ActionResult<Vec<BackupRecord>> {
        let directory = self.ensure_directory()?;
        let mut records = Vec::new();

        for entry in fs::read_dir(&directory)? {
            let entry = entry?;
            let filename = entry.file_name().to_string_lossy().into_owned();
            // in-progress dumps are hidden until they are renamed into place
            if filename.starts_with('.') {
                continue;
            }
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            records.push(record_from(filename, &metadata));
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.filename.cmp(&a.filename)));
        Ok(records)
    }

    /// Canonical path of `filename`, which must be a regular file strictly
    /// inside the backup directory.
    pub fn resolve(&self, filename: &str) -> ActionResult<PathBuf> {
        let directory = self.ensure_directory()?;

        if filename.is_empty() {
            return Err(ActionError::not_found(NOT_FOUND));
        }

        let candidate = directory
            .join(filename)
            .canonicalize()
            .map_err(|_| ActionError::not_found(NOT_FOUND))?;

        // Component-wise: /data/backups-old is not inside /data/backups
        if candidate == directory || !candidate.starts_with(&directory) || !candidate.is_file() {
            return Err(ActionError::not_found(NOT_FOUND));
        }
        if filename.starts_with('.') || is_hidden(&candidate) {
            return Err(ActionError::not_found(NOT_FOUND));
        }

        Ok(candidate)
    }

    pub fn delete(&self, filename: &str) -> ActionResult<()> {
        let path = self.resolve(filename)?;
        fs::remove_file(&path)?;
        tracing::info!("Deleted backup {}", filename);
        Ok(())
    }

    pub fn record(&self, filename: &str) -> ActionResult<BackupRecord> {
        let path = self.resolve(filename)?;
        let metadata = fs::metadata(&path)?;
        Ok(record_from(filename.to_string(), &metadata))
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(true)
}

fn record_from(filename: String, metadata: &fs::Metadata) -> BackupRecord {
    let created_at = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());
    BackupRecord {
        filename,
        size_bytes: metadata.len(),
        created_at,
    }
}
