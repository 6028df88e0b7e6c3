// backup/mod.rs - database snapshots
//
// create:  filename -> external dump tool -> (on failure) in-process dump
// restore: backup store resolve -> single batch with FK checks relaxed

pub mod dump;
pub mod encoder;
pub mod restore;
pub mod store;

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::database::DatabaseManager;
use crate::error::ActionResult;

pub use dump::{DumpAttempt, DumpTool};
pub use restore::RestoreOutcome;
pub use store::{BackupRecord, BackupStore};

const SLUG_MAX_LENGTH: usize = 40;

/// `<slug>_YYYYMMDD_HHMMSS.sql`, or just the timestamp when the label
/// has nothing left after slugging.
pub fn backup_filename(label: Option<&str>, now: DateTime<Utc>) -> String {
    let stamp = now.format("%Y%m%d_%H%M%S");
    match label.map(slugify).filter(|s| !s.is_empty()) {
        Some(slug) => format!("{}_{}.sql", slug, stamp),
        None => format!("{}.sql", stamp),
    }
}

fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for ch in label.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    // ASCII only from here, so byte truncation is safe
    slug.truncate(SLUG_MAX_LENGTH);
    slug.trim_end_matches('_').to_string()
}

pub struct BackupService {
    store: BackupStore,
    dump_tool: DumpTool,
}

impl BackupService {
    pub fn new(backup_dir: impl Into<PathBuf>, dump_binary: &str, working_dir: &Path) -> Self {
        Self {
            store: BackupStore::new(backup_dir),
            dump_tool: DumpTool::new(dump_binary, working_dir),
        }
    }

    pub fn with_dump_tool(mut self, dump_tool: DumpTool) -> Self {
        self.dump_tool = dump_tool;
        self
    }

    pub fn store(&self) -> &BackupStore {
        &self.store
    }

    pub fn list(&self) -> ActionResult<Vec<BackupRecord>> {
        self.store.list()
    }

    pub fn resolve(&self, filename: &str) -> ActionResult<PathBuf> {
        self.store.resolve(filename)
    }

    pub fn delete(&self, filename: &str) -> ActionResult<()> {
        self.store.delete(filename)
    }

    /// Snapshot the database into a new file and describe it
    pub async fn create(&self, database: &DatabaseManager, label: Option<&str>) -> ActionResult<BackupRecord> {
        let info = database.info()?;
        let directory = self.store.ensure_directory()?;
        let filename = backup_filename(label, Utc::now());
        let target = directory.join(&filename);

        match self.dump_tool.dump(info, &target).await {
            DumpAttempt::Succeeded(_) => {
                info!("Backup {} written by external dump tool", filename);
            }
            DumpAttempt::FellBack(reason) => {
                warn!("External dump failed, falling back to query dump: {}", reason);
                let stats = dump::dump_via_query(database.pool()?, &target).await?;
                info!("Backup {} written by query dump ({} tables, {} rows)", filename, stats.tables, stats.rows);
            }
        }

        self.store.record(&filename)
    }

    /// Replay a stored snapshot. The file itself is left untouched.
    pub async fn restore(&self, database: &DatabaseManager, filename: &str) -> ActionResult<RestoreOutcome> {
        let path = self.store.resolve(filename)?;
        let pool = database.pool()?;
        let outcome = restore::restore_file(pool, &path).await?;
        info!("Restored backup {} ({:?})", filename, outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 12, 4, 9).unwrap()
    }

    #[test]
    fn slugged_label_prefixes_timestamp() {
        assert_eq!(backup_filename(Some("Pre Deploy!!"), noon()), "pre_deploy_20240305_120409.sql");
        assert_eq!(backup_filename(Some("  nightly -- v2.1 "), noon()), "nightly_v2_1_20240305_120409.sql");
    }

    #[test]
    fn missing_or_symbol_only_label_uses_timestamp_alone() {
        assert_eq!(backup_filename(None, noon()), "20240305_120409.sql");
        assert_eq!(backup_filename(Some("!!!"), noon()), "20240305_120409.sql");
        assert_eq!(backup_filename(Some("../../etc"), noon()), "etc_20240305_120409.sql");
    }

    #[test]
    fn long_labels_are_cut_to_forty_characters() {
        let label = "a".repeat(39) + " bcdef";
        let name = backup_filename(Some(&label), noon());
        assert_eq!(name, format!("{}_20240305_120409.sql", "a".repeat(39)));

        let name = backup_filename(Some(&"x".repeat(100)), noon());
        assert_eq!(name, format!("{}_20240305_120409.sql", "x".repeat(40)));
    }

    #[test]
    fn non_ascii_letters_become_separators() {
        assert_eq!(backup_filename(Some("Café Menü"), noon()), "caf_men_20240305_120409.sql");
    }

    #[tokio::test]
    async fn create_without_database_fails_before_touching_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let service = BackupService::new(dir.path().join("backups"), "mysqldump", dir.path());
        let database = DatabaseManager::new(None, None, 1);

        let err = service.create(&database, Some("x")).await.unwrap_err();
        assert_eq!(err.error_code(), "EXECUTION_FAILED");
        assert!(!dir.path().join("backups").exists());
    }
}
