use sqlx::mysql::MySqlPool;
use sqlx::Executor;
use std::path::Path;

use crate::error::{ActionError, ActionResult};

/// Outcome of replaying a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Applied { bytes: usize },
    Empty,
}

/// Replay a snapshot file against the database as one multi-statement
/// batch on a single connection with foreign key checks disabled.
///
/// Statements that already ran stay applied if a later one fails. Checks
/// are switched back on whether or not the batch succeeds; a connection
/// where that fails is closed instead of going back to the pool.
pub async fn restore_file(pool: &MySqlPool, path: &Path) -> ActionResult<RestoreOutcome> {
    let script = read_script(path).await?;
    restore_script(pool, &script).await
}

/// Snapshots are SQL text; raw binary bytes mean the file was not
/// produced with hex-encoded blobs and cannot be replayed as-is.
async fn read_script(path: &Path) -> ActionResult<String> {
    let bytes = tokio::fs::read(path).await?;
    String::from_utf8(bytes).map_err(|e| {
        ActionError::execution(format!(
            "Restore failed: backup file is not valid UTF-8 SQL (invalid byte at offset {}).",
            e.utf8_error().valid_up_to()
        ))
    })
}

pub async fn restore_script(pool: &MySqlPool, script: &str) -> ActionResult<RestoreOutcome> {
    if script.trim().is_empty() {
        return Ok(RestoreOutcome::Empty);
    }

    let mut conn = pool.acquire().await?;
    (&mut *conn).execute("SET FOREIGN_KEY_CHECKS=0").await?;

    let applied = (&mut *conn).execute(script).await;

    let reenabled = (&mut *conn).execute("SET FOREIGN_KEY_CHECKS=1").await;
    if let Err(e) = reenabled {
        tracing::warn!("Could not re-enable foreign key checks, discarding connection: {}", e);
        drop(conn.detach());
    }

    match applied {
        Ok(_) => Ok(RestoreOutcome::Applied { bytes: script.len() }),
        Err(e) => Err(ActionError::execution(format!("Restore failed: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn raw_binary_snapshot_is_an_execution_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("binary.sql");
        std::fs::write(&path, b"INSERT INTO t VALUES ('\xFF\xFE');\n").unwrap();

        let err = read_script(&path).await.unwrap_err();
        assert_eq!(err.error_code(), "EXECUTION_FAILED");
        assert!(err.to_string().contains("not valid UTF-8"), "{err}");
        assert!(err.to_string().contains("offset 23"), "{err}");
    }

    #[tokio::test]
    async fn hex_encoded_snapshot_reads_as_text() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hex.sql");
        std::fs::write(&path, "INSERT INTO t VALUES (0xFFFE);\n").unwrap();

        assert_eq!(read_script(&path).await.unwrap(), "INSERT INTO t VALUES (0xFFFE);\n");
    }
}
