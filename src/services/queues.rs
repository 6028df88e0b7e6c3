use serde::Serialize;
use sqlx::mysql::MySqlPool;
use sqlx::Executor;

use crate::database::DatabaseManager;
use crate::error::ActionResult;

pub const FAILED_JOBS_TABLE: &str = "failed_jobs";
pub const PENDING_JOBS_TABLE: &str = "jobs";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueuePurge {
    pub message: String,
    #[serde(rename = "rowsDeleted")]
    pub rows_deleted: u64,
}

async fn table_exists(pool: &MySqlPool, table: &str) -> ActionResult<bool> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT 1 FROM information_schema.tables WHERE table_schema = DATABASE() AND table_name = ? LIMIT 1",
    )
    .bind(table)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

/// Delete every row of `table`; a missing table is a no-op
pub async fn purge(pool: &MySqlPool, table: &str, message: &str) -> ActionResult<QueuePurge> {
    let rows_deleted = if table_exists(pool, table).await? {
        let sql = format!("DELETE FROM {}", DatabaseManager::quote_identifier(table));
        pool.execute(sql.as_str()).await?.rows_affected()
    } else {
        0
    };

    tracing::info!("Purged {} rows from {}", rows_deleted, table);
    Ok(QueuePurge {
        message: message.to_string(),
        rows_deleted,
    })
}

pub async fn flush_failed(pool: &MySqlPool) -> ActionResult<QueuePurge> {
    purge(pool, FAILED_JOBS_TABLE, "Failed jobs cleared.").await
}

pub async fn clear_pending(pool: &MySqlPool) -> ActionResult<QueuePurge> {
    purge(pool, PENDING_JOBS_TABLE, "Pending jobs table cleared.").await
}
