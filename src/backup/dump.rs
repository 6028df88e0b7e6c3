//! Producing a snapshot file.
//!
//! The external dump tool is tried first. Any failure there is reported
//! back as `DumpAttempt::FellBack` and the caller moves on to
//! `dump_via_query`, which rebuilds the schema and data from the live
//! connection. Both paths write into a hidden partial file that is only
//! renamed to its final name once complete.

use futures::TryStreamExt;
use sqlx::mysql::{MySqlConnection, MySqlPool};
use sqlx::Executor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufWriter};

use super::encoder::encode;
use crate::database::rows::{column_names, decode_row};
use crate::database::{DatabaseConnectionInfo, DatabaseManager, SqlValue};
use crate::error::{ActionError, ActionResult};
use crate::services::process;

/// Rows per multi-row INSERT statement
pub const INSERT_BATCH_SIZE: usize = 200;

pub const DISABLE_FOREIGN_KEYS: &str = "SET FOREIGN_KEY_CHECKS=0;\n\n";
pub const ENABLE_FOREIGN_KEYS: &str = "SET FOREIGN_KEY_CHECKS=1;\n";

#[derive(Debug)]
pub enum DumpAttempt {
    Succeeded(PathBuf),
    FellBack(String),
}

#[derive(Debug, Clone)]
pub struct DumpTool {
    binary: String,
    working_dir: PathBuf,
    timeout: Duration,
}

impl DumpTool {
    pub fn new(binary: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            working_dir: working_dir.into(),
            timeout: process::DUMP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn arguments(info: &DatabaseConnectionInfo) -> Vec<String> {
        vec![
            format!("--user={}", info.username),
            format!("--host={}", info.host),
            format!("--port={}", info.port),
            "--single-transaction".to_string(),
            "--quick".to_string(),
            "--hex-blob".to_string(),
            info.database.clone(),
        ]
    }

    /// Run the dump tool and store its stdout verbatim at `target`. The
    /// password travels in MYSQL_PWD, never on the command line.
    pub async fn dump(&self, info: &DatabaseConnectionInfo, target: &Path) -> DumpAttempt {
        let envs: Vec<(&str, &str)> = info
            .password
            .as_deref()
            .map(|password| vec![("MYSQL_PWD", password)])
            .unwrap_or_default();

        let output = process::run(&self.binary, &Self::arguments(info), &self.working_dir, &envs, self.timeout)
            .await
            .and_then(|output| output.check(&self.binary));

        let output = match output {
            Ok(output) => output,
            Err(e) => return DumpAttempt::FellBack(e.to_string()),
        };

        let written = async {
            let mut file = PartialFile::create(target).await?;
            file.write(&output.stdout).await?;
            file.commit().await
        };

        match written.await {
            Ok(()) => DumpAttempt::Succeeded(target.to_path_buf()),
            Err(e) => DumpAttempt::FellBack(format!("failed to write dump output: {}", e)),
        }
    }
}

/// Summary of an in-process dump
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDumpStats {
    pub tables: usize,
    pub rows: usize,
}

/// Export every base table of the connected database as
/// DROP/CREATE/INSERT statements, bracketed by foreign key toggles.
/// A database without tables produces an empty file.
pub async fn dump_via_query(pool: &MySqlPool, target: &Path) -> ActionResult<QueryDumpStats> {
    let mut conn = pool.acquire().await?;
    (&mut *conn)
        .execute("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
        .await?;
    (&mut *conn).execute("START TRANSACTION WITH CONSISTENT SNAPSHOT").await?;

    let result = write_query_dump(&mut conn, target).await;

    if let Err(e) = (&mut *conn).execute("ROLLBACK").await {
        tracing::warn!("Failed to close dump snapshot: {}", e);
    }

    result
}

async fn write_query_dump(conn: &mut MySqlConnection, target: &Path) -> ActionResult<QueryDumpStats> {
    let tables = list_tables(conn).await?;
    let mut file = PartialFile::create(target).await?;
    let mut stats = QueryDumpStats::default();

    if tables.is_empty() {
        file.commit().await?;
        return Ok(stats);
    }

    let outcome: ActionResult<()> = async {
        file.write(DISABLE_FOREIGN_KEYS.as_bytes()).await?;

        for table in &tables {
            let create = show_create_table(conn, table).await?;
            file.write(table_header(table, &create).as_bytes()).await?;
            stats.rows += dump_table_rows(conn, table, &mut file).await?;
            stats.tables += 1;
        }

        file.write(ENABLE_FOREIGN_KEYS.as_bytes()).await?;
        Ok(())
    }
    .await;

    match outcome {
        Ok(()) => {
            file.commit().await?;
            Ok(stats)
        }
        Err(e) => {
            file.discard().await;
            Err(e)
        }
    }
}

async fn list_tables(conn: &mut MySqlConnection) -> ActionResult<Vec<String>> {
    let rows = (&mut *conn).fetch_all("SHOW FULL TABLES WHERE Table_type = 'BASE TABLE'").await?;
    let mut tables = Vec::with_capacity(rows.len());
    for row in &rows {
        if let Some(SqlValue::Text(name)) = decode_row(row)?.into_iter().next() {
            tables.push(name);
        }
    }
    Ok(tables)
}

async fn show_create_table(conn: &mut MySqlConnection, table: &str) -> ActionResult<String> {
    let sql = format!("SHOW CREATE TABLE {}", DatabaseManager::quote_identifier(table));
    let row = (&mut *conn).fetch_one(sql.as_str()).await?;
    // columns are (Table, Create Table)
    match decode_row(&row)?.into_iter().nth(1) {
        Some(SqlValue::Text(statement)) => Ok(statement),
        _ => Err(ActionError::execution(format!("No CREATE statement returned for {}", table))),
    }
}

async fn dump_table_rows(conn: &mut MySqlConnection, table: &str, file: &mut PartialFile) -> ActionResult<usize> {
    let sql = format!("SELECT * FROM {}", DatabaseManager::quote_identifier(table));
    let mut stream = (&mut *conn).fetch(sql.as_str());

    let mut columns: Option<Vec<String>> = None;
    let mut batch: Vec<Vec<SqlValue>> = Vec::with_capacity(INSERT_BATCH_SIZE);
    let mut total = 0;

    while let Some(row) = stream.try_next().await? {
        if columns.is_none() {
            columns = Some(column_names(&row));
        }
        batch.push(decode_row(&row)?);
        if batch.len() == INSERT_BATCH_SIZE {
            if let Some(columns) = &columns {
                file.write(insert_statement(table, columns, &batch).as_bytes()).await?;
            }
            total += batch.len();
            batch.clear();
        }
    }

    if let Some(columns) = &columns {
        if !batch.is_empty() {
            file.write(insert_statement(table, columns, &batch).as_bytes()).await?;
            total += batch.len();
        }
    }

    file.write(b"\n").await?;
    Ok(total)
}

pub fn table_header(table: &str, create_statement: &str) -> String {
    format!(
        "DROP TABLE IF EXISTS {};\n{};\n\n",
        DatabaseManager::quote_identifier(table),
        create_statement
    )
}

/// One multi-row INSERT for a batch of rows
pub fn insert_statement(table: &str, columns: &[String], rows: &[Vec<SqlValue>]) -> String {
    let column_list = columns
        .iter()
        .map(|c| DatabaseManager::quote_identifier(c))
        .collect::<Vec<_>>()
        .join(",");

    let values = rows
        .iter()
        .map(|row| {
            let encoded = row.iter().map(encode).collect::<Vec<_>>().join(", ");
            format!("({})", encoded)
        })
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "INSERT INTO {} ({}) VALUES {};\n",
        DatabaseManager::quote_identifier(table),
        column_list,
        values
    )
}

/// A dump being written next to its final location. Until `commit`
/// renames it into place, the target name either does not exist or
/// still holds whatever was there before.
struct PartialFile {
    temp: PathBuf,
    target: PathBuf,
    writer: BufWriter<tokio::fs::File>,
}

impl PartialFile {
    async fn create(target: &Path) -> ActionResult<Self> {
        let directory = target
            .parent()
            .ok_or_else(|| ActionError::execution("Backup target has no parent directory"))?;
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ActionError::execution("Backup target has no file name"))?;

        let temp = directory.join(format!(".{}.partial", name));
        let file = tokio::fs::File::create(&temp).await?;

        Ok(Self {
            temp,
            target: target.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    async fn write(&mut self, bytes: &[u8]) -> ActionResult<()> {
        self.writer.write_all(bytes).await?;
        Ok(())
    }

    async fn commit(mut self) -> ActionResult<()> {
        self.writer.flush().await?;
        self.writer.get_ref().sync_all().await?;
        tokio::fs::rename(&self.temp, &self.target).await?;
        Ok(())
    }

    async fn discard(self) {
        drop(self.writer);
        let _ = tokio::fs::remove_file(&self.temp).await;
    }
}
