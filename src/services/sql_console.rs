use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::mysql::MySqlPool;
use sqlx::Executor;

use crate::database::rows::row_to_json;
use crate::error::{ActionError, ActionResult};

const ROW_RETURNING: &[&str] = &["select", "show", "describe", "pragma", "explain"];

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SqlResult {
    Rows(Vec<Map<String, Value>>),
    Affected {
        #[serde(rename = "rowsAffected")]
        rows_affected: u64,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SqlRun {
    pub statement: String,
    pub result: SqlResult,
}

/// Trailing semicolons are dropped; the statement is sent as is
pub fn prepare_statement(raw: &str) -> String {
    raw.trim_end().trim_end_matches(';').to_string()
}

pub fn returns_rows(statement: &str) -> bool {
    let first = statement
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    ROW_RETURNING.contains(&first.as_str())
}

/// Run one operator-supplied statement over the text protocol
pub async fn run_statement(pool: &MySqlPool, raw: &str) -> ActionResult<SqlRun> {
    let statement = prepare_statement(raw);
    if statement.trim().is_empty() {
        return Err(ActionError::field("statement", "The statement field is required."));
    }

    let result = if returns_rows(&statement) {
        let rows = pool.fetch_all(statement.as_str()).await?;
        let rows = rows.iter().map(row_to_json).collect::<Result<Vec<_>, _>>()?;
        SqlResult::Rows(rows)
    } else {
        let done = pool.execute(statement.as_str()).await?;
        SqlResult::Affected {
            rows_affected: done.rows_affected(),
        }
    };

    Ok(SqlRun { statement, result })
}
