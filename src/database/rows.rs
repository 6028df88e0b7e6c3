use serde_json::{Map, Value};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo};

/// One column value as read from the server. Rows are fetched over the
/// text protocol, so every non-binary value arrives in its textual form.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Text(String),
    Bytes(Vec<u8>),
}

impl SqlValue {
    pub fn to_json(&self) -> Value {
        match self {
            SqlValue::Null => Value::Null,
            SqlValue::Bool(b) => Value::Bool(*b),
            SqlValue::Text(s) => Value::String(s.clone()),
            SqlValue::Bytes(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

const BINARY_TYPES: &[&str] = &[
    "BINARY",
    "VARBINARY",
    "TINYBLOB",
    "BLOB",
    "MEDIUMBLOB",
    "LONGBLOB",
    "BIT",
    "GEOMETRY",
];

pub fn column_names(row: &MySqlRow) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

/// Decode every column of `row`, in column order
pub fn decode_row(row: &MySqlRow) -> Result<Vec<SqlValue>, sqlx::Error> {
    (0..row.columns().len()).map(|i| decode_value(row, i)).collect()
}

fn decode_value(row: &MySqlRow, index: usize) -> Result<SqlValue, sqlx::Error> {
    let type_name = row.columns()[index].type_info().name().to_string();
    let raw: Option<Vec<u8>> = row.try_get_unchecked(index)?;
    Ok(classify(&type_name, raw))
}

fn classify(type_name: &str, raw: Option<Vec<u8>>) -> SqlValue {
    let Some(bytes) = raw else {
        return SqlValue::Null;
    };

    if BINARY_TYPES.contains(&type_name) {
        return SqlValue::Bytes(bytes);
    }

    if type_name == "BOOLEAN" {
        match bytes.as_slice() {
            b"1" => return SqlValue::Bool(true),
            b"0" => return SqlValue::Bool(false),
            _ => {}
        }
    }

    match String::from_utf8(bytes) {
        Ok(text) => SqlValue::Text(text),
        Err(e) => SqlValue::Bytes(e.into_bytes()),
    }
}

/// Row as a JSON object keyed by column name
pub fn row_to_json(row: &MySqlRow) -> Result<Map<String, Value>, sqlx::Error> {
    let names = column_names(row);
    let values = decode_row(row)?;
    Ok(names
        .into_iter()
        .zip(values.iter().map(SqlValue::to_json))
        .collect())
}
