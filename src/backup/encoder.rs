use std::fmt::Write;

use crate::database::SqlValue;

/// Render one value as a MySQL literal.
///
/// Text is escaped the way `mysql_real_escape_string` does it, which is
/// what the server's parser undoes on restore (assuming the default
/// `sql_mode` without NO_BACKSLASH_ESCAPES). Binary values become hex
/// literals so arbitrary bytes survive the round trip.
pub fn encode(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Bool(true) => "1".to_string(),
        SqlValue::Bool(false) => "0".to_string(),
        SqlValue::Text(text) => quote_text(text),
        SqlValue::Bytes(bytes) => hex_literal(bytes),
    }
}

pub fn quote_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\x1a' => out.push_str("\\Z"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

fn hex_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 3);
    out.push_str("X'");
    for byte in bytes {
        let _ = write!(out, "{:02X}", byte);
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_booleans() {
        assert_eq!(encode(&SqlValue::Null), "NULL");
        assert_eq!(encode(&SqlValue::Bool(true)), "1");
        assert_eq!(encode(&SqlValue::Bool(false)), "0");
    }

    #[test]
    fn escapes_quotes_backslashes_and_control_characters() {
        assert_eq!(encode(&SqlValue::Text("O'Reilly".into())), "'O\\'Reilly'");
        assert_eq!(encode(&SqlValue::Text("C:\\temp".into())), "'C:\\\\temp'");
        assert_eq!(encode(&SqlValue::Text("say \"hi\"".into())), "'say \\\"hi\\\"'");
        assert_eq!(encode(&SqlValue::Text("a\nb\rc\0d\x1a".into())), "'a\\nb\\rc\\0d\\Z'");
        assert_eq!(encode(&SqlValue::Text("héllo ✓".into())), "'héllo ✓'");
    }

    #[test]
    fn numbers_are_quoted_in_string_form() {
        assert_eq!(encode(&SqlValue::Text("42".into())), "'42'");
        assert_eq!(encode(&SqlValue::Text("".into())), "''");
    }

    #[test]
    fn binary_becomes_hex_literal() {
        assert_eq!(encode(&SqlValue::Bytes(vec![0x00, 0x27, 0xff])), "X'0027FF'");
        assert_eq!(encode(&SqlValue::Bytes(Vec::new())), "X''");
    }
}
