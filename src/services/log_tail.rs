use serde::Serialize;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{ActionError, ActionResult};

pub const DEFAULT_LINES: usize = 200;
pub const MAX_LINES: usize = 500;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LogTail {
    pub lines: usize,
    pub content: String,
}

/// Last `lines` lines of the log, joined with `\n`
pub fn tail(path: &Path, lines: usize) -> ActionResult<LogTail> {
    if !path.is_file() {
        return Err(ActionError::not_found("Log file not found."));
    }

    let reader = BufReader::new(std::fs::File::open(path)?);
    let mut window: VecDeque<String> = VecDeque::with_capacity(lines.min(MAX_LINES));

    for line in reader.split(b'\n') {
        let line = line?;
        if window.len() == lines {
            window.pop_front();
        }
        let text = String::from_utf8_lossy(&line);
        window.push_back(text.trim_end_matches('\r').to_string());
    }

    Ok(LogTail {
        lines,
        content: window.into_iter().collect::<Vec<_>>().join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn keeps_only_the_last_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let content: String = (1..=10).map(|i| format!("line {}\r\n", i)).collect();
        std::fs::write(&path, content).unwrap();

        let tail = tail(&path, 3).unwrap();
        assert_eq!(tail.content, "line 8\nline 9\nline 10");
        assert_eq!(tail.lines, 3);
    }

    #[test]
    fn short_files_are_returned_whole() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "only\nline two").unwrap();
        assert_eq!(tail(&path, DEFAULT_LINES).unwrap().content, "only\nline two");
    }

    #[test]
    fn missing_log_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = tail(&dir.path().join("nope.log"), 10).unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.to_string(), "Log file not found.");
    }
}
