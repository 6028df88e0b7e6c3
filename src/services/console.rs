use serde::Serialize;
use std::path::PathBuf;

use super::process::{self, SHORT_TIMEOUT};
use crate::error::{ActionError, ActionResult};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleRun {
    pub command: String,
    pub exit_code: i32,
    pub output: String,
}

pub const MAINTENANCE_TASKS: &[&str] = &[
    "cache-clear",
    "config-clear",
    "config-cache",
    "queue-restart",
    "down",
    "up",
    "schedule-run",
];

/// Maintenance task name -> console command
pub fn maintenance_command(task: &str) -> Option<&'static str> {
    let command = match task {
        "cache-clear" => "cache:clear",
        "config-clear" => "config:clear",
        "config-cache" => "config:cache",
        "queue-restart" => "queue:restart",
        "down" => "down",
        "up" => "up",
        "schedule-run" => "schedule:run",
        _ => return None,
    };
    Some(command)
}

/// The framework's console, e.g. `php artisan`, run inside the project
#[derive(Debug, Clone)]
pub struct Console {
    command_line: Option<String>,
    working_dir: PathBuf,
}

impl Console {
    pub fn new(command_line: Option<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            command_line: command_line.filter(|c| !c.trim().is_empty()),
            working_dir: working_dir.into(),
        }
    }

    pub fn configured(&self) -> bool {
        self.command_line.is_some()
    }

    /// Run one console command. A non-zero exit is still a completed run;
    /// the exit code is part of the result.
    pub async fn run(&self, command: &str) -> ActionResult<ConsoleRun> {
        if command.trim().is_empty() {
            return Err(ActionError::field("command", "The command field is required."));
        }
        let command_line = self
            .command_line
            .as_deref()
            .ok_or_else(|| ActionError::external_tool("Console command is not configured. Please set COMMAND_CONSOLE."))?;

        let mut parts = command_line.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| ActionError::external_tool("Console command is empty."))?;
        let args: Vec<String> = parts
            .chain(command.split_whitespace())
            .map(str::to_string)
            .collect();

        let output = process::run(program, &args, &self.working_dir, &[], SHORT_TIMEOUT).await?;
        let mut text = output.stdout_text();
        let stderr = output.stderr_text();
        if !stderr.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&stderr);
        }

        Ok(ConsoleRun {
            command: command.trim().to_string(),
            exit_code: output.exit_code.unwrap_or(-1),
            output: text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_maintenance_tasks() {
        assert_eq!(maintenance_command("cache-clear"), Some("cache:clear"));
        assert_eq!(maintenance_command("schedule-run"), Some("schedule:run"));
        assert_eq!(maintenance_command("rm -rf"), None);
        assert!(MAINTENANCE_TASKS.iter().all(|task| maintenance_command(task).is_some()));
    }

    #[tokio::test]
    async fn unconfigured_console_is_a_tool_failure() {
        let console = Console::new(None, ".");
        let err = console.run("cache:clear").await.unwrap_err();
        assert_eq!(err.error_code(), "EXTERNAL_TOOL_FAILED");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn appends_command_words_and_reports_exit_code() {
        let console = Console::new(Some("echo artisan".to_string()), ".");
        let run = console.run("  migrate --force ").await.unwrap();
        assert_eq!(run.command, "migrate --force");
        assert_eq!(run.exit_code, 0);
        assert_eq!(run.output, "artisan migrate --force");

        let failing = Console::new(Some("false".to_string()), ".");
        let run = failing.run("migrate").await.unwrap();
        assert_eq!(run.exit_code, 1);
    }
}
