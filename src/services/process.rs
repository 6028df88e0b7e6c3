use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error::{ActionError, ActionResult};

/// Bound for short commands (git, console)
pub const SHORT_TIMEOUT: Duration = Duration::from_secs(60);
/// Bound for the external dump tool
pub const DUMP_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }

    /// Turn a non-zero exit into `ExternalToolFailed`
    pub fn check(self, program: &str) -> ActionResult<Self> {
        if self.success() {
            return Ok(self);
        }
        let detail = match self.stderr_text() {
            s if !s.is_empty() => s,
            _ => self.stdout_text(),
        };
        Err(ActionError::external_tool(format!(
            "{} exited with status {}: {}",
            program,
            self.exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
            detail
        )))
    }
}

/// Run `program` to completion. Spawn failures and timeouts are
/// `ExternalToolFailed`; a timed-out child is killed. The exit status is
/// left for the caller to judge.
pub async fn run(
    program: &str,
    args: &[String],
    working_dir: &Path,
    envs: &[(&str, &str)],
    timeout: Duration,
) -> ActionResult<ProcessOutput> {
    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for (key, value) in envs {
        command.env(key, value);
    }

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Err(ActionError::external_tool(format!("failed to start {}: {}", program, e))),
        Err(_) => {
            return Err(ActionError::external_tool(format!(
                "{} timed out after {}s",
                program,
                timeout.as_secs()
            )))
        }
    };

    Ok(ProcessOutput {
        exit_code: output.status.code(),
        stdout: output.stdout,
        stderr: output.stderr,
    })
}
