use serde::Serialize;
use std::path::PathBuf;

use super::process::{self, SHORT_TIMEOUT};
use crate::error::{ActionError, ActionResult};

pub const GIT_ACTIONS: &[&str] = &["status", "fetch", "pull"];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GitRun {
    pub action: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum GitInfo {
    Repository {
        branch: String,
        head: String,
        status: String,
        #[serde(rename = "latest")]
        latest_commit: String,
    },
    Unavailable {
        error: String,
    },
}

/// Git in the project working tree
#[derive(Debug, Clone)]
pub struct Git {
    working_dir: PathBuf,
    default_branch: String,
}

impl Git {
    pub fn new(working_dir: impl Into<PathBuf>, default_branch: impl Into<String>) -> Self {
        Self {
            working_dir: working_dir.into(),
            default_branch: default_branch.into(),
        }
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    fn arguments(&self, action: &str, branch: Option<&str>) -> ActionResult<Vec<String>> {
        let args: Vec<&str> = match action {
            "status" => vec!["status", "-sb"],
            "fetch" => vec!["fetch", "--all"],
            "pull" => {
                let branch = branch.filter(|b| !b.trim().is_empty()).unwrap_or(self.default_branch.as_str());
                // a leading dash would be read as an option
                if branch.starts_with('-') {
                    return Err(ActionError::field("branch", "The branch field format is invalid."));
                }
                vec!["pull", "origin", branch]
            }
            other => return Err(ActionError::field("action", format!("Unsupported git action '{}'.", other))),
        };
        Ok(args.into_iter().map(str::to_string).collect())
    }

    pub async fn run_action(&self, action: &str, branch: Option<&str>) -> ActionResult<GitRun> {
        let args = self.arguments(action, branch)?;
        let output = self.git(&args).await?;
        Ok(GitRun {
            action: action.to_string(),
            output,
        })
    }

    /// Branch, head, status and latest commit; failures are reported in
    /// the result instead of as an error.
    pub async fn info(&self) -> GitInfo {
        match self.collect_info().await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!("Unable to read git info: {}", e);
                GitInfo::Unavailable { error: e.to_string() }
            }
        }
    }

    async fn collect_info(&self) -> ActionResult<GitInfo> {
        let branch = self.git(&strings(&["rev-parse", "--abbrev-ref", "HEAD"])).await?;
        let head = self.git(&strings(&["rev-parse", "HEAD"])).await?;
        let status = self.git(&strings(&["status", "-sb"])).await?;
        let latest_commit = self.git(&strings(&["log", "-1", "--pretty=%h %s (%cr)"])).await?;
        Ok(GitInfo::Repository {
            branch,
            head,
            status,
            latest_commit,
        })
    }

    async fn git(&self, args: &[String]) -> ActionResult<String> {
        let output = process::run("git", args, &self.working_dir, &[], SHORT_TIMEOUT)
            .await?
            .check("git")?;
        Ok(output.stdout_text())
    }
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}
