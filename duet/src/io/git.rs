//! Git introspection for project prompts.
//!
//! Read-only: the assistant reports repository state to the models and the
//! user but never mutates it. Every call goes through the bounded process
//! helper so a hung git invocation cannot stall a query.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::debug;

use crate::io::process::run_command_with_timeout;

const GIT_TIMEOUT: Duration = Duration::from_secs(30);
const GIT_OUTPUT_LIMIT: usize = 100_000;

/// Snapshot of repository state, consumed only as opaque summary text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitInfo {
    pub is_repo: bool,
    pub branch: Option<String>,
    pub recent_commits: Vec<String>,
    pub has_changes: bool,
}

impl GitInfo {
    /// Render as one opaque block for prompts and `show files`.
    pub fn summary(&self) -> String {
        if !self.is_repo {
            return "not a git repository".to_string();
        }
        let mut buf = String::new();
        buf.push_str(&format!(
            "branch: {}\n",
            self.branch.as_deref().unwrap_or("(detached)")
        ));
        buf.push_str(&format!(
            "dirty: {}\n",
            if self.has_changes { "yes" } else { "no" }
        ));
        if !self.recent_commits.is_empty() {
            buf.push_str("recent commits:\n");
            for line in &self.recent_commits {
                buf.push_str(&format!("  {line}\n"));
            }
        }
        buf
    }
}

/// Wrapper for read-only git queries in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// Collect branch, recent commits, and dirty state.
    ///
    /// A directory that is not a repository (or a broken git install)
    /// degrades to `is_repo = false` rather than erroring.
    pub fn info(&self) -> GitInfo {
        if !self.workdir.join(".git").exists() {
            return GitInfo::default();
        }

        let branch = self
            .run_capture(&["branch", "--show-current"])
            .map(|out| out.trim().to_string())
            .ok()
            .filter(|name| !name.is_empty());
        let recent_commits = self
            .run_capture(&["log", "--oneline", "-5"])
            .map(|out| out.lines().map(str::to_string).collect())
            .unwrap_or_default();
        let has_changes = self
            .run_capture(&["status", "--porcelain"])
            .map(|out| !out.trim().is_empty())
            .unwrap_or(false);

        debug!(?branch, has_changes, "collected git info");
        GitInfo {
            is_repo: true,
            branch,
            recent_commits,
            has_changes,
        }
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.workdir);
        let output = run_command_with_timeout(cmd, GIT_TIMEOUT, GIT_OUTPUT_LIMIT)?;
        if output.timed_out {
            return Err(anyhow!("git {} timed out", args.join(" ")));
        }
        if !output.status.success() {
            return Err(anyhow!(
                "git {} failed: {}",
                args.join(" "),
                output.stderr.trim()
            ));
        }
        Ok(output.stdout)
    }
}
