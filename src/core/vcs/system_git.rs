//! System git backend
//!
//! Runs the `git` binary with an isolated environment:
//! - Clears environment variables, whitelists only PATH and HOME
//! - Adds safe configuration overrides
//! - Never logs credentials embedded in remote URLs

use crate::core::error::{GitError, ReleaseError, ReleaseResult, ResultExt};
use crate::utils::redact_url;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Identity used for commits made by the tool
#[derive(Debug, Clone)]
pub struct CommitIdentity {
  pub name: String,
  pub email: String,
}

impl Default for CommitIdentity {
  fn default() -> Self {
    Self {
      name: "toolchain-release".to_string(),
      email: "toolchain-release@users.noreply.github.com".to_string(),
    }
  }
}

/// Git backend using system git
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,

  pub(crate) identity: CommitIdentity,
}

impl SystemGit {
  /// Open an existing git repository
  pub fn open(path: &Path) -> ReleaseResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") || !path.exists() {
        return Err(ReleaseError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(ReleaseError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);

    Ok(Self {
      repo_path: PathBuf::from(stdout.trim()),
      identity: CommitIdentity::default(),
    })
  }

  /// Clone `url` at `branch` into `dest`
  ///
  /// A stale `dest` from an earlier run is removed first.
  pub fn clone_repo(url: &str, branch: &str, dest: &Path) -> ReleaseResult<Self> {
    if dest.exists() {
      tracing::debug!(path = %dest.display(), "removing stale clone");
      std::fs::remove_dir_all(dest).with_context(|| format!("Failed to remove {}", dest.display()))?;
    }

    tracing::info!(remote = %redact_url(url), branch, "cloning release repository");

    let mut cmd = isolated_git();
    cmd.args(["clone", "--single-branch", "--branch", branch, url]).arg(dest);
    let output = cmd.output().context("Failed to run git clone")?;

    if !output.status.success() {
      return Err(ReleaseError::Git(GitError::CommandFailed {
        command: format!("git clone {}", redact_url(url)),
        stderr: redact_url(&String::from_utf8_lossy(&output.stderr)),
      }));
    }

    Self::open(dest)
  }

  pub fn path(&self) -> &Path {
    &self.repo_path
  }

  /// Get HEAD commit SHA
  pub fn head_commit(&self) -> ReleaseResult<String> {
    let output = self.run(&["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Create a safe git command with isolated environment, rooted at the repo
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = isolated_git();
    cmd.arg("-C").arg(&self.repo_path);
    cmd
  }

  /// Run a git command and fail on non-zero exit
  pub(crate) fn run(&self, args: &[&str]) -> ReleaseResult<Output> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.first().copied().unwrap_or_default()))?;

    if !output.status.success() {
      return Err(ReleaseError::Git(GitError::CommandFailed {
        command: redact_url(&format!("git {}", args.join(" "))),
        stderr: redact_url(&String::from_utf8_lossy(&output.stderr)),
      }));
    }

    Ok(output)
  }
}

fn isolated_git() -> Command {
  let mut cmd = Command::new("git");

  // Isolated environment (don't trust global config)
  cmd.env_clear();
  if let Ok(path) = std::env::var("PATH") {
    cmd.env("PATH", path);
  }
  if let Ok(home) = std::env::var("HOME") {
    cmd.env("HOME", home);
  }
  cmd.env("GIT_TERMINAL_PROMPT", "0");

  // Force safe behavior (override user config)
  cmd.arg("-c").arg("advice.detachedHead=false");
  cmd.arg("-c").arg("core.quotePath=false");

  cmd
}
