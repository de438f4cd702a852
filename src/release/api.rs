//! Remote release API
//!
//! [`ReleaseApi`] is the seam the publisher drives. [`GithubReleaseCli`]
//! implements it over the `github-release` tool.

use crate::core::config::PublishConfig;
use crate::core::error::{PublishError, ReleaseError, ReleaseResult};
use serde::Serialize;
use std::path::Path;
use std::process::{Command, Output};

/// Result of a single upload attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "lowercase")]
pub enum UploadOutcome {
  Success,
  /// The asset is already attached to the release
  Exists,
  /// Anything else; worth retrying
  Failure(String),
}

/// Operations on releases of one repository
pub trait ReleaseApi {
  fn release_exists(&self, tag: &str) -> ReleaseResult<bool>;

  fn create_release(&self, tag: &str, description: &str) -> ReleaseResult<()>;

  fn edit_release(&self, tag: &str, description: &str) -> ReleaseResult<()>;

  /// Upload `path` as asset `name`; `overwrite` replaces an existing asset
  fn upload_asset(&self, tag: &str, name: &str, path: &Path, overwrite: bool) -> UploadOutcome;
}

/// `github-release` command line client
pub struct GithubReleaseCli {
  tool: String,
  owner: String,
  repo: String,
  token: String,
}

impl GithubReleaseCli {
  pub fn new(config: &PublishConfig, token: &str) -> ReleaseResult<Self> {
    let (owner, repo) = config.owner_and_name()?;
    Ok(Self {
      tool: config.tool.clone(),
      owner: owner.to_string(),
      repo: repo.to_string(),
      token: token.to_string(),
    })
  }

  fn command(&self, subcommand: &str, tag: &str) -> Command {
    let mut cmd = Command::new(&self.tool);
    cmd
      .env("GITHUB_TOKEN", &self.token)
      .arg(subcommand)
      .args(["--user", &self.owner, "--repo", &self.repo, "--tag", tag]);
    cmd
  }

  fn run(&self, operation: &str, mut cmd: Command) -> ReleaseResult<Output> {
    tracing::debug!(operation, tool = %self.tool, "invoking release tool");
    cmd.output().map_err(|e| {
      ReleaseError::Publish(PublishError::Api {
        operation: operation.to_string(),
        stderr: format!("failed to run {}: {}", self.tool, e),
      })
    })
  }

  fn run_checked(&self, operation: &str, cmd: Command) -> ReleaseResult<()> {
    let output = self.run(operation, cmd)?;
    if !output.status.success() {
      return Err(ReleaseError::Publish(PublishError::Api {
        operation: operation.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }
    Ok(())
  }

  fn release_command(&self, subcommand: &str, tag: &str, description: &str) -> Command {
    let mut cmd = self.command(subcommand, tag);
    cmd.args(["--name", tag, "--description", description]);
    cmd
  }
}

impl ReleaseApi for GithubReleaseCli {
  fn release_exists(&self, tag: &str) -> ReleaseResult<bool> {
    let output = self.run("info", self.command("info", tag))?;
    classify_info(output.status.success(), &String::from_utf8_lossy(&output.stderr))
  }

  fn create_release(&self, tag: &str, description: &str) -> ReleaseResult<()> {
    self.run_checked("release", self.release_command("release", tag, description))
  }

  fn edit_release(&self, tag: &str, description: &str) -> ReleaseResult<()> {
    self.run_checked("edit", self.release_command("edit", tag, description))
  }

  fn upload_asset(&self, tag: &str, name: &str, path: &Path, overwrite: bool) -> UploadOutcome {
    let mut cmd = self.command("upload", tag);
    cmd.args(["--name", name]).arg("--file").arg(path);
    if overwrite {
      cmd.arg("--replace");
    }

    match cmd.output() {
      Ok(output) => classify_upload(output.status.success(), &String::from_utf8_lossy(&output.stderr)),
      Err(e) => UploadOutcome::Failure(format!("failed to run {}: {}", self.tool, e)),
    }
  }
}

/// Interpret `github-release info` exit status and stderr
fn classify_info(success: bool, stderr: &str) -> ReleaseResult<bool> {
  if success {
    return Ok(true);
  }
  let lowered = stderr.to_ascii_lowercase();
  if lowered.contains("could not find the release") || lowered.contains("404") {
    return Ok(false);
  }
  Err(ReleaseError::Publish(PublishError::Api {
    operation: "info".to_string(),
    stderr: stderr.to_string(),
  }))
}

/// Interpret `github-release upload` exit status and stderr
fn classify_upload(success: bool, stderr: &str) -> UploadOutcome {
  if success {
    UploadOutcome::Success
  } else if stderr.contains("already_exists") {
    UploadOutcome::Exists
  } else {
    let reason = stderr.trim();
    UploadOutcome::Failure(if reason.is_empty() {
      "upload failed without output".to_string()
    } else {
      reason.to_string()
    })
  }
}
