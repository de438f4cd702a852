//! Write operations for SystemGit (commit, tag, push, reset)

use super::system_git::SystemGit;
use crate::core::error::{GitError, ReleaseError, ReleaseResult, ResultExt};
use crate::utils::redact_url;

impl SystemGit {
  /// Stage everything in the working tree
  pub fn add_all(&self) -> ReleaseResult<()> {
    self.run(&["add", "-A"])?;
    Ok(())
  }

  /// Commit staged changes with the configured identity
  ///
  /// `--allow-empty` keeps re-runs with identical metadata producing exactly
  /// one commit, so a rollback always has one commit to remove.
  pub fn commit(&self, message: &str) -> ReleaseResult<String> {
    let name = format!("user.name={}", self.identity.name);
    let email = format!("user.email={}", self.identity.email);
    self.run(&[
      "-c",
      &name,
      "-c",
      &email,
      "commit",
      "--allow-empty",
      "--no-gpg-sign",
      "-m",
      message,
    ])?;
    self.head_commit()
  }

  /// Create or move a lightweight tag to HEAD
  pub fn tag_force(&self, tag: &str) -> ReleaseResult<()> {
    self.run(&["tag", "-f", tag])?;
    Ok(())
  }

  /// Delete a local tag (missing tags are not an error)
  pub fn delete_tag(&self, tag: &str) -> ReleaseResult<()> {
    let output = self
      .git_cmd()
      .args(["tag", "-d", tag])
      .output()
      .context("Failed to delete tag")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not found") {
        return Ok(());
      }
      return Err(ReleaseError::Git(GitError::CommandFailed {
        command: format!("git tag -d {}", tag),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Push a refspec to a remote, optionally forced
  pub fn push(&self, remote: &str, refspec: &str, force: bool) -> ReleaseResult<()> {
    let mut cmd = self.git_cmd();
    cmd.arg("push");
    if force {
      cmd.arg("--force");
    }
    cmd.args([remote, refspec]);

    let output = cmd.output().context("Failed to push")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ReleaseError::Git(GitError::PushFailed {
        remote: remote.to_string(),
        refspec: refspec.to_string(),
        reason: redact_url(&stderr),
      }));
    }

    tracing::info!(remote, refspec, force, "pushed");
    Ok(())
  }

  /// Delete a tag on the remote
  pub fn delete_remote_tag(&self, remote: &str, tag: &str) -> ReleaseResult<()> {
    self.push(remote, &format!(":refs/tags/{}", tag), false)
  }

  /// Commit a remote tag points at, if the tag exists there
  ///
  /// The tag's objects are fetched so the commit can be pushed back later.
  pub fn remote_tag_target(&self, remote: &str, tag: &str) -> ReleaseResult<Option<String>> {
    let refname = format!("refs/tags/{}", tag);
    let output = self.run(&["ls-remote", remote, &refname])?;
    let listing = String::from_utf8_lossy(&output.stdout);
    let target = listing.lines().find_map(|line| {
      let (sha, name) = line.split_once('\t')?;
      (name.trim() == refname).then(|| sha.trim().to_string())
    });

    if target.is_some() {
      self.run(&["fetch", "--no-tags", remote, &refname])?;
    }
    Ok(target)
  }

  /// Force a remote tag back to `commit`
  pub fn restore_remote_tag(&self, remote: &str, tag: &str, commit: &str) -> ReleaseResult<()> {
    self.push(remote, &format!("{}:refs/tags/{}", commit, tag), true)
  }

  /// Hard reset the current branch to `rev`
  pub fn reset_hard(&self, rev: &str) -> ReleaseResult<()> {
    self.run(&["reset", "--hard", rev])?;
    Ok(())
  }

  /// Count commits reachable from HEAD
  pub fn commit_count(&self) -> ReleaseResult<usize> {
    let output = self.run(&["rev-list", "--count", "HEAD"])?;
    let count = String::from_utf8_lossy(&output.stdout)
      .trim()
      .parse::<usize>()
      .map_err(|e| ReleaseError::message(format!("Unexpected rev-list output: {}", e)))?;
    Ok(count)
  }
}
