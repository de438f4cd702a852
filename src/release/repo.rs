//! Release repository bookkeeping
//!
//! Each run records one commit (build-date marker + README) and one tag in
//! the release repository and pushes both. The returned [`RecordedRelease`]
//! is the only handle that can undo that push.

use super::publisher::Rollback;
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use crate::core::vcs::SystemGit;
use std::path::Path;

const REMOTE: &str = "origin";

pub struct ReleaseRepo {
  git: SystemGit,
  branch: String,
  marker_file: String,
}

impl ReleaseRepo {
  /// Fresh clone of the release repository
  pub fn clone_fresh(remote_url: &str, branch: &str, workdir: &Path, marker_file: &str) -> ReleaseResult<Self> {
    let git = SystemGit::clone_repo(remote_url, branch, workdir)?;
    Ok(Self::from_git(git, branch, marker_file))
  }

  pub fn from_git(git: SystemGit, branch: &str, marker_file: &str) -> Self {
    Self {
      git,
      branch: branch.to_string(),
      marker_file: marker_file.to_string(),
    }
  }

  pub fn path(&self) -> &Path {
    self.git.path()
  }

  /// Write marker and README, commit, tag, and push branch and tag
  pub fn record(&self, readme: &str, marker: &str, tag: &str) -> ReleaseResult<RecordedRelease<'_>> {
    let root = self.git.path();
    std::fs::write(root.join(&self.marker_file), format!("{}\n", marker.trim()))
      .with_context(|| format!("Failed to write {}", self.marker_file))?;
    std::fs::write(root.join("README.md"), readme).context("Failed to write README.md")?;

    let previous_target = self.git.remote_tag_target(REMOTE, tag)?;
    if let Some(previous) = &previous_target {
      tracing::info!(tag, previous = %previous, "tag already exists on the remote, moving it");
    }

    self.git.add_all()?;
    let commit = self.git.commit(&format!("Release {}", tag))?;
    self.git.tag_force(tag)?;

    let recorded = RecordedRelease {
      repo: self,
      tag: tag.to_string(),
      commit,
      previous_target,
    };

    // A branch push that fails leaves nothing remote to undo beyond the local commit
    if let Err(err) = self.git.push(REMOTE, &self.branch, true) {
      recorded.undo_local()?;
      return Err(err);
    }
    if let Err(err) = self.git.push(REMOTE, &format!("refs/tags/{}", tag), true) {
      recorded.rollback().context("Rollback after failed tag push")?;
      return Err(err);
    }

    tracing::info!(tag, commit = %recorded.commit, "recorded release");
    Ok(recorded)
  }
}

/// A commit and tag pushed by this run
pub struct RecordedRelease<'a> {
  repo: &'a ReleaseRepo,
  pub tag: String,
  pub commit: String,
  /// Where the tag pointed on the remote before this run
  pub previous_target: Option<String>,
}

impl RecordedRelease<'_> {
  fn undo_local(&self) -> ReleaseResult<()> {
    let git = &self.repo.git;
    if git.commit_count()? < 2 {
      return Err(ReleaseError::message(format!(
        "Refusing to reset {}: it has no commit before the release commit",
        git.path().display()
      )));
    }
    git.delete_tag(&self.tag)?;
    git.reset_hard("HEAD~1")
  }
}

impl Rollback for RecordedRelease<'_> {
  /// Put the remote tag back (or delete it if this run created it), drop the
  /// release commit, force-push the branch
  fn rollback(&self) -> ReleaseResult<()> {
    let git = &self.repo.git;
    tracing::warn!(tag = %self.tag, commit = %self.commit, "rolling back release repository");

    match &self.previous_target {
      Some(previous) => git.restore_remote_tag(REMOTE, &self.tag, previous)?,
      None => git.delete_remote_tag(REMOTE, &self.tag)?,
    }
    self.undo_local()?;
    git.push(REMOTE, &self.repo.branch, true)
  }
}
