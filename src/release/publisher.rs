//! Release publication with bounded upload retry and rollback
//!
//! ```text
//! release_exists(tag) ──yes──> edit_release ──┐
//!        │                                    ├──> upload (attempt 1..=max)
//!        └────no───> create_release ──────────┘        │
//!                                      success/exists ─┴─ failure x max ──> rollback
//! ```
//!
//! Any failure after the release repository was updated (API error or
//! exhausted uploads) rolls the repository back, so a tag never outlives a
//! failed publish.

use super::api::{ReleaseApi, UploadOutcome};
use crate::core::config::PublishConfig;
use crate::core::error::{PublishError, ReleaseError, ReleaseResult};
use crate::package::Artifact;
use serde::Serialize;
use std::time::Duration;

/// Blocking delay between upload attempts
pub trait Sleeper {
  fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
  fn sleep(&self, duration: Duration) {
    std::thread::sleep(duration);
  }
}

/// Undo whatever the run pushed before publishing
pub trait Rollback {
  fn rollback(&self) -> ReleaseResult<()>;
}

/// Attempt cap and fixed delay for uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  pub max_attempts: u32,
  pub delay: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 5,
      delay: Duration::from_secs(10),
    }
  }
}

impl RetryPolicy {
  pub fn from_config(config: &PublishConfig) -> Self {
    Self {
      // Zero attempts would publish nothing and still report success
      max_attempts: config.max_attempts.max(1),
      delay: config.retry_delay(),
    }
  }
}

/// Whether the release metadata was created or updated in place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseAction {
  Created,
  Edited,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadAttempt {
  pub attempt: u32,
  #[serde(flatten)]
  pub outcome: UploadOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
  pub tag: String,
  pub asset: String,
  pub action: ReleaseAction,
  pub attempts: Vec<UploadAttempt>,
}

pub struct Publisher<'a> {
  api: &'a dyn ReleaseApi,
  sleeper: &'a dyn Sleeper,
  policy: RetryPolicy,
}

impl<'a> Publisher<'a> {
  pub fn new(api: &'a dyn ReleaseApi, sleeper: &'a dyn Sleeper, policy: RetryPolicy) -> Self {
    Self { api, sleeper, policy }
  }

  /// Attach `artifact` to the release `tag`, rolling back on failure
  pub fn publish(
    &self,
    tag: &str,
    artifact: &Artifact,
    description: &str,
    rollback: &dyn Rollback,
  ) -> ReleaseResult<PublishReport> {
    match self.try_publish(tag, artifact, description) {
      Ok(report) => Ok(report),
      Err(err) => {
        tracing::error!(tag, error = %err, "publish failed, rolling back");
        match rollback.rollback() {
          Ok(()) => {
            tracing::info!(tag, "rollback complete");
            Err(err)
          }
          Err(rollback_err) => Err(ReleaseError::Publish(PublishError::RollbackFailed {
            publish_error: err.to_string(),
            rollback_error: rollback_err.to_string(),
          })),
        }
      }
    }
  }

  fn try_publish(&self, tag: &str, artifact: &Artifact, description: &str) -> ReleaseResult<PublishReport> {
    let action = if self.api.release_exists(tag)? {
      tracing::info!(tag, "release exists, editing");
      self.api.edit_release(tag, description)?;
      ReleaseAction::Edited
    } else {
      tracing::info!(tag, "creating release");
      self.api.create_release(tag, description)?;
      ReleaseAction::Created
    };

    let attempts = self.upload_with_retry(tag, artifact)?;

    Ok(PublishReport {
      tag: tag.to_string(),
      asset: artifact.name.clone(),
      action,
      attempts,
    })
  }

  /// Upload until success or "already exists", at most `max_attempts` times
  ///
  /// The first attempt never overwrites; retries replace the asset.
  pub fn upload_with_retry(&self, tag: &str, artifact: &Artifact) -> ReleaseResult<Vec<UploadAttempt>> {
    let mut attempts = Vec::new();
    let mut last_error = String::new();

    for attempt in 1..=self.policy.max_attempts {
      if attempt > 1 {
        self.sleeper.sleep(self.policy.delay);
      }

      let outcome = self.api.upload_asset(tag, &artifact.name, &artifact.path, attempt > 1);
      tracing::debug!(tag, attempt, ?outcome, "upload attempt finished");

      match &outcome {
        UploadOutcome::Success | UploadOutcome::Exists => {
          attempts.push(UploadAttempt { attempt, outcome });
          return Ok(attempts);
        }
        UploadOutcome::Failure(reason) => {
          tracing::warn!(
            tag,
            attempt,
            max = self.policy.max_attempts,
            reason = %reason,
            "upload failed"
          );
          last_error = reason.clone();
        }
      }
      attempts.push(UploadAttempt { attempt, outcome });
    }

    Err(ReleaseError::Publish(PublishError::RetriesExhausted {
      tag: tag.to_string(),
      attempts: self.policy.max_attempts,
      last_error,
    }))
  }
}
