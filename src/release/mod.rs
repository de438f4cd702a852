//! Release publication
//!
//! # Flow
//!
//! 1. **guard**: in CI, skip the run if the release repository's build-date
//!    marker already says today
//! 2. **repo**: record the build (marker + README commit, tag) and push
//! 3. **publisher**: create or edit the GitHub release, upload the archive
//!    with bounded retry, roll the repository back if publishing fails
//!
//! # Invariants
//!
//! - At most one archive is published per run
//! - A tag is never duplicated: an existing release is edited, not recreated
//! - A failed publish leaves the release repository as it was before the run

pub mod api;
pub mod guard;
pub mod naming;
pub mod publisher;
pub mod repo;

pub use api::{GithubReleaseCli, ReleaseApi, UploadOutcome};
pub use naming::ReleaseNames;
pub use publisher::{PublishReport, Publisher, RetryPolicy, ThreadSleeper};
pub use repo::ReleaseRepo;
