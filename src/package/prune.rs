//! Removal of development-only files before archiving

use crate::core::error::{ReleaseResult, ResultExt};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Delete everything under `root` matching the glob `patterns`
///
/// All matches are collected before anything is deleted. A match inside a
/// directory that was already removed is skipped. Returns the removed paths
/// relative to `root`, parents before children.
pub fn prune(root: &Path, patterns: &[String]) -> ReleaseResult<Vec<PathBuf>> {
  let mut matches = BTreeSet::new();
  for pattern in patterns {
    let full = format!("{}/{}", glob::Pattern::escape(&root.to_string_lossy()), pattern);
    for entry in glob::glob(&full)? {
      matches.insert(entry?);
    }
  }

  let mut removed: Vec<PathBuf> = Vec::new();
  for path in matches {
    let relative = path.strip_prefix(root)?.to_path_buf();
    if relative.as_os_str().is_empty() || removed.iter().any(|done| relative.starts_with(done)) {
      continue;
    }

    let meta = std::fs::symlink_metadata(&path).with_context(|| format!("Failed to inspect {}", path.display()))?;
    if meta.is_dir() {
      std::fs::remove_dir_all(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
    } else {
      std::fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    tracing::debug!(path = %path.display(), "pruned");
    removed.push(relative);
  }

  Ok(removed)
}
