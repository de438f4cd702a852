//! Build-date guard: skip CI runs that already published today

use crate::core::error::{ReleaseResult, ResultExt};
use crate::utils::is_local_path;
use std::path::Path;
use std::process::Command;

/// True iff the remote marker equals today's date text
///
/// Surrounding whitespace (a marker file's trailing newline) is ignored.
pub fn should_skip(current_date: &str, remote_marker: Option<&str>) -> bool {
  remote_marker.is_some_and(|marker| marker.trim() == current_date.trim())
}

/// Read the marker from a local path or URL
///
/// A missing file or a failed download means "no marker".
pub fn fetch_marker(location: &str) -> ReleaseResult<Option<String>> {
  if is_local_path(location) {
    let path = Path::new(location);
    if !path.exists() {
      return Ok(None);
    }
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read marker {}", location))?;
    return Ok(Some(text));
  }

  let output = Command::new("curl")
    .args(["-fsSL", "--max-time", "30", location])
    .output()
    .context("Failed to run curl")?;

  if !output.status.success() {
    tracing::debug!(
      location,
      stderr = %String::from_utf8_lossy(&output.stderr).trim(),
      "marker unavailable"
    );
    return Ok(None);
  }

  Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
}
