//! Tests for the `guard` command and the CI guard in `run`

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_guard_marker_matches_today() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let marker = workspace.path.join("build-date");
  std::fs::write(&marker, "20261018\n")?;

  let output = run_release(
    &workspace.path,
    &["guard", "--date", "20261018", "--marker", marker.to_str().unwrap(), "--json"],
  )?;
  let decision: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(decision["skip"], true);
  assert_eq!(decision["marker"], "20261018");

  Ok(())
}

#[test]
fn test_guard_older_marker_builds() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  std::fs::write(workspace.path.join("build-date"), "20261017\n")?;

  let output = run_release(
    &workspace.path,
    &["guard", "--date", "20261018", "--marker", "./build-date", "--json"],
  )?;
  let decision: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(decision["skip"], false);

  Ok(())
}

#[test]
fn test_guard_missing_marker_builds() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_release(
    &workspace.path,
    &["guard", "--date", "20261018", "--marker", "./build-date", "--json"],
  )?;
  let decision: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(decision["skip"], false);
  assert!(decision["marker"].is_null());

  Ok(())
}

#[test]
fn test_guard_uses_configured_marker() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  std::fs::write(workspace.path.join("marker.txt"), "20261018")?;
  let config = std::fs::read_to_string(workspace.path.join("release.toml"))?
    .replace("[release]\n", "[release]\nmarker_url = \"./marker.txt\"\n");
  std::fs::write(workspace.path.join("release.toml"), config)?;

  let output = run_release(&workspace.path, &["guard", "--date", "20261018"])?;
  assert!(stdout(&output).contains("skip"));

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_ci_run_skips_when_already_built_today() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.fake_release_tool(false, "exit 0")?;
  workspace.fake_install("1.0.0")?;

  // Ask the tool for today's date text in the configured timezone
  let output = run_release(&workspace.path, &["guard", "--marker", "./build-date", "--json"])?;
  let decision: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  let today = decision["current"].as_str().unwrap().to_string();
  std::fs::write(workspace.path.join("build-date"), format!("{}\n", today))?;

  let config = std::fs::read_to_string(workspace.path.join("release.toml"))?
    .replace("[release]\n", "[release]\nmarker_url = \"./build-date\"\n");
  std::fs::write(workspace.path.join("release.toml"), config)?;

  let output = run_release(&workspace.path, &["run", "--ci", "--skip-build"])?;
  assert!(stdout(&output).contains("nothing to do"));
  assert!(workspace.tool_calls()?.is_empty());
  assert!(workspace.remote_tags()?.is_empty());

  Ok(())
}
