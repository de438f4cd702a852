//! Tests for the `init` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_init_creates_config() -> Result<()> {
  let temp = tempfile::TempDir::new()?;

  run_release(temp.path(), &["init", "--product", "Neutron", "--repo", "acme/neutron-releases"])?;

  let config = std::fs::read_to_string(temp.path().join("release.toml"))?;
  assert!(config.contains("[product]"));
  assert!(config.contains("name = \"Neutron\""));
  assert!(config.contains("repo = \"acme/neutron-releases\""));
  assert!(config.contains("max_attempts = 5"));
  assert!(config.contains("retry_delay_secs = 10"));

  // The written file is loadable by the other commands
  let output = run_release(
    temp.path(),
    &["guard", "--date", "20261018", "--marker", "./no-such-marker", "--json"],
  )?;
  assert!(stdout(&output).contains("\"skip\": false"));

  Ok(())
}

#[test]
fn test_init_refuses_to_overwrite() -> Result<()> {
  let temp = tempfile::TempDir::new()?;
  run_release(temp.path(), &["init", "--product", "Foo", "--repo", "owner/repo"])?;

  let output = run_release_raw(temp.path(), &["init", "--product", "Bar", "--repo", "owner/repo"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("--force"));

  run_release(
    temp.path(),
    &["init", "--product", "Bar", "--repo", "owner/repo", "--force"],
  )?;
  let config = std::fs::read_to_string(temp.path().join("release.toml"))?;
  assert!(config.contains("name = \"Bar\""));

  Ok(())
}

#[test]
fn test_init_rejects_bad_repo() -> Result<()> {
  let temp = tempfile::TempDir::new()?;

  let output = run_release_raw(temp.path(), &["init", "--product", "Foo", "--repo", "not-a-slug"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(!temp.path().join("release.toml").exists());

  Ok(())
}

#[test]
fn test_missing_config_is_usage_error() -> Result<()> {
  let temp = tempfile::TempDir::new()?;

  let output = run_release_raw(temp.path(), &["guard"])?;
  assert_eq!(output.status.code(), Some(1));

  Ok(())
}
