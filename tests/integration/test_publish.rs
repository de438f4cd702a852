//! Tests for the `publish` command against a fake `github-release`
//!
//! The release remote is a real bare git repository, so rollback is checked
//! on the tags and commits that actually reached it.

#![cfg(unix)]

use crate::helpers::*;
use anyhow::Result;

const ARCHIVE: &str = "Foo-1.0.0.tar.gz";
const TAG: &str = "Foo-1.0.0-release";

#[test]
fn test_new_release_is_created_and_uploaded_once() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.fake_release_tool(false, "exit 0")?;
  workspace.archive(ARCHIVE)?;

  let output = run_release(&workspace.path, &["publish", "--archive", ARCHIVE, "--json"])?;
  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(report["tag"], TAG);
  assert_eq!(report["action"], "created");
  assert_eq!(report["attempts"].as_array().map(Vec::len), Some(1));

  assert_eq!(workspace.calls_to("release")?, 1);
  assert_eq!(workspace.calls_to("edit")?, 0);
  assert_eq!(workspace.calls_to("upload")?, 1);
  // First upload never replaces
  assert!(!workspace.tool_calls()?.iter().any(|c| c.contains("--replace")));

  assert_eq!(workspace.remote_tags()?, vec![TAG.to_string()]);
  assert_eq!(workspace.remote_log()?, vec![format!("Release {}", TAG), "Initial commit".to_string()]);

  Ok(())
}

#[test]
fn test_existing_release_is_edited() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.fake_release_tool(true, "exit 0")?;
  workspace.archive(ARCHIVE)?;

  let output = run_release(
    &workspace.path,
    &["publish", "--archive", ARCHIVE, "--description", "nightly", "--json"],
  )?;
  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(report["action"], "edited");
  assert_eq!(workspace.calls_to("edit")?, 1);
  assert_eq!(workspace.calls_to("release")?, 0);
  assert!(workspace.remote_file("README.md")?.contains("nightly"));

  Ok(())
}

#[test]
fn test_already_exists_on_second_attempt_stops() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.fake_release_tool(
    false,
    r#"if [ "$n" -ge 2 ]; then echo 'error: already_exists' >&2; else echo 'error: 502 Bad Gateway' >&2; fi; exit 1"#,
  )?;
  workspace.archive(ARCHIVE)?;

  let output = run_release(&workspace.path, &["publish", "--archive", ARCHIVE, "--json"])?;
  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(report["attempts"][0]["outcome"], "failure");
  assert_eq!(report["attempts"][1]["outcome"], "exists");
  assert_eq!(workspace.calls_to("upload")?, 2);
  // The retry replaces
  let uploads: Vec<_> = workspace
    .tool_calls()?
    .into_iter()
    .filter(|c| c.starts_with("upload"))
    .collect();
  assert!(uploads[1].contains("--replace"));
  assert_eq!(workspace.remote_tags()?, vec![TAG.to_string()]);

  Ok(())
}

#[test]
fn test_exhausted_uploads_roll_back() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.fake_release_tool(false, "echo 'error: 502 Bad Gateway' >&2; exit 1")?;
  workspace.archive(ARCHIVE)?;

  let output = run_release_raw(&workspace.path, &["publish", "--archive", ARCHIVE])?;

  assert_eq!(output.status.code(), Some(4));
  assert!(String::from_utf8_lossy(&output.stderr).contains("5 attempt"));
  assert_eq!(workspace.calls_to("upload")?, 5);

  // Remote is back where it started
  assert!(workspace.remote_tags()?.is_empty());
  assert_eq!(workspace.remote_log()?, vec!["Initial commit".to_string()]);

  Ok(())
}

#[test]
fn test_attempt_cap_is_configurable() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let config = std::fs::read_to_string(workspace.path.join("release.toml"))?
    .replace("retry_delay_secs = 0\n", "retry_delay_secs = 0\nmax_attempts = 2\n");
  std::fs::write(workspace.path.join("release.toml"), config)?;
  workspace.fake_release_tool(false, "echo 'error: timeout' >&2; exit 1")?;
  workspace.archive(ARCHIVE)?;

  let output = run_release_raw(&workspace.path, &["publish", "--archive", ARCHIVE])?;

  assert_eq!(output.status.code(), Some(4));
  assert_eq!(workspace.calls_to("upload")?, 2);
  assert!(workspace.remote_tags()?.is_empty());

  Ok(())
}

#[test]
fn test_create_failure_rolls_back_without_upload() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.fake_release_tool(false, "exit 0")?;
  // Break `release` by rewriting the fake tool's dispatch
  let script = std::fs::read_to_string(workspace.tool_path())?.replace(
    "release|edit) exit 0 ;;",
    "release|edit) echo 'error: 422 Validation Failed' >&2; exit 1 ;;",
  );
  write_executable(&workspace.tool_path(), &script)?;
  workspace.archive(ARCHIVE)?;

  let output = run_release_raw(&workspace.path, &["publish", "--archive", ARCHIVE])?;

  assert_eq!(output.status.code(), Some(4));
  assert_eq!(workspace.calls_to("upload")?, 0);
  assert!(workspace.remote_tags()?.is_empty());
  assert_eq!(workspace.remote_log()?.len(), 1);

  Ok(())
}

#[test]
fn test_republish_same_tag_edits() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.fake_release_tool(false, "exit 0")?;
  workspace.archive(ARCHIVE)?;
  run_release(&workspace.path, &["publish", "--archive", ARCHIVE])?;

  workspace.fake_release_tool(true, "exit 0")?;
  run_release(&workspace.path, &["publish", "--archive", ARCHIVE])?;

  assert_eq!(workspace.calls_to("release")?, 1);
  assert_eq!(workspace.calls_to("edit")?, 1);
  assert_eq!(workspace.remote_tags()?, vec![TAG.to_string()]);
  assert_eq!(workspace.remote_log()?.len(), 3);

  Ok(())
}

#[test]
fn test_missing_token_is_config_error() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.fake_release_tool(false, "exit 0")?;
  workspace.archive(ARCHIVE)?;

  let output = std::process::Command::new(env!("CARGO_BIN_EXE_toolchain-release"))
    .current_dir(&workspace.path)
    .args(["publish", "--archive", ARCHIVE])
    .env_remove("GITHUB_TOKEN")
    .env_remove("CI")
    .output()?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("GITHUB_TOKEN"));
  assert!(workspace.tool_calls()?.is_empty());
  assert_eq!(workspace.remote_log()?.len(), 1);

  Ok(())
}

#[test]
fn test_unknown_archive_name_needs_tag() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.fake_release_tool(false, "exit 0")?;
  workspace.archive("toolchain.zip")?;

  let output = run_release_raw(&workspace.path, &["publish", "--archive", "toolchain.zip"])?;
  assert_eq!(output.status.code(), Some(1));

  run_release(
    &workspace.path,
    &["publish", "--archive", "toolchain.zip", "--tag", "custom-release"],
  )?;
  assert_eq!(workspace.remote_tags()?, vec!["custom-release".to_string()]);

  Ok(())
}
