//! Tests for the `package` command

use crate::helpers::*;
use anyhow::Result;
use flate2::read::GzDecoder;
use std::fs::File;

fn archive_entries(path: &std::path::Path) -> Result<Vec<String>> {
  let mut archive = tar::Archive::new(GzDecoder::new(File::open(path)?));
  let mut names = Vec::new();
  for entry in archive.entries()? {
    names.push(entry?.path()?.to_string_lossy().to_string());
  }
  Ok(names)
}

#[cfg(unix)]
#[test]
fn test_package_reads_version_from_clang() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let install = workspace.fake_install("18.0.0")?;

  let output = run_release(&workspace.path, &["package", "--json"])?;
  let summary: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(summary["names"]["archive"], "Foo-18.0.0.tar.gz");
  assert_eq!(summary["names"]["tag"], "Foo-18.0.0-release");
  assert_eq!(
    summary["metadata"]["source_commit"],
    "0123456789abcdef0123456789abcdef01234567"
  );

  let archive = workspace.path.join("Foo-18.0.0.tar.gz");
  assert!(archive.exists());
  assert_eq!(summary["artifact"]["size_bytes"], std::fs::metadata(&archive)?.len());

  // Dev-only files are pruned before archiving
  assert!(!install.join("include").exists());
  assert!(!install.join("lib/libLLVM.a").exists());

  let entries = archive_entries(&archive)?;
  assert!(entries.iter().any(|e| e.trim_end_matches('/') == "bin/clang"));
  assert!(entries.iter().any(|e| e == "lib/clang/resource.txt"));
  assert!(!entries.iter().any(|e| e.starts_with("include")));
  assert!(!entries.iter().any(|e| e.starts_with('/')));

  Ok(())
}

#[test]
fn test_package_with_explicit_version() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let install = workspace.path.join("prefix");
  std::fs::create_dir_all(install.join("bin"))?;
  std::fs::write(install.join("bin/README"), "not a binary\n")?;

  let output = run_release(
    &workspace.path,
    &[
      "package",
      "--install-dir",
      "prefix",
      "--clang-version",
      "1.0.0",
      "--commit",
      "abc123",
    ],
  )?;

  let text = stdout(&output);
  assert!(text.contains("Foo-1.0.0.tar.gz"));
  assert!(text.contains("Foo-1.0.0-release"));
  assert!(workspace.path.join("Foo-1.0.0.tar.gz").exists());

  Ok(())
}

#[test]
fn test_package_empty_install_dir_fails() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  std::fs::create_dir_all(workspace.path.join("install"))?;

  let output = run_release_raw(&workspace.path, &["package", "--clang-version", "1.0.0"])?;
  assert_eq!(output.status.code(), Some(3));

  Ok(())
}
