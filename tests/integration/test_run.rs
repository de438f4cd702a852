//! Tests for the full `run` pipeline

#![cfg(unix)]

use crate::helpers::*;
use anyhow::Result;

/// Build scripts that "install" a clang and an ld into --install-folder
fn fake_build_scripts(workspace: &TestWorkspace) -> Result<()> {
  write_executable(
    &workspace.path.join("build-llvm.py"),
    r#"#!/bin/sh
echo "llvm $@"
while [ $# -gt 0 ]; do
  [ "$1" = "--install-folder" ] && install="$2"
  shift
done
mkdir -p "$install/bin" "$install/include"
printf '#!/bin/sh\necho "Foo clang version 19.0.0git (https://github.com/llvm/llvm-project fedcba9876543210fedcba9876543210fedcba98)"\n' > "$install/bin/clang"
chmod +x "$install/bin/clang"
echo '#define LLVM 1' > "$install/include/llvm.h"
"#,
  )?;
  write_executable(
    &workspace.path.join("build-binutils.py"),
    r#"#!/bin/sh
echo "binutils $@"
for a; do install="$a"; done
printf '#!/bin/sh\necho "GNU ld (GNU Binutils) 2.41"\n' > "$install/bin/ld"
chmod +x "$install/bin/ld"
"#,
  )
}

#[test]
fn test_full_run_publishes() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  fake_build_scripts(&workspace)?;
  workspace.fake_release_tool(false, "exit 0")?;

  let output = run_release(&workspace.path, &["run"])?;
  let text = stdout(&output);
  assert!(text.contains("Published Foo-19.0.0-release"));

  let log = std::fs::read_to_string(workspace.path.join("build.log"))?;
  assert!(log.contains("--clang-vendor Foo"));
  assert!(log.contains("--targets ARM;AArch64;X86"));
  assert!(log.contains("binutils --targets arm aarch64 x86_64"));

  assert!(workspace.path.join("Foo-19.0.0.tar.gz").exists());
  assert!(!workspace.path.join("install/include").exists());
  assert_eq!(workspace.remote_tags()?, vec!["Foo-19.0.0-release".to_string()]);

  let readme = workspace.remote_file("README.md")?;
  assert!(readme.contains("| Binutils | 2.41 |"));
  assert!(readme.contains("fedcba9876543210fedcba9876543210fedcba98"));
  let marker = workspace.remote_file("build-date")?;
  assert_eq!(marker.trim().len(), 8);

  // The release description carries the build metadata
  let calls = workspace.tool_calls()?.join("\n");
  assert!(calls.contains("Clang Version: 19.0.0"));
  assert!(calls.contains("Binutils Version: 2.41"));

  Ok(())
}

#[test]
fn test_skip_build_packages_existing_install() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.fake_install("1.0.0")?;
  workspace.fake_release_tool(false, "exit 0")?;

  run_release(&workspace.path, &["run", "--skip-build"])?;

  assert!(!workspace.path.join("build.log").exists());
  assert_eq!(workspace.remote_tags()?, vec!["Foo-1.0.0-release".to_string()]);
  assert_eq!(workspace.calls_to("upload")?, 1);

  Ok(())
}

#[test]
fn test_build_failure_stops_before_publishing() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  write_executable(
    &workspace.path.join("build-llvm.py"),
    "#!/bin/sh\necho 'FAILED: lib/Support/CMakeFiles' >&2\nexit 1\n",
  )?;
  workspace.fake_release_tool(false, "exit 0")?;

  let output = run_release_raw(&workspace.path, &["run"])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(String::from_utf8_lossy(&output.stderr).contains("build.log"));
  let log = std::fs::read_to_string(workspace.path.join("build.log"))?;
  assert!(log.contains("FAILED: lib/Support/CMakeFiles"));
  assert!(workspace.tool_calls()?.is_empty());
  assert_eq!(workspace.remote_log()?.len(), 1);

  Ok(())
}

#[test]
fn test_publish_failure_rolls_back_run() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.fake_install("1.0.0")?;
  workspace.fake_release_tool(false, "echo 'error: connection reset' >&2; exit 1")?;

  let output = run_release_raw(&workspace.path, &["run", "--skip-build"])?;

  assert_eq!(output.status.code(), Some(4));
  assert_eq!(workspace.calls_to("upload")?, 5);
  assert!(workspace.remote_tags()?.is_empty());
  assert_eq!(workspace.remote_log()?, vec!["Initial commit".to_string()]);

  Ok(())
}

#[test]
fn test_enabled_notifications_need_credentials() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let config = std::fs::read_to_string(workspace.path.join("release.toml"))?
    .replace("[notify]\nenabled = false", "[notify]\nenabled = true");
  std::fs::write(workspace.path.join("release.toml"), config)?;
  workspace.fake_install("1.0.0")?;
  workspace.fake_release_tool(false, "exit 0")?;

  let output = std::process::Command::new(env!("CARGO_BIN_EXE_toolchain-release"))
    .current_dir(&workspace.path)
    .args(["run", "--skip-build"])
    .env("GITHUB_TOKEN", "test-token")
    .env_remove("TELEGRAM_TOKEN")
    .env_remove("TELEGRAM_CHAT")
    .env_remove("CI")
    .output()?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("TELEGRAM_TOKEN"));
  assert!(workspace.tool_calls()?.is_empty());

  Ok(())
}
