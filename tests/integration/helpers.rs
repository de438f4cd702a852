//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const PRODUCT: &str = "Foo";

/// A working directory with release.toml, a bare release remote and fake tools
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
  pub remote: PathBuf,
}

impl TestWorkspace {
  /// Workspace whose release remote has one initial commit on main
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("work");
    let remote = root.path().join("remote.git");
    let seed = root.path().join("seed");
    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(&seed)?;

    git(root.path(), &["init", "--bare", "--initial-branch=main", "remote.git"])?;
    git(&seed, &["init", "--initial-branch=main"])?;
    git(&seed, &["config", "user.name", "Test User"])?;
    git(&seed, &["config", "user.email", "test@example.com"])?;
    std::fs::write(seed.join("README.md"), "# Foo releases\n")?;
    git(&seed, &["add", "."])?;
    git(&seed, &["commit", "-m", "Initial commit"])?;
    git(&seed, &["push", remote.to_str().context("non-utf8 path")?, "main"])?;

    let ws = Self {
      _root: root,
      path,
      remote,
    };
    ws.write_config("")?;
    Ok(ws)
  }

  /// Write release.toml; `extra` is appended verbatim
  pub fn write_config(&self, extra: &str) -> Result<()> {
    let config = format!(
      r#"[product]
name = "{product}"
dated_names = false

[release]
repo = "owner/repo"
remote = "{remote}"
tool = "{tool}"
retry_delay_secs = 0

[notify]
enabled = false
{extra}"#,
      product = PRODUCT,
      remote = self.remote.display(),
      tool = self.tool_path().display(),
      extra = extra,
    );
    std::fs::write(self.path.join("release.toml"), config)?;
    Ok(())
  }

  pub fn tool_path(&self) -> PathBuf {
    self.path.join("tools").join("github-release")
  }

  /// Every invocation of the fake release tool, one line per call
  pub fn tool_calls(&self) -> Result<Vec<String>> {
    let log = self.path.join("tools").join("calls.log");
    if !log.exists() {
      return Ok(Vec::new());
    }
    Ok(std::fs::read_to_string(log)?.lines().map(String::from).collect())
  }

  pub fn calls_to(&self, subcommand: &str) -> Result<usize> {
    Ok(
      self
        .tool_calls()?
        .iter()
        .filter(|line| line.split_whitespace().next() == Some(subcommand))
        .count(),
    )
  }

  /// Install a fake `github-release`
  ///
  /// `release_exists` decides `info`; `upload` is a shell snippet run for
  /// each upload, with `$n` holding the 1-based attempt number.
  #[cfg(unix)]
  pub fn fake_release_tool(&self, release_exists: bool, upload: &str) -> Result<()> {
    let info = if release_exists {
      "exit 0"
    } else {
      "echo 'error: could not find the release corresponding to tag' >&2; exit 1"
    };
    let script = format!(
      r#"#!/bin/sh
dir="$(dirname "$0")"
echo "$@" >> "$dir/calls.log"
[ -n "$GITHUB_TOKEN" ] || {{ echo 'missing token' >&2; exit 2; }}
case "$1" in
  info) {info} ;;
  release|edit) exit 0 ;;
  upload)
    n=$(( $(cat "$dir/uploads" 2>/dev/null || echo 0) + 1 ))
    echo "$n" > "$dir/uploads"
    {upload}
    ;;
esac
"#,
      info = info,
      upload = upload,
    );
    write_executable(&self.tool_path(), &script)
  }

  /// Fake install tree whose `bin/clang` reports `version`
  #[cfg(unix)]
  pub fn fake_install(&self, version: &str) -> Result<PathBuf> {
    let install = self.path.join("install");
    std::fs::create_dir_all(install.join("include/llvm"))?;
    std::fs::create_dir_all(install.join("lib/clang"))?;
    std::fs::write(install.join("include/llvm/Config.h"), "#define X 1\n")?;
    std::fs::write(install.join("lib/libLLVM.a"), "!<arch>\n")?;
    std::fs::write(install.join("lib/clang/resource.txt"), "keep\n")?;
    write_executable(
      &install.join("bin/clang"),
      &format!(
        "#!/bin/sh\necho 'Foo clang version {}git (https://github.com/llvm/llvm-project 0123456789abcdef0123456789abcdef01234567)'\n",
        version
      ),
    )?;
    Ok(install)
  }

  /// A stand-in archive for publishing
  pub fn archive(&self, name: &str) -> Result<PathBuf> {
    let path = self.path.join(name);
    std::fs::write(&path, b"\x1f\x8b fake archive")?;
    Ok(path)
  }

  /// Tags on the release remote
  pub fn remote_tags(&self) -> Result<Vec<String>> {
    let output = git(&self.remote, &["tag", "--list"])?;
    Ok(String::from_utf8_lossy(&output.stdout).lines().map(String::from).collect())
  }

  /// Commit subjects on the remote main branch, newest first
  pub fn remote_log(&self) -> Result<Vec<String>> {
    let output = git(&self.remote, &["log", "--format=%s", "main"])?;
    Ok(String::from_utf8_lossy(&output.stdout).lines().map(String::from).collect())
  }

  pub fn remote_file(&self, file: &str) -> Result<String> {
    let output = git(&self.remote, &["show", &format!("main:{}", file)])?;
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
  }
}

#[cfg(unix)]
pub fn write_executable(path: &Path, content: &str) -> Result<()> {
  use std::os::unix::fs::PermissionsExt;
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, content)?;
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
  Ok(())
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the CLI without checking its exit status
///
/// CI is cleared so the build-date guard only runs when a test asks for it.
pub fn run_release_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_toolchain-release");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("CI")
    .env_remove("BRANCH")
    .env_remove("TOOLCHAIN_RELEASE_LOG")
    .env("GITHUB_TOKEN", "test-token")
    .output()
    .context("Failed to run toolchain-release")
}

/// Run the CLI and require success
pub fn run_release(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_release_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "toolchain-release command failed: toolchain-release {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}
