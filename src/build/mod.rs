//! Toolchain build through the external build scripts
//!
//! The scripts are opaque: they either exit successfully and leave a usable
//! `bin/clang` in the install dir, or the build failed. Their output goes to
//! the build log, which failure notifications attach.

pub mod version;

use crate::core::config::BuildConfig;
use crate::core::context::RunContext;
use crate::core::error::{BuildError, ReleaseError, ReleaseResult, ResultExt};
use crate::core::vcs::SystemGit;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Output of a successful build, immutable once produced
#[derive(Debug, Clone, Serialize)]
pub struct BuildResult {
  pub version: String,
  pub source_commit: String,
  pub binutils_version: Option<String>,
  pub output_dir: PathBuf,
  pub log_file: Option<PathBuf>,
}

pub struct Builder<'a> {
  ctx: &'a RunContext,
}

impl<'a> Builder<'a> {
  pub fn new(ctx: &'a RunContext) -> Self {
    Self { ctx }
  }

  fn config(&self) -> &BuildConfig {
    &self.ctx.config.build
  }

  pub fn log_path(&self) -> PathBuf {
    self.ctx.resolve(&self.config().log_file)
  }

  /// Run the LLVM and binutils scripts, then inspect the install dir
  pub fn run(&self) -> ReleaseResult<BuildResult> {
    let config = self.config();
    let log = self.log_path();
    let install = self.ctx.resolve(&config.install_dir);
    let vendor = config
      .vendor
      .clone()
      .unwrap_or_else(|| self.ctx.config.product.name.clone());

    let mut llvm_args = vec![
      "--clang-vendor".to_string(),
      vendor,
      "--targets".to_string(),
      config.targets.join(";"),
      "--projects".to_string(),
      config.projects.join(";"),
      "--install-folder".to_string(),
      install.to_string_lossy().to_string(),
    ];
    llvm_args.extend(config.extra_args.iter().cloned());

    // Truncate the log once; both scripts append to it
    File::create(&log).with_context(|| format!("Failed to create build log {}", log.display()))?;

    println!("🔨 Building LLVM ({})", config.llvm_script.display());
    self.run_script(&config.llvm_script, &llvm_args, &log)?;

    if config.build_binutils {
      println!("🔨 Building binutils ({})", config.binutils_script.display());
      let mut binutils_args = vec!["--targets".to_string()];
      binutils_args.extend(config.binutils_targets.iter().cloned());
      binutils_args.push("--install-folder".to_string());
      binutils_args.push(install.to_string_lossy().to_string());
      self.run_script(&config.binutils_script, &binutils_args, &log)?;
    }

    let clang = install.join("bin").join("clang");
    if !clang.exists() {
      return Err(ReleaseError::Build(BuildError::BinaryMissing { path: clang, log }));
    }

    let mut result = inspect_install(&install, &self.ctx.resolve(&config.source_dir))?;
    result.log_file = Some(log);
    Ok(result)
  }

  fn run_script(&self, script: &Path, args: &[String], log: &Path) -> ReleaseResult<()> {
    let script_path = self.ctx.resolve(script);
    let stdout = File::options()
      .append(true)
      .open(log)
      .with_context(|| format!("Failed to open build log {}", log.display()))?;
    let stderr = stdout.try_clone()?;

    tracing::info!(script = %script_path.display(), ?args, "running build script");

    let status = Command::new(&script_path)
      .args(args)
      .current_dir(&self.ctx.root)
      .stdin(Stdio::null())
      .stdout(stdout)
      .stderr(stderr)
      .status()
      .map_err(|e| {
        ReleaseError::Build(BuildError::ScriptFailed {
          script: script_path.display().to_string(),
          status: format!("could not start: {}", e),
          log: log.to_path_buf(),
        })
      })?;

    if !status.success() {
      return Err(ReleaseError::Build(BuildError::ScriptFailed {
        script: script_path.display().to_string(),
        status: status.to_string(),
        log: log.to_path_buf(),
      }));
    }

    Ok(())
  }
}

/// Read version, source commit and binutils version from an install dir
///
/// The commit comes from `clang --version` when the compiler reports one,
/// otherwise from HEAD of the LLVM checkout at `source_dir`.
pub fn inspect_install(install: &Path, source_dir: &Path) -> ReleaseResult<BuildResult> {
  let clang = install.join("bin").join("clang");
  let output = Command::new(&clang)
    .arg("--version")
    .output()
    .with_context(|| format!("Failed to run {}", clang.display()))?;
  let stdout = String::from_utf8_lossy(&output.stdout).to_string();

  let parsed = version::parse_clang_version(&stdout).ok_or_else(|| {
    ReleaseError::Build(BuildError::VersionUnknown {
      output: stdout.lines().next().unwrap_or_default().to_string(),
    })
  })?;

  let source_commit = match parsed.commit {
    Some(commit) => commit,
    None => SystemGit::open(source_dir)
      .and_then(|git| git.head_commit())
      .unwrap_or_else(|e| {
        tracing::warn!(error = %e, "source commit unknown");
        "unknown".to_string()
      }),
  };

  let ld = install.join("bin").join("ld");
  let binutils_version = if ld.exists() {
    Command::new(&ld)
      .arg("--version")
      .output()
      .ok()
      .and_then(|out| version::parse_ld_version(&String::from_utf8_lossy(&out.stdout)))
  } else {
    None
  };

  Ok(BuildResult {
    version: parsed.version,
    source_commit,
    binutils_version,
    output_dir: install.to_path_buf(),
    log_file: None,
  })
}
