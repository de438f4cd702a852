//! `package`: turn an install dir into the release archive

use crate::build::{self, BuildResult};
use crate::core::context::RunContext;
use crate::core::error::ReleaseResult;
use crate::package::{PackageOutput, Packager};
use std::path::PathBuf;

/// Overrides for packaging an install dir produced outside this tool
#[derive(Debug, Default)]
pub struct PackageArgs {
  pub install_dir: Option<PathBuf>,
  /// Skip `clang --version` and use this version
  pub version: Option<String>,
  pub commit: Option<String>,
  pub json: bool,
}

pub fn run_package(ctx: &RunContext, args: PackageArgs) -> ReleaseResult<()> {
  let install = ctx.resolve(args.install_dir.as_ref().unwrap_or(&ctx.config.build.install_dir));

  let build = match args.version {
    Some(version) => BuildResult {
      version,
      source_commit: args.commit.unwrap_or_else(|| "unknown".to_string()),
      binutils_version: None,
      output_dir: install,
      log_file: None,
    },
    None => {
      let mut inspected = build::inspect_install(&install, &ctx.resolve(&ctx.config.build.source_dir))?;
      if let Some(commit) = args.commit {
        inspected.source_commit = commit;
      }
      inspected
    }
  };

  let output = Packager::new(ctx).package(&build)?;

  if args.json {
    println!("{}", serde_json::to_string_pretty(&output)?);
  } else {
    print_package(&output);
  }
  Ok(())
}

pub(crate) fn print_package(output: &PackageOutput) {
  println!("📦 {}", output.artifact.path.display());
  println!("   Size:     {} bytes", output.artifact.size_bytes);
  if let Some(sha) = &output.artifact.checksum {
    println!("   SHA256:   {}", sha);
  }
  println!("   Tag:      {}", output.names.tag);
  println!(
    "   Pruned {} path(s), stripped {} file(s), patched {} file(s)",
    output.pruned.len(),
    output.stripped.processed,
    output.patched.processed
  );
  let failed = output.stripped.failed + output.patched.failed;
  if failed > 0 {
    println!("   ⚠️  {} strip/patchelf invocation(s) failed", failed);
  }
}
