//! `build`: run the build scripts and report what was built

use crate::build::{BuildResult, Builder};
use crate::core::context::RunContext;
use crate::core::error::ReleaseResult;

pub fn run_build(ctx: &RunContext, json: bool) -> ReleaseResult<()> {
  let result = Builder::new(ctx).run()?;

  if json {
    println!("{}", serde_json::to_string_pretty(&result)?);
  } else {
    print_build(&result);
  }
  Ok(())
}

pub(crate) fn print_build(result: &BuildResult) {
  println!("✅ Build finished");
  println!("   Clang:    {}", result.version);
  if let Some(binutils) = &result.binutils_version {
    println!("   Binutils: {}", binutils);
  }
  println!("   Commit:   {}", result.source_commit);
  println!("   Install:  {}", result.output_dir.display());
}
