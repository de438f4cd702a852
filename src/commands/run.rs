//! `run`: the full pipeline
//!
//! guard (CI only) → build → package → record + publish, reporting progress
//! through the notifier. Stops at the first failure.

use super::build::print_build;
use super::guard;
use super::package::print_package;
use super::publish::{publish_artifact, release_url};
use crate::build::{self, Builder};
use crate::core::context::RunContext;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::notify::{Notifier, notifier_for};
use crate::package::Packager;

pub fn run_pipeline(ctx: &RunContext, skip_build: bool) -> ReleaseResult<()> {
  let product = &ctx.config.product.name;

  if ctx.ci {
    let decision = guard::evaluate(ctx, None, None)?;
    if decision.skip {
      println!("⏭️  {} was already built on {}, nothing to do", product, decision.current);
      return Ok(());
    }
  }

  // Credentials are checked before hours of building
  ctx.credentials.require_github_token()?;
  let notifier = notifier_for(ctx)?;

  notifier.send_text(&format!("{}: build started ({})", product, ctx.build_date()));

  let build = if skip_build {
    println!("⏩ Using existing install dir");
    build::inspect_install(
      &ctx.resolve(&ctx.config.build.install_dir),
      &ctx.resolve(&ctx.config.build.source_dir),
    )
  } else {
    Builder::new(ctx).run()
  };
  let build = build.inspect_err(|err| report_failure(notifier.as_ref(), product, "Build", err))?;
  print_build(&build);

  let packaged = Packager::new(ctx)
    .package(&build)
    .inspect_err(|err| report_failure(notifier.as_ref(), product, "Packaging", err))?;
  print_package(&packaged);

  let tag = &packaged.names.tag;
  let report = publish_artifact(
    ctx,
    &packaged.artifact,
    tag,
    &packaged.metadata.description(),
    &packaged.metadata.readme(),
  )
  .inspect_err(|err| report_failure(notifier.as_ref(), product, "Publishing", err))?;

  println!("✅ Published {} after {} upload attempt(s)", report.tag, report.attempts.len());
  notifier.send_text(&format!(
    "{}: {} published\n{}\n\n{}",
    product,
    tag,
    release_url(ctx, tag),
    packaged.metadata.description()
  ));
  Ok(())
}

/// Failure message, plus the build log when there is one
fn report_failure(notifier: &dyn Notifier, product: &str, stage: &str, err: &ReleaseError) {
  let message = format!("{}: {} failed: {}", product, stage, err);
  match err {
    ReleaseError::Build(build_err) => match build_err.log_path() {
      Some(log) => notifier.send_file(log, &message),
      None => notifier.send_text(&message),
    },
    _ => notifier.send_text(&message),
  }
}
