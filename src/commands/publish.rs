//! `publish`: record an archive in the release repository and publish it

use crate::core::context::RunContext;
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use crate::package::Artifact;
use crate::release::{GithubReleaseCli, PublishReport, Publisher, ReleaseNames, ReleaseRepo, RetryPolicy, ThreadSleeper};
use crate::utils::{authenticated_url, is_local_path};
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct PublishArgs {
  pub archive: PathBuf,
  /// Defaults to the tag derived from the archive name
  pub tag: Option<String>,
  pub description: Option<String>,
  pub description_file: Option<PathBuf>,
  pub json: bool,
}

pub fn run_publish(ctx: &RunContext, args: PublishArgs) -> ReleaseResult<()> {
  let artifact = Artifact::from_file(&ctx.resolve(&args.archive))?;

  let tag = match args.tag {
    Some(tag) => tag,
    None => ReleaseNames::from_archive(&artifact.name)
      .map(|names| names.tag)
      .ok_or_else(|| {
        ReleaseError::with_help(
          format!("Cannot derive a release tag from '{}'", artifact.name),
          "Pass --tag or use a <Product>-<Version>[-<Date>].tar.gz archive",
        )
      })?,
  };

  let description = match (args.description, args.description_file) {
    (Some(text), _) => text,
    (None, Some(file)) => {
      let path = ctx.resolve(&file);
      std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?
    }
    (None, None) => format!(
      "{} build\nBuild Date: {}\n",
      ctx.config.product.name,
      ctx.build_date()
    ),
  };
  let readme = format!("# {}\n\n{}", tag, description);

  let report = publish_artifact(ctx, &artifact, &tag, &description, &readme)?;

  if args.json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print_report(ctx, &report);
  }
  Ok(())
}

/// Record the run in the release repository, then publish the artifact
///
/// A failed publish leaves the release repository as it was before.
pub fn publish_artifact(
  ctx: &RunContext,
  artifact: &Artifact,
  tag: &str,
  description: &str,
  readme: &str,
) -> ReleaseResult<PublishReport> {
  let release = &ctx.config.release;
  let token = ctx.credentials.require_github_token()?;

  let remote = resolve_location(ctx, &release.remote_url());
  let workdir = ctx.resolve(&release.workdir);
  println!("📥 Cloning release repository ({})", ctx.branch());
  let repo = ReleaseRepo::clone_fresh(
    &authenticated_url(&remote, token),
    ctx.branch(),
    &workdir,
    &release.marker_file,
  )?;

  println!("📝 Recording {}", tag);
  let recorded = repo.record(readme, &ctx.date_stamp(), tag)?;

  let api = GithubReleaseCli::new(release, token)?;
  let sleeper = ThreadSleeper;
  let publisher = Publisher::new(&api, &sleeper, RetryPolicy::from_config(release));

  println!("🚀 Publishing {} to {}", artifact.name, release.repo);
  publisher.publish(tag, artifact, description, &recorded)
}

/// Local paths in the config are relative to the run root; URLs pass through
pub(crate) fn resolve_location(ctx: &RunContext, location: &str) -> String {
  if is_local_path(location) {
    ctx.resolve(Path::new(location)).display().to_string()
  } else {
    location.to_string()
  }
}

pub(crate) fn release_url(ctx: &RunContext, tag: &str) -> String {
  format!("https://github.com/{}/releases/tag/{}", ctx.config.release.repo, tag)
}

fn print_report(ctx: &RunContext, report: &PublishReport) {
  println!("✅ Published {} ({:?})", report.tag, report.action);
  println!("   Asset:    {}", report.asset);
  println!("   Attempts: {}", report.attempts.len());
  println!("   {}", release_url(ctx, &report.tag));
}
