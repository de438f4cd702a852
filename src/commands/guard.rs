//! `guard`: report whether today's build was already published

use super::publish::resolve_location;
use crate::core::context::RunContext;
use crate::core::error::ReleaseResult;
use crate::release::guard::{fetch_marker, should_skip};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct GuardDecision {
  pub current: String,
  pub marker: Option<String>,
  pub location: String,
  pub skip: bool,
}

/// Fetch the marker and compare it with the current date text
pub fn evaluate(ctx: &RunContext, date: Option<String>, marker: Option<String>) -> ReleaseResult<GuardDecision> {
  let current = date.unwrap_or_else(|| ctx.date_stamp());
  let location = resolve_location(
    ctx,
    &marker.unwrap_or_else(|| ctx.config.release.marker_location(ctx.branch())),
  );

  let remote = fetch_marker(&location)?.map(|m| m.trim().to_string());
  let skip = should_skip(&current, remote.as_deref());
  tracing::info!(current = %current, marker = ?remote, skip, "build-date guard");

  Ok(GuardDecision {
    current,
    marker: remote,
    location,
    skip,
  })
}

pub fn run_guard(ctx: &RunContext, date: Option<String>, marker: Option<String>, json: bool) -> ReleaseResult<()> {
  let decision = evaluate(ctx, date, marker)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&decision)?);
  } else if decision.skip {
    println!("⏭️  Already published {}, skip", decision.current);
  } else {
    match &decision.marker {
      Some(marker) => println!("▶️  Last build {}, today is {}: build", marker, decision.current),
      None => println!("▶️  No build-date marker at {}: build", decision.location),
    }
  }
  Ok(())
}
