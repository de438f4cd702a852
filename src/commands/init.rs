//! `init`: write a default release.toml

use crate::core::config::ToolchainConfig;
use crate::core::error::{ReleaseError, ReleaseResult};
use std::path::Path;

pub fn run_init(root: &Path, product: String, repo: String, force: bool) -> ReleaseResult<()> {
  if ToolchainConfig::exists(root) && !force {
    return Err(ReleaseError::with_help(
      format!("Configuration already exists in {}", root.display()),
      "Use --force to overwrite it",
    ));
  }

  let config = ToolchainConfig::new(product, repo);
  config.validate()?;
  config.save(root)?;

  println!("✅ Wrote {}", root.join("release.toml").display());
  println!();
  println!("Next steps:");
  println!("  1. Review [build] scripts and targets");
  println!("  2. Export GITHUB_TOKEN, TELEGRAM_TOKEN and TELEGRAM_CHAT");
  println!("     (or set notify.enabled = false)");
  println!("  3. toolchain-release run");
  Ok(())
}
