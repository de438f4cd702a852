//! CLI commands for toolchain-release
//!
//! ## Setup
//! - **init**: Write a default release.toml
//!
//! ## Pipeline stages
//! - **build**: Run the LLVM/binutils build scripts
//! - **package**: Prune, strip, patch and archive an install dir
//! - **publish**: Record and publish an archive as a GitHub release
//! - **guard**: Evaluate the build-date guard
//!
//! ## Full run
//! - **run**: guard → build → package → publish, with notifications
//!
//! Stage commands take a `&RunContext` built once in `main`.

pub mod build;
pub mod guard;
pub mod init;
pub mod package;
pub mod publish;
pub mod run;

pub use build::run_build;
pub use guard::run_guard;
pub use init::run_init;
pub use package::run_package;
pub use publish::run_publish;
pub use run::run_pipeline;

use crate::core::config::ToolchainConfig;
use crate::core::context::{Credentials, RunContext};
use crate::core::error::ReleaseResult;
use std::path::Path;

/// Load configuration and credentials into a run context
///
/// With an explicit config file, relative paths resolve against the file's
/// directory; otherwise against `root`.
pub fn load_context(root: &Path, config_file: Option<&Path>, ci: bool) -> ReleaseResult<RunContext> {
  let (root, config) = match config_file {
    Some(file) => {
      let config = ToolchainConfig::load_file(file)?;
      let dir = file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| root.join(p))
        .unwrap_or_else(|| root.to_path_buf());
      (dir, config)
    }
    None => (root.to_path_buf(), ToolchainConfig::load(root)?),
  };

  let ctx = RunContext::new(&root, config, Credentials::from_env(), ci)?;
  tracing::debug!(root = %ctx.root.display(), ci, credentials = ?ctx.credentials, "loaded run context");
  Ok(ctx)
}
