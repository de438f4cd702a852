//! Error types for toolchain-release with contextual messages and exit codes
//!
//! Every stage of a run (configuration, build, packaging, git, publishing)
//! has its own error category. Each category maps to a process exit code and
//! may carry a help line that tells the user what to do next.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for toolchain-release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, missing credentials, invalid args)
  User = 1,
  /// System error (git, I/O)
  System = 2,
  /// Build or packaging produced no usable artifact
  Build = 3,
  /// Publishing failed (remote rolled back where possible)
  Publish = 4,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for toolchain-release
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration errors
  Config(ConfigError),

  /// Build errors (external build scripts)
  Build(BuildError),

  /// Packaging errors
  Package(PackageError),

  /// Git operation errors
  Git(GitError),

  /// Release publishing errors
  Publish(PublishError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(err) => ReleaseError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Build(_) | ReleaseError::Package(_) => ExitCode::Build,
      ReleaseError::Git(_) | ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Publish(_) => ExitCode::Publish,
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Build(e) => e.help_message(),
      ReleaseError::Package(e) => e.help_message(),
      ReleaseError::Git(e) => e.help_message(),
      ReleaseError::Publish(e) => e.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      ReleaseError::Io(_) => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Build(e) => write!(f, "{}", e),
      ReleaseError::Package(e) => write!(f, "{}", e),
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::Publish(e) => write!(f, "{}", e),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for ReleaseError {
  fn from(err: toml_edit::ser::Error) -> Self {
    ReleaseError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<glob::PatternError> for ReleaseError {
  fn from(err: glob::PatternError) -> Self {
    ReleaseError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<glob::GlobError> for ReleaseError {
  fn from(err: glob::GlobError) -> Self {
    ReleaseError::message(format!("Glob error: {}", err))
  }
}

impl From<std::path::StripPrefixError> for ReleaseError {
  fn from(err: std::path::StripPrefixError) -> Self {
    ReleaseError::message(format!("Path strip prefix error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// release.toml not found
  NotFound { workspace_root: PathBuf },

  /// Missing required credential (environment variable)
  MissingCredential { variable: String },

  /// Missing or empty required field
  MissingField { field: String },

  /// Field present but invalid
  Invalid { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Run `toolchain-release init` to create a configuration file.".to_string())
      }
      ConfigError::MissingCredential { variable } => Some(format!(
        "Export {} in the environment (CI secrets are the usual place).",
        variable
      )),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { workspace_root } => {
        write!(
          f,
          "No toolchain-release configuration found.\nExpected file: {}/release.toml",
          workspace_root.display()
        )
      }
      ConfigError::MissingCredential { variable } => {
        write!(f, "Missing required environment variable: {}", variable)
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
      ConfigError::Invalid { field, reason } => {
        write!(f, "Invalid value for {}: {}", field, reason)
      }
    }
  }
}

/// Build errors: the external build produced no usable toolchain
#[derive(Debug)]
pub enum BuildError {
  /// A build script exited unsuccessfully
  ScriptFailed { script: String, status: String, log: PathBuf },

  /// Scripts succeeded but the expected binary is missing
  BinaryMissing { path: PathBuf, log: PathBuf },

  /// Could not determine the version from the built compiler
  VersionUnknown { output: String },
}

impl BuildError {
  fn help_message(&self) -> Option<String> {
    match self {
      BuildError::ScriptFailed { log, .. } | BuildError::BinaryMissing { log, .. } => {
        Some(format!("See the build log for details: {}", log.display()))
      }
      BuildError::VersionUnknown { .. } => None,
    }
  }

  /// Build log to attach to failure notifications, if any
  pub fn log_path(&self) -> Option<&PathBuf> {
    match self {
      BuildError::ScriptFailed { log, .. } | BuildError::BinaryMissing { log, .. } => Some(log),
      BuildError::VersionUnknown { .. } => None,
    }
  }
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::ScriptFailed { script, status, .. } => {
        write!(f, "Build script {} failed ({})", script, status)
      }
      BuildError::BinaryMissing { path, .. } => {
        write!(f, "Build finished but {} does not exist", path.display())
      }
      BuildError::VersionUnknown { output } => {
        write!(f, "Could not parse compiler version from: {}", output)
      }
    }
  }
}

/// Packaging errors
#[derive(Debug)]
pub enum PackageError {
  /// Install directory missing or empty
  InstallDirMissing { path: PathBuf },

  /// strip/patchelf failed while best-effort mode is off
  ToolFailed { tool: String, file: PathBuf, stderr: String },

  /// Writing the archive failed
  ArchiveFailed { path: PathBuf, reason: String },
}

impl PackageError {
  fn help_message(&self) -> Option<String> {
    match self {
      PackageError::ToolFailed { tool, .. } => Some(format!(
        "Install {} or set `package.best_effort = true` to continue past failures.",
        tool
      )),
      PackageError::InstallDirMissing { .. } => Some("Run `toolchain-release build` first.".to_string()),
      PackageError::ArchiveFailed { .. } => None,
    }
  }
}

impl fmt::Display for PackageError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PackageError::InstallDirMissing { path } => {
        write!(f, "Install directory not found: {}", path.display())
      }
      PackageError::ToolFailed { tool, file, stderr } => {
        write!(f, "{} failed on {}: {}", tool, file.display(), stderr.trim())
      }
      PackageError::ArchiveFailed { path, reason } => {
        write!(f, "Failed to write archive {}: {}", path.display(), reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Push failed
  PushFailed {
    remote: String,
    refspec: String,
    reason: String,
  },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("permission denied") || reason.contains("403") {
          Some("Check that GITHUB_TOKEN has write access to the release repository.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Clone the release repository first or check the path: {}",
        path.display()
      )),
      GitError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::PushFailed { remote, refspec, reason } => {
        write!(f, "Push of {} to {} failed: {}", refspec, remote, reason)
      }
    }
  }
}

/// Release publishing errors
#[derive(Debug)]
pub enum PublishError {
  /// A release API call failed outright
  Api { operation: String, stderr: String },

  /// Every upload attempt failed; the recorded commit and tag were rolled back
  RetriesExhausted { tag: String, attempts: u32, last_error: String },

  /// Publishing failed and the rollback failed too
  RollbackFailed { publish_error: String, rollback_error: String },
}

impl PublishError {
  fn help_message(&self) -> Option<String> {
    match self {
      PublishError::RetriesExhausted { .. } => {
        Some("The release repository was rolled back. Re-run once the network is stable.".to_string())
      }
      PublishError::RollbackFailed { .. } => Some(
        "The release repository may hold a tag without an asset. Delete the tag and the last commit by hand."
          .to_string(),
      ),
      PublishError::Api { stderr, .. } => {
        if stderr.contains("401") || stderr.contains("Bad credentials") {
          Some("GITHUB_TOKEN was rejected. Generate a new token with `repo` scope.".to_string())
        } else {
          None
        }
      }
    }
  }
}

impl fmt::Display for PublishError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PublishError::Api { operation, stderr } => {
        write!(f, "Release API call '{}' failed: {}", operation, stderr.trim())
      }
      PublishError::RetriesExhausted {
        tag,
        attempts,
        last_error,
      } => {
        write!(
          f,
          "Upload for {} failed after {} attempts: {}",
          tag,
          attempts,
          last_error.trim()
        )
      }
      PublishError::RollbackFailed {
        publish_error,
        rollback_error,
      } => {
        write!(
          f,
          "Publishing failed ({}) and rollback failed too: {}",
          publish_error, rollback_error
        )
      }
    }
  }
}

/// Result type alias for toolchain-release
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
