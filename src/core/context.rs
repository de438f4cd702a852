//! Unified run context - build once, pass everywhere
//!
//! Every stage (build, package, publish, notify) receives a `&RunContext`
//! instead of reading environment variables or relying on the current
//! directory. `main.rs` reads the environment exactly once through
//! [`Credentials::from_env`]; tests build credentials from a map.

use crate::core::config::ToolchainConfig;
use crate::core::error::{ConfigError, ReleaseError, ReleaseResult};
use chrono::{DateTime, FixedOffset, Utc};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable holding the GitHub token
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
/// Environment variable holding the Telegram bot token
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
/// Environment variable holding the Telegram chat id
pub const TELEGRAM_CHAT: &str = "TELEGRAM_CHAT";
/// Environment variable overriding the release branch
pub const BRANCH: &str = "BRANCH";

/// Opaque secrets and targets supplied by the environment
#[derive(Clone, Default)]
pub struct Credentials {
  pub github_token: Option<String>,
  pub telegram_token: Option<String>,
  pub telegram_chat: Option<String>,
  pub branch: Option<String>,
}

impl Credentials {
  /// Read credentials from the process environment
  pub fn from_env() -> Self {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Read credentials through an arbitrary lookup (empty values count as absent)
  pub fn from_lookup<F>(lookup: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    Self {
      github_token: get(GITHUB_TOKEN),
      telegram_token: get(TELEGRAM_TOKEN),
      telegram_chat: get(TELEGRAM_CHAT),
      branch: get(BRANCH),
    }
  }

  pub fn require_github_token(&self) -> ReleaseResult<&str> {
    require(&self.github_token, GITHUB_TOKEN)
  }

  pub fn require_telegram(&self) -> ReleaseResult<(&str, &str)> {
    Ok((
      require(&self.telegram_token, TELEGRAM_TOKEN)?,
      require(&self.telegram_chat, TELEGRAM_CHAT)?,
    ))
  }
}

fn require<'a>(value: &'a Option<String>, variable: &str) -> ReleaseResult<&'a str> {
  value.as_deref().ok_or_else(|| {
    ReleaseError::Config(ConfigError::MissingCredential {
      variable: variable.to_string(),
    })
  })
}

// Never print secrets
impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
    f.debug_struct("Credentials")
      .field("github_token", &mask(&self.github_token))
      .field("telegram_token", &mask(&self.telegram_token))
      .field("telegram_chat", &mask(&self.telegram_chat))
      .field("branch", &self.branch)
      .finish()
  }
}

/// Everything a run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct RunContext {
  /// Directory relative paths in the config are resolved against
  pub root: PathBuf,

  pub config: ToolchainConfig,

  pub credentials: Credentials,

  /// Start of the run in the configured timezone
  pub started_at: DateTime<FixedOffset>,

  /// Automated (CI) mode enables the build-date guard
  pub ci: bool,
}

impl RunContext {
  pub fn new(root: &Path, config: ToolchainConfig, credentials: Credentials, ci: bool) -> ReleaseResult<Self> {
    let offset = FixedOffset::east_opt(config.product.utc_offset_hours * 3600).ok_or_else(|| {
      ReleaseError::Config(ConfigError::Invalid {
        field: "product.utc_offset_hours".to_string(),
        reason: format!("{} is not a valid offset", config.product.utc_offset_hours),
      })
    })?;

    Ok(Self {
      root: root.to_path_buf(),
      config,
      credentials,
      started_at: Utc::now().with_timezone(&offset),
      ci,
    })
  }

  /// Pin the run start time (tests, reproducible re-runs)
  pub fn with_started_at(mut self, started_at: DateTime<FixedOffset>) -> Self {
    self.started_at = started_at;
    self
  }

  /// Resolve a config path against the run root
  pub fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.root.join(path)
    }
  }

  /// Date text compared against the build-date marker and used in names
  pub fn date_stamp(&self) -> String {
    self.started_at.format("%Y%m%d").to_string()
  }

  /// Human-readable build date for metadata
  pub fn build_date(&self) -> String {
    self.started_at.format("%Y-%m-%d %H:%M %:z").to_string()
  }

  /// Release branch: BRANCH from the environment wins over the config
  pub fn branch(&self) -> &str {
    self
      .credentials
      .branch
      .as_deref()
      .unwrap_or(&self.config.release.branch)
  }

  /// Name date part, present only when dated names are enabled
  pub fn name_date(&self) -> Option<String> {
    self.config.product.dated_names.then(|| self.date_stamp())
  }
}

/// `CI=true` / `CI=1` enables automated mode
pub fn ci_from_env() -> bool {
  std::env::var("CI")
    .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"))
    .unwrap_or(false)
}
