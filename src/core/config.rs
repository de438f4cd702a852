use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for toolchain-release
/// Searched in order: release.toml, .release.toml, .config/release.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
  pub product: ProductConfig,
  #[serde(default)]
  pub build: BuildConfig,
  #[serde(default)]
  pub package: PackageConfig,
  pub release: PublishConfig,
  #[serde(default)]
  pub notify: NotifyConfig,
}

/// What is being released and how it is named
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
  /// Product name, first part of archive and tag names (e.g. "Neutron")
  pub name: String,

  /// Append the build date to archive and tag names
  #[serde(default = "default_true")]
  pub dated_names: bool,

  /// Fixed timezone for build dates, as hours east of UTC (default: +7)
  #[serde(default = "default_utc_offset_hours")]
  pub utc_offset_hours: i32,
}

fn default_true() -> bool {
  true
}

fn default_utc_offset_hours() -> i32 {
  7
}

/// External build scripts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
  #[serde(default = "default_llvm_script")]
  pub llvm_script: PathBuf,

  #[serde(default = "default_binutils_script")]
  pub binutils_script: PathBuf,

  #[serde(default = "default_true")]
  pub build_binutils: bool,

  /// Vendor string passed as `--clang-vendor` (default: product name)
  #[serde(default)]
  pub vendor: Option<String>,

  #[serde(default = "default_targets")]
  pub targets: Vec<String>,

  #[serde(default = "default_projects")]
  pub projects: Vec<String>,

  /// Binutils targets passed to the binutils script
  #[serde(default = "default_binutils_targets")]
  pub binutils_targets: Vec<String>,

  /// Extra arguments appended to the LLVM script invocation
  #[serde(default)]
  pub extra_args: Vec<String>,

  #[serde(default = "default_install_dir")]
  pub install_dir: PathBuf,

  /// LLVM checkout used to resolve the source commit if the compiler doesn't report one
  #[serde(default = "default_source_dir")]
  pub source_dir: PathBuf,

  #[serde(default = "default_source_repo")]
  pub source_repo: String,

  #[serde(default = "default_log_file")]
  pub log_file: PathBuf,
}

fn default_llvm_script() -> PathBuf {
  PathBuf::from("./build-llvm.py")
}

fn default_binutils_script() -> PathBuf {
  PathBuf::from("./build-binutils.py")
}

fn default_targets() -> Vec<String> {
  vec!["ARM".to_string(), "AArch64".to_string(), "X86".to_string()]
}

fn default_projects() -> Vec<String> {
  vec!["clang".to_string(), "lld".to_string(), "polly".to_string()]
}

fn default_binutils_targets() -> Vec<String> {
  vec!["arm".to_string(), "aarch64".to_string(), "x86_64".to_string()]
}

fn default_install_dir() -> PathBuf {
  PathBuf::from("install")
}

fn default_source_dir() -> PathBuf {
  PathBuf::from("llvm-project")
}

fn default_source_repo() -> String {
  "https://github.com/llvm/llvm-project".to_string()
}

fn default_log_file() -> PathBuf {
  PathBuf::from("build.log")
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      llvm_script: default_llvm_script(),
      binutils_script: default_binutils_script(),
      build_binutils: true,
      vendor: None,
      targets: default_targets(),
      projects: default_projects(),
      binutils_targets: default_binutils_targets(),
      extra_args: Vec::new(),
      install_dir: default_install_dir(),
      source_dir: default_source_dir(),
      source_repo: default_source_repo(),
      log_file: default_log_file(),
    }
  }
}

/// Post-processing of the install tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
  /// Glob patterns, relative to the install dir, removed before archiving
  #[serde(default = "default_prune")]
  pub prune: Vec<String>,

  #[serde(default = "default_true")]
  pub strip: bool,

  #[serde(default = "default_true")]
  pub patch_rpath: bool,

  #[serde(default = "default_rpath")]
  pub rpath: String,

  /// Log and continue when strip/patchelf fail instead of aborting
  #[serde(default = "default_true")]
  pub best_effort: bool,

  /// Directory the archive is written to
  #[serde(default = "default_output_dir")]
  pub output_dir: PathBuf,
}

fn default_prune() -> Vec<String> {
  vec!["include".to_string(), "lib/*.a".to_string(), "lib/*.la".to_string()]
}

fn default_rpath() -> String {
  "$ORIGIN/../lib".to_string()
}

fn default_output_dir() -> PathBuf {
  PathBuf::from(".")
}

impl Default for PackageConfig {
  fn default() -> Self {
    Self {
      prune: default_prune(),
      strip: true,
      patch_rpath: true,
      rpath: default_rpath(),
      best_effort: true,
      output_dir: default_output_dir(),
    }
  }
}

/// Release repository and GitHub release settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
  /// GitHub slug of the release repository ("owner/repo")
  pub repo: String,

  /// Git remote override (URL or local path); defaults to the GitHub https URL
  #[serde(default)]
  pub remote: Option<String>,

  /// Release branch (the BRANCH environment variable takes precedence)
  #[serde(default = "default_branch")]
  pub branch: String,

  /// Local clone of the release repository
  #[serde(default = "default_workdir")]
  pub workdir: PathBuf,

  /// `github-release` executable
  #[serde(default = "default_tool")]
  pub tool: String,

  #[serde(default = "default_max_attempts")]
  pub max_attempts: u32,

  #[serde(default = "default_retry_delay_secs")]
  pub retry_delay_secs: u64,

  /// Build-date marker file inside the release repository
  #[serde(default = "default_marker_file")]
  pub marker_file: String,

  /// Where the build-date guard reads the marker from (URL or local path)
  #[serde(default)]
  pub marker_url: Option<String>,
}

fn default_branch() -> String {
  "main".to_string()
}

fn default_workdir() -> PathBuf {
  PathBuf::from("rel_repo")
}

fn default_tool() -> String {
  "github-release".to_string()
}

fn default_max_attempts() -> u32 {
  5
}

fn default_retry_delay_secs() -> u64 {
  10
}

fn default_marker_file() -> String {
  "build-date".to_string()
}

impl PublishConfig {
  /// Owner and repository name from the slug
  pub fn owner_and_name(&self) -> ReleaseResult<(&str, &str)> {
    self
      .repo
      .split_once('/')
      .filter(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'))
      .ok_or_else(|| {
        ReleaseError::Config(ConfigError::Invalid {
          field: "release.repo".to_string(),
          reason: format!("expected \"owner/repo\", got \"{}\"", self.repo),
        })
      })
  }

  /// Git remote for the release repository
  pub fn remote_url(&self) -> String {
    self
      .remote
      .clone()
      .unwrap_or_else(|| format!("https://github.com/{}.git", self.repo))
  }

  /// Marker location for the build-date guard
  pub fn marker_location(&self, branch: &str) -> String {
    self.marker_url.clone().unwrap_or_else(|| {
      format!(
        "https://raw.githubusercontent.com/{}/{}/{}",
        self.repo, branch, self.marker_file
      )
    })
  }

  pub fn retry_delay(&self) -> Duration {
    Duration::from_secs(self.retry_delay_secs)
  }
}

/// Telegram notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
  #[serde(default = "default_true")]
  pub enabled: bool,

  #[serde(default = "default_api_base")]
  pub api_base: String,
}

fn default_api_base() -> String {
  "https://api.telegram.org".to_string()
}

impl Default for NotifyConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      api_base: default_api_base(),
    }
  }
}

impl ToolchainConfig {
  /// Find config file in search order: release.toml, .release.toml, .config/release.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("release.toml"),
      path.join(".release.toml"),
      path.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config (searches multiple locations)
  pub fn load(path: &Path) -> ReleaseResult<Self> {
    let config_path = Self::find_config_path(path).ok_or_else(|| {
      ReleaseError::Config(ConfigError::NotFound {
        workspace_root: path.to_path_buf(),
      })
    })?;

    Self::load_file(&config_path)
  }

  /// Load config from an explicit file
  pub fn load_file(config_path: &Path) -> ReleaseResult<Self> {
    let content = fs::read_to_string(config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ToolchainConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config.validate()?;

    Ok(config)
  }

  /// Save config to release.toml
  pub fn save(&self, path: &Path) -> ReleaseResult<()> {
    let config_path = path.join("release.toml");
    let content = toml_edit::ser::to_string_pretty(self).context("Failed to serialize config to TOML")?;
    fs::write(&config_path, content).with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(())
  }

  /// Check if config exists at the given path
  pub fn exists(path: &Path) -> bool {
    Self::find_config_path(path).is_some()
  }

  /// Create a config with defaults for a product and release repository
  pub fn new(product: impl Into<String>, repo: impl Into<String>) -> Self {
    Self {
      product: ProductConfig {
        name: product.into(),
        dated_names: true,
        utc_offset_hours: default_utc_offset_hours(),
      },
      build: BuildConfig::default(),
      package: PackageConfig::default(),
      release: PublishConfig {
        repo: repo.into(),
        remote: None,
        branch: default_branch(),
        workdir: default_workdir(),
        tool: default_tool(),
        max_attempts: default_max_attempts(),
        retry_delay_secs: default_retry_delay_secs(),
        marker_file: default_marker_file(),
        marker_url: None,
      },
      notify: NotifyConfig::default(),
    }
  }

  /// Validate configuration values that serde can't check
  pub fn validate(&self) -> ReleaseResult<()> {
    if self.product.name.trim().is_empty() {
      return Err(ReleaseError::Config(ConfigError::MissingField {
        field: "product.name".to_string(),
      }));
    }

    if self.product.name.contains(char::is_whitespace) || self.product.name.contains('/') {
      return Err(ReleaseError::Config(ConfigError::Invalid {
        field: "product.name".to_string(),
        reason: "must not contain whitespace or '/'".to_string(),
      }));
    }

    if !(-12..=14).contains(&self.product.utc_offset_hours) {
      return Err(ReleaseError::Config(ConfigError::Invalid {
        field: "product.utc_offset_hours".to_string(),
        reason: format!("{} is outside -12..=14", self.product.utc_offset_hours),
      }));
    }

    self.release.owner_and_name()?;

    if self.release.max_attempts == 0 {
      return Err(ReleaseError::Config(ConfigError::Invalid {
        field: "release.max_attempts".to_string(),
        reason: "must be at least 1".to_string(),
      }));
    }

    if self.release.marker_file.trim().is_empty() {
      return Err(ReleaseError::Config(ConfigError::MissingField {
        field: "release.marker_file".to_string(),
      }));
    }

    Ok(())
  }
}
