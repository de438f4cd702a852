//! Version parsing from tool `--version` output

use regex::Regex;
use std::sync::LazyLock;

static CLANG_VERSION: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"clang version (?P<version>\d+\.\d+\.\d+)(?:git)?\S*(?: \((?P<repo>\S+) (?P<commit>[0-9a-f]{7,40})\))?")
    .expect("valid regex")
});

static LD_VERSION: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"GNU ld \([^)]*\) (?P<version>\d+\.\d+(?:\.\d+)?)").expect("valid regex"));

/// Parsed first line of `clang --version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClangVersion {
  pub version: String,
  pub repo: Option<String>,
  pub commit: Option<String>,
}

pub fn parse_clang_version(output: &str) -> Option<ClangVersion> {
  let caps = CLANG_VERSION.captures(output)?;
  Some(ClangVersion {
    version: caps["version"].to_string(),
    repo: caps.name("repo").map(|m| m.as_str().to_string()),
    commit: caps.name("commit").map(|m| m.as_str().to_string()),
  })
}

pub fn parse_ld_version(output: &str) -> Option<String> {
  LD_VERSION
    .captures(output)
    .map(|caps| caps["version"].to_string())
}
