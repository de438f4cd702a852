//! Build metadata: release description and release repository README

use crate::build::BuildResult;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BuildMetadata {
  pub product: String,
  pub build_date: String,
  pub clang_version: String,
  pub binutils_version: Option<String>,
  pub source_repo: String,
  pub source_commit: String,
  pub archive: String,
  pub sha256: Option<String>,
}

impl BuildMetadata {
  pub fn from_build(product: &str, build_date: &str, build: &BuildResult, source_repo: &str) -> Self {
    Self {
      product: product.to_string(),
      build_date: build_date.to_string(),
      clang_version: build.version.clone(),
      binutils_version: build.binutils_version.clone(),
      source_repo: source_repo.trim_end_matches('/').to_string(),
      source_commit: build.source_commit.clone(),
      archive: String::new(),
      sha256: None,
    }
  }

  fn short_commit(&self) -> &str {
    self.source_commit.get(..12).unwrap_or(&self.source_commit)
  }

  /// Plain-text release description
  pub fn description(&self) -> String {
    let mut text = format!(
      "{} build\nBuild Date: {}\nClang Version: {}\n",
      self.product, self.build_date, self.clang_version
    );
    if let Some(binutils) = &self.binutils_version {
      text.push_str(&format!("Binutils Version: {}\n", binutils));
    }
    text.push_str(&format!(
      "LLVM Commit: {}/commit/{}\n",
      self.source_repo, self.source_commit
    ));
    if let Some(sha) = &self.sha256 {
      text.push_str(&format!("SHA256 ({}): {}\n", self.archive, sha));
    }
    text
  }

  /// README for the release repository
  pub fn readme(&self) -> String {
    let mut text = format!("# {} Clang {}\n\n", self.product, self.clang_version);
    text.push_str("| | |\n|---|---|\n");
    text.push_str(&format!("| Build date | {} |\n", self.build_date));
    text.push_str(&format!("| Clang | {} |\n", self.clang_version));
    if let Some(binutils) = &self.binutils_version {
      text.push_str(&format!("| Binutils | {} |\n", binutils));
    }
    text.push_str(&format!(
      "| LLVM commit | [{}]({}/commit/{}) |\n",
      self.short_commit(),
      self.source_repo,
      self.source_commit
    ));
    if !self.archive.is_empty() {
      text.push_str(&format!("| Archive | `{}` |\n", self.archive));
    }
    text
  }
}
