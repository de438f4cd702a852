//! Archive and tag names
//!
//! `<Product>-<Version>[-<Date>].tar.gz` and `<Product>-<Version>[-<Date>]-release`.

use serde::Serialize;

const ARCHIVE_SUFFIX: &str = ".tar.gz";
const TAG_SUFFIX: &str = "-release";

/// Names derived from one product/version/date triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseNames {
  pub archive: String,
  pub tag: String,
}

impl ReleaseNames {
  pub fn new(product: &str, version: &str, date: Option<&str>) -> Self {
    let stem = match date {
      Some(date) => format!("{}-{}-{}", product, version, date),
      None => format!("{}-{}", product, version),
    };
    Self::from_stem(&stem)
  }

  /// Recover names from an existing archive file name
  pub fn from_archive(file_name: &str) -> Option<Self> {
    file_name
      .strip_suffix(ARCHIVE_SUFFIX)
      .filter(|stem| !stem.is_empty())
      .map(Self::from_stem)
  }

  fn from_stem(stem: &str) -> Self {
    Self {
      archive: format!("{}{}", stem, ARCHIVE_SUFFIX),
      tag: format!("{}{}", stem, TAG_SUFFIX),
    }
  }
}
