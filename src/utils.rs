//! Utility functions for remote locations and credentials in URLs

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static URL_USERINFO: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?P<scheme>[a-z][a-z0-9+.-]*://)[^/@\s]+@").expect("valid regex"));

/// Check if a location is a local filesystem path (not a remote URL)
///
/// Returns true for:
/// - Absolute paths on Unix: /path/to/repo
/// - Absolute paths on Windows: C:\path\to\repo or C:/path/to/repo
/// - Relative paths: ./path or ../path
///
/// Returns false for:
/// - SSH URLs: git@github.com:user/repo.git
/// - HTTPS URLs: <https://github.com/user/repo.git>
pub fn is_local_path(path: &str) -> bool {
  let p = Path::new(path);

  if path.starts_with("./") || path.starts_with("../") {
    return true;
  }

  // Windows drive letter (C:\ or C:/) - must come before the URL check
  if path.len() >= 3 {
    let bytes = path.as_bytes();
    if bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && (bytes[2] == b'\\' || bytes[2] == b'/') {
      return true;
    }
  }

  if path.starts_with('/') && !path.contains("://") && !path.contains('@') {
    return true;
  }

  if p.is_absolute() {
    return true;
  }

  if path.contains("://") || path.contains('@') {
    return false;
  }

  // Default to false for bare names
  false
}

/// Embed a token into an https remote so `git push` can authenticate
///
/// Local paths and non-https URLs are returned unchanged.
pub fn authenticated_url(url: &str, token: &str) -> String {
  match url.strip_prefix("https://") {
    Some(rest) if !rest.contains('@') => format!("https://x-access-token:{}@{}", token, rest),
    _ => url.to_string(),
  }
}

/// Hide credentials embedded in URLs anywhere in `text`
pub fn redact_url(text: &str) -> String {
  URL_USERINFO.replace_all(text, "${scheme}***@").into_owned()
}
