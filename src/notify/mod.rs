//! Progress notifications to a Telegram chat
//!
//! Notifications never affect the outcome of a run: delivery failures are
//! logged and dropped.

use crate::core::context::RunContext;
use crate::core::error::ReleaseResult;
use std::path::Path;
use std::process::Command;

pub trait Notifier {
  fn send_text(&self, message: &str);

  fn send_file(&self, path: &Path, caption: &str);
}

/// Telegram bot API through `curl`
pub struct TelegramNotifier {
  api_base: String,
  token: String,
  chat: String,
}

impl TelegramNotifier {
  pub fn new(api_base: &str, token: &str, chat: &str) -> Self {
    Self {
      api_base: api_base.trim_end_matches('/').to_string(),
      token: token.to_string(),
      chat: chat.to_string(),
    }
  }

  fn endpoint(&self, method: &str) -> String {
    format!("{}/bot{}/{}", self.api_base, self.token, method)
  }

  fn deliver(&self, method: &str, mut cmd: Command) {
    cmd.args(["-fsS", "--max-time", "60", "-o", "/dev/null"]);
    cmd.arg(self.endpoint(method));

    match cmd.output() {
      Ok(output) if output.status.success() => tracing::debug!(method, "notification sent"),
      Ok(output) => {
        // curl echoes the URL on some errors; keep the token out of logs
        let stderr = String::from_utf8_lossy(&output.stderr).replace(&self.token, "***");
        tracing::warn!(method, status = %output.status, stderr = %stderr.trim(), "notification failed");
      }
      Err(e) => tracing::warn!(method, error = %e, "failed to run curl"),
    }
  }
}

impl Notifier for TelegramNotifier {
  fn send_text(&self, message: &str) {
    let mut cmd = Command::new("curl");
    cmd
      .args(["--data-urlencode", &format!("chat_id={}", self.chat)])
      .args(["--data-urlencode", &format!("text={}", message)]);
    self.deliver("sendMessage", cmd);
  }

  fn send_file(&self, path: &Path, caption: &str) {
    if !path.exists() {
      tracing::warn!(path = %path.display(), "not sending missing file");
      return;
    }
    let mut cmd = Command::new("curl");
    cmd
      .args(["-F", &format!("chat_id={}", self.chat)])
      .args(["-F", &form_file("document", path)])
      // Literal caption: no `@file` / `<file` expansion
      .args(["--form-string", &format!("caption={}", caption)]);
    self.deliver("sendDocument", cmd);
  }
}

/// `-F` value uploading `path`, quoted so `;` and `,` in the name stay literal
fn form_file(field: &str, path: &Path) -> String {
  let escaped = path.to_string_lossy().replace('\\', "\\\\").replace('"', "\\\"");
  format!("{}=@\"{}\"", field, escaped)
}

/// Swallows everything (`notify.enabled = false`)
pub struct DisabledNotifier;

impl Notifier for DisabledNotifier {
  fn send_text(&self, message: &str) {
    tracing::debug!(message, "notifications disabled");
  }

  fn send_file(&self, path: &Path, _caption: &str) {
    tracing::debug!(path = %path.display(), "notifications disabled");
  }
}

/// Notifier for the run; enabled notifications need Telegram credentials
pub fn notifier_for(ctx: &RunContext) -> ReleaseResult<Box<dyn Notifier>> {
  if !ctx.config.notify.enabled {
    return Ok(Box::new(DisabledNotifier));
  }
  let (token, chat) = ctx.credentials.require_telegram()?;
  Ok(Box::new(TelegramNotifier::new(&ctx.config.notify.api_base, token, chat)))
}
