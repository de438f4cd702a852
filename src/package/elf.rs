//! ELF post-processing: `strip` and `patchelf`

use crate::core::error::{PackageError, ReleaseError, ReleaseResult};
use crate::ui::progress::FileProgress;
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// Files counted per tool run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolRun {
  pub processed: usize,
  pub failed: usize,
}

/// Regular (non-symlink) ELF files under `dir`, recursively, sorted
pub fn elf_files(dir: &Path) -> ReleaseResult<Vec<PathBuf>> {
  let mut found = Vec::new();
  if dir.is_dir() {
    collect(dir, &mut found)?;
  }
  found.sort();
  Ok(found)
}

fn collect(dir: &Path, found: &mut Vec<PathBuf>) -> ReleaseResult<()> {
  for entry in std::fs::read_dir(dir)? {
    let entry = entry?;
    let file_type = entry.file_type()?;
    let path = entry.path();
    if file_type.is_dir() {
      collect(&path, found)?;
    } else if file_type.is_file() && is_elf(&path)? {
      found.push(path);
    }
  }
  Ok(())
}

pub fn is_elf(path: &Path) -> ReleaseResult<bool> {
  let mut magic = [0u8; 4];
  let mut file = File::open(path)?;
  match file.read_exact(&mut magic) {
    Ok(()) => Ok(magic == ELF_MAGIC),
    Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
    Err(e) => Err(e.into()),
  }
}

/// Run `tool args.. <file>` for each file
///
/// With `best_effort`, failures (including a missing tool) are logged and
/// counted; otherwise the first failure aborts.
pub fn run_tool(tool: &str, args: &[&str], files: &[PathBuf], best_effort: bool) -> ReleaseResult<ToolRun> {
  let mut run = ToolRun::default();
  if files.is_empty() {
    return Ok(run);
  }

  let mut progress = FileProgress::new(files.len(), tool);

  for file in files {
    let result = Command::new(tool).args(args).arg(file).output();
    let failure = match result {
      Ok(output) if output.status.success() => None,
      Ok(output) => Some(String::from_utf8_lossy(&output.stderr).to_string()),
      Err(e) => Some(format!("failed to run {}: {}", tool, e)),
    };
    progress.inc();

    if let Some(stderr) = failure {
      if !best_effort {
        return Err(ReleaseError::Package(PackageError::ToolFailed {
          tool: tool.to_string(),
          file: file.clone(),
          stderr,
        }));
      }
      tracing::warn!(tool, file = %file.display(), stderr = %stderr.trim(), "ignoring failure");
      run.failed += 1;
    } else {
      run.processed += 1;
    }
  }

  Ok(run)
}
