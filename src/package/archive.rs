//! Gzipped tarball of the install tree, hashed while it is written

use crate::core::error::{PackageError, ReleaseError, ReleaseResult};
use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Size and SHA-256 of a written archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
  pub size_bytes: u64,
  pub sha256: String,
}

/// Writer that counts and hashes everything passing through
struct HashingWriter<W> {
  inner: W,
  hasher: Sha256,
  written: u64,
}

impl<W: Write> Write for HashingWriter<W> {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    let n = self.inner.write(buf)?;
    self.hasher.update(&buf[..n]);
    self.written += n as u64;
    Ok(n)
  }

  fn flush(&mut self) -> io::Result<()> {
    self.inner.flush()
  }
}

/// Archive the contents of `src_dir` into `dest`
///
/// Entries are stored relative to `src_dir` (no top-level folder), sorted by
/// name at every level, with symlinks kept as links.
pub fn create_archive(src_dir: &Path, dest: &Path) -> ReleaseResult<ArchiveSummary> {
  write_archive(src_dir, dest).map_err(|e| {
    ReleaseError::Package(PackageError::ArchiveFailed {
      path: dest.to_path_buf(),
      reason: e.to_string(),
    })
  })
}

fn write_archive(src_dir: &Path, dest: &Path) -> io::Result<ArchiveSummary> {
  let file = BufWriter::new(File::create(dest)?);
  let hashing = HashingWriter {
    inner: file,
    hasher: Sha256::new(),
    written: 0,
  };

  let mut builder = tar::Builder::new(GzEncoder::new(hashing, Compression::best()));
  builder.follow_symlinks(false);

  append_sorted(&mut builder, src_dir, Path::new(""))?;

  let mut hashing = builder.into_inner()?.finish()?;
  hashing.flush()?;

  Ok(ArchiveSummary {
    size_bytes: hashing.written,
    sha256: format!("{:x}", hashing.hasher.finalize()),
  })
}

/// Depth-first, each directory's entries in name order
fn append_sorted<W: Write>(builder: &mut tar::Builder<W>, dir: &Path, prefix: &Path) -> io::Result<()> {
  let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<Result<_, _>>()?;
  entries.sort_by_key(|e| e.file_name());

  for entry in entries {
    let path = entry.path();
    let name = prefix.join(entry.file_name());
    // file_type() does not follow symlinks
    if entry.file_type()?.is_dir() {
      builder.append_dir(&name, &path)?;
      append_sorted(builder, &path, &name)?;
    } else {
      builder.append_path_with_name(&path, &name)?;
    }
  }
  Ok(())
}
