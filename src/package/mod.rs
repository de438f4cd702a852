//! Packaging of a finished build into a single release archive
//!
//! prune dev-only files → strip ELF binaries → patch rpath → tar.gz + SHA-256
//! → build metadata. Strip and patch failures follow `package.best_effort`.

pub mod archive;
pub mod elf;
pub mod metadata;
pub mod prune;

pub use metadata::BuildMetadata;

use crate::build::BuildResult;
use crate::core::context::RunContext;
use crate::core::error::{PackageError, ReleaseError, ReleaseResult, ResultExt};
use crate::release::ReleaseNames;
use elf::ToolRun;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// The single file a run publishes
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
  pub path: PathBuf,
  /// Asset name on the release
  pub name: String,
  pub size_bytes: u64,
  pub checksum: Option<String>,
}

impl Artifact {
  /// Describe an existing archive, hashing it
  pub fn from_file(path: &Path) -> ReleaseResult<Self> {
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .ok_or_else(|| ReleaseError::message(format!("Not a file path: {}", path.display())))?;

    let mut file = std::fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let size_bytes = std::io::copy(&mut file, &mut hasher)?;

    Ok(Self {
      path: path.to_path_buf(),
      name,
      size_bytes,
      checksum: Some(format!("{:x}", hasher.finalize())),
    })
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageOutput {
  pub artifact: Artifact,
  pub names: ReleaseNames,
  pub metadata: BuildMetadata,
  pub pruned: Vec<PathBuf>,
  pub stripped: ToolRun,
  pub patched: ToolRun,
}

pub struct Packager<'a> {
  ctx: &'a RunContext,
}

impl<'a> Packager<'a> {
  pub fn new(ctx: &'a RunContext) -> Self {
    Self { ctx }
  }

  pub fn package(&self, build: &BuildResult) -> ReleaseResult<PackageOutput> {
    let config = &self.ctx.config.package;
    let install = &build.output_dir;

    let is_empty = std::fs::read_dir(install)
      .map(|mut entries| entries.next().is_none())
      .unwrap_or(true);
    if is_empty {
      return Err(ReleaseError::Package(PackageError::InstallDirMissing { path: install.clone() }));
    }

    let pruned = prune::prune(install, &config.prune)?;
    tracing::info!(count = pruned.len(), "pruned dev-only files");

    let bin = install.join("bin");
    let lib = install.join("lib");

    let stripped = if config.strip {
      let mut files = elf::elf_files(&bin)?;
      files.extend(elf::elf_files(&lib)?);
      elf::run_tool("strip", &["-s"], &files, config.best_effort)?
    } else {
      ToolRun::default()
    };

    let patched = if config.patch_rpath {
      let files = elf::elf_files(&bin)?;
      elf::run_tool("patchelf", &["--set-rpath", &config.rpath], &files, config.best_effort)?
    } else {
      ToolRun::default()
    };

    let product = &self.ctx.config.product.name;
    let names = ReleaseNames::new(product, &build.version, self.ctx.name_date().as_deref());

    let output_dir = self.ctx.resolve(&config.output_dir);
    std::fs::create_dir_all(&output_dir)
      .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let archive_path = output_dir.join(&names.archive);

    let summary = archive::create_archive(install, &archive_path)?;
    tracing::info!(
      archive = %archive_path.display(),
      size = summary.size_bytes,
      sha256 = %summary.sha256,
      "archive written"
    );

    let mut metadata = BuildMetadata::from_build(
      product,
      &self.ctx.build_date(),
      build,
      &self.ctx.config.build.source_repo,
    );
    metadata.archive = names.archive.clone();
    metadata.sha256 = Some(summary.sha256.clone());

    Ok(PackageOutput {
      artifact: Artifact {
        path: archive_path,
        name: names.archive.clone(),
        size_bytes: summary.size_bytes,
        checksum: Some(summary.sha256),
      },
      names,
      metadata,
      pruned,
      stripped,
      patched,
    })
  }
}
