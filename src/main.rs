mod build;
mod commands;
mod core;
mod notify;
mod package;
mod release;
mod ui;
mod utils;

use clap::{Parser, Subcommand};
use core::error::{ReleaseError, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "TOOLCHAIN_RELEASE_LOG";

/// Build, package and publish Clang/LLVM toolchain releases
#[derive(Parser)]
#[command(name = "toolchain-release")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Explicit configuration file (default: search release.toml in the current directory)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Automated mode: enable the build-date guard (also enabled by CI=true)
  #[arg(long, global = true)]
  ci: bool,

  /// Debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Setup
  // ============================================================================
  /// Write a default release.toml
  Init {
    /// Product name used in archive and tag names
    #[arg(long)]
    product: String,
    /// Release repository ("owner/repo")
    #[arg(long)]
    repo: String,
    /// Overwrite an existing configuration
    #[arg(long)]
    force: bool,
  },

  // ============================================================================
  // Pipeline
  // ============================================================================
  /// Run the whole pipeline: guard, build, package, publish
  Run {
    /// Package the existing install dir instead of building
    #[arg(long)]
    skip_build: bool,
  },

  /// Run the build scripts
  Build {
    /// Output the build result in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Prune, strip, patch and archive an install dir
  Package {
    /// Install dir (default: build.install_dir)
    #[arg(long)]
    install_dir: Option<PathBuf>,
    /// Clang version to use instead of asking the built compiler
    #[arg(long)]
    clang_version: Option<String>,
    /// LLVM source commit
    #[arg(long)]
    commit: Option<String>,
    /// Output the package summary in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Record and publish an archive as a GitHub release
  Publish {
    /// Archive to upload
    #[arg(long)]
    archive: PathBuf,
    /// Release tag (default: derived from the archive name)
    #[arg(long)]
    tag: Option<String>,
    /// Release description
    #[arg(long, conflicts_with = "description_file")]
    description: Option<String>,
    /// Read the release description from a file
    #[arg(long)]
    description_file: Option<PathBuf>,
    /// Output the publish report in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Check whether today's build was already published
  Guard {
    /// Date text to compare (default: today, %Y%m%d in the configured timezone)
    #[arg(long)]
    date: Option<String>,
    /// Marker location, URL or path (default: from release config)
    #[arg(long)]
    marker: Option<String>,
    /// Output the decision in JSON format
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_tracing(verbose: bool) {
  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => handle_error(ReleaseError::from(e).context("Failed to get current directory")),
  };

  let command = match cli.command {
    // init runs before release.toml exists
    Commands::Init { product, repo, force } => {
      if let Err(err) = commands::run_init(&root, product, repo, force) {
        handle_error(err);
      }
      return;
    }
    command => command,
  };

  let ci = cli.ci || core::context::ci_from_env();
  let ctx = match commands::load_context(&root, cli.config.as_deref(), ci) {
    Ok(ctx) => ctx,
    Err(err) => handle_error(err),
  };

  let result = match command {
    Commands::Init { .. } => Ok(()),
    Commands::Run { skip_build } => commands::run_pipeline(&ctx, skip_build),
    Commands::Build { json } => commands::run_build(&ctx, json),
    Commands::Package {
      install_dir,
      clang_version,
      commit,
      json,
    } => commands::run_package(
      &ctx,
      commands::package::PackageArgs {
        install_dir,
        version: clang_version,
        commit,
        json,
      },
    ),
    Commands::Publish {
      archive,
      tag,
      description,
      description_file,
      json,
    } => commands::run_publish(
      &ctx,
      commands::publish::PublishArgs {
        archive,
        tag,
        description,
        description_file,
        json,
      },
    ),
    Commands::Guard { date, marker, json } => commands::run_guard(&ctx, date, marker, json),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
