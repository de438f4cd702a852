//! Core engine for toolchain-release
//!
//! - **config**: release.toml parsing and validation
//! - **context**: run context (config, credentials, dates) shared by every stage
//! - **error**: error types with contextual help messages and exit codes
//! - **vcs**: git operations through system git (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
