pub mod system_git;
mod system_git_ops;

pub use system_git::{CommitIdentity, SystemGit};
