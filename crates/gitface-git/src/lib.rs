// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gitface-git: an object façade over a local git repository
//!
//! This library crate shells out to the `git` executable, captures its
//! output, and turns `git rev-list --pretty=raw` text into [`Commit`]
//! records.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use gitface_git::GitRepo;
//!
//! let repo = GitRepo::open(".").expect("open repo");
//! let commits = repo.commits("HEAD", 10, 0).expect("list commits");
//!
//! for c in &commits {
//!     println!("{} - {}", c.short_id(), c.subject());
//! }
//!
//! if let Some(parent) = commits[0].parent(&repo).expect("resolve parent") {
//!     println!("parent: {}", parent.id());
//! }
//! ```

pub mod commit;
pub mod error;
pub mod options;
pub mod repository;
pub mod revlist;
pub mod runner;

pub use commit::{Commit, FieldMap, parse_user};
pub use error::{FieldError, GitError};
pub use options::Options;
pub use repository::GitRepo;
pub use revlist::{RevListFetcher, parse_rev_list};
pub use runner::{GitRunner, RunnerConfig, SystemGitRunner};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::commit::Commit;
    pub use crate::error::{FieldError, GitError};
    pub use crate::options::Options;
    pub use crate::repository::GitRepo;
    pub use crate::runner::{GitRunner, RunnerConfig};
}
