// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Repository façade
//!
//! [`GitRepo`] ties a repository root to a [`GitRunner`] and an option bag,
//! and is the entry point for listing commits.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::commit::Commit;
use crate::error::GitError;
use crate::options::{GIT_COMMAND, Options, TIMEOUT_SECS};
use crate::revlist::{RevListFetcher, validate_reference};
use crate::runner::{GitRunner, SystemGitRunner};

/// Option keys consumed when the runner is built
const RUNNER_KEYS: [&str; 2] = [GIT_COMMAND, TIMEOUT_SECS];

/// A git repository on disk
#[derive(Debug)]
pub struct GitRepo<R = SystemGitRunner> {
    root: PathBuf,
    options: Options,
    runner: R,
}

impl GitRepo<SystemGitRunner> {
    /// Open the repository rooted at `path` using the system git
    ///
    /// # Errors
    ///
    /// Returns `GitError::InvalidRepository` if the path is not a readable
    /// directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        Self::with_options(path, Options::new())
    }

    /// Open with options; `git_command` and `timeout_secs` configure the runner
    ///
    /// # Errors
    ///
    /// Returns `GitError::InvalidRepository` for a bad root and
    /// `GitError::InvalidOption` for an unparsable runner option.
    pub fn with_options(path: impl AsRef<Path>, options: Options) -> Result<Self, GitError> {
        let runner = SystemGitRunner::new(options.runner_config()?);
        let mut repo = Self::with_runner(path, runner)?;
        repo.options = options;
        Ok(repo)
    }
}

impl<R: GitRunner> GitRepo<R> {
    /// Open the repository rooted at `path` with a custom runner
    ///
    /// # Errors
    ///
    /// Returns `GitError::InvalidRepository` if the path is not a readable
    /// directory.
    pub fn with_runner(path: impl AsRef<Path>, runner: R) -> Result<Self, GitError> {
        let path = path.as_ref();
        if !path.is_dir() || std::fs::read_dir(path).is_err() {
            return Err(GitError::InvalidRepository {
                path: path.display().to_string(),
            });
        }

        debug!(root = %path.display(), "Opened repository");
        Ok(Self {
            root: path.to_path_buf(),
            options: Options::new(),
            runner,
        })
    }

    /// The repository root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The runner executing git for this repository
    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Look up a repository option, falling back to `default`
    #[must_use]
    pub fn get_option<'a>(&'a self, name: &str, default: Option<&'a str>) -> Option<&'a str> {
        self.options.get_option(name, default)
    }

    /// Set a repository option
    ///
    /// Runner keys only take effect when passed to [`GitRepo::with_options`];
    /// setting one afterwards is stored but logged as ignored.
    pub fn set_option(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if RUNNER_KEYS.contains(&name) {
            warn!(
                option = name,
                value = %value,
                "Runner option set after construction; the running configuration is unchanged"
            );
        }
        self.options.set_option(name, value);
    }

    /// Whether a repository option is set
    #[must_use]
    pub fn has_option(&self, name: &str) -> bool {
        self.options.has_option(name)
    }

    /// Run a git subcommand in the repository root and return its stdout
    ///
    /// # Errors
    ///
    /// Returns `GitError::Execution` with the captured output when git exits
    /// non-zero, or `Spawn`/`Timeout` from the runner.
    pub fn execute_git<I, S>(&self, args: I) -> Result<String, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        self.runner.run(&self.root, &args)
    }

    /// Start a revision listing
    pub fn rev_list(&self) -> RevListFetcher<'_, R> {
        RevListFetcher::new(self)
    }

    /// Up to `max_results` commits starting at `reference` itself, skipping `offset`
    ///
    /// The reference is the first result and up to `max_results - 1` of its
    /// ancestors follow. Asking for zero results does not run git.
    ///
    /// # Errors
    ///
    /// Propagates any `GitError` from the listing.
    pub fn commits(
        &self,
        reference: &str,
        max_results: usize,
        offset: usize,
    ) -> Result<Vec<Commit>, GitError> {
        if max_results == 0 {
            return Ok(Vec::new());
        }
        self.rev_list()
            .target(reference)
            .max_count(max_results)
            .skip(offset)
            .fetch()
    }

    /// The single commit `reference` points at
    ///
    /// # Errors
    ///
    /// Returns `GitError::InvalidReference` if nothing was listed, or any
    /// error from the listing itself.
    pub fn commit(&self, reference: &str) -> Result<Commit, GitError> {
        self.rev_list()
            .target(reference)
            .max_count(1)
            .fetch()?
            .into_iter()
            .next()
            .ok_or_else(|| GitError::InvalidReference {
                reference: reference.to_string(),
            })
    }

    /// The commit id HEAD resolves to
    ///
    /// # Errors
    ///
    /// Returns `GitError` if HEAD cannot be resolved.
    pub fn head_sha(&self) -> Result<String, GitError> {
        let out = self.execute_git(["rev-parse", "--verify", "HEAD"])?;
        Ok(out.trim().to_string())
    }

    /// Number of commits reachable from `reference`
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the reference is rejected or git fails.
    pub fn commit_count(&self, reference: &str) -> Result<usize, GitError> {
        validate_reference(reference)?;
        let out = self.execute_git(["rev-list", "--count", reference])?;
        out.trim().parse().map_err(|_| GitError::Execution {
            command: format!("git rev-list --count {reference}"),
            status: Some(0),
            output: out,
        })
    }
}
