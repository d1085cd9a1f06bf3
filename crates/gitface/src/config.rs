// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for the gitface command line
//!
//! Command-line flags (with environment fallbacks) select the repository,
//! the git executable, the invocation timeout and the log level.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gitface_git::Options;
use gitface_git::options::{GIT_COMMAND, TIMEOUT_SECS};

/// Default number of commits listed by `gitface log`
pub const DEFAULT_LOG_COUNT: usize = 20;

/// gitface - browse git history as structured commit records
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "gitface")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Subcommand to run (defaults to `log`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Repository root
    ///
    /// Defaults to the current working directory.
    #[arg(short, long, env = "GITFACE_REPOSITORY")]
    pub repository: Option<PathBuf>,

    /// Path to the git executable
    #[arg(long = "git", env = "GITFACE_GIT")]
    pub git_binary: Option<PathBuf>,

    /// Kill git invocations that run longer than this many seconds (0 disables)
    #[arg(long, env = "GITFACE_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs every git invocation. Logs are written to stderr.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List commits reachable from a reference, newest first
    Log {
        /// Reference to start from; it is the first commit listed
        #[arg(default_value = "HEAD")]
        reference: String,

        /// Maximum number of commits to list
        #[arg(short = 'n', long, default_value_t = DEFAULT_LOG_COUNT)]
        max_count: usize,

        /// Number of commits to skip
        #[arg(long, default_value_t = 0)]
        skip: usize,

        /// Print JSON instead of one line per commit
        #[arg(long)]
        json: bool,
    },

    /// Show a single commit
    Show {
        /// Commit reference
        reference: String,

        /// Also resolve and include the first parent
        #[arg(long)]
        with_parent: bool,

        /// Print JSON instead of a text header
        #[arg(long)]
        json: bool,
    },

    /// Run a raw git subcommand in the repository and print its output
    ///
    /// Example:
    ///   gitface exec -- rev-parse --abbrev-ref HEAD
    Exec {
        /// Arguments passed to git
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Self::Log {
            reference: "HEAD".to_string(),
            max_count: DEFAULT_LOG_COUNT,
            skip: 0,
            json: false,
        }
    }
}

impl Config {
    /// Get the repository path, using the current directory as default
    #[must_use]
    pub fn repository_path(&self) -> PathBuf {
        self.repository
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// The subcommand to run
    #[must_use]
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }

    /// Repository options carrying the git binary and timeout overrides
    #[must_use]
    pub fn repo_options(&self) -> Options {
        let mut options = Options::new();
        if let Some(ref binary) = self.git_binary {
            options.set_option(GIT_COMMAND, binary.display().to_string());
        }
        if let Some(timeout) = self.timeout {
            options.set_option(TIMEOUT_SECS, timeout.to_string());
        }
        options
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the repository path is specified but does not
    /// exist or is not a directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref repository) = self.repository {
            if !repository.exists() {
                return Err(ConfigError::RepositoryNotFound(repository.clone()));
            }
            if !repository.is_dir() {
                return Err(ConfigError::RepositoryNotDirectory(repository.clone()));
            }
        }
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Repository path not found
    #[error("Repository path not found: {0}")]
    RepositoryNotFound(PathBuf),

    /// Repository path is not a directory
    #[error("Repository path is not a directory: {0}")]
    RepositoryNotDirectory(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.command.is_none());
        assert!(config.repository.is_none());
        assert!(config.git_binary.is_none());
        assert!(config.timeout.is_none());
        assert!(!config.verbose);
        assert!(!config.quiet);
    }

    #[test]
    fn test_default_command_is_log() {
        let config = Config::default();
        assert_eq!(
            config.command_or_default(),
            Command::Log {
                reference: "HEAD".to_string(),
                max_count: DEFAULT_LOG_COUNT,
                skip: 0,
                json: false,
            }
        );
    }

    #[test]
    fn test_repository_path_default() {
        let config = Config::default();
        assert_eq!(
            config.repository_path(),
            std::env::current_dir().expect("cwd")
        );
    }

    #[test]
    fn test_repository_path_custom() {
        let custom = PathBuf::from("/tmp");
        let config = Config {
            repository: Some(custom.clone()),
            ..Default::default()
        };
        assert_eq!(config.repository_path(), custom);
    }

    #[test]
    fn test_repo_options_empty_by_default() {
        let options = Config::default().repo_options();
        assert!(!options.has_option(GIT_COMMAND));
        assert!(!options.has_option(TIMEOUT_SECS));
    }

    #[test]
    fn test_repo_options_carry_overrides() {
        let config = Config {
            git_binary: Some(PathBuf::from("/opt/git/bin/git")),
            timeout: Some(30),
            ..Default::default()
        };
        let options = config.repo_options();
        assert_eq!(options.get_option(GIT_COMMAND, None), Some("/opt/git/bin/git"));
        assert_eq!(options.get_option(TIMEOUT_SECS, None), Some("30"));
    }

    #[test]
    fn test_log_level_default() {
        let config = Config::default();
        assert_eq!(config.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_log_level_verbose() {
        let config = Config {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_log_level_quiet() {
        let config = Config {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_validate_nonexistent_repository() {
        let config = Config {
            repository: Some(PathBuf::from("/nonexistent/path/12345")),
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::RepositoryNotFound(_))));
    }

    #[test]
    fn test_validate_file_repository() {
        let config = Config {
            repository: Some(PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"))),
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::RepositoryNotDirectory(_))));
    }

    #[test]
    fn test_validate_valid_repository() {
        let config = Config {
            repository: Some(PathBuf::from(env!("CARGO_MANIFEST_DIR"))),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
