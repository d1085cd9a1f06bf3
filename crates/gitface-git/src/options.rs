// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Repository-level options
//!
//! A small string key/value store attached to a [`crate::GitRepo`]. Two keys
//! are understood by the crate itself:
//!
//! - [`GIT_COMMAND`]: path to the git executable
//! - [`TIMEOUT_SECS`]: per-invocation timeout in seconds (`0` disables it)
//!
//! Any other key is kept verbatim for callers.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::GitError;
use crate::runner::RunnerConfig;

/// Option key overriding the git executable
pub const GIT_COMMAND: &str = "git_command";

/// Option key for the invocation timeout, in whole seconds
pub const TIMEOUT_SECS: &str = "timeout_secs";

/// Generic option bag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    values: BTreeMap<String, String>,
}

impl Options {
    /// Create an empty option bag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_option(name, value);
        self
    }

    /// Look up an option, falling back to `default` when unset
    #[must_use]
    pub fn get_option<'a>(&'a self, name: &str, default: Option<&'a str>) -> Option<&'a str> {
        self.values.get(name).map(String::as_str).or(default)
    }

    /// Set (or replace) an option
    pub fn set_option(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Whether an option has been set
    #[must_use]
    pub fn has_option(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Derive the runner configuration from the recognised keys
    ///
    /// # Errors
    ///
    /// Returns `GitError::InvalidOption` if `timeout_secs` is not an integer.
    pub fn runner_config(&self) -> Result<RunnerConfig, GitError> {
        let mut config = RunnerConfig::default();

        if let Some(command) = self.get_option(GIT_COMMAND, None) {
            config.git_binary = PathBuf::from(command);
        }

        if let Some(raw) = self.get_option(TIMEOUT_SECS, None) {
            let secs: u64 = raw.trim().parse().map_err(|_| GitError::InvalidOption {
                name: TIMEOUT_SECS.to_string(),
                value: raw.to_string(),
            })?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
