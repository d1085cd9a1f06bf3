// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for gitface-git

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during git operations
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository root is not an accessible directory
    #[error("Invalid repository: {path} is not a readable directory")]
    InvalidRepository {
        /// The path that was given as repository root
        path: String,
    },

    /// The git process exited with a non-zero status
    #[error("Git command failed ({command}, status {}): {output}", describe_status(.status))]
    Execution {
        /// The command line that was run
        command: String,
        /// Exit code, `None` when terminated by a signal
        status: Option<i32>,
        /// Captured stdout followed by stderr
        output: String,
    },

    /// The git binary could not be started
    #[error("Failed to spawn {command}: {source}")]
    Spawn {
        /// The command line that was attempted
        command: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The git process did not finish in time and was killed
    #[error("Git command timed out after {}s: {command}", .timeout.as_secs())]
    Timeout {
        /// The command line that was run
        command: String,
        /// The configured limit
        timeout: Duration,
    },

    /// A commit block carried no usable `commit <id>` line
    #[error("The commit object must have an id")]
    MissingIdentifier,

    /// A reference that cannot be passed to git safely
    #[error("Invalid commit reference: {reference}")]
    InvalidReference {
        /// The rejected reference
        reference: String,
    },

    /// An option value that could not be interpreted
    #[error("Invalid value for option {name}: {value}")]
    InvalidOption {
        /// Option name
        name: String,
        /// Offending value
        value: String,
    },
}

fn describe_status(status: &Option<i32>) -> String {
    status.map_or_else(|| "signal".to_string(), |code| code.to_string())
}

/// Rejections reported by the field setters of [`crate::Commit`]
///
/// These never abort record construction; the field is left unset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The raw line did not start with the expected tag
    #[error("expected `{expected}` line, got {found:?}")]
    TagMismatch {
        /// Tag the setter accepts
        expected: &'static str,
        /// The raw line that was rejected
        found: String,
    },

    /// The tag was present but no value followed it
    #[error("`{field}` line has no value")]
    MissingValue {
        /// Field name
        field: &'static str,
    },

    /// The value did not have the expected `<name> <epoch> <tz>` shape
    #[error("`{field}` value is malformed: {value:?}")]
    Malformed {
        /// Field name
        field: &'static str,
        /// The rejected value
        value: String,
    },

    /// The field was already populated
    #[error("`{field}` is already set")]
    AlreadySet {
        /// Field name
        field: &'static str,
    },
}
