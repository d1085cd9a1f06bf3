// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Subcommand handlers
//!
//! Each handler drives the repository façade for one subcommand and returns
//! typed results; the `format_*` functions render them for the terminal.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use gitface_git::{Commit, GitError, GitRepo, GitRunner};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Command;

// ============================================================================
// Error Types
// ============================================================================

/// Handler errors
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Git failed or the reference could not be listed
    #[error(transparent)]
    Git(#[from] GitError),

    /// JSON serialization error
    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Output Types
// ============================================================================

/// A commit together with its optionally resolved first parent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitDetails {
    /// The commit itself
    #[serde(flatten)]
    pub commit: Commit,
    /// First parent, when requested and present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Commit>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Handle `gitface log`
pub fn handle_log<R: GitRunner>(
    repo: &GitRepo<R>,
    reference: &str,
    max_count: usize,
    skip: usize,
) -> Result<Vec<Commit>, HandlerError> {
    let commits = repo.commits(reference, max_count, skip)?;
    debug!(reference, count = commits.len(), "Listed commits");
    Ok(commits)
}

/// Handle `gitface show`
///
/// The parent is only fetched when `with_parent` is set, one extra git
/// invocation.
pub fn handle_show<R: GitRunner>(
    repo: &GitRepo<R>,
    reference: &str,
    with_parent: bool,
) -> Result<CommitDetails, HandlerError> {
    let commit = repo.commit(reference)?;
    let parent = if with_parent {
        commit.parent(repo)?
    } else {
        None
    };
    Ok(CommitDetails { commit, parent })
}

/// Handle `gitface exec`
pub fn handle_exec<R: GitRunner>(
    repo: &GitRepo<R>,
    args: &[String],
) -> Result<String, HandlerError> {
    Ok(repo.execute_git(args)?)
}

/// Run a subcommand and render its output
pub fn run<R: GitRunner>(repo: &GitRepo<R>, command: &Command) -> Result<String, HandlerError> {
    match command {
        Command::Log {
            reference,
            max_count,
            skip,
            json,
        } => {
            let commits = handle_log(repo, reference, *max_count, *skip)?;
            if *json {
                Ok(format!("{}\n", serde_json::to_string_pretty(&commits)?))
            } else {
                Ok(commits.iter().map(|c| format_log_line(c) + "\n").collect())
            }
        }
        Command::Show {
            reference,
            with_parent,
            json,
        } => {
            let details = handle_show(repo, reference, *with_parent)?;
            if *json {
                Ok(format!("{}\n", serde_json::to_string_pretty(&details)?))
            } else {
                Ok(format_details(&details))
            }
        }
        Command::Exec { args } => handle_exec(repo, args),
    }
}

// ============================================================================
// Formatting
// ============================================================================

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(
        || "-".to_string(),
        |d| d.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

/// One-line summary: short id, commit date, author name, subject
#[must_use]
pub fn format_log_line(commit: &Commit) -> String {
    let date = commit
        .committed_at()
        .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
    format!(
        "{} {} {} {}",
        commit.short_id(),
        date,
        commit.author_name().unwrap_or("-"),
        commit.subject()
    )
}

/// Multi-line header in the style of `git show --no-patch`
#[must_use]
pub fn format_details(details: &CommitDetails) -> String {
    let commit = &details.commit;
    let mut out = String::new();

    let _ = writeln!(out, "commit {}", commit.id());
    if commit.is_merge() {
        let short: Vec<&str> = commit
            .parent_ids()
            .iter()
            .map(|id| id.get(..7).unwrap_or(id))
            .collect();
        let _ = writeln!(out, "Merge: {}", short.join(" "));
    }
    let _ = writeln!(out, "Author: {}", commit.author().unwrap_or("-"));
    let _ = writeln!(out, "Date:   {}", format_date(commit.created_at()));
    if commit.committer() != commit.author() {
        let _ = writeln!(out, "Commit: {}", commit.committer().unwrap_or("-"));
    }

    if let Some(message) = commit.message() {
        out.push('\n');
        for line in message.lines() {
            if line.is_empty() {
                out.push('\n');
            } else {
                let _ = writeln!(out, "    {line}");
            }
        }
    }

    if let Some(ref parent) = details.parent {
        out.push('\n');
        let _ = writeln!(out, "Parent: {}", format_log_line(parent));
    }
    out
}
