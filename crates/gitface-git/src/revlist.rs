// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Revision listing
//!
//! [`RevListFetcher`] drives `git rev-list --pretty=raw` and turns its output
//! into [`Commit`] records. The raw format is the parsing contract: each
//! commit starts with a column-0 `commit <id>` line, followed by header lines
//! (`tree`, `parent`, `author`, `committer`, ...), a blank line, and the
//! message indented by four spaces.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::commit::{
    Commit, FIELD_AUTHOR, FIELD_COMMIT, FIELD_COMMITTER, FIELD_MESSAGE, FIELD_PARENTS, FIELD_TREE,
    FieldMap,
};
use crate::error::GitError;
use crate::repository::GitRepo;
use crate::runner::GitRunner;

/// Reference listed when no target is given
pub const DEFAULT_TARGET: &str = "HEAD";

const MESSAGE_INDENT: &str = "    ";

/// Builder for one `git rev-list` fetch
#[derive(Debug)]
#[must_use]
pub struct RevListFetcher<'a, R> {
    repo: &'a GitRepo<R>,
    target: Option<String>,
    max_count: Option<usize>,
    skip: Option<usize>,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
}

impl<'a, R: GitRunner> RevListFetcher<'a, R> {
    pub(crate) fn new(repo: &'a GitRepo<R>) -> Self {
        Self {
            repo,
            target: None,
            max_count: None,
            skip: None,
            since: None,
            until: None,
        }
    }

    /// List commits reachable from this reference
    pub fn target(mut self, reference: impl Into<String>) -> Self {
        self.target = Some(reference.into());
        self
    }

    /// Return at most `n` commits
    pub fn max_count(mut self, n: usize) -> Self {
        self.max_count = Some(n);
        self
    }

    /// Skip the first `n` commits
    pub fn skip(mut self, n: usize) -> Self {
        self.skip = Some(n);
        self
    }

    /// Only include commits newer than this date
    pub fn since(mut self, date: DateTime<Utc>) -> Self {
        self.since = Some(date);
        self
    }

    /// Only include commits older than this date
    pub fn until(mut self, date: DateTime<Utc>) -> Self {
        self.until = Some(date);
        self
    }

    /// The git arguments this fetch will run
    ///
    /// # Errors
    ///
    /// Returns `GitError::InvalidReference` if the target could be mistaken
    /// for an option or is otherwise unusable.
    pub fn args(&self) -> Result<Vec<String>, GitError> {
        let target = self.target.as_deref().unwrap_or(DEFAULT_TARGET);
        validate_reference(target)?;

        let mut args = vec!["rev-list".to_string(), "--pretty=raw".to_string()];
        if let Some(n) = self.max_count {
            args.push(format!("--max-count={n}"));
        }
        if let Some(n) = self.skip {
            args.push(format!("--skip={n}"));
        }
        if let Some(date) = self.since {
            args.push(format!("--since=@{} +0000", date.timestamp()));
        }
        if let Some(date) = self.until {
            args.push(format!("--until=@{} +0000", date.timestamp()));
        }
        args.push(target.to_string());
        Ok(args)
    }

    /// Run the listing and materialize every commit, newest first
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the reference is rejected, git fails, or a block
    /// carries no commit id.
    pub fn fetch(self) -> Result<Vec<Commit>, GitError> {
        let args = self.args()?;
        let raw = self.repo.execute_git(&args)?;
        let commits = parse_rev_list(&raw)?;
        debug!(
            target = self.target.as_deref().unwrap_or(DEFAULT_TARGET),
            count = commits.len(),
            "Fetched commits"
        );
        Ok(commits)
    }
}

/// Reject references git could read as an option or that cannot name a commit
pub(crate) fn validate_reference(reference: &str) -> Result<(), GitError> {
    let unusable = reference.is_empty()
        || reference.starts_with('-')
        || reference.chars().any(|c| c.is_whitespace() || c == '\0');

    if unusable {
        return Err(GitError::InvalidReference {
            reference: reference.to_string(),
        });
    }
    Ok(())
}

/// Parse full `rev-list --pretty=raw` output, preserving order
///
/// # Errors
///
/// Returns `GitError::MissingIdentifier` if a block has no usable id.
pub fn parse_rev_list(raw: &str) -> Result<Vec<Commit>, GitError> {
    split_blocks(raw)
        .into_iter()
        .map(|block| Commit::from_fields(block_fields(block)))
        .collect()
}

/// Split raw output into commit blocks
///
/// A block starts at every line beginning with `commit `. Message lines are
/// indented and header continuation lines start with a space, so neither can
/// open a block. Text before the first block is dropped.
#[must_use]
pub fn split_blocks(raw: &str) -> Vec<&str> {
    let mut starts = Vec::new();
    let mut offset = 0;
    for line in raw.split_inclusive('\n') {
        if line.starts_with("commit ") {
            starts.push(offset);
        }
        offset += line.len();
    }

    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(raw.len());
            &raw[start..end]
        })
        .collect()
}

/// Break one commit block into its raw field map
///
/// Header lines are keyed by their tag (first occurrence wins), all `parent`
/// lines are gathered under `parents`, and the de-indented body becomes
/// `message`. Unknown headers are kept; the commit factory ignores them.
#[must_use]
pub fn block_fields(block: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    let mut parents = Vec::new();
    let mut lines = block.lines();
    let mut has_body = false;

    for line in lines.by_ref() {
        if line.is_empty() {
            has_body = true;
            break;
        }
        // Continuation of a multi-line header such as gpgsig
        if line.starts_with(' ') {
            continue;
        }
        let tag = line.split_once(' ').map_or(line, |(tag, _)| tag);
        if tag == "parent" {
            parents.push(line);
        } else {
            fields
                .entry(tag.to_string())
                .or_insert_with(|| line.to_string());
        }
    }

    if !parents.is_empty() {
        fields.insert(FIELD_PARENTS.to_string(), parents.join("\n"));
    }

    if has_body {
        let body: Vec<&str> = lines
            .map(|line| line.strip_prefix(MESSAGE_INDENT).unwrap_or(line))
            .collect();
        let message = body.join("\n");
        fields.insert(
            FIELD_MESSAGE.to_string(),
            message.trim_end_matches('\n').to_string(),
        );
    }

    fields
}

/// Render a commit back into the raw block shape `git rev-list --pretty=raw` emits
///
/// Timezones are not kept on [`Commit`], so identities are written as `+0000`.
#[must_use]
pub fn format_raw_block(commit: &Commit) -> String {
    let mut out = format!("{FIELD_COMMIT} {}\n", commit.id());
    if let Some(tree) = commit.tree() {
        out.push_str(&format!("{FIELD_TREE} {tree}\n"));
    }
    for parent in commit.parent_ids() {
        out.push_str(&format!("parent {parent}\n"));
    }
    if let (Some(author), Some(at)) = (commit.author(), commit.created_at()) {
        out.push_str(&format!("{FIELD_AUTHOR} {author} {} +0000\n", at.timestamp()));
    }
    if let (Some(committer), Some(at)) = (commit.committer(), commit.committed_at()) {
        out.push_str(&format!(
            "{FIELD_COMMITTER} {committer} {} +0000\n",
            at.timestamp()
        ));
    }
    out.push('\n');
    if let Some(message) = commit.message() {
        for line in message.lines() {
            out.push_str(MESSAGE_INDENT);
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push('\n');
    out
}
