// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Git commit records
//!
//! A [`Commit`] is assembled from the raw field lines of one commit block.
//! Each field has a setter that checks the line's tag prefix before taking
//! the value; rejected lines leave the field unset and are reported as
//! [`FieldError`]s instead of aborting construction.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{FieldError, GitError};
use crate::repository::GitRepo;
use crate::runner::GitRunner;

/// Raw field name to raw field text, as produced by the rev-list parser
pub type FieldMap = BTreeMap<String, String>;

/// Key holding the `commit <id>` line
pub const FIELD_COMMIT: &str = "commit";
/// Key holding the `tree <id>` line
pub const FIELD_TREE: &str = "tree";
/// Key holding every `parent <id>` line, newline separated
pub const FIELD_PARENTS: &str = "parents";
/// Key holding the `author ...` line
pub const FIELD_AUTHOR: &str = "author";
/// Key holding the `committer ...` line
pub const FIELD_COMMITTER: &str = "committer";
/// Key holding the de-indented message body
pub const FIELD_MESSAGE: &str = "message";

type Setter = fn(&mut Commit, &str) -> Result<(), FieldError>;

/// Recognised field keys and the setter each one feeds
const FIELD_SETTERS: &[(&str, Setter)] = &[
    (FIELD_TREE, Commit::set_tree),
    (FIELD_PARENTS, Commit::set_parents),
    (FIELD_AUTHOR, Commit::set_author),
    (FIELD_COMMITTER, Commit::set_committer),
    ("commiter", Commit::set_committer),
    (FIELD_MESSAGE, Commit::set_message),
];

/// A parsed git commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    id: String,
    tree: Option<String>,
    parents: Vec<String>,
    author: Option<String>,
    created_at: Option<DateTime<Utc>>,
    committer: Option<String>,
    committed_at: Option<DateTime<Utc>>,
    message: Option<String>,
}

impl Commit {
    /// Create a record holding only its id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tree: None,
            parents: Vec::new(),
            author: None,
            created_at: None,
            committer: None,
            committed_at: None,
            message: None,
        }
    }

    /// Build a record from a raw field map
    ///
    /// Field-level problems are logged and the affected fields stay unset.
    ///
    /// # Errors
    ///
    /// Returns `GitError::MissingIdentifier` if the `commit` entry is absent,
    /// empty, or carries no id.
    pub fn from_fields(fields: FieldMap) -> Result<Self, GitError> {
        let (commit, problems) = Self::from_fields_with_diagnostics(fields)?;
        for problem in &problems {
            warn!(id = %commit.id, error = %problem, "Ignoring malformed commit field");
        }
        Ok(commit)
    }

    /// Build a record and return the field errors alongside it
    ///
    /// # Errors
    ///
    /// Returns `GitError::MissingIdentifier` under the same conditions as
    /// [`Commit::from_fields`].
    pub fn from_fields_with_diagnostics(
        mut fields: FieldMap,
    ) -> Result<(Self, Vec<FieldError>), GitError> {
        let raw_id = fields
            .remove(FIELD_COMMIT)
            .ok_or(GitError::MissingIdentifier)?;
        let id = match raw_id.split_once(' ') {
            Some((FIELD_COMMIT, id)) if !id.is_empty() => id,
            _ => return Err(GitError::MissingIdentifier),
        };

        let mut commit = Self::new(id);
        let mut problems = Vec::new();

        for (key, value) in &fields {
            let Some((_, setter)) = FIELD_SETTERS.iter().find(|(name, _)| *name == key.as_str()) else {
                continue;
            };
            if let Err(problem) = setter(&mut commit, value) {
                problems.push(problem);
            }
        }

        Ok((commit, problems))
    }

    /// Set the tree from a `tree <id>` line
    ///
    /// # Errors
    ///
    /// Returns a `FieldError` if the tag is wrong, the value is missing, or
    /// the tree is already set.
    pub fn set_tree(&mut self, raw: &str) -> Result<(), FieldError> {
        if self.tree.is_some() {
            return Err(FieldError::AlreadySet { field: FIELD_TREE });
        }
        let value = strip_tag(raw, &["tree"])?;
        self.tree = Some(value.to_string());
        Ok(())
    }

    /// Set the parents from one or more `parent <id>` lines
    ///
    /// Either every line is accepted or none is.
    ///
    /// # Errors
    ///
    /// Returns a `FieldError` for the first rejected line, or if parents are
    /// already set.
    pub fn set_parents(&mut self, raw: &str) -> Result<(), FieldError> {
        if !self.parents.is_empty() {
            return Err(FieldError::AlreadySet {
                field: FIELD_PARENTS,
            });
        }

        let parents = raw
            .lines()
            .map(|line| strip_tag(line, &["parent"]).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;

        if parents.is_empty() {
            return Err(FieldError::MissingValue {
                field: FIELD_PARENTS,
            });
        }

        self.parents = parents;
        Ok(())
    }

    /// Set author identity and creation time from an `author ...` line
    ///
    /// # Errors
    ///
    /// Returns a `FieldError` if the tag is wrong, the identity cannot be
    /// parsed, or the author is already set.
    pub fn set_author(&mut self, raw: &str) -> Result<(), FieldError> {
        if self.author.is_some() || self.created_at.is_some() {
            return Err(FieldError::AlreadySet {
                field: FIELD_AUTHOR,
            });
        }
        let value = strip_tag(raw, &["author"])?;
        let (name, time) = user_fields(FIELD_AUTHOR, value)?;
        self.author = Some(name);
        self.created_at = Some(time);
        Ok(())
    }

    /// Set committer identity and commit time from a `committer ...` line
    ///
    /// The misspelled `commiter` tag is accepted as well.
    ///
    /// # Errors
    ///
    /// Returns a `FieldError` if the tag is wrong, the identity cannot be
    /// parsed, or the committer is already set.
    pub fn set_committer(&mut self, raw: &str) -> Result<(), FieldError> {
        if self.committer.is_some() || self.committed_at.is_some() {
            return Err(FieldError::AlreadySet {
                field: FIELD_COMMITTER,
            });
        }
        let value = strip_tag(raw, &["committer", "commiter"])?;
        let (name, time) = user_fields(FIELD_COMMITTER, value)?;
        self.committer = Some(name);
        self.committed_at = Some(time);
        Ok(())
    }

    /// Set the message body
    ///
    /// # Errors
    ///
    /// Returns `FieldError::AlreadySet` if a message is already present.
    pub fn set_message(&mut self, raw: &str) -> Result<(), FieldError> {
        if self.message.is_some() {
            return Err(FieldError::AlreadySet {
                field: FIELD_MESSAGE,
            });
        }
        self.message = Some(raw.to_string());
        Ok(())
    }

    /// The commit id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The tree id
    #[must_use]
    pub fn tree(&self) -> Option<&str> {
        self.tree.as_deref()
    }

    /// Whether a parent reference was recorded
    #[must_use]
    pub fn has_parents(&self) -> bool {
        !self.parents.is_empty()
    }

    /// The first parent id
    #[must_use]
    pub fn parent_ref(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    /// All parent ids in listing order
    #[must_use]
    pub fn parent_ids(&self) -> &[String] {
        &self.parents
    }

    /// Resolve the first parent into a full record
    ///
    /// Runs a fresh one-commit listing on every call. Returns `Ok(None)` for
    /// root commits and when the listing comes back empty.
    ///
    /// # Errors
    ///
    /// Propagates any `GitError` from running the listing.
    pub fn parent<R: GitRunner>(&self, repo: &GitRepo<R>) -> Result<Option<Self>, GitError> {
        let Some(parent) = self.parent_ref() else {
            return Ok(None);
        };
        let commits = repo.rev_list().target(parent).max_count(1).fetch()?;
        Ok(commits.into_iter().next())
    }

    /// Author identity (`Name <email>`)
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Author timestamp
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Committer identity (`Name <email>`)
    #[must_use]
    pub fn committer(&self) -> Option<&str> {
        self.committer.as_deref()
    }

    /// Committer timestamp
    #[must_use]
    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        self.committed_at
    }

    /// The message body
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Validate that a SHA is a valid 40-character hex string
    #[must_use]
    pub fn is_valid_sha(sha: &str) -> bool {
        sha.len() == 40 && sha.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Get the short id (first 7 characters)
    #[must_use]
    pub fn short_id(&self) -> &str {
        self.id.get(..7).unwrap_or(&self.id)
    }

    /// Check if this is a merge commit (has multiple parents)
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Check if this is a root commit (has no parents)
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Get the first line of the commit message (subject)
    #[must_use]
    pub fn subject(&self) -> &str {
        self.message
            .as_deref()
            .and_then(|m| m.lines().next())
            .unwrap_or("")
    }

    /// Author name without the email part
    #[must_use]
    pub fn author_name(&self) -> Option<&str> {
        self.author.as_deref().map(|a| split_identity(a).0)
    }

    /// Author email, if the identity carried one
    #[must_use]
    pub fn author_email(&self) -> Option<&str> {
        self.author.as_deref().and_then(|a| split_identity(a).1)
    }

    /// Committer name without the email part
    #[must_use]
    pub fn committer_name(&self) -> Option<&str> {
        self.committer.as_deref().map(|c| split_identity(c).0)
    }

    /// Committer email, if the identity carried one
    #[must_use]
    pub fn committer_email(&self) -> Option<&str> {
        self.committer.as_deref().and_then(|c| split_identity(c).1)
    }
}

/// Split `"<name> <epoch-seconds> <tz>"` into name and timestamp
///
/// The name is everything before the last numeric token that is followed by
/// another token. Anything that does not fit yields `(None, None)`.
#[must_use]
pub fn parse_user(user_and_timestamp: &str) -> (Option<String>, Option<DateTime<Utc>>) {
    let tokens: Vec<&str> = user_and_timestamp.split(' ').collect();

    // Last token is the timezone, so the epoch can sit at most one before it
    let epoch_at = (1..tokens.len().saturating_sub(1))
        .rev()
        .find(|&i| !tokens[i].is_empty() && tokens[i].bytes().all(|b| b.is_ascii_digit()));

    let Some(i) = epoch_at else {
        return (None, None);
    };

    let name = tokens[..i].join(" ");
    if name.is_empty() {
        return (None, None);
    }

    match tokens[i]
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
    {
        Some(time) => (Some(name), Some(time)),
        None => (None, None),
    }
}

fn user_fields(field: &'static str, value: &str) -> Result<(String, DateTime<Utc>), FieldError> {
    match parse_user(value) {
        (Some(name), Some(time)) => Ok((name, time)),
        _ => Err(FieldError::Malformed {
            field,
            value: value.to_string(),
        }),
    }
}

/// Accept `raw` if it starts with one of `tags` followed by a space and a value
fn strip_tag<'a>(raw: &'a str, tags: &[&'static str]) -> Result<&'a str, FieldError> {
    let expected = tags[0];
    match raw.split_once(' ') {
        Some((tag, value)) if tags.contains(&tag) => {
            if value.is_empty() {
                Err(FieldError::MissingValue { field: expected })
            } else {
                Ok(value)
            }
        }
        None if tags.contains(&raw) => Err(FieldError::MissingValue { field: expected }),
        _ => Err(FieldError::TagMismatch {
            expected,
            found: raw.to_string(),
        }),
    }
}

/// Split `Name <email>` into its parts
fn split_identity(identity: &str) -> (&str, Option<&str>) {
    match identity.rfind(" <") {
        Some(at) if identity.ends_with('>') => (
            &identity[..at],
            Some(&identity[at + 2..identity.len() - 1]),
        ),
        _ => (identity, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    const SHA: &str = "1945ab9c752534e733c38ba0109dc3b741f0a6eb";
    const TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";
    const PARENT: &str = "c460aeb7fb2d109c17e43de0ce681faec0b7374d";

    fn sample_fields() -> FieldMap {
        [
            (FIELD_COMMIT, format!("commit {SHA}")),
            (FIELD_TREE, format!("tree {TREE}")),
            (FIELD_PARENTS, format!("parent {PARENT}")),
            (
                FIELD_AUTHOR,
                "author Test Author <test@example.com> 1768617186 +0900".to_string(),
            ),
            (
                FIELD_COMMITTER,
                "committer Test Committer <ci@example.com> 1768617200 +0000".to_string(),
            ),
            (
                FIELD_MESSAGE,
                "feat(log): add rev-list fetcher\n\nDetailed description here.".to_string(),
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    #[test]
    fn test_from_fields_populates_everything() {
        let commit = Commit::from_fields(sample_fields()).expect("commit");

        assert_eq!(commit.id(), SHA);
        assert_eq!(commit.tree(), Some(TREE));
        assert_eq!(commit.parent_ref(), Some(PARENT));
        assert_eq!(commit.author(), Some("Test Author <test@example.com>"));
        assert_eq!(
            commit.created_at(),
            Some(Utc.timestamp_opt(1_768_617_186, 0).unwrap())
        );
        assert_eq!(commit.committer(), Some("Test Committer <ci@example.com>"));
        assert_eq!(
            commit.committed_at(),
            Some(Utc.timestamp_opt(1_768_617_200, 0).unwrap())
        );
        assert_eq!(commit.subject(), "feat(log): add rev-list fetcher");
    }

    #[test]
    fn test_from_fields_missing_commit_entry() {
        let mut fields = sample_fields();
        fields.remove(FIELD_COMMIT);
        assert!(matches!(
            Commit::from_fields(fields),
            Err(GitError::MissingIdentifier)
        ));
    }

    #[test]
    fn test_from_fields_empty_commit_entry() {
        for raw in ["", "commit", "commit "] {
            let mut fields = sample_fields();
            fields.insert(FIELD_COMMIT.to_string(), raw.to_string());
            assert!(
                matches!(
                    Commit::from_fields(fields),
                    Err(GitError::MissingIdentifier)
                ),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_fields_ignores_unknown_keys() {
        let mut fields = sample_fields();
        fields.insert("gpgsig".to_string(), "-----BEGIN PGP SIGNATURE-----".to_string());
        fields.insert("encoding".to_string(), "encoding ISO-8859-1".to_string());

        let (commit, problems) = Commit::from_fields_with_diagnostics(fields).expect("commit");
        assert_eq!(commit.id(), SHA);
        assert!(problems.is_empty());
    }

    #[test]
    fn test_from_fields_degrades_on_bad_fields() {
        let mut fields = sample_fields();
        fields.insert(FIELD_TREE.to_string(), format!("nottree {TREE}"));
        fields.insert(FIELD_AUTHOR.to_string(), "author garbage".to_string());

        let (commit, problems) = Commit::from_fields_with_diagnostics(fields).expect("commit");
        assert_eq!(commit.tree(), None);
        assert_eq!(commit.author(), None);
        assert_eq!(commit.created_at(), None);
        // Untouched fields still land
        assert_eq!(commit.parent_ref(), Some(PARENT));
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn test_misspelled_committer_key_is_accepted() {
        let mut fields = sample_fields();
        let committer = fields.remove(FIELD_COMMITTER).unwrap();
        fields.insert("commiter".to_string(), committer.replacen("committer", "commiter", 1));

        let commit = Commit::from_fields(fields).expect("commit");
        assert_eq!(commit.committer_name(), Some("Test Committer"));
    }

    #[test]
    fn test_set_tree() {
        let mut commit = Commit::new(SHA);
        assert_eq!(commit.set_tree("tree abc123"), Ok(()));
        assert_eq!(commit.tree(), Some("abc123"));
    }

    #[test]
    fn test_set_tree_tag_mismatch() {
        let mut commit = Commit::new(SHA);
        let result = commit.set_tree("nottree abc123");
        assert_eq!(
            result,
            Err(FieldError::TagMismatch {
                expected: "tree",
                found: "nottree abc123".to_string()
            })
        );
        assert_eq!(commit.tree(), None);
    }

    #[test]
    fn test_set_tree_missing_value() {
        let mut commit = Commit::new(SHA);
        assert_eq!(
            commit.set_tree("tree"),
            Err(FieldError::MissingValue { field: "tree" })
        );
        assert_eq!(
            commit.set_tree("tree "),
            Err(FieldError::MissingValue { field: "tree" })
        );
    }

    #[test]
    fn test_set_tree_only_once() {
        let mut commit = Commit::new(SHA);
        commit.set_tree("tree first").expect("first set");
        assert_eq!(
            commit.set_tree("tree second"),
            Err(FieldError::AlreadySet { field: "tree" })
        );
        assert_eq!(commit.tree(), Some("first"));
    }

    #[test]
    fn test_set_parents_merge() {
        let mut commit = Commit::new(SHA);
        commit
            .set_parents(&format!("parent {PARENT}\nparent {TREE}"))
            .expect("parents");
        assert!(commit.is_merge());
        assert_eq!(commit.parent_ref(), Some(PARENT));
        assert_eq!(commit.parent_ids(), [PARENT.to_string(), TREE.to_string()]);
    }

    #[test]
    fn test_set_parents_rejects_all_on_bad_line() {
        let mut commit = Commit::new(SHA);
        let result = commit.set_parents(&format!("parent {PARENT}\ntree {TREE}"));
        assert!(matches!(result, Err(FieldError::TagMismatch { .. })));
        assert!(!commit.has_parents());
        assert!(commit.is_root());
    }

    #[test]
    fn test_set_parents_empty() {
        let mut commit = Commit::new(SHA);
        assert_eq!(
            commit.set_parents(""),
            Err(FieldError::MissingValue { field: "parents" })
        );
    }

    #[test]
    fn test_set_author_wrong_tag() {
        let mut commit = Commit::new(SHA);
        let result = commit.set_author("committer A <a@b.c> 1 +0000");
        assert!(matches!(
            result,
            Err(FieldError::TagMismatch {
                expected: "author",
                ..
            })
        ));
    }

    #[test]
    fn test_set_message_only_once() {
        let mut commit = Commit::new(SHA);
        commit.set_message("first").expect("message");
        assert!(commit.set_message("second").is_err());
        assert_eq!(commit.message(), Some("first"));
    }

    #[test]
    fn test_parse_user() {
        let (name, time) = parse_user("Alice Smith 1234567890 +0900");
        assert_eq!(name.as_deref(), Some("Alice Smith"));
        assert_eq!(time, Some(Utc.timestamp_opt(1_234_567_890, 0).unwrap()));
    }

    #[test]
    fn test_parse_user_with_email() {
        let (name, time) = parse_user("Alice Smith <alice@example.com> 1234567890 -0500");
        assert_eq!(name.as_deref(), Some("Alice Smith <alice@example.com>"));
        assert!(time.is_some());
    }

    #[test]
    fn test_parse_user_garbage() {
        assert_eq!(parse_user("garbage"), (None, None));
        assert_eq!(parse_user(""), (None, None));
        assert_eq!(parse_user("Alice 1234567890"), (None, None));
        assert_eq!(parse_user(" 1234567890 +0000"), (None, None));
        assert_eq!(parse_user("Alice notanumber +0000"), (None, None));
    }

    #[test]
    fn test_parse_user_greedy_name() {
        // The name swallows earlier numeric tokens
        let (name, time) = parse_user("Agent 007 42 +0000");
        assert_eq!(name.as_deref(), Some("Agent 007"));
        assert_eq!(time, Some(Utc.timestamp_opt(42, 0).unwrap()));
    }

    #[test]
    fn test_parse_user_out_of_range_epoch() {
        assert_eq!(parse_user("Alice 99999999999999999999 +0000"), (None, None));
    }

    #[test]
    fn test_identity_split() {
        let commit = Commit::from_fields(sample_fields()).expect("commit");
        assert_eq!(commit.author_name(), Some("Test Author"));
        assert_eq!(commit.author_email(), Some("test@example.com"));
        assert_eq!(commit.committer_email(), Some("ci@example.com"));
    }

    #[test]
    fn test_identity_without_email() {
        let mut commit = Commit::new(SHA);
        commit.set_author("author Alice Smith 1234567890 +0900").expect("author");
        assert_eq!(commit.author_name(), Some("Alice Smith"));
        assert_eq!(commit.author_email(), None);
    }

    #[test]
    fn test_short_id() {
        let commit = Commit::new(SHA);
        assert_eq!(commit.short_id(), "1945ab9");
        assert_eq!(Commit::new("abc").short_id(), "abc");
    }

    #[test]
    fn test_subject_without_message() {
        assert_eq!(Commit::new(SHA).subject(), "");
    }

    #[test]
    fn test_is_valid_sha() {
        assert!(Commit::is_valid_sha(SHA));
        assert!(!Commit::is_valid_sha("1945ab9"));
        assert!(!Commit::is_valid_sha(
            "1945ab9c752534e733c38ba0109dc3b741f0a6eg"
        ));
    }

    #[test]
    fn test_commit_serialization_roundtrip() {
        let commit = Commit::from_fields(sample_fields()).expect("commit");
        let json = serde_json::to_string(&commit).expect("serialize");
        let deserialized: Commit = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(commit, deserialized);
        // chrono serializes to RFC 3339
        assert!(json.contains("\"created_at\":\"2026-01-17T"));
    }
}
