//! Commit metadata lookups with a shared memoization cache.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use dashmap::DashMap;
use serde::Serialize;

use super::{GitError, Repository};

/// Pretty format shared by single lookups and the log query:
/// hash, parents, author name, author email, author date, raw message,
/// NUL-separated so the free-form message can't break field parsing.
const COMMIT_FORMAT: &str = "%H%x00%P%x00%an%x00%ae%x00%aI%x00%B";

/// Record separator for multi-commit output.
const RECORD_SEPARATOR: char = '\x1e';

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitDetails {
    pub hash: String,
    pub parents: Vec<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub author_date: Option<DateTime<FixedOffset>>,
    /// Subject line plus body, as git stores it.
    pub message: String,
}

impl CommitDetails {
    /// First line of the message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn short_hash(&self) -> &str {
        short_hash(&self.hash)
    }
}

/// Abbreviate a commit hash for display.
pub fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(7)]
}

/// Commit lookups memoized across clones of a [`Repository`].
///
/// Keyed by the requested revision *and* the resolved full hash, so a
/// range resolved from full hashes hits entries seeded by the log query.
#[derive(Debug, Clone, Default)]
pub struct CommitCache {
    inner: Arc<DashMap<String, CommitDetails>>,
}

impl CommitCache {
    fn get(&self, rev: &str) -> Option<CommitDetails> {
        self.inner.get(rev).map(|entry| entry.value().clone())
    }

    fn store(&self, rev: &str, details: &CommitDetails) {
        if rev != details.hash {
            self.inner.insert(rev.to_string(), details.clone());
        }
        self.inner
            .insert(details.hash.clone(), details.clone());
    }
}

impl Repository {
    /// Full commit details for a revision, memoized.
    pub fn commit_details(&self, rev: &str) -> Result<CommitDetails, GitError> {
        if let Some(hit) = self.commits.get(rev) {
            return Ok(hit);
        }

        let format = format!("--format={}", COMMIT_FORMAT);
        let stdout = self.run_command(&["show", "-s", &format, rev])?;
        let details = parse_commit_record(stdout.trim_end_matches(['\n', '\r']))?;
        self.commits.store(rev, &details);
        Ok(details)
    }

    /// Recent history of HEAD, newest first, at most `max` entries.
    ///
    /// Every returned commit is seeded into the cache.
    pub fn recent_log(&self, max: usize) -> Result<Vec<CommitDetails>, GitError> {
        let count = format!("-{}", max);
        let format = format!("--format={}{}", COMMIT_FORMAT, "%x1e");
        let stdout = self.run_command(&["log", &count, &format])?;

        let mut commits = Vec::new();
        for record in stdout.split(RECORD_SEPARATOR) {
            let record = record.trim_matches(['\n', '\r']);
            if record.is_empty() {
                continue;
            }
            let details = parse_commit_record(record)?;
            self.commits.store(&details.hash, &details);
            commits.push(details);
        }
        Ok(commits)
    }
}

fn parse_commit_record(record: &str) -> Result<CommitDetails, GitError> {
    let fields: Vec<&str> = record.splitn(6, '\0').collect();
    if fields.len() < 6 {
        return Err(GitError::ParseError(format!(
            "commit record has {} fields, expected 6",
            fields.len()
        )));
    }

    let hash = fields[0].trim().to_string();
    if hash.is_empty() {
        return Err(GitError::ParseError("empty commit hash".to_string()));
    }

    let parents = fields[1]
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let author_name = non_empty(fields[2]);
    let author_email = non_empty(fields[3]);
    let author_date = DateTime::parse_from_rfc3339(fields[4].trim()).ok();
    let message = fields[5].trim_end().to_string();

    Ok(CommitDetails {
        hash,
        parents,
        author_name,
        author_email,
        author_date,
        message,
    })
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_record() {
        let record = "1111111111111111111111111111111111111111\x00aaaa bbbb\x00Ada\x00ada@example.com\x002025-01-01T12:00:00+01:00\x00subject line\n\nbody text\n";
        let details = parse_commit_record(record).unwrap();
        assert_eq!(details.hash, "1111111111111111111111111111111111111111");
        assert_eq!(details.parents, vec!["aaaa", "bbbb"]);
        assert_eq!(details.author_name.as_deref(), Some("Ada"));
        assert_eq!(details.author_email.as_deref(), Some("ada@example.com"));
        assert!(details.author_date.is_some());
        assert_eq!(details.subject(), "subject line");
        assert_eq!(details.message, "subject line\n\nbody text");
    }

    #[test]
    fn parse_root_commit_without_parents() {
        let record = "2222222222222222222222222222222222222222\x00\x00Ada\x00ada@example.com\x002025-01-01T12:00:00Z\x00initial";
        let details = parse_commit_record(record).unwrap();
        assert!(details.parents.is_empty());
    }

    #[test]
    fn parse_rejects_short_record() {
        assert!(parse_commit_record("garbage").is_err());
    }

    #[test]
    fn short_hash_abbreviates() {
        assert_eq!(short_hash("0123456789abcdef"), "0123456");
        assert_eq!(short_hash("abc"), "abc");
    }
}
