//! Change materialization: per-path diffs against the relevant baseline.

use rayon::prelude::*;

use crate::git::{Repository, diff};
use crate::status::live::StatusEntry;
use crate::status::{Change, ChangeKind};

/// Which baseline a change list diffs against.
#[derive(Debug, Clone, Copy)]
pub enum Baseline {
    /// Working tree (and merge-conflict copies) against HEAD.
    WorkingTree,
    /// Index against HEAD.
    Index,
}

/// Materialize a raw change list: diff each path, parse hunks, attach
/// the repo-relative path. Untracked entries are excluded here; they
/// are listed separately and never diffed. Per-file diffs run in
/// parallel, with output order following input order.
pub fn materialize(repo: &Repository, entries: &[StatusEntry], baseline: Baseline) -> Vec<Change> {
    entries
        .par_iter()
        .filter(|entry| entry.kind != ChangeKind::Untracked && entry.kind != ChangeKind::Ignored)
        .map(|entry| materialize_one(repo, entry, baseline))
        .collect()
}

fn materialize_one(repo: &Repository, entry: &StatusEntry, baseline: Baseline) -> Change {
    let diff_text = diff_against_head(repo, &entry.path, baseline);
    let hunks = diff_text.as_deref().map(diff::diff_to_hunks);

    Change {
        path: repo.root().join(&entry.path),
        original_path: entry.original_path.as_ref().map(|p| repo.root().join(p)),
        relative_path: entry.path.clone(),
        kind: entry.kind,
        diff: diff_text,
        hunks,
    }
}

fn diff_against_head(repo: &Repository, path: &str, baseline: Baseline) -> Option<String> {
    let args: &[&str] = match baseline {
        Baseline::WorkingTree => &["diff", "HEAD", "--", path],
        Baseline::Index => &["diff", "--cached", "HEAD", "--", path],
    };

    match repo.run_command(args) {
        Ok(stdout) if !stdout.trim().is_empty() => Some(stdout),
        Ok(_) => None,
        Err(err) => {
            // Expected on an unborn branch, where HEAD doesn't resolve.
            log::debug!("diff for {} unavailable: {}", path, err);
            None
        }
    }
}

/// Untracked paths via a directory-aware listing. Directories with no
/// tracked ancestor collapse to one entry with a trailing slash, the
/// way the listing reports them. Never diffed; failures yield an empty
/// list.
pub fn untracked(repo: &Repository) -> Vec<Change> {
    let stdout = match repo.run_command(&[
        "ls-files",
        "--others",
        "--exclude-standard",
        "--directory",
        "--no-empty-directory",
    ]) {
        Ok(stdout) => stdout,
        Err(err) => {
            log::debug!("untracked listing unavailable: {}", err);
            return Vec::new();
        }
    };

    stdout
        .lines()
        .filter(|line| !line.is_empty())
        .map(|path| Change {
            path: repo.root().join(path),
            original_path: None,
            relative_path: path.to_string(),
            kind: ChangeKind::Untracked,
            diff: None,
            hunks: None,
        })
        .collect()
}
