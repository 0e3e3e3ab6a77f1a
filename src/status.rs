//! Repository status snapshot: data model and assembly.
//!
//! [`builder::snapshot`] produces one immutable [`RepositorySnapshot`]
//! per refresh; the submodules each cover one slice of it.

use std::path::PathBuf;

use serde::Serialize;

use crate::git::{CommitDetails, Hunk, Ref, Remote};

pub mod builder;
pub mod changes;
pub mod divergence;
pub mod live;
pub mod ops;
pub mod range;
pub mod stash;

/// Cap on ahead/behind commit lists, per direction.
pub const MAX_COMMITS_AHEAD_BEHIND: usize = 50;

/// Default length of the recent-commit log.
pub const RECENT_LOG_LIMIT: usize = 100;

/// Everything a status view needs to know about a repository, assembled
/// in one refresh and never mutated afterwards. A new refresh produces a
/// fresh snapshot that replaces the old one entirely.
#[derive(Debug, Clone, Serialize)]
pub struct RepositorySnapshot {
    /// Working-copy root.
    pub root: PathBuf,
    pub head: BranchInfo,
    /// Recent commits reachable from HEAD, newest first.
    pub log: Vec<CommitDetails>,
    pub stashes: Vec<Stash>,
    /// Tracked files modified in the working tree (untracked excluded).
    pub working_tree_changes: Vec<Change>,
    /// Files staged in the index.
    pub index_changes: Vec<Change>,
    /// Conflicted files during a merge-like operation.
    pub merge_changes: Vec<Change>,
    pub untracked_files: Vec<Change>,
    /// The in-progress operation, if any. Merge, rebase, cherry-pick and
    /// revert are mutually exclusive.
    pub operation: Option<OperationState>,
    /// All refs; `branches`, `tags` and `remotes` are derived views.
    pub refs: Vec<Ref>,
    pub branches: Vec<Ref>,
    pub tags: Vec<Ref>,
    pub remotes: Vec<Remote>,
    pub submodules: Vec<Submodule>,
}

/// The current HEAD and its tracking relationships.
#[derive(Debug, Clone, Serialize)]
pub struct BranchInfo {
    /// Branch name; `None` on a detached HEAD.
    pub name: Option<String>,
    /// HEAD commit id; `None` on an unborn branch.
    pub commit: Option<String>,
    pub commit_details: Option<CommitDetails>,
    /// A tag pointing at the HEAD commit, if any.
    pub tag: Option<Ref>,
    pub upstream: Option<TrackingRef>,
    pub push_remote: Option<TrackingRef>,
}

/// A remote-tracking counterpart of the current branch (its upstream or
/// its push target). Only a named HEAD ever carries one.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingRef {
    pub remote: String,
    pub name: String,
    /// Details of the remote-tracking commit, when resolvable.
    pub commit: Option<CommitDetails>,
    pub ahead: Option<CommitRange>,
    pub behind: Option<CommitRange>,
    /// Whether pulls rebase instead of merge (upstream only).
    pub rebase: bool,
}

/// An ordered, capped list of commits between two refs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommitRange {
    /// Newest first.
    pub commits: Vec<CommitDetails>,
    /// True iff the true set exceeded the requested cap.
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    TypeChanged,
    Conflicted,
    Untracked,
    Ignored,
}

/// One modified path, materialized with its diff against the relevant
/// baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    /// Absolute path of the current location.
    pub path: PathBuf,
    /// Absolute original location, for renames and copies.
    pub original_path: Option<PathBuf>,
    /// Path relative to the repository root, exactly as git reports it.
    pub relative_path: String,
    pub kind: ChangeKind,
    /// Unified diff text; never present for untracked files.
    pub diff: Option<String>,
    pub hunks: Option<Vec<Hunk>>,
}

/// The operation a repository is in the middle of. At most one is active
/// at a time; absent marker files mean "none", not an error.
#[derive(Debug, Clone, Serialize)]
pub enum OperationState {
    Merging(MergingState),
    Rebasing(RebasingState),
    CherryPicking(SequencerState),
    Reverting(SequencerState),
}

#[derive(Debug, Clone, Serialize)]
pub struct MergingState {
    /// Names of the branches being merged in.
    pub branches: Vec<String>,
    /// Commits on the merge head that are not yet on HEAD.
    pub commits: Vec<CommitDetails>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RebasingState {
    /// The commit currently being replayed.
    pub current_commit: CommitDetails,
    /// The branch being rebased.
    pub branch: String,
    pub onto: RebaseOnto,
    /// Commits already replayed, newest first.
    pub done_commits: Vec<CommitDetails>,
    /// Commits still to apply, newest first.
    pub upcoming_commits: Vec<CommitDetails>,
    pub interactive: bool,
}

/// The target a rebase is replaying onto.
#[derive(Debug, Clone, Serialize)]
pub struct RebaseOnto {
    /// A branch or tag name pointing at the onto commit, or its short
    /// hash when none does.
    pub name: String,
    pub commit: CommitDetails,
}

/// Shared shape of an in-progress cherry-pick or revert.
#[derive(Debug, Clone, Serialize)]
pub struct SequencerState {
    /// HEAD as it was before the operation started.
    pub original_head: CommitDetails,
    /// The commit currently being applied.
    pub current_commit: CommitDetails,
    /// Queued commits still to apply, newest first.
    pub upcoming_commits: Vec<CommitDetails>,
}

/// One stash entry. The index is its position in the listing and is
/// reassigned on every refresh, not a stable identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stash {
    pub index: usize,
    /// Description with the `stash@{N}: ` prefix stripped.
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submodule {
    pub name: String,
    pub path: String,
    pub url: Option<String>,
}
