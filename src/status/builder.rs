//! Snapshot assembly.
//!
//! One refresh fans the status queries out in two phases and joins them
//! into a single immutable [`RepositorySnapshot`]:
//!
//! - phase 0: the live status query; mandatory, its failure fails the
//!   refresh and no snapshot is produced;
//! - phase 1: everything with no data dependency: stash list, recent
//!   log, untracked listing, the three change materializations, the
//!   merge/cherry-pick/revert probes, and the ref listing;
//! - phase 2: everything that consumes phase 1 results: the rebase
//!   probe (log + refs), upstream and push-remote divergence (refs),
//!   and HEAD commit details (refs, for the tag lookup).
//!
//! Tasks inside a phase run concurrently and may finish in any order;
//! each writes its own result slot, so joining is just the end of the
//! scope. Every field except the live query is best-effort: failures
//! degrade to empty/absent rather than failing the snapshot.
//!
//! The builder is not reentrant-safe against overlapping refreshes of
//! the same repository and nothing here is cancellable; callers
//! serialize refreshes and keep the previous snapshot until a new one
//! succeeds.

use crate::git::refs::group_remote_branches;
use crate::git::{GitError, RefKind, Repository};
use crate::status::{
    BranchInfo, ChangeKind, OperationState, RECENT_LOG_LIMIT, RepositorySnapshot, changes,
    changes::Baseline, divergence, live, ops, stash,
};

/// Assemble a snapshot with the default recent-log length.
pub fn snapshot(repo: &Repository) -> Result<RepositorySnapshot, GitError> {
    snapshot_with_log_limit(repo, RECENT_LOG_LIMIT)
}

/// Assemble a snapshot, bounding the recent log to `log_limit` commits.
pub fn snapshot_with_log_limit(
    repo: &Repository,
    log_limit: usize,
) -> Result<RepositorySnapshot, GitError> {
    let live = live::capture(repo)?;

    let has_untracked = live
        .working_tree
        .iter()
        .any(|entry| entry.kind == ChangeKind::Untracked);

    let mut stashes = Vec::new();
    let mut recent_log = Vec::new();
    let mut refs = Vec::new();
    let mut untracked_files = Vec::new();
    let mut working_tree_changes = Vec::new();
    let mut index_changes = Vec::new();
    let mut merge_changes = Vec::new();
    let mut merging = None;
    let mut cherry_picking = None;
    let mut reverting = None;

    rayon::scope(|s| {
        s.spawn(|_| stashes = stash::stashes(repo));
        s.spawn(|_| {
            if live.head_commit.is_some() {
                recent_log = repo.recent_log(log_limit).unwrap_or_default();
            }
        });
        s.spawn(|_| refs = repo.refs().unwrap_or_default());
        s.spawn(|_| {
            if has_untracked {
                untracked_files = changes::untracked(repo);
            }
        });
        s.spawn(|_| {
            working_tree_changes = changes::materialize(repo, &live.working_tree, Baseline::WorkingTree)
        });
        s.spawn(|_| index_changes = changes::materialize(repo, &live.index, Baseline::Index));
        s.spawn(|_| merge_changes = changes::materialize(repo, &live.merge, Baseline::WorkingTree));
        s.spawn(|_| merging = ops::merging_state(repo));
        s.spawn(|_| cherry_picking = ops::cherry_picking_state(repo, &live));
        s.spawn(|_| reverting = ops::reverting_state(repo, &live));
    });

    let mut rebasing = None;
    let mut upstream = None;
    let mut push_remote = None;
    let mut head_details = None;
    {
        let (recent_log, refs) = (&recent_log, &refs);
        rayon::scope(|s| {
            s.spawn(|_| rebasing = ops::rebasing_state(repo, &live, recent_log, refs));
            s.spawn(|_| {
                if live.head_commit.is_some() {
                    upstream = divergence::upstream_status(repo, &live, refs);
                }
            });
            s.spawn(|_| {
                if live.head_commit.is_some() {
                    push_remote = divergence::push_remote_status(repo, &live, refs);
                }
            });
            s.spawn(|_| {
                head_details = live
                    .head_commit
                    .as_deref()
                    .and_then(|commit| repo.commit_details(commit).ok());
            });
        });
    }

    let tag = head_details.as_ref().and_then(|details| {
        refs.iter()
            .find(|r| r.kind == RefKind::Tag && r.commit == details.hash)
            .cloned()
    });

    // Git never runs two of these at once; torn control files could make
    // several probes fire, so one wins by fixed precedence.
    let operation = rebasing
        .map(OperationState::Rebasing)
        .or(merging.map(OperationState::Merging))
        .or(cherry_picking.map(OperationState::CherryPicking))
        .or(reverting.map(OperationState::Reverting));

    let branches = refs
        .iter()
        .filter(|r| r.kind == RefKind::Head)
        .cloned()
        .collect();
    let tags = refs
        .iter()
        .filter(|r| r.kind == RefKind::Tag)
        .cloned()
        .collect();
    let remotes = group_remote_branches(&live.remotes, &refs);

    Ok(RepositorySnapshot {
        root: repo.root().to_path_buf(),
        head: BranchInfo {
            name: live.branch_name.clone(),
            commit: live.head_commit.clone(),
            commit_details: head_details,
            tag,
            upstream,
            push_remote,
        },
        log: recent_log,
        stashes,
        working_tree_changes,
        index_changes,
        merge_changes,
        untracked_files,
        operation,
        refs,
        branches,
        tags,
        remotes,
        submodules: live.submodules,
    })
}
