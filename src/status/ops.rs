//! In-progress operation detection.
//!
//! Four structurally similar probes, one per operation. Each reads the
//! operation's marker file(s) under the control directory. A missing
//! marker means the operation is not active (the common case, answered
//! by a single failed file read), and content that doesn't parse
//! degrades to "not active" for that probe only. None of the detectors
//! ever returns an error; a corrupt control file must not break the
//! snapshot.

use crate::git::{CommitDetails, Ref, RefKind, Repository, commit, parse};
use crate::status::live::LiveStatus;
use crate::status::{MergingState, RebaseOnto, RebasingState, SequencerState};

/// Detect an in-progress merge from `MERGE_HEAD` + `MERGE_MSG`.
pub fn merging_state(repo: &Repository) -> Option<MergingState> {
    let merge_head = read_trimmed(repo, "MERGE_HEAD")?;
    let merge_msg = read_trimmed(repo, "MERGE_MSG")?;

    let heads = parse::parse_merge_heads(&merge_head);
    let branches = parse::parse_merge_message(&merge_msg);
    let merge_head = heads.first()?;
    if branches.is_empty() {
        return None;
    }

    let range = format!("HEAD..{}", merge_head);
    let commits = repo
        .run_command(&["rev-list", &range])
        .ok()?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|hash| repo.commit_details(hash).ok())
        .collect();

    Some(MergingState { branches, commits })
}

/// Detect an in-progress rebase.
///
/// Only runs when the live state saw a `REBASE_HEAD`. Needs the recent
/// log (done commits are a prefix slice of it) and the ref list (to name
/// the onto target), so it belongs to the dependent phase of the
/// fan-out.
pub fn rebasing_state(
    repo: &Repository,
    live: &LiveStatus,
    log: &[CommitDetails],
    refs: &[Ref],
) -> Option<RebasingState> {
    let rebase_rev = live.rebase_commit.as_deref()?;
    let current_commit = repo.commit_details(rebase_rev).ok()?;

    // The two control directories are mutually exclusive: a non-empty
    // rebase-apply/ means the mailbox-style backend, anything else is
    // the interactive/merge backend.
    let interactive = !repo.control_dir_non_empty("rebase-apply");
    let dir = if interactive {
        "rebase-merge"
    } else {
        "rebase-apply"
    };

    let head_name = read_trimmed(repo, &format!("{}/head-name", dir))?;
    let branch = head_name.split('/').nth(2)?.to_string();
    let onto_rev = read_trimmed(repo, &format!("{}/onto", dir))?;

    let (next_index, upcoming_commits) = if interactive {
        let next: usize = read_trimmed(repo, "rebase-merge/msgnum")?.parse().ok()?;
        let todo = read_trimmed(repo, "rebase-merge/git-rebase-todo").unwrap_or_default();
        let mut commits = parse::parse_sequencer_todo(&todo)?;
        commits.reverse();
        (next, commits)
    } else {
        let next: usize = read_trimmed(repo, "rebase-apply/next")?.parse().ok()?;
        let last: usize = read_trimmed(repo, "rebase-apply/last")?.parse().ok()?;

        // Steps last down to next+1, so the result is newest first. The
        // step at `next` is the one currently being applied.
        let mut commits = Vec::new();
        let mut index = last;
        while index > next {
            commits.push(read_step_file(repo, index)?);
            index -= 1;
        }
        (next, commits)
    };

    let onto_commit = repo.commit_details(&onto_rev).ok()?;
    let onto_name = refs
        .iter()
        .find(|r| r.commit == onto_commit.hash && r.kind != RefKind::RemoteHead)
        .map(|r| r.name.clone())
        .unwrap_or_else(|| commit::short_hash(&onto_commit.hash).to_string());

    let done_commits = log
        .iter()
        .take(next_index.saturating_sub(1))
        .cloned()
        .collect();

    Some(RebasingState {
        current_commit,
        branch,
        onto: RebaseOnto {
            name: onto_name,
            commit: onto_commit,
        },
        done_commits,
        upcoming_commits,
        interactive,
    })
}

/// Detect an in-progress cherry-pick from `CHERRY_PICK_HEAD`.
pub fn cherry_picking_state(repo: &Repository, live: &LiveStatus) -> Option<SequencerState> {
    sequencer_state(repo, live, "CHERRY_PICK_HEAD")
}

/// Detect an in-progress revert from `REVERT_HEAD`.
pub fn reverting_state(repo: &Repository, live: &LiveStatus) -> Option<SequencerState> {
    sequencer_state(repo, live, "REVERT_HEAD")
}

/// Cherry-pick and revert persist their queue identically, in the shared
/// sequencer directory. A single-commit operation has no sequencer dir
/// at all: the original head falls back to the live HEAD commit and the
/// queue is empty.
fn sequencer_state(repo: &Repository, live: &LiveStatus, marker: &str) -> Option<SequencerState> {
    // A conflicted rebase step can leave a stale pick marker behind;
    // while a rebase is live, the rebase probe owns the state.
    if live.rebase_commit.is_some() {
        return None;
    }
    let current_rev = read_trimmed(repo, marker)?;

    let todo = read_trimmed(repo, "sequencer/todo");
    let sequencer_head = read_trimmed(repo, "sequencer/head");

    let original_rev = sequencer_head.or_else(|| live.head_commit.clone())?;
    let original_head = repo.commit_details(&original_rev).ok()?;
    let current_commit = repo.commit_details(&current_rev).ok()?;

    // The first todo entry is the commit currently being applied; the
    // rest are upcoming, reversed to newest first.
    let mut upcoming_commits = match todo {
        Some(text) => parse::parse_sequencer_todo(&text)?,
        None => Vec::new(),
    };
    if !upcoming_commits.is_empty() {
        upcoming_commits.remove(0);
    }
    upcoming_commits.reverse();

    Some(SequencerState {
        original_head,
        current_commit,
        upcoming_commits,
    })
}

fn read_trimmed(repo: &Repository, name: &str) -> Option<String> {
    let raw = repo.read_control_file(name).ok().flatten()?;
    let normalized = parse::normalize_line_endings(&raw);
    let trimmed = parse::trim_final_newline(&normalized);
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn read_step_file(repo: &Repository, index: usize) -> Option<CommitDetails> {
    let name = format!("rebase-apply/{:04}", index);
    let text = repo.read_control_file(&name).ok().flatten()?;
    parse::parse_patch_header(&text)
}
