//! Upstream and push-remote divergence for the current branch.
//!
//! Both resolvers are best-effort: missing config, a missing remote ref,
//! or a failed lookup leaves the corresponding field unset instead of
//! failing the snapshot. A detached HEAD has neither.

use crate::git::{CommitDetails, Ref, Repository};
use crate::status::live::LiveStatus;
use crate::status::range::commit_range;
use crate::status::{MAX_COMMITS_AHEAD_BEHIND, TrackingRef};

/// Resolve the configured upstream of the current branch.
///
/// Ahead/behind ranges are only computed when the live divergence counts
/// are non-zero, so a branch with no drift costs no history walk.
pub fn upstream_status(repo: &Repository, live: &LiveStatus, refs: &[Ref]) -> Option<TrackingRef> {
    let branch = live.branch_name.as_deref()?;
    let upstream = live.upstream.as_ref()?;

    let tracking_name = format!("{}/{}", upstream.remote, upstream.name);
    let commit = resolve_tracking_commit(repo, refs, &upstream.remote, &tracking_name);

    let upstream_ref = format!("{}@{{u}}", branch);
    let ahead = (live.ahead > 0)
        .then(|| commit_range(repo, &upstream_ref, branch, MAX_COMMITS_AHEAD_BEHIND));
    let behind = (live.behind > 0)
        .then(|| commit_range(repo, branch, &upstream_ref, MAX_COMMITS_AHEAD_BEHIND));

    let rebase = repo
        .config(&format!("branch.{}.rebase", branch))
        .as_deref()
        == Some("true");

    Some(TrackingRef {
        remote: upstream.remote.clone(),
        name: upstream.name.clone(),
        commit,
        ahead,
        behind,
        rebase,
    })
}

/// Resolve the per-branch push remote (`branch.<name>.pushRemote`).
///
/// Unlike the upstream, ahead/behind ranges are always computed when a
/// push remote is configured, regardless of live divergence counts.
pub fn push_remote_status(
    repo: &Repository,
    live: &LiveStatus,
    refs: &[Ref],
) -> Option<TrackingRef> {
    let branch = live.branch_name.as_deref()?;
    let push_remote = repo.config(&format!("branch.{}.pushRemote", branch))?;

    let tracking_name = format!("{}/{}", push_remote, branch);
    let ahead = commit_range(repo, &tracking_name, branch, MAX_COMMITS_AHEAD_BEHIND);
    let behind = commit_range(repo, branch, &tracking_name, MAX_COMMITS_AHEAD_BEHIND);
    let commit = resolve_tracking_commit(repo, refs, &push_remote, &tracking_name);

    Some(TrackingRef {
        remote: push_remote,
        name: branch.to_string(),
        commit,
        ahead: Some(ahead),
        behind: Some(behind),
        rebase: false,
    })
}

fn resolve_tracking_commit(
    repo: &Repository,
    refs: &[Ref],
    remote: &str,
    tracking_name: &str,
) -> Option<CommitDetails> {
    refs.iter()
        .find(|r| r.remote.as_deref() == Some(remote) && r.name == tracking_name)
        .and_then(|r| repo.commit_details(&r.commit).ok())
}
