//! Read-only git repository status snapshots.
//!
//! The [`status::builder::snapshot`] entry point fans out the status
//! queries for a repository (pending changes, stash list, upstream and
//! push-remote divergence, in-progress merge/rebase/cherry-pick/revert)
//! and joins them into one immutable [`status::RepositorySnapshot`].
//!
//! Nothing in this crate mutates repository state: it only spawns
//! read-only `git` invocations and reads control files under `.git`.

pub mod git;
pub mod status;
