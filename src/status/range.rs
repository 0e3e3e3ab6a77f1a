//! Bounded commit-range resolution.

use crate::git::Repository;
use crate::status::CommitRange;

/// Ordered commits reachable from `to` but not from `from` (`from..to`),
/// newest first, at most `max` entries.
///
/// One extra hash is requested so truncation can be detected without a
/// separate count query: the flag compares the untrimmed count against
/// `max`. Divergence information is best-effort, so a failing history
/// query yields the empty, non-truncated range instead of an error.
pub fn commit_range(repo: &Repository, from: &str, to: &str, max: usize) -> CommitRange {
    let range = format!("{}..{}", from, to);
    let count = format!("-n{}", max + 1);

    let stdout = match repo.run_command(&["log", "--format=%H", &range, &count]) {
        Ok(stdout) => stdout,
        Err(err) => {
            log::debug!("commit range {} unavailable: {}", range, err);
            return CommitRange::default();
        }
    };

    let hashes: Vec<&str> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    CommitRange {
        commits: hashes
            .iter()
            .take(max)
            .filter_map(|hash| repo.commit_details(hash).ok())
            .collect(),
        truncated: hashes.len() > max,
    }
}
