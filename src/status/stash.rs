//! Stash listing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::git::Repository;
use crate::status::Stash;

static STASH_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^stash@\{\d+\}: ").unwrap());

/// Stash entries in their natural (most-recent-first) order. Any failure
/// yields an empty list rather than an error.
pub fn stashes(repo: &Repository) -> Vec<Stash> {
    match repo.run_command(&["stash", "list"]) {
        Ok(stdout) => parse_stash_list(&stdout),
        Err(err) => {
            log::debug!("stash list unavailable: {}", err);
            Vec::new()
        }
    }
}

fn parse_stash_list(output: &str) -> Vec<Stash> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, line)| Stash {
            index,
            description: STASH_PREFIX.replace(line, "").into_owned(),
        })
        .collect()
}
