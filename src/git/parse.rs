//! Pure text-to-structure parsers for git control files.
//!
//! These formats are line-oriented and undocumented; every parser here
//! normalizes platform line endings first and degrades to `None` rather
//! than guessing when the content doesn't match.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use super::commit::CommitDetails;

/// Single-quoted names in a merge message first line,
/// e.g. `Merge branch 'topic' into main`.
static QUOTED_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"'([^']+)'").unwrap());

/// `[PATCH]` / `[PATCH 2/5]` tag on a patch subject line.
static PATCH_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[PATCH[^\]]*\]\s*").unwrap());

/// Normalize CRLF to LF.
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Strip a single trailing line break, the way git terminates its
/// control files.
pub fn trim_final_newline(text: &str) -> &str {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.strip_suffix('\r').unwrap_or(text)
}

/// Commit ids listed in `MERGE_HEAD`, one per line (several for an
/// octopus merge).
pub fn parse_merge_heads(text: &str) -> Vec<String> {
    normalize_line_endings(text)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.chars().all(|c| c.is_ascii_hexdigit()))
        .map(str::to_string)
        .collect()
}

/// Branch names being merged in, taken from the quoted names on the
/// first line of `MERGE_MSG`.
pub fn parse_merge_message(text: &str) -> Vec<String> {
    let normalized = normalize_line_endings(text);
    let Some(first_line) = normalized.lines().next() else {
        return Vec::new();
    };
    QUOTED_NAME
        .captures_iter(first_line)
        .map(|captures| captures[1].to_string())
        .collect()
}

/// Todo actions that carry a commit: `<action> <hash> <subject>`.
const COMMIT_ACTIONS: &[&str] = &[
    "pick", "p", "reword", "r", "edit", "e", "squash", "s", "fixup", "f", "drop", "d", "revert",
];

/// Todo actions without a commit payload; present in interactive-rebase
/// todos and skipped rather than treated as malformed.
const SCRIPT_ACTIONS: &[&str] = &[
    "exec",
    "x",
    "break",
    "b",
    "label",
    "l",
    "reset",
    "t",
    "merge",
    "m",
    "noop",
    "update-ref",
];

/// Parse a sequencer/rebase todo file into commit summaries, in disk
/// order (oldest first).
///
/// Returns `None` when any non-comment line fails to parse: a corrupt
/// or half-written todo must surface as "no state", not as a partial
/// queue.
pub fn parse_sequencer_todo(text: &str) -> Option<Vec<CommitDetails>> {
    let normalized = normalize_line_endings(text);
    let mut commits = Vec::new();

    for line in normalized.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (action, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        if SCRIPT_ACTIONS.contains(&action) {
            continue;
        }
        if !COMMIT_ACTIONS.contains(&action) {
            return None;
        }

        // `fixup` can carry a -C/-c flag before the hash.
        let rest = rest.trim_start();
        let rest = rest
            .strip_prefix("-C ")
            .or_else(|| rest.strip_prefix("-c "))
            .unwrap_or(rest);

        let (hash, subject) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        if hash.is_empty() || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        commits.push(CommitDetails {
            hash: hash.to_string(),
            parents: Vec::new(),
            author_name: None,
            author_email: None,
            author_date: None,
            message: subject.trim().to_string(),
        });
    }

    Some(commits)
}

/// Parse the patch/email-style header block of a `rebase-apply` step
/// file into a commit summary.
pub fn parse_patch_header(text: &str) -> Option<CommitDetails> {
    let normalized = normalize_line_endings(text);

    let mut hash = None;
    let mut author_name = None;
    let mut author_email = None;
    let mut author_date = None;
    let mut subject = None;

    for line in normalized.lines() {
        if line.is_empty() {
            // End of the header block; the diff body follows.
            break;
        }

        if let Some(rest) = line.strip_prefix("From: ") {
            if let Some((name, email)) = rest.rsplit_once(" <") {
                author_name = Some(name.trim().to_string());
                author_email = email.strip_suffix('>').map(str::to_string);
            } else {
                author_name = Some(rest.trim().to_string());
            }
        } else if let Some(rest) = line.strip_prefix("From ") {
            let candidate = rest.split_whitespace().next()?;
            if candidate.len() == 40 && candidate.chars().all(|c| c.is_ascii_hexdigit()) {
                hash = Some(candidate.to_string());
            }
        } else if let Some(rest) = line.strip_prefix("Date: ") {
            author_date = chrono::DateTime::parse_from_rfc2822(rest.trim()).ok();
        } else if let Some(rest) = line.strip_prefix("Subject: ") {
            subject = Some(PATCH_TAG.replace(rest.trim(), "").into_owned());
        }
    }

    Some(CommitDetails {
        hash: hash?,
        parents: Vec::new(),
        author_name,
        author_email,
        author_date,
        message: subject.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn trims_one_final_newline() {
        assert_eq!(trim_final_newline("abc\n"), "abc");
        assert_eq!(trim_final_newline("abc\r\n"), "abc");
        assert_eq!(trim_final_newline("abc\n\n"), "abc\n");
        assert_eq!(trim_final_newline("abc"), "abc");
    }

    #[rstest]
    #[case("Merge branch 'topic'", vec!["topic"])]
    #[case("Merge branch 'topic' into main", vec!["topic"])]
    #[case("Merge branches 'a' and 'b' into main", vec!["a", "b"])]
    #[case("Merge remote-tracking branch 'origin/topic'", vec!["origin/topic"])]
    #[case("plain commit message", vec![])]
    fn merge_message_names(#[case] input: &str, #[case] expected: Vec<&str>) {
        assert_eq!(parse_merge_message(input), expected);
    }

    #[test]
    fn merge_message_only_reads_first_line() {
        let text = "Merge branch 'topic'\n\nConflicts:\n\t'other'\n";
        assert_eq!(parse_merge_message(text), vec!["topic"]);
    }

    #[test]
    fn merge_heads_accepts_octopus() {
        let text = "1111111111111111111111111111111111111111\n2222222222222222222222222222222222222222\n";
        assert_eq!(parse_merge_heads(text).len(), 2);
    }

    #[test]
    fn sequencer_todo_parses_in_disk_order() {
        let todo = "pick 1a2b3c4 first subject\npick 5d6e7f8 second subject\n";
        let commits = parse_sequencer_todo(todo).unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].hash, "1a2b3c4");
        assert_eq!(commits[0].message, "first subject");
        assert_eq!(commits[1].hash, "5d6e7f8");
    }

    #[test]
    fn sequencer_todo_skips_comments_and_script_steps() {
        let todo = "# after resolving, continue\npick 1a2b3c4 one\nexec cargo test\nbreak\npick 5d6e7f8 two\n";
        let commits = parse_sequencer_todo(todo).unwrap();
        assert_eq!(commits.len(), 2);
    }

    #[test]
    fn sequencer_todo_parses_revert_actions() {
        let todo = "revert 1a2b3c4 bad change\n";
        let commits = parse_sequencer_todo(todo).unwrap();
        assert_eq!(commits[0].message, "bad change");
    }

    #[rstest]
    #[case("this is not a todo file")]
    #[case("pick notahash subject")]
    #[case("pick\n")]
    fn sequencer_todo_rejects_garbage(#[case] input: &str) {
        assert_eq!(parse_sequencer_todo(input), None);
    }

    #[test]
    fn sequencer_todo_empty_input_is_empty_queue() {
        assert_eq!(parse_sequencer_todo("").unwrap().len(), 0);
    }

    #[test]
    fn patch_header_extracts_commit_and_subject() {
        let patch = "From 3f786850e387550fdab836ed7e6dc881de23001b Mon Sep 17 00:00:00 2001\nFrom: Ada Lovelace <ada@example.com>\nDate: Wed, 1 Jan 2025 12:00:00 +0000\nSubject: [PATCH 2/5] fix the widget\n\n---\n diff body here\n";
        let details = parse_patch_header(patch).unwrap();
        assert_eq!(details.hash, "3f786850e387550fdab836ed7e6dc881de23001b");
        assert_eq!(details.message, "fix the widget");
        assert_eq!(details.author_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(details.author_email.as_deref(), Some("ada@example.com"));
        assert!(details.author_date.is_some());
    }

    #[test]
    fn patch_header_without_commit_line_is_none() {
        assert_eq!(parse_patch_header("Subject: [PATCH] no from line\n"), None);
    }
}
