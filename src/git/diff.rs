//! Unified-diff parsing into structured hunks.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// `@@ -old_start,old_lines +new_start,new_lines @@` (counts optional).
static HUNK_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").unwrap());

/// One contiguous block of changed lines with its context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    /// The hunk's text, header line included.
    pub lines: Vec<String>,
}

/// Split unified diff text into hunks.
///
/// The per-file header lines (`diff --git`, `index`, `---`, `+++`) before
/// the first hunk are dropped; unrecognized input yields no hunks rather
/// than an error.
pub fn diff_to_hunks(diff: &str) -> Vec<Hunk> {
    let mut hunks: Vec<Hunk> = Vec::new();

    for line in diff.lines() {
        if let Some(captures) = HUNK_HEADER.captures(line) {
            let number = |i: usize, default: u32| {
                captures
                    .get(i)
                    .map_or(default, |m| m.as_str().parse().unwrap_or(default))
            };
            hunks.push(Hunk {
                old_start: number(1, 0),
                old_lines: number(2, 1),
                new_start: number(3, 0),
                new_lines: number(4, 1),
                lines: vec![line.to_string()],
            });
        } else if let Some(hunk) = hunks.last_mut() {
            hunk.lines.push(line.to_string());
        }
    }

    hunks
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIFF: &str = "\
diff --git a/file.txt b/file.txt
index 0123456..89abcde 100644
--- a/file.txt
+++ b/file.txt
@@ -1,3 +1,4 @@
 one
-two
+two changed
+two and a half
 three
@@ -10 +11,2 @@
-ten
+ten changed
+eleven
";

    #[test]
    fn splits_into_hunks() {
        let hunks = diff_to_hunks(DIFF);
        assert_eq!(hunks.len(), 2);

        assert_eq!(hunks[0].old_start, 1);
        assert_eq!(hunks[0].old_lines, 3);
        assert_eq!(hunks[0].new_start, 1);
        assert_eq!(hunks[0].new_lines, 4);
        assert_eq!(hunks[0].lines[0], "@@ -1,3 +1,4 @@");
        assert_eq!(hunks[0].lines.len(), 6);

        // Counts default to 1 when omitted.
        assert_eq!(hunks[1].old_lines, 1);
        assert_eq!(hunks[1].new_start, 11);
        assert_eq!(hunks[1].new_lines, 2);
    }

    #[test]
    fn non_diff_text_yields_no_hunks() {
        assert!(diff_to_hunks("just some text\n").is_empty());
        assert!(diff_to_hunks("").is_empty());
    }
}
