//! Live repository state: the one mandatory status query plus cheap
//! config and control-file reads.
//!
//! A single `git status --porcelain=v2 --branch` invocation yields HEAD
//! name/commit, the configured upstream with ahead/behind counts, and
//! every pending change; remotes, submodules, and the rebase-in-progress
//! commit come from config and control files. Everything downstream
//! starts from this value.

use crate::git::{GitError, Repository, parse};
use crate::status::{ChangeKind, Submodule};

/// Snapshot of the repository's cheap-to-query live state.
#[derive(Debug, Clone, Default)]
pub struct LiveStatus {
    /// Current branch name; `None` when detached.
    pub branch_name: Option<String>,
    /// HEAD commit id; `None` on an unborn branch.
    pub head_commit: Option<String>,
    pub upstream: Option<UpstreamInfo>,
    /// Commits ahead of / behind the upstream, as counted by git itself.
    pub ahead: usize,
    pub behind: usize,
    /// Working-tree entries, untracked included.
    pub working_tree: Vec<StatusEntry>,
    pub index: Vec<StatusEntry>,
    pub merge: Vec<StatusEntry>,
    /// Commit being replayed by an in-progress rebase (`REBASE_HEAD`).
    pub rebase_commit: Option<String>,
    /// Configured remotes as `(name, url)` pairs.
    pub remotes: Vec<(String, String)>,
    pub submodules: Vec<Submodule>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamInfo {
    pub remote: String,
    pub name: String,
}

/// One raw change entry, before materialization. Paths are relative to
/// the repository root, as git reports them.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEntry {
    pub path: String,
    pub original_path: Option<String>,
    pub kind: ChangeKind,
}

/// Query the live state. This is the mandatory query: failure here fails
/// the whole refresh.
pub fn capture(repo: &Repository) -> Result<LiveStatus, GitError> {
    let stdout = repo.run_command(&[
        "status",
        "--porcelain=v2",
        "--branch",
        "--untracked-files=normal",
    ])?;
    let mut live = parse_porcelain_v2(&stdout);

    live.remotes = repo.remotes();

    live.rebase_commit = repo
        .read_control_file("REBASE_HEAD")
        .ok()
        .flatten()
        .map(|text| parse::trim_final_newline(&text).to_string())
        .filter(|text| !text.is_empty());

    live.submodules = std::fs::read_to_string(repo.root().join(".gitmodules"))
        .map(|text| parse_gitmodules(&text))
        .unwrap_or_default();

    Ok(live)
}

fn parse_porcelain_v2(output: &str) -> LiveStatus {
    let mut live = LiveStatus::default();

    for line in parse::normalize_line_endings(output).lines() {
        if let Some(header) = line.strip_prefix("# ") {
            parse_branch_header(header, &mut live);
            continue;
        }

        match line.split_once(' ') {
            Some(("1", rest)) => parse_ordinary_entry(rest, &mut live),
            Some(("2", rest)) => parse_rename_entry(rest, &mut live),
            Some(("u", rest)) => parse_unmerged_entry(rest, &mut live),
            Some(("?", path)) => live.working_tree.push(StatusEntry {
                path: path.to_string(),
                original_path: None,
                kind: ChangeKind::Untracked,
            }),
            Some(("!", path)) => live.working_tree.push(StatusEntry {
                path: path.to_string(),
                original_path: None,
                kind: ChangeKind::Ignored,
            }),
            _ => {}
        }
    }

    live
}

fn parse_branch_header(header: &str, live: &mut LiveStatus) {
    let Some((key, value)) = header.split_once(' ') else {
        return;
    };
    match key {
        "branch.oid" => {
            if value != "(initial)" {
                live.head_commit = Some(value.to_string());
            }
        }
        "branch.head" => {
            if value != "(detached)" {
                live.branch_name = Some(value.to_string());
            }
        }
        "branch.upstream" => {
            if let Some((remote, name)) = value.split_once('/') {
                live.upstream = Some(UpstreamInfo {
                    remote: remote.to_string(),
                    name: name.to_string(),
                });
            }
        }
        "branch.ab" => {
            for field in value.split_whitespace() {
                if let Some(ahead) = field.strip_prefix('+') {
                    live.ahead = ahead.parse().unwrap_or(0);
                } else if let Some(behind) = field.strip_prefix('-') {
                    live.behind = behind.parse().unwrap_or(0);
                }
            }
        }
        _ => {}
    }
}

/// `<XY> <sub> <mH> <mI> <mW> <hH> <hI> <path>`: a changed tracked file.
/// The staged (X) and unstaged (Y) sides each produce their own entry.
fn parse_ordinary_entry(rest: &str, live: &mut LiveStatus) {
    let fields: Vec<&str> = rest.splitn(8, ' ').collect();
    if fields.len() < 8 {
        return;
    }
    let path = fields[7];
    push_sides(fields[0], path, None, live);
}

/// `<XY> <sub> <mH> <mI> <mW> <hH> <hI> <Xscore> <path>\t<origPath>`:
/// a rename or copy.
fn parse_rename_entry(rest: &str, live: &mut LiveStatus) {
    let fields: Vec<&str> = rest.splitn(9, ' ').collect();
    if fields.len() < 9 {
        return;
    }
    let Some((path, orig)) = fields[8].split_once('\t') else {
        return;
    };
    push_sides(fields[0], path, Some(orig), live);
}

/// `<XY> <sub> <m1> <m2> <m3> <mW> <h1> <h2> <h3> <path>`: unmerged.
fn parse_unmerged_entry(rest: &str, live: &mut LiveStatus) {
    let fields: Vec<&str> = rest.splitn(10, ' ').collect();
    if fields.len() < 10 {
        return;
    }
    live.merge.push(StatusEntry {
        path: fields[9].to_string(),
        original_path: None,
        kind: ChangeKind::Conflicted,
    });
}

fn push_sides(xy: &str, path: &str, orig: Option<&str>, live: &mut LiveStatus) {
    let mut chars = xy.chars();
    let x = chars.next().unwrap_or('.');
    let y = chars.next().unwrap_or('.');

    if let Some(kind) = kind_for(x) {
        live.index.push(StatusEntry {
            path: path.to_string(),
            original_path: orig.map(str::to_string),
            kind,
        });
    }
    if let Some(kind) = kind_for(y) {
        live.working_tree.push(StatusEntry {
            path: path.to_string(),
            original_path: orig.map(str::to_string),
            kind,
        });
    }
}

fn kind_for(side: char) -> Option<ChangeKind> {
    match side {
        'M' => Some(ChangeKind::Modified),
        'A' => Some(ChangeKind::Added),
        'D' => Some(ChangeKind::Deleted),
        'R' => Some(ChangeKind::Renamed),
        'C' => Some(ChangeKind::Copied),
        'T' => Some(ChangeKind::TypeChanged),
        _ => None,
    }
}

/// Parse `.gitmodules`: `[submodule "name"]` sections with `path` and
/// `url` keys.
fn parse_gitmodules(text: &str) -> Vec<Submodule> {
    let mut submodules = Vec::new();
    let mut current: Option<Submodule> = None;

    for line in text.lines() {
        let line = line.trim();
        if let Some(name) = line
            .strip_prefix("[submodule \"")
            .and_then(|rest| rest.strip_suffix("\"]"))
        {
            if let Some(done) = current.take() {
                submodules.push(done);
            }
            current = Some(Submodule {
                name: name.to_string(),
                path: String::new(),
                url: None,
            });
        } else if let Some((key, value)) = line.split_once('=')
            && let Some(submodule) = current.as_mut()
        {
            match key.trim() {
                "path" => submodule.path = value.trim().to_string(),
                "url" => submodule.url = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    if let Some(done) = current {
        submodules.push(done);
    }
    submodules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_branch_headers() {
        let output = "\
# branch.oid 1111111111111111111111111111111111111111
# branch.head main
# branch.upstream origin/main
# branch.ab +2 -1
";
        let live = parse_porcelain_v2(output);
        assert_eq!(
            live.head_commit.as_deref(),
            Some("1111111111111111111111111111111111111111")
        );
        assert_eq!(live.branch_name.as_deref(), Some("main"));
        assert_eq!(
            live.upstream,
            Some(UpstreamInfo {
                remote: "origin".to_string(),
                name: "main".to_string(),
            })
        );
        assert_eq!(live.ahead, 2);
        assert_eq!(live.behind, 1);
    }

    #[test]
    fn detached_and_unborn_markers_map_to_none() {
        let live = parse_porcelain_v2("# branch.oid (initial)\n# branch.head (detached)\n");
        assert_eq!(live.head_commit, None);
        assert_eq!(live.branch_name, None);
    }

    #[test]
    fn ordinary_entries_split_staged_and_unstaged_sides() {
        let output = "1 MM N... 100644 100644 100644 aaaa bbbb src/with space.rs\n";
        let live = parse_porcelain_v2(output);
        assert_eq!(live.index.len(), 1);
        assert_eq!(live.working_tree.len(), 1);
        assert_eq!(live.index[0].path, "src/with space.rs");
        assert_eq!(live.index[0].kind, ChangeKind::Modified);
        assert_eq!(live.working_tree[0].kind, ChangeKind::Modified);
    }

    #[test]
    fn staged_only_entry_has_no_working_tree_side() {
        let output = "1 A. N... 000000 100644 100644 0000 aaaa new.rs\n";
        let live = parse_porcelain_v2(output);
        assert_eq!(live.index.len(), 1);
        assert_eq!(live.index[0].kind, ChangeKind::Added);
        assert!(live.working_tree.is_empty());
    }

    #[test]
    fn rename_entry_carries_original_path() {
        let output = "2 R. N... 100644 100644 100644 aaaa bbbb R100 new.rs\told.rs\n";
        let live = parse_porcelain_v2(output);
        assert_eq!(live.index.len(), 1);
        assert_eq!(live.index[0].kind, ChangeKind::Renamed);
        assert_eq!(live.index[0].path, "new.rs");
        assert_eq!(live.index[0].original_path.as_deref(), Some("old.rs"));
    }

    #[test]
    fn unmerged_entry_lands_in_merge_list() {
        let output = "u UU N... 100644 100644 100644 100644 aaaa bbbb cccc conflicted.rs\n";
        let live = parse_porcelain_v2(output);
        assert_eq!(live.merge.len(), 1);
        assert_eq!(live.merge[0].kind, ChangeKind::Conflicted);
        assert_eq!(live.merge[0].path, "conflicted.rs");
        assert!(live.index.is_empty());
    }

    #[test]
    fn untracked_entry_lands_in_working_tree() {
        let live = parse_porcelain_v2("? notes.txt\n");
        assert_eq!(live.working_tree.len(), 1);
        assert_eq!(live.working_tree[0].kind, ChangeKind::Untracked);
    }

    #[test]
    fn gitmodules_parses_sections() {
        let text = "\
[submodule \"libfoo\"]
\tpath = vendor/libfoo
\turl = https://example.com/libfoo.git
[submodule \"libbar\"]
\tpath = vendor/libbar
";
        let submodules = parse_gitmodules(text);
        assert_eq!(submodules.len(), 2);
        assert_eq!(submodules[0].name, "libfoo");
        assert_eq!(submodules[0].path, "vendor/libfoo");
        assert_eq!(
            submodules[0].url.as_deref(),
            Some("https://example.com/libfoo.git")
        );
        assert_eq!(submodules[1].url, None);
    }
}
