//! Ref listing and remote grouping.

use serde::Serialize;

use super::{GitError, Repository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RefKind {
    /// Local branch head (`refs/heads/...`).
    Head,
    /// Remote-tracking head (`refs/remotes/...`).
    RemoteHead,
    /// Tag (`refs/tags/...`).
    Tag,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ref {
    /// Short name: `main`, `origin/main`, `v1.0`.
    pub name: String,
    /// Target commit id; annotated tags are peeled to the commit.
    pub commit: String,
    pub kind: RefKind,
    /// Owning remote, for remote-tracking refs only.
    pub remote: Option<String>,
}

/// A configured remote together with its remote-tracking branches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Remote {
    pub name: String,
    pub url: String,
    /// Remote-tracking refs of this remote, without the synthetic
    /// `<remote>/HEAD` pointer.
    pub branches: Vec<Ref>,
}

impl Repository {
    /// List branches, tags, and remote-tracking heads in one query.
    pub fn refs(&self) -> Result<Vec<Ref>, GitError> {
        // %(*objectname) is empty except for annotated tags, where it is
        // the peeled commit.
        let stdout = self.run_command(&[
            "for-each-ref",
            "--format=%(refname)%00%(objectname)%00%(*objectname)",
            "refs/heads",
            "refs/tags",
            "refs/remotes",
        ])?;
        Ok(parse_ref_list(&stdout))
    }

    /// Configured remotes as `(name, url)` pairs, in config order.
    ///
    /// Reads the config directly rather than `git remote` so phantom
    /// remotes without a URL don't appear.
    pub fn remotes(&self) -> Vec<(String, String)> {
        let output = self
            .run_command(&["config", "--get-regexp", r"remote\..+\.url"])
            .unwrap_or_default();
        parse_remote_config(&output)
    }
}

fn parse_ref_list(output: &str) -> Vec<Ref> {
    output.lines().filter_map(parse_ref_line).collect()
}

fn parse_ref_line(line: &str) -> Option<Ref> {
    let mut fields = line.split('\0');
    let refname = fields.next()?;
    let commit = fields.next()?.to_string();
    let peeled = fields.next().unwrap_or("");

    if let Some(name) = refname.strip_prefix("refs/heads/") {
        Some(Ref {
            name: name.to_string(),
            commit,
            kind: RefKind::Head,
            remote: None,
        })
    } else if let Some(name) = refname.strip_prefix("refs/tags/") {
        Some(Ref {
            name: name.to_string(),
            commit: if peeled.is_empty() {
                commit
            } else {
                peeled.to_string()
            },
            kind: RefKind::Tag,
            remote: None,
        })
    } else if let Some(name) = refname.strip_prefix("refs/remotes/") {
        let remote = name.split('/').next()?.to_string();
        Some(Ref {
            name: name.to_string(),
            commit,
            kind: RefKind::RemoteHead,
            remote: Some(remote),
        })
    } else {
        None
    }
}

/// Parse `remote.<name>.url <value>` config lines. First URL wins when a
/// remote lists several.
fn parse_remote_config(output: &str) -> Vec<(String, String)> {
    let mut remotes: Vec<(String, String)> = Vec::new();

    for line in output.lines() {
        // Use ".url " as the delimiter so remote names containing dots
        // parse correctly.
        let Some((name, url)) = line
            .strip_prefix("remote.")
            .and_then(|rest| rest.split_once(".url "))
        else {
            continue;
        };
        if !remotes.iter().any(|(existing, _)| existing == name) {
            remotes.push((name.to_string(), url.trim().to_string()));
        }
    }

    remotes
}

/// Group remote-tracking refs under their configured remote, dropping
/// each remote's own `<remote>/HEAD` entry.
pub fn group_remote_branches(remotes: &[(String, String)], refs: &[Ref]) -> Vec<Remote> {
    remotes
        .iter()
        .map(|(name, url)| {
            let head = format!("{}/HEAD", name);
            Remote {
                name: name.clone(),
                url: url.clone(),
                branches: refs
                    .iter()
                    .filter(|r| {
                        r.kind == RefKind::RemoteHead
                            && r.remote.as_deref() == Some(name.as_str())
                            && r.name != head
                    })
                    .cloned()
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote_ref(name: &str, remote: &str) -> Ref {
        Ref {
            name: name.to_string(),
            commit: "1111111111111111111111111111111111111111".to_string(),
            kind: RefKind::RemoteHead,
            remote: Some(remote.to_string()),
        }
    }

    #[test]
    fn parses_head_tag_and_remote_refs() {
        let output = "refs/heads/main\x00aaaa\x00\nrefs/tags/v1.0\x00bbbb\x00cccc\nrefs/remotes/origin/main\x00dddd\x00\n";
        let refs = parse_ref_list(output);
        assert_eq!(refs.len(), 3);

        assert_eq!(refs[0].name, "main");
        assert_eq!(refs[0].kind, RefKind::Head);
        assert_eq!(refs[0].remote, None);

        // Annotated tag resolves to the peeled commit.
        assert_eq!(refs[1].name, "v1.0");
        assert_eq!(refs[1].commit, "cccc");
        assert_eq!(refs[1].kind, RefKind::Tag);

        assert_eq!(refs[2].name, "origin/main");
        assert_eq!(refs[2].remote.as_deref(), Some("origin"));
    }

    #[test]
    fn lightweight_tag_keeps_object_id() {
        let output = "refs/tags/light\x00eeee\x00\n";
        let refs = parse_ref_list(output);
        assert_eq!(refs[0].commit, "eeee");
    }

    #[test]
    fn grouping_excludes_remote_head_pointer() {
        let refs = vec![
            remote_ref("origin/HEAD", "origin"),
            remote_ref("origin/main", "origin"),
            remote_ref("origin/dev", "origin"),
            remote_ref("fork/main", "fork"),
        ];
        let remotes = vec![("origin".to_string(), "git@example.com:a/b".to_string())];

        let grouped = group_remote_branches(&remotes, &refs);
        assert_eq!(grouped.len(), 1);
        let names: Vec<&str> = grouped[0].branches.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["origin/main", "origin/dev"]);
    }

    #[test]
    fn remote_config_parses_and_dedupes() {
        let output = "remote.origin.url git@example.com:a/b.git\nremote.fork.url https://example.com/c/d\nremote.origin.url second-url-ignored\n";
        let remotes = parse_remote_config(output);
        assert_eq!(
            remotes,
            vec![
                ("origin".to_string(), "git@example.com:a/b.git".to_string()),
                ("fork".to_string(), "https://example.com/c/d".to_string()),
            ]
        );
    }
}
