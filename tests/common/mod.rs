use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// A throwaway git repository with an isolated environment.
///
/// Fixture commands pin author/committer dates and bypass global/system
/// config so results don't depend on the host; the repo-local config
/// disables signing for the same reason (the library under test runs
/// plain `git`, which reads repo-local config).
pub struct TestRepo {
    _temp: TempDir,
    root: PathBuf,
}

impl TestRepo {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp directory");
        let root = temp.path().join("repo");
        std::fs::create_dir(&root).expect("create repo directory");
        // Resolve symlinks (macOS /var -> /private/var) so paths compare
        // equal with what git reports.
        let root = root.canonicalize().expect("canonicalize repo path");

        let repo = Self { _temp: temp, root };
        repo.git(&["init", "-b", "main"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.git(&["config", "tag.gpgsign", "false"]);
        repo
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    pub fn git_dir(&self) -> PathBuf {
        self.root.join(".git")
    }

    /// Run a git command in the repo; panics on failure.
    pub fn git(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run a git command that is allowed to fail (conflicting merges and
    /// cherry-picks exit non-zero by design).
    pub fn git_allow_failure(&self, args: &[&str]) {
        self.run(args);
    }

    fn run(&self, args: &[&str]) -> std::process::Output {
        Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .env("GIT_CONFIG_GLOBAL", "/dev/null")
            .env("GIT_CONFIG_SYSTEM", "/dev/null")
            .env("GIT_AUTHOR_DATE", "2025-01-01T00:00:00Z")
            .env("GIT_COMMITTER_DATE", "2025-01-01T00:00:00Z")
            .env("LC_ALL", "C")
            .output()
            .expect("run git")
    }

    pub fn write_file(&self, name: &str, contents: &str) {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent directory");
        }
        std::fs::write(path, contents).expect("write file");
    }

    /// Write, stage, and commit a file; returns the commit hash.
    pub fn commit_file(&self, name: &str, contents: &str, message: &str) -> String {
        self.write_file(name, contents);
        self.git(&["add", name]);
        self.git(&["commit", "-m", message]);
        self.head()
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"]).trim().to_string()
    }

    pub fn rev_parse(&self, rev: &str) -> String {
        self.git(&["rev-parse", rev]).trim().to_string()
    }

    /// Clone this repository into a sibling fixture (used for
    /// upstream/remote tests; the clone gets `origin` pointing here).
    pub fn clone_repo(&self) -> TestRepo {
        let temp = TempDir::new().expect("create temp directory");
        let root = temp.path().join("clone");

        let output = Command::new("git")
            .args([
                "clone",
                self.root.to_str().expect("utf-8 path"),
                root.to_str().expect("utf-8 path"),
            ])
            .env("GIT_CONFIG_GLOBAL", "/dev/null")
            .env("GIT_CONFIG_SYSTEM", "/dev/null")
            .env("LC_ALL", "C")
            .output()
            .expect("run git clone");
        assert!(
            output.status.success(),
            "git clone failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let root = root.canonicalize().expect("canonicalize clone path");
        let clone = Self { _temp: temp, root };
        clone.git(&["config", "user.name", "Test User"]);
        clone.git(&["config", "user.email", "test@example.com"]);
        clone.git(&["config", "commit.gpgsign", "false"]);
        clone
    }
}
