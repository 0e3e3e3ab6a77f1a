//! Git subprocess plumbing: repository discovery, command execution, and
//! control-file reads shared by the status modules.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

pub mod commit;
pub mod diff;
pub mod parse;
pub mod refs;

pub use commit::{CommitCache, CommitDetails};
pub use diff::Hunk;
pub use refs::{Ref, RefKind, Remote};

#[derive(Debug)]
pub enum GitError {
    CommandFailed(String),
    ParseError(String),
}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::CommandFailed(msg) => write!(f, "git command failed: {}", msg),
            GitError::ParseError(msg) => write!(f, "failed to parse git output: {}", msg),
        }
    }
}

impl std::error::Error for GitError {}

/// Repository context for git queries.
///
/// Resolves the working-copy root and control directory once at
/// construction; everything else is queried on demand. Cloning is cheap
/// and clones share the commit cache, so parallel tasks benefit from each
/// other's lookups.
///
/// # Examples
///
/// ```no_run
/// use gitsnap::git::Repository;
///
/// let repo = Repository::discover(".")?;
/// let stdout = repo.run_command(&["status", "--porcelain"])?;
/// # Ok::<(), gitsnap::git::GitError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
    git_dir: PathBuf,
    commits: CommitCache,
}

impl Repository {
    /// Discover the repository containing `path`.
    ///
    /// Fails when `path` is not inside a git working copy; this is one of
    /// the two mandatory operations whose errors propagate to the caller.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let root = PathBuf::from(run_git_in(path, &["rev-parse", "--show-toplevel"])?.trim());
        let git_dir = PathBuf::from(run_git_in(path, &["rev-parse", "--git-dir"])?.trim());
        // rev-parse reports the control directory relative to the cwd when
        // it can (e.g. plain `.git`), so anchor it to the root.
        let git_dir = if git_dir.is_absolute() {
            git_dir
        } else {
            root.join(git_dir)
        };
        Ok(Self {
            root,
            git_dir,
            commits: CommitCache::default(),
        })
    }

    /// The working-copy root (parent of the control directory).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The control directory (`.git`, or the worktree's private git dir).
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Run a git command with the repository root as working directory and
    /// return its stdout. Non-zero exit yields `CommandFailed` carrying
    /// stderr.
    pub fn run_command(&self, args: &[&str]) -> Result<String, GitError> {
        run_git_in(&self.root, args)
    }

    /// Read a single config value. `None` when unset or empty.
    pub fn config(&self, key: &str) -> Option<String> {
        self.run_command(&["config", "--get", key])
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Read a file under the control directory.
    ///
    /// `Ok(None)` means the file does not exist, the common and expected
    /// case for operation marker files. Real I/O failures surface as
    /// errors so callers can tell the two apart.
    pub fn read_control_file(&self, name: &str) -> Result<Option<String>, GitError> {
        match std::fs::read_to_string(self.git_dir.join(name)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(GitError::CommandFailed(format!(
                "reading {}: {}",
                name, err
            ))),
        }
    }

    /// Whether a control sub-directory exists and has at least one entry.
    pub fn control_dir_non_empty(&self, name: &str) -> bool {
        std::fs::read_dir(self.git_dir.join(name))
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }
}

fn run_git_in(dir: &Path, args: &[&str]) -> Result<String, GitError> {
    log::debug!("$ git {}", args.join(" "));

    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| GitError::CommandFailed(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::CommandFailed(stderr.trim().to_string()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
