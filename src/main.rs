use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use gitsnap::git::Repository;
use gitsnap::status::{self, OperationState, RepositorySnapshot};

/// Print a consistent status snapshot of a git repository.
#[derive(Parser)]
#[command(name = "gitsnap", version, about)]
struct Cli {
    /// Repository path (any directory inside the working copy)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Emit the snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Maximum number of recent commits to include
    #[arg(long, default_value_t = status::RECENT_LOG_LIMIT)]
    log: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let repo = Repository::discover(&cli.path)
        .with_context(|| format!("not a git repository: {}", cli.path.display()))?;
    let snapshot = status::builder::snapshot_with_log_limit(&repo, cli.log)
        .context("failed to assemble status snapshot")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_summary(&snapshot);
    }

    Ok(())
}

fn print_summary(snapshot: &RepositorySnapshot) {
    let head = &snapshot.head;
    let name = head.name.as_deref().unwrap_or("(detached)");
    match &head.commit_details {
        Some(details) => println!("{} {} {}", name, details.short_hash(), details.subject()),
        None => println!("{} (no commits)", name),
    }

    if let Some(upstream) = &head.upstream {
        let ahead = upstream.ahead.as_ref().map_or(0, |r| r.commits.len());
        let behind = upstream.behind.as_ref().map_or(0, |r| r.commits.len());
        println!(
            "upstream {}/{}: ahead {}, behind {}",
            upstream.remote, upstream.name, ahead, behind
        );
    }
    if let Some(push) = &head.push_remote {
        let ahead = push.ahead.as_ref().map_or(0, |r| r.commits.len());
        let behind = push.behind.as_ref().map_or(0, |r| r.commits.len());
        println!(
            "push {}/{}: ahead {}, behind {}",
            push.remote, push.name, ahead, behind
        );
    }

    match &snapshot.operation {
        Some(OperationState::Merging(state)) => {
            println!(
                "merging {} ({} commits)",
                state.branches.join(", "),
                state.commits.len()
            );
        }
        Some(OperationState::Rebasing(state)) => {
            println!(
                "rebasing {} onto {}: {} done, {} remaining",
                state.branch,
                state.onto.name,
                state.done_commits.len(),
                state.upcoming_commits.len()
            );
        }
        Some(OperationState::CherryPicking(state)) => {
            println!(
                "cherry-picking {} ({} queued)",
                state.current_commit.short_hash(),
                state.upcoming_commits.len()
            );
        }
        Some(OperationState::Reverting(state)) => {
            println!(
                "reverting {} ({} queued)",
                state.current_commit.short_hash(),
                state.upcoming_commits.len()
            );
        }
        None => {}
    }

    println!(
        "{} staged, {} unstaged, {} conflicted, {} untracked, {} stashed",
        snapshot.index_changes.len(),
        snapshot.working_tree_changes.len(),
        snapshot.merge_changes.len(),
        snapshot.untracked_files.len(),
        snapshot.stashes.len()
    );
}
