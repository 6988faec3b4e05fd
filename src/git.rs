//! Git plumbing for repository acquisition.
//!
//! All version-control work shells out to the system `git` command, which
//! automatically handles:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig
//!
//! Clones are full (not shallow): the pipeline enumerates tags and checks
//! out many revisions of the same working copy, so the whole history has
//! to be present locally. This module also hosts the pure tag-ordering
//! policy (`parse_semver_tag`, `order_tags`) that revision enumeration is
//! built on.

use std::fs;
use std::path::Path;
use std::process::Command;

use semver::Version;

use crate::error::{Error, Result};

/// Clone a repository into `target_dir`, creating parent directories as
/// needed. Any existing directory at the target is removed first (git
/// refuses to clone into a non-empty directory).
pub fn clone(url: &str, target_dir: &Path) -> Result<()> {
    if target_dir.exists() {
        fs::remove_dir_all(target_dir)?;
    }
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let output = Command::new("git")
        .arg("clone")
        .arg(url)
        .arg(target_dir)
        .output()
        .map_err(|e| Error::GitClone {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        // Provide helpful error message for common auth failures
        let message = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            format!(
                "Authentication failed. Make sure you have access to the repository.\n\
                For private repos, ensure you have:\n\
                - SSH key added to ssh-agent\n\
                - Git credentials configured\n\
                - Personal access token set up\n\
                Error: {}",
                stderr
            )
        } else {
            stderr.to_string()
        };

        return Err(Error::GitClone {
            url: url.to_string(),
            message,
        });
    }

    Ok(())
}

/// Update an existing working copy: fetch branches and tags from origin,
/// pruning refs that disappeared upstream.
pub fn fetch(workdir: &Path) -> Result<()> {
    run_git(workdir, &["fetch", "--tags", "--prune", "origin"])?;
    Ok(())
}

/// Check out a revision as a detached HEAD, discarding local changes.
///
/// Branch names are resolved against `origin/` first so a fetched update
/// wins over any stale local branch created by the original clone; tag
/// names and commit ids fall back to direct resolution.
pub fn checkout(workdir: &Path, revision: &str) -> Result<()> {
    let remote_ref = format!("origin/{}", revision);
    if run_git(workdir, &["checkout", "--force", "--detach", &remote_ref]).is_ok() {
        return Ok(());
    }
    run_git(workdir, &["checkout", "--force", "--detach", revision])?;
    Ok(())
}

/// List all tags known to the working copy (populated by `fetch`).
pub fn list_tags(workdir: &Path) -> Result<Vec<String>> {
    let stdout = run_git(workdir, &["tag", "--list"])?;
    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Whether `dir` holds a git working copy.
pub fn is_repository(dir: &Path) -> bool {
    dir.join(".git").exists()
}

/// Run a git subcommand in `workdir` and return its stdout.
fn run_git(workdir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(workdir)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            context: workdir.display().to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command: args.join(" "),
            context: workdir.display().to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Parse a tag string into a semantic version.
///
/// Accepts an optional `v` prefix (`v1.2.3` and `1.2.3` both parse);
/// anything else is not a version tag.
pub fn parse_semver_tag(tag: &str) -> Option<Version> {
    let version_str = tag.strip_prefix('v').unwrap_or(tag);
    Version::parse(version_str).ok()
}

/// Order tags for revision enumeration.
///
/// Tags that parse as semantic versions come first, newest version first.
/// Tags that do not parse are appended afterwards in reverse
/// lexicographic order. `limit` truncates the *ordered* list, so a cap
/// always keeps the highest versions.
pub fn order_tags(tags: Vec<String>, limit: Option<usize>) -> Vec<String> {
    let mut versioned: Vec<(Version, String)> = Vec::new();
    let mut unversioned: Vec<String> = Vec::new();

    for tag in tags {
        match parse_semver_tag(&tag) {
            Some(version) => versioned.push((version, tag)),
            None => unversioned.push(tag),
        }
    }

    versioned.sort_by(|a, b| b.0.cmp(&a.0));
    unversioned.sort_by(|a, b| b.cmp(a));

    let mut ordered: Vec<String> = versioned.into_iter().map(|(_, tag)| tag).collect();
    ordered.extend(unversioned);

    if let Some(limit) = limit {
        ordered.truncate(limit);
    }
    ordered
}
