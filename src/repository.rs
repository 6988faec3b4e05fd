//! # Repository Acquisition
//!
//! The [`RepositoryManager`] owns the working-copy root for the lifetime
//! of a run: it clones repositories that are not present locally, fetches
//! updates for ones that are, and recovers from a broken working copy by
//! discarding it and re-cloning (self-healing, no partial-state retries).
//!
//! Revisions within one repository share a single mutable working copy,
//! so they are checked out and parsed strictly sequentially. A failure of
//! one revision never aborts the remaining revisions, and a failure of
//! one repository never aborts the rest of the job list (the pipeline
//! layer contains job-level errors).
//!
//! ## Design
//!
//! Git actions go through the [`GitOperations`] trait so tests can swap
//! in mock implementations and exercise the acquisition logic without a
//! network or a `git` binary. [`DefaultGitOperations`] wraps the real
//! system-git plumbing in [`crate::git`].

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use sha2::{Digest, Sha256};

use crate::config::RepoJob;
use crate::error::Result;
use crate::git;
use crate::parser;
use crate::summary::{normalize_module_path, repo_base_name, ModuleSummary, ROOT_MODULE_PATH};

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Clone a repository into `target_dir` (full clone; the pipeline
    /// needs every branch and tag).
    fn clone_repository(&self, url: &str, target_dir: &Path) -> Result<()>;

    /// Fetch branches and tags into an existing working copy.
    fn fetch_updates(&self, workdir: &Path) -> Result<()>;

    /// Check out a revision as a detached HEAD.
    fn checkout_revision(&self, workdir: &Path, revision: &str) -> Result<()>;

    /// List all tags known to the working copy.
    fn list_tags(&self, workdir: &Path) -> Result<Vec<String>>;
}

/// The default implementation of `GitOperations`, backed by the system
/// `git` command.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_repository(&self, url: &str, target_dir: &Path) -> Result<()> {
        git::clone(url, target_dir)
    }

    fn fetch_updates(&self, workdir: &Path) -> Result<()> {
        git::fetch(workdir)
    }

    fn checkout_revision(&self, workdir: &Path, revision: &str) -> Result<()> {
        git::checkout(workdir, revision)
    }

    fn list_tags(&self, workdir: &Path) -> Result<Vec<String>> {
        git::list_tags(workdir)
    }
}

/// Manages local working copies and turns acquisition jobs into module
/// summaries.
pub struct RepositoryManager {
    workdir_root: PathBuf,
    git_ops: Box<dyn GitOperations>,
}

impl RepositoryManager {
    /// Create a manager that keeps working copies under `workdir_root`.
    pub fn new(workdir_root: PathBuf) -> Self {
        Self {
            workdir_root,
            git_ops: Box::new(DefaultGitOperations),
        }
    }

    /// Create a manager with custom git operations (used by tests to
    /// inject mocks).
    pub fn with_operations(workdir_root: PathBuf, git_ops: Box<dyn GitOperations>) -> Self {
        Self {
            workdir_root,
            git_ops,
        }
    }

    /// The working-copy directory for a job: the job's name override (or
    /// the repository basename) plus a short URL hash so distinct
    /// repositories with the same basename do not collide.
    pub fn working_copy_path(&self, job: &RepoJob) -> PathBuf {
        let name = job
            .name
            .clone()
            .unwrap_or_else(|| repo_base_name(&job.url));
        let safe_name = name.replace(['/', '\\', ':'], "-");
        self.workdir_root
            .join(format!("{}-{}", safe_name, short_hash(&job.url)))
    }

    /// Produce a ready-to-read working copy for `job`.
    ///
    /// Clones when absent, fetches when present; a failed fetch discards
    /// the working copy and re-clones rather than retrying on possibly
    /// corrupt state.
    pub fn ensure_working_copy(&self, job: &RepoJob) -> Result<PathBuf> {
        let workdir = self.working_copy_path(job);

        if git::is_repository(&workdir) {
            debug!("fetching updates for {} in {}", job.url, workdir.display());
            match self.git_ops.fetch_updates(&workdir) {
                Ok(()) => return Ok(workdir),
                Err(e) => {
                    warn!(
                        "fetch failed for {}, discarding working copy and re-cloning: {}",
                        job.url, e
                    );
                    fs::remove_dir_all(&workdir)?;
                }
            }
        } else if workdir.exists() {
            // Leftover directory that is not a git repository.
            warn!(
                "removing non-repository directory {} before cloning",
                workdir.display()
            );
            fs::remove_dir_all(&workdir)?;
        }

        info!("cloning {} into {}", job.url, workdir.display());
        self.git_ops.clone_repository(&job.url, &workdir)?;
        Ok(workdir)
    }

    /// Enumerate the revisions to analyze for `job`: configured branches
    /// verbatim and in listed order, then (when enabled) tags ordered
    /// semver-descending with the cap applied after ordering.
    pub fn enumerate_revisions(&self, workdir: &Path, job: &RepoJob) -> Result<Vec<String>> {
        let mut revisions = job.branches.clone();
        if job.include_tags {
            let tags = self.git_ops.list_tags(workdir)?;
            revisions.extend(git::order_tags(tags, job.tag_limit));
        }
        Ok(revisions)
    }

    /// Run one acquisition job to completion: acquire the working copy,
    /// enumerate revisions, and summarize each one.
    ///
    /// Per-revision failures (checkout errors, missing sub-paths) are
    /// logged and skipped; the returned collection holds however many
    /// summaries were successfully produced.
    pub fn summarize_job(&self, job: &RepoJob) -> Result<Vec<ModuleSummary>> {
        let workdir = self.ensure_working_copy(job)?;
        let revisions = self.enumerate_revisions(&workdir, job)?;
        let module_path = normalize_module_path(job.path.as_deref());

        let mut summaries = Vec::new();
        for revision in &revisions {
            if let Err(e) = self.git_ops.checkout_revision(&workdir, revision) {
                warn!("skipping {}@{}: {}", job.url, revision, e);
                continue;
            }

            let module_dir = if module_path == ROOT_MODULE_PATH {
                workdir.clone()
            } else {
                workdir.join(&module_path)
            };
            if !module_dir.is_dir() {
                warn!(
                    "skipping {}@{}: path '{}' does not exist at this revision",
                    job.url, revision, module_path
                );
                continue;
            }

            let parsed = match parser::parse_module_directory(&module_dir) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("skipping {}@{}: {}", job.url, revision, e);
                    continue;
                }
            };
            for issue in &parsed.issues {
                warn!(
                    "{}@{}: problem in {}: {}",
                    job.url, revision, issue.file, issue.message
                );
            }

            summaries.push(ModuleSummary {
                repository: job.url.clone(),
                revision: revision.clone(),
                path: module_path.clone(),
                description: parsed.description,
                variables: parsed.variables,
                outputs: parsed.outputs,
                providers: parsed.providers,
                submodules: parsed.submodules,
                resources: parsed.resources,
                readme: parsed.readme,
            });
        }

        Ok(summaries)
    }
}

/// Short content hash used to keep working-copy directory names unique.
fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())[..12].to_string()
}
