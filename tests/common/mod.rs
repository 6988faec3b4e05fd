//! Shared test utilities for integration and E2E tests.
//!
//! Provides a storage-directory fixture, summary builders, and helpers
//! for creating throwaway local git repositories with the system `git`
//! binary (the same binary the production acquisition code shells out
//! to).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tf_module_index::summary::{ModuleSummary, ProviderRequirement, ROOT_MODULE_PATH};

/// A test fixture wrapping a temporary directory with a storage
/// sub-directory for summaries and the index file.
pub struct TestFixture {
    temp_dir: tempfile::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: tempfile::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Root of the fixture.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Storage directory (created on first use).
    pub fn storage(&self) -> PathBuf {
        let dir = self.temp_dir.path().join("modules");
        fs::create_dir_all(&dir).expect("Failed to create storage directory");
        dir
    }

    /// Working-copy root (created on first use).
    pub fn workdir(&self) -> PathBuf {
        let dir = self.temp_dir.path().join("work");
        fs::create_dir_all(&dir).expect("Failed to create workdir");
        dir
    }

    /// Write a file relative to the fixture root, creating parents.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Persist a summary into the storage directory under its derived
    /// file name, bypassing the index (corpus-only fixture data).
    pub fn persist_summary(&self, summary: &ModuleSummary) -> PathBuf {
        let path = self.storage().join(summary.storage_file_name());
        fs::write(&path, serde_json::to_string_pretty(summary).unwrap())
            .expect("Failed to write summary file");
        path
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A minimal summary for (repository, revision, path).
#[allow(dead_code)]
pub fn sample_summary(repository: &str, revision: &str, path: &str) -> ModuleSummary {
    ModuleSummary {
        repository: repository.to_string(),
        revision: revision.to_string(),
        path: path.to_string(),
        description: None,
        variables: vec![],
        outputs: vec![],
        providers: vec![],
        submodules: vec![],
        resources: vec![],
        readme: None,
    }
}

/// A summary with a description and provider list, for search fixtures.
#[allow(dead_code)]
pub fn described_summary(
    repository: &str,
    revision: &str,
    description: &str,
    providers: &[&str],
) -> ModuleSummary {
    let mut summary = sample_summary(repository, revision, ROOT_MODULE_PATH);
    summary.description = Some(description.to_string());
    summary.providers = providers
        .iter()
        .map(|name| ProviderRequirement {
            name: name.to_string(),
            source: None,
            version: None,
        })
        .collect();
    summary
}

/// Whether the system `git` binary is available. Tests that build real
/// repositories skip themselves (with a note) when it is not.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Run a git command in `dir`, panicking on failure.
#[allow(dead_code)]
pub fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args([
            "-c",
            "user.email=tests@example.com",
            "-c",
            "user.name=Tests",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Build a local git repository containing a Terraform module with two
/// commits: `v1.0.0` is tagged on the first commit, `v2.0.0` and `main`
/// point at the second, which adds a variable.
#[allow(dead_code)]
pub fn init_module_repo(dir: &Path) {
    fs::create_dir_all(dir).expect("Failed to create repo directory");
    run_git(dir, &["init", "--quiet"]);
    run_git(dir, &["checkout", "-B", "main", "--quiet"]);

    fs::write(
        dir.join("main.tf"),
        "# Network module\n# Provisions the VPC used by the test suite.\n\nresource \"aws_vpc\" \"this\" {\n  cidr_block = var.cidr\n}\n",
    )
    .unwrap();
    fs::write(
        dir.join("variables.tf"),
        "variable \"cidr\" {\n  type        = string\n  description = \"VPC CIDR block\"\n}\n",
    )
    .unwrap();
    fs::write(
        dir.join("outputs.tf"),
        "output \"vpc_id\" {\n  value = aws_vpc.this.id\n}\n",
    )
    .unwrap();
    fs::write(
        dir.join("versions.tf"),
        "terraform {\n  required_providers {\n    aws = {\n      source  = \"hashicorp/aws\"\n      version = \"~> 5.0\"\n    }\n  }\n}\n",
    )
    .unwrap();
    fs::write(dir.join("README.md"), "# network\n\nTest network module.\n").unwrap();

    run_git(dir, &["add", "."]);
    run_git(dir, &["commit", "--quiet", "-m", "initial module"]);
    run_git(dir, &["tag", "v1.0.0"]);

    fs::write(
        dir.join("variables.tf"),
        "variable \"cidr\" {\n  type        = string\n  description = \"VPC CIDR block\"\n}\n\nvariable \"enable_nat\" {\n  type    = bool\n  default = false\n}\n",
    )
    .unwrap();
    run_git(dir, &["add", "."]);
    run_git(dir, &["commit", "--quiet", "-m", "add enable_nat variable"]);
    run_git(dir, &["tag", "v2.0.0"]);
}
