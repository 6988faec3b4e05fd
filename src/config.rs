//! # Job-List Configuration
//!
//! Defines the schema for the `.tf-module-index.yaml` configuration file:
//! where summaries are stored, where working copies live, and the list of
//! repository jobs to ingest. Each job names a repository locator, the
//! branches to analyze verbatim, the tag-inclusion policy, and an optional
//! sub-path for repositories whose module does not live at the root.
//!
//! ## Parsing
//!
//! `parse` accepts two layouts: the full mapping form with a `repos:`
//! list, and, as a shorthand, a bare YAML sequence of job entries that
//! inherits all defaults. The mapping form is tried first; if it fails,
//! the shorthand parser runs before the original error is reported.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults::{default_workdir_root, DEFAULT_STORAGE_DIR};
use crate::error::{Error, Result};

/// One unit of acquisition work: a repository and the revisions to
/// analyze in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoJob {
    /// Clone URL of the repository.
    pub url: String,
    /// Optional friendly name, used for the local working-copy directory.
    #[serde(default)]
    pub name: Option<String>,
    /// Branches to analyze, verbatim and in listed order.
    #[serde(default = "default_branches")]
    pub branches: Vec<String>,
    /// Whether repository tags are enumerated in addition to branches.
    #[serde(default = "default_include_tags")]
    pub include_tags: bool,
    /// Cap applied to the *ordered* tag list; `null` disables the cap.
    #[serde(default = "default_tag_limit")]
    pub tag_limit: Option<usize>,
    /// Sub-path of the module within the repository; absent means the
    /// repository root.
    #[serde(default)]
    pub path: Option<String>,
}

fn default_branches() -> Vec<String> {
    vec!["main".to_string()]
}

fn default_include_tags() -> bool {
    true
}

fn default_tag_limit() -> Option<usize> {
    Some(10)
}

/// The complete indexer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Directory holding persisted summaries and the index file.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    /// Root directory for repository working copies; defaults to the
    /// platform cache directory.
    #[serde(default)]
    pub workdir: Option<PathBuf>,
    /// Repository jobs, processed in listed order.
    #[serde(default)]
    pub repos: Vec<RepoJob>,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STORAGE_DIR)
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            workdir: None,
            repos: Vec::new(),
        }
    }
}

impl IndexerConfig {
    /// The working-copy root, falling back to the platform default.
    pub fn effective_workdir(&self) -> PathBuf {
        self.workdir.clone().unwrap_or_else(default_workdir_root)
    }

    /// Validate the configuration, returning hint-carrying errors for
    /// the common mistakes.
    pub fn validate(&self) -> Result<()> {
        if self.repos.is_empty() {
            return Err(Error::ConfigParse {
                message: "no repositories configured".to_string(),
                hint: Some("add at least one entry under 'repos:'".to_string()),
            });
        }
        for (idx, job) in self.repos.iter().enumerate() {
            if job.url.trim().is_empty() {
                return Err(Error::ConfigParse {
                    message: format!("repository entry {} has an empty url", idx + 1),
                    hint: Some("every repos entry needs a 'url:' field".to_string()),
                });
            }
            if job.branches.is_empty() && !job.include_tags {
                return Err(Error::ConfigParse {
                    message: format!(
                        "repository entry {} selects no revisions ({})",
                        idx + 1,
                        job.url
                    ),
                    hint: Some(
                        "list at least one branch or enable include_tags".to_string(),
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Parse a YAML string into an [`IndexerConfig`].
pub fn parse(content: &str) -> Result<IndexerConfig> {
    let config = match serde_yaml::from_str::<IndexerConfig>(content) {
        Ok(config) => config,
        Err(primary) => {
            // Shorthand: a bare sequence of job entries.
            match serde_yaml::from_str::<Vec<RepoJob>>(content) {
                Ok(repos) => IndexerConfig {
                    repos,
                    ..IndexerConfig::default()
                },
                Err(_) => {
                    return Err(Error::ConfigParse {
                        message: primary.to_string(),
                        hint: Some(
                            "expected a mapping with a 'repos:' list, or a bare list of \
                             repository entries"
                                .to_string(),
                        ),
                    })
                }
            }
        }
    };
    config.validate()?;
    Ok(config)
}

/// Read and parse a configuration file.
pub fn from_file(path: &Path) -> Result<IndexerConfig> {
    let content = fs::read_to_string(path)?;
    parse(&content)
}
