//! # Ingestion Pipeline
//!
//! Drives the whole run: for every job in the configuration, acquire the
//! repository, enumerate and summarize its revisions, persist each
//! summary, and register it in the index. The index is saved once at the
//! end of the run.
//!
//! Jobs run strictly sequentially, as do revisions within a job: every
//! revision of a repository shares one mutable working copy, so
//! concurrent checkouts are unsafe by construction. One failing job is
//! logged and recorded in the report; it never prevents the remaining
//! jobs from running. Callers must treat the result as "however many
//! records were successfully produced", not as empty-or-complete.

use log::{error, info};
use serde::Serialize;

use crate::config::IndexerConfig;
use crate::error::Result;
use crate::index::ModuleIndex;
use crate::repository::RepositoryManager;

/// Outcome of one pipeline run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PipelineReport {
    /// Summaries persisted and registered in the index.
    pub summaries_stored: usize,
    /// Jobs attempted.
    pub jobs_processed: usize,
    /// Repository locators of jobs that failed outright.
    pub jobs_failed: Vec<String>,
}

/// Run the pipeline with the default (system-git) repository manager.
pub fn run(config: &IndexerConfig) -> Result<PipelineReport> {
    let manager = RepositoryManager::new(config.effective_workdir());
    run_with_manager(config, &manager)
}

/// Run the pipeline with a caller-supplied repository manager (tests
/// inject mocked git operations through this).
pub fn run_with_manager(
    config: &IndexerConfig,
    manager: &RepositoryManager,
) -> Result<PipelineReport> {
    let mut index = ModuleIndex::open(&config.storage_dir)?;
    let mut report = PipelineReport::default();

    for job in &config.repos {
        report.jobs_processed += 1;
        let summaries = match manager.summarize_job(job) {
            Ok(summaries) => summaries,
            Err(e) => {
                // Contain the failure to this job; the rest of the list
                // still runs.
                error!("job failed for {}: {}", job.url, e);
                report.jobs_failed.push(job.url.clone());
                continue;
            }
        };

        info!("{}: {} module summaries", job.url, summaries.len());
        for summary in &summaries {
            // Storage and index registration share one code path; an I/O
            // failure here is environmental and propagates.
            index.store(summary)?;
            report.summaries_stored += 1;
        }
    }

    index.save()?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepoJob;
    use crate::error::Error;
    use crate::index::{module_id, ModuleIndex};
    use crate::query::QueryService;
    use crate::repository::GitOperations;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Mock git backend: clones materialize a small fixture module, and
    /// clones of URLs containing "unreachable" fail.
    struct FixtureGit;

    impl GitOperations for FixtureGit {
        fn clone_repository(&self, url: &str, target_dir: &Path) -> crate::error::Result<()> {
            if url.contains("unreachable") {
                return Err(Error::GitClone {
                    url: url.to_string(),
                    message: "no route to host".to_string(),
                });
            }
            fs::create_dir_all(target_dir.join(".git")).unwrap();
            fs::write(
                target_dir.join("main.tf"),
                "# Fixture module\nresource \"aws_vpc\" \"this\" {\n  cidr_block = var.cidr\n}\n",
            )
            .unwrap();
            fs::write(
                target_dir.join("variables.tf"),
                "variable \"cidr\" {\n  type = string\n}\n",
            )
            .unwrap();
            Ok(())
        }

        fn fetch_updates(&self, _workdir: &Path) -> crate::error::Result<()> {
            Ok(())
        }

        fn checkout_revision(&self, _workdir: &Path, _revision: &str) -> crate::error::Result<()> {
            Ok(())
        }

        fn list_tags(&self, _workdir: &Path) -> crate::error::Result<Vec<String>> {
            Ok(vec!["v1.0.0".to_string(), "v1.1.0".to_string()])
        }
    }

    fn config(storage: &Path, workdir: &Path, urls: &[&str]) -> IndexerConfig {
        IndexerConfig {
            storage_dir: storage.to_path_buf(),
            workdir: Some(workdir.to_path_buf()),
            repos: urls
                .iter()
                .map(|url| RepoJob {
                    url: url.to_string(),
                    name: None,
                    branches: vec!["main".to_string()],
                    include_tags: true,
                    tag_limit: Some(10),
                    path: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_pipeline_stores_and_indexes_every_revision() {
        let temp = TempDir::new().unwrap();
        let storage = temp.path().join("modules");
        let workdir = temp.path().join("work");
        let config = config(&storage, &workdir, &["https://example.com/org/net.git"]);
        let manager =
            RepositoryManager::with_operations(workdir.clone(), Box::new(FixtureGit));

        let report = run_with_manager(&config, &manager).unwrap();
        assert_eq!(report.jobs_processed, 1);
        assert!(report.jobs_failed.is_empty());
        // main + two tags.
        assert_eq!(report.summaries_stored, 3);

        // The index was saved and joins up with the corpus.
        let index = ModuleIndex::open(&storage).unwrap();
        assert_eq!(index.len(), 3);
        let id = module_id("https://example.com/org/net.git", "v1.1.0", ".");
        let record = index.get(&id).unwrap();
        assert!(storage.join(&record.file).exists());

        // The query side sees the same records.
        let service = QueryService::new(&storage);
        assert_eq!(service.search_modules("", None, None).len(), 3);
        let module = service
            .get_module("https://example.com/org/net.git", "main", ".", false)
            .unwrap();
        assert_eq!(module.description.as_deref(), Some("Fixture module"));
        assert_eq!(module.variables.len(), 1);
    }

    #[test]
    fn test_pipeline_isolates_failing_jobs() {
        let temp = TempDir::new().unwrap();
        let storage = temp.path().join("modules");
        let workdir = temp.path().join("work");
        let config = config(
            &storage,
            &workdir,
            &[
                "https://unreachable.example.com/org/a.git",
                "https://example.com/org/b.git",
            ],
        );
        let manager =
            RepositoryManager::with_operations(workdir.clone(), Box::new(FixtureGit));

        let report = run_with_manager(&config, &manager).unwrap();
        assert_eq!(report.jobs_processed, 2);
        assert_eq!(
            report.jobs_failed,
            vec!["https://unreachable.example.com/org/a.git"]
        );
        // The healthy job still produced its summaries.
        assert_eq!(report.summaries_stored, 3);
    }

    #[test]
    fn test_pipeline_rerun_overwrites_in_place() {
        let temp = TempDir::new().unwrap();
        let storage = temp.path().join("modules");
        let workdir = temp.path().join("work");
        let config = config(&storage, &workdir, &["https://example.com/org/net.git"]);
        let manager =
            RepositoryManager::with_operations(workdir.clone(), Box::new(FixtureGit));

        run_with_manager(&config, &manager).unwrap();
        run_with_manager(&config, &manager).unwrap();

        // Re-adding the same natural keys overwrites rather than
        // duplicating.
        let index = ModuleIndex::open(&storage).unwrap();
        assert_eq!(index.len(), 3);
    }
}
