//! # Corpus Query Service
//!
//! Queries that the flat index cannot answer run over the full persisted
//! corpus instead: keyword search across descriptions, documentation, and
//! entity names needs the complete summary records. The service re-reads
//! the storage directory on every call (no caching), so results always
//! reflect what is on disk, and a corrupt file in the corpus is skipped
//! rather than failing the scan.
//!
//! Like the index, this is an explicit handle scoped to a storage
//! directory rather than an ambient global.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::Serialize;

use crate::index::INDEX_FILE_NAME;
use crate::summary::{normalize_module_path, repo_base_name, ModuleSummary};

/// Aggregated view of one repository across all indexed revisions.
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryOverview {
    pub repository: String,
    /// Distinct revisions seen, in corpus order.
    pub revisions: Vec<String>,
    pub module_count: usize,
    /// Union of provider names across the repository's modules.
    pub providers: Vec<String>,
}

/// Read-side handle over the persisted summary corpus.
pub struct QueryService {
    storage_dir: PathBuf,
}

impl QueryService {
    pub fn new(storage_dir: &Path) -> Self {
        Self {
            storage_dir: storage_dir.to_path_buf(),
        }
    }

    /// Load every summary in the storage directory, skipping the index
    /// file and anything that fails to deserialize.
    fn load_corpus(&self) -> Vec<ModuleSummary> {
        let entries = match fs::read_dir(&self.storage_dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path.extension().is_some_and(|ext| ext == "json")
                    && path.file_name().is_some_and(|name| name != INDEX_FILE_NAME)
            })
            .collect();
        files.sort();

        let mut corpus = Vec::new();
        for path in files {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("skipping unreadable file {}: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_str::<ModuleSummary>(&content) {
                Ok(summary) => corpus.push(summary),
                Err(e) => warn!("skipping non-summary file {}: {}", path.display(), e),
            }
        }
        corpus
    }

    /// Group the corpus by repository, optionally filtered by a
    /// case-insensitive keyword against the locator, short name, and
    /// module descriptions, and optionally capped to `limit` entries.
    pub fn list_repositories(
        &self,
        keyword: Option<&str>,
        limit: Option<usize>,
    ) -> Vec<RepositoryOverview> {
        let needle = keyword.map(str::to_lowercase);
        let mut overviews: Vec<RepositoryOverview> = Vec::new();

        for summary in self.load_corpus() {
            let position = match overviews
                .iter()
                .position(|o| o.repository == summary.repository)
            {
                Some(position) => position,
                None => {
                    overviews.push(RepositoryOverview {
                        repository: summary.repository.clone(),
                        revisions: Vec::new(),
                        module_count: 0,
                        providers: Vec::new(),
                    });
                    overviews.len() - 1
                }
            };
            let overview = &mut overviews[position];
            overview.module_count += 1;
            if !overview.revisions.contains(&summary.revision) {
                overview.revisions.push(summary.revision.clone());
            }
            for provider in &summary.providers {
                if !overview.providers.contains(&provider.name) {
                    overview.providers.push(provider.name.clone());
                }
            }
        }

        if let Some(needle) = &needle {
            // Descriptions live on the summaries, so match during a second
            // corpus pass keyed by repository.
            let corpus = self.load_corpus();
            overviews.retain(|overview| {
                overview.repository.to_lowercase().contains(needle)
                    || repo_base_name(&overview.repository)
                        .to_lowercase()
                        .contains(needle)
                    || corpus.iter().any(|s| {
                        s.repository == overview.repository
                            && s.description
                                .as_deref()
                                .is_some_and(|d| d.to_lowercase().contains(needle))
                    })
            });
        }

        if let Some(limit) = limit {
            overviews.truncate(limit);
        }
        overviews
    }

    /// Full-record search.
    ///
    /// `query` is matched case-insensitively against description,
    /// repository, path, documentation, variable names and descriptions,
    /// output names and descriptions, and provider names and sources; an
    /// empty query matches every record. `repositories` restricts results
    /// to an exact set of locators; `provider` restricts to a
    /// case-insensitive substring of a provider name or source.
    pub fn search_modules(
        &self,
        query: &str,
        repositories: Option<&[String]>,
        provider: Option<&str>,
    ) -> Vec<ModuleSummary> {
        let needle = query.to_lowercase();
        let provider_needle = provider.map(str::to_lowercase);

        self.load_corpus()
            .into_iter()
            .filter(|summary| {
                if let Some(allowed) = repositories {
                    if !allowed.contains(&summary.repository) {
                        return false;
                    }
                }
                if let Some(provider_needle) = &provider_needle {
                    let matches_provider = summary.providers.iter().any(|p| {
                        p.name.to_lowercase().contains(provider_needle)
                            || p.source
                                .as_deref()
                                .is_some_and(|s| s.to_lowercase().contains(provider_needle))
                    });
                    if !matches_provider {
                        return false;
                    }
                }
                needle.is_empty() || summary_matches(summary, &needle)
            })
            .collect()
    }

    /// Exact natural-key lookup. The documentation blob is stripped from
    /// the result unless `include_readme` is set.
    pub fn get_module(
        &self,
        repository: &str,
        revision: &str,
        path: &str,
        include_readme: bool,
    ) -> Option<ModuleSummary> {
        let path = normalize_module_path(Some(path));
        self.load_corpus()
            .into_iter()
            .find(|summary| {
                summary.repository == repository
                    && summary.revision == revision
                    && summary.path == path
            })
            .map(|mut summary| {
                if !include_readme {
                    summary.readme = None;
                }
                summary
            })
    }
}

/// Case-insensitive substring match across a summary's searchable fields.
fn summary_matches(summary: &ModuleSummary, needle: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(needle);
    let opt_contains = |text: &Option<String>| text.as_deref().is_some_and(contains);

    contains(&summary.repository)
        || contains(&summary.path)
        || opt_contains(&summary.description)
        || opt_contains(&summary.readme)
        || summary
            .variables
            .iter()
            .any(|v| contains(&v.name) || opt_contains(&v.description))
        || summary
            .outputs
            .iter()
            .any(|o| contains(&o.name) || opt_contains(&o.description))
        || summary
            .providers
            .iter()
            .any(|p| contains(&p.name) || opt_contains(&p.source))
}

/// Distinct provider names across a set of summaries, sorted.
pub fn provider_union(summaries: &[ModuleSummary]) -> Vec<String> {
    let names: BTreeSet<String> = summaries
        .iter()
        .flat_map(|s| s.providers.iter().map(|p| p.name.clone()))
        .collect();
    names.into_iter().collect()
}
