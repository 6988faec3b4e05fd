//! # Persistent Module Index
//!
//! A flat, content-addressed lookup table over the persisted summary
//! corpus, backed by a single JSON file in the storage directory. Each
//! record maps a derived identity (a SHA-256 digest of the natural key)
//! to the summary's location and a handful of filterable attributes, so
//! collaborators can answer "which modules use provider X" without
//! deserializing the whole corpus.
//!
//! The index is a cache, never a source of truth: [`ModuleIndex::rebuild`]
//! reconstructs it entirely from the summary files on disk, skipping
//! anything that does not deserialize. It is an explicit handle
//! constructed with a storage directory; state lives in the value, not
//! in a process-wide singleton.
//!
//! Loading is eager on [`ModuleIndex::open`]; saving is an explicit
//! whole-file rewrite via [`ModuleIndex::save`]. A failed save leaves the
//! previous on-disk file untouched.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::summary::ModuleSummary;

/// Name of the index file inside the storage directory.
pub const INDEX_FILE_NAME: &str = "index.json";

/// Format version written into the index file.
const INDEX_VERSION: &str = "1";

/// Derive the identity for a (repository, revision, path) triple.
///
/// SHA-256 over `"{repository}:{revision}:{path}"` with an unescaped
/// colon separator. A locator or revision containing a literal colon can
/// therefore collide with a different triple; this is a known ambiguity
/// that is deliberately left as-is.
pub fn module_id(repository: &str, revision: &str, path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(repository.as_bytes());
    hasher.update(b":");
    hasher.update(revision.as_bytes());
    hasher.update(b":");
    hasher.update(path.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Filterable tags for a summary: the sub-path's segments plus every
/// provider name.
pub fn derive_tags(summary: &ModuleSummary) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();

    if !summary.is_root() {
        for segment in summary.path.split('/').filter(|s| !s.is_empty()) {
            if seen.insert(segment.to_string()) {
                tags.push(segment.to_string());
            }
        }
    }
    for provider in &summary.providers {
        if seen.insert(provider.name.clone()) {
            tags.push(provider.name.clone());
        }
    }
    tags
}

/// One index entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub repository: String,
    pub revision: String,
    pub path: String,
    /// File name of the persisted summary within the storage directory.
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_provider: Option<String>,
    /// Comma-joined provider names.
    pub providers: String,
    pub tags: Vec<String>,
    pub indexed_at: DateTime<Utc>,
}

/// On-disk shape of the index file.
#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    version: String,
    generated_at: DateTime<Utc>,
    total: usize,
    records: BTreeMap<String, IndexRecord>,
}

/// Aggregate statistics over the index.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub total: usize,
    pub provider_count: usize,
    pub providers: Vec<String>,
    pub tag_count: usize,
}

/// The persistent index handle, scoped to one storage directory.
pub struct ModuleIndex {
    storage_dir: PathBuf,
    records: BTreeMap<String, IndexRecord>,
}

impl ModuleIndex {
    /// Open the index for a storage directory, creating the directory if
    /// needed and eagerly loading an existing index file.
    ///
    /// A corrupt index file is logged and treated as empty; the index is
    /// a cache and can always be rebuilt from the corpus.
    pub fn open(storage_dir: &Path) -> Result<Self> {
        fs::create_dir_all(storage_dir)?;

        let index_path = storage_dir.join(INDEX_FILE_NAME);
        let records = if index_path.exists() {
            let content = fs::read_to_string(&index_path)?;
            match serde_json::from_str::<IndexFile>(&content) {
                Ok(file) => file.records,
                Err(e) => {
                    warn!(
                        "index file {} is not readable ({}), starting empty",
                        index_path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            storage_dir: storage_dir.to_path_buf(),
            records,
        })
    }

    /// The storage directory this index is scoped to.
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Path of the index file.
    pub fn index_path(&self) -> PathBuf {
        self.storage_dir.join(INDEX_FILE_NAME)
    }

    /// Write the whole index file, replacing any previous contents.
    pub fn save(&self) -> Result<()> {
        let file = IndexFile {
            version: INDEX_VERSION.to_string(),
            generated_at: Utc::now(),
            total: self.records.len(),
            records: self.records.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| Error::Index {
            message: format!("could not serialize index: {}", e),
        })?;
        fs::write(self.index_path(), json)?;
        Ok(())
    }

    /// Register a summary, overwriting any record with the same natural
    /// key (idempotent). Returns the derived identity.
    pub fn add(&mut self, summary: &ModuleSummary) -> String {
        let id = module_id(&summary.repository, &summary.revision, &summary.path);
        let provider_names: Vec<&str> =
            summary.providers.iter().map(|p| p.name.as_str()).collect();
        let record = IndexRecord {
            id: id.clone(),
            repository: summary.repository.clone(),
            revision: summary.revision.clone(),
            path: summary.path.clone(),
            file: summary.storage_file_name(),
            primary_provider: provider_names.first().map(|name| name.to_string()),
            providers: provider_names.join(","),
            tags: derive_tags(summary),
            indexed_at: Utc::now(),
        };
        self.records.insert(id.clone(), record);
        id
    }

    /// Persist a summary to the storage directory and register it, so the
    /// corpus and the index stay in lockstep. Returns the summary file
    /// path.
    pub fn store(&mut self, summary: &ModuleSummary) -> Result<PathBuf> {
        let path = self.storage_dir.join(summary.storage_file_name());
        let json = serde_json::to_string_pretty(summary)?;
        fs::write(&path, json)?;
        self.add(summary);
        Ok(path)
    }

    /// Remove a record by identity. Returns whether a record existed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.records.remove(id).is_some()
    }

    /// Look up a record by identity.
    pub fn get(&self, id: &str) -> Option<&IndexRecord> {
        self.records.get(id)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, in identity order.
    pub fn records(&self) -> impl Iterator<Item = &IndexRecord> {
        self.records.values()
    }

    /// Records whose primary provider or provider list contains `query`
    /// (case-insensitive).
    pub fn find_by_provider(&self, query: &str) -> Vec<&IndexRecord> {
        let needle = query.to_lowercase();
        self.records
            .values()
            .filter(|record| {
                record
                    .primary_provider
                    .as_deref()
                    .is_some_and(|p| p.to_lowercase().contains(&needle))
                    || record.providers.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Records with a tag containing `query` (case-insensitive).
    pub fn find_by_tag(&self, query: &str) -> Vec<&IndexRecord> {
        let needle = query.to_lowercase();
        self.records
            .values()
            .filter(|record| {
                record
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Records whose repository locator contains `query`
    /// (case-insensitive).
    pub fn find_by_repository(&self, query: &str) -> Vec<&IndexRecord> {
        let needle = query.to_lowercase();
        self.records
            .values()
            .filter(|record| record.repository.to_lowercase().contains(&needle))
            .collect()
    }

    /// Rebuild the index from the persisted corpus: clear everything,
    /// re-add every summary file that deserializes (skipping corrupt or
    /// foreign files), and save. Returns the number of records.
    pub fn rebuild(&mut self) -> Result<usize> {
        self.records.clear();

        let mut entries: Vec<PathBuf> = fs::read_dir(&self.storage_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path.extension().is_some_and(|ext| ext == "json")
                    && path.file_name().is_some_and(|name| name != INDEX_FILE_NAME)
            })
            .collect();
        entries.sort();

        for path in entries {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("skipping unreadable file {}: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_str::<ModuleSummary>(&content) {
                Ok(summary) => {
                    self.add(&summary);
                }
                Err(e) => {
                    warn!("skipping non-summary file {}: {}", path.display(), e);
                }
            }
        }

        self.save()?;
        Ok(self.records.len())
    }

    /// Aggregate statistics: record total, distinct non-empty providers,
    /// and distinct tag count.
    pub fn stats(&self) -> IndexStats {
        let mut providers: BTreeSet<String> = BTreeSet::new();
        let mut tags: BTreeSet<&str> = BTreeSet::new();
        for record in self.records.values() {
            for provider in record.providers.split(',') {
                if !provider.is_empty() {
                    providers.insert(provider.to_string());
                }
            }
            for tag in &record.tags {
                tags.insert(tag);
            }
        }
        IndexStats {
            total: self.records.len(),
            provider_count: providers.len(),
            providers: providers.into_iter().collect(),
            tag_count: tags.len(),
        }
    }
}
