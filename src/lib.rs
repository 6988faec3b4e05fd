//! # Terraform Module Index Library
//!
//! This library ingests git repositories containing Terraform modules,
//! summarizes each configured revision into a structured
//! [`summary::ModuleSummary`], and maintains a persistent single-file
//! index over the resulting corpus so that search tools, documentation
//! generators, and AI agents can query modules without re-parsing source
//! trees. It powers the `tf-module-index` command-line tool but can be
//! embedded in other applications.
//!
//! ## Quick Example
//!
//! ```
//! use tf_module_index::index::{module_id, ModuleIndex};
//! use tf_module_index::summary::{ModuleSummary, ROOT_MODULE_PATH};
//!
//! let dir = tempfile::TempDir::new().unwrap();
//! let mut index = ModuleIndex::open(dir.path()).unwrap();
//!
//! let summary = ModuleSummary {
//!     repository: "https://github.com/org/terraform-aws-vpc.git".to_string(),
//!     revision: "v5.0.0".to_string(),
//!     path: ROOT_MODULE_PATH.to_string(),
//!     description: None,
//!     variables: vec![],
//!     outputs: vec![],
//!     providers: vec![],
//!     submodules: vec![],
//!     resources: vec![],
//!     readme: None,
//! };
//!
//! index.store(&summary).unwrap();
//! index.save().unwrap();
//!
//! let id = module_id(&summary.repository, &summary.revision, &summary.path);
//! assert!(index.get(&id).is_some());
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: the YAML job list naming the
//!   repositories, branches, tag policy, and sub-paths to ingest.
//! - **Acquisition (`git`, `repository`)**: working-copy lifecycle and
//!   revision enumeration; branches are processed verbatim, tags
//!   semver-descending with a cap applied after ordering.
//! - **Parsing (`parser`)**: a tolerant scan of a module directory's
//!   `.tf` files into variables, outputs, providers, sub-module
//!   references, resources, and documentation.
//! - **Summaries (`summary`)**: the immutable per-revision record keyed
//!   by (repository, revision, path).
//! - **Index (`index`)**: the derived, rebuildable lookup table stored as
//!   one JSON file next to the summaries.
//! - **Queries (`query`)**: full-corpus keyword and filter search for the
//!   lookups the flat index cannot answer.
//! - **Pipeline (`pipeline`)**: sequential orchestration of the above
//!   with per-job failure containment.

pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod index;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod query;
pub mod repository;
pub mod summary;

#[cfg(test)]
mod identity_proptest;
