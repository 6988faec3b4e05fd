//! # Module Summary Data Model
//!
//! The types in this module form the canonical unit of the pipeline: a
//! [`ModuleSummary`] describes one Terraform module at one repository
//! revision. Summaries are assembled once, persisted as JSON, and never
//! mutated afterwards; the (repository, revision, path) triple is the
//! natural key under which the index stores them.
//!
//! Heterogeneous HCL values (variable defaults can be scalars, lists, or
//! maps) are represented by the [`TfValue`] tagged union so that consumers
//! can pattern-match exhaustively instead of poking at an untyped value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sentinel for a module that lives at the repository root.
pub const ROOT_MODULE_PATH: &str = ".";

/// A Terraform configuration value of unknown shape.
///
/// Mirrors the JSON data model: variable defaults and other attribute
/// values are scalars, sequences, or mappings, and absence is expressed
/// with `Option<TfValue>` at the field that holds the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TfValue {
    /// An explicit `null` literal.
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<TfValue>),
    Map(BTreeMap<String, TfValue>),
}

/// One `variable` block of a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleVariable {
    /// Variable name, unique within one module.
    pub name: String,
    /// Declared type expression, verbatim (free-form, not validated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value, if the variable declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<TfValue>,
    /// Derived: a variable is required exactly when it has no default.
    pub required: bool,
}

impl ModuleVariable {
    /// Build a variable, deriving `required` from the absence of a
    /// default. An explicit `default = null` still counts as a default.
    pub fn new(
        name: impl Into<String>,
        r#type: Option<String>,
        description: Option<String>,
        default: Option<TfValue>,
    ) -> Self {
        let required = default.is_none();
        Self {
            name: name.into(),
            r#type,
            description,
            default,
            required,
        }
    }
}

/// One `output` block of a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleOutput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The output's value expression as raw source text, never evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub sensitive: bool,
}

/// A provider the module requires or configures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRequirement {
    pub name: String,
    /// Registry source address (e.g. `hashicorp/aws`), when declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A `module` call site referencing another module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubModuleReference {
    /// The call-site identifier (the block label).
    pub name: String,
    /// Path or registry address of the referenced module.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A `resource` block managed by the module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedResource {
    pub r#type: String,
    pub name: String,
    /// Reserved for future enrichment; the parser never fills this in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The complete summary of one module at one revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSummary {
    /// Repository locator (clone URL), verbatim from the job list.
    pub repository: String,
    /// Branch or tag name, verbatim.
    pub revision: String,
    /// Sub-path of the module within the repository;
    /// [`ROOT_MODULE_PATH`] when the module lives at the root.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub variables: Vec<ModuleVariable>,
    #[serde(default)]
    pub outputs: Vec<ModuleOutput>,
    #[serde(default)]
    pub providers: Vec<ProviderRequirement>,
    #[serde(default)]
    pub submodules: Vec<SubModuleReference>,
    #[serde(default)]
    pub resources: Vec<ManagedResource>,
    /// Full documentation file contents, when one was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
}

impl ModuleSummary {
    /// Whether this summary describes the repository root module.
    pub fn is_root(&self) -> bool {
        self.path == ROOT_MODULE_PATH
    }

    /// File name under which this summary is persisted.
    ///
    /// `{repo-basename}_{revision}.json`, extended with `_{path}` for
    /// non-root modules; `/` in revisions and `/` or `\` in paths become
    /// `_` so the name is filesystem-safe. The same scheme is decoded by
    /// the resource-retrieval collaborator, so it must stay stable.
    pub fn storage_file_name(&self) -> String {
        let repo = repo_base_name(&self.repository);
        let revision = self.revision.replace('/', "_");
        if self.is_root() {
            format!("{}_{}.json", repo, revision)
        } else {
            let path = self.path.replace(['/', '\\'], "_");
            format!("{}_{}_{}.json", repo, revision, path)
        }
    }
}

/// Derive the short repository name from a locator: the last path
/// segment with any trailing `.git` stripped. Handles both URL-style
/// (`https://host/org/repo.git`) and scp-style (`git@host:org/repo.git`)
/// locators.
pub fn repo_base_name(repository: &str) -> String {
    let trimmed = repository.trim_end_matches('/');
    let base = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    base.strip_suffix(".git").unwrap_or(base).to_string()
}

/// Normalize a configured sub-path to the canonical form used in the
/// natural key: `None`, the empty string, `"."`, and `"/"` all denote
/// the repository root; everything else is kept with surrounding
/// slashes trimmed.
pub fn normalize_module_path(path: Option<&str>) -> String {
    match path {
        None => ROOT_MODULE_PATH.to_string(),
        Some(raw) => {
            let trimmed = raw.trim().trim_matches('/');
            if trimmed.is_empty() || trimmed == ROOT_MODULE_PATH {
                ROOT_MODULE_PATH.to_string()
            } else {
                trimmed.to_string()
            }
        }
    }
}
