//! # Error Handling
//!
//! Centralized error type for the indexing pipeline, built on `thiserror`.
//! Each variant carries enough context (repository URL, git command,
//! offending file) for the failure to be reported without a backtrace.
//!
//! Most failures in this crate are deliberately *not* errors: a malformed
//! `.tf` file, a revision whose sub-path is missing, or a corrupt summary
//! file in the corpus are logged and skipped so the rest of the job list
//! keeps processing. The variants below cover the failures that do
//! propagate: configuration problems, git plumbing failures, and index
//! file I/O.

use thiserror::Error;

/// Main error type for indexing operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing the job-list configuration file.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An error occurred while cloning a repository.
    #[error("Git clone error for {url}: {message}")]
    GitClone { url: String, message: String },

    /// A git command run against an existing working copy failed.
    #[error("Git command failed in {context}: git {command} - {stderr}")]
    GitCommand {
        command: String,
        context: String,
        stderr: String,
    },

    /// The persistent index could not be loaded or saved.
    #[error("Index error: {message}")]
    Index { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
