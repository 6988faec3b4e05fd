//! # Search Command Implementation
//!
//! Full-corpus module search. The query is matched case-insensitively
//! against descriptions, documentation, variable and output names and
//! descriptions, and provider names and sources; an empty (omitted)
//! query matches every module, which combined with `--repo` answers
//! "all modules of repository X".

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use tf_module_index::defaults::DEFAULT_STORAGE_DIR;
use tf_module_index::query::QueryService;

/// Arguments for the search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query; omit to match every module
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Storage directory holding the summaries and the index file
    #[arg(
        long,
        value_name = "DIR",
        env = "TF_MODULE_INDEX_STORAGE",
        default_value = DEFAULT_STORAGE_DIR
    )]
    pub storage: PathBuf,

    /// Restrict results to these repository locators (repeatable)
    #[arg(long = "repo", value_name = "URL")]
    pub repositories: Vec<String>,

    /// Restrict results to modules using a provider whose name or source
    /// contains this substring
    #[arg(long, value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Execute the `search` command.
pub fn execute(args: SearchArgs) -> Result<()> {
    let service = QueryService::new(&args.storage);
    let repositories = if args.repositories.is_empty() {
        None
    } else {
        Some(args.repositories.as_slice())
    };
    let results = service.search_modules(
        args.query.as_deref().unwrap_or(""),
        repositories,
        args.provider.as_deref(),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No modules matched.");
        return Ok(());
    }

    for summary in &results {
        let location = if summary.is_root() {
            String::new()
        } else {
            format!(" ({})", summary.path)
        };
        println!("{}@{}{}", summary.repository, summary.revision, location);
        if let Some(description) = &summary.description {
            println!("    {}", description);
        }
    }
    println!("{} modules matched.", results.len());
    Ok(())
}
