//! # List Command Implementation
//!
//! Lists the repositories present in the persisted corpus, aggregated
//! across revisions: module count, revisions seen, and the union of
//! provider names. Supports a keyword filter and a result cap, plus
//! `--json` for machine consumption.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use tf_module_index::defaults::DEFAULT_STORAGE_DIR;
use tf_module_index::query::QueryService;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive keyword filter against repository and description
    #[arg(value_name = "KEYWORD")]
    pub keyword: Option<String>,

    /// Storage directory holding the summaries and the index file
    #[arg(
        long,
        value_name = "DIR",
        env = "TF_MODULE_INDEX_STORAGE",
        default_value = DEFAULT_STORAGE_DIR
    )]
    pub storage: PathBuf,

    /// Maximum number of repositories to show
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Execute the `list` command.
pub fn execute(args: ListArgs) -> Result<()> {
    let service = QueryService::new(&args.storage);
    let overviews = service.list_repositories(args.keyword.as_deref(), args.limit);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&overviews)?);
        return Ok(());
    }

    if overviews.is_empty() {
        println!("No repositories indexed.");
        return Ok(());
    }

    for overview in &overviews {
        println!(
            "{}  ({} modules, {} revisions)",
            overview.repository,
            overview.module_count,
            overview.revisions.len()
        );
        if !overview.providers.is_empty() {
            println!("    providers: {}", overview.providers.join(", "));
        }
    }
    Ok(())
}
