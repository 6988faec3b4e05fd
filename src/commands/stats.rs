//! # Stats Command Implementation
//!
//! Prints aggregate statistics from the persistent index: total record
//! count, distinct providers, and distinct tags.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use tf_module_index::defaults::DEFAULT_STORAGE_DIR;
use tf_module_index::index::ModuleIndex;

/// Arguments for the stats command
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Storage directory holding the summaries and the index file
    #[arg(
        long,
        value_name = "DIR",
        env = "TF_MODULE_INDEX_STORAGE",
        default_value = DEFAULT_STORAGE_DIR
    )]
    pub storage: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Execute the `stats` command.
pub fn execute(args: StatsArgs) -> Result<()> {
    let index = ModuleIndex::open(&args.storage)?;
    let stats = index.stats();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Indexed modules: {}", stats.total);
    println!("Distinct providers: {}", stats.provider_count);
    if !stats.providers.is_empty() {
        println!("  {}", stats.providers.join(", "));
    }
    println!("Distinct tags: {}", stats.tag_count);
    Ok(())
}
