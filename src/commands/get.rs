//! # Get Command Implementation
//!
//! Exact natural-key lookup of one module summary. The documentation
//! blob is omitted unless `--readme` is passed; `--json` prints the full
//! record for machine consumption.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use tf_module_index::defaults::DEFAULT_STORAGE_DIR;
use tf_module_index::query::QueryService;
use tf_module_index::summary::ROOT_MODULE_PATH;

/// Arguments for the get command
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Repository locator
    #[arg(value_name = "REPOSITORY")]
    pub repository: String,

    /// Branch or tag name
    #[arg(value_name = "REVISION")]
    pub revision: String,

    /// Sub-path of the module within the repository
    #[arg(value_name = "PATH", default_value = ROOT_MODULE_PATH)]
    pub path: String,

    /// Storage directory holding the summaries and the index file
    #[arg(
        long,
        value_name = "DIR",
        env = "TF_MODULE_INDEX_STORAGE",
        default_value = DEFAULT_STORAGE_DIR
    )]
    pub storage: PathBuf,

    /// Include the documentation text in the result
    #[arg(long)]
    pub readme: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Execute the `get` command.
pub fn execute(args: GetArgs) -> Result<()> {
    let service = QueryService::new(&args.storage);
    let Some(summary) =
        service.get_module(&args.repository, &args.revision, &args.path, args.readme)
    else {
        anyhow::bail!(
            "No module found for {}@{} at path '{}'",
            args.repository,
            args.revision,
            args.path
        );
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}@{} ({})", summary.repository, summary.revision, summary.path);
    if let Some(description) = &summary.description {
        println!("  {}", description);
    }
    println!(
        "  {} variables, {} outputs, {} resources, {} sub-modules",
        summary.variables.len(),
        summary.outputs.len(),
        summary.resources.len(),
        summary.submodules.len()
    );
    for provider in &summary.providers {
        match (&provider.source, &provider.version) {
            (Some(source), Some(version)) => {
                println!("  provider {} ({}, {})", provider.name, source, version)
            }
            (Some(source), None) => println!("  provider {} ({})", provider.name, source),
            (None, Some(version)) => println!("  provider {} ({})", provider.name, version),
            (None, None) => println!("  provider {}", provider.name),
        }
    }
    if let Some(readme) = &summary.readme {
        println!("\n{}", readme);
    }
    Ok(())
}
