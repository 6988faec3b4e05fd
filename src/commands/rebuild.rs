//! # Rebuild Command Implementation
//!
//! Reconstructs the index from the persisted summary corpus. Because the
//! index is a derived cache, this is always safe: every summary file that
//! deserializes is re-added, corrupt or foreign files are skipped, and
//! the result is saved as a whole-file rewrite.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use tf_module_index::defaults::DEFAULT_STORAGE_DIR;
use tf_module_index::index::ModuleIndex;
use tf_module_index::output::{emoji, OutputConfig};

/// Arguments for the rebuild command
#[derive(Args, Debug)]
pub struct RebuildArgs {
    /// Storage directory holding the summaries and the index file
    #[arg(
        long,
        value_name = "DIR",
        env = "TF_MODULE_INDEX_STORAGE",
        default_value = DEFAULT_STORAGE_DIR
    )]
    pub storage: PathBuf,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the `rebuild` command.
pub fn execute(args: RebuildArgs, output: &OutputConfig) -> Result<()> {
    let mut index = ModuleIndex::open(&args.storage)?;
    let count = index.rebuild()?;

    if !args.quiet {
        println!(
            "{} Rebuilt index with {} records in {}",
            emoji(output, "🔄", "[REBUILD]"),
            count,
            args.storage.display()
        );
    }
    Ok(())
}
