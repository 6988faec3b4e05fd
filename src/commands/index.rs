//! # Index Command Implementation
//!
//! Runs the full ingestion pipeline: acquire every configured repository,
//! summarize its selected revisions, persist the summaries, and register
//! them in the index. Partial success is normal: failing jobs are
//! reported and the rest of the job list still runs.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Args;

use tf_module_index::config;
use tf_module_index::defaults::DEFAULT_CONFIG_FILENAME;
use tf_module_index::output::{emoji, OutputConfig};
use tf_module_index::pipeline;

/// Arguments for the index command
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Path to the job-list configuration file
    #[arg(short, long, value_name = "PATH", env = "TF_MODULE_INDEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the storage directory from the configuration
    #[arg(long, value_name = "DIR", env = "TF_MODULE_INDEX_STORAGE")]
    pub storage: Option<PathBuf>,

    /// Override the working-copy root from the configuration
    #[arg(long, value_name = "DIR", env = "TF_MODULE_INDEX_WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the `index` command.
pub fn execute(args: IndexArgs, output: &OutputConfig) -> Result<()> {
    let start_time = Instant::now();

    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));
    if !config_path.exists() {
        anyhow::bail!("Configuration file not found: {}", config_path.display());
    }

    let mut config = config::from_file(&config_path)?;
    if let Some(storage) = args.storage {
        config.storage_dir = storage;
    }
    if let Some(workdir) = args.workdir {
        config.workdir = Some(workdir);
    }

    if !args.quiet {
        println!(
            "{} Indexing {} repositories into {}",
            emoji(output, "📦", "[INDEX]"),
            config.repos.len(),
            config.storage_dir.display()
        );
    }

    let report = pipeline::run(&config)?;
    let duration = start_time.elapsed();

    if !args.quiet {
        println!(
            "{} {} summaries stored from {} jobs in {:.2}s",
            emoji(output, "✅", "[DONE]"),
            report.summaries_stored,
            report.jobs_processed,
            duration.as_secs_f64()
        );
        for url in &report.jobs_failed {
            println!("{} failed: {}", emoji(output, "⚠️", "[WARN]"), url);
        }
    }

    Ok(())
}
