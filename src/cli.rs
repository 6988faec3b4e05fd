//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use tf_module_index::output::OutputConfig;

use crate::commands;

/// Terraform Module Index - ingest and query Terraform module summaries
#[derive(Parser, Debug)]
#[command(name = "tf-module-index")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the ingestion pipeline over the job-list configuration
    Index(commands::index::IndexArgs),
    /// Rebuild the index from the persisted summary corpus
    Rebuild(commands::rebuild::RebuildArgs),
    /// List indexed repositories
    List(commands::list::ListArgs),
    /// Search module summaries
    Search(commands::search::SearchArgs),
    /// Show one module summary by repository, revision, and path
    Get(commands::get::GetArgs),
    /// Show index statistics
    Stats(commands::stats::StatsArgs),
    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Index(args) => commands::index::execute(args, &output),
            Commands::Rebuild(args) => commands::rebuild::execute(args, &output),
            Commands::List(args) => commands::list::execute(args),
            Commands::Search(args) => commands::search::execute(args),
            Commands::Get(args) => commands::get::execute(args),
            Commands::Stats(args) => commands::stats::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

fn init_logging(level: &str) {
    let filter = level
        .parse::<log::LevelFilter>()
        .unwrap_or(log::LevelFilter::Warn);
    let _ = env_logger::Builder::new().filter_level(filter).try_init();
}
