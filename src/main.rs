//! # Terraform Module Index CLI
//!
//! This is the binary entry point for the `tf-module-index` command-line
//! tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Handling top-level application errors and translating them into
//!   user-friendly output.
//!
//! The core pipeline logic lives in the `tf_module_index` library crate,
//! keeping the binary a thin wrapper around reusable functionality.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
