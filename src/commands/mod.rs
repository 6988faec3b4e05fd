//! # CLI Command Implementations
//!
//! One module per subcommand of the `tf-module-index` command-line tool.
//! Each module defines a clap `Args` struct and an `execute` function that
//! calls into the `tf_module_index` library; the commands themselves hold
//! no pipeline logic.

pub mod completions;
pub mod get;
pub mod index;
pub mod list;
pub mod rebuild;
pub mod search;
pub mod stats;
