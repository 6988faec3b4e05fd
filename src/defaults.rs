//! Default values for indexer configuration.
//!
//! Centralized so the CLI commands and the config parser agree on
//! filenames and directories.

use std::path::PathBuf;

/// Name of the job-list configuration file looked up in the current
/// directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILENAME: &str = ".tf-module-index.yaml";

/// Default storage directory for persisted summaries and the index file,
/// relative to the current directory.
pub const DEFAULT_STORAGE_DIR: &str = "modules";

/// Returns the default root directory for repository working copies.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/tf-module-index` (XDG Base Directory)
/// - macOS: `~/Library/Caches/tf-module-index`
/// - Windows: `{FOLDERID_LocalAppData}\tf-module-index`
///
/// Falls back to `.tf-module-index-cache` in the current directory if the
/// platform cache directory cannot be determined.
pub fn default_workdir_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".tf-module-index-cache"))
        .join("tf-module-index")
}
