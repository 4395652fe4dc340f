//! Path resolution for store files.
//!
//! Every durable store lives as a single SQLite file in one directory:
//!
//! - [`data_dir`] - base directory for all store files
//! - [`database_path`] - `<dir>/<name>.db` for a specific store

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Get the base directory for store files.
///
/// Resolution order:
/// 1. `HOTKV_HOME` environment variable (if set and non-empty)
/// 2. `~/.hotkv/` (default)
///
/// CI/CD systems can override the location by setting `HOTKV_HOME`.
/// The directory is created lazily when a durable store is opened.
///
/// # Errors
///
/// Returns [`Error::Config`] if no home directory can be determined and
/// `HOTKV_HOME` is unset.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("HOTKV_HOME")
        && !home.is_empty()
    {
        return Ok(PathBuf::from(home));
    }

    let home = dirs::home_dir()
        .ok_or_else(|| Error::config("could not determine home directory; set HOTKV_HOME"))?;
    Ok(home.join(".hotkv"))
}

/// Get the database file path for a store: `<dir>/<name>.db`
pub fn database_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.db"))
}
