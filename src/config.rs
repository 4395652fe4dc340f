//! Store configuration.
//!
//! [`StoreOptions`] controls promotion behavior, storage location, and
//! durability for a single store instance. All options have defaults
//! suitable for local development: no promotion, `~/.hotkv/` as the
//! storage directory, durable on-disk database.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Eviction policy for the promotion cache.
///
/// The source behavior is an unbounded cache: once promoted, an entry
/// stays in memory until it is deleted from the store. Callers that
/// cannot afford unbounded growth can opt into an LRU bound without
/// changing any facade semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Promoted entries are only removed by explicit delete. Default.
    #[default]
    Unbounded,
    /// At most `capacity` promoted entries; least recently used entries
    /// are evicted. An evicted entry starts counting references again
    /// from zero on its next read.
    Bounded(NonZeroUsize),
}

/// Configuration for opening a [`Store`](crate::Store).
///
/// # Example
///
/// ```ignore
/// use hotkv::{Store, StoreOptions};
///
/// let options = StoreOptions::new()
///     .promotion_threshold(3)
///     .in_memory(true);
/// let store: Store<String, u64> = Store::open("sessions", options)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    pub(crate) promotion_threshold: Option<u32>,
    pub(crate) storage_dir: Option<PathBuf>,
    pub(crate) in_memory: bool,
    pub(crate) cache_policy: CachePolicy,
}

impl StoreOptions {
    /// Creates options with all defaults: promotion disabled, default
    /// storage directory, durable database, unbounded cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reads after which an entry is promoted into the
    /// in-memory cache. Must be at least 1; passing 0 is rejected when
    /// the store is opened. Leaving the option unset disables promotion
    /// entirely.
    #[must_use]
    pub fn promotion_threshold(mut self, threshold: u32) -> Self {
        self.promotion_threshold = Some(threshold);
        self
    }

    /// Directory holding the durable database file. Defaults to the
    /// conventional local directory (see [`crate::paths::data_dir`]).
    #[must_use]
    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    /// When true, the backing table lives only for the process lifetime
    /// and no file is created.
    #[must_use]
    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    /// Eviction policy for the promotion cache.
    #[must_use]
    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    /// Validates the configured threshold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an explicit threshold of 0.
    pub(crate) fn validated_threshold(&self) -> Result<Option<u32>> {
        match self.promotion_threshold {
            Some(0) => Err(Error::config(
                "promotion threshold must be at least 1 (omit the option to disable promotion)",
            )),
            other => Ok(other),
        }
    }
}

/// Validates a store name.
///
/// The name becomes the SQL table identifier and the database file stem,
/// so it is restricted to `[A-Za-z_][A-Za-z0-9_]*`. This is what keeps
/// the table-creation SQL safe from injection.
///
/// # Errors
///
/// Returns [`Error::Config`] for an empty or non-identifier name.
pub fn validate_store_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        },
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::config(format!(
            "invalid store name '{name}': names must match [A-Za-z_][A-Za-z0-9_]*"
        )))
    }
}
