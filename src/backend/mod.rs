//! Backing table backends.
//!
//! The store persists encoded pairs through the [`TableBackend`] trait so
//! the durable engine stays swappable. The production implementation is
//! [`SqliteBackend`]; anything that can upsert, point-read, delete, and
//! enumerate text pairs can stand in for it (see
//! [`Store::with_backend`](crate::Store::with_backend)).

mod sqlite;

pub use sqlite::SqliteBackend;

use crate::error::Result;

/// A durable table of (encoded key, encoded value) text pairs.
///
/// Backends must be thread-safe (`Send + Sync`); the store serializes
/// calls through its own lock but the handle itself may be observed from
/// multiple threads. Scan order only needs to be stable for an
/// unmodified table.
pub trait TableBackend: Send + Sync + 'static {
    /// Upserts a pair. A second `put` with the same key replaces the
    /// stored value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`](crate::Error::Storage) if the write fails.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Point lookup by encoded key. `Ok(None)` means absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`](crate::Error::Storage) if the read fails.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Removes the row for `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`](crate::Error::Storage) if the delete fails.
    fn delete(&self, key: &str) -> Result<()>;

    /// Up to `limit` encoded keys in table order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`](crate::Error::Storage) if the scan fails.
    fn scan_keys(&self, limit: usize) -> Result<Vec<String>>;

    /// Up to `limit` encoded values in table order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`](crate::Error::Storage) if the scan fails.
    fn scan_values(&self, limit: usize) -> Result<Vec<String>>;

    /// Up to `limit` encoded pairs in table order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`](crate::Error::Storage) if the scan fails.
    fn scan_entries(&self, limit: usize) -> Result<Vec<(String, String)>>;

    /// Checks whether `key` has a row.
    ///
    /// Default implementation uses `get()`, but backends may override
    /// to skip fetching the value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`](crate::Error::Storage) if the read fails.
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Number of rows in the table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`](crate::Error::Storage) if the count fails.
    fn len(&self) -> Result<usize>;

    /// Removes every row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`](crate::Error::Storage) if the delete fails.
    fn clear(&self) -> Result<()>;

    /// Releases the backend, optionally deleting its durable artifact.
    /// For backends without one (in-memory), `delete_file` is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`](crate::Error::Storage) or
    /// [`Error::Io`](crate::Error::Io) if closing or unlinking fails.
    fn destroy(self: Box<Self>, delete_file: bool) -> Result<()>;
}
