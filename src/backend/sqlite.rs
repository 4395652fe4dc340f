//! SQLite-backed table.
//!
//! One store maps to one table named after the store, two TEXT columns.
//! The key column carries a PRIMARY KEY constraint so `put` is a true
//! upsert; duplicate rows for one key cannot exist.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};

use super::TableBackend;
use crate::config::validate_store_name;
use crate::error::{Error, Result};

/// SQL text for one store's table, built once at open.
///
/// The table identifier is interpolated rather than bound (SQLite cannot
/// parameterize identifiers); `validate_store_name` restricts it to
/// `[A-Za-z_][A-Za-z0-9_]*` beforehand.
struct Statements {
    insert: String,
    select: String,
    delete: String,
    keys: String,
    values: String,
    entries: String,
    count: String,
    clear: String,
}

impl Statements {
    fn new(table: &str) -> Self {
        Self {
            insert: format!(
                "INSERT INTO \"{table}\" (key, value) VALUES (?1, ?2) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value"
            ),
            select: format!("SELECT value FROM \"{table}\" WHERE key = ?1"),
            delete: format!("DELETE FROM \"{table}\" WHERE key = ?1"),
            keys: format!("SELECT key FROM \"{table}\" LIMIT ?1"),
            values: format!("SELECT value FROM \"{table}\" LIMIT ?1"),
            entries: format!("SELECT key, value FROM \"{table}\" LIMIT ?1"),
            count: format!("SELECT COUNT(*) FROM \"{table}\""),
            clear: format!("DELETE FROM \"{table}\""),
        }
    }
}

/// Durable (or `:memory:`) backing table on SQLite.
///
/// The connection sits behind a mutex: rusqlite connections are `Send`
/// but not `Sync`, and the store's operations are synchronous end-to-end
/// anyway.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
    statements: Statements,
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteBackend {
    /// Opens or creates the database file at `path` with a table named
    /// after the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid store name and
    /// [`Error::Storage`] if the file cannot be opened or the table
    /// cannot be created.
    pub fn open(name: &str, path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| Error::storage(format!("open database {}", path.display()), e))?;
        Self::with_connection(conn, name, Some(path.to_path_buf()))
    }

    /// Creates a process-lifetime table with no durable artifact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid store name and
    /// [`Error::Storage`] if the in-memory database cannot be created.
    pub fn in_memory(name: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::storage("open in-memory database", e))?;
        Self::with_connection(conn, name, None)
    }

    fn with_connection(conn: Connection, name: &str, path: Option<PathBuf>) -> Result<Self> {
        validate_store_name(name)?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS \"{name}\" (key TEXT PRIMARY KEY, value TEXT NOT NULL)"
        ))
        .map_err(|e| Error::storage(format!("create table '{name}'"), e))?;

        Ok(Self {
            conn: Mutex::new(conn),
            path,
            statements: Statements::new(name),
        })
    }

    /// Path of the durable artifact, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn scan_column(&self, sql: &str, limit: usize) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(sql)
            .map_err(|e| Error::storage("prepare scan", e))?;
        let rows = stmt
            .query_map([limit as i64], |row| row.get::<_, String>(0))
            .map_err(|e| Error::storage("scan rows", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::storage("scan rows", e))
    }
}

impl TableBackend for SqliteBackend {
    fn put(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(&self.statements.insert)
            .map_err(|e| Error::storage("prepare insert", e))?;
        stmt.execute([key, value])
            .map_err(|e| Error::storage(format!("insert key '{key}'"), e))?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(&self.statements.select)
            .map_err(|e| Error::storage("prepare select", e))?;
        stmt.query_row([key], |row| row.get::<_, String>(0))
            .optional()
            .map_err(|e| Error::storage(format!("read key '{key}'"), e))
    }

    fn delete(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(&self.statements.delete)
            .map_err(|e| Error::storage("prepare delete", e))?;
        stmt.execute([key])
            .map_err(|e| Error::storage(format!("delete key '{key}'"), e))?;
        Ok(())
    }

    fn scan_keys(&self, limit: usize) -> Result<Vec<String>> {
        self.scan_column(&self.statements.keys, limit)
    }

    fn scan_values(&self, limit: usize) -> Result<Vec<String>> {
        self.scan_column(&self.statements.values, limit)
    }

    fn scan_entries(&self, limit: usize) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(&self.statements.entries)
            .map_err(|e| Error::storage("prepare scan", e))?;
        let rows = stmt
            .query_map([limit as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| Error::storage("scan entries", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::storage("scan entries", e))
    }

    fn len(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row(&self.statements.count, [], |row| row.get(0))
            .map_err(|e| Error::storage("count rows", e))?;
        Ok(count as usize)
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(&self.statements.clear, [])
            .map_err(|e| Error::storage("clear table", e))?;
        Ok(())
    }

    fn destroy(self: Box<Self>, delete_file: bool) -> Result<()> {
        let this = *self;
        let conn = this.conn.into_inner();
        conn.close()
            .map_err(|(_, e)| Error::storage("close database", e))?;

        if delete_file && let Some(path) = this.path {
            std::fs::remove_file(&path)
                .map_err(|e| Error::io(format!("remove database file {}", path.display()), e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_backend(tmp: &TempDir) -> SqliteBackend {
        SqliteBackend::open("test_store", &tmp.path().join("test.db")).unwrap()
    }

    #[test]
    fn put_get_round_trip() {
        let tmp = TempDir::new().unwrap();
        let backend = open_backend(&tmp);

        backend.put("k1", "v1").unwrap();
        assert_eq!(backend.get("k1").unwrap(), Some("v1".to_string()));
        assert_eq!(backend.get("missing").unwrap(), None);
    }

    #[test]
    fn put_is_an_upsert() {
        let tmp = TempDir::new().unwrap();
        let backend = open_backend(&tmp);

        backend.put("k1", "v1").unwrap();
        backend.put("k1", "v2").unwrap();

        assert_eq!(backend.get("k1").unwrap(), Some("v2".to_string()));
        assert_eq!(backend.len().unwrap(), 1);
    }

    #[test]
    fn delete_removes_row() {
        let tmp = TempDir::new().unwrap();
        let backend = open_backend(&tmp);

        backend.put("k1", "v1").unwrap();
        backend.delete("k1").unwrap();
        assert_eq!(backend.get("k1").unwrap(), None);

        // Deleting a missing key is not an error.
        backend.delete("k1").unwrap();
    }

    #[test]
    fn scans_respect_limit() {
        let tmp = TempDir::new().unwrap();
        let backend = open_backend(&tmp);

        for i in 0..5 {
            backend.put(&format!("k{i}"), &format!("v{i}")).unwrap();
        }

        assert_eq!(backend.scan_keys(2).unwrap().len(), 2);
        assert_eq!(backend.scan_values(3).unwrap().len(), 3);
        assert_eq!(backend.scan_entries(100).unwrap().len(), 5);

        let entries = backend.scan_entries(100).unwrap();
        assert!(entries.contains(&("k0".to_string(), "v0".to_string())));
    }

    #[test]
    fn exists_without_fetch() {
        let tmp = TempDir::new().unwrap();
        let backend = open_backend(&tmp);

        assert!(!backend.exists("k1").unwrap());
        backend.put("k1", "v1").unwrap();
        assert!(backend.exists("k1").unwrap());
    }

    #[test]
    fn clear_empties_table() {
        let tmp = TempDir::new().unwrap();
        let backend = open_backend(&tmp);

        backend.put("k1", "v1").unwrap();
        backend.put("k2", "v2").unwrap();
        backend.clear().unwrap();

        assert_eq!(backend.len().unwrap(), 0);
        assert_eq!(backend.get("k1").unwrap(), None);
    }

    #[test]
    fn in_memory_has_no_path() {
        let backend = SqliteBackend::in_memory("mem_store").unwrap();
        assert!(backend.path().is_none());

        backend.put("k", "v").unwrap();
        assert_eq!(backend.get("k").unwrap(), Some("v".to_string()));

        // delete_file is a no-op without a durable artifact.
        Box::new(backend).destroy(true).unwrap();
    }

    #[test]
    fn destroy_can_remove_file() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("gone.db");

        let backend = SqliteBackend::open("doomed", &db_path).unwrap();
        backend.put("k", "v").unwrap();
        assert!(db_path.exists());

        Box::new(backend).destroy(true).unwrap();
        assert!(!db_path.exists());
    }

    #[test]
    fn destroy_keeps_file_by_default() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("kept.db");

        let backend = SqliteBackend::open("kept", &db_path).unwrap();
        backend.put("k", "v").unwrap();
        Box::new(backend).destroy(false).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn rejects_invalid_table_name() {
        let tmp = TempDir::new().unwrap();
        let err = SqliteBackend::open("bad name", &tmp.path().join("x.db")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn persists_across_reopen() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("persist.db");

        {
            let backend = SqliteBackend::open("persist", &db_path).unwrap();
            backend.put("k", "v").unwrap();
        }
        {
            let backend = SqliteBackend::open("persist", &db_path).unwrap();
            assert_eq!(backend.get("k").unwrap(), Some("v".to_string()));
        }
    }
}
