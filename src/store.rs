//! The typed store facade.
//!
//! [`Store`] orchestrates the codec, the backing table, the reference
//! tracker, and the promotion cache behind get/set/delete/scan
//! operations. Values are persisted only in encoded form; decoding
//! happens at the point of return.

use std::marker::PhantomData;
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::backend::{SqliteBackend, TableBackend};
use crate::cache::{self, RefTracker};
use crate::codec;
use crate::config::{StoreOptions, validate_store_name};
use crate::error::{Error, Result};
use crate::paths;

/// Conventional scan bound for `keys`/`values`/`entries`.
pub const DEFAULT_SCAN_LIMIT: usize = 100;

/// Tracker and cache share one lock: the read path's
/// increment-compare-promote sequence must be a single critical section,
/// and delete must clear both without another operation observing the
/// key half-removed.
struct HotState {
    tracker: RefTracker,
    cache: Box<dyn cache::PromotionCache>,
}

/// Typed key-value store over a durable backing table, with an
/// in-memory cache for entries read often enough to cross the
/// configured promotion threshold.
///
/// Keys and values can be any `serde`-representable types. A store
/// instance is the single logical owner of its backing table; open the
/// same name at the same location from one place only.
///
/// All operations are synchronous. The store is `Send + Sync` — internal
/// locks serialize operations, so sharing one instance behind an `Arc`
/// is safe, though reads on the same store contend for a single lock.
///
/// # Example
///
/// ```ignore
/// use hotkv::{Store, StoreOptions};
///
/// let store: Store<String, Vec<u32>> =
///     Store::open("metrics", StoreOptions::new().promotion_threshold(3))?;
/// store.set(&"cpu".into(), &vec![97, 80, 85])?;
/// let samples = store.get(&"cpu".into())?;
/// store.destroy(false)?;
/// ```
pub struct Store<K, V> {
    name: String,
    backend: Box<dyn TableBackend>,
    threshold: Option<u32>,
    state: Mutex<HotState>,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> std::fmt::Debug for Store<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.name)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl<K, V> Store<K, V>
where
    K: Serialize + DeserializeOwned,
    V: Serialize + DeserializeOwned,
{
    /// Opens (or creates) the store `name` with the given options.
    ///
    /// For durable stores this provisions the storage directory and the
    /// database file; in-memory stores create neither. Construction
    /// either returns a fully usable store or fails — there is no
    /// partially-initialized state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid name or threshold,
    /// [`Error::Io`] if the storage directory cannot be created, and
    /// [`Error::Storage`] if the database cannot be opened.
    pub fn open(name: &str, options: StoreOptions) -> Result<Self> {
        validate_store_name(name)?;

        let backend: Box<dyn TableBackend> = if options.in_memory {
            Box::new(SqliteBackend::in_memory(name)?)
        } else {
            let dir: PathBuf = match &options.storage_dir {
                Some(dir) => dir.clone(),
                None => paths::data_dir()?,
            };
            std::fs::create_dir_all(&dir).map_err(|e| {
                Error::io(format!("create storage directory {}", dir.display()), e)
            })?;
            Box::new(SqliteBackend::open(name, &paths::database_path(&dir, name))?)
        };

        Self::assemble(name, backend, options)
    }

    /// Opens the store `name` over a custom backing table.
    ///
    /// The caller is responsible for whatever provisioning the backend
    /// needs; `storage_dir` and `in_memory` options are ignored here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid name or threshold.
    pub fn with_backend(
        name: &str,
        backend: impl TableBackend,
        options: StoreOptions,
    ) -> Result<Self> {
        validate_store_name(name)?;
        Self::assemble(name, Box::new(backend), options)
    }

    fn assemble(name: &str, backend: Box<dyn TableBackend>, options: StoreOptions) -> Result<Self> {
        let threshold = options.validated_threshold()?;
        debug!(
            store = name,
            in_memory = options.in_memory,
            ?threshold,
            "opened store"
        );
        Ok(Self {
            name: name.to_string(),
            backend,
            threshold,
            state: Mutex::new(HotState {
                tracker: RefTracker::default(),
                cache: cache::build_cache(options.cache_policy),
            }),
            _marker: PhantomData,
        })
    }

    /// Name of the store (also the backing table identifier).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetches the value for `key`.
    ///
    /// Promoted entries are served from memory without touching the
    /// backing table or the read counters. A table hit counts one read
    /// toward promotion when a threshold is configured; reaching it
    /// copies the encoded value into the cache. `Ok(None)` means the
    /// key is absent — not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`]/[`Error::Decode`] on codec failure and
    /// [`Error::Storage`] if the table read fails.
    pub fn get(&self, key: &K) -> Result<Option<V>> {
        let k = codec::encode(key)?;
        let mut state = self.state.lock();

        if let Some(hit) = state.cache.lookup(&k) {
            trace!(store = %self.name, "cache hit");
            return codec::decode(hit).map(Some);
        }

        let Some(raw) = self.backend.get(&k)? else {
            trace!(store = %self.name, "miss");
            return Ok(None);
        };
        let value = codec::decode(&raw)?;

        if let Some(threshold) = self.threshold {
            let count = state.tracker.increment(&k);
            if count >= threshold {
                debug!(store = %self.name, reads = count, "promoting entry");
                state.tracker.reset(&k);
                state.cache.insert(k, raw);
            }
        }
        Ok(Some(value))
    }

    /// Writes `value` under `key`, replacing any existing value.
    ///
    /// Writes go to the backing table only: they neither populate the
    /// promotion cache nor reset read counters, so an already-promoted
    /// key keeps serving its cached value until deleted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] on codec failure and [`Error::Storage`]
    /// if the write fails.
    pub fn set(&self, key: &K, value: &V) -> Result<&Self> {
        let k = codec::encode(key)?;
        let v = codec::encode(value)?;
        trace!(store = %self.name, "set");
        self.backend.put(&k, &v)?;
        Ok(self)
    }

    /// Removes `key` from the backing table, the promotion cache, and
    /// the read counters. Callers never observe a partially-deleted key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] on codec failure and [`Error::Storage`]
    /// if the table delete fails (in which case cache and counters are
    /// left untouched).
    pub fn delete(&self, key: &K) -> Result<&Self> {
        let k = codec::encode(key)?;
        let mut state = self.state.lock();
        self.backend.delete(&k)?;
        state.cache.remove(&k);
        state.tracker.reset(&k);
        trace!(store = %self.name, "deleted");
        Ok(self)
    }

    /// Checks whether `key` is present without decoding its value.
    /// Does not count as a read toward promotion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] on codec failure and [`Error::Storage`]
    /// if the table read fails.
    pub fn exists(&self, key: &K) -> Result<bool> {
        let k = codec::encode(key)?;
        if self.state.lock().cache.lookup(&k).is_some() {
            return Ok(true);
        }
        self.backend.exists(&k)
    }

    /// Up to `limit` keys, decoded, in table order. Always read from
    /// the backing table — the promotion cache is not consulted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] on codec failure and [`Error::Storage`]
    /// if the scan fails.
    pub fn keys(&self, limit: usize) -> Result<Vec<K>> {
        self.backend
            .scan_keys(limit)?
            .iter()
            .map(|k| codec::decode(k))
            .collect()
    }

    /// Up to `limit` values, decoded, in table order. Always read from
    /// the backing table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] on codec failure and [`Error::Storage`]
    /// if the scan fails.
    pub fn values(&self, limit: usize) -> Result<Vec<V>> {
        self.backend
            .scan_values(limit)?
            .iter()
            .map(|v| codec::decode(v))
            .collect()
    }

    /// Up to `limit` (key, value) pairs, decoded, in table order.
    /// Always read from the backing table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] on codec failure and [`Error::Storage`]
    /// if the scan fails.
    pub fn entries(&self, limit: usize) -> Result<Vec<(K, V)>> {
        self.backend
            .scan_entries(limit)?
            .iter()
            .map(|(k, v)| Ok((codec::decode(k)?, codec::decode(v)?)))
            .collect()
    }

    /// Number of entries in the backing table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the count fails.
    pub fn len(&self) -> Result<usize> {
        self.backend.len()
    }

    /// True if the backing table holds no entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the count fails.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Number of entries currently promoted into memory.
    pub fn cached_len(&self) -> usize {
        self.state.lock().cache.len()
    }

    /// Removes every entry and resets all promotion state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the table delete fails (promotion
    /// state is left untouched in that case).
    pub fn clear(&self) -> Result<&Self> {
        let mut state = self.state.lock();
        self.backend.clear()?;
        state.cache.clear();
        state.tracker.clear();
        debug!(store = %self.name, "cleared store");
        Ok(self)
    }

    /// Releases the store, optionally deleting the database file.
    ///
    /// Consumes the store; further use is a compile error rather than
    /// undefined behavior. In-memory stores have no file to delete.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if closing the database fails and
    /// [`Error::Io`] if the file cannot be removed.
    pub fn destroy(self, delete_file: bool) -> Result<()> {
        debug!(store = %self.name, delete_file, "destroying store");
        self.backend.destroy(delete_file)
    }
}
