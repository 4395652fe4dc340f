//! Embedded typed key-value store with a read-promotion cache.
//!
//! `hotkv` persists `serde`-representable keys and values in a SQLite
//! table, one table per named store, and promotes entries into an
//! in-memory cache once they have been read a configurable number of
//! times. Reads check the cache first; writes and deletes keep cache and
//! table consistent.
//!
//! # Example
//!
//! ```ignore
//! use hotkv::{Store, StoreOptions};
//!
//! // Promote a value into memory after 3 reads.
//! let store: Store<u64, String> =
//!     Store::open("users", StoreOptions::new().promotion_threshold(3))?;
//!
//! store.set(&1, &"alice".to_string())?
//!      .set(&2, &"bob".to_string())?;
//! assert_eq!(store.get(&1)?, Some("alice".to_string()));
//!
//! store.destroy(false)?;
//! ```
//!
//! # Custom Backends
//!
//! The backing table is a trait; implement [`TableBackend`] to persist
//! somewhere other than SQLite:
//!
//! ```ignore
//! use hotkv::{Store, StoreOptions, TableBackend};
//!
//! struct RedisTable { /* ... */ }
//! impl TableBackend for RedisTable { /* ... */ }
//!
//! let store: Store<String, String> =
//!     Store::with_backend("sessions", RedisTable::new(), StoreOptions::new())?;
//! ```

#![deny(unsafe_code)]

pub mod backend;
pub mod cache;
pub mod codec;
mod config;
mod error;
pub mod paths;
mod store;


pub use backend::{SqliteBackend, TableBackend};
pub use cache::{BoundedCache, PromotionCache, UnboundedCache};
pub use config::{CachePolicy, StoreOptions};
pub use error::{Error, Result};
pub use store::{DEFAULT_SCAN_LIMIT, Store};
