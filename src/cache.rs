//! Read tracking and the in-memory promotion cache.
//!
//! Two small pieces of state decide which entries are served from memory:
//!
//! - [`RefTracker`] counts, per encoded key, how many times a value has
//!   been fetched from the backing table since it was last cached or
//!   deleted.
//! - [`PromotionCache`] maps encoded keys to encoded values for entries
//!   that crossed the promotion threshold. It is consulted before the
//!   backing table on every point read.
//!
//! Both live behind the store's state lock; implementations do not need
//! their own synchronization.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::config::CachePolicy;

/// Per-key read counters.
///
/// A key is present only once it has been read at least once; absent
/// means zero. Counters are reset on delete and dropped on promotion.
#[derive(Debug, Default)]
pub(crate) struct RefTracker {
    counts: HashMap<String, u32>,
}

impl RefTracker {
    /// Records one read of `key` and returns the new count.
    pub(crate) fn increment(&mut self, key: &str) -> u32 {
        let count = self.counts.entry(key.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Forgets the counter for `key`.
    pub(crate) fn reset(&mut self, key: &str) {
        self.counts.remove(key);
    }

    /// Forgets all counters.
    pub(crate) fn clear(&mut self) {
        self.counts.clear();
    }
}

/// Map abstraction behind the promotion cache.
///
/// The store only ever calls `lookup`, `insert`, and `remove`; the policy
/// for keeping entries is the implementation's business. The default is
/// [`UnboundedCache`], matching the source behavior of never evicting.
/// `lookup` takes `&mut self` so bounded implementations can record
/// recency.
pub trait PromotionCache: Send + 'static {
    /// Returns the encoded value for `key`, if promoted.
    fn lookup(&mut self, key: &str) -> Option<&str>;

    /// Promotes `key` with its encoded value.
    fn insert(&mut self, key: String, value: String);

    /// Demotes `key`, if present.
    fn remove(&mut self, key: &str);

    /// Number of promoted entries.
    fn len(&self) -> usize;

    /// True if nothing is promoted.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Demotes everything.
    fn clear(&mut self);
}

/// Promotion cache with no eviction. Entries leave only via explicit
/// delete, so memory grows with the number of promoted keys.
#[derive(Debug, Default)]
pub struct UnboundedCache {
    entries: HashMap<String, String>,
}

impl UnboundedCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PromotionCache for UnboundedCache {
    fn lookup(&mut self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn insert(&mut self, key: String, value: String) {
        self.entries.insert(key, value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// LRU-bounded promotion cache for callers that opt into a capacity
/// limit via [`CachePolicy::Bounded`].
pub struct BoundedCache {
    entries: LruCache<String, String>,
}

impl BoundedCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }
}

impl PromotionCache for BoundedCache {
    fn lookup(&mut self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn insert(&mut self, key: String, value: String) {
        self.entries.put(key, value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.pop(key);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Builds the cache implementation for a policy.
pub(crate) fn build_cache(policy: CachePolicy) -> Box<dyn PromotionCache> {
    match policy {
        CachePolicy::Unbounded => Box::new(UnboundedCache::new()),
        CachePolicy::Bounded(capacity) => Box::new(BoundedCache::new(capacity)),
    }
}
