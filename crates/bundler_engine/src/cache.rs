use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::Content;

/// Memo of fetched content keyed by resolved, post-redirect URL.
///
/// Entries are write-once: `put` never replaces an existing value.
pub trait FetchCache: Send + Sync {
    fn get(&self, url: &str) -> Option<Content>;
    fn put(&self, url: &str, content: Content);
}

/// In-memory cache living as long as the value (or the process, for
/// [`MemoryCache::global`]).
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Content>,
}

static GLOBAL_CACHE: Lazy<Arc<MemoryCache>> = Lazy::new(|| Arc::new(MemoryCache::new()));

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance shared by every engine that does not bring its own.
    pub fn global() -> Arc<MemoryCache> {
        GLOBAL_CACHE.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FetchCache for MemoryCache {
    fn get(&self, url: &str) -> Option<Content> {
        self.entries.get(url).map(|entry| entry.value().clone())
    }

    fn put(&self, url: &str, content: Content) {
        self.entries.entry(url.to_string()).or_insert(content);
    }
}
