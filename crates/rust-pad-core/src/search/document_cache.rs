use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::search::line_index::LineIndex;

static DOC_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Stable identity for one [`Document`](crate::document::Document) for as
/// long as it's open, independent of its path or title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Mints a fresh id, unique for the lifetime of the process.
    pub fn next() -> Self {
        Self(DOC_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

type CacheKey = (DocumentId, u64);

static LINE_INDEX_CACHE: Lazy<Mutex<HashMap<CacheKey, LineIndex>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Process-wide cache of [`LineIndex`] tables, keyed by document identity
/// and revision. `SearchCursor` calls into this so that re-running a query
/// against a document that hasn't changed since the last search reuses the
/// same line index instead of rebuilding it from scratch.
pub struct DocumentCache;

impl DocumentCache {
    /// Returns the cached index for `(doc_id, revision)`, if present.
    pub fn get(doc_id: DocumentId, revision: u64) -> Option<LineIndex> {
        let cache = LINE_INDEX_CACHE.lock().expect("line index cache poisoned");
        cache.get(&(doc_id, revision)).cloned()
    }

    /// Stores `index` for `(doc_id, revision)`, replacing any prior entry.
    /// Older revisions of the same document are evicted since a document
    /// only ever searches its current revision.
    pub fn put(doc_id: DocumentId, revision: u64, index: LineIndex) {
        let mut cache = LINE_INDEX_CACHE.lock().expect("line index cache poisoned");
        cache.retain(|&(id, _), _| id != doc_id);
        cache.insert((doc_id, revision), index);
    }

    /// Drops every cached entry for `doc_id`. Called when a document is
    /// closed so its entries don't linger for the rest of the process.
    pub fn invalidate(doc_id: DocumentId) {
        let mut cache = LINE_INDEX_CACHE.lock().expect("line index cache poisoned");
        cache.retain(|&(id, _), _| id != doc_id);
    }

    /// Number of entries currently cached, across all documents. Exposed
    /// for tests.
    #[cfg(test)]
    pub fn len() -> usize {
        LINE_INDEX_CACHE.lock().expect("line index cache poisoned").len()
    }
}
