/// Configuration and utility functions for the history system.
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Maximum number of edit groups kept in the in-memory hot cache
/// before spilling to disk.
const DEFAULT_HOT_CAPACITY: usize = 500;

/// Maximum total number of edit groups per document (memory + disk).
/// Oldest groups are evicted when this limit is exceeded.
const DEFAULT_MAX_HISTORY_DEPTH: usize = 10_000;

/// Time window in milliseconds for grouping consecutive edits
/// into a single undo step.
const DEFAULT_GROUP_TIMEOUT_MS: u64 = 500;

/// Configuration for the history system.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Max edit groups in the hot (in-memory) cache.
    pub hot_capacity: usize,
    /// Max total edit groups per document (memory + disk).
    pub max_history_depth: usize,
    /// Grouping timeout in milliseconds.
    pub group_timeout_ms: u64,
    /// Root directory for the persistence database.
    pub data_dir: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            hot_capacity: DEFAULT_HOT_CAPACITY,
            max_history_depth: DEFAULT_MAX_HISTORY_DEPTH,
            group_timeout_ms: DEFAULT_GROUP_TIMEOUT_MS,
            data_dir: resolve_data_dir(),
        }
    }
}

/// Resolves the data directory path.
///
/// Resolution order:
/// 1. `RUST_PAD_DATA_DIR` environment variable
/// 2. `.data/` directory next to the executable
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("RUST_PAD_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
    exe.parent().unwrap_or(Path::new(".")).join(".data")
}

/// Generates a document ID for a file on disk.
///
/// Uses a hash of the canonical path for stability across sessions.
pub fn doc_id_for_path(path: &Path) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    format!("file-{:016x}", hasher.finish())
}

/// Counter for generating unique unsaved document IDs within a session.
static UNSAVED_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates a unique document ID for an unsaved (new) document.
pub fn generate_unsaved_id() -> String {
    let count = UNSAVED_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("unsaved-{count}")
}
