/// Core undo/redo manager with tiered storage.
///
/// Recent edits are kept in memory (hot cache). When the hot cache exceeds
/// capacity, older groups are spilled to disk. On undo past the hot cache,
/// groups are loaded from disk transparently.
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::HistoryConfig;
use crate::operation::{EditGroup, EditOperation};
use crate::persistence::PersistenceLayer;

/// Manages undo/redo history for a single document.
///
/// Each document gets its own `UndoManager` with an independent history stack.
/// The manager can optionally persist history to disk via a shared
/// `PersistenceLayer`.
pub struct UndoManager {
    /// In-memory undo stack, ordered by seq ascending (oldest first).
    hot_undo: Vec<EditGroup>,
    /// In-memory redo stack, ordered with most-recently-undone on top.
    redo_stack: Vec<EditGroup>,
    /// Next sequence number to assign to new groups.
    next_seq: u64,
    /// Document identifier used as the persistence key.
    doc_id: String,
    /// Whether recording is active (set to false during undo/redo replay).
    recording: bool,
    /// Timestamp of the last recorded edit, used for grouping.
    last_edit_time: Option<Instant>,
    /// Configuration parameters.
    config: HistoryConfig,
    /// Optional disk persistence (None = in-memory only).
    persistence: Option<Arc<PersistenceLayer>>,
    /// Whether in-memory state has changed since the last flush.
    dirty: bool,
    /// Number of groups on disk that are NOT in the hot cache.
    cold_count: usize,
}

impl std::fmt::Debug for UndoManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoManager")
            .field("doc_id", &self.doc_id)
            .field("hot_undo_len", &self.hot_undo.len())
            .field("redo_len", &self.redo_stack.len())
            .field("next_seq", &self.next_seq)
            .field("recording", &self.recording)
            .field("dirty", &self.dirty)
            .field("cold_count", &self.cold_count)
            .finish()
    }
}

impl UndoManager {
    /// Creates a new empty UndoManager.
    ///
    /// Pass `persistence: None` for in-memory-only mode (useful in tests
    /// or for documents that don't need disk persistence).
    pub fn new(
        doc_id: String,
        config: HistoryConfig,
        persistence: Option<Arc<PersistenceLayer>>,
    ) -> Self {
        Self {
            hot_undo: Vec::new(),
            redo_stack: Vec::new(),
            next_seq: 0,
            doc_id,
            recording: true,
            last_edit_time: None,
            config,
            persistence,
            dirty: false,
            cold_count: 0,
        }
    }

    /// Creates an in-memory-only UndoManager with default config.
    ///
    /// Convenience constructor for tests and simple usage.
    pub fn in_memory() -> Self {
        Self::new(String::from("test"), HistoryConfig::default(), None)
    }

    /// Loads existing history from disk, or creates a fresh manager.
    ///
    /// Reads stored edit groups into the hot cache and restores the
    /// sequence counter. If no history exists on disk, behaves like `new()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistence layer fails to read.
    pub fn load_or_new(
        doc_id: String,
        config: HistoryConfig,
        persistence: Option<Arc<PersistenceLayer>>,
    ) -> Result<Self> {
        let (hot_undo, next_seq, cold_count) = match &persistence {
            Some(pl) => {
                let stored_seq = pl
                    .load_meta(&doc_id)
                    .context("Failed to load document metadata")?;

                match stored_seq {
                    Some(seq) => {
                        let all_groups = pl
                            .read_groups(&doc_id)
                            .context("Failed to load history from disk")?;
                        let total = all_groups.len();
                        let skip = total.saturating_sub(config.hot_capacity);
                        let hot: Vec<EditGroup> = all_groups.into_iter().skip(skip).collect();
                        let cold = total.saturating_sub(hot.len());
                        (hot, seq, cold)
                    }
                    None => (Vec::new(), 0, 0),
                }
            }
            None => (Vec::new(), 0, 0),
        };

        Ok(Self {
            hot_undo,
            redo_stack: Vec::new(),
            next_seq,
            doc_id,
            recording: true,
            last_edit_time: None,
            config,
            persistence,
            dirty: false,
            cold_count,
        })
    }

    /// Returns the document ID.
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// Records an edit operation.
    ///
    /// Groups with the previous operation if within the grouping timeout.
    /// Clears the redo stack when a new edit is recorded.
    pub fn record(&mut self, op: EditOperation) {
        if !self.recording {
            return;
        }

        let now = Instant::now();
        let timeout = Duration::from_millis(self.config.group_timeout_ms);

        // Try to group with the last group if within timeout
        if let Some(last_group) = self.hot_undo.last_mut() {
            if let Some(last_time) = self.last_edit_time {
                if now.duration_since(last_time) < timeout {
                    last_group.operations.push(op);
                    self.last_edit_time = Some(now);
                    self.redo_stack.clear();
                    self.dirty = true;
                    return;
                }
            }
        }

        // Create a new group
        let group = EditGroup {
            operations: vec![op],
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.hot_undo.push(group);
        self.last_edit_time = Some(now);
        self.redo_stack.clear();
        self.dirty = true;

        // Enforce capacity limits
        if self.persistence.is_some() {
            if self.hot_undo.len() > self.config.hot_capacity {
                if let Err(e) = self.maybe_spill() {
                    tracing::warn!("Failed to spill history to disk: {e}");
                }
            }
        } else if self.hot_undo.len() > self.config.max_history_depth {
            let excess = self.hot_undo.len() - self.config.max_history_depth;
            self.hot_undo.drain(..excess);
        }
    }

    /// Forces a group break so the next edit starts a new undo group.
    pub fn force_group_break(&mut self) {
        self.last_edit_time = None;
    }

    /// Undoes the most recent group.
    ///
    /// Returns the operations that should be applied in reverse order
    /// to undo the edit. Returns `None` if there's nothing to undo.
    pub fn undo(&mut self) -> Option<Vec<EditOperation>> {
        // If hot cache is empty, try loading from cold storage
        if self.hot_undo.is_empty() {
            if let Err(e) = self.load_from_cold() {
                tracing::warn!("Failed to load history from disk: {e}");
                return None;
            }
        }

        let group = self.hot_undo.pop()?;
        let ops = group.operations.clone();
        self.redo_stack.push(group);
        self.dirty = true;
        Some(ops)
    }

    /// Redoes the most recently undone group.
    ///
    /// Returns the operations that should be applied in forward order.
    /// Returns `None` if there's nothing to redo.
    pub fn redo(&mut self) -> Option<Vec<EditOperation>> {
        let group = self.redo_stack.pop()?;
        let ops = group.operations.clone();
        self.hot_undo.push(group);
        self.dirty = true;
        Some(ops)
    }

    /// Whether undo is available (in memory or on disk).
    pub fn can_undo(&self) -> bool {
        !self.hot_undo.is_empty() || self.cold_count > 0
    }

    /// Whether redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Temporarily disables recording (used during undo/redo replay).
    pub fn pause_recording(&mut self) {
        self.recording = false;
    }

    /// Re-enables recording after a pause.
    pub fn resume_recording(&mut self) {
        self.recording = true;
    }

    /// Clears all history from memory and disk.
    ///
    /// # Errors
    ///
    /// Returns an error if disk cleanup fails.
    pub fn clear(&mut self) -> Result<()> {
        self.hot_undo.clear();
        self.redo_stack.clear();
        self.next_seq = 0;
        self.last_edit_time = None;
        self.dirty = false;
        self.cold_count = 0;

        if let Some(pl) = &self.persistence {
            pl.delete_document(&self.doc_id)
                .context("Failed to clear history from disk")?;
        }
        Ok(())
    }

    /// Flushes in-memory history to disk.
    ///
    /// Called periodically, on document save, and on application shutdown.
    /// No-op if the manager is in-memory-only or nothing has changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the disk write fails.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(pl) = &self.persistence {
            pl.write_groups(&self.doc_id, &self.hot_undo)
                .context("Failed to flush history to disk")?;
            pl.save_meta(&self.doc_id, self.next_seq)
                .context("Failed to save history metadata")?;
            self.dirty = false;
        }
        Ok(())
    }

    /// Deletes all persisted history for this document.
    ///
    /// Called when a tab is explicitly closed (cleanup policy D).
    ///
    /// # Errors
    ///
    /// Returns an error if disk cleanup fails.
    pub fn delete_history(&mut self) -> Result<()> {
        self.clear()
    }

    /// Spills the oldest half of the hot cache to disk.
    fn maybe_spill(&mut self) -> Result<()> {
        let Some(pl) = &self.persistence else {
            return Ok(());
        };

        let spill_count = self.hot_undo.len() / 2;
        if spill_count == 0 {
            return Ok(());
        }

        let to_spill: Vec<EditGroup> = self.hot_undo.drain(..spill_count).collect();
        pl.write_groups(&self.doc_id, &to_spill)
            .context("Failed to spill groups to disk")?;
        self.cold_count += spill_count;

        // Enforce max history depth by evicting oldest from cold.
        // Reserve room for hot_capacity items so that between spills
        // the total (cold + hot) never exceeds max_history_depth.
        let desired_cold = self
            .config
            .max_history_depth
            .saturating_sub(self.config.hot_capacity);
        if self.cold_count > desired_cold {
            let excess = self.cold_count - desired_cold;
            let evicted = pl
                .evict_oldest(&self.doc_id, excess)
                .context("Failed to evict old history")?;
            self.cold_count = self.cold_count.saturating_sub(evicted);
        }

        pl.save_meta(&self.doc_id, self.next_seq)
            .context("Failed to save metadata after spill")?;
        Ok(())
    }

    /// Loads groups from cold storage into the hot cache.
    ///
    /// Called when hot cache is empty and the user attempts to undo.
    fn load_from_cold(&mut self) -> Result<()> {
        if self.cold_count == 0 {
            return Ok(());
        }

        let Some(pl) = &self.persistence else {
            return Ok(());
        };

        let groups = pl
            .read_groups(&self.doc_id)
            .context("Failed to load groups from cold storage")?;

        // Filter out groups that are currently in the redo stack
        // (they were flushed to disk before being undone)
        let redo_seqs: HashSet<u64> = self.redo_stack.iter().map(|g| g.seq).collect();
        self.hot_undo = groups
            .into_iter()
            .filter(|g| !redo_seqs.contains(&g.seq))
            .collect();
        self.cold_count = 0;

        Ok(())
    }
}
