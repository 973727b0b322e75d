//! Document model combining text buffer, cursor, and metadata.
//!
//! A `Document` ties together a `TextBuffer`, `Cursor`, undo/redo history,
//! encoding metadata, and UI scroll state. Single-cursor editing operations
//! live here; multi-cursor operations are in the `multi_cursor` submodule,
//! and file I/O is in the `io` submodule.

mod io;
mod multi_cursor;

use std::path::PathBuf;
use std::sync::Arc;

use crate::buffer::TextBuffer;
use crate::cursor::{char_to_pos, pos_to_char, Cursor, Position};
use crate::encoding::{LineEnding, TextEncoding};
use crate::history::{
    generate_unsaved_id, CursorSnapshot, EditOperation, HistoryConfig, PersistenceLayer,
    UndoManager,
};
use crate::indent::IndentStyle;
use crate::search::document_cache::{DocumentCache, DocumentId};

/// Converts a `Position` to a `CursorSnapshot` for history recording.
fn snap(pos: Position) -> CursorSnapshot {
    CursorSnapshot {
        line: pos.line,
        col: pos.col,
    }
}

/// Snapshot of buffer and cursor state captured before a bulk edit.
///
/// Used with [`Document::record_undo_from_snapshot`] to make bulk operations
/// (sort lines, remove duplicates, etc.) undoable.
pub struct UndoSnapshot {
    content: String,
    cursor: Position,
}

/// Change tracking state for a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChangeState {
    /// Line has not been modified since last save.
    Unchanged,
    /// Line was modified but not yet saved.
    Modified,
    /// Line was modified and has been saved.
    Saved,
}

/// Tracks which scrollbar is being actively dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollbarDrag {
    /// No scrollbar is being dragged.
    #[default]
    None,
    /// The vertical scrollbar is being dragged.
    Vertical,
    /// The horizontal scrollbar is being dragged.
    Horizontal,
}

/// A single document with its buffer, cursor, history, and metadata.
pub struct Document {
    /// The text buffer.
    pub buffer: TextBuffer,
    /// The cursor state.
    pub cursor: Cursor,
    /// Additional cursors for multi-cursor editing.
    pub secondary_cursors: Vec<Cursor>,
    /// Undo/redo history manager.
    pub history: UndoManager,
    /// File path on disk, if any.
    pub file_path: Option<PathBuf>,
    /// The encoding used for this document.
    pub encoding: TextEncoding,
    /// The line ending style.
    pub line_ending: LineEnding,
    /// The indentation style.
    pub indent_style: IndentStyle,
    /// Whether the document has been modified since last save.
    pub modified: bool,
    /// Display name for the tab.
    pub title: String,
    /// Per-line change tracking state.
    pub line_changes: Vec<LineChangeState>,
    /// Scroll offset (line index of the top visible line).
    pub scroll_y: f32,
    /// Horizontal scroll offset in pixels.
    pub scroll_x: f32,
    /// Timestamp of last cursor activity (for blink reset), in egui time seconds.
    /// After activity the cursor stays solid for a short period before blinking.
    pub cursor_activity_time: f64,
    /// Which scrollbar is currently being dragged, if any.
    pub scrollbar_drag: ScrollbarDrag,
    /// Links unsaved tabs to session store content for restore-on-startup.
    pub session_id: Option<String>,
    /// Flag requesting the UI to scroll the viewport so the cursor is visible.
    ///
    /// Set by operations that move the cursor outside the editor widget's
    /// input loop (e.g. paste, undo/redo from global shortcuts). The widget
    /// clears this after honoring it.
    pub scroll_to_cursor: bool,
    /// Timestamp of the last successful save to disk.
    pub last_saved_at: Option<chrono::DateTime<chrono::Local>>,
    /// Whether live file monitoring is active (auto-reload on external changes).
    pub live_monitoring: bool,
    /// Last known file modification time, for change detection.
    pub last_known_mtime: Option<std::time::SystemTime>,
    /// Monotonically increasing version counter, bumped on every buffer mutation.
    /// Used by UI caches (wrap map, occurrence highlights, etc.) to detect changes
    /// without comparing content.
    pub content_version: u64,
    /// Cached max line length in chars: `(content_version, value)`.
    pub cached_max_line_chars: Option<(u64, usize)>,
    /// Cached occurrence highlight ranges: `(content_version, needle, ranges)`.
    #[allow(clippy::type_complexity)]
    pub cached_occurrences: Option<(u64, String, Vec<(usize, usize)>)>,
    /// Opaque storage for UI-layer render caches (galley cache, etc.).
    ///
    /// Typed as `Box<dyn Any + Send>` so that the core crate doesn't depend on egui types.
    /// The UI layer downcasts this to its concrete `RenderCache` struct.
    pub render_cache: Option<Box<dyn std::any::Any + Send>>,
    /// Stable identity for this document's lifetime, used to key the
    /// process-wide search line-index cache.
    pub doc_id: DocumentId,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("buffer", &self.buffer)
            .field("cursor", &self.cursor)
            .field("file_path", &self.file_path)
            .field("encoding", &self.encoding)
            .field("line_ending", &self.line_ending)
            .field("modified", &self.modified)
            .field("title", &self.title)
            .field("content_version", &self.content_version)
            .field("doc_id", &self.doc_id)
            .finish_non_exhaustive()
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        DocumentCache::invalidate(self.doc_id);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a new empty document with in-memory-only history.
    pub fn new() -> Self {
        Self::new_internal(None)
    }

    /// Creates a new empty document with persistent history.
    pub fn with_persistence(persistence: Arc<PersistenceLayer>, config: &HistoryConfig) -> Self {
        Self::new_internal(Some((persistence, config)))
    }

    /// Internal constructor shared by `new()` and `with_persistence()`.
    fn new_internal(persistence: Option<(Arc<PersistenceLayer>, &HistoryConfig)>) -> Self {
        let history = match persistence {
            Some((pl, config)) => {
                let doc_id = generate_unsaved_id();
                UndoManager::new(doc_id, config.clone(), Some(pl))
            }
            None => UndoManager::in_memory(),
        };
        Self {
            buffer: TextBuffer::new(),
            cursor: Cursor::new(),
            secondary_cursors: Vec::new(),
            history,
            file_path: None,
            encoding: TextEncoding::default(),
            line_ending: LineEnding::default(),
            indent_style: IndentStyle::default(),
            modified: false,
            title: "Untitled".to_string(),
            line_changes: vec![LineChangeState::Unchanged],
            scroll_y: 0.0,
            scroll_x: 0.0,
            cursor_activity_time: 0.0,
            scrollbar_drag: ScrollbarDrag::None,
            session_id: None,
            scroll_to_cursor: false,
            last_saved_at: None,
            live_monitoring: false,
            last_known_mtime: None,
            content_version: 0,
            cached_max_line_chars: None,
            cached_occurrences: None,
            render_cache: None,
            doc_id: DocumentId::next(),
        }
    }

    /// Bumps the content version counter.
    ///
    /// Called by every method that mutates the buffer so that UI caches
    /// can detect changes without comparing content.
    #[inline]
    fn bump_version(&mut self) {
        self.content_version = self.content_version.wrapping_add(1);
    }

    /// Inserts text at the current cursor position.
    pub fn insert_text(&mut self, text: &str) {
        // Delete selection first if any
        if self.cursor.selection_anchor.is_some() {
            self.delete_selection();
        }

        let char_idx = self.cursor.to_char_index(&self.buffer).unwrap_or(0);
        let cursor_before = self.cursor.position;

        if self.buffer.insert(char_idx, text).is_ok() {
            // Advance cursor past inserted text
            let new_pos = char_to_pos(&self.buffer, char_idx + text.chars().count());
            self.cursor.position = new_pos;
            self.cursor.desired_col = None;

            self.history.record(EditOperation {
                position: char_idx,
                inserted: text.to_string(),
                deleted: String::new(),
                cursor_before: snap(cursor_before),
                cursor_after: snap(self.cursor.position),
            });

            self.mark_lines_modified(cursor_before.line, self.cursor.position.line);
            self.modified = true;
            self.scroll_to_cursor = true;
            self.bump_version();
        }
    }

    /// Inserts a newline at the current cursor position.
    pub fn insert_newline(&mut self) {
        self.insert_text("\n");
    }

    /// Deletes the selected text.
    pub fn delete_selection(&mut self) {
        if let Ok(Some((start, end))) = self.cursor.selection_char_range(&self.buffer) {
            if start == end {
                self.cursor.clear_selection();
                return;
            }

            let cursor_before = self.cursor.position;
            let deleted_text = self
                .buffer
                .slice(start, end)
                .map(|s| s.to_string())
                .unwrap_or_default();

            let start_pos = char_to_pos(&self.buffer, start);
            let end_line = char_to_pos(&self.buffer, end).line;

            if self.buffer.remove(start, end).is_ok() {
                self.cursor.position = start_pos;
                self.cursor.clear_selection();
                self.cursor.desired_col = None;

                self.history.record(EditOperation {
                    position: start,
                    inserted: String::new(),
                    deleted: deleted_text,
                    cursor_before: snap(cursor_before),
                    cursor_after: snap(self.cursor.position),
                });

                self.mark_lines_modified(start_pos.line, end_line);
                self.sync_line_changes();
                self.modified = true;
                self.scroll_to_cursor = true;
                self.bump_version();
            }
        }
    }

    /// Deletes the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor.selection_anchor.is_some() {
            self.delete_selection();
            return;
        }

        let char_idx = self.cursor.to_char_index(&self.buffer).unwrap_or(0);
        if char_idx == 0 {
            return;
        }

        let cursor_before = self.cursor.position;
        let deleted_char = self.buffer.char_at(char_idx - 1).unwrap_or(' ');
        let deleted = deleted_char.to_string();

        if self.buffer.remove(char_idx - 1, char_idx).is_ok() {
            self.cursor.position = char_to_pos(&self.buffer, char_idx - 1);
            self.cursor.desired_col = None;

            self.history.record(EditOperation {
                position: char_idx - 1,
                inserted: String::new(),
                deleted,
                cursor_before: snap(cursor_before),
                cursor_after: snap(self.cursor.position),
            });

            self.mark_lines_modified(self.cursor.position.line, cursor_before.line);
            self.sync_line_changes();
            self.modified = true;
            self.bump_version();
        }
    }

    /// Deletes the character after the cursor (delete key).
    pub fn delete_forward(&mut self) {
        if self.cursor.selection_anchor.is_some() {
            self.delete_selection();
            return;
        }

        let char_idx = self.cursor.to_char_index(&self.buffer).unwrap_or(0);
        if char_idx >= self.buffer.len_chars() {
            return;
        }

        let cursor_before = self.cursor.position;
        let deleted_char = self.buffer.char_at(char_idx).unwrap_or(' ');
        let deleted = deleted_char.to_string();

        if self.buffer.remove(char_idx, char_idx + 1).is_ok() {
            self.history.record(EditOperation {
                position: char_idx,
                inserted: String::new(),
                deleted,
                cursor_before: snap(cursor_before),
                cursor_after: snap(self.cursor.position),
            });

            self.mark_lines_modified(self.cursor.position.line, self.cursor.position.line);
            self.sync_line_changes();
            self.modified = true;
            self.bump_version();
        }
    }

    /// Performs undo.
    pub fn undo(&mut self) {
        if let Some(ops) = self.history.undo() {
            self.history.pause_recording();
            // Apply operations in reverse
            for op in ops.iter().rev() {
                // Reverse: remove what was inserted, insert what was deleted
                if !op.inserted.is_empty() {
                    let _ = self
                        .buffer
                        .remove(op.position, op.position + op.inserted.chars().count());
                }
                if !op.deleted.is_empty() {
                    let _ = self.buffer.insert(op.position, &op.deleted);
                }
            }
            // Restore cursor to before position
            if let Some(first_op) = ops.first() {
                self.cursor.position = first_op.cursor_before.into();
                self.cursor.clear_selection();
                self.cursor.desired_col = None;
            }
            self.history.resume_recording();
            self.sync_line_changes();
            self.modified = true;
            self.scroll_to_cursor = true;
            self.bump_version();
        }
    }

    /// Performs redo.
    pub fn redo(&mut self) {
        if let Some(ops) = self.history.redo() {
            self.history.pause_recording();
            // Apply operations in forward order
            for op in &ops {
                if !op.deleted.is_empty() {
                    let _ = self
                        .buffer
                        .remove(op.position, op.position + op.deleted.chars().count());
                }
                if !op.inserted.is_empty() {
                    let _ = self.buffer.insert(op.position, &op.inserted);
                }
            }
            // Restore cursor to after position
            if let Some(last_op) = ops.last() {
                self.cursor.position = last_op.cursor_after.into();
                self.cursor.clear_selection();
                self.cursor.desired_col = None;
            }
            self.history.resume_recording();
            self.sync_line_changes();
            self.modified = true;
            self.scroll_to_cursor = true;
            self.bump_version();
        }
    }

    /// Returns the selected text, or None if no selection.
    pub fn selected_text(&self) -> Option<String> {
        if let Ok(Some((start, end))) = self.cursor.selection_char_range(&self.buffer) {
            if start == end {
                return None;
            }
            self.buffer.slice(start, end).ok().map(|s| s.to_string())
        } else {
            None
        }
    }

    /// Returns true if multi-cursor mode is active.
    pub fn is_multi_cursor(&self) -> bool {
        !self.secondary_cursors.is_empty()
    }

    /// Clears all secondary cursors, returning to single-cursor mode.
    pub fn clear_secondary_cursors(&mut self) {
        self.secondary_cursors.clear();
    }

    /// Adds a secondary cursor, merging overlapping ones.
    pub fn add_secondary_cursor(&mut self, cursor: Cursor) {
        self.secondary_cursors.push(cursor);
        self.merge_overlapping_cursors();
    }

    /// Merges cursors that overlap or are at the same position.
    pub(crate) fn merge_overlapping_cursors(&mut self) {
        // Collect all cursor positions (as char indices) to detect duplicates
        let primary_idx = pos_to_char(&self.buffer, self.cursor.position).unwrap_or(0);
        self.secondary_cursors.retain(|sc| {
            let sc_idx = pos_to_char(&self.buffer, sc.position).unwrap_or(0);
            sc_idx != primary_idx
        });

        // Deduplicate secondary cursors by position
        let mut seen = vec![primary_idx];
        self.secondary_cursors.retain(|sc| {
            let idx = pos_to_char(&self.buffer, sc.position).unwrap_or(0);
            if seen.contains(&idx) {
                false
            } else {
                seen.push(idx);
                true
            }
        });
    }

    /// Deletes the current line (Ctrl+D).
    pub fn delete_line(&mut self) {
        let line = self.cursor.position.line;
        let total_lines = self.buffer.len_lines();
        let line_start = self.buffer.line_to_char(line).unwrap_or(0);

        let end = if total_lines <= 1 {
            // Only line: delete everything
            self.buffer.len_chars()
        } else if line + 1 < total_lines {
            // Not last line: delete line including its trailing newline
            self.buffer.line_to_char(line + 1).unwrap_or(line_start)
        } else {
            // Last line: also remove the preceding newline
            self.buffer.len_chars()
        };

        // For last line, start from end of previous line's content (eat preceding newline)
        let start = if line + 1 >= total_lines && line > 0 {
            let prev_line_end = self.buffer.line_to_char(line).unwrap_or(0);
            prev_line_end.saturating_sub(1) // eat the \n before this line
        } else {
            line_start
        };

        if start == end {
            return;
        }

        let deleted_text = self
            .buffer
            .slice(start, end)
            .map(|s| s.to_string())
            .unwrap_or_default();
        let cursor_before = self.cursor.position;

        if self.buffer.remove(start, end).is_ok() {
            let new_line = line.min(self.buffer.len_lines().saturating_sub(1));
            let line_len = self.buffer.line_len_chars(new_line).unwrap_or(0);
            self.cursor.position = Position::new(new_line, self.cursor.position.col.min(line_len));
            self.cursor.clear_selection();

            self.history.record(EditOperation {
                position: start,
                inserted: String::new(),
                deleted: deleted_text,
                cursor_before: snap(cursor_before),
                cursor_after: snap(self.cursor.position),
            });

            self.sync_line_changes();
            self.modified = true;
            self.scroll_to_cursor = true;
            self.bump_version();
        }
    }

    /// Marks lines as modified for change tracking.
    fn mark_lines_modified(&mut self, from_line: usize, to_line: usize) {
        let start = from_line.min(to_line);
        let end = from_line.max(to_line);
        for line_idx in start..=end {
            if line_idx < self.line_changes.len() {
                self.line_changes[line_idx] = LineChangeState::Modified;
            }
        }
    }

    /// Captures a snapshot of the current buffer and cursor for undo recording.
    ///
    /// Call this before a bulk operation, then call
    /// [`record_undo_from_snapshot`](Self::record_undo_from_snapshot) after
    /// to make the operation undoable in a single step.
    pub fn snapshot_for_undo(&self) -> UndoSnapshot {
        UndoSnapshot {
            content: self.buffer.to_string(),
            cursor: self.cursor.position,
        }
    }

    /// Records a single undo entry from a pre-operation snapshot.
    ///
    /// Compares the current buffer to the snapshot and records the difference
    /// as one operation that replaces the entire content. Does nothing if the
    /// buffer is unchanged.
    pub fn record_undo_from_snapshot(&mut self, snapshot: UndoSnapshot) {
        let new_content = self.buffer.to_string();
        if new_content == snapshot.content {
            return;
        }
        self.history.force_group_break();
        self.history.record(EditOperation {
            position: 0,
            deleted: snapshot.content,
            inserted: new_content,
            cursor_before: snap(snapshot.cursor),
            cursor_after: snap(self.cursor.position),
        });
        self.history.force_group_break();
        self.sync_line_changes();
        self.modified = true;
        self.scroll_to_cursor = true;
        self.bump_version();
    }

    /// Syncs the line_changes vector length with the buffer's line count.
    pub(crate) fn sync_line_changes(&mut self) {
        let line_count = self.buffer.len_lines().max(1);
        self.line_changes
            .resize(line_count, LineChangeState::Modified);
    }
}
