/// Core types for edit operations and groups.
use serde::{Deserialize, Serialize};

/// Cursor position snapshot for serialization.
///
/// Mirrors the `Position` type from `rust-pad-core` but is independently
/// serializable without depending on the core crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CursorSnapshot {
    /// 0-indexed line number.
    pub line: usize,
    /// 0-indexed column (char offset within line).
    pub col: usize,
}

/// A single atomic edit operation that can be undone/redone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditOperation {
    /// Char index where the edit occurred.
    pub position: usize,
    /// Text that was inserted (empty for pure deletions).
    pub inserted: String,
    /// Text that was deleted (empty for pure insertions).
    pub deleted: String,
    /// Cursor state before the edit.
    pub cursor_before: CursorSnapshot,
    /// Cursor state after the edit.
    pub cursor_after: CursorSnapshot,
}

/// A group of operations that form a single undo step.
///
/// Consecutive edits within the grouping timeout are merged into
/// one group so they undo/redo as a single action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditGroup {
    /// Operations in this group, in chronological order.
    pub operations: Vec<EditOperation>,
    /// Monotonic sequence number assigned by the `UndoManager`.
    pub seq: u64,
}
