/// Cursor and selection model for text editing.
use crate::buffer::TextBuffer;
use anyhow::{Context, Result};

/// Represents a position in the text as line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// 0-indexed line number.
    pub line: usize,
    /// 0-indexed column (char offset within the line).
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line.cmp(&other.line).then(self.col.cmp(&other.col))
    }
}

/// A selection range within the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// The anchor (start) of the selection.
    pub anchor: Position,
    /// The head (end / cursor) of the selection.
    pub head: Position,
}

impl Selection {
    /// Returns the start (min) position of the selection.
    pub fn start(&self) -> Position {
        std::cmp::min(self.anchor, self.head)
    }

    /// Returns the end (max) position of the selection.
    pub fn end(&self) -> Position {
        std::cmp::max(self.anchor, self.head)
    }

    /// Returns true if this selection is empty (anchor == head).
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }
}

/// The cursor state for a document, tracking position and optional selection.
#[derive(Debug, Clone)]
pub struct Cursor {
    /// Current cursor position.
    pub position: Position,
    /// Optional selection anchor. When set, selection is from anchor to position.
    pub selection_anchor: Option<Position>,
    /// Desired column when moving up/down (sticky column).
    pub desired_col: Option<usize>,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Cursor {
    /// Creates a new cursor at position (0, 0).
    pub fn new() -> Self {
        Self {
            position: Position::default(),
            selection_anchor: None,
            desired_col: None,
        }
    }

    /// Returns the current selection, if any.
    pub fn selection(&self) -> Option<Selection> {
        self.selection_anchor.map(|anchor| Selection {
            anchor,
            head: self.position,
        })
    }

    /// Returns the selection range as char offsets (start, end), ordered.
    /// If no selection, returns None.
    pub fn selection_char_range(&self, buffer: &TextBuffer) -> Result<Option<(usize, usize)>> {
        match self.selection_anchor {
            Some(anchor) => {
                let anchor_char = pos_to_char(buffer, anchor)?;
                let head_char = pos_to_char(buffer, self.position)?;
                let start = anchor_char.min(head_char);
                let end = anchor_char.max(head_char);
                Ok(Some((start, end)))
            }
            None => Ok(None),
        }
    }

    /// Converts the cursor position to a char index.
    pub fn to_char_index(&self, buffer: &TextBuffer) -> Result<usize> {
        pos_to_char(buffer, self.position)
    }

    /// Starts or extends selection from the current position.
    pub fn start_selection(&mut self) {
        if self.selection_anchor.is_none() {
            self.selection_anchor = Some(self.position);
        }
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selection_anchor = None;
    }

    /// Moves the cursor to an absolute position, clamped to buffer bounds.
    pub fn move_to(&mut self, pos: Position, buffer: &TextBuffer) {
        self.position = clamp_position(pos, buffer);
        self.desired_col = None;
    }

    /// Moves the cursor right by one character.
    pub fn move_right(&mut self, buffer: &TextBuffer) {
        let line_len = buffer.line_len_chars(self.position.line).unwrap_or(0);
        if self.position.col < line_len {
            self.position.col += 1;
        } else if self.position.line + 1 < buffer.len_lines() {
            self.position.line += 1;
            self.position.col = 0;
        }
        self.desired_col = None;
    }

    /// Moves the cursor left by one character.
    pub fn move_left(&mut self, buffer: &TextBuffer) {
        if self.position.col > 0 {
            self.position.col -= 1;
        } else if self.position.line > 0 {
            self.position.line -= 1;
            self.position.col = buffer.line_len_chars(self.position.line).unwrap_or(0);
        }
        self.desired_col = None;
    }

    /// Moves the cursor up by one line, preserving the desired column.
    pub fn move_up(&mut self, buffer: &TextBuffer) {
        if self.position.line == 0 {
            return;
        }
        let desired = self.desired_col.unwrap_or(self.position.col);
        self.position.line -= 1;
        let line_len = buffer.line_len_chars(self.position.line).unwrap_or(0);
        self.position.col = desired.min(line_len);
        self.desired_col = Some(desired);
    }

    /// Moves the cursor down by one line, preserving the desired column.
    pub fn move_down(&mut self, buffer: &TextBuffer) {
        if self.position.line + 1 >= buffer.len_lines() {
            return;
        }
        let desired = self.desired_col.unwrap_or(self.position.col);
        self.position.line += 1;
        let line_len = buffer.line_len_chars(self.position.line).unwrap_or(0);
        self.position.col = desired.min(line_len);
        self.desired_col = Some(desired);
    }

    /// Moves the cursor to the beginning of the current line.
    pub fn move_to_line_start(&mut self) {
        self.position.col = 0;
        self.desired_col = None;
    }

    /// Moves the cursor to the end of the current line.
    pub fn move_to_line_end(&mut self, buffer: &TextBuffer) {
        let line_len = buffer.line_len_chars(self.position.line).unwrap_or(0);
        self.position.col = line_len;
        self.desired_col = None;
    }

    /// Moves the cursor to the beginning of the next word.
    pub fn move_word_right(&mut self, buffer: &TextBuffer) {
        let total_chars = buffer.len_chars();
        let mut char_idx = pos_to_char(buffer, self.position).unwrap_or(0);

        if char_idx >= total_chars {
            return;
        }

        // Skip current word characters
        while char_idx < total_chars {
            let ch = buffer.char_at(char_idx).unwrap_or(' ');
            if !ch.is_alphanumeric() && ch != '_' {
                break;
            }
            char_idx += 1;
        }
        // Skip whitespace/punctuation
        while char_idx < total_chars {
            let ch = buffer.char_at(char_idx).unwrap_or(' ');
            if ch.is_alphanumeric() || ch == '_' {
                break;
            }
            char_idx += 1;
        }

        self.position = char_to_pos(buffer, char_idx);
        self.desired_col = None;
    }

    /// Moves the cursor to the beginning of the previous word.
    pub fn move_word_left(&mut self, buffer: &TextBuffer) {
        let mut char_idx = pos_to_char(buffer, self.position).unwrap_or(0);

        if char_idx == 0 {
            return;
        }

        char_idx -= 1;

        // Skip whitespace/punctuation backwards
        while char_idx > 0 {
            let ch = buffer.char_at(char_idx).unwrap_or(' ');
            if ch.is_alphanumeric() || ch == '_' {
                break;
            }
            char_idx -= 1;
        }
        // Skip word characters backwards
        while char_idx > 0 {
            let prev_ch = buffer.char_at(char_idx - 1).unwrap_or(' ');
            if !prev_ch.is_alphanumeric() && prev_ch != '_' {
                break;
            }
            char_idx -= 1;
        }

        self.position = char_to_pos(buffer, char_idx);
        self.desired_col = None;
    }

    /// Moves the cursor to the beginning of the document.
    pub fn move_to_start(&mut self) {
        self.position = Position::default();
        self.desired_col = None;
    }

    /// Moves the cursor to the end of the document.
    pub fn move_to_end(&mut self, buffer: &TextBuffer) {
        if buffer.len_lines() == 0 {
            self.position = Position::default();
        } else {
            let last_line = buffer.len_lines() - 1;
            let line_len = buffer.line_len_chars(last_line).unwrap_or(0);
            self.position = Position::new(last_line, line_len);
        }
        self.desired_col = None;
    }

    /// Selects all text in the buffer.
    pub fn select_all(&mut self, buffer: &TextBuffer) {
        self.selection_anchor = Some(Position::default());
        self.move_to_end(buffer);
    }

    /// Selects the current word.
    pub fn select_word(&mut self, buffer: &TextBuffer) {
        let char_idx = pos_to_char(buffer, self.position).unwrap_or(0);
        let total = buffer.len_chars();

        if total == 0 {
            return;
        }

        let idx = char_idx.min(total - 1);
        let ch = buffer.char_at(idx).unwrap_or(' ');

        if !ch.is_alphanumeric() && ch != '_' {
            return;
        }

        // Find word start
        let mut start = idx;
        while start > 0 {
            let prev = buffer.char_at(start - 1).unwrap_or(' ');
            if !prev.is_alphanumeric() && prev != '_' {
                break;
            }
            start -= 1;
        }

        // Find word end
        let mut end = idx + 1;
        while end < total {
            let next = buffer.char_at(end).unwrap_or(' ');
            if !next.is_alphanumeric() && next != '_' {
                break;
            }
            end += 1;
        }

        self.selection_anchor = Some(char_to_pos(buffer, start));
        self.position = char_to_pos(buffer, end);
        self.desired_col = None;
    }

    /// Selects the current line.
    pub fn select_line(&mut self, buffer: &TextBuffer) {
        let line = self.position.line;
        self.selection_anchor = Some(Position::new(line, 0));

        if line + 1 < buffer.len_lines() {
            self.position = Position::new(line + 1, 0);
        } else {
            let line_len = buffer.line_len_chars(line).unwrap_or(0);
            self.position = Position::new(line, line_len);
        }
        self.desired_col = None;
    }

    /// Moves the cursor up by a page (N lines).
    pub fn move_page_up(&mut self, page_lines: usize, buffer: &TextBuffer) {
        let desired = self.desired_col.unwrap_or(self.position.col);
        self.position.line = self.position.line.saturating_sub(page_lines);
        let line_len = buffer.line_len_chars(self.position.line).unwrap_or(0);
        self.position.col = desired.min(line_len);
        self.desired_col = Some(desired);
    }

    /// Moves the cursor down by a page (N lines).
    pub fn move_page_down(&mut self, page_lines: usize, buffer: &TextBuffer) {
        let desired = self.desired_col.unwrap_or(self.position.col);
        let max_line = buffer.len_lines().saturating_sub(1);
        self.position.line = (self.position.line + page_lines).min(max_line);
        let line_len = buffer.line_len_chars(self.position.line).unwrap_or(0);
        self.position.col = desired.min(line_len);
        self.desired_col = Some(desired);
    }
}

/// Converts a `Position` to a char index in the buffer.
pub fn pos_to_char(buffer: &TextBuffer, pos: Position) -> Result<usize> {
    let clamped = clamp_position(pos, buffer);
    let line_start = buffer
        .line_to_char(clamped.line)
        .context("converting position to char index")?;
    Ok(line_start + clamped.col)
}

/// Converts a char index to a `Position`.
pub fn char_to_pos(buffer: &TextBuffer, char_idx: usize) -> Position {
    let clamped = char_idx.min(buffer.len_chars());
    let line = buffer.char_to_line(clamped).unwrap_or(0);
    let line_start = buffer.line_to_char(line).unwrap_or(0);
    Position::new(line, clamped - line_start)
}

/// Clamps a position to valid buffer bounds.
fn clamp_position(pos: Position, buffer: &TextBuffer) -> Position {
    if buffer.len_lines() == 0 {
        return Position::default();
    }
    let line = pos.line.min(buffer.len_lines() - 1);
    let line_len = buffer.line_len_chars(line).unwrap_or(0);
    let col = pos.col.min(line_len);
    Position::new(line, col)
}
