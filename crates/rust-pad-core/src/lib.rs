//! Core document model: text buffer, cursor, undo history bridge,
//! encoding, indentation, bookmarks, line operations, and search.

pub mod bookmarks;
pub mod buffer;
pub mod cursor;
pub mod document;
pub mod encoding;
pub mod history;
pub mod indent;
pub mod line_ops;
pub mod search;
