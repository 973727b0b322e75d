//! Document text search: a regex-backed match table with O(log n)
//! navigation, plus the stateful cursor and process-wide cache that keep
//! repeated searches against an unchanged document cheap.

pub mod document_cache;
pub mod finder;
pub mod group_array;
pub mod line_index;
pub mod match_indexer;
pub mod search_cursor;

pub use document_cache::{DocumentCache, DocumentId};
pub use finder::{SearchEngine, SearchMatch, SearchOptions};
pub use line_index::LineIndex;
pub use match_indexer::{MatchIndexer, MatchSpan};
pub use search_cursor::{
    scan_document_for_matches, LineMatchRanges, MatchInfo, MatchedLinePattern, MatchWithGroups,
    SearchCursor, SearchCursorUpdate, SearchQuery,
};
