/// Search engine supporting plain text and regex search with match highlighting.
use anyhow::{Context, Result};
use regex::Regex;

use crate::buffer::TextBuffer;
use crate::search::match_indexer::MatchIndexer;

/// A single search match in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    /// Start char index in the buffer.
    pub start: usize,
    /// End char index in the buffer (exclusive).
    pub end: usize,
    /// 0-indexed line number where the match starts.
    pub line: usize,
}

/// Search configuration options.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// The search query string.
    pub query: String,
    /// Whether to use regex search.
    pub use_regex: bool,
    /// Whether search is case-sensitive.
    pub case_sensitive: bool,
    /// Whether to match whole words only.
    pub whole_word: bool,
}

/// The search engine for finding text in a buffer.
///
/// Matches are held in a [`MatchIndexer`] (a binary-searchable table, not a
/// bare `Vec` scan) and materialized into `matches` as a convenience view
/// for callers that just want to iterate or index by position.
#[derive(Debug)]
pub struct SearchEngine {
    /// Compiled regex pattern (cached).
    compiled: Option<Regex>,
    /// The options used to compile the current regex.
    compiled_for: Option<String>,
    /// Binary-searchable match table backing `matches`.
    indexer: Option<MatchIndexer>,
    /// All matches found.
    pub matches: Vec<SearchMatch>,
    /// Index of the current/active match.
    pub current_match: Option<usize>,
    /// Content version when matches were last computed (for cache invalidation).
    last_search_version: Option<u64>,
    /// Cache key combining query + options for the last search.
    last_search_key: Option<String>,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    /// Creates a new search engine.
    pub fn new() -> Self {
        Self {
            compiled: None,
            compiled_for: None,
            indexer: None,
            matches: Vec::new(),
            current_match: None,
            last_search_version: None,
            last_search_key: None,
        }
    }

    /// Builds a regex pattern from the search options.
    fn build_pattern(options: &SearchOptions) -> Result<Regex> {
        let mut pattern = if options.use_regex {
            options.query.clone()
        } else {
            regex::escape(&options.query)
        };

        if options.whole_word {
            pattern = format!(r"\b{pattern}\b");
        }

        let regex = if options.case_sensitive {
            Regex::new(&pattern)
        } else {
            Regex::new(&format!("(?i){pattern}"))
        };

        regex.context("invalid search pattern")
    }

    /// Finds all matches in the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn find_all(&mut self, buffer: &TextBuffer, options: &SearchOptions) -> Result<()> {
        self.find_all_versioned(buffer, options, None)
    }

    /// Finds all matches in the buffer, with optional version-based caching.
    ///
    /// When `content_version` is provided, skips re-searching if the version
    /// and query options haven't changed since the last call.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn find_all_versioned(
        &mut self,
        buffer: &TextBuffer,
        options: &SearchOptions,
        content_version: Option<u64>,
    ) -> Result<()> {
        if options.query.is_empty() {
            self.clear();
            return Ok(());
        }

        // Build/cache regex
        let cache_key = format!(
            "{}:{}:{}:{}",
            options.query, options.use_regex, options.case_sensitive, options.whole_word
        );

        // Check if we can reuse cached results
        if let Some(version) = content_version {
            if self.last_search_version == Some(version)
                && self.last_search_key.as_deref() == Some(&cache_key)
            {
                return Ok(());
            }
        }

        if self.compiled_for.as_deref() != Some(&cache_key) {
            self.compiled = Some(Self::build_pattern(options)?);
            self.compiled_for = Some(cache_key.clone());
        }

        let regex = match &self.compiled {
            Some(r) => r,
            None => return Ok(()),
        };

        let indexer = MatchIndexer::scan(buffer, regex, 0, None)?;

        self.matches = (0..indexer.item_count())
            .filter_map(|k| indexer.get(k))
            .map(|span| {
                let line = buffer.char_to_line(span.start).unwrap_or(0);
                SearchMatch {
                    start: span.start,
                    end: span.end,
                    line,
                }
            })
            .collect();
        self.current_match = if self.matches.is_empty() { None } else { Some(0) };
        self.indexer = Some(indexer);

        // Store cache key
        self.last_search_version = content_version;
        self.last_search_key = Some(cache_key);

        Ok(())
    }

    /// Moves to the next match at or after the given cursor position.
    /// Returns the match index.
    pub fn find_next(&mut self, cursor_char_idx: usize) -> Option<usize> {
        let indexer = self.indexer.as_ref()?;
        if indexer.item_count() == 0 {
            return None;
        }
        // Using at-or-after because after selecting a match the cursor sits
        // at mat.end, and the very next match may start at that same char
        // offset.
        let idx = indexer.next_index_at_or_after(cursor_char_idx).unwrap_or(0);
        self.current_match = Some(idx);
        Some(idx)
    }

    /// Moves to the previous match before the given cursor position.
    /// Returns the match index.
    pub fn find_prev(&mut self, cursor_char_idx: usize) -> Option<usize> {
        let indexer = self.indexer.as_ref()?;
        let count = indexer.item_count();
        if count == 0 {
            return None;
        }
        let idx = indexer
            .prev_index_strictly_before(cursor_char_idx)
            .unwrap_or(count - 1);
        self.current_match = Some(idx);
        Some(idx)
    }

    /// Replaces the current match with the replacement text.
    /// Returns true if a replacement was made.
    pub fn replace_current(
        &mut self,
        buffer: &mut TextBuffer,
        replacement: &str,
        options: &SearchOptions,
    ) -> Result<bool> {
        let idx = match self.current_match {
            Some(idx) if idx < self.matches.len() => idx,
            _ => return Ok(false),
        };

        let mat = &self.matches[idx];
        let start = mat.start;
        let end = mat.end;

        let actual_replacement = if options.use_regex {
            if let Some(ref regex) = self.compiled {
                let matched_text = buffer.slice(start, end)?.to_string();
                regex.replace(&matched_text, replacement).into_owned()
            } else {
                replacement.to_string()
            }
        } else {
            replacement.to_string()
        };

        buffer
            .replace(start, end, &actual_replacement)
            .context("failed to replace match")?;

        // Re-search to update match positions
        self.find_all(buffer, options)?;

        Ok(true)
    }

    /// Replaces all matches with the replacement text.
    /// Returns the number of replacements made.
    pub fn replace_all(
        &mut self,
        buffer: &mut TextBuffer,
        replacement: &str,
        options: &SearchOptions,
    ) -> Result<usize> {
        if self.matches.is_empty() {
            return Ok(0);
        }

        // Replace from end to start to preserve positions
        let count = self.matches.len();
        for mat in self.matches.iter().rev() {
            let actual_replacement = if options.use_regex {
                if let Some(ref regex) = self.compiled {
                    let matched_text = buffer.slice(mat.start, mat.end)?.to_string();
                    regex.replace(&matched_text, replacement).into_owned()
                } else {
                    replacement.to_string()
                }
            } else {
                replacement.to_string()
            };

            buffer.replace(mat.start, mat.end, &actual_replacement)?;
        }

        self.matches.clear();
        self.current_match = None;
        self.indexer = None;

        Ok(count)
    }

    /// Returns the total number of matches.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Clears all search state.
    pub fn clear(&mut self) {
        self.matches.clear();
        self.current_match = None;
        self.indexer = None;
        self.compiled = None;
        self.compiled_for = None;
        self.last_search_version = None;
        self.last_search_key = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_all_plain() {
        let buf = TextBuffer::from("hello world hello");
        let mut engine = SearchEngine::new();
        let opts = SearchOptions {
            query: "hello".to_string(),
            ..Default::default()
        };
        engine.find_all(&buf, &opts).unwrap();
        assert_eq!(engine.match_count(), 2);
        assert_eq!(engine.matches[0].start, 0);
        assert_eq!(engine.matches[0].end, 5);
        assert_eq!(engine.matches[1].start, 12);
        assert_eq!(engine.matches[1].end, 17);
    }

    #[test]
    fn test_find_all_case_insensitive() {
        let buf = TextBuffer::from("Hello HELLO hello");
        let mut engine = SearchEngine::new();
        let opts = SearchOptions {
            query: "hello".to_string(),
            case_sensitive: false,
            ..Default::default()
        };
        engine.find_all(&buf, &opts).unwrap();
        assert_eq!(engine.match_count(), 3);
    }

    #[test]
    fn test_find_all_case_sensitive() {
        let buf = TextBuffer::from("Hello HELLO hello");
        let mut engine = SearchEngine::new();
        let opts = SearchOptions {
            query: "hello".to_string(),
            case_sensitive: true,
            ..Default::default()
        };
        engine.find_all(&buf, &opts).unwrap();
        assert_eq!(engine.match_count(), 1);
        assert_eq!(engine.matches[0].start, 12);
    }

    #[test]
    fn test_find_all_regex() {
        let buf = TextBuffer::from("foo123 bar456 baz");
        let mut engine = SearchEngine::new();
        let opts = SearchOptions {
            query: r"\d+".to_string(),
            use_regex: true,
            ..Default::default()
        };
        engine.find_all(&buf, &opts).unwrap();
        assert_eq!(engine.match_count(), 2);
        assert_eq!(engine.matches[0].start, 3);
        assert_eq!(engine.matches[1].start, 10);
    }

    #[test]
    fn test_find_all_whole_word() {
        let buf = TextBuffer::from("cat category cat");
        let mut engine = SearchEngine::new();
        let opts = SearchOptions {
            query: "cat".to_string(),
            whole_word: true,
            ..Default::default()
        };
        engine.find_all(&buf, &opts).unwrap();
        assert_eq!(engine.match_count(), 2);
        assert_eq!(engine.matches[0].start, 0);
        assert_eq!(engine.matches[1].start, 13);
    }

    #[test]
    fn test_find_all_empty_query_clears() {
        let buf = TextBuffer::from("aaa");
        let mut engine = SearchEngine::new();
        let opts = SearchOptions {
            query: "aaa".to_string(),
            ..Default::default()
        };
        engine.find_all(&buf, &opts).unwrap();
        assert_eq!(engine.match_count(), 1);

        let empty_opts = SearchOptions::default();
        engine.find_all(&buf, &empty_opts).unwrap();
        assert_eq!(engine.match_count(), 0);
        assert_eq!(engine.current_match, None);
    }

    #[test]
    fn test_find_all_versioned_skips_rescan() {
        let buf = TextBuffer::from("hello hello");
        let mut engine = SearchEngine::new();
        let opts = SearchOptions {
            query: "hello".to_string(),
            ..Default::default()
        };
        engine.find_all_versioned(&buf, &opts, Some(1)).unwrap();
        assert_eq!(engine.match_count(), 2);

        // Same version + same options: should be a no-op (still 2 matches).
        engine.find_all_versioned(&buf, &opts, Some(1)).unwrap();
        assert_eq!(engine.match_count(), 2);
    }

    #[test]
    fn test_find_next_visits_all_adjacent_matches() {
        let buf = TextBuffer::from("aaaa");
        let mut engine = SearchEngine::new();
        let opts = SearchOptions {
            query: "aa".to_string(),
            ..Default::default()
        };
        engine.find_all(&buf, &opts).unwrap();
        assert_eq!(engine.match_count(), 2);
        assert_eq!(engine.find_next(0), Some(0));
        assert_eq!(engine.find_next(2), Some(1));
        assert_eq!(engine.find_next(4), Some(0)); // wraps
    }

    #[test]
    fn test_find_prev_visits_all_matches_backward() {
        let buf = TextBuffer::from("asd xxx asd xxx asd");
        let mut engine = SearchEngine::new();
        let opts = SearchOptions {
            query: "asd".to_string(),
            ..Default::default()
        };
        engine.find_all(&buf, &opts).unwrap();
        assert_eq!(engine.match_count(), 3);

        let start = engine.matches[2].start;
        let mut visited = Vec::new();
        let mut cursor = start;
        for _ in 0..3 {
            let idx = engine.find_prev(cursor).unwrap();
            visited.push(idx);
            cursor = engine.matches[idx].start;
        }
        assert_eq!(visited, vec![1, 0, 2]);
    }

    #[test]
    fn test_replace_current() {
        let buf_text = "hi world hi";
        let mut buf = TextBuffer::from(buf_text);
        let mut engine = SearchEngine::new();
        let opts = SearchOptions {
            query: "hi".to_string(),
            ..Default::default()
        };
        engine.find_all(&buf, &opts).unwrap();
        engine.current_match = Some(0);
        let replaced = engine.replace_current(&mut buf, "hello", &opts).unwrap();
        assert!(replaced);
        assert_eq!(buf.to_string(), "hello world hi");
    }

    #[test]
    fn test_replace_all() {
        let mut buf = TextBuffer::from("hi world hi");
        let mut engine = SearchEngine::new();
        let opts = SearchOptions {
            query: "hi".to_string(),
            ..Default::default()
        };
        engine.find_all(&buf, &opts).unwrap();
        let count = engine.replace_all(&mut buf, "yo", &opts).unwrap();
        assert_eq!(count, 2);
        assert_eq!(buf.to_string(), "yo world yo");
    }

    #[test]
    fn test_clear() {
        let buf = TextBuffer::from("line1 line1");
        let mut engine = SearchEngine::new();
        let opts = SearchOptions {
            query: "line1".to_string(),
            ..Default::default()
        };
        engine.find_all(&buf, &opts).unwrap();
        assert_eq!(engine.match_count(), 2);
        engine.clear();
        assert_eq!(engine.match_count(), 0);
        assert_eq!(engine.current_match, None);
    }

    #[test]
    fn test_find_next_on_empty_matches() {
        let buf = TextBuffer::from("xyz");
        let mut engine = SearchEngine::new();
        let opts = SearchOptions {
            query: "asd".to_string(),
            ..Default::default()
        };
        engine.find_all(&buf, &opts).unwrap();
        assert_eq!(engine.find_next(0), None);
        assert_eq!(engine.find_prev(0), None);
    }
}
