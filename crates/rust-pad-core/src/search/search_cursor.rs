use anyhow::{Context, Result};
use regex::Regex;
use tracing::trace;

use crate::document::Document;
use crate::search::document_cache::{DocumentCache, DocumentId};
use crate::search::line_index::LineIndex;
use crate::search::match_indexer::MatchIndexer;
use crate::search::SearchOptions;

/// A search query, already normalized to a regex source and a
/// case-sensitivity flag. Build with [`literal`](Self::literal) or
/// [`regex`](Self::regex), then refine with
/// [`whole_word`](Self::whole_word)/[`case_insensitive`](Self::case_insensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pattern: String,
    case_sensitive: bool,
}

impl SearchQuery {
    /// A plain-text query: every regex metacharacter in `text` is escaped.
    pub fn literal(text: &str) -> Self {
        Self {
            pattern: regex::escape(text),
            case_sensitive: true,
        }
    }

    /// A query whose source is already a regex pattern.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            case_sensitive: true,
        }
    }

    /// Wraps the pattern in word boundaries.
    #[must_use]
    pub fn whole_word(mut self) -> Self {
        self.pattern = format!(r"\b{}\b", self.pattern);
        self
    }

    /// Marks the query case-insensitive.
    #[must_use]
    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    /// Builds a query from the UI-facing [`SearchOptions`].
    pub fn from_options(options: &SearchOptions) -> Self {
        let mut query = if options.use_regex {
            Self::regex(options.query.clone())
        } else {
            Self::literal(&options.query)
        };
        if options.whole_word {
            query = query.whole_word();
        }
        if !options.case_sensitive {
            query = query.case_insensitive();
        }
        query
    }

    fn compile(&self) -> Result<Regex> {
        let source = if self.case_sensitive {
            self.pattern.clone()
        } else {
            format!("(?i){}", self.pattern)
        };
        Regex::new(&source).context("invalid search pattern")
    }
}

/// A fully resolved match: table index plus its position in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchInfo {
    /// Index of this match within the cursor's current table.
    pub index: usize,
    /// Start char offset.
    pub start: usize,
    /// End char offset (exclusive).
    pub end: usize,
    /// 0-indexed line the match starts on.
    pub line: usize,
    /// 0-indexed column the match starts at.
    pub col: usize,
}

/// A resolved match plus its capture groups, recovered by re-running the
/// regex at the match's stored start offset. Capture text isn't kept in
/// the match table itself (that would multiply its memory cost by however
/// many groups the pattern has), so this is only computed on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchWithGroups {
    pub info: MatchInfo,
    /// One entry per capturing group (not counting group 0, the whole
    /// match); `None` where a group didn't participate in the match.
    pub groups: Vec<Option<String>>,
}

/// Per-line highlight ranges, for rendering match decorations on one line
/// without re-running the whole query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatchRanges {
    pub line: usize,
    /// `(start_col, end_col)` pairs, in ascending order, for matches whose
    /// span touches this line.
    pub ranges: Vec<(usize, usize)>,
}

/// Minimap-style overview: for `buckets.len()` equal-sized runs of document
/// lines, whether any match starts within that run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedLinePattern {
    pub lines_per_bucket: usize,
    pub buckets: Vec<u32>,
}

/// Outcome of a [`SearchCursor::refresh`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchCursorUpdate {
    /// The match table was rebuilt (query, document, or revision changed).
    pub rescanned: bool,
    /// Total matches in the (possibly just rebuilt) table.
    pub match_count: usize,
    /// True if the scan stopped early because of a result cap.
    pub truncated: bool,
}

/// A stateful, navigable search session against one document.
///
/// Tracks which document and revision its match table was built from, and
/// only rescans when either changes (`resultsCurrent`) — everything else
/// (advancing, retreating, reading the current match) is an O(log n) table
/// lookup, not a rescan. `current_position`/`at_occurrence` remember where
/// the cursor last landed, so a caller can mutate the document, move the
/// caret, or close and reopen the find bar without losing its place.
#[derive(Debug, Default)]
pub struct SearchCursor {
    doc_id: Option<DocumentId>,
    revision: Option<u64>,
    query: Option<SearchQuery>,
    indexer: Option<MatchIndexer>,
    line_index: Option<LineIndex>,
    max_results: Option<usize>,
    current_position: Option<usize>,
    at_occurrence: bool,
}

impl SearchCursor {
    /// Creates an empty cursor with no document or query bound yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds this cursor to `doc` and `query`, and optionally seeds
    /// `position` (a char offset) as the next search's starting point.
    /// Forces a rescan on the next [`refresh`](Self::refresh)/
    /// [`find`](Self::find) call, even if the document's revision hasn't
    /// changed, since the query itself has. `at_occurrence` always resets
    /// to false: rebinding never leaves the cursor "on" a stale match.
    pub fn set_search_document_and_query(
        &mut self,
        doc: &Document,
        query: SearchQuery,
        position: Option<usize>,
        max_results: Option<usize>,
    ) {
        self.doc_id = Some(doc.doc_id);
        self.revision = None;
        self.query = Some(query);
        self.indexer = None;
        self.line_index = None;
        self.max_results = max_results;
        self.current_position = position;
        self.at_occurrence = false;
    }

    /// True once a document and query have been bound.
    pub fn is_ready(&self) -> bool {
        self.doc_id.is_some() && self.query.is_some()
    }

    fn line_index_for(doc: &Document) -> Result<LineIndex> {
        let sep_len = doc.line_ending.as_str().chars().count();
        let mut lengths = Vec::with_capacity(doc.buffer.len_lines());
        for line in 0..doc.buffer.len_lines() {
            lengths.push(doc.buffer.line_len_chars(line)?);
        }
        Ok(LineIndex::from_line_lengths(&lengths, sep_len))
    }

    /// Lazily rebuilds the match table and line index from `doc` if the
    /// document identity and revision haven't changed since the last call
    /// (`resultsCurrent`); otherwise a no-op that just reports the current
    /// count.
    ///
    /// # Errors
    ///
    /// Returns an error if `doc` isn't the document this cursor is bound
    /// to, or if the query fails to compile.
    pub fn refresh(&mut self, doc: &Document) -> Result<SearchCursorUpdate> {
        let bound_id = self.doc_id.context("search cursor has no bound document")?;
        if bound_id != doc.doc_id {
            anyhow::bail!("search cursor is bound to a different document");
        }

        if self.revision == Some(doc.content_version) && self.indexer.is_some() {
            trace!(
                revision = doc.content_version,
                "search cursor results current, skipping rescan"
            );
            return Ok(SearchCursorUpdate {
                rescanned: false,
                match_count: self.indexer.as_ref().map_or(0, MatchIndexer::item_count),
                truncated: self.indexer.as_ref().is_some_and(MatchIndexer::is_truncated),
            });
        }

        let anchor = self.current_position.unwrap_or(0);
        self.force_scan(doc, anchor)
    }

    /// Forces a scan regardless of `resultsCurrent`, seeding the table's
    /// cursor near `anchor_char`.
    fn force_scan(&mut self, doc: &Document, anchor_char: usize) -> Result<SearchCursorUpdate> {
        let query = self
            .query
            .as_ref()
            .context("search cursor has no query bound")?;
        let regex = query.compile()?;

        let line_index = if let Some(cached) = DocumentCache::get(doc.doc_id, doc.content_version)
        {
            cached
        } else {
            let built = Self::line_index_for(doc)?;
            DocumentCache::put(doc.doc_id, doc.content_version, built.clone());
            built
        };

        let indexer = MatchIndexer::scan(&doc.buffer, &regex, anchor_char, self.max_results)?;
        let match_count = indexer.item_count();
        let truncated = indexer.is_truncated();

        self.indexer = Some(indexer);
        self.line_index = Some(line_index);
        self.revision = Some(doc.content_version);

        Ok(SearchCursorUpdate {
            rescanned: true,
            match_count,
            truncated,
        })
    }

    /// Forces a rescan of `doc` against the bound query, ignoring whether
    /// the results were already current. Returns the new match count.
    ///
    /// # Errors
    ///
    /// See [`refresh`](Self::refresh).
    pub fn scan_document_and_store_results_in_cursor(&mut self, doc: &Document) -> Result<u32> {
        let anchor = self.current_position.unwrap_or(0);
        let update = self.force_scan(doc, anchor)?;
        u32::try_from(update.match_count).context("match count overflowed u32")
    }

    fn resolve(&self, index: usize) -> Option<MatchInfo> {
        let indexer = self.indexer.as_ref()?;
        let line_index = self.line_index.as_ref()?;
        let span = indexer.get(index)?;
        let (line, col) = line_index.pos_from_index(span.start, 0).ok()?;
        Some(MatchInfo {
            index,
            start: span.start,
            end: span.end,
            line,
            col,
        })
    }

    /// The central navigation operation: lazy-refreshes against `doc`,
    /// then either seeds the cursor from `current_position` (or a document
    /// boundary, depending on `reverse`) if it isn't already sitting on a
    /// match, or steps to the next/previous match if it is. Hitting the
    /// end of the table clears `at_occurrence`/`current_position` so the
    /// next call reseeds from the boundary rather than staying stuck.
    ///
    /// # Errors
    ///
    /// See [`refresh`](Self::refresh).
    pub fn find(&mut self, doc: &Document, reverse: bool) -> Result<Option<MatchInfo>> {
        self.refresh(doc)?;

        if !self.at_occurrence {
            let seed = self.current_position.unwrap_or_else(|| {
                if reverse {
                    self.line_index.as_ref().map_or(0, LineIndex::total_chars)
                } else {
                    0
                }
            });
            let Some(indexer) = self.indexer.as_mut() else {
                return Ok(None);
            };
            let Some(idx) = indexer.find_result_index_near_pos(seed, reverse) else {
                return Ok(None);
            };
            indexer.set_current_index(Some(idx));
            let info = self.resolve(idx);
            self.current_position = info.map(|m| m.start);
            self.at_occurrence = info.is_some();
            return Ok(info);
        }

        let indexer = self
            .indexer
            .as_mut()
            .context("search cursor has no results")?;
        let stepped = if reverse { indexer.retreat() } else { indexer.advance() };
        match stepped {
            Some(idx) => {
                let info = self.resolve(idx);
                self.current_position = info.map(|m| m.start);
                Ok(info)
            }
            None => {
                self.at_occurrence = false;
                self.current_position = None;
                Ok(None)
            }
        }
    }

    /// Total matches in the current table, triggering a lazy refresh first.
    ///
    /// # Errors
    ///
    /// See [`refresh`](Self::refresh).
    pub fn get_match_count(&mut self, doc: &Document) -> Result<usize> {
        self.refresh(doc)?;
        Ok(self.indexer.as_ref().map_or(0, MatchIndexer::item_count))
    }

    /// 1-based position of the current match among all matches, or `None`
    /// if there is no current match. Does not trigger a refresh: a caller
    /// asking "where am I" shouldn't pay for or risk a rescan.
    pub fn get_current_match_number(&self) -> Option<u32> {
        let indexer = self.indexer.as_ref()?;
        let idx = indexer.current_index()?;
        u32::try_from(idx + 1).ok()
    }

    /// Advances to the next match, wrapping to the first after the last.
    pub fn advance(&mut self) -> Option<MatchInfo> {
        let idx = self.indexer.as_mut()?.advance();
        let info = idx.and_then(|i| self.resolve(i));
        self.at_occurrence = info.is_some();
        if let Some(m) = info {
            self.current_position = Some(m.start);
        }
        info
    }

    /// Steps back to the previous match, wrapping to the last before the first.
    pub fn retreat(&mut self) -> Option<MatchInfo> {
        let idx = self.indexer.as_mut()?.retreat();
        let info = idx.and_then(|i| self.resolve(i));
        self.at_occurrence = info.is_some();
        if let Some(m) = info {
            self.current_position = Some(m.start);
        }
        info
    }

    /// Returns the current match plus its capture groups, recovered by
    /// re-running the bound regex at the match's stored start offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails to compile or the stored offset
    /// no longer lies inside `doc`.
    pub fn get_full_info_for_current_match(
        &self,
        doc: &Document,
    ) -> Result<Option<MatchWithGroups>> {
        let Some(indexer) = self.indexer.as_ref() else {
            return Ok(None);
        };
        let Some(idx) = indexer.current_index() else {
            return Ok(None);
        };
        let Some(info) = self.resolve(idx) else {
            return Ok(None);
        };
        let query = self
            .query
            .as_ref()
            .context("search cursor has no query bound")?;
        let regex = query.compile()?;
        let groups = capture_groups_at(&regex, doc, info.start)?;
        Ok(Some(MatchWithGroups { info, groups }))
    }

    /// Invokes `f` with every match in the table, in ascending order,
    /// triggering a lazy refresh first.
    ///
    /// # Errors
    ///
    /// See [`refresh`](Self::refresh).
    pub fn for_each_match(&mut self, doc: &Document, mut f: impl FnMut(MatchInfo)) -> Result<()> {
        self.refresh(doc)?;
        let Some(indexer) = self.indexer.as_ref() else {
            return Ok(());
        };
        for i in 0..indexer.item_count() {
            if let Some(info) = self.resolve(i) {
                f(info);
            }
        }
        Ok(())
    }

    /// Invokes `f` with every match whose span touches `[range_start,
    /// range_end)`, in ascending order, triggering a lazy refresh first.
    ///
    /// # Errors
    ///
    /// See [`refresh`](Self::refresh).
    pub fn for_each_match_within_range(
        &mut self,
        doc: &Document,
        range_start: usize,
        range_end: usize,
        mut f: impl FnMut(MatchInfo),
    ) -> Result<()> {
        self.refresh(doc)?;
        let Some(indexer) = self.indexer.as_ref() else {
            return Ok(());
        };
        let mut resolved = Vec::new();
        indexer.for_each_match_within_range(range_start, range_end, |i, _| {
            if let Some(info) = self.resolve(i) {
                resolved.push(info);
            }
        });
        for info in resolved {
            f(info);
        }
        Ok(())
    }

    /// Builds the highlight ranges for one line from the current table,
    /// triggering a lazy refresh first.
    ///
    /// # Errors
    ///
    /// See [`refresh`](Self::refresh).
    pub fn matched_ranges_on_line(&mut self, doc: &Document, line: usize) -> Result<LineMatchRanges> {
        self.refresh(doc)?;
        let mut ranges = Vec::new();
        let Some(line_index) = self.line_index.as_ref() else {
            return Ok(LineMatchRanges { line, ranges });
        };
        let Ok(line_start) = line_index.index_from_pos(line, 0) else {
            return Ok(LineMatchRanges { line, ranges });
        };
        let line_end = line_index
            .index_from_pos(line + 1, 0)
            .unwrap_or_else(|_| line_index.total_chars());

        let Some(indexer) = self.indexer.as_ref() else {
            return Ok(LineMatchRanges { line, ranges });
        };
        indexer.for_each_match_within_range(line_start, line_end, |_, span| {
            let start_col = span.start.saturating_sub(line_start);
            let end_col = span.end.saturating_sub(line_start);
            ranges.push((start_col, end_col));
        });

        Ok(LineMatchRanges { line, ranges })
    }

    /// Minimap overview: marks, for `bucket_count` equal-sized runs of
    /// document lines, whether any match starts within that run.
    /// Triggers a lazy refresh first.
    ///
    /// # Errors
    ///
    /// See [`refresh`](Self::refresh).
    pub fn create_matched_line_pattern(
        &mut self,
        doc: &Document,
        bucket_count: usize,
    ) -> Result<MatchedLinePattern> {
        self.refresh(doc)?;
        let buckets = bucket_count.max(1);
        let (Some(indexer), Some(line_index)) = (self.indexer.as_ref(), self.line_index.as_ref())
        else {
            return Ok(MatchedLinePattern {
                lines_per_bucket: 1,
                buckets: vec![0; buckets],
            });
        };
        let lines_per_bucket = (line_index.line_count() / buckets).max(1);
        Ok(MatchedLinePattern {
            lines_per_bucket,
            buckets: indexer.fill_pattern(line_index, buckets),
        })
    }
}

/// Recovers capture groups for a match starting at `start_char` by
/// re-running `regex` at that offset. Returns an empty vec if the regex no
/// longer matches there (the document changed out from under the caller).
fn capture_groups_at(regex: &Regex, doc: &Document, start_char: usize) -> Result<Vec<Option<String>>> {
    let text = doc.buffer.to_string();
    let start_byte = doc
        .buffer
        .char_to_byte(start_char)
        .context("match start outside buffer")?;
    let Some(caps) = regex.captures_at(&text, start_byte) else {
        return Ok(Vec::new());
    };
    Ok((1..caps.len())
        .map(|i| caps.get(i).map(|m| m.as_str().to_string()))
        .collect())
}

/// Stateless, one-shot scan for every match of `query` in `doc`, without
/// binding a [`SearchCursor`] to it. Used where only a count or a fire-and-
/// forget enumeration is needed (e.g. searching every open tab for a
/// summary count) and keeping a cursor alive per document would be wasted
/// state.
///
/// Invokes `f` once per match (with its capture groups) in ascending
/// order, and returns the total number found (capped by `max_results` if
/// given).
///
/// # Errors
///
/// Returns an error if the query fails to compile.
pub fn scan_document_for_matches(
    doc: &Document,
    query: &SearchQuery,
    max_results: Option<usize>,
    mut f: impl FnMut(MatchWithGroups),
) -> Result<usize> {
    let regex = query.compile()?;
    let line_index = SearchCursor::line_index_for(doc)?;
    let indexer = MatchIndexer::scan(&doc.buffer, &regex, 0, max_results)?;

    for i in 0..indexer.item_count() {
        let Some(span) = indexer.get(i) else { continue };
        let (line, col) = line_index.pos_from_index(span.start, 0)?;
        let groups = capture_groups_at(&regex, doc, span.start)?;
        f(MatchWithGroups {
            info: MatchInfo {
                index: i,
                start: span.start,
                end: span.end,
                line,
                col,
            },
            groups,
        });
    }

    Ok(indexer.item_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn doc_with(text: &str) -> Document {
        let mut doc = Document::new();
        doc.buffer.insert(0, text).unwrap();
        doc
    }

    #[test]
    fn test_from_options_builds_whole_word_case_insensitive() {
        let options = SearchOptions {
            query: "foo".to_string(),
            use_regex: false,
            case_sensitive: false,
            whole_word: true,
        };
        let query = SearchQuery::from_options(&options);
        let regex = query.compile().unwrap();
        assert!(regex.is_match("a FOO b"));
        assert!(!regex.is_match("afoob"));
    }

    #[test]
    fn test_find_seeds_from_position_forward() {
        let doc = doc_with("asd xxx asd xxx asd");
        let mut cursor = SearchCursor::new();
        cursor.set_search_document_and_query(&doc, SearchQuery::literal("asd"), Some(9), None);
        let found = cursor.find(&doc, false).unwrap().unwrap();
        assert_eq!(found.start, 16);
        assert_eq!(cursor.get_match_count(&doc).unwrap(), 3);
    }

    #[test]
    fn test_find_seeds_from_document_start_with_no_position() {
        let doc = doc_with("asd xxx asd");
        let mut cursor = SearchCursor::new();
        cursor.set_search_document_and_query(&doc, SearchQuery::literal("asd"), None, None);
        let found = cursor.find(&doc, false).unwrap().unwrap();
        assert_eq!(found.start, 0);
    }

    #[test]
    fn test_find_reverse_seeds_from_document_end_with_no_position() {
        let doc = doc_with("asd xxx asd");
        let mut cursor = SearchCursor::new();
        cursor.set_search_document_and_query(&doc, SearchQuery::literal("asd"), None, None);
        let found = cursor.find(&doc, true).unwrap().unwrap();
        assert_eq!(found.start, 8);
    }

    #[test]
    fn test_find_steps_forward_once_at_occurrence() {
        let doc = doc_with("asd xxx asd xxx asd");
        let mut cursor = SearchCursor::new();
        cursor.set_search_document_and_query(&doc, SearchQuery::literal("asd"), None, None);
        assert_eq!(cursor.find(&doc, false).unwrap().unwrap().start, 0);
        assert_eq!(cursor.find(&doc, false).unwrap().unwrap().start, 8);
        assert_eq!(cursor.find(&doc, false).unwrap().unwrap().start, 16);
    }

    #[test]
    fn test_find_clears_state_on_wrap_then_reseeds() {
        let doc = doc_with("asd xxx asd");
        let mut cursor = SearchCursor::new();
        cursor.set_search_document_and_query(&doc, SearchQuery::literal("asd"), None, None);
        cursor.find(&doc, false).unwrap(); // 0
        cursor.find(&doc, false).unwrap(); // 8
        assert_eq!(cursor.find(&doc, false).unwrap(), None); // wraps, clears state
        // Next find reseeds from the boundary rather than staying stuck.
        assert_eq!(cursor.find(&doc, false).unwrap().unwrap().start, 0);
    }

    #[test]
    fn test_refresh_skips_rescan_when_revision_unchanged() {
        let doc = doc_with("abc abc");
        let mut cursor = SearchCursor::new();
        cursor.set_search_document_and_query(&doc, SearchQuery::literal("abc"), None, None);
        let first = cursor.refresh(&doc).unwrap();
        assert!(first.rescanned);
        let second = cursor.refresh(&doc).unwrap();
        assert!(!second.rescanned);
        assert_eq!(second.match_count, 2);
    }

    #[test]
    fn test_refresh_rescans_after_document_mutation() {
        let mut doc = doc_with("abc");
        let mut cursor = SearchCursor::new();
        cursor.set_search_document_and_query(&doc, SearchQuery::literal("abc"), None, None);
        cursor.refresh(&doc).unwrap();
        doc.buffer.insert(3, " abc").unwrap();
        doc.content_version = doc.content_version.wrapping_add(1);
        let update = cursor.refresh(&doc).unwrap();
        assert!(update.rescanned);
        assert_eq!(update.match_count, 2);
    }

    #[test]
    fn test_refresh_rejects_wrong_document() {
        let doc_a = doc_with("abc");
        let doc_b = doc_with("abc");
        let mut cursor = SearchCursor::new();
        cursor.set_search_document_and_query(&doc_a, SearchQuery::literal("abc"), None, None);
        cursor.refresh(&doc_a).unwrap();
        assert!(cursor.refresh(&doc_b).is_err());
    }

    #[test]
    fn test_matched_ranges_on_line_reports_column_ranges() {
        let doc = doc_with("abc\nabc abc\nabc");
        let mut cursor = SearchCursor::new();
        cursor.set_search_document_and_query(&doc, SearchQuery::literal("abc"), None, None);
        let pattern = cursor.matched_ranges_on_line(&doc, 1).unwrap();
        assert_eq!(pattern.ranges, vec![(0, 3), (4, 7)]);
    }

    #[test]
    fn test_create_matched_line_pattern_marks_bucket_presence() {
        let doc = doc_with("abc\n\n\n\n\nabc");
        let mut cursor = SearchCursor::new();
        cursor.set_search_document_and_query(&doc, SearchQuery::literal("abc"), None, None);
        let pattern = cursor.create_matched_line_pattern(&doc, 2).unwrap();
        assert_eq!(pattern.buckets, vec![1, 1]);
        assert_eq!(pattern.lines_per_bucket, 3);
    }

    #[test]
    fn test_get_full_info_for_current_match_recovers_capture_groups() {
        let doc = doc_with("name=alice");
        let mut cursor = SearchCursor::new();
        cursor.set_search_document_and_query(&doc, SearchQuery::regex(r"name=(\w+)"), None, None);
        cursor.find(&doc, false).unwrap();
        let full = cursor.get_full_info_for_current_match(&doc).unwrap().unwrap();
        assert_eq!(full.groups, vec![Some("alice".to_string())]);
    }

    #[test]
    fn test_scan_document_for_matches_counts_without_cursor() {
        let doc = doc_with("one two one");
        let query = SearchQuery::literal("one");
        let mut seen = Vec::new();
        let total =
            scan_document_for_matches(&doc, &query, None, |m| seen.push(m.info.start)).unwrap();
        assert_eq!(total, 2);
        assert_eq!(seen, vec![0, 8]);
    }

    #[test]
    fn test_scan_document_for_matches_reports_capture_groups() {
        let doc = doc_with("a=1 b=2");
        let query = SearchQuery::regex(r"(\w)=(\d)");
        let mut groups_seen = Vec::new();
        scan_document_for_matches(&doc, &query, None, |m| groups_seen.push(m.groups.clone()))
            .unwrap();
        assert_eq!(
            groups_seen,
            vec![
                vec![Some("a".to_string()), Some("1".to_string())],
                vec![Some("b".to_string()), Some("2".to_string())],
            ]
        );
    }

    #[test]
    fn test_get_current_match_number_is_one_based() {
        let doc = doc_with("a a a");
        let mut cursor = SearchCursor::new();
        cursor.set_search_document_and_query(&doc, SearchQuery::literal("a"), None, None);
        cursor.find(&doc, false).unwrap();
        assert_eq!(cursor.get_current_match_number(), Some(1));
        cursor.advance();
        assert_eq!(cursor.get_current_match_number(), Some(2));
    }

    #[test]
    fn test_max_results_truncates_and_reports_truncated() {
        // "aaa" searched for "a" with max_results=2: only the first two
        // matches are retained and the cap is surfaced via `truncated`.
        let doc = doc_with("aaa");
        let mut cursor = SearchCursor::new();
        cursor.set_search_document_and_query(&doc, SearchQuery::literal("a"), None, Some(2));
        let update = cursor.refresh(&doc).unwrap();
        assert!(update.truncated);
        assert_eq!(update.match_count, 2);
        assert_eq!(cursor.get_match_count(&doc).unwrap(), 2);
    }

    #[test]
    fn test_set_search_document_and_query_forces_rescan() {
        let doc = doc_with("foo bar foo");
        let mut cursor = SearchCursor::new();
        cursor.set_search_document_and_query(&doc, SearchQuery::literal("foo"), None, None);
        cursor.refresh(&doc).unwrap();
        assert_eq!(cursor.get_match_count(&doc).unwrap(), 2);

        // Rebinding to a new query on the same unchanged document must
        // force a rescan rather than reusing the stale table.
        cursor.set_search_document_and_query(&doc, SearchQuery::literal("bar"), None, None);
        let update = cursor.refresh(&doc).unwrap();
        assert!(update.rescanned);
        assert_eq!(update.match_count, 1);
    }

    #[test]
    fn test_set_search_document_and_query_resets_at_occurrence() {
        let doc = doc_with("foo bar foo");
        let mut cursor = SearchCursor::new();
        cursor.set_search_document_and_query(&doc, SearchQuery::literal("foo"), None, None);
        cursor.find(&doc, false).unwrap();
        assert_eq!(cursor.get_current_match_number(), Some(1));

        cursor.set_search_document_and_query(&doc, SearchQuery::literal("bar"), None, None);
        assert_eq!(cursor.get_current_match_number(), None);
    }

    #[test]
    fn test_for_each_match_triggers_refresh_before_stale_document_read() {
        let mut doc = doc_with("abc");
        let mut cursor = SearchCursor::new();
        cursor.set_search_document_and_query(&doc, SearchQuery::literal("abc"), None, None);
        cursor.refresh(&doc).unwrap();

        doc.buffer.insert(3, " abc").unwrap();
        doc.content_version = doc.content_version.wrapping_add(1);

        let mut seen = 0usize;
        cursor.for_each_match(&doc, |_| seen += 1).unwrap();
        assert_eq!(seen, 2);
    }
}
