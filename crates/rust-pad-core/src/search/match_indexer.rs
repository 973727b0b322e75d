use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::buffer::TextBuffer;
use crate::search::group_array::GroupArray;
use crate::search::line_index::LineIndex;

/// A match's char-offset span, recovered from a [`MatchIndexer`] group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

/// Builds and queries a match table over one document revision.
///
/// Matches are stored in one [`GroupArray`] of `(start, end)` char offsets,
/// always in ascending order by `start` — this is what lets every lookup
/// other than a full rebuild be a binary search instead of a linear scan.
/// Building runs the cursor-relative two-phase scan described on
/// [`scan`](Self::scan), then seeds the table's current-group cursor with an
/// O(log n) binary search.
#[derive(Debug, Clone)]
pub struct MatchIndexer {
    table: GroupArray,
    truncated: bool,
}

impl MatchIndexer {
    /// Scans `buffer` for matches of `regex` using the cursor-relative
    /// two-phase scan: a primary pass runs forward from `anchor_char` to the
    /// end of the document, then (if `anchor_char > 0` and the primary pass
    /// hasn't exhausted `max_results`) a secondary pass runs from the start
    /// of the document up to `anchor_char`. The two tables are joined —
    /// deduplicating a match that straddles the join exactly at
    /// `anchor_char` — so the final table is in ascending document order,
    /// but when `max_results` truncates the scan the matches kept are the
    /// ones nearest the caller's starting position rather than an arbitrary
    /// prefix of the document.
    ///
    /// # Errors
    ///
    /// Returns an error if `anchor_char` is out of bounds for `buffer`.
    pub fn scan(
        buffer: &TextBuffer,
        regex: &Regex,
        anchor_char: usize,
        max_results: Option<usize>,
    ) -> Result<Self> {
        let text = buffer.to_string();
        let anchor_byte = buffer
            .char_to_byte(anchor_char)
            .context("anchor position outside buffer")?;

        let (mut primary, primary_truncated) =
            Self::scan_range(buffer, &text, regex, anchor_byte, None, max_results)?;

        let mut truncated = primary_truncated;
        let table = if anchor_byte > 0 && !primary_truncated {
            let remaining = max_results.map(|limit| limit.saturating_sub(primary.item_count()));
            if remaining != Some(0) {
                let (mut secondary, secondary_truncated) =
                    Self::scan_range(buffer, &text, regex, 0, Some(anchor_byte), remaining)?;
                truncated = truncated || secondary_truncated;

                // The join edge: a zero-width match sitting exactly at
                // anchor_byte can be found by both passes (the primary pass
                // starts its search there, and the secondary pass's own
                // scan may land on the same empty span just before its
                // start-offset cutoff). Drop the duplicate before joining.
                if let (Some(first), Some(last)) = (primary.group(0), secondary.group(secondary.item_count().wrapping_sub(1))) {
                    if first == last {
                        secondary.pop_last_group();
                    }
                }

                secondary.extend_from(&primary);
                secondary
            } else {
                // No budget left for a secondary pass; the primary table
                // already holds exactly `max_results` matches.
                primary
            }
        } else {
            std::mem::take(&mut primary)
        };

        if truncated {
            debug!(limit = ?max_results, "match scan truncated");
        }

        // Seed the cursor at the first match at or after anchor_char (the
        // start of the primary pass) via binary search over the joined
        // table, now that it's in strict ascending order.
        let item_count = table.item_count();
        let mut indexer = Self { table, truncated };
        let seed = indexer.lower_bound(u32::try_from(anchor_char).unwrap_or(u32::MAX));
        indexer
            .table
            .set_current_group(if seed < item_count { Some(seed) } else { None });
        Ok(indexer)
    }

    /// Runs a single forward pass of `regex` over `text`, starting at byte
    /// offset `start_byte` and stopping once a match would start at or past
    /// `end_byte_cap` (if given) or the table reaches `budget` groups.
    /// Returns the collected table and whether `budget` cut it short.
    fn scan_range(
        buffer: &TextBuffer,
        text: &str,
        regex: &Regex,
        start_byte: usize,
        end_byte_cap: Option<usize>,
        budget: Option<usize>,
    ) -> Result<(GroupArray, bool)> {
        let mut table = GroupArray::with_capacity(budget.unwrap_or(256).min(text.len()));
        let mut truncated = false;
        let mut byte_pos = start_byte;

        while byte_pos <= text.len() {
            if let Some(limit) = budget {
                if table.item_count() >= limit {
                    truncated = true;
                    break;
                }
            }

            let Some(m) = regex.find_at(text, byte_pos) else {
                break;
            };

            if let Some(cap) = end_byte_cap {
                if m.start() >= cap {
                    break;
                }
            }

            let char_start = buffer
                .byte_to_char(m.start())
                .context("match start outside buffer")?;
            let char_end = buffer
                .byte_to_char(m.end())
                .context("match end outside buffer")?;

            table.push_group(
                u32::try_from(char_start).context("document too large to index")?,
                u32::try_from(char_end).context("document too large to index")?,
            );

            byte_pos = if m.end() > m.start() {
                m.end()
            } else {
                // Zero-width match: advance by one full UTF-8 char so we
                // don't loop forever re-matching the same empty span.
                m.end()
                    + text[m.end()..]
                        .chars()
                        .next()
                        .map(char::len_utf8)
                        .unwrap_or(1)
            };
        }

        Ok((table, truncated))
    }

    /// Number of matches in the table.
    pub fn item_count(&self) -> usize {
        self.table.item_count()
    }

    /// True if `max_results` cut the scan short.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// The match at table index `k`.
    pub fn get(&self, k: usize) -> Option<MatchSpan> {
        self.table
            .group(k)
            .map(|(s, e)| MatchSpan { start: s as usize, end: e as usize })
    }

    /// The table's current cursor index, if any.
    pub fn current_index(&self) -> Option<usize> {
        self.table.current_group_index()
    }

    /// Moves the cursor to table index `k` directly.
    pub fn set_current_index(&mut self, k: Option<usize>) {
        self.table.set_current_group(k);
    }

    /// Advances the cursor, wrapping past the end to `None`.
    pub fn advance(&mut self) -> Option<usize> {
        self.table.next_group_index()
    }

    /// Steps the cursor back, wrapping past the start to `None`.
    pub fn retreat(&mut self) -> Option<usize> {
        self.table.prev_group_index()
    }

    /// Lowest table index whose match starts at or after `pos` (standard
    /// binary-search lower bound). Returns `item_count()` if every match
    /// starts before `pos`.
    fn lower_bound(&self, pos: u32) -> usize {
        let mut lo = 0usize;
        let mut hi = self.item_count();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let (start, _) = self.table.group(mid).expect("mid within bounds");
            if start < pos {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Index of the first match starting at or after `pos`, or `None` if
    /// there isn't one. Matches the "find next" convention: an exact hit
    /// at `pos` counts.
    pub fn next_index_at_or_after(&self, pos: usize) -> Option<usize> {
        if self.item_count() == 0 {
            return None;
        }
        let pos = u32::try_from(pos).unwrap_or(u32::MAX);
        let idx = self.lower_bound(pos);
        (idx < self.item_count()).then_some(idx)
    }

    /// Index of the last match starting strictly before `pos`, or `None`.
    /// Matches the "find previous" convention: an exact hit at `pos` does
    /// NOT count, since the cursor is presumed to already be sitting on it.
    pub fn prev_index_strictly_before(&self, pos: usize) -> Option<usize> {
        if self.item_count() == 0 {
            return None;
        }
        let pos = u32::try_from(pos).unwrap_or(u32::MAX);
        let idx = self.lower_bound(pos);
        (idx > 0).then(|| idx - 1)
    }

    /// Index of the match nearest `pos`: an exact hit at `pos` always wins;
    /// otherwise the nearest match before `pos` if `prefer_before`, else the
    /// nearest at or after. Used to reseed a cursor that was moved to an
    /// arbitrary position with no "current" match of its own.
    pub fn find_result_index_near_pos(&self, pos: usize, prefer_before: bool) -> Option<usize> {
        if self.item_count() == 0 {
            return None;
        }
        let pos_u32 = u32::try_from(pos).unwrap_or(u32::MAX);
        let idx = self.lower_bound(pos_u32);
        if idx < self.item_count() {
            if let Some((start, _)) = self.table.group(idx) {
                if start == pos_u32 {
                    return Some(idx);
                }
            }
        }
        if prefer_before {
            (idx > 0).then(|| idx - 1)
        } else {
            (idx < self.item_count()).then_some(idx)
        }
    }

    /// Invokes `f` with every match whose span intersects `[range_start,
    /// range_end)`, in ascending order.
    pub fn for_each_match_within_range(
        &self,
        range_start: usize,
        range_end: usize,
        mut f: impl FnMut(usize, MatchSpan),
    ) {
        let start = self.lower_bound(u32::try_from(range_start).unwrap_or(0));
        for k in start..self.item_count() {
            let Some(span) = self.get(k) else { break };
            if span.start >= range_end {
                break;
            }
            f(k, span);
        }
    }

    /// Marks, for each of `buckets` equal-sized runs of document lines,
    /// whether any match's start line falls within it — a minimap-style
    /// presence overview rather than a density histogram. `lines_per_bucket
    /// = line_index.line_count() / buckets` (at least 1); a match on line
    /// `l` sets `out[l / lines_per_bucket]` (clamped to the last bucket).
    pub fn fill_pattern(&self, line_index: &LineIndex, buckets: usize) -> Vec<u32> {
        let mut present = vec![0u32; buckets.max(1)];
        if buckets == 0 {
            return present;
        }
        let lines_per_bucket = (line_index.line_count() / buckets).max(1);
        let mut hint_line = 0usize;
        for (start, _) in self.table.iter() {
            let Ok((line, _)) = line_index.pos_from_index(start as usize, hint_line) else {
                continue;
            };
            hint_line = line;
            let bucket = (line / lines_per_bucket).min(buckets - 1);
            present[bucket] = 1;
        }
        present
    }
}
