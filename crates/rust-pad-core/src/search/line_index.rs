use anyhow::{bail, Result};

/// Prefix-sum table mapping char offsets to `{line, col}` positions and
/// back, independent of any particular [`TextBuffer`](crate::buffer::TextBuffer)
/// instance.
///
/// `cumulative[i]` holds the char offset one past the end of line `i`,
/// including its line separator (so `cumulative[i] - cumulative[i - 1]`
/// is the length of line `i` plus the separator). Built once per document
/// revision and reused by every lookup against that revision.
#[derive(Debug, Clone)]
pub struct LineIndex {
    cumulative: Vec<usize>,
    separator_len: usize,
    total_chars: usize,
}

impl LineIndex {
    /// Builds a line index from raw line lengths (in chars, not counting
    /// the separator) and the separator's char length (1 for `\n`/`\r`, 2
    /// for `\r\n`).
    pub fn from_line_lengths(line_lengths: &[usize], separator_len: usize) -> Self {
        let mut cumulative = Vec::with_capacity(line_lengths.len());
        let mut running = 0usize;
        for (i, &len) in line_lengths.iter().enumerate() {
            running += len;
            if i + 1 < line_lengths.len() {
                running += separator_len;
            }
            cumulative.push(running);
        }
        let total_chars = cumulative.last().copied().unwrap_or(0);
        Self {
            cumulative,
            separator_len,
            total_chars,
        }
    }

    /// Number of lines in the document (always at least 1, even for an
    /// empty document).
    pub fn line_count(&self) -> usize {
        self.cumulative.len().max(1)
    }

    /// Total char length of the document this index was built from.
    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    fn line_start(&self, line: usize) -> usize {
        if line == 0 {
            0
        } else {
            self.cumulative[line - 1]
        }
    }

    fn line_end_excluding_separator(&self, line: usize) -> usize {
        let end = self.cumulative.get(line).copied().unwrap_or(self.total_chars);
        if line + 1 < self.cumulative.len() {
            end.saturating_sub(self.separator_len)
        } else {
            end
        }
    }

    /// Converts a char offset into `{line, col}`, using `hint_line` as a
    /// starting point for the linear scan. A good hint (the line of the
    /// previous lookup) makes this effectively O(1); a bad one still
    /// terminates, just slower.
    ///
    /// # Errors
    ///
    /// Returns an error if `char_idx` is past the end of the document.
    pub fn pos_from_index(&self, char_idx: usize, hint_line: usize) -> Result<(usize, usize)> {
        if char_idx > self.total_chars {
            bail!(
                "char index {} out of bounds (document has {} chars)",
                char_idx,
                self.total_chars
            );
        }
        let mut line = hint_line.min(self.line_count() - 1);

        // Hint overshot: walk backward until char_idx is before this
        // line's end.
        while line > 0 && char_idx < self.line_start(line) {
            line -= 1;
        }
        // Hint undershot: walk forward until char_idx is within this
        // line's span (inclusive of the line's own end, for positions at
        // the very end of a line).
        while line + 1 < self.line_count() && char_idx >= self.cumulative[line] {
            line += 1;
        }

        let col = char_idx - self.line_start(line);
        Ok((line, col))
    }

    /// Converts `{line, col}` into a char offset. O(1) given the
    /// prefix-sum table.
    ///
    /// # Errors
    ///
    /// Returns an error if `line` is out of range or `col` extends past
    /// the line's own content (the separator is never addressable).
    pub fn index_from_pos(&self, line: usize, col: usize) -> Result<usize> {
        if line >= self.line_count() {
            bail!(
                "line {} out of bounds (document has {} lines)",
                line,
                self.line_count()
            );
        }
        let start = self.line_start(line);
        let max_col = self.line_end_excluding_separator(line) - start;
        if col > max_col {
            bail!(
                "column {} out of bounds on line {} (line has {} chars)",
                col,
                line,
                max_col
            );
        }
        Ok(start + col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // "abc\ndef\nabc" — three lines of 3 chars, LF separators.
    fn sample() -> LineIndex {
        LineIndex::from_line_lengths(&[3, 3, 3], 1)
    }

    #[test]
    fn test_total_chars_and_line_count() {
        let idx = sample();
        assert_eq!(idx.line_count(), 3);
        assert_eq!(idx.total_chars(), 11); // 3+1+3+1+3
    }

    #[test]
    fn test_pos_from_index_start_of_each_line() {
        let idx = sample();
        assert_eq!(idx.pos_from_index(0, 0).unwrap(), (0, 0));
        assert_eq!(idx.pos_from_index(4, 0).unwrap(), (1, 0));
        assert_eq!(idx.pos_from_index(8, 0).unwrap(), (2, 0));
    }

    #[test]
    fn test_index_from_pos_matches_expected_offsets() {
        let idx = sample();
        assert_eq!(idx.index_from_pos(0, 0).unwrap(), 0);
        assert_eq!(idx.index_from_pos(2, 0).unwrap(), 8);
        assert_eq!(idx.index_from_pos(2, 3).unwrap(), 11);
    }

    #[test]
    fn test_pos_from_index_roundtrip() {
        let idx = sample();
        for offset in 0..=idx.total_chars() {
            let (line, col) = idx.pos_from_index(offset, 0).unwrap();
            assert_eq!(idx.index_from_pos(line, col).unwrap(), offset);
        }
    }

    #[test]
    fn test_pos_from_index_hint_overshoots_corrects_backward() {
        let idx = sample();
        // Hint says line 2, actual offset is on line 0.
        assert_eq!(idx.pos_from_index(1, 2).unwrap(), (0, 1));
    }

    #[test]
    fn test_pos_from_index_hint_undershoots_corrects_forward() {
        let idx = sample();
        // Hint says line 0, actual offset is on line 2.
        assert_eq!(idx.pos_from_index(9, 0).unwrap(), (2, 1));
    }

    #[test]
    fn test_pos_from_index_out_of_bounds() {
        let idx = sample();
        assert!(idx.pos_from_index(100, 0).is_err());
    }

    #[test]
    fn test_index_from_pos_out_of_bounds_line() {
        let idx = sample();
        assert!(idx.index_from_pos(10, 0).is_err());
    }

    #[test]
    fn test_index_from_pos_out_of_bounds_col() {
        let idx = sample();
        assert!(idx.index_from_pos(0, 100).is_err());
    }

    #[test]
    fn test_crlf_separator() {
        // "ab\r\ncd" — two lines of 2 chars, CRLF separator.
        let idx = LineIndex::from_line_lengths(&[2, 2], 2);
        assert_eq!(idx.total_chars(), 6);
        assert_eq!(idx.index_from_pos(1, 0).unwrap(), 4);
        assert_eq!(idx.pos_from_index(4, 0).unwrap(), (1, 0));
    }

    #[test]
    fn test_single_line_document() {
        let idx = LineIndex::from_line_lengths(&[5], 1);
        assert_eq!(idx.line_count(), 1);
        assert_eq!(idx.pos_from_index(5, 0).unwrap(), (0, 5));
    }

    #[test]
    fn test_empty_document() {
        let idx = LineIndex::from_line_lengths(&[], 1);
        assert_eq!(idx.line_count(), 1);
        assert_eq!(idx.total_chars(), 0);
        assert_eq!(idx.pos_from_index(0, 0).unwrap(), (0, 0));
    }
}
