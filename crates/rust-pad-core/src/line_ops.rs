/// Advanced line operations: sort, deduplicate, move, duplicate, case conversion.
use crate::buffer::TextBuffer;
use crate::indent::IndentStyle;
use anyhow::{Context, Result};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Sort options.
#[derive(Debug, Clone)]
pub struct SortOptions {
    pub order: SortOrder,
    pub case_sensitive: bool,
    pub numeric: bool,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            order: SortOrder::Ascending,
            case_sensitive: true,
            numeric: false,
        }
    }
}

/// Case conversion mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseConversion {
    Upper,
    Lower,
    TitleCase,
}

/// Reads lines from the buffer in the given range, stripping trailing newlines.
fn read_lines_trimmed(
    buffer: &TextBuffer,
    start_line: usize,
    end_line: usize,
) -> Result<Vec<String>> {
    (start_line..end_line)
        .map(|i| {
            buffer
                .line(i)
                .map(|l| l.to_string().trim_end_matches('\n').to_string())
        })
        .collect::<Result<Vec<_>>>()
}

/// Replaces lines in the buffer range with the given lines.
fn write_lines_back(
    buffer: &mut TextBuffer,
    start_line: usize,
    end_line: usize,
    lines: &[&str],
) -> Result<()> {
    let start_char = buffer.line_to_char(start_line)?;
    let end_char = if end_line < buffer.len_lines() {
        buffer.line_to_char(end_line)?
    } else {
        buffer.len_chars()
    };

    let new_text = lines.join("\n")
        + if end_line < buffer.len_lines() {
            "\n"
        } else {
            ""
        };

    buffer.replace(start_char, end_char, &new_text)?;
    Ok(())
}

/// Compares two strings using case-sensitive or case-insensitive ordering.
fn compare_strings(a: &str, b: &str, case_sensitive: bool) -> std::cmp::Ordering {
    if case_sensitive {
        a.cmp(b)
    } else {
        a.to_lowercase().cmp(&b.to_lowercase())
    }
}

/// Compares two lines according to the given sort options.
fn compare_lines(a: &str, b: &str, options: &SortOptions) -> std::cmp::Ordering {
    let base = if options.numeric {
        match (a.trim().parse::<f64>().ok(), b.trim().parse::<f64>().ok()) {
            (Some(an), Some(bn)) => an.partial_cmp(&bn).unwrap_or(std::cmp::Ordering::Equal),
            _ => compare_strings(a, b, options.case_sensitive),
        }
    } else {
        compare_strings(a, b, options.case_sensitive)
    };

    match options.order {
        SortOrder::Ascending => base,
        SortOrder::Descending => base.reverse(),
    }
}

/// Sorts lines in the given range.
///
/// # Errors
///
/// Returns an error if the line range is out of bounds.
pub fn sort_lines(
    buffer: &mut TextBuffer,
    start_line: usize,
    end_line: usize,
    options: &SortOptions,
) -> Result<()> {
    if end_line > buffer.len_lines() {
        anyhow::bail!("end_line {} out of bounds", end_line);
    }
    if start_line >= end_line {
        return Ok(());
    }

    let mut lines = read_lines_trimmed(buffer, start_line, end_line)
        .context("failed to read lines for sorting")?;

    lines.sort_by(|a, b| compare_lines(a, b, options));

    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    write_lines_back(buffer, start_line, end_line, &refs)?;
    Ok(())
}

/// Removes consecutive duplicate lines in the given range.
pub fn remove_consecutive_duplicates(
    buffer: &mut TextBuffer,
    start_line: usize,
    end_line: usize,
) -> Result<usize> {
    if start_line >= end_line || end_line > buffer.len_lines() {
        return Ok(0);
    }

    let lines = read_lines_trimmed(buffer, start_line, end_line)?;

    let mut result: Vec<String> = Vec::with_capacity(lines.len());
    let mut removed = 0;

    for line in &lines {
        if result.last() != Some(line) {
            result.push(line.clone());
        } else {
            removed += 1;
        }
    }

    if removed > 0 {
        let refs: Vec<&str> = result.iter().map(String::as_str).collect();
        write_lines_back(buffer, start_line, end_line, &refs)?;
    }

    Ok(removed)
}

/// Removes all duplicate lines (keeping first occurrence).
pub fn remove_all_duplicates(
    buffer: &mut TextBuffer,
    start_line: usize,
    end_line: usize,
) -> Result<usize> {
    if start_line >= end_line || end_line > buffer.len_lines() {
        return Ok(0);
    }

    let lines = read_lines_trimmed(buffer, start_line, end_line)?;

    let mut seen = std::collections::HashSet::new();
    let mut result: Vec<String> = Vec::with_capacity(lines.len());
    let mut removed = 0;

    for line in &lines {
        if seen.insert(line.clone()) {
            result.push(line.clone());
        } else {
            removed += 1;
        }
    }

    if removed > 0 {
        let refs: Vec<&str> = result.iter().map(String::as_str).collect();
        write_lines_back(buffer, start_line, end_line, &refs)?;
    }

    Ok(removed)
}

/// Removes empty lines in the given range.
pub fn remove_empty_lines(
    buffer: &mut TextBuffer,
    start_line: usize,
    end_line: usize,
) -> Result<usize> {
    if start_line >= end_line || end_line > buffer.len_lines() {
        return Ok(0);
    }

    let lines = read_lines_trimmed(buffer, start_line, end_line)?;

    let non_empty: Vec<&str> = lines
        .iter()
        .map(String::as_str)
        .filter(|l| !l.trim().is_empty())
        .collect();
    let removed = lines.len() - non_empty.len();

    if removed > 0 {
        write_lines_back(buffer, start_line, end_line, &non_empty)?;
    }

    Ok(removed)
}

/// Duplicates a line.
pub fn duplicate_line(buffer: &mut TextBuffer, line_idx: usize) -> Result<()> {
    if line_idx >= buffer.len_lines() {
        anyhow::bail!("line index {} out of bounds", line_idx);
    }

    let line_text = buffer
        .line(line_idx)?
        .to_string()
        .trim_end_matches('\n')
        .to_string();

    let insert_pos = if line_idx + 1 < buffer.len_lines() {
        buffer.line_to_char(line_idx + 1)?
    } else {
        buffer.len_chars()
    };

    let text_to_insert = if line_idx + 1 < buffer.len_lines() {
        format!("{line_text}\n")
    } else {
        format!("\n{line_text}")
    };

    buffer.insert(insert_pos, &text_to_insert)?;
    Ok(())
}

/// Moves a line up by one position.
pub fn move_line_up(buffer: &mut TextBuffer, line_idx: usize) -> Result<bool> {
    if line_idx == 0 || line_idx >= buffer.len_lines() {
        return Ok(false);
    }

    let current_line = buffer
        .line(line_idx)?
        .to_string()
        .trim_end_matches('\n')
        .to_string();
    let prev_line = buffer
        .line(line_idx - 1)?
        .to_string()
        .trim_end_matches('\n')
        .to_string();

    let start = buffer.line_to_char(line_idx - 1)?;
    let end = if line_idx + 1 < buffer.len_lines() {
        buffer.line_to_char(line_idx + 1)?
    } else {
        buffer.len_chars()
    };

    let new_text = if line_idx + 1 < buffer.len_lines() {
        format!("{current_line}\n{prev_line}\n")
    } else {
        format!("{current_line}\n{prev_line}")
    };

    buffer.replace(start, end, &new_text)?;
    Ok(true)
}

/// Moves a line down by one position.
pub fn move_line_down(buffer: &mut TextBuffer, line_idx: usize) -> Result<bool> {
    if line_idx + 1 >= buffer.len_lines() {
        return Ok(false);
    }

    let current_line = buffer
        .line(line_idx)?
        .to_string()
        .trim_end_matches('\n')
        .to_string();
    let next_line = buffer
        .line(line_idx + 1)?
        .to_string()
        .trim_end_matches('\n')
        .to_string();

    let start = buffer.line_to_char(line_idx)?;
    let end = if line_idx + 2 < buffer.len_lines() {
        buffer.line_to_char(line_idx + 2)?
    } else {
        buffer.len_chars()
    };

    let new_text = if line_idx + 2 < buffer.len_lines() {
        format!("{next_line}\n{current_line}\n")
    } else {
        format!("{next_line}\n{current_line}")
    };

    buffer.replace(start, end, &new_text)?;
    Ok(true)
}

/// Converts text to title case (capitalize first letter of each word).
fn to_title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut capitalize_next = true;
    for ch in text.chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            capitalize_next = true;
            result.push(ch);
        } else if capitalize_next {
            result.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            result.extend(ch.to_lowercase());
        }
    }
    result
}

/// Converts the case of text.
pub fn convert_case(text: &str, conversion: CaseConversion) -> String {
    match conversion {
        CaseConversion::Upper => text.to_uppercase(),
        CaseConversion::Lower => text.to_lowercase(),
        CaseConversion::TitleCase => to_title_case(text),
    }
}

/// Indents lines in the given range using the specified indent style.
pub fn indent_lines(
    buffer: &mut TextBuffer,
    start_line: usize,
    end_line: usize,
    style: &IndentStyle,
) -> Result<()> {
    let indent = style.indent_text();
    // Process from last to first to maintain char positions
    for line_idx in (start_line..end_line.min(buffer.len_lines())).rev() {
        let line_start = buffer.line_to_char(line_idx)?;
        buffer.insert(line_start, &indent)?;
    }
    Ok(())
}

/// Dedents lines in the given range using the specified indent style.
pub fn dedent_lines(
    buffer: &mut TextBuffer,
    start_line: usize,
    end_line: usize,
    style: &IndentStyle,
) -> Result<()> {
    // Process from last to first to maintain char positions
    for line_idx in (start_line..end_line.min(buffer.len_lines())).rev() {
        let line = buffer.line(line_idx)?.to_string();
        let to_remove = match style {
            IndentStyle::Tabs => {
                if line.starts_with('\t') {
                    1
                } else {
                    // Fall back: remove up to 4 leading spaces for mixed content
                    line.chars().take_while(|c| *c == ' ').count().min(4)
                }
            }
            IndentStyle::Spaces(n) => line.chars().take_while(|c| *c == ' ').count().min(*n),
        };
        if to_remove > 0 {
            let line_start = buffer.line_to_char(line_idx)?;
            buffer.remove(line_start, line_start + to_remove)?;
        }
    }
    Ok(())
}
