//! Position Translation
//!
//! Converts between byte offsets into a UTF-8 buffer and LSP positions, whose
//! `character` counts UTF-16 code units. Only `\n` terminates a line.

use std::ops::Range as ByteRange;

use tower_lsp::lsp_types::{Position, Range};

use crate::core::error::PositionError;

/// Compute byte offsets of each line start in the text
///
/// Entry 0 is always 0. A trailing newline opens a final empty line.
pub fn compute_line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

/// Resolve an LSP position to a byte offset
///
/// `line_starts` must have been computed from `text`. A position one line past
/// the last line with character 0 addresses the end of the buffer. A character
/// that falls between the two halves of a surrogate pair resolves to the start
/// of that character.
pub fn offset_of(
    text: &str,
    line_starts: &[usize],
    position: Position,
) -> Result<usize, PositionError> {
    let line = position.line as usize;
    let line_count = line_starts.len();

    if line > line_count || (line == line_count && position.character != 0) {
        return Err(PositionError::OutOfRangeLine {
            line: position.line,
            line_count,
        });
    }
    if line == line_count {
        return Ok(text.len());
    }

    let line_start = line_starts[line];
    let content = text
        .get(line_start..)
        .ok_or(PositionError::InvalidEncoding { offset: line_start })?;

    let column_error = || PositionError::OutOfRangeColumn {
        line: position.line,
        character: position.character,
    };

    let mut col16 = 0u32;
    let mut col8 = 0usize;
    let mut chars = content.chars();

    while col16 < position.character {
        let ch = chars.next().ok_or_else(column_error)?;
        if ch == '\n' {
            return Err(column_error());
        }

        let width = ch.len_utf16() as u32;
        if col16 + width > position.character {
            break;
        }
        col16 += width;
        col8 += ch.len_utf8();
    }

    Ok(line_start + col8)
}

/// Resolve a byte offset to an LSP position
pub fn position_of(
    text: &str,
    line_starts: &[usize],
    offset: usize,
) -> Result<Position, PositionError> {
    if offset > text.len() {
        return Err(PositionError::OffsetOutOfRange {
            offset,
            len: text.len(),
        });
    }
    if !text.is_char_boundary(offset) {
        return Err(PositionError::InvalidEncoding { offset });
    }

    let line = line_starts
        .partition_point(|&start| start <= offset)
        .saturating_sub(1);
    let line_start = line_starts.get(line).copied().unwrap_or(0);

    let character: u32 = text
        .get(line_start..offset)
        .ok_or(PositionError::InvalidEncoding { offset: line_start })?
        .chars()
        .map(|ch| ch.len_utf16() as u32)
        .sum();

    Ok(Position::new(line as u32, character))
}

/// Resolve a byte span to an LSP range
pub fn range_of(
    text: &str,
    line_starts: &[usize],
    span: ByteRange<usize>,
) -> Result<Range, PositionError> {
    Ok(Range::new(
        position_of(text, line_starts, span.start)?,
        position_of(text, line_starts, span.end)?,
    ))
}
