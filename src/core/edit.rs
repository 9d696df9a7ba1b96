//! Edit Application
//!
//! Splices LSP content changes into a buffer. Each change in a batch is
//! resolved against the buffer produced by the changes before it.

use tower_lsp::lsp_types::{Range, TextDocumentContentChangeEvent};

use crate::core::error::EditError;
use crate::core::position::{compute_line_starts, offset_of};

/// A single content change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Replace the whole buffer
    Full(String),
    /// Replace the text inside `range`
    Incremental { range: Range, text: String },
}

impl From<TextDocumentContentChangeEvent> for Change {
    fn from(event: TextDocumentContentChangeEvent) -> Self {
        match event.range {
            Some(range) => Change::Incremental {
                range,
                text: event.text,
            },
            None => Change::Full(event.text),
        }
    }
}

/// Apply changes in order and return the resulting buffer
///
/// Works on a private copy: if any change fails to resolve, nothing is
/// returned and the caller's buffer is untouched.
pub fn apply_changes(text: &str, changes: &[Change]) -> Result<String, EditError> {
    let mut buffer = text.to_string();

    for (index, change) in changes.iter().enumerate() {
        match change {
            Change::Full(replacement) => {
                buffer.clear();
                buffer.push_str(replacement);
            }
            Change::Incremental { range, text } => {
                splice(&mut buffer, index, *range, text)?;
            }
        }
    }

    Ok(buffer)
}

fn splice(buffer: &mut String, index: usize, range: Range, text: &str) -> Result<(), EditError> {
    // Offsets must come from the buffer as it stands now, not from the
    // snapshot the batch started with
    let current = buffer.as_str();
    let line_starts = compute_line_starts(current);
    let resolve = |position| {
        offset_of(current, &line_starts, position)
            .map_err(|source| EditError::Unresolvable { index, source })
    };

    let start = resolve(range.start)?;
    let end = resolve(range.end)?;

    if start > end {
        return Err(EditError::InvertedRange { index, start, end });
    }

    log::trace!("change #{}: replacing bytes {}..{}", index, start, end);
    buffer.replace_range(start..end, text);
    Ok(())
}
