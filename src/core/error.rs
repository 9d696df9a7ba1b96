//! Error types for document operations.

use thiserror::Error;
use tower_lsp::lsp_types::Url;

/// A wire coordinate or byte offset that does not fit the document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("line {line} out of range of 0-{line_count}")]
    OutOfRangeLine { line: u32, line_count: usize },

    #[error("column {character} is beyond the end of line {line}")]
    OutOfRangeColumn { line: u32, character: u32 },

    #[error("byte offset {offset} is beyond the end of the document ({len} bytes)")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("byte offset {offset} is not on a UTF-8 character boundary")]
    InvalidEncoding { offset: usize },
}

/// A change in an edit batch that cannot be applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("change #{index} cannot be resolved: {source}")]
    Unresolvable {
        index: usize,
        #[source]
        source: PositionError,
    },

    #[error("change #{index} has its start (byte {start}) after its end (byte {end})")]
    InvertedRange {
        index: usize,
        start: usize,
        end: usize,
    },
}

/// Failures at the document store boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("document {0} is not open")]
    NotOpen(Url),

    #[error("edit rejected for {uri}: {source}")]
    Edit {
        uri: Url,
        #[source]
        source: EditError,
    },
}
