//! Core Document Model
//!
//! Document store, position translation, edit application and diagnostics.

pub mod diagnostics;
pub mod document;
pub mod edit;
pub mod error;
pub mod position;

pub use diagnostics::DiagnosticProvider;
pub use document::{ChangeOutcome, Document, DocumentManager, SharedDocument};
pub use edit::{Change, apply_changes};
pub use error::{DocumentError, EditError, PositionError};
