//! PGN Language Server
//!
//! A Language Server Protocol implementation for PGN chess game files.
//!
//! This library provides:
//! - PGN tokenization
//! - Open-document buffers with UTF-16 position translation
//! - Incremental edit application
//! - Structural diagnostics
//! - Configuration management

pub mod config;
pub mod core;
pub mod lsp;
pub mod parser;
pub mod validation;

// Re-exports for clean public API
pub use crate::core::{Change, DiagnosticProvider, Document, DocumentManager};
pub use config::Config;
pub use parser::{Token, TokenKind, tokenize};
pub use validation::{GrammarChecker, StructureChecker};
