//! PGN Parser
//!
//! Lexical analysis only: PGN text becomes a flat token stream.
//! Grammar-level checks live in `validation`.

pub mod lexer;

pub use lexer::{LexError, Token, TokenKind, token_at, tokenize};
