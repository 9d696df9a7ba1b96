//! PGN Lexer
//!
//! Flat tokenization of PGN text driven by an ordered pattern table.
//! At every cursor position the table is tried top to bottom and the first
//! pattern matching at the cursor wins. This is first-match by priority,
//! not longest-match: reordering the table changes the token stream.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Token categories produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    String,
    Integer,
    Period,
    Asterisk,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    LeftAngleBracket,
    RightAngleBracket,
    LeftCurlyBracket,
    RightCurlyBracket,
    /// Numeric annotation glyph like "$14"
    Nag,
    /// SAN move text or tag name like "Bxe5+", "O-O-O", "Event"
    Symbol,
    /// Game termination like "1-0", "0-1", "1/2-1/2"
    Result,
}

/// A token with its text content and byte span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Literal text; string literals have their quotes stripped
    pub value: String,
    pub start: usize, // byte offset
    pub end: usize,   // byte offset (exclusive)
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            start,
            end,
        }
    }
}

/// Input that no pattern in the table recognizes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized token at byte {offset}: {fragment:?}")]
pub struct LexError {
    /// Byte offset where scanning stopped
    pub offset: usize,
    /// Unrecognized text, up to the next whitespace
    pub fragment: String,
}

/// What to do with the text a pattern matched
#[derive(Debug, Clone, Copy)]
enum Classify {
    /// Emit a token of this kind carrying the matched text
    Emit(TokenKind),
    /// Emit a string token with the surrounding quotes removed
    Quoted,
    /// Consume without emitting
    Skip,
}

struct Pattern {
    regex: Regex,
    classify: Classify,
}

impl Pattern {
    fn new(pattern: &str, classify: Classify) -> Self {
        Self {
            regex: Regex::new(pattern).expect("lexer patterns are valid regexes"),
            classify,
        }
    }
}

/// Priority-ordered pattern table. Every regex is anchored at the cursor.
///
/// Results must come before integers, otherwise "1-0" lexes as an integer
/// followed by garbage.
static PATTERNS: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    use Classify::*;

    vec![
        Pattern::new(r"^(?:1-0|0-1|1/2-1/2)", Emit(TokenKind::Result)),
        Pattern::new(r"^[0-9]+", Emit(TokenKind::Integer)),
        Pattern::new(r"^\$[0-9]+", Emit(TokenKind::Nag)),
        Pattern::new(r#"^"[^"]*""#, Quoted),
        Pattern::new(r"^[a-zA-Z][a-zA-Z0-9#+=\-]+", Emit(TokenKind::Symbol)),
        Pattern::new(r"^\s+", Skip),
        Pattern::new(r"^\[", Emit(TokenKind::LeftBracket)),
        Pattern::new(r"^\]", Emit(TokenKind::RightBracket)),
        Pattern::new(r"^<", Emit(TokenKind::LeftAngleBracket)),
        Pattern::new(r"^>", Emit(TokenKind::RightAngleBracket)),
        Pattern::new(r"^\{", Emit(TokenKind::LeftCurlyBracket)),
        Pattern::new(r"^\}", Emit(TokenKind::RightCurlyBracket)),
        Pattern::new(r"^\(", Emit(TokenKind::LeftParen)),
        Pattern::new(r"^\)", Emit(TokenKind::RightParen)),
        Pattern::new(r"^\.", Emit(TokenKind::Period)),
        Pattern::new(r"^\*", Emit(TokenKind::Asterisk)),
    ]
});

/// Tokenize PGN text into a token stream terminated by an `Eof` token
///
/// Fails on the first position no pattern matches. The lexer never panics on
/// malformed input; the caller decides how to report the error.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < source.len() {
        let remainder = &source[pos..];

        let (len, classify) = PATTERNS
            .iter()
            .find_map(|pattern| {
                pattern
                    .regex
                    .find(remainder)
                    .filter(|m| m.start() == 0 && !m.is_empty())
                    .map(|m| (m.end(), pattern.classify))
            })
            .ok_or_else(|| LexError {
                offset: pos,
                fragment: unrecognized_fragment(remainder),
            })?;

        let text = &remainder[..len];
        match classify {
            Classify::Emit(kind) => tokens.push(Token::new(kind, text, pos, pos + len)),
            Classify::Quoted => {
                let inner = &text[1..text.len() - 1];
                tokens.push(Token::new(TokenKind::String, inner, pos, pos + len));
            }
            Classify::Skip => {}
        }

        pos += len;
    }

    tokens.push(Token::new(TokenKind::Eof, "", source.len(), source.len()));
    Ok(tokens)
}

/// Find the token whose span contains the given byte offset
pub fn token_at(tokens: &[Token], offset: usize) -> Option<&Token> {
    tokens
        .iter()
        .find(|token| offset >= token.start && offset < token.end)
}

fn unrecognized_fragment(remainder: &str) -> String {
    let end = remainder
        .find(char::is_whitespace)
        .unwrap_or(remainder.len());
    remainder[..end].to_string()
}
