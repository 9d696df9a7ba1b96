//! Validation Engine
//!
//! Grammar-level checks on top of the token stream. The diagnostics pipeline
//! talks to checkers only through `GrammarChecker`, so a full PGN parser can
//! be plugged in later without touching the document model.

use std::ops::Range;

use crate::parser::{Token, TokenKind};

/// Severity of a syntax error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Where a syntax error points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// Byte span in the checked text
    Span(Range<usize>),
    /// Zero-based line and UTF-16 column reported by the checker
    Point { line: u32, character: u32 },
}

/// A structured error reported by a grammar checker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub anchor: Anchor,
    pub message: String,
    pub severity: Severity,
}

/// Grammar collaborator: text and its tokens in, structured errors out
pub trait GrammarChecker: Send + Sync {
    fn check(&self, text: &str, tokens: &[Token]) -> Vec<SyntaxError>;
}

/// Errors collected while checking a document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<SyntaxError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, span: Range<usize>, message: String) {
        self.push(span, message, Severity::Error);
    }

    pub fn add_warning(&mut self, span: Range<usize>, message: String) {
        self.push(span, message, Severity::Warning);
    }

    fn push(&mut self, span: Range<usize>, message: String, severity: Severity) {
        self.diagnostics.push(SyntaxError {
            anchor: Anchor::Span(span),
            message,
            severity,
        });
    }

    pub fn is_valid(&self) -> bool {
        !self
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// Checker that accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopChecker;

impl GrammarChecker for NoopChecker {
    fn check(&self, _text: &str, _tokens: &[Token]) -> Vec<SyntaxError> {
        Vec::new()
    }
}

/// Token-level structural checks: tag pair shape, delimiter balance, NAG
/// range and game termination. Builds no tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureChecker;

impl GrammarChecker for StructureChecker {
    fn check(&self, _text: &str, tokens: &[Token]) -> Vec<SyntaxError> {
        check_structure(tokens).diagnostics
    }
}

fn span(token: &Token) -> Range<usize> {
    token.start..token.end
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "end of file".to_string(),
        TokenKind::String => format!("string \"{}\"", token.value),
        _ => format!("'{}'", token.value),
    }
}

fn closer_for(kind: TokenKind) -> Option<TokenKind> {
    match kind {
        TokenKind::LeftParen => Some(TokenKind::RightParen),
        TokenKind::LeftAngleBracket => Some(TokenKind::RightAngleBracket),
        TokenKind::LeftCurlyBracket => Some(TokenKind::RightCurlyBracket),
        _ => None,
    }
}

/// Run the structural checks over a token stream
pub fn check_structure(tokens: &[Token]) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut open: Vec<&Token> = Vec::new();
    // Last token of the current game's movetext, if it has any
    let mut movetext_end: Option<&Token> = None;
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];

        // Comments run until the first '}' and do not nest
        if open
            .last()
            .is_some_and(|t| t.kind == TokenKind::LeftCurlyBracket)
        {
            if token.kind == TokenKind::RightCurlyBracket {
                open.pop();
            }
            i += 1;
            continue;
        }

        match token.kind {
            TokenKind::Eof => break,

            TokenKind::LeftBracket => {
                if let Some(last) = movetext_end.take() {
                    warn_missing_result(&mut result, last);
                }
                i = check_tag_pair(tokens, i, &mut result);
                continue;
            }

            TokenKind::RightBracket => {
                result.add_error(span(token), "unmatched ']'".to_string());
            }

            TokenKind::LeftParen | TokenKind::LeftAngleBracket | TokenKind::LeftCurlyBracket => {
                open.push(token);
            }

            TokenKind::RightParen | TokenKind::RightAngleBracket | TokenKind::RightCurlyBracket => {
                let matches = open
                    .last()
                    .is_some_and(|opener| closer_for(opener.kind) == Some(token.kind));
                if matches {
                    open.pop();
                } else {
                    result.add_error(span(token), format!("unmatched {}", describe(token)));
                }
            }

            TokenKind::Result | TokenKind::Asterisk if open.is_empty() => {
                movetext_end = None;
            }

            TokenKind::Nag => {
                if token.value[1..].parse::<u8>().is_err() {
                    result.add_warning(
                        span(token),
                        format!("NAG {} is outside the range $0-$255", token.value),
                    );
                }
                if open.is_empty() {
                    movetext_end = Some(token);
                }
            }

            _ => {
                if open.is_empty() {
                    movetext_end = Some(token);
                }
            }
        }

        i += 1;
    }

    for opener in open {
        result.add_error(span(opener), format!("unclosed {}", describe(opener)));
    }

    if let Some(last) = movetext_end {
        warn_missing_result(&mut result, last);
    }

    result
}

fn warn_missing_result(result: &mut ValidationResult, last: &Token) {
    result.add_warning(
        span(last),
        "game has no result; expected 1-0, 0-1, 1/2-1/2 or *".to_string(),
    );
}

/// Check `[ SYMBOL STRING ]` starting at `tokens[start]` and return the index
/// to resume scanning from
fn check_tag_pair(tokens: &[Token], start: usize, result: &mut ValidationResult) -> usize {
    let expected = [
        (TokenKind::Symbol, "tag name"),
        (TokenKind::String, "tag value"),
        (TokenKind::RightBracket, "']'"),
    ];

    for (offset, (kind, what)) in expected.iter().enumerate() {
        let index = start + 1 + offset;
        // The stream always ends with Eof, so this only misses on a
        // hand-built token slice
        let Some(token) = tokens.get(index) else {
            return tokens.len();
        };

        if token.kind != *kind {
            let found = describe(token);
            result.add_error(
                span(token),
                format!("malformed tag pair: expected {what}, found {found}"),
            );
            // Resume at the offending token unless it is the closing bracket
            return if token.kind == TokenKind::RightBracket {
                index + 1
            } else {
                index
            };
        }
    }

    start + 1 + expected.len()
}
