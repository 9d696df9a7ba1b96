//! Diagnostic Provider
//!
//! Runs the lexer and the configured grammar checker over a document and
//! anchors everything they report to LSP ranges.

use std::sync::Arc;

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range};

use crate::core::document::Document;
use crate::parser::{LexError, tokenize};
use crate::validation::{Anchor, GrammarChecker, Severity, StructureChecker, SyntaxError};

pub const DEFAULT_SOURCE: &str = "pgn-ls";

/// Produces the full diagnostic set for a document
#[derive(Clone)]
pub struct DiagnosticProvider {
    source: String,
    checker: Arc<dyn GrammarChecker>,
}

impl std::fmt::Debug for DiagnosticProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticProvider")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl DiagnosticProvider {
    pub fn new(source: impl Into<String>, checker: Arc<dyn GrammarChecker>) -> Self {
        Self {
            source: source.into(),
            checker,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Diagnose the current buffer of a document
    ///
    /// The returned list replaces whatever was published before. A lexing
    /// failure yields a single diagnostic and skips the grammar checker.
    pub fn diagnose(&self, document: &Document) -> Vec<Diagnostic> {
        let text = document.text();

        let tokens = match tokenize(text) {
            Ok(tokens) => tokens,
            Err(err) => {
                log::debug!("lexing {} failed: {}", document.uri(), err);
                return vec![self.lex_diagnostic(document, &err)];
            }
        };

        let errors = self.checker.check(text, &tokens);
        log::debug!(
            "{}: {} tokens, {} syntax error(s)",
            document.uri(),
            tokens.len(),
            errors.len()
        );

        errors
            .into_iter()
            .map(|error| self.syntax_diagnostic(document, error))
            .collect()
    }

    fn lex_diagnostic(&self, document: &Document, err: &LexError) -> Diagnostic {
        let range = document
            .range_of(err.offset..err.offset + err.fragment.len())
            .unwrap_or_else(|_| point(document.end_position()));

        self.create_lsp_diagnostic(
            range,
            DiagnosticSeverity::ERROR,
            format!("unrecognized token {:?}", err.fragment),
        )
    }

    fn syntax_diagnostic(&self, document: &Document, error: SyntaxError) -> Diagnostic {
        let range = match &error.anchor {
            Anchor::Span(span) => document.range_of(span.clone()),
            Anchor::Point { line, character } => {
                // Round-trip through the buffer so the published point is one
                // that exists in it
                let position = Position::new(*line, *character);
                document
                    .offset_of(position)
                    .and_then(|offset| document.position_of(offset))
                    .map(point)
            }
        };

        let range = range.unwrap_or_else(|err| {
            log::warn!(
                "cannot anchor {:?} in {}: {}; using end of document",
                error.anchor,
                document.uri(),
                err
            );
            point(document.end_position())
        });

        let severity = match error.severity {
            Severity::Error => DiagnosticSeverity::ERROR,
            Severity::Warning => DiagnosticSeverity::WARNING,
            Severity::Info => DiagnosticSeverity::INFORMATION,
        };

        self.create_lsp_diagnostic(range, severity, error.message)
    }

    fn create_lsp_diagnostic(
        &self,
        range: Range,
        severity: DiagnosticSeverity,
        message: String,
    ) -> Diagnostic {
        Diagnostic::new(
            range,
            Some(severity),
            None,
            Some(self.source.clone()),
            message,
            None,
            None,
        )
    }
}

impl Default for DiagnosticProvider {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE, Arc::new(StructureChecker))
    }
}

fn point(position: Position) -> Range {
    Range::new(position, position)
}
