//! Validation Engine
//!
//! Grammar collaborators that turn a token stream into structured errors.

pub mod engine;

pub use engine::{
    Anchor, GrammarChecker, NoopChecker, Severity, StructureChecker, SyntaxError, ValidationResult,
    check_structure,
};
