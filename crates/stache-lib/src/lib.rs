//! stache: incremental, error-tolerant parsing for compiled grammars.
//!
//! # Example
//!
//! ```
//! use stache_compiler::compile;
//! use stache_core::Grammar;
//! use stache_lib::{Language, Parser};
//!
//! let grammar = Grammar::from_json(r#"{
//!     "name": "words",
//!     "rules": {
//!         "list": { "type": "REPEAT", "content": { "type": "SYMBOL", "name": "word" } },
//!         "word": { "type": "PATTERN", "value": "[a-z]+" }
//!     },
//!     "extras": [{ "type": "PATTERN", "value": "\\s+" }]
//! }"#).unwrap();
//! let language = Language::load(&compile(&grammar).unwrap()).unwrap();
//!
//! let parser = Parser::new(&language);
//! let tree = parser.parse("hello world");
//! assert_eq!(tree.to_sexp(), "(list (word) (word))");
//!
//! let tree = parser.edit(&tree, 6..11, "there").unwrap();
//! assert!(!tree.has_error());
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod diagnostics;
pub mod incremental;
pub mod language;
pub mod lexer;
pub mod parser;
pub mod query;
pub mod tree;

#[cfg(test)]
mod language_tests;
#[cfg(test)]
mod test_utils;

pub use diagnostics::{Diagnostic, Diagnostics, DiagnosticsPrinter, Severity};
pub use incremental::{IncrementalStats, TextChange, validate_changes};
pub use language::Language;
pub use lexer::{ExternalScanner, ScanCursor, ScannerFactory};
pub use parser::{Budget, BudgetExceeded, ParseOptions, Parser};
pub use query::{Query, QueryCapture, QueryCursor, QueryError, QueryMatch};
pub use stache_core::{FORMAT_VERSION, GrammarProvider, LoadError, SymbolId};
pub use tree::{Node, Tree, TreeCursor};

/// Errors surfaced by the runtime. Syntax errors in parsed text are not
/// among them: they are recovered into the tree.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load language: {0}")]
    Load(#[from] LoadError),

    #[error("invalid edit: {0}")]
    InvalidEdit(String),

    #[error(transparent)]
    BudgetExceeded(#[from] BudgetExceeded),

    #[error("invalid query: {0}")]
    Query(#[from] QueryError),
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;
