#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for stache.
//!
//! - [`grammar`]: grammar definitions in tree-sitter's `grammar.json` shape
//! - [`table`]: compiled LR parse tables consumed by the runtime
//! - [`format`]: the binary container tables are shipped in
//! - [`GrammarProvider`]: the capability the runtime loads languages from

pub mod format;
pub mod grammar;
mod provider;
pub mod table;

#[cfg(test)]
mod format_tests;
#[cfg(test)]
mod table_tests;

pub use format::{EncodedTable, FORMAT_VERSION};
pub use grammar::{Grammar, GrammarError, Precedence, Rule};
pub use provider::{GrammarProvider, LoadError};
pub use table::{
    Action, Associativity, LexTerminal, ParseState, ParseTable, Production, ProductionId, StateId,
    SymbolId, SymbolInfo, SymbolKind, TokenMatcher,
};
