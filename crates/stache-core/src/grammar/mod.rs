//! Grammar definitions in tree-sitter's `grammar.json` shape.
//!
//! Grammars are read from JSON, built in code with the [`Rule`] helpers, or
//! round-tripped through a compact binary form.

mod binary;
mod json;
mod types;

#[cfg(test)]
mod binary_tests;

pub use json::GrammarError;
pub use types::{Grammar, Precedence, Rule};
