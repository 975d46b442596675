//! Stache grammar compiler.
//!
//! Turns a [`Grammar`] into a [`ParseTable`]:
//! - `prepare` - symbol classification and flattening into BNF productions
//! - `lexical` - token rules to literal or regex matchers
//! - `first` - FIRST sets and nullability
//! - `lalr` - LALR(1) automaton
//! - `tables` - action/goto rows with precedence conflict resolution

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod first;
mod lalr;
mod lexical;
mod prepare;
mod tables;


use stache_core::{Grammar, ParseTable};

/// Errors reported while compiling a grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("grammar has no rules")]
    EmptyGrammar,

    #[error("start rule `{0}` must be visible")]
    HiddenStartRule(String),

    #[error("undefined symbol `{name}` in rule `{rule}`")]
    UndefinedSymbol { name: String, rule: String },

    #[error("invalid pattern in rule `{rule}`: {message}")]
    InvalidPattern { rule: String, message: String },

    #[error("unsupported rule `{rule}`: {message}")]
    UnsupportedRule { rule: String, message: String },

    #[error("rule `{rule}` matches the empty string")]
    EmptyToken { rule: String },

    #[error("unresolved {kind} conflict on `{token}` in state {state}:\n  {}", .items.join("\n  "))]
    Conflict {
        kind: &'static str,
        token: String,
        state: usize,
        items: Vec<String>,
    },

    #[error("grammar too large: {0}")]
    TooLarge(String),
}

/// Compile a grammar into LALR(1) parse tables.
pub fn compile(grammar: &Grammar) -> Result<ParseTable, CompileError> {
    let syntax = prepare::prepare(grammar)?;
    if syntax.productions.len() >= u16::MAX as usize {
        return Err(CompileError::TooLarge(format!(
            "{} productions",
            syntax.productions.len()
        )));
    }

    let lalr = lalr::Lalr::new(&syntax);
    let states = lalr.build()?;
    let table = tables::build_table(&lalr, &states)?;

    tracing::debug!(
        grammar = %table.name,
        symbols = table.symbols.len(),
        terminals = table.terminals.len(),
        externals = table.externals.len(),
        productions = table.productions.len(),
        states = table.states.len(),
        "compiled grammar"
    );

    Ok(table)
}
