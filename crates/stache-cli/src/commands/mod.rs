pub mod compile;
pub mod edit;
pub mod info;
pub mod lang_resolver;
pub mod output;
pub mod parse;
pub mod query;
pub mod source_loader;

#[cfg(test)]
mod edit_tests;
#[cfg(test)]
mod lang_resolver_tests;

use std::io;
use std::path::PathBuf;

use stache_core::{GrammarError, LoadError};

/// Where the source text comes from: a file, stdin (`-`), or `-s` text.
#[derive(Clone, Debug, Default)]
pub struct SourceInput {
    pub path: Option<PathBuf>,
    pub text: Option<String>,
}

/// Bundled language name or compiled table file.
#[derive(Clone, Debug, Default)]
pub struct LanguageChoice {
    pub lang: Option<String>,
    pub grammar: Option<PathBuf>,
}

/// Failures reported by commands. Syntax errors in parsed sources are not
/// among them unless `--diagnostics` asks for it.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to read stdin: {0}")]
    Stdin(io::Error),

    #[error("source is required: use a positional argument or -s/--source")]
    MissingSource,

    #[error("give either a source file or -s/--source, not both")]
    AmbiguousSource,

    #[error("query is required")]
    MissingQuery,

    #[error("unknown language: '{0}'")]
    UnknownLanguage(String),

    #[error("table '{path}' needs an external scanner, and none is bundled for '{name}'")]
    NoScanner { path: PathBuf, name: String },

    #[error("failed to load '{path}': {source}")]
    Load { path: PathBuf, source: LoadError },

    #[error("invalid grammar: {0}")]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Compile(#[from] stache_compiler::CompileError),

    #[error("failed to encode table: {0}")]
    Encode(String),

    #[error(transparent)]
    Runtime(#[from] stache_lib::Error),

    #[error("failed to render json: {0}")]
    Json(#[from] serde_json::Error),

    /// Diagnostics were already printed.
    #[error("{0} syntax error(s)")]
    SyntaxErrors(usize),

    /// Diagnostics were already printed.
    #[error("invalid query")]
    InvalidQuery,
}
