//! Parser Engine.
//!
//! A [`Parser`] drives the compiled LR table of a [`Language`] over a source
//! text and always produces a [`Tree`]. Malformed input is recovered into
//! `ERROR` nodes and reported through [`Tree::has_error`]; a configured
//! [`Budget`] stops the parse early and marks the tree as truncated.
//!
//! ```ignore
//! let parser = Parser::new(&language);
//! let tree = parser.parse("<p>{{name}}</p>");
//! let tree = parser.edit(&tree, 6..10, "user")?;
//! ```

mod engine;
pub(crate) mod subtree;

#[cfg(test)]
mod parser_tests;
#[cfg(test)]
mod recovery_tests;

use std::ops::Range;
use std::sync::Arc;

use crate::incremental::{ChangeSet, TextChange, validate_changes};
use crate::language::Language;
use crate::tree::Tree;
use crate::Error;

use engine::{Engine, Reuse};

pub(crate) use engine::Outcome;

/// Limits on parse work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Budget {
    /// Lexing stops once the parser reaches this byte offset.
    pub max_bytes: usize,
    /// Lexer calls, shifts and reductions allowed.
    pub max_ops: u64,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_bytes: usize::MAX,
            max_ops: 10_000_000,
        }
    }
}

impl Budget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_bytes(mut self, bytes: usize) -> Self {
        self.max_bytes = bytes;
        self
    }

    pub fn max_ops(mut self, ops: u64) -> Self {
        self.max_ops = ops;
        self
    }
}

/// Work done when a [`Budget`] ran out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("parse budget exceeded after {ops} operations at byte {bytes}")]
pub struct BudgetExceeded {
    pub ops: u64,
    /// End of the parsed prefix.
    pub bytes: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub budget: Option<Budget>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn budget(mut self, budget: Budget) -> Self {
        self.budget = Some(budget);
        self
    }
}

/// Parses source texts of one language.
#[derive(Clone, Debug)]
pub struct Parser {
    language: Language,
    options: ParseOptions,
}

impl Parser {
    pub fn new(language: &Language) -> Self {
        Self::with_options(language, ParseOptions::default())
    }

    pub fn with_options(language: &Language, options: ParseOptions) -> Self {
        Self {
            language: language.clone(),
            options,
        }
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    pub fn parse(&self, source: &str) -> Tree {
        let source: Arc<str> = Arc::from(source);
        let outcome = Engine::new(&self.language, &source, self.options.budget, None).run();
        Tree::new(self.language.clone(), source, outcome)
    }

    /// Reparse `source`, the result of applying `changes` to `old`'s text.
    ///
    /// The result is identical to `parse(source)`; subtrees and tokens of
    /// `old` that the changes cannot affect are reused instead of rebuilt.
    pub fn parse_incremental(
        &self,
        old: &Tree,
        changes: &[TextChange],
        source: &str,
    ) -> Result<Tree, Error> {
        if !old.language().same_as(&self.language) {
            return Err(Error::InvalidEdit(format!(
                "tree was parsed as `{}`, not `{}`",
                old.language().name(),
                self.language.name()
            )));
        }
        validate_changes(changes, old.len(), source.len())?;

        let source: Arc<str> = Arc::from(source);
        let reuse = Reuse {
            map: old.reuse_map(),
            changes: ChangeSet::new(changes),
        };
        let outcome = Engine::new(&self.language, &source, self.options.budget, Some(reuse)).run();
        tracing::debug!(
            reused_nodes = outcome.stats.reused_nodes,
            reused_bytes = outcome.stats.reused_bytes,
            lexed_bytes = outcome.stats.lexed_bytes,
            "incremental parse"
        );
        Ok(Tree::new(self.language.clone(), source, outcome))
    }

    /// Replace `range` of `old`'s text with `new_text` and reparse incrementally.
    pub fn edit(&self, old: &Tree, range: Range<usize>, new_text: &str) -> Result<Tree, Error> {
        let text = old.text();
        if range.start > range.end
            || range.end > text.len()
            || !text.is_char_boundary(range.start)
            || !text.is_char_boundary(range.end)
        {
            return Err(Error::InvalidEdit(format!(
                "edit range {}..{} is not valid in a text of {} bytes",
                range.start,
                range.end,
                text.len()
            )));
        }

        let mut source = String::with_capacity(text.len() - range.len() + new_text.len());
        source.push_str(&text[..range.start]);
        source.push_str(new_text);
        source.push_str(&text[range.end..]);
        let change = TextChange::replace(range.start, range.len(), new_text.len());
        self.parse_incremental(old, &[change], &source)
    }
}
