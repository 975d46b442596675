//! Syntax trees.
//!
//! A [`Tree`] owns an immutable rowan green tree, the source text it was
//! parsed from, and what the next incremental parse needs to reuse it.
//! Green nodes are position independent and reference counted, so trees
//! produced by successive incremental parses share every unchanged subtree.
//!
//! Views into a tree ([`Node`], [`TreeCursor`]) are built on rowan's red
//! tree, which gives nodes absolute offsets and non-owning parent links.

mod cursor;
pub mod invariants;
mod node;
mod sexp;

#[cfg(test)]
mod tree_tests;

use std::fmt;
use std::sync::Arc;

use rowan::GreenNode;
use stache_core::SymbolId;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::incremental::{IncrementalStats, ReuseMap};
use crate::language::Language;
use crate::parser::{BudgetExceeded, Outcome};

pub use cursor::TreeCursor;
pub use node::{Children, Node};

/// Language tag for rowan's tree types. Kinds are grammar symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stache {}

impl rowan::Language for Stache {
    type Kind = SymbolId;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        SymbolId(raw.0)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind.0)
    }
}

pub type SyntaxNode = rowan::SyntaxNode<Stache>;
pub type SyntaxToken = rowan::SyntaxToken<Stache>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// Result of a parse.
#[derive(Clone)]
pub struct Tree {
    green: GreenNode,
    language: Language,
    source: Arc<str>,
    has_error: bool,
    truncation: Option<BudgetExceeded>,
    reuse: Arc<ReuseMap>,
    stats: IncrementalStats,
}

impl Tree {
    pub(crate) fn new(language: Language, source: Arc<str>, outcome: Outcome) -> Self {
        Self {
            green: outcome.green,
            language,
            source,
            has_error: outcome.has_error,
            truncation: outcome.truncation,
            reuse: Arc::new(outcome.reuse),
            stats: outcome.stats,
        }
    }

    pub fn root_node(&self) -> Node<'_> {
        Node::new(self, SyntaxElement::Node(SyntaxNode::new_root(self.green.clone())))
    }

    /// Red root for rowan-level traversal.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// The immutable green tree. Equal green trees mean structurally equal parses.
    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn text(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Whether any `ERROR` node is present.
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }

    pub fn truncation(&self) -> Option<BudgetExceeded> {
        self.truncation
    }

    /// The tree, or the budget error if the parse stopped early.
    pub fn complete(self) -> Result<Tree, BudgetExceeded> {
        match self.truncation {
            Some(exceeded) => Err(exceeded),
            None => Ok(self),
        }
    }

    pub fn walk(&self) -> TreeCursor<'_> {
        TreeCursor::new(self.root_node())
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Reuse statistics of the parse that produced this tree.
    pub fn stats(&self) -> IncrementalStats {
        self.stats
    }

    pub fn to_sexp(&self) -> String {
        self.root_node().to_sexp()
    }

    /// One error per outermost `ERROR` node, plus a warning when the parse
    /// was truncated.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for node in self.syntax().descendants() {
            if node.kind() != SymbolId::ERROR
                || node.ancestors().skip(1).any(|a| a.kind() == SymbolId::ERROR)
            {
                continue;
            }
            let mut diagnostic = Diagnostic::error(node.text_range(), self.describe_error(&node));
            let enclosing = node
                .ancestors()
                .skip(1)
                .find(|a| a.parent().is_some() && self.language.is_named(a.kind()));
            if let Some(parent) = enclosing {
                let name = self.language.symbol_name(parent.kind());
                diagnostic =
                    diagnostic.with_context(parent.text_range(), format!("inside {name}"));
            }
            diagnostics.push(diagnostic);
        }
        if let Some(exceeded) = self.truncation {
            let at = rowan::TextSize::from(exceeded.bytes as u32);
            diagnostics.push(Diagnostic::warning(
                rowan::TextRange::empty(at),
                format!("parse stopped early: {exceeded}"),
            ));
        }
        diagnostics
    }

    /// `unexpected `+`` for anonymous or unknown input, `unexpected number`
    /// for named tokens.
    fn describe_error(&self, node: &SyntaxNode) -> String {
        let first = node
            .descendants_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| {
                token.kind() != SymbolId::TRIVIA && !self.language.is_extra(token.kind())
            });
        match first {
            Some(token)
                if token.kind() == SymbolId::ERROR || !self.language.is_named(token.kind()) =>
            {
                format!("unexpected `{}`", token.text())
            }
            Some(token) => format!("unexpected {}", self.language.symbol_name(token.kind())),
            None => "unexpected input".to_owned(),
        }
    }

    pub(crate) fn reuse_map(&self) -> &ReuseMap {
        &self.reuse
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("language", &self.language.name())
            .field("len", &self.len())
            .field("has_error", &self.has_error)
            .field("truncation", &self.truncation)
            .finish()
    }
}
