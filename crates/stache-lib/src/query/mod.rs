//! Tree patterns.
//!
//! ```text
//! ; every section with the tag name it opens
//! (mustache_section (mustache_section_begin (mustache_tag_name) @name)) @section
//! (element (start_tag "<" (tag_name) @tag))
//! (ERROR) @error
//! ```
//!
//! A pattern matches a node of its kind whose visible children contain
//! matches of the child patterns in order, not necessarily adjacent.
//! `(_)` matches any named node, `_` any visible node, and a string literal
//! an anonymous node with that text as its kind.

mod cursor;
mod lexer;


use std::ops::Range;

use rowan::{TextRange, TextSize};
use stache_core::SymbolId;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::language::Language;

use lexer::{Token, TokenKind};

pub use cursor::{QueryCapture, QueryCursor, QueryMatch};

/// Patterns nested deeper than this are rejected.
const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct QueryError {
    pub message: String,
    pub range: TextRange,
}

impl QueryError {
    fn new(message: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            message: message.into(),
            range: TextRange::new(
                TextSize::from(span.start as u32),
                TextSize::from(span.end as u32),
            ),
        }
    }

    /// The error as a diagnostic over the query source.
    pub fn diagnostics(&self) -> Diagnostics {
        [Diagnostic::error(self.range, self.message.clone())]
            .into_iter()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PatternKind {
    Symbol(SymbolId),
    AnyNamed,
    Any,
}

#[derive(Debug, Clone)]
pub(crate) struct Pattern {
    pub kind: PatternKind,
    pub children: Vec<Pattern>,
    pub captures: Vec<usize>,
}

/// Compiled query for one language.
#[derive(Debug, Clone)]
pub struct Query {
    language: Language,
    patterns: Vec<Pattern>,
    capture_names: Vec<String>,
}

impl Query {
    pub fn new(language: &Language, source: &str) -> Result<Self, QueryError> {
        let tokens = lexer::lex(source);
        let mut parser = QueryParser {
            language,
            source,
            tokens: &tokens,
            pos: 0,
            capture_names: Vec::new(),
        };
        let mut patterns = Vec::new();
        while !parser.at_end() {
            patterns.push(parser.pattern(0)?);
        }
        if patterns.is_empty() {
            return Err(QueryError::new("query has no patterns", 0..source.len()));
        }
        tracing::debug!(
            patterns = patterns.len(),
            captures = parser.capture_names.len(),
            "compiled query"
        );
        Ok(Self {
            language: language.clone(),
            capture_names: parser.capture_names,
            patterns,
        })
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn capture_names(&self) -> &[String] {
        &self.capture_names
    }

    pub fn capture_index(&self, name: &str) -> Option<usize> {
        self.capture_names.iter().position(|n| n == name)
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub(crate) fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }
}

struct QueryParser<'a> {
    language: &'a Language,
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
    capture_names: Vec<String>,
}

impl QueryParser<'_> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn text(&self, token: &Token) -> &str {
        &self.source[token.span.clone()]
    }

    fn end_span(&self) -> Range<usize> {
        self.source.len()..self.source.len()
    }

    fn pattern(&mut self, depth: usize) -> Result<Pattern, QueryError> {
        let Some(token) = self.bump() else {
            return Err(QueryError::new("expected a pattern", self.end_span()));
        };
        if depth > MAX_DEPTH {
            return Err(QueryError::new("pattern is nested too deeply", token.span));
        }

        let mut pattern = match token.kind {
            TokenKind::Underscore => Pattern {
                kind: PatternKind::Any,
                children: Vec::new(),
                captures: Vec::new(),
            },
            TokenKind::StringLiteral => {
                let name = lexer::unescape(self.text(&token));
                let Some(symbol) = self.language.symbol_for_name(&name, false) else {
                    return Err(QueryError::new(
                        format!("`{name}` is not an anonymous node of `{}`", self.language.name()),
                        token.span,
                    ));
                };
                Pattern {
                    kind: PatternKind::Symbol(symbol),
                    children: Vec::new(),
                    captures: Vec::new(),
                }
            }
            TokenKind::ParenOpen => self.tree(token.span, depth)?,
            TokenKind::Capture => {
                return Err(QueryError::new("capture has no pattern before it", token.span));
            }
            TokenKind::ParenClose => {
                return Err(QueryError::new("unexpected `)`", token.span));
            }
            TokenKind::Id | TokenKind::KwError => {
                let text = self.text(&token).to_owned();
                return Err(QueryError::new(
                    format!("bare node kind `{text}`; write `({text})`"),
                    token.span,
                ));
            }
            TokenKind::Garbage | TokenKind::Whitespace | TokenKind::Comment => {
                return Err(QueryError::new(
                    format!("unexpected `{}`", self.text(&token)),
                    token.span,
                ));
            }
        };

        while let Some(token) = self.peek().filter(|t| t.kind == TokenKind::Capture) {
            let name = self.text(token)[1..].to_owned();
            self.pos += 1;
            let index = match self.capture_names.iter().position(|n| *n == name) {
                Some(index) => index,
                None => {
                    self.capture_names.push(name);
                    self.capture_names.len() - 1
                }
            };
            pattern.captures.push(index);
        }
        Ok(pattern)
    }

    /// `(kind child...)` after its opening parenthesis.
    fn tree(&mut self, open: Range<usize>, depth: usize) -> Result<Pattern, QueryError> {
        let Some(token) = self.bump() else {
            return Err(QueryError::new("missing closing `)`", open));
        };
        let kind = match token.kind {
            TokenKind::Underscore => PatternKind::AnyNamed,
            TokenKind::KwError => PatternKind::Symbol(SymbolId::ERROR),
            TokenKind::Id => {
                let name = self.text(&token);
                match self.language.symbol_for_name(name, true) {
                    Some(symbol) if self.language.is_visible(symbol) => PatternKind::Symbol(symbol),
                    _ => {
                        return Err(QueryError::new(
                            format!("unknown node kind `{name}` in `{}`", self.language.name()),
                            token.span,
                        ));
                    }
                }
            }
            TokenKind::ParenClose => {
                return Err(QueryError::new("empty pattern `()`", open.start..token.span.end));
            }
            _ => {
                return Err(QueryError::new(
                    format!("expected a node kind, found `{}`", self.text(&token)),
                    token.span,
                ));
            }
        };

        let mut children = Vec::new();
        loop {
            match self.peek() {
                None => return Err(QueryError::new("missing closing `)`", open)),
                Some(token) if token.kind == TokenKind::ParenClose => {
                    self.pos += 1;
                    break;
                }
                Some(_) => children.push(self.pattern(depth + 1)?),
            }
        }
        Ok(Pattern {
            kind,
            children,
            captures: Vec::new(),
        })
    }
}
