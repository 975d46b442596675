//! Tokens of the query language.
//!
//! Consecutive characters logos cannot match are coalesced into one
//! `Garbage` token so a malformed query yields a single error.

use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("_")]
    Underscore,

    /// `@name`; dots and hyphens are allowed as in tree-sitter queries.
    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_.\-]*")]
    Capture,

    /// ERROR keyword for matching error nodes
    #[token("ERROR")]
    KwError,

    /// Node kind. Defined after the keyword so the keyword takes precedence.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_.\-]*", priority = 1)]
    Id,

    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    StringLiteral,

    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r";[^\n]*", allow_greedy = true)]
    Comment,

    /// Consecutive unrecognized characters coalesced into one token
    Garbage,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// Tokenize `source`, dropping trivia.
pub(crate) fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    let mut garbage_start: Option<usize> = None;

    while let Some(result) = lexer.next() {
        match result {
            Ok(kind) => {
                if let Some(start) = garbage_start.take() {
                    tokens.push(Token {
                        kind: TokenKind::Garbage,
                        span: start..lexer.span().start,
                    });
                }
                if !kind.is_trivia() {
                    tokens.push(Token {
                        kind,
                        span: lexer.span(),
                    });
                }
            }
            Err(()) => {
                garbage_start.get_or_insert(lexer.span().start);
            }
        }
    }
    if let Some(start) = garbage_start {
        tokens.push(Token {
            kind: TokenKind::Garbage,
            span: start..source.len(),
        });
    }
    tokens
}

/// Contents of a string literal with `\"`, `\\`, `\n` and `\t` escapes resolved.
pub(crate) fn unescape(literal: &str) -> String {
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
