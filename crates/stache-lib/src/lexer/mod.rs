//! Lexer: turns source bytes into leaves for the parser.
//!
//! The lexer is driven by the parser: every call names the parse state, and
//! only terminals with an action in that state (plus extras) are tried first.
//! Lexing never fails. Unexpected input becomes a token the parser cannot use
//! or a one-character `ERROR` token, and the parser recovers from there.

mod matcher;
mod scanner;

#[cfg(test)]
mod lexer_tests;

use std::sync::Arc;

use stache_core::{StateId, SymbolId};

use crate::language::Language;

pub(crate) use matcher::Matcher;
pub use scanner::{ExternalScanner, ScanCursor, ScannerFactory};

/// One lexed token, possibly preceded by bytes an external scanner skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Leaf {
    pub symbol: SymbolId,
    /// Position the lexer was called at. `trivia_start..start` was skipped.
    pub trivia_start: usize,
    pub start: usize,
    pub end: usize,
    /// End (exclusive) of all bytes examined to produce this leaf.
    pub lookahead_end: usize,
}

impl Leaf {
    pub fn is_end(&self) -> bool {
        self.symbol == SymbolId::END
    }

    pub fn has_trivia(&self) -> bool {
        self.trivia_start < self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn shifted(self, delta: isize) -> Leaf {
        let shift = |at: usize| at.saturating_add_signed(delta);
        Leaf {
            symbol: self.symbol,
            trivia_start: shift(self.trivia_start),
            start: shift(self.start),
            end: shift(self.end),
            lookahead_end: shift(self.lookahead_end),
        }
    }
}

/// Lexer over one source text, owning the external scanner instance.
pub(crate) struct Lexer<'s> {
    language: Language,
    source: &'s str,
    scanner: Option<Box<dyn ExternalScanner>>,
    /// Serialized form of the scanner's current state.
    state: Arc<[u8]>,
    snapshot: Vec<u8>,
}

impl<'s> Lexer<'s> {
    pub fn new(language: &Language, source: &'s str) -> Self {
        let scanner = language.new_scanner();
        let mut buf = Vec::new();
        if let Some(scanner) = &scanner {
            scanner.serialize(&mut buf);
        }
        Self {
            language: language.clone(),
            source,
            scanner,
            state: buf.into(),
            snapshot: Vec::new(),
        }
    }

    /// Serialized scanner state (empty when the language has no scanner).
    pub fn scanner_state(&self) -> Arc<[u8]> {
        Arc::clone(&self.state)
    }

    pub fn restore_scanner(&mut self, state: Arc<[u8]>) {
        if let Some(scanner) = &mut self.scanner {
            scanner.deserialize(&state);
        }
        self.state = state;
    }

    /// Produce the next leaf at `pos` for parse state `state`.
    pub fn lex(&mut self, pos: usize, state: StateId, externals: bool) -> Leaf {
        let mut examined = pos;

        if externals {
            match self.scan_external(pos, state) {
                Ok(leaf) => return leaf,
                Err(furthest) => examined = examined.max(furthest),
            }
        }

        let bytes = self.source.as_bytes();
        let mode = self.language.lex_mode(state);
        if let Some(leaf) = self.longest_match(pos, mode.terminals.iter().copied(), &mut examined)
        {
            return leaf;
        }
        let all = 0..self.language.table().terminals.len();
        if let Some(leaf) = self.longest_match(pos, all, &mut examined) {
            return leaf;
        }

        if pos >= bytes.len() {
            return Leaf {
                symbol: SymbolId::END,
                trivia_start: pos,
                start: pos,
                end: pos,
                lookahead_end: examined.max(bytes.len() + 1),
            };
        }

        let width = self.source[pos..].chars().next().map_or(1, char::len_utf8);
        tracing::trace!(pos, "unrecognized character");
        Leaf {
            symbol: SymbolId::ERROR,
            trivia_start: pos,
            start: pos,
            end: pos + width,
            lookahead_end: examined.max(pos + width),
        }
    }

    /// Run the external scanner. On failure its state is rolled back and the
    /// furthest examined byte is returned.
    fn scan_external(&mut self, pos: usize, state: StateId) -> Result<Leaf, usize> {
        let mode = self.language.lex_mode(state);
        let Some(scanner) = self.scanner.as_mut() else {
            return Err(pos);
        };
        if !mode.any_external {
            return Err(pos);
        }

        self.snapshot.clear();
        scanner.serialize(&mut self.snapshot);

        let mut cursor = ScanCursor::new(self.source, pos);
        let table = self.language.table();
        let found = scanner
            .scan(&mut cursor, &mode.externals)
            .and_then(|index| table.externals.get(index).copied());

        match found {
            Some(symbol) => {
                let mut buf = Vec::with_capacity(self.snapshot.len());
                scanner.serialize(&mut buf);
                self.state = buf.into();
                let end = cursor.token_end();
                Ok(Leaf {
                    symbol,
                    trivia_start: pos,
                    start: cursor.token_start(),
                    end,
                    lookahead_end: cursor.furthest().max(end),
                })
            }
            None => {
                scanner.deserialize(&self.snapshot);
                Err(cursor.furthest())
            }
        }
    }

    /// Longest match among the given terminal indices. Literals win ties
    /// over patterns, then earlier terminals win.
    fn longest_match(
        &self,
        pos: usize,
        candidates: impl Iterator<Item = usize>,
        examined: &mut usize,
    ) -> Option<Leaf> {
        let bytes = self.source.as_bytes();
        let table = self.language.table();
        let mut best: Option<(usize, bool, usize)> = None;

        for index in candidates {
            let matcher = self.language.matcher(index);
            let attempt = matcher.attempt(bytes, pos);
            *examined = (*examined).max(attempt.examined);
            let Some(len) = attempt.len else {
                continue;
            };
            let better = match best {
                None => true,
                Some((best_len, best_literal, best_index)) => {
                    len > best_len
                        || (len == best_len
                            && (matcher.is_literal(), std::cmp::Reverse(index))
                                > (best_literal, std::cmp::Reverse(best_index)))
                }
            };
            if better {
                best = Some((len, matcher.is_literal(), index));
            }
        }

        let (len, _, index) = best?;
        Some(Leaf {
            symbol: table.terminals[index].symbol,
            trivia_start: pos,
            start: pos,
            end: pos + len,
            lookahead_end: *examined,
        })
    }
}
