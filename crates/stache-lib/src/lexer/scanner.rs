//! External scanner protocol.
//!
//! Languages with context-sensitive tokens (indentation, raw text, tag
//! matching) supply an [`ExternalScanner`]. The lexer asks it first, passing
//! the external tokens valid in the current parse state. The scanner reads
//! the source through a [`ScanCursor`] and carries its own state, which the
//! runtime snapshots with `serialize` so that failed scans and incremental
//! reparses can restore it.

use std::sync::Arc;

/// Hand-written tokenizer for a language's external tokens.
pub trait ExternalScanner: Send {
    /// Try to recognize one external token at the cursor.
    ///
    /// `valid` is indexed by external token index. Returns the index of the
    /// recognized token, or `None` when nothing matched. The token spans from
    /// the last skipped character to the last `mark_end` (or to the cursor
    /// position when `mark_end` was never called).
    fn scan(&mut self, cursor: &mut ScanCursor<'_>, valid: &[bool]) -> Option<usize>;

    /// Append the scanner state to `buf`.
    fn serialize(&self, buf: &mut Vec<u8>);

    /// Restore state written by `serialize`. An empty slice means the initial state.
    fn deserialize(&mut self, data: &[u8]);
}

/// Creates a fresh scanner for each parse.
pub type ScannerFactory = Arc<dyn Fn() -> Box<dyn ExternalScanner> + Send + Sync>;

/// Read-only view of the source handed to an external scanner.
///
/// Tracks the furthest byte examined so incremental parsing knows which
/// edits can change the scanner's answer.
#[derive(Debug)]
pub struct ScanCursor<'s> {
    text: &'s str,
    position: usize,
    token_start: usize,
    marked_end: Option<usize>,
    furthest: usize,
}

impl<'s> ScanCursor<'s> {
    pub(crate) fn new(text: &'s str, position: usize) -> Self {
        Self {
            text,
            position,
            token_start: position,
            marked_end: None,
            furthest: position,
        }
    }

    /// Character at the cursor, `'\0'` at end of input.
    pub fn lookahead(&mut self) -> char {
        match self.text[self.position..].chars().next() {
            Some(c) => {
                self.touch(self.position + c.len_utf8());
                c
            }
            None => {
                self.touch(self.text.len() + 1);
                '\0'
            }
        }
    }

    /// Consume the current character as part of the token.
    pub fn advance(&mut self) {
        if let Some(c) = self.text[self.position..].chars().next() {
            self.position += c.len_utf8();
            self.touch(self.position);
        }
    }

    /// Consume the current character as leading whitespace. The token starts after it.
    pub fn skip(&mut self) {
        self.advance();
        self.token_start = self.position;
    }

    /// Mark the current position as the end of the token.
    pub fn mark_end(&mut self) {
        self.marked_end = Some(self.position);
    }

    pub fn eof(&mut self) -> bool {
        self.touch(self.position + 1);
        self.position >= self.text.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn token_start(&self) -> usize {
        self.token_start
    }

    pub(crate) fn token_end(&self) -> usize {
        self.marked_end
            .unwrap_or(self.position)
            .max(self.token_start)
    }

    /// End (exclusive) of the bytes the scanner looked at. Looking at end of
    /// input counts as one byte past it.
    pub(crate) fn furthest(&self) -> usize {
        self.furthest
    }

    #[inline]
    fn touch(&mut self, end: usize) {
        self.furthest = self.furthest.max(end);
    }
}
