//! Small grammars compiled on the fly for unit tests.

use indoc::indoc;
use stache_core::Grammar;

use crate::{ExternalScanner, Language, ScanCursor};

/// Statements of arithmetic expressions: `1 + 2 * x; (3);`.
pub const ARITHMETIC: &str = indoc! {r#"
    {
      "name": "arith",
      "extras": [{ "type": "PATTERN", "value": "\\s+" }],
      "rules": {
        "program": {
          "type": "REPEAT",
          "content": { "type": "SYMBOL", "name": "statement" }
        },
        "statement": {
          "type": "SEQ",
          "members": [
            { "type": "SYMBOL", "name": "expr" },
            { "type": "STRING", "value": ";" }
          ]
        },
        "expr": {
          "type": "CHOICE",
          "members": [
            {
              "type": "PREC_LEFT", "value": 1,
              "content": { "type": "SEQ", "members": [
                { "type": "SYMBOL", "name": "expr" },
                { "type": "STRING", "value": "+" },
                { "type": "SYMBOL", "name": "expr" }
              ]}
            },
            {
              "type": "PREC_LEFT", "value": 2,
              "content": { "type": "SEQ", "members": [
                { "type": "SYMBOL", "name": "expr" },
                { "type": "STRING", "value": "*" },
                { "type": "SYMBOL", "name": "expr" }
              ]}
            },
            {
              "type": "SEQ", "members": [
                { "type": "STRING", "value": "(" },
                { "type": "SYMBOL", "name": "expr" },
                { "type": "STRING", "value": ")" }
              ]
            },
            { "type": "SYMBOL", "name": "number" },
            { "type": "SYMBOL", "name": "identifier" }
          ]
        },
        "number": { "type": "PATTERN", "value": "\\d+" },
        "identifier": { "type": "PATTERN", "value": "[a-z_]+" }
      }
    }
"#};

/// Words and `{ ... }` blocks. Braces come from [`BlockScanner`], which
/// also closes blocks left open at end of input.
pub const BLOCKS: &str = indoc! {r#"
    {
      "name": "blocks",
      "extras": [{ "type": "PATTERN", "value": "\\s+" }],
      "externals": [
        { "type": "SYMBOL", "name": "_open" },
        { "type": "SYMBOL", "name": "_close" },
        { "type": "SYMBOL", "name": "_implicit_close" }
      ],
      "rules": {
        "document": {
          "type": "REPEAT",
          "content": { "type": "SYMBOL", "name": "_item" }
        },
        "_item": {
          "type": "CHOICE",
          "members": [
            { "type": "SYMBOL", "name": "word" },
            { "type": "SYMBOL", "name": "block" }
          ]
        },
        "block": {
          "type": "SEQ",
          "members": [
            { "type": "SYMBOL", "name": "_open" },
            {
              "type": "REPEAT",
              "content": { "type": "SYMBOL", "name": "_item" }
            },
            {
              "type": "CHOICE",
              "members": [
                { "type": "SYMBOL", "name": "_close" },
                { "type": "SYMBOL", "name": "_implicit_close" }
              ]
            }
          ]
        },
        "word": { "type": "PATTERN", "value": "[a-z]+" }
      }
    }
"#};

pub fn compile(json: &str) -> stache_core::ParseTable {
    let grammar = Grammar::from_json(json).unwrap();
    stache_compiler::compile(&grammar).unwrap()
}

pub fn arithmetic() -> Language {
    Language::load(&compile(ARITHMETIC)).unwrap()
}

pub fn blocks() -> Language {
    let factory = || -> Box<dyn ExternalScanner> { Box::new(BlockScanner::default()) };
    Language::load_with_scanner(&compile(BLOCKS), factory).unwrap()
}

const OPEN: usize = 0;
const CLOSE: usize = 1;
const IMPLICIT_CLOSE: usize = 2;

/// Tracks block depth so `}` only closes blocks that are open.
#[derive(Default)]
pub struct BlockScanner {
    depth: u8,
}

impl ExternalScanner for BlockScanner {
    fn scan(&mut self, cursor: &mut ScanCursor<'_>, valid: &[bool]) -> Option<usize> {
        while cursor.lookahead().is_ascii_whitespace() {
            cursor.skip();
        }
        if valid[OPEN] && cursor.lookahead() == '{' {
            cursor.advance();
            self.depth = self.depth.saturating_add(1);
            return Some(OPEN);
        }
        if self.depth == 0 {
            return None;
        }
        if valid[CLOSE] && cursor.lookahead() == '}' {
            cursor.advance();
            self.depth -= 1;
            return Some(CLOSE);
        }
        if valid[IMPLICIT_CLOSE] && cursor.eof() {
            self.depth -= 1;
            return Some(IMPLICIT_CLOSE);
        }
        None
    }

    fn serialize(&self, buf: &mut Vec<u8>) {
        buf.push(self.depth);
    }

    fn deserialize(&mut self, data: &[u8]) {
        self.depth = data.first().copied().unwrap_or(0);
    }
}
