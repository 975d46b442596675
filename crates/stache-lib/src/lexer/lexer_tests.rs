use std::sync::Arc;

use super::Lexer;
use crate::Language;
use crate::test_utils;

/// Lex the whole source in the start state, one leaf per line.
fn tokens(language: &Language, source: &str) -> String {
    let state = language.table().start_state;
    let mut lexer = Lexer::new(language, source);
    let mut pos = 0;
    let mut out = Vec::new();
    loop {
        let leaf = lexer.lex(pos, state, true);
        if leaf.is_end() {
            break;
        }
        let name = if language.is_extra(leaf.symbol) {
            "~"
        } else {
            language.symbol_name(leaf.symbol)
        };
        out.push(format!("{name} {}..{}", leaf.start, leaf.end));
        pos = leaf.end;
    }
    out.join("\n")
}

#[test]
fn longest_match_and_literals() {
    let language = test_utils::arithmetic();
    insta::assert_snapshot!(tokens(&language, "12 + x_y;"), @r"
    number 0..2
    ~ 2..3
    + 3..4
    ~ 4..5
    identifier 5..8
    ; 8..9
    ");
}

#[test]
fn unrecognized_character_becomes_error_leaf() {
    let language = test_utils::arithmetic();
    insta::assert_snapshot!(tokens(&language, "1é2"), @r"
    number 0..1
    ERROR 1..3
    number 3..4
    ");
}

#[test]
fn end_of_input_examines_one_past_the_end() {
    let language = test_utils::arithmetic();
    let mut lexer = Lexer::new(&language, "");
    let leaf = lexer.lex(0, language.table().start_state, true);

    assert!(leaf.is_end());
    assert_eq!((leaf.start, leaf.end), (0, 0));
    assert_eq!(leaf.lookahead_end, 1);
}

#[test]
fn literal_lookahead_stops_at_mismatch() {
    let language = test_utils::arithmetic();
    let mut lexer = Lexer::new(&language, "+1");
    let leaf = lexer.lex(0, language.table().start_state, true);

    assert_eq!(language.symbol_name(leaf.symbol), "+");
    assert_eq!(leaf.end, 1);
    assert_eq!(leaf.lookahead_end, 1);
}

#[test]
fn pattern_lookahead_covers_the_terminating_byte() {
    let language = test_utils::arithmetic();
    let mut lexer = Lexer::new(&language, "123;");
    let leaf = lexer.lex(0, language.table().start_state, true);

    assert_eq!(leaf.end, 3);
    assert!(leaf.lookahead_end > 3);
}

#[test]
fn external_token_with_skipped_whitespace() {
    let language = test_utils::blocks();
    let mut lexer = Lexer::new(&language, "a {b}");
    assert_eq!(&*lexer.scanner_state(), &[0]);

    let leaf = lexer.lex(1, language.table().start_state, true);
    assert_eq!(language.symbol_name(leaf.symbol), "_open");
    assert!(leaf.has_trivia());
    assert_eq!((leaf.trivia_start, leaf.start, leaf.end), (1, 2, 3));
    assert_eq!(&*lexer.scanner_state(), &[1]);
}

#[test]
fn failed_scan_keeps_scanner_state() {
    let language = test_utils::blocks();
    let mut lexer = Lexer::new(&language, "{ word");
    let state = language.table().start_state;

    let open = lexer.lex(0, state, true);
    assert_eq!(language.symbol_name(open.symbol), "_open");

    // The scanner skips the space, finds no brace and rolls back.
    let space = lexer.lex(1, state, true);
    assert!(language.is_extra(space.symbol));
    assert!(!space.has_trivia());
    assert_eq!(&*lexer.scanner_state(), &[1]);
}

#[test]
fn disabled_externals_fall_back_to_internal_terminals() {
    let language = test_utils::blocks();
    let mut lexer = Lexer::new(&language, "{");
    let leaf = lexer.lex(0, language.table().start_state, false);

    assert_eq!(leaf.symbol, stache_core::SymbolId::ERROR);
    assert_eq!(&*lexer.scanner_state(), &[0]);
}

#[test]
fn restore_scanner_replaces_state() {
    let language = test_utils::blocks();
    let mut lexer = Lexer::new(&language, "}");
    lexer.restore_scanner(Arc::from(&[2u8][..]));
    assert_eq!(&*lexer.scanner_state(), &[2]);
}
