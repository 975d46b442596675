use std::ops::Range;

use super::{ChangeSet, IncrementalStats, TextChange, validate_changes};
use crate::test_utils;
use crate::tree::invariants::check_coverage;
use crate::{Error, Language, Parser, Tree};

/// Apply one edit incrementally and compare against a fresh parse.
fn edit_and_compare(parser: &Parser, old: &Tree, range: Range<usize>, text: &str) -> Tree {
    let new = parser.edit(old, range.clone(), text).unwrap();
    let full = parser.parse(new.text());
    assert_eq!(
        new.green(),
        full.green(),
        "edit {range:?} -> {text:?} of {:?} gives a different tree than a full parse of {:?}",
        old.text(),
        new.text(),
    );
    assert_eq!(new.has_error(), full.has_error());
    check_coverage(&new);
    new
}

/// Every replacement of up to two bytes with each of `texts`.
fn all_small_edits(language: &Language, source: &str, texts: &[&str]) {
    let parser = Parser::new(language);
    let old = parser.parse(source);
    for start in 0..=source.len() {
        for end in start..=(start + 2).min(source.len()) {
            for text in texts {
                edit_and_compare(&parser, &old, start..end, text);
            }
        }
    }
}

#[test]
fn arithmetic_edits_match_full_parse() {
    let language = test_utils::arithmetic();
    all_small_edits(
        &language,
        "1 + 2 * x;\n(y);",
        &["", "1", "+", ";", " ", "(", ")", "ab"],
    );
}

#[test]
fn arithmetic_edits_of_broken_input_match_full_parse() {
    let language = test_utils::arithmetic();
    all_small_edits(&language, "1 + ; ) 2 (", &["", "3", ";", ")"]);
}

#[test]
fn scanner_edits_match_full_parse() {
    let language = test_utils::blocks();
    all_small_edits(&language, "a {b c} {d", &["", "{", "}", " ", "x", "\n"]);
}

#[test]
fn typing_a_document_character_by_character() {
    let parser = Parser::new(&test_utils::blocks());
    let target = "{a {b}} c {d";
    let mut tree = parser.parse("");
    for (i, c) in target.char_indices() {
        tree = edit_and_compare(&parser, &tree, i..i, c.encode_utf8(&mut [0; 4]));
    }
    assert_eq!(tree.text(), target);
}

#[test]
fn deleting_from_the_front() {
    let parser = Parser::new(&test_utils::arithmetic());
    let mut tree = parser.parse("1; 2 + 3; (4); x * y;");
    while !tree.is_empty() {
        tree = edit_and_compare(&parser, &tree, 0..1, "");
    }
}

#[test]
fn reparse_of_a_reparse() {
    let parser = Parser::new(&test_utils::arithmetic());
    let tree = parser.parse("a; b; c; d; e;");
    let tree = edit_and_compare(&parser, &tree, 3..4, "bb");
    let tree = edit_and_compare(&parser, &tree, 10..11, "d + 1");
    let tree = edit_and_compare(&parser, &tree, 0..1, "(a)");
    insta::assert_snapshot!(tree.text(), @"(a); bb; c; d + 1; e;");
}

#[test]
fn multiple_changes_at_once() {
    let parser = Parser::new(&test_utils::arithmetic());
    let old = parser.parse("1 + 2;\n3 * 4;");
    let changes = [TextChange::replace(0, 1, 2), TextChange::replace(11, 1, 2)];
    let source = "10 + 2;\n3 * 40;";

    let new = parser.parse_incremental(&old, &changes, source).unwrap();
    assert_eq!(new.green(), parser.parse(source).green());
}

#[test]
fn local_edit_reuses_most_of_the_tree() {
    let parser = Parser::new(&test_utils::arithmetic());
    let source = "x + 1;\n".repeat(200);
    let old = parser.parse(&source);
    assert_eq!(old.stats().reused_nodes, 0);
    assert_eq!(old.stats().reused_bytes, 0);

    let middle = source.len() / 2;
    let at = middle + source[middle..].find('x').unwrap();
    let new = edit_and_compare(&parser, &old, at..at + 1, "y");

    let stats = new.stats();
    assert!(stats.reused_nodes > 0);
    assert!(stats.reuse_rate() > 0.9, "{stats:?}");
    assert!(stats.lexed_leaves < 20, "{stats:?}");
}

#[test]
fn unchanged_text_reuses_everything() {
    let parser = Parser::new(&test_utils::blocks());
    let old = parser.parse("a {b {c}} d");
    let new = parser.parse_incremental(&old, &[], old.text()).unwrap();

    assert_eq!(new.green(), old.green());
    assert_eq!(new.stats().lexed_bytes, 0);
}

#[test]
fn stats_reuse_rate() {
    assert_eq!(IncrementalStats::default().reuse_rate(), 0.0);
    let stats = IncrementalStats {
        reused_bytes: 3,
        lexed_bytes: 1,
        ..IncrementalStats::default()
    };
    assert_eq!(stats.reuse_rate(), 0.75);
}

#[test]
fn text_change_helpers() {
    let change = TextChange::replace(4, 2, 5);
    assert_eq!(change.old_len(), 2);
    assert_eq!(change.delta(), 3);
    assert_eq!(change.new_end(), 9);
    assert!(change.intersects(5..8));
    assert!(!change.intersects(6..8));
    assert!(!TextChange::insert(3, 1).intersects(0..3));
}

#[test]
fn insertions_touch_their_boundaries() {
    let insert = TextChange::insert(5, 2);
    assert!(insert.touches(5, 9));
    assert!(insert.touches(0, 5));
    assert!(!insert.touches(6, 9));
}

#[test]
fn change_set_maps_positions_back() {
    let changes = [TextChange::replace(2, 1, 3), TextChange::delete(6, 2)];
    let set = ChangeSet::new(&changes);

    assert_eq!(set.to_old(0), Some(0));
    assert_eq!(set.to_old(2), None);
    assert_eq!(set.to_old(5), None);
    assert_eq!(set.to_old(6), Some(4));
    assert_eq!(set.to_old(8), None);
    assert_eq!(set.to_old(9), Some(9));
}

#[test]
fn invalid_changes() {
    let check = |changes: &[TextChange], old_len, new_len| {
        match validate_changes(changes, old_len, new_len) {
            Err(Error::InvalidEdit(message)) => message,
            other => panic!("expected an invalid edit, got {other:?}"),
        }
    };

    insta::assert_snapshot!(
        check(&[TextChange::new(3, 2, 0)], 5, 6),
        @"change 0 starts after it ends (3..2)"
    );
    insta::assert_snapshot!(
        check(&[TextChange::delete(4, 3)], 5, 2),
        @"change 0 ends at 7 past the old text (5 bytes)"
    );
    insta::assert_snapshot!(
        check(&[TextChange::delete(2, 2), TextChange::insert(3, 1)], 5, 4),
        @"change 1 at 3 overlaps or precedes the previous change"
    );
    insta::assert_snapshot!(
        check(&[TextChange::insert(0, 2)], 5, 5),
        @"changes produce 7 bytes but the new text has 5"
    );
    assert!(validate_changes(&[TextChange::insert(5, 1)], 5, 6).is_ok());
}

#[test]
fn mismatched_new_text_is_rejected() {
    let parser = Parser::new(&test_utils::arithmetic());
    let old = parser.parse("1;");
    let result = parser.parse_incremental(&old, &[TextChange::insert(0, 1)], "1;");
    assert!(matches!(result, Err(Error::InvalidEdit(_))));
}
