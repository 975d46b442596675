//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use super::{SyntaxElement, Tree};

/// Assert that the leaves of `tree` tile its root range without gaps or
/// overlaps, carry the source bytes they cover, and that the root spans
/// the whole text (the parsed prefix for truncated trees).
pub fn check_coverage(tree: &Tree) {
    let root = tree.syntax();
    let range = root.text_range();
    let (start, end): (usize, usize) = (range.start().into(), range.end().into());
    assert_eq!(start, 0, "root must start at byte 0");
    match tree.truncation() {
        None => assert_eq!(end, tree.len(), "root must span the whole text"),
        Some(_) => assert!(end <= tree.len(), "truncated root overruns the text"),
    }

    let mut covered = 0;
    for element in root.descendants_with_tokens() {
        let SyntaxElement::Token(token) = element else {
            continue;
        };
        let token_range = token.text_range();
        let (from, to): (usize, usize) = (token_range.start().into(), token_range.end().into());
        assert_eq!(
            from, covered,
            "leaf `{}` at {from}..{to} leaves a gap or overlap at {covered}",
            tree.language().symbol_name(token.kind()),
        );
        assert_eq!(
            token.text(),
            &tree.text()[from..to],
            "leaf at {from}..{to} does not match the source"
        );
        covered = to;
    }
    assert_eq!(covered, end, "leaves stop at {covered}, root ends at {end}");
}
