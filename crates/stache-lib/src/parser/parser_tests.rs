use crate::test_utils;
use crate::tree::invariants::check_coverage;
use crate::{Budget, Error, ParseOptions, Parser};

#[test]
fn precedence_and_associativity() {
    let parser = Parser::new(&test_utils::arithmetic());

    let tree = parser.parse("1 + 2 * 3;");
    insta::assert_snapshot!(tree.to_sexp(), @"(program (statement (expr (expr (number)) (expr (expr (number)) (expr (number))))))");

    let tree = parser.parse("1 + 2 + 3;");
    insta::assert_snapshot!(tree.to_sexp(), @"(program (statement (expr (expr (expr (number)) (expr (number))) (expr (number)))))");
}

#[test]
fn parentheses_and_repetition() {
    let parser = Parser::new(&test_utils::arithmetic());
    let tree = parser.parse("(a);\nb * 2;");

    insta::assert_snapshot!(tree.to_sexp(), @"(program (statement (expr (expr (identifier)))) (statement (expr (expr (identifier)) (expr (number)))))");
    assert!(!tree.has_error());
    check_coverage(&tree);
}

#[test]
fn empty_input() {
    let parser = Parser::new(&test_utils::arithmetic());
    let tree = parser.parse("");

    insta::assert_snapshot!(tree.to_sexp(), @"(program)");
    assert_eq!(tree.root_node().byte_range(), 0..0);
    assert!(!tree.has_error());
}

#[test]
fn whitespace_only_input() {
    let parser = Parser::new(&test_utils::arithmetic());
    let tree = parser.parse("  \n\t");

    insta::assert_snapshot!(tree.to_sexp(), @"(program)");
    assert_eq!(tree.root_node().byte_range(), 0..4);
    assert!(!tree.has_error());
    check_coverage(&tree);
}

#[test]
fn tree_text_is_the_source() {
    let parser = Parser::new(&test_utils::arithmetic());
    let source = "x * (1 + y);  z;\n";
    let tree = parser.parse(source);

    assert_eq!(tree.text(), source);
    assert_eq!(tree.syntax().text().to_string(), source);
    check_coverage(&tree);
}

#[test]
fn external_tokens() {
    let parser = Parser::new(&test_utils::blocks());

    let tree = parser.parse("a {b} c");
    insta::assert_snapshot!(tree.to_sexp(), @"(document (word) (block (word)) (word))");
    assert!(!tree.has_error());
    check_coverage(&tree);

    let tree = parser.parse("{ }");
    insta::assert_snapshot!(tree.to_sexp(), @"(document (block))");
    check_coverage(&tree);
}

#[test]
fn zero_width_token_closes_blocks_at_end() {
    let parser = Parser::new(&test_utils::blocks());

    let tree = parser.parse("{{a}");
    insta::assert_snapshot!(tree.to_sexp(), @"(document (block (block (word))))");
    assert!(!tree.has_error());
    check_coverage(&tree);

    let block = tree.root_node().named_child(0).unwrap();
    assert_eq!(block.byte_range(), 0..4);
}

#[test]
fn max_ops_truncates() {
    let options = ParseOptions::new().budget(Budget::new().max_ops(3));
    let parser = Parser::with_options(&test_utils::arithmetic(), options);
    let tree = parser.parse("1 + 2 + 3 + 4;");

    assert!(tree.is_truncated());
    let exceeded = tree.truncation().unwrap();
    assert!(exceeded.ops > 3);
    check_coverage(&tree);
    assert!(tree.complete().is_err());
}

#[test]
fn max_bytes_truncates() {
    let options = ParseOptions::new().budget(Budget::new().max_bytes(4));
    let parser = Parser::with_options(&test_utils::arithmetic(), options);
    let tree = parser.parse("1; 2; 3;");

    let exceeded = tree.truncation().unwrap();
    assert_eq!(exceeded.bytes, 4);
    assert_eq!(tree.root_node().end_byte(), 4);
    check_coverage(&tree);

    let diagnostics = tree.diagnostics();
    assert!(diagnostics.has_warnings());
    assert!(!diagnostics.has_errors());
}

#[test]
fn generous_budget_completes() {
    let options = ParseOptions::new().budget(Budget::new());
    let parser = Parser::with_options(&test_utils::arithmetic(), options);
    let tree = parser.parse("1; 2; 3;");

    assert!(!tree.is_truncated());
    assert!(tree.complete().is_ok());
}

#[test]
fn edit_rejects_bad_ranges() {
    let parser = Parser::new(&test_utils::arithmetic());
    let tree = parser.parse("1;");

    assert!(matches!(parser.edit(&tree, 1..5, "x"), Err(Error::InvalidEdit(_))));
    #[allow(clippy::reversed_empty_ranges)]
    let reversed = 2..1;
    assert!(matches!(parser.edit(&tree, reversed, "x"), Err(Error::InvalidEdit(_))));
}

#[test]
fn edit_rejects_split_characters() {
    let parser = Parser::new(&test_utils::arithmetic());
    let tree = parser.parse("é;");

    assert!(matches!(parser.edit(&tree, 1..2, ""), Err(Error::InvalidEdit(_))));
}

#[test]
fn incremental_parse_needs_the_same_language() {
    let arithmetic = Parser::new(&test_utils::arithmetic());
    let other = Parser::new(&test_utils::arithmetic());
    let tree = arithmetic.parse("1;");

    assert!(matches!(other.edit(&tree, 0..1, "2"), Err(Error::InvalidEdit(_))));
}

#[test]
fn parser_is_reusable() {
    let parser = Parser::new(&test_utils::arithmetic());
    let first = parser.parse("1;");
    let second = parser.parse("1;");

    assert_eq!(first.green(), second.green());
    assert!(first.language().same_as(parser.language()));
}
