use crate::test_utils;
use crate::tree::invariants::check_coverage;
use crate::{Parser, Tree};

fn parse_arithmetic(source: &str) -> Tree {
    let tree = Parser::new(&test_utils::arithmetic()).parse(source);
    check_coverage(&tree);
    assert_eq!(tree.text(), source);
    tree
}

#[test]
fn missing_operand_pops_into_error() {
    let tree = parse_arithmetic("1 + ;");

    assert!(tree.has_error());
    insta::assert_snapshot!(tree.to_sexp(), @"(program (statement (expr (number)) (ERROR)))");

    let diagnostics = tree.diagnostics();
    let rendered: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
    insta::assert_snapshot!(rendered.join("\n"), @"error at 1..4: unexpected `+` (inside statement at 0..5)");
}

#[test]
fn unrecognized_character() {
    let tree = parse_arithmetic("1 $ 2;");

    assert!(tree.has_error());
    let errors = tree
        .syntax()
        .descendants()
        .filter(|node| node.kind() == stache_core::SymbolId::ERROR)
        .count();
    assert!(errors >= 1);
    assert!(tree.diagnostics().has_errors());
}

#[test]
fn trailing_garbage_after_statements() {
    let tree = parse_arithmetic("1; 2; )");

    assert!(tree.has_error());
    let statements = tree
        .root_node()
        .named_children()
        .filter(|node| node.kind_name() == "statement")
        .count();
    assert_eq!(statements, 2);
}

#[test]
fn unterminated_statement_at_end() {
    let tree = parse_arithmetic("1; 2 + 3");

    assert!(tree.has_error());
    let first = tree.root_node().named_child(0).unwrap();
    assert_eq!(first.kind_name(), "statement");
    assert!(!first.has_error());
}

#[test]
fn error_free_statements_survive_an_error_between_them() {
    let tree = parse_arithmetic("1; ) 2;");

    assert!(tree.has_error());
    let valid: Vec<_> = tree
        .root_node()
        .named_children()
        .filter(|node| node.kind_name() == "statement" && !node.has_error())
        .map(|node| node.text().to_owned())
        .collect();
    assert_eq!(valid, ["1;", "2;"]);
}

#[test]
fn garbage_only() {
    for source in [")", "))))", "$%^", ";;;", "+"] {
        let tree = parse_arithmetic(source);
        assert!(tree.has_error(), "{source}");
        assert!(!tree.diagnostics().is_empty(), "{source}");
    }
}

#[test]
fn unexpected_close_brace_is_skipped() {
    let tree = Parser::new(&test_utils::blocks()).parse("a } b");
    check_coverage(&tree);

    assert!(tree.has_error());
    insta::assert_snapshot!(tree.to_sexp(), @"(document (word) (ERROR) (word))");
}

#[test]
fn deep_nesting_does_not_overflow() {
    let depth = 5_000;
    let source = format!("{}1{};", "(".repeat(depth), ")".repeat(depth));
    let tree = parse_arithmetic(&source);
    assert!(!tree.has_error());

    let source = format!("{}1;", "(".repeat(depth));
    let tree = parse_arithmetic(&source);
    assert!(tree.has_error());
}

#[test]
fn long_repetition() {
    let source = "x;".repeat(20_000);
    let tree = parse_arithmetic(&source);

    assert!(!tree.has_error());
    assert_eq!(tree.root_node().named_children().count(), 20_000);
}
