use std::fmt::Write;

use crate::test_utils;
use crate::{Parser, Tree};

fn parse(source: &str) -> Tree {
    Parser::new(&test_utils::arithmetic()).parse(source)
}

/// Visible nodes in pre-order, indented by cursor depth.
fn outline(tree: &Tree) -> String {
    let mut cursor = tree.walk();
    let mut out = String::new();
    loop {
        let node = cursor.node();
        if node.is_visible() {
            let indent = "  ".repeat(cursor.depth());
            writeln!(out, "{indent}{} {:?}", node.kind_name(), node.byte_range()).unwrap();
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return out;
            }
        }
    }
}

#[test]
fn sexp() {
    let tree = parse("1 + x;");
    insta::assert_snapshot!(tree.to_sexp(), @"(program (statement (expr (expr (number)) (expr (identifier)))))");

    let statement = tree.root_node().named_child(0).unwrap();
    insta::assert_snapshot!(statement.to_sexp(), @"(statement (expr (expr (number)) (expr (identifier))))");
}

#[test]
fn cursor_walk() {
    let tree = parse("1 + x;");
    insta::assert_snapshot!(outline(&tree), @r"
    program 0..6
      statement 0..6
        expr 0..5
          expr 0..1
            number 0..1
          + 2..3
          expr 4..5
            identifier 4..5
        ; 5..6
    ");
}

#[test]
fn cursor_stays_inside_its_node() {
    let tree = parse("1; 2;");
    let first = tree.root_node().named_child(0).unwrap();
    let mut cursor = crate::TreeCursor::new(first.clone());

    assert!(cursor.at_root());
    assert!(!cursor.goto_next_sibling());
    assert!(!cursor.goto_parent());
    assert!(cursor.goto_first_child());
    assert_eq!(cursor.depth(), 1);
    assert!(cursor.goto_next_sibling());
    assert_eq!(cursor.node().kind_name(), ";");
    assert!(!cursor.goto_next_sibling());
    assert!(cursor.goto_prev_sibling());
    assert!(cursor.goto_parent());
    assert!(cursor.at_root());
    assert_eq!(cursor.node(), first);

    cursor.reset(tree.root_node());
    assert_eq!(cursor.node().kind_name(), "program");
}

#[test]
fn cursor_child_for_byte() {
    let tree = parse("1; 2;");
    let mut cursor = tree.walk();

    assert_eq!(cursor.goto_first_child_for_byte(3), Some(2));
    assert_eq!(cursor.node().byte_range(), 3..5);
    assert_eq!(cursor.goto_first_child_for_byte(100), None);
}

#[test]
fn node_navigation() {
    let tree = parse("1 + x;");
    let root = tree.root_node();
    let identifier = root.descendant_for_byte_range(4..5).unwrap();

    assert_eq!(identifier.kind_name(), "identifier");
    assert!(identifier.is_named());
    assert!(identifier.is_leaf());
    assert_eq!(identifier.text(), "x");

    let expr = identifier.parent().unwrap();
    assert_eq!(expr.byte_range(), 4..5);
    let plus = expr.prev_sibling().and_then(|ws| ws.prev_sibling()).unwrap();
    assert_eq!(plus.kind_name(), "+");
    assert!(!plus.is_named());
    assert!(plus.is_visible());

    let sum = expr.parent().unwrap();
    assert_eq!(sum.child_count(), 5);
    assert_eq!(sum.named_children().count(), 2);
    assert_eq!(sum.child(2), Some(plus));
    assert_eq!(format!("{sum:?}"), "expr@0..5");
}

#[test]
fn descendant_for_byte_range() {
    let tree = parse("1 + x;");
    let root = tree.root_node();

    let sum = root.descendant_for_byte_range(0..5).unwrap();
    assert_eq!(sum.kind_name(), "expr");
    assert_eq!(sum.byte_range(), 0..5);

    assert!(root.descendant_for_byte_range(3..9).is_none());
    #[allow(clippy::reversed_empty_ranges)]
    let reversed = 4..2;
    assert!(root.descendant_for_byte_range(reversed).is_none());
}

#[test]
fn empty_tree_root() {
    let tree = parse("");

    assert!(tree.is_empty());
    assert_eq!(tree.root_node().byte_range(), 0..0);
    assert_eq!(tree.root_node().child_count(), 0);
    assert!(tree.diagnostics().is_empty());
}

#[test]
fn error_nodes() {
    let tree = parse("1 + ;");
    let root = tree.root_node();

    assert!(root.has_error());
    let error = root.descendant_for_byte_range(2..3).unwrap();
    assert_eq!(error.kind_name(), "+");
    assert!(error.parent().unwrap().is_error());

    let statement = root.named_child(0).unwrap();
    assert!(statement.has_error());
}

#[test]
fn diagnostics_render() {
    let tree = parse("1 + ;");
    let rendered = tree.diagnostics().render(tree.text());

    assert!(rendered.starts_with("error: unexpected `+`\n"), "{rendered}");
    assert!(rendered.contains("1 | 1 + ;"), "{rendered}");
    assert!(rendered.contains("inside statement"), "{rendered}");
}

#[test]
fn debug_output() {
    let tree = parse("1;");
    insta::assert_snapshot!(format!("{tree:?}"), @r#"Tree { language: "arith", len: 2, has_error: false, truncation: None }"#);
}
