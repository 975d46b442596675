//! S-expression rendering.
//!
//! Only visible named nodes are printed, the same view tree-sitter tools
//! give: `(document (element (start_tag (tag_name)) (text) (end_tag (tag_name))))`.
//! Unrecognized characters show up through their enclosing `(ERROR)` node.

use rowan::WalkEvent;
use stache_core::SymbolId;

use super::{Node, SyntaxElement};

pub(super) fn render(node: &Node<'_>) -> String {
    let language = node.tree().language();
    let shown = |element: &SyntaxElement| {
        let kind = element.kind();
        if kind == SymbolId::ERROR {
            return element.as_node().is_some();
        }
        language.is_named(kind) && language.is_visible(kind)
    };

    let mut out = String::new();
    let open = |out: &mut String, element: &SyntaxElement| {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push('(');
        out.push_str(language.symbol_name(element.kind()));
    };

    let root = match node.syntax() {
        SyntaxElement::Token(_) => {
            if shown(node.syntax()) {
                open(&mut out, node.syntax());
                out.push(')');
            }
            return out;
        }
        SyntaxElement::Node(root) => root,
    };

    for event in root.preorder_with_tokens() {
        match event {
            WalkEvent::Enter(element) if shown(&element) => open(&mut out, &element),
            WalkEvent::Leave(element) if shown(&element) => out.push(')'),
            _ => {}
        }
    }
    out
}
