//! Tree rendering for `parse` and `edit`.

use std::fmt::Write;

use serde::Serialize;
use stache_lib::{Node, Tree};

use super::CliError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TreeFormat {
    /// Named nodes only, as an s-expression.
    #[default]
    Sexp,
    /// Every visible node on its own line, with byte ranges.
    Tree,
    /// Visible nodes as nested JSON objects.
    Json,
}

pub fn render_tree(tree: &Tree, format: TreeFormat) -> Result<String, CliError> {
    Ok(match format {
        TreeFormat::Sexp => tree.to_sexp(),
        TreeFormat::Tree => render_outline(tree),
        TreeFormat::Json => serde_json::to_string_pretty(&JsonNode::new(tree.root_node()))?,
    })
}

/// Children as they appear in the tree: hidden rules are flattened into
/// their parents, trivia is dropped.
fn visible_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    for child in node.children() {
        if child.is_visible() || child.is_error() {
            out.push(child);
        } else if !child.is_leaf() {
            out.extend(visible_children(&child));
        }
    }
    out
}

fn render_outline(tree: &Tree) -> String {
    let mut out = String::new();
    outline_node(&mut out, &tree.root_node(), 0);
    out
}

fn outline_node(out: &mut String, node: &Node<'_>, depth: usize) {
    let indent = "  ".repeat(depth);
    let range = node.byte_range();
    let name = node.kind_name();
    let _ = if node.is_named() || node.is_error() {
        write!(out, "{indent}{name} {}..{}", range.start, range.end)
    } else {
        write!(out, "{indent}{name:?} {}..{}", range.start, range.end)
    };
    if node.is_leaf() && node.is_named() {
        let _ = write!(out, " {:?}", node.text());
    }
    out.push('\n');

    for child in visible_children(node) {
        outline_node(out, &child, depth + 1);
    }
}

#[derive(Serialize)]
struct JsonNode<'t> {
    kind: &'t str,
    named: bool,
    start: usize,
    end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'t str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<JsonNode<'t>>,
}

impl<'t> JsonNode<'t> {
    fn new(node: Node<'t>) -> Self {
        let range = node.byte_range();
        let children = visible_children(&node)
            .into_iter()
            .map(JsonNode::new)
            .collect::<Vec<_>>();
        Self {
            kind: node.kind_name(),
            named: node.is_named(),
            start: range.start,
            end: range.end,
            text: children.is_empty().then(|| node.text()),
            children,
        }
    }
}
