use std::ops::Range;

use rowan::WalkEvent;
use stache_core::SymbolId;

use super::{Pattern, PatternKind, Query};
use crate::tree::{Node, SyntaxElement};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCapture<'q, 't> {
    pub index: usize,
    pub name: &'q str,
    pub node: Node<'t>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMatch<'q, 't> {
    /// Index of the matching top-level pattern.
    pub pattern: usize,
    pub captures: Vec<QueryCapture<'q, 't>>,
}

/// Runs queries over subtrees, optionally restricted to a byte range.
#[derive(Debug, Clone, Default)]
pub struct QueryCursor {
    range: Option<Range<usize>>,
}

impl QueryCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only report matches whose node intersects `range`.
    pub fn set_byte_range(&mut self, range: Range<usize>) -> &mut Self {
        self.range = Some(range);
        self
    }

    /// Every match in `node`'s subtree, in pre-order of the matched nodes,
    /// then by pattern index.
    pub fn matches<'q, 't>(&self, query: &'q Query, node: Node<'t>) -> Vec<QueryMatch<'q, 't>> {
        let tree = node.tree();
        let mut matches = Vec::new();
        let mut candidates = Vec::new();
        match node.syntax() {
            SyntaxElement::Token(_) => candidates.push(node.clone()),
            SyntaxElement::Node(root) => {
                for event in root.preorder_with_tokens() {
                    if let WalkEvent::Enter(element) = event {
                        candidates.push(Node::new(tree, element));
                    }
                }
            }
        }

        for candidate in candidates {
            if !candidate.is_visible() || !self.in_range(&candidate) {
                continue;
            }
            for (index, pattern) in query.patterns().iter().enumerate() {
                let mut captured = Vec::new();
                if match_node(pattern, &candidate, &mut captured) {
                    matches.push(QueryMatch {
                        pattern: index,
                        captures: captured
                            .into_iter()
                            .map(|(index, node)| QueryCapture {
                                index,
                                name: query.capture_names()[index].as_str(),
                                node,
                            })
                            .collect(),
                    });
                }
            }
        }
        matches
    }

    /// Captures of every match, in document order (outer nodes first).
    pub fn captures<'q, 't>(&self, query: &'q Query, node: Node<'t>) -> Vec<QueryCapture<'q, 't>> {
        let mut captures: Vec<QueryCapture<'q, 't>> = self
            .matches(query, node)
            .into_iter()
            .flat_map(|m| m.captures)
            .collect();
        captures.sort_by_key(|c| (c.node.start_byte(), std::cmp::Reverse(c.node.end_byte())));
        captures
    }

    fn in_range(&self, node: &Node<'_>) -> bool {
        let Some(range) = &self.range else {
            return true;
        };
        let own = node.byte_range();
        (own.start < range.end && range.start < own.end)
            || (own.is_empty() && range.contains(&own.start))
    }
}

fn kind_matches(kind: PatternKind, node: &Node<'_>) -> bool {
    match kind {
        PatternKind::Symbol(SymbolId::ERROR) => node.is_error() && !node.is_leaf(),
        PatternKind::Symbol(symbol) => node.kind() == symbol,
        PatternKind::AnyNamed => node.is_named(),
        PatternKind::Any => true,
    }
}

fn match_node<'t>(pattern: &Pattern, node: &Node<'t>, captured: &mut Vec<(usize, Node<'t>)>) -> bool {
    if !node.is_visible() || !kind_matches(pattern.kind, node) {
        return false;
    }
    let mark = captured.len();
    captured.extend(pattern.captures.iter().map(|&index| (index, node.clone())));
    if pattern.children.is_empty() {
        return true;
    }
    let children: Vec<Node<'t>> = node.children().filter(Node::is_visible).collect();
    if match_children(&pattern.children, &children, captured) {
        return true;
    }
    captured.truncate(mark);
    false
}

/// Match `patterns` against an in-order subsequence of `children`, leftmost first.
fn match_children<'t>(
    patterns: &[Pattern],
    children: &[Node<'t>],
    captured: &mut Vec<(usize, Node<'t>)>,
) -> bool {
    let Some((first, rest)) = patterns.split_first() else {
        return true;
    };
    for (i, child) in children.iter().enumerate() {
        let mark = captured.len();
        if match_node(first, child, captured) && match_children(rest, &children[i + 1..], captured) {
            return true;
        }
        captured.truncate(mark);
    }
    false
}
