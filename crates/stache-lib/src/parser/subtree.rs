//! Subtrees on the parse stack.
//!
//! Visible nodes are built as rowan green nodes as soon as they are reduced.
//! Hidden rules (repetitions, `_name` rules) are kept as shared child lists
//! and only spliced into a parent when a visible node is built. Splicing and
//! dropping are iterative, so deep left-recursive repetitions neither recurse
//! nor copy their prefix on every step.

use std::sync::Arc;

use rowan::{GreenNode, GreenToken, NodeOrToken};
use stache_core::SymbolId;

pub(crate) type GreenElement = NodeOrToken<GreenNode, GreenToken>;

#[derive(Clone, Debug)]
pub(crate) enum Subtree {
    Element(GreenElement),
    Hidden(HiddenList),
    /// An `ERROR` node still collecting skipped tokens.
    Error(Vec<GreenElement>),
}

/// Children of a hidden rule.
#[derive(Clone, Debug)]
pub(crate) struct HiddenList(Arc<[Subtree]>);

impl std::ops::Deref for HiddenList {
    type Target = [Subtree];

    fn deref(&self) -> &[Subtree] {
        &self.0
    }
}

impl Drop for HiddenList {
    fn drop(&mut self) {
        let mut pending = vec![std::mem::replace(&mut self.0, Arc::new([]))];
        while let Some(mut list) = pending.pop() {
            let Some(children) = Arc::get_mut(&mut list) else {
                continue;
            };
            for child in children {
                if let Subtree::Hidden(nested) = child {
                    pending.push(std::mem::replace(&mut nested.0, Arc::new([])));
                }
            }
        }
    }
}

impl Subtree {
    pub fn token(symbol: SymbolId, text: &str) -> Self {
        Subtree::Element(NodeOrToken::Token(GreenToken::new(raw(symbol), text)))
    }

    pub fn node(symbol: SymbolId, children: &[Subtree]) -> Self {
        Subtree::Element(NodeOrToken::Node(build_node(symbol, children)))
    }

    pub fn hidden(children: Vec<Subtree>) -> Self {
        Subtree::Hidden(HiddenList(children.into()))
    }

    pub fn error(children: &[Subtree]) -> Self {
        let mut elements = Vec::new();
        for child in children {
            flatten_into(&mut elements, child);
        }
        Subtree::Error(elements)
    }

    /// Rename to `alias`. Hidden content becomes a visible node of that kind.
    pub fn aliased(self, alias: SymbolId) -> Self {
        match self {
            Subtree::Element(NodeOrToken::Token(token)) => {
                Subtree::Element(NodeOrToken::Token(GreenToken::new(raw(alias), token.text())))
            }
            Subtree::Element(NodeOrToken::Node(node)) => {
                let children: Vec<GreenElement> = green_children(&node).collect();
                Subtree::Element(NodeOrToken::Node(GreenNode::new(raw(alias), children)))
            }
            hidden @ (Subtree::Hidden(_) | Subtree::Error(_)) => {
                Subtree::node(alias, std::slice::from_ref(&hidden))
            }
        }
    }

    /// Append a skipped token to an open `ERROR` node.
    pub fn absorb(&mut self, token: GreenElement) -> bool {
        match self {
            Subtree::Error(elements) => {
                elements.push(token);
                true
            }
            _ => false,
        }
    }
}

#[inline]
pub(crate) fn raw(symbol: SymbolId) -> rowan::SyntaxKind {
    rowan::SyntaxKind(symbol.0)
}

pub(crate) fn build_node(symbol: SymbolId, children: &[Subtree]) -> GreenNode {
    let mut elements = Vec::with_capacity(children.len());
    for child in children {
        flatten_into(&mut elements, child);
    }
    GreenNode::new(raw(symbol), elements)
}

/// Owned children of a green node.
pub(crate) fn green_children(node: &GreenNode) -> impl Iterator<Item = GreenElement> + '_ {
    node.children().map(|child| match child {
        NodeOrToken::Node(node) => NodeOrToken::Node(node.to_owned()),
        NodeOrToken::Token(token) => NodeOrToken::Token(token.to_owned()),
    })
}

/// Append the green elements of `subtree`, splicing hidden rules in place.
pub(crate) fn flatten_into(out: &mut Vec<GreenElement>, subtree: &Subtree) {
    let mut pending = vec![subtree];
    while let Some(subtree) = pending.pop() {
        match subtree {
            Subtree::Element(element) => out.push(element.clone()),
            Subtree::Hidden(children) => pending.extend(children.iter().rev()),
            Subtree::Error(elements) => out.push(NodeOrToken::Node(GreenNode::new(
                raw(SymbolId::ERROR),
                elements.iter().cloned(),
            ))),
        }
    }
}
