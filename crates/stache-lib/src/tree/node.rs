use std::fmt;
use std::ops::Range;

use stache_core::SymbolId;

use super::{SyntaxElement, Tree};

/// A node or leaf of a [`Tree`], with absolute byte offsets.
#[derive(Clone)]
pub struct Node<'t> {
    tree: &'t Tree,
    element: SyntaxElement,
}

impl<'t> Node<'t> {
    pub(crate) fn new(tree: &'t Tree, element: SyntaxElement) -> Self {
        Self { tree, element }
    }

    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    pub fn syntax(&self) -> &SyntaxElement {
        &self.element
    }

    pub fn kind(&self) -> SymbolId {
        self.element.kind()
    }

    pub fn kind_name(&self) -> &'t str {
        self.tree.language().symbol_name(self.kind())
    }

    pub fn is_named(&self) -> bool {
        self.tree.language().is_named(self.kind())
    }

    pub fn is_visible(&self) -> bool {
        self.tree.language().is_visible(self.kind())
    }

    pub fn is_error(&self) -> bool {
        self.kind() == SymbolId::ERROR
    }

    pub fn is_leaf(&self) -> bool {
        self.element.as_token().is_some()
    }

    pub fn byte_range(&self) -> Range<usize> {
        let range = self.element.text_range();
        range.start().into()..range.end().into()
    }

    pub fn start_byte(&self) -> usize {
        self.element.text_range().start().into()
    }

    pub fn end_byte(&self) -> usize {
        self.element.text_range().end().into()
    }

    pub fn text(&self) -> &'t str {
        &self.tree.text()[self.byte_range()]
    }

    pub fn parent(&self) -> Option<Node<'t>> {
        self.element
            .parent()
            .map(|parent| Node::new(self.tree, SyntaxElement::Node(parent)))
    }

    /// All children, including anonymous tokens and skipped trivia.
    pub fn children(&self) -> Children<'t> {
        Children {
            tree: self.tree,
            next: self
                .element
                .as_node()
                .and_then(|node| node.first_child_or_token()),
        }
    }

    /// Visible named children.
    pub fn named_children(&self) -> impl Iterator<Item = Node<'t>> + use<'t> {
        self.children()
            .filter(|child| child.is_named() && child.is_visible())
    }

    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    pub fn child(&self, index: usize) -> Option<Node<'t>> {
        self.children().nth(index)
    }

    pub fn named_child(&self, index: usize) -> Option<Node<'t>> {
        self.named_children().nth(index)
    }

    pub fn next_sibling(&self) -> Option<Node<'t>> {
        self.element
            .next_sibling_or_token()
            .map(|element| Node::new(self.tree, element))
    }

    pub fn prev_sibling(&self) -> Option<Node<'t>> {
        self.element
            .prev_sibling_or_token()
            .map(|element| Node::new(self.tree, element))
    }

    /// Smallest node within this one spanning `range`. Non-empty ranges
    /// never resolve to empty nodes.
    pub fn descendant_for_byte_range(&self, range: Range<usize>) -> Option<Node<'t>> {
        let covers = |node: &Node<'t>| {
            let own = node.byte_range();
            own.start <= range.start
                && range.end <= own.end
                && (range.is_empty() || !own.is_empty())
        };
        if range.start > range.end || !covers(self) {
            return None;
        }
        let mut node = self.clone();
        while let Some(child) = node.children().find(|child| covers(child)) {
            node = child;
        }
        Some(node)
    }

    /// Whether this node is or contains an `ERROR` node.
    pub fn has_error(&self) -> bool {
        match &self.element {
            SyntaxElement::Token(token) => token.kind() == SymbolId::ERROR,
            SyntaxElement::Node(node) => node
                .descendants()
                .any(|descendant| descendant.kind() == SymbolId::ERROR),
        }
    }

    pub fn to_sexp(&self) -> String {
        super::sexp::render(self)
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.kind_name(), self.byte_range())
    }
}

/// Iterator over the children of a [`Node`].
#[derive(Clone)]
pub struct Children<'t> {
    tree: &'t Tree,
    next: Option<SyntaxElement>,
}

impl<'t> Iterator for Children<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        let current = self.next.take()?;
        self.next = current.next_sibling_or_token();
        Some(Node::new(self.tree, current))
    }
}
