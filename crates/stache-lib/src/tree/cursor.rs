use super::{Node, SyntaxElement, Tree};

/// Stateful walker over a subtree, the cheap way to visit many nodes.
///
/// The cursor never leaves the node it was created on: `goto_parent` and
/// the sibling moves fail there.
pub struct TreeCursor<'t> {
    tree: &'t Tree,
    root: SyntaxElement,
    current: SyntaxElement,
    depth: usize,
}

impl<'t> TreeCursor<'t> {
    pub fn new(node: Node<'t>) -> Self {
        Self {
            tree: node.tree(),
            root: node.syntax().clone(),
            current: node.syntax().clone(),
            depth: 0,
        }
    }

    pub fn node(&self) -> Node<'t> {
        Node::new(self.tree, self.current.clone())
    }

    /// Depth relative to the node the cursor started on.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn reset(&mut self, node: Node<'t>) {
        *self = TreeCursor::new(node);
    }

    pub fn goto_first_child(&mut self) -> bool {
        let Some(child) = self
            .current
            .as_node()
            .and_then(|node| node.first_child_or_token())
        else {
            return false;
        };
        self.current = child;
        self.depth += 1;
        true
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        if self.depth == 0 {
            return false;
        }
        match self.current.next_sibling_or_token() {
            Some(next) => {
                self.current = next;
                true
            }
            None => false,
        }
    }

    pub fn goto_prev_sibling(&mut self) -> bool {
        if self.depth == 0 {
            return false;
        }
        match self.current.prev_sibling_or_token() {
            Some(prev) => {
                self.current = prev;
                true
            }
            None => false,
        }
    }

    pub fn goto_parent(&mut self) -> bool {
        if self.depth == 0 {
            return false;
        }
        let Some(parent) = self.current.parent() else {
            return false;
        };
        self.current = SyntaxElement::Node(parent);
        self.depth -= 1;
        true
    }

    /// Move to the first child that ends after `byte`, returning its index.
    pub fn goto_first_child_for_byte(&mut self, byte: usize) -> Option<usize> {
        let node = self.current.as_node()?;
        let (index, child) = node
            .children_with_tokens()
            .enumerate()
            .find(|(_, child)| usize::from(child.text_range().end()) > byte)?;
        self.current = child;
        self.depth += 1;
        Some(index)
    }

    /// Whether the cursor is back on the node it started from.
    pub fn at_root(&self) -> bool {
        self.current == self.root
    }
}
