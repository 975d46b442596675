//! What a parse remembers for the next one.
//!
//! Every lexer call is recorded as a [`LexEvent`]: where it ran, in which
//! lex state and scanner state, and what it produced. Every error-free node
//! whose first leaf was shifted directly onto the stack is recorded as a
//! [`NodeEntry`] spanning a contiguous run of events. Parsing is a
//! deterministic function of these inputs, so an entry whose inputs are
//! unchanged can be replayed instead of recomputed.

use std::sync::Arc;

use stache_core::{StateId, SymbolId};

use super::ChangeSet;
use crate::lexer::Leaf;
use crate::parser::subtree::Subtree;

#[derive(Clone, Debug)]
pub(crate) struct LexEvent {
    pub leaf: Leaf,
    pub lex_state: StateId,
    pub externals: bool,
    pub scanner_before: Arc<[u8]>,
    pub scanner_after: Arc<[u8]>,
}

impl LexEvent {
    fn shifted(&self, delta: isize) -> LexEvent {
        LexEvent {
            leaf: self.leaf.shifted(delta),
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct NodeEntry {
    pub first_event: usize,
    pub last_event: usize,
    /// State the node was pushed onto.
    pub pre_state: StateId,
    pub symbol: SymbolId,
    pub start: usize,
    pub end: usize,
    /// Furthest byte examined by any lexer call up to the node's reduction.
    pub dep_end: usize,
    /// Lex state of the lookahead that triggered the reduction.
    pub next_lex_state: StateId,
    pub subtree: Subtree,
}

impl NodeEntry {
    fn shifted(&self, delta: isize, offset: isize) -> NodeEntry {
        let at = |pos: usize| pos.saturating_add_signed(delta);
        let index = |event: usize| event.saturating_add_signed(offset);
        NodeEntry {
            first_event: index(self.first_event),
            last_event: index(self.last_event),
            start: at(self.start),
            end: at(self.end),
            dep_end: at(self.dep_end),
            subtree: self.subtree.clone(),
            ..*self
        }
    }
}

/// Lex events in order and node entries sorted by `(first_event, last_event desc)`.
#[derive(Clone, Debug, Default)]
pub(crate) struct ReuseMap {
    events: Vec<LexEvent>,
    nodes: Vec<NodeEntry>,
}

impl ReuseMap {
    pub fn new(events: Vec<LexEvent>, mut nodes: Vec<NodeEntry>) -> Self {
        nodes.sort_by(|a, b| {
            a.first_event
                .cmp(&b.first_event)
                .then(b.last_event.cmp(&a.last_event))
        });
        Self { events, nodes }
    }

    pub fn event(&self, index: usize) -> &LexEvent {
        &self.events[index]
    }

    /// A recorded lexer call with the same inputs at the old position of
    /// `pos`, whose examined bytes no change touches. Returns its index and
    /// the offset from old to new positions.
    pub fn find_event(
        &self,
        changes: &ChangeSet<'_>,
        pos: usize,
        lex_state: StateId,
        externals: bool,
        scanner: &[u8],
    ) -> Option<(usize, isize)> {
        let old = changes.to_old(pos)?;
        let first = self.events.partition_point(|e| e.leaf.trivia_start < old);
        self.events[first..]
            .iter()
            .take_while(|e| e.leaf.trivia_start == old)
            .position(|e| {
                e.lex_state == lex_state
                    && e.externals == externals
                    && *e.scanner_before == *scanner
                    && !changes.touches(old, e.leaf.lookahead_end)
            })
            .map(|i| (first + i, pos as isize - old as isize))
    }

    /// Largest node starting at event `event`, pushed onto `state`, over
    /// unchanged input.
    pub fn find_node(
        &self,
        changes: &ChangeSet<'_>,
        event: usize,
        state: StateId,
    ) -> Option<&NodeEntry> {
        let from = self.events[event].leaf.trivia_start;
        let first = self.nodes.partition_point(|n| n.first_event < event);
        self.nodes[first..]
            .iter()
            .take_while(|n| n.first_event == event)
            .find(|n| n.pre_state == state && !changes.touches(from, n.dep_end))
    }

    /// Events strictly after `node`'s first event up to its last, shifted.
    pub fn events_after_first<'a>(
        &'a self,
        node: &NodeEntry,
        delta: isize,
    ) -> impl Iterator<Item = LexEvent> + 'a {
        self.events[node.first_event + 1..=node.last_event]
            .iter()
            .map(move |e| e.shifted(delta))
    }

    /// Entries nested in `node` (itself included), moved so that its first
    /// event lands at `first_event`.
    pub fn nodes_within<'a>(
        &'a self,
        node: &NodeEntry,
        first_event: usize,
        delta: isize,
    ) -> impl Iterator<Item = NodeEntry> + 'a {
        let offset = first_event as isize - node.first_event as isize;
        let (lo, hi) = (node.first_event, node.last_event);
        let start = self.nodes.partition_point(|n| n.first_event < lo);
        self.nodes[start..]
            .iter()
            .take_while(move |n| n.first_event <= hi)
            .filter(move |n| n.last_event <= hi)
            .map(move |n| n.shifted(delta, offset))
    }
}
