//! Table-driven LR driver.
//!
//! # Stack
//!
//! Each entry records the state reached after pushing it. Extras (trivia,
//! comments, `ERROR` nodes produced by recovery) repeat the state below
//! them, so they never influence which action is taken.
//!
//! # Recovery
//!
//! When the lookahead has no action:
//!
//! 1. Zero-width tokens are dropped and the external scanner is disabled at
//!    that position for the next lex.
//! 2. If a deeper stack state can eventually shift or accept the lookahead,
//!    the entries above it are wrapped in an `ERROR` node and the lookahead
//!    is retried.
//! 3. Otherwise the lookahead itself goes into an `ERROR` node, merging with
//!    an `ERROR` already on top of the stack.
//! 4. At end of input with nothing to recover to, the whole stack becomes an
//!    `ERROR` node under the root.
//!
//! Step 2 strictly shrinks the stack of non-extra entries and step 3
//! consumes input, so parsing terminates on every input.
//!
//! # Reuse
//!
//! Every lexer call and every error-free reduction is recorded for the next
//! incremental parse (see `incremental::reuse`).

use std::sync::Arc;

use rowan::{GreenNode, GreenToken, NodeOrToken};
use stache_core::{Action, ParseTable, ProductionId, StateId, SymbolId};

use super::subtree::{self, Subtree};
use super::{Budget, BudgetExceeded};
use crate::incremental::{ChangeSet, IncrementalStats, LexEvent, NodeEntry, ReuseMap};
use crate::language::Language;
use crate::lexer::{Leaf, Lexer};

/// Zero-width shifts allowed at one position before the token counts as unexpected.
const MAX_EMPTY_SHIFTS: u32 = 64;

/// Reductions simulated per candidate state while looking for a recovery point.
const MAX_SIMULATED_REDUCTIONS: usize = 1024;

struct Entry {
    state: StateId,
    subtree: Subtree,
    extra: bool,
    start: usize,
    end: usize,
    error: bool,
    /// The first leaf was shifted directly, so the entry can be replayed.
    direct: bool,
    /// Range of lex events that produced the entry.
    events: Option<(usize, usize)>,
}

impl Entry {
    fn extra(state: StateId, subtree: Subtree, start: usize, end: usize) -> Self {
        Entry {
            state,
            subtree,
            extra: true,
            start,
            end,
            error: false,
            direct: false,
            events: None,
        }
    }
}

struct Lookahead {
    leaf: Leaf,
    event: usize,
    lex_state: StateId,
    /// Old event index and position offset when replayed from a previous parse.
    reused: Option<(usize, isize)>,
}

/// Previous parse and the changes since.
#[derive(Clone, Copy)]
pub(crate) struct Reuse<'o> {
    pub map: &'o ReuseMap,
    pub changes: ChangeSet<'o>,
}

pub(crate) struct Outcome {
    pub green: GreenNode,
    pub has_error: bool,
    pub truncation: Option<BudgetExceeded>,
    pub reuse: ReuseMap,
    pub stats: IncrementalStats,
}

enum Step {
    Continue,
    Retry(Lookahead),
    Done(Outcome),
}

pub(crate) struct Engine<'a> {
    language: &'a Language,
    table: &'a ParseTable,
    source: &'a str,
    lexer: Lexer<'a>,
    budget: Option<Budget>,
    ops: u64,
    stack: Vec<Entry>,
    pos: usize,
    externals_disabled_at: Option<usize>,
    /// Lex state to use after a reused node, until a leaf has an action in it.
    lex_override: Option<StateId>,
    empty_shifts: (usize, u32),
    /// Latest lex event that went through recovery or was dropped.
    irregular_event: Option<usize>,
    events: Vec<LexEvent>,
    nodes: Vec<NodeEntry>,
    max_lookahead: usize,
    reuse: Option<Reuse<'a>>,
    stats: IncrementalStats,
    has_error: bool,
}

impl<'a> Engine<'a> {
    pub fn new(
        language: &'a Language,
        source: &'a str,
        budget: Option<Budget>,
        reuse: Option<Reuse<'a>>,
    ) -> Self {
        Self {
            language,
            table: language.table(),
            source,
            lexer: Lexer::new(language, source),
            budget,
            ops: 0,
            stack: Vec::new(),
            pos: 0,
            externals_disabled_at: None,
            lex_override: None,
            empty_shifts: (0, 0),
            irregular_event: None,
            events: Vec::new(),
            nodes: Vec::new(),
            max_lookahead: 0,
            reuse,
            stats: IncrementalStats::default(),
            has_error: false,
        }
    }

    pub fn run(mut self) -> Outcome {
        let mut pending: Option<Lookahead> = None;
        loop {
            let lookahead = match pending.take() {
                Some(lookahead) => lookahead,
                None => {
                    if !self.may_lex() {
                        return self.truncate();
                    }
                    self.next_leaf()
                }
            };
            match self.step(lookahead) {
                Step::Continue => {}
                Step::Retry(lookahead) => pending = Some(lookahead),
                Step::Done(outcome) => return outcome,
            }
        }
    }

    fn state(&self) -> StateId {
        self.stack
            .last()
            .map_or(self.table.start_state, |entry| entry.state)
    }

    fn charge(&mut self) -> bool {
        self.ops += 1;
        self.budget.is_none_or(|budget| self.ops <= budget.max_ops)
    }

    fn may_lex(&mut self) -> bool {
        if let Some(budget) = self.budget
            && self.pos >= budget.max_bytes
            && self.pos < self.source.len()
        {
            return false;
        }
        self.charge()
    }

    fn step(&mut self, lookahead: Lookahead) -> Step {
        let table = self.table;
        let symbol = lookahead.leaf.symbol;

        if let Some(lex_state) = self.lex_override.take()
            && table.action(lex_state, symbol).is_none()
            && self.is_extra_leaf(&lookahead.leaf)
        {
            self.lex_override = Some(lex_state);
            self.push_extra_leaf(&lookahead);
            return Step::Continue;
        }

        let state = self.state();
        let action = table.action(state, symbol);
        if action.is_none() && self.is_extra_leaf(&lookahead.leaf) {
            self.push_extra_leaf(&lookahead);
            return Step::Continue;
        }

        match action {
            Some(Action::Shift(next)) => {
                if !self.charge() {
                    return Step::Done(self.truncate());
                }
                if lookahead.leaf.is_empty() && !self.allow_empty_shift() {
                    self.drop_empty(&lookahead);
                    return Step::Continue;
                }
                self.shift(&lookahead, state, next);
                Step::Continue
            }
            Some(Action::Reduce(production)) => {
                if !self.charge() {
                    return Step::Done(self.truncate());
                }
                self.reduce(production, &lookahead);
                Step::Retry(lookahead)
            }
            Some(Action::Accept) => Step::Done(self.accept()),
            None => self.recover(lookahead),
        }
    }

    fn is_extra_leaf(&self, leaf: &Leaf) -> bool {
        !leaf.is_end() && self.language.is_extra(leaf.symbol)
    }

    /// Lex at the current position, replaying a previous lexer call when possible.
    fn next_leaf(&mut self) -> Lookahead {
        let lex_state = self.lex_override.unwrap_or_else(|| self.state());
        let externals = self.externals_disabled_at != Some(self.pos);
        let before = self.lexer.scanner_state();

        let replay = self.reuse.and_then(|reuse| {
            let (index, delta) = reuse.map.find_event(
                &reuse.changes,
                self.pos,
                lex_state,
                externals,
                &before,
            )?;
            Some((reuse.map.event(index), index, delta))
        });

        let (leaf, reused) = match replay {
            Some((event, index, delta)) => {
                let leaf = event.leaf.shifted(delta);
                self.lexer.restore_scanner(Arc::clone(&event.scanner_after));
                self.stats.reused_leaves += 1;
                self.stats.reused_bytes += leaf.end - leaf.trivia_start;
                (leaf, Some((index, delta)))
            }
            None => {
                let leaf = self.lexer.lex(self.pos, lex_state, externals);
                self.stats.lexed_leaves += 1;
                self.stats.lexed_bytes += leaf.end - leaf.trivia_start;
                (leaf, None)
            }
        };

        self.max_lookahead = self.max_lookahead.max(leaf.lookahead_end);
        let event = self.events.len();
        self.events.push(LexEvent {
            leaf,
            lex_state,
            externals,
            scanner_before: before,
            scanner_after: self.lexer.scanner_state(),
        });
        tracing::trace!(
            pos = leaf.start,
            symbol = self.language.symbol_name(leaf.symbol),
            state = lex_state.0,
            reused = reused.is_some(),
            "lex"
        );

        if leaf.has_trivia() {
            let trivia = Subtree::token(
                SymbolId::TRIVIA,
                &self.source[leaf.trivia_start..leaf.start],
            );
            let mut entry = Entry::extra(self.state(), trivia, leaf.trivia_start, leaf.start);
            entry.events = Some((event, event));
            self.stack.push(entry);
            self.pos = leaf.start;
        }

        Lookahead {
            leaf,
            event,
            lex_state,
            reused,
        }
    }

    fn push_extra_leaf(&mut self, lookahead: &Lookahead) {
        let leaf = lookahead.leaf;
        if leaf.is_empty() {
            self.drop_empty(lookahead);
            return;
        }
        let token = Subtree::token(leaf.symbol, &self.source[leaf.start..leaf.end]);
        let mut entry = Entry::extra(self.state(), token, leaf.start, leaf.end);
        entry.events = Some((lookahead.event, lookahead.event));
        self.stack.push(entry);
        self.pos = leaf.end;
    }

    fn allow_empty_shift(&mut self) -> bool {
        if self.empty_shifts.0 == self.pos {
            self.empty_shifts.1 += 1;
        } else {
            self.empty_shifts = (self.pos, 1);
        }
        self.empty_shifts.1 <= MAX_EMPTY_SHIFTS
    }

    fn drop_empty(&mut self, lookahead: &Lookahead) {
        let before = Arc::clone(&self.events[lookahead.event].scanner_before);
        self.lexer.restore_scanner(before);
        self.externals_disabled_at = Some(lookahead.leaf.start);
        self.pos = lookahead.leaf.start;
        self.irregular_event = Some(lookahead.event);
        tracing::trace!(
            pos = self.pos,
            symbol = self.language.symbol_name(lookahead.leaf.symbol),
            "drop zero-width token"
        );
    }

    fn shift(&mut self, lookahead: &Lookahead, state: StateId, next: StateId) {
        if let Some((old_event, delta)) = lookahead.reused
            && let Some(reuse) = self.reuse
            && let Some(node) = reuse.map.find_node(&reuse.changes, old_event, state)
            && let Some(target) = self.table.goto(state, node.symbol)
        {
            self.push_reused(reuse.map, node, lookahead, delta, target);
            return;
        }

        let leaf = lookahead.leaf;
        tracing::trace!(
            symbol = self.language.symbol_name(leaf.symbol),
            from = state.0,
            to = next.0,
            "shift"
        );
        self.stack.push(Entry {
            state: next,
            subtree: Subtree::token(leaf.symbol, &self.source[leaf.start..leaf.end]),
            extra: false,
            start: leaf.start,
            end: leaf.end,
            error: false,
            direct: true,
            events: Some((lookahead.event, lookahead.event)),
        });
        self.pos = leaf.end;
    }

    /// Push a whole subtree from the previous parse, carrying its lex events
    /// and nested node entries over with shifted positions.
    fn push_reused(
        &mut self,
        map: &'a ReuseMap,
        node: &'a NodeEntry,
        lookahead: &Lookahead,
        delta: isize,
        target: StateId,
    ) {
        let first = lookahead.event;
        for event in map.events_after_first(node, delta) {
            self.max_lookahead = self.max_lookahead.max(event.leaf.lookahead_end);
            self.events.push(event);
        }
        self.nodes.extend(map.nodes_within(node, first, delta));
        let last = first + (node.last_event - node.first_event);
        self.lexer
            .restore_scanner(Arc::clone(&map.event(node.last_event).scanner_after));

        let start = node.start.saturating_add_signed(delta);
        let end = node.end.saturating_add_signed(delta);
        self.stats.reused_nodes += 1;
        self.stats.reused_bytes += end - lookahead.leaf.end;
        tracing::trace!(
            symbol = self.language.symbol_name(node.symbol),
            start,
            end,
            "reuse"
        );

        self.stack.push(Entry {
            state: target,
            subtree: node.subtree.clone(),
            extra: false,
            start,
            end,
            error: false,
            direct: true,
            events: Some((first, last)),
        });
        self.pos = end;
        self.lex_override = Some(node.next_lex_state);
    }

    fn reduce(&mut self, id: ProductionId, lookahead: &Lookahead) {
        let table = self.table;
        let production = table.production(id);
        let len = production.len as usize;

        let mut trailing = Vec::new();
        if len > 0 {
            while self.stack.last().is_some_and(|entry| entry.extra) {
                trailing.extend(self.stack.pop());
            }
        }
        let mut children = Vec::new();
        let mut remaining = len;
        while remaining > 0 {
            let Some(entry) = self.stack.pop() else {
                break;
            };
            if !entry.extra {
                remaining -= 1;
            }
            children.push(entry);
        }
        children.reverse();
        trailing.reverse();

        let base = self.state();
        let start = children
            .first()
            .map_or_else(|| self.stack.last().map_or(0, |entry| entry.end), |c| c.start);
        let end = children.last().map_or(start, |c| c.end);
        let direct = children.first().is_some_and(|c| !c.extra && c.direct);
        let first_event = children.iter().find_map(|c| c.events).map(|e| e.0);
        let last_event = children.iter().rev().find_map(|c| c.events).map(|e| e.1);
        let events = first_event.zip(last_event);

        let mut error = false;
        let mut step = 0;
        let mut subtrees = Vec::with_capacity(children.len());
        for child in children {
            error |= child.error;
            if child.extra {
                subtrees.push(child.subtree);
                continue;
            }
            subtrees.push(match production.alias_at(step) {
                Some(alias) => child.subtree.aliased(alias),
                None => child.subtree,
            });
            step += 1;
        }

        let lhs = production.lhs;
        let subtree = if self.language.is_visible(lhs) {
            Subtree::node(lhs, &subtrees)
        } else {
            Subtree::hidden(subtrees)
        };
        let next = match table.goto(base, lhs) {
            Some(next) => next,
            None => {
                error = true;
                base
            }
        };
        tracing::trace!(
            symbol = self.language.symbol_name(lhs),
            len,
            from = base.0,
            to = next.0,
            "reduce"
        );

        // Whatever happened between the last child and this reduction must
        // replay the same way after the node is pushed whole.
        if !error
            && direct
            && let Some((first_event, last_event)) = events
            && self.irregular_event.is_none_or(|event| event <= last_event)
        {
            self.nodes.push(NodeEntry {
                first_event,
                last_event,
                pre_state: base,
                symbol: lhs,
                start,
                end,
                dep_end: self.max_lookahead,
                next_lex_state: lookahead.lex_state,
                subtree: subtree.clone(),
            });
        }

        self.stack.push(Entry {
            state: next,
            subtree,
            extra: false,
            start,
            end,
            error,
            direct,
            events,
        });
        for mut entry in trailing {
            entry.state = next;
            self.stack.push(entry);
        }
    }

    fn recover(&mut self, lookahead: Lookahead) -> Step {
        let leaf = lookahead.leaf;
        if leaf.is_empty() && !leaf.is_end() {
            self.drop_empty(&lookahead);
            return Step::Continue;
        }

        self.irregular_event = Some(lookahead.event);
        if leaf.symbol != SymbolId::ERROR
            && let Some(keep) = self.recovery_point(leaf.symbol)
        {
            let start = self.stack[keep].start;
            let end = self.stack.last().map_or(start, |entry| entry.end);
            let popped: Vec<Subtree> = self.stack.drain(keep..).map(|e| e.subtree).collect();
            tracing::trace!(
                symbol = self.language.symbol_name(leaf.symbol),
                start,
                end,
                "recover by popping"
            );
            self.push_error(Subtree::error(&popped), start, end);
            return Step::Retry(lookahead);
        }

        if leaf.is_end() {
            return Step::Done(self.wrap_all());
        }

        tracing::trace!(
            symbol = self.language.symbol_name(leaf.symbol),
            pos = leaf.start,
            "recover by skipping"
        );
        let token = NodeOrToken::Token(GreenToken::new(
            subtree::raw(leaf.symbol),
            &self.source[leaf.start..leaf.end],
        ));
        let absorbed = match self.stack.last_mut() {
            Some(top) if top.extra => {
                let absorbed = top.subtree.absorb(token.clone());
                if absorbed {
                    top.end = leaf.end;
                }
                absorbed
            }
            _ => false,
        };
        if !absorbed {
            self.push_error(Subtree::Error(vec![token]), leaf.start, leaf.end);
        }
        self.pos = leaf.end;
        Step::Continue
    }

    fn push_error(&mut self, subtree: Subtree, start: usize, end: usize) {
        let mut entry = Entry::extra(self.state(), subtree, start, end);
        entry.error = true;
        self.stack.push(entry);
        self.has_error = true;
    }

    /// Stack length to truncate to so that `symbol` can be shifted or accepted.
    fn recovery_point(&self, symbol: SymbolId) -> Option<usize> {
        let mut candidates = vec![(0, self.table.start_state)];
        candidates.extend(
            self.stack
                .iter()
                .enumerate()
                .filter(|(_, entry)| !entry.extra)
                .map(|(i, entry)| (i + 1, entry.state)),
        );
        let states: Vec<StateId> = candidates.iter().map(|&(_, state)| state).collect();
        (0..states.len().saturating_sub(1))
            .rev()
            .find(|&depth| self.can_continue(&states[..=depth], symbol))
            .map(|depth| candidates[depth].0)
    }

    /// Whether `symbol` is eventually shifted or accepted from the state stack `base`.
    fn can_continue(&self, base: &[StateId], symbol: SymbolId) -> bool {
        let table = self.table;
        let mut len = base.len();
        let mut pushed: Vec<StateId> = Vec::new();
        for _ in 0..MAX_SIMULATED_REDUCTIONS {
            let Some(top) = pushed.last().copied().or_else(|| base[..len].last().copied()) else {
                return false;
            };
            match table.action(top, symbol) {
                None => return false,
                Some(Action::Shift(_) | Action::Accept) => return true,
                Some(Action::Reduce(id)) => {
                    let production = table.production(id);
                    let mut count = production.len as usize;
                    let from_pushed = count.min(pushed.len());
                    pushed.truncate(pushed.len() - from_pushed);
                    count -= from_pushed;
                    if count > 0 {
                        if count >= len {
                            return false;
                        }
                        len -= count;
                    }
                    let Some(below) = pushed.last().copied().or_else(|| base[..len].last().copied())
                    else {
                        return false;
                    };
                    match table.goto(below, production.lhs) {
                        Some(next) => pushed.push(next),
                        None => return false,
                    }
                }
            }
        }
        false
    }

    fn wrap_all(&mut self) -> Outcome {
        if self.stack.iter().any(|entry| !entry.extra) {
            let start = self.stack.first().map_or(0, |entry| entry.start);
            let end = self.stack.last().map_or(start, |entry| entry.end);
            let subtrees: Vec<Subtree> = self.stack.drain(..).map(|e| e.subtree).collect();
            self.push_error(Subtree::error(&subtrees), start, end);
        }
        let green = self.root();
        self.finish(green, None)
    }

    fn accept(&mut self) -> Outcome {
        let green = self.root();
        self.finish(green, None)
    }

    fn truncate(&mut self) -> Outcome {
        let exceeded = BudgetExceeded {
            ops: self.ops,
            bytes: self.pos,
        };
        tracing::warn!(
            ops = exceeded.ops,
            bytes = exceeded.bytes,
            "parse budget exceeded, returning partial tree"
        );
        let green = self.root();
        self.finish(green, Some(exceeded))
    }

    /// Root node of the start symbol over every stack entry. A start-symbol
    /// node on the stack is spliced in place.
    fn root(&self) -> GreenNode {
        let start = subtree::raw(self.table.start_symbol);
        let mut elements = Vec::new();
        for entry in &self.stack {
            match &entry.subtree {
                Subtree::Element(NodeOrToken::Node(node))
                    if !entry.extra && node.kind() == start =>
                {
                    elements.extend(subtree::green_children(node));
                }
                other => subtree::flatten_into(&mut elements, other),
            }
        }
        GreenNode::new(start, elements)
    }

    fn finish(&mut self, green: GreenNode, truncation: Option<BudgetExceeded>) -> Outcome {
        tracing::debug!(
            language = self.language.name(),
            bytes = self.source.len(),
            ops = self.ops,
            has_error = self.has_error,
            truncated = truncation.is_some(),
            reused_nodes = self.stats.reused_nodes,
            reused_leaves = self.stats.reused_leaves,
            lexed_leaves = self.stats.lexed_leaves,
            "parse finished"
        );
        Outcome {
            green,
            has_error: self.has_error,
            truncation,
            reuse: ReuseMap::new(std::mem::take(&mut self.events), std::mem::take(&mut self.nodes)),
            stats: self.stats,
        }
    }
}
