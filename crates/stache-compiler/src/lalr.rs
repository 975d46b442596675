//! LALR(1) automaton construction.
//!
//! States are identified by their kernel core (items without lookaheads).
//! When a transition reaches an existing core, its lookaheads are merged and
//! the state is queued again until nothing changes, which yields the LALR(1)
//! lookahead sets without building the canonical LR(1) collection first.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;
use stache_core::{Associativity, SymbolId};

use crate::CompileError;
use crate::first::{FirstSets, TerminalSet};
use crate::prepare::{FlatProduction, FlatStep, SyntaxGrammar};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Item {
    pub production: u32,
    pub dot: u16,
}

#[derive(Debug)]
pub(crate) struct State {
    pub kernel: Vec<Item>,
    pub lookaheads: Vec<TerminalSet>,
    pub transitions: IndexMap<SymbolId, usize>,
}

pub(crate) struct Lalr<'g> {
    grammar: &'g SyntaxGrammar,
    first: FirstSets,
    augmented: FlatProduction,
    by_lhs: Vec<Vec<u32>>,
}

impl<'g> Lalr<'g> {
    pub fn new(grammar: &'g SyntaxGrammar) -> Self {
        let mut by_lhs = vec![Vec::new(); grammar.symbols.len()];
        for (i, production) in grammar.productions.iter().enumerate() {
            by_lhs[production.lhs.index()].push(i as u32);
        }

        Self {
            grammar,
            first: FirstSets::compute(grammar),
            augmented: FlatProduction {
                lhs: SymbolId::END,
                steps: vec![FlatStep {
                    symbol: grammar.start,
                    alias: None,
                }],
                precedence: 0,
                associativity: Associativity::None,
            },
            by_lhs,
        }
    }

    pub fn grammar(&self) -> &'g SyntaxGrammar {
        self.grammar
    }

    /// Index of the synthetic `start' -> start` production.
    pub fn augmented_index(&self) -> u32 {
        self.grammar.productions.len() as u32
    }

    pub fn production(&self, index: u32) -> &FlatProduction {
        self.grammar
            .productions
            .get(index as usize)
            .unwrap_or(&self.augmented)
    }

    pub fn build(&self) -> Result<Vec<State>, CompileError> {
        let mut states = vec![State {
            kernel: vec![Item {
                production: self.augmented_index(),
                dot: 0,
            }],
            lookaheads: vec![TerminalSet::single(SymbolId::END)],
            transitions: IndexMap::new(),
        }];
        let mut index: HashMap<Vec<Item>, usize> = HashMap::new();
        index.insert(states[0].kernel.clone(), 0);
        let mut queue = VecDeque::from([0usize]);
        let mut queued = vec![true];

        while let Some(current) = queue.pop_front() {
            queued[current] = false;
            let closure = self.closure(&states[current].kernel, &states[current].lookaheads);

            let mut successors: IndexMap<SymbolId, Vec<(Item, TerminalSet)>> = IndexMap::new();
            for (item, lookahead) in closure {
                let Some(step) = self.production(item.production).steps.get(item.dot as usize)
                else {
                    continue;
                };
                successors.entry(step.symbol).or_default().push((
                    Item {
                        production: item.production,
                        dot: item.dot + 1,
                    },
                    lookahead,
                ));
            }

            for (symbol, mut advanced) in successors {
                advanced.sort_by_key(|(item, _)| *item);
                let kernel: Vec<Item> = advanced.iter().map(|(item, _)| *item).collect();

                let target = match index.get(&kernel) {
                    Some(&target) => {
                        let mut changed = false;
                        for (slot, (_, lookahead)) in
                            states[target].lookaheads.iter_mut().zip(&advanced)
                        {
                            changed |= slot.union_with(lookahead);
                        }
                        if changed && !queued[target] {
                            queued[target] = true;
                            queue.push_back(target);
                        }
                        target
                    }
                    None => {
                        let target = states.len();
                        if target > u16::MAX as usize {
                            return Err(CompileError::TooLarge(format!(
                                "more than {} states",
                                u16::MAX
                            )));
                        }
                        index.insert(kernel.clone(), target);
                        states.push(State {
                            kernel,
                            lookaheads: advanced.into_iter().map(|(_, la)| la).collect(),
                            transitions: IndexMap::new(),
                        });
                        queued.push(true);
                        queue.push_back(target);
                        target
                    }
                };
                states[current].transitions.insert(symbol, target);
            }
        }

        Ok(states)
    }

    /// LR(1) closure of a kernel, with lookaheads grouped per item.
    pub fn closure(&self, kernel: &[Item], lookaheads: &[TerminalSet]) -> Vec<(Item, TerminalSet)> {
        let mut items: Vec<(Item, TerminalSet)> = kernel
            .iter()
            .copied()
            .zip(lookaheads.iter().cloned())
            .collect();
        let mut index: HashMap<Item, usize> = items
            .iter()
            .enumerate()
            .map(|(i, (item, _))| (*item, i))
            .collect();
        let mut pending: Vec<usize> = (0..items.len()).rev().collect();

        while let Some(i) = pending.pop() {
            let item = items[i].0;
            let production = self.production(item.production);
            let Some(step) = production.steps.get(item.dot as usize) else {
                continue;
            };
            if self.grammar.is_terminal(step.symbol) {
                continue;
            }

            let rest = production.steps[item.dot as usize + 1..]
                .iter()
                .map(|step| step.symbol);
            let follow = self.first.first_of(rest, &items[i].1);

            for &candidate in &self.by_lhs[step.symbol.index()] {
                let new_item = Item {
                    production: candidate,
                    dot: 0,
                };
                match index.get(&new_item) {
                    Some(&j) => {
                        if items[j].1.union_with(&follow) {
                            pending.push(j);
                        }
                    }
                    None => {
                        index.insert(new_item, items.len());
                        pending.push(items.len());
                        items.push((new_item, follow.clone()));
                    }
                }
            }
        }

        items
    }

    /// Render an item as `lhs → a • b` for conflict reports.
    pub fn render_item(&self, item: Item) -> String {
        let production = self.production(item.production);
        let lhs = if item.production == self.augmented_index() {
            "start'"
        } else {
            self.grammar.symbols[production.lhs.index()].name.as_str()
        };
        let mut out = format!("{lhs} →");
        for (i, step) in production.steps.iter().enumerate() {
            if i == item.dot as usize {
                out.push_str(" •");
            }
            out.push(' ');
            out.push_str(&self.grammar.symbols[step.symbol.index()].name);
        }
        if item.dot as usize == production.steps.len() {
            out.push_str(" •");
        }
        out
    }
}
