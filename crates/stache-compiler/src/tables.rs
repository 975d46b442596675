//! Action and goto tables with precedence-based conflict resolution.

use std::collections::BTreeMap;

use stache_core::{
    Action, Associativity, ParseState, ParseTable, Production, ProductionId, StateId, SymbolId,
};

use crate::CompileError;
use crate::lalr::{Item, Lalr, State};

struct Shift {
    target: StateId,
    precedence: i32,
    items: Vec<Item>,
}

pub(crate) fn build_table(lalr: &Lalr<'_>, states: &[State]) -> Result<ParseTable, CompileError> {
    let grammar = lalr.grammar();
    let mut rows = Vec::with_capacity(states.len());

    for (index, state) in states.iter().enumerate() {
        let closure = lalr.closure(&state.kernel, &state.lookaheads);

        let mut shifts: BTreeMap<SymbolId, Shift> = BTreeMap::new();
        let mut reduces: BTreeMap<SymbolId, Vec<Item>> = BTreeMap::new();

        for (item, lookahead) in &closure {
            let production = lalr.production(item.production);
            match production.steps.get(item.dot as usize) {
                Some(step) if grammar.is_terminal(step.symbol) => {
                    let target = state.transitions[&step.symbol];
                    let shift = shifts.entry(step.symbol).or_insert(Shift {
                        target: StateId(target as u16),
                        precedence: i32::MIN,
                        items: Vec::new(),
                    });
                    shift.precedence = shift.precedence.max(production.precedence);
                    shift.items.push(*item);
                }
                Some(_) => {}
                None => {
                    for terminal in lookahead.iter() {
                        reduces.entry(terminal).or_default().push(*item);
                    }
                }
            }
        }

        let mut actions = Vec::new();
        let mut terminals: Vec<SymbolId> = shifts.keys().chain(reduces.keys()).copied().collect();
        terminals.sort_unstable();
        terminals.dedup();

        for terminal in terminals {
            let conflict = |kind: &'static str, items: &[Item]| CompileError::Conflict {
                kind,
                token: grammar.symbols[terminal.index()].name.clone(),
                state: index,
                items: items.iter().map(|&item| lalr.render_item(item)).collect(),
            };

            let reduce = match reduces.get(&terminal).map(Vec::as_slice) {
                None | Some([]) => None,
                Some(items) => {
                    let top = items
                        .iter()
                        .map(|item| lalr.production(item.production).precedence)
                        .max()
                        .unwrap_or_default();
                    let winners: Vec<Item> = items
                        .iter()
                        .copied()
                        .filter(|item| lalr.production(item.production).precedence == top)
                        .collect();
                    if winners.len() > 1 {
                        return Err(conflict("reduce/reduce", &winners));
                    }
                    Some(winners[0])
                }
            };

            let action = match (shifts.get(&terminal), reduce) {
                (Some(shift), None) => Action::Shift(shift.target),
                (None, Some(item)) => reduce_action(lalr, item),
                (Some(shift), Some(item)) => {
                    let production = lalr.production(item.production);
                    if production.precedence > shift.precedence {
                        reduce_action(lalr, item)
                    } else if production.precedence < shift.precedence {
                        Action::Shift(shift.target)
                    } else {
                        match production.associativity {
                            Associativity::Left => reduce_action(lalr, item),
                            Associativity::Right => Action::Shift(shift.target),
                            Associativity::None => {
                                let mut items = shift.items.clone();
                                items.push(item);
                                return Err(conflict("shift/reduce", &items));
                            }
                        }
                    }
                }
                (None, None) => continue,
            };
            actions.push((terminal, action));
        }

        let gotos = state
            .transitions
            .iter()
            .filter(|(symbol, _)| !grammar.is_terminal(**symbol))
            .map(|(&symbol, &target)| (symbol, StateId(target as u16)))
            .collect::<BTreeMap<_, _>>()
            .into_iter()
            .collect();

        rows.push(ParseState { actions, gotos });
    }

    let productions = grammar
        .productions
        .iter()
        .map(|production| Production {
            lhs: production.lhs,
            len: production.steps.len() as u16,
            precedence: production.precedence,
            associativity: production.associativity,
            aliases: production
                .steps
                .iter()
                .enumerate()
                .filter_map(|(i, step)| step.alias.map(|alias| (i as u16, alias)))
                .collect(),
        })
        .collect();

    Ok(ParseTable {
        name: grammar.name.clone(),
        symbols: grammar.symbols.clone(),
        terminals: grammar.terminals.clone(),
        externals: grammar.externals.clone(),
        productions,
        states: rows,
        start_state: StateId(0),
        start_symbol: grammar.start,
    })
}

fn reduce_action(lalr: &Lalr<'_>, item: Item) -> Action {
    if item.production == lalr.augmented_index() {
        Action::Accept
    } else {
        Action::Reduce(ProductionId(item.production as u16))
    }
}
