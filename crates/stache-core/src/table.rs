//! Compiled parse tables.
//!
//! A [`ParseTable`] is the output of the grammar compiler and the only thing
//! the runtime needs to parse a language. It is immutable once built and is
//! shared read-only between parsers.
//!
//! Symbol ids are dense: the three builtin symbols come first, followed by
//! internal terminals, external terminals, and non-terminals in the order the
//! compiler assigned them.

use serde::{Deserialize, Serialize};

use crate::LoadError;

/// Grammar symbol identifier (terminal, external, non-terminal or builtin).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SymbolId(pub u16);

impl SymbolId {
    /// End of input.
    pub const END: SymbolId = SymbolId(0);
    /// Error token or error node.
    pub const ERROR: SymbolId = SymbolId(1);
    /// Bytes skipped by an external scanner before its token.
    pub const TRIVIA: SymbolId = SymbolId(2);
    /// Number of builtin symbols preceding grammar symbols.
    pub const BUILTIN_COUNT: u16 = 3;

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Parse state identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateId(pub u16);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Production identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductionId(pub u16);

impl ProductionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Builtin,
    Terminal,
    External,
    NonTerminal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    pub kind: SymbolKind,
    /// Hidden symbols (`_name`, auxiliary rules) are spliced into their parent.
    pub visible: bool,
    /// Named symbols come from grammar rules; anonymous ones from string literals.
    pub named: bool,
    /// Extras may appear between any two symbols.
    pub extra: bool,
}

impl SymbolInfo {
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, SymbolKind::Terminal | SymbolKind::External)
    }
}

/// How an internal terminal is recognized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenMatcher {
    Literal(String),
    Pattern(String),
}

/// Internal terminal recognized by the built-in lexer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexTerminal {
    pub symbol: SymbolId,
    pub matcher: TokenMatcher,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Associativity {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub lhs: SymbolId,
    /// Number of grammar symbols on the right-hand side (extras excluded).
    pub len: u16,
    pub precedence: i32,
    pub associativity: Associativity,
    /// Renamed children: (step index, alias symbol).
    pub aliases: Vec<(u16, SymbolId)>,
}

impl Production {
    pub fn alias_at(&self, step: usize) -> Option<SymbolId> {
        self.aliases
            .iter()
            .find_map(|&(at, alias)| (at as usize == step).then_some(alias))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Shift(StateId),
    Reduce(ProductionId),
    Accept,
}

/// One row of the action and goto tables, both sorted by symbol.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseState {
    pub actions: Vec<(SymbolId, Action)>,
    pub gotos: Vec<(SymbolId, StateId)>,
}

/// Compiled grammar: symbols, lexical terminals, productions and LR states.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseTable {
    pub name: String,
    pub symbols: Vec<SymbolInfo>,
    /// Internal terminals in declaration order (earlier wins length ties).
    pub terminals: Vec<LexTerminal>,
    /// External scanner token index to symbol.
    pub externals: Vec<SymbolId>,
    pub productions: Vec<Production>,
    pub states: Vec<ParseState>,
    pub start_state: StateId,
    pub start_symbol: SymbolId,
}

impl ParseTable {
    pub fn symbol_info(&self, symbol: SymbolId) -> Option<&SymbolInfo> {
        self.symbols.get(symbol.index())
    }

    pub fn symbol_name(&self, symbol: SymbolId) -> &str {
        self.symbols
            .get(symbol.index())
            .map_or("<unknown>", |info| info.name.as_str())
    }

    /// Find a symbol by name and namedness. Visible symbols win over hidden ones.
    pub fn symbol(&self, name: &str, named: bool) -> Option<SymbolId> {
        let mut hidden = None;
        for (i, info) in self.symbols.iter().enumerate() {
            if info.name != name || info.named != named {
                continue;
            }
            if info.visible {
                return Some(SymbolId(i as u16));
            }
            hidden.get_or_insert(SymbolId(i as u16));
        }
        hidden
    }

    pub fn state(&self, state: StateId) -> &ParseState {
        &self.states[state.index()]
    }

    pub fn action(&self, state: StateId, symbol: SymbolId) -> Option<Action> {
        let row = &self.states.get(state.index())?.actions;
        row.binary_search_by_key(&symbol, |&(sym, _)| sym)
            .ok()
            .map(|i| row[i].1)
    }

    pub fn goto(&self, state: StateId, symbol: SymbolId) -> Option<StateId> {
        let row = &self.states.get(state.index())?.gotos;
        row.binary_search_by_key(&symbol, |&(sym, _)| sym)
            .ok()
            .map(|i| row[i].1)
    }

    /// Terminals with an action in `state`.
    pub fn valid_terminals(&self, state: StateId) -> impl Iterator<Item = SymbolId> + '_ {
        self.states
            .get(state.index())
            .into_iter()
            .flat_map(|row| row.actions.iter().map(|&(sym, _)| sym))
    }

    pub fn production(&self, id: ProductionId) -> &Production {
        &self.productions[id.index()]
    }

    pub fn external_index(&self, symbol: SymbolId) -> Option<usize> {
        self.externals.iter().position(|&ext| ext == symbol)
    }

    pub fn extras(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .filter(|(_, info)| info.extra)
            .map(|(i, _)| SymbolId(i as u16))
    }

    /// Structural validation run on every load. Checks that every id is in
    /// range and rows are sorted, so lookups never index out of bounds.
    pub fn validate(&self) -> Result<(), LoadError> {
        let malformed = |msg: String| Err(LoadError::Malformed(msg));

        let builtins = [SymbolId::END, SymbolId::ERROR, SymbolId::TRIVIA];
        if self.symbols.len() < builtins.len() {
            return malformed(format!("only {} symbols", self.symbols.len()));
        }
        for sym in builtins {
            if self.symbols[sym.index()].kind != SymbolKind::Builtin {
                return malformed(format!("symbol {sym} must be builtin"));
            }
        }
        if self.states.is_empty() || self.start_state.index() >= self.states.len() {
            return malformed(format!("start state {} out of range", self.start_state.0));
        }
        if self.kind_of(self.start_symbol) != Some(SymbolKind::NonTerminal) {
            return malformed(format!("start symbol {} is not a rule", self.start_symbol));
        }

        for terminal in &self.terminals {
            if self.kind_of(terminal.symbol) != Some(SymbolKind::Terminal) {
                return malformed(format!("lexical terminal {} is not a terminal", terminal.symbol));
            }
        }
        for &ext in &self.externals {
            if self.kind_of(ext) != Some(SymbolKind::External) {
                return malformed(format!("external {ext} is not an external symbol"));
            }
        }

        for (i, production) in self.productions.iter().enumerate() {
            if self.kind_of(production.lhs) != Some(SymbolKind::NonTerminal) {
                return malformed(format!("production {i} has a non-rule left-hand side"));
            }
            for &(step, alias) in &production.aliases {
                if step >= production.len || alias.index() >= self.symbols.len() {
                    return malformed(format!("production {i} has an invalid alias"));
                }
            }
        }

        for (i, state) in self.states.iter().enumerate() {
            if !state.actions.windows(2).all(|w| w[0].0 < w[1].0)
                || !state.gotos.windows(2).all(|w| w[0].0 < w[1].0)
            {
                return malformed(format!("state {i} rows are not sorted"));
            }
            for &(sym, action) in &state.actions {
                let terminal = sym == SymbolId::END
                    || self.symbols.get(sym.index()).is_some_and(SymbolInfo::is_terminal);
                if !terminal {
                    return malformed(format!("state {i} has an action on non-terminal {sym}"));
                }
                let in_range = match action {
                    Action::Shift(target) => target.index() < self.states.len(),
                    Action::Reduce(prod) => prod.index() < self.productions.len(),
                    Action::Accept => true,
                };
                if !in_range {
                    return malformed(format!("state {i} has an out-of-range action"));
                }
            }
            for &(sym, target) in &state.gotos {
                if self.kind_of(sym) != Some(SymbolKind::NonTerminal)
                    || target.index() >= self.states.len()
                {
                    return malformed(format!("state {i} has an invalid goto"));
                }
            }
        }

        Ok(())
    }

    fn kind_of(&self, symbol: SymbolId) -> Option<SymbolKind> {
        self.symbols.get(symbol.index()).map(|info| info.kind)
    }
}
