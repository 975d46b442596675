//! FIRST sets and nullability over the flattened grammar.

use stache_core::SymbolId;

use crate::prepare::SyntaxGrammar;

/// Bitset over symbol ids (only terminals are ever inserted).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct TerminalSet {
    words: Vec<u64>,
}

impl TerminalSet {
    pub fn single(symbol: SymbolId) -> Self {
        let mut set = Self::default();
        set.insert(symbol);
        set
    }

    pub fn insert(&mut self, symbol: SymbolId) -> bool {
        let (word, bit) = (symbol.index() / 64, symbol.index() % 64);
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        let before = self.words[word];
        self.words[word] |= 1 << bit;
        before != self.words[word]
    }

    /// Union `other` into `self`, returning whether anything was added.
    pub fn union_with(&mut self, other: &TerminalSet) -> bool {
        if self.words.len() < other.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        let mut changed = false;
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            let merged = *mine | theirs;
            changed |= merged != *mine;
            *mine = merged;
        }
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            (0..64)
                .filter(move |bit| word & (1 << bit) != 0)
                .map(move |bit| SymbolId((i * 64 + bit) as u16))
        })
    }
}

/// FIRST sets per non-terminal, plus nullability.
pub(crate) struct FirstSets {
    first: Vec<TerminalSet>,
    nullable: Vec<bool>,
}

impl FirstSets {
    pub fn compute(grammar: &SyntaxGrammar) -> Self {
        let count = grammar.symbols.len();
        let mut first = vec![TerminalSet::default(); count];
        let mut nullable = vec![false; count];

        for (i, first) in first.iter_mut().enumerate() {
            let symbol = SymbolId(i as u16);
            if grammar.is_terminal(symbol) {
                first.insert(symbol);
            }
        }

        let mut changed = true;
        while changed {
            changed = false;
            for production in &grammar.productions {
                let lhs = production.lhs.index();
                let mut all_nullable = true;
                for step in &production.steps {
                    let sym = step.symbol.index();
                    if sym != lhs {
                        let (head, tail) = if sym < lhs {
                            let (a, b) = first.split_at_mut(lhs);
                            (&mut b[0], &a[sym])
                        } else {
                            let (a, b) = first.split_at_mut(sym);
                            (&mut a[lhs], &b[0])
                        };
                        changed |= head.union_with(tail);
                    }
                    if !nullable[sym] {
                        all_nullable = false;
                        break;
                    }
                }
                if all_nullable && !nullable[lhs] {
                    nullable[lhs] = true;
                    changed = true;
                }
            }
        }

        Self { first, nullable }
    }

    /// FIRST of `symbols` followed by `lookahead`.
    pub fn first_of(
        &self,
        symbols: impl IntoIterator<Item = SymbolId>,
        lookahead: &TerminalSet,
    ) -> TerminalSet {
        let mut out = TerminalSet::default();
        for symbol in symbols {
            out.union_with(&self.first[symbol.index()]);
            if !self.nullable[symbol.index()] {
                return out;
            }
        }
        out.union_with(lookahead);
        out
    }
}
