//! Grammar preparation: resolve names, extract terminals, flatten rules to BNF.
//!
//! The output is a [`SyntaxGrammar`] whose productions are plain sequences of
//! symbols. Repetitions become hidden left-recursive auxiliary rules (shared
//! between identical `repeat(...)` bodies), optional parts expand into
//! alternatives, and aliases are attached to individual production steps.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use stache_core::{
    Associativity, Grammar, LexTerminal, Rule, SymbolId, SymbolInfo, SymbolKind, TokenMatcher,
};

use crate::CompileError;
use crate::lexical::matcher_for;

/// Symbol before final id assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Sym {
    Terminal(usize),
    External(usize),
    NonTerminal(usize),
    Alias(usize),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Step {
    symbol: Sym,
    alias: Option<Sym>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
struct Alt {
    steps: Vec<Step>,
    precedence: Option<i32>,
    associativity: Option<Associativity>,
}

impl Alt {
    fn single(symbol: Sym) -> Alt {
        Alt {
            steps: vec![Step {
                symbol,
                alias: None,
            }],
            ..Alt::default()
        }
    }

    fn concat(&self, other: &Alt) -> Alt {
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().cloned());
        Alt {
            steps,
            precedence: self.precedence.or(other.precedence),
            associativity: self.associativity.or(other.associativity),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum TerminalKey {
    Named(String),
    Literal(String),
    Pattern(String),
}

struct TerminalDef {
    name: String,
    matcher: TokenMatcher,
    visible: bool,
    named: bool,
}

struct NonTerminalDef {
    name: String,
    visible: bool,
}

struct AliasDef {
    name: String,
    named: bool,
    kind: SymbolKind,
}

/// A production step after id assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FlatStep {
    pub symbol: SymbolId,
    pub alias: Option<SymbolId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FlatProduction {
    pub lhs: SymbolId,
    pub steps: Vec<FlatStep>,
    pub precedence: i32,
    pub associativity: Associativity,
}

/// Grammar reduced to symbols and flat productions.
#[derive(Debug)]
pub(crate) struct SyntaxGrammar {
    pub name: String,
    pub symbols: Vec<SymbolInfo>,
    pub terminals: Vec<LexTerminal>,
    pub externals: Vec<SymbolId>,
    pub productions: Vec<FlatProduction>,
    pub start: SymbolId,
}

impl SyntaxGrammar {
    pub fn is_terminal(&self, symbol: SymbolId) -> bool {
        symbol == SymbolId::END || self.symbols[symbol.index()].is_terminal()
    }
}

pub(crate) fn prepare(grammar: &Grammar) -> Result<SyntaxGrammar, CompileError> {
    let (start_name, start_rule) = grammar.rules.first().ok_or(CompileError::EmptyGrammar)?;
    if start_rule.is_lexical() {
        return Err(CompileError::UnsupportedRule {
            rule: start_name.clone(),
            message: "the start rule must not be a token".into(),
        });
    }
    if start_name.starts_with('_') {
        return Err(CompileError::HiddenStartRule(start_name.clone()));
    }

    let mut builder = Builder::new(grammar)?;
    builder.flatten_rules()?;
    builder.mark_extras()?;
    builder.finish()
}

struct Builder<'g> {
    grammar: &'g Grammar,
    terminals: IndexMap<TerminalKey, TerminalDef>,
    externals: Vec<(String, bool)>,
    nonterminals: IndexMap<String, NonTerminalDef>,
    aliases: IndexMap<(String, bool), AliasDef>,
    repeats: HashMap<Rule, usize>,
    productions: Vec<(usize, Alt)>,
    extras: IndexSet<Sym>,
    token_counters: HashMap<String, usize>,
}

impl<'g> Builder<'g> {
    fn new(grammar: &'g Grammar) -> Result<Self, CompileError> {
        let mut builder = Self {
            grammar,
            terminals: IndexMap::new(),
            externals: Vec::new(),
            nonterminals: IndexMap::new(),
            aliases: IndexMap::new(),
            repeats: HashMap::new(),
            productions: Vec::new(),
            extras: IndexSet::new(),
            token_counters: HashMap::new(),
        };

        for external in &grammar.externals {
            match external {
                Rule::Symbol(name) => builder.externals.push((name.clone(), true)),
                Rule::String(value) => builder.externals.push((value.clone(), false)),
                _ => {
                    return Err(CompileError::UnsupportedRule {
                        rule: "externals".into(),
                        message: "externals must be symbols or strings".into(),
                    });
                }
            }
        }

        for (name, rule) in &grammar.rules {
            if rule.is_lexical() {
                let matcher = matcher_for(rule, name)?;
                builder.terminals.insert(
                    TerminalKey::Named(name.clone()),
                    TerminalDef {
                        name: name.clone(),
                        matcher,
                        visible: !name.starts_with('_'),
                        named: true,
                    },
                );
            } else {
                let hidden = name.starts_with('_')
                    || grammar.inline.contains(name)
                    || grammar.supertypes.contains(name);
                builder.nonterminals.insert(
                    name.clone(),
                    NonTerminalDef {
                        name: name.clone(),
                        visible: !hidden,
                    },
                );
            }
        }

        Ok(builder)
    }

    fn flatten_rules(&mut self) -> Result<(), CompileError> {
        let grammar = self.grammar;
        for (name, rule) in &grammar.rules {
            let Some(index) = self.nonterminals.get_index_of(name) else {
                continue;
            };
            let alts = self.flatten(rule, name)?;
            self.add_productions(index, alts);
        }
        Ok(())
    }

    fn add_productions(&mut self, lhs: usize, alts: Vec<Alt>) {
        let mut seen = IndexSet::new();
        for alt in alts {
            if seen.insert(alt.steps.clone()) {
                self.productions.push((lhs, alt));
            }
        }
    }

    fn flatten(&mut self, rule: &Rule, context: &str) -> Result<Vec<Alt>, CompileError> {
        Ok(match rule {
            Rule::Blank => vec![Alt::default()],
            Rule::String(value) => vec![Alt::single(self.literal(value))],
            Rule::Pattern { .. } | Rule::Token(_) | Rule::ImmediateToken(_) => {
                vec![Alt::single(self.anonymous_token(rule, context)?)]
            }
            Rule::Symbol(name) => vec![Alt::single(self.resolve(name, context)?)],
            Rule::Seq(members) => {
                let mut alts = vec![Alt::default()];
                for member in members {
                    let suffixes = self.flatten(member, context)?;
                    alts = alts
                        .iter()
                        .flat_map(|prefix| suffixes.iter().map(move |suffix| prefix.concat(suffix)))
                        .collect();
                }
                alts
            }
            Rule::Choice(members) => {
                let mut alts = Vec::new();
                for member in members {
                    alts.extend(self.flatten(member, context)?);
                }
                alts
            }
            Rule::Repeat(content) => {
                let aux = self.repeat_symbol(content, context)?;
                vec![Alt::single(aux), Alt::default()]
            }
            Rule::Repeat1(content) => {
                let aux = self.repeat_symbol(content, context)?;
                vec![Alt::single(aux)]
            }
            Rule::Field { content, .. } => self.flatten(content, context)?,
            Rule::Alias {
                content,
                value,
                named,
            } => {
                let inner = self.flatten(content, context)?;
                let alias = self.alias_symbol(value, *named, content)?;
                let symbol = if inner.len() == 1 && inner[0].steps.len() == 1 {
                    inner[0].steps[0].symbol
                } else {
                    let aux = self.aux_nonterminal(format!("_{context}_alias"));
                    self.add_productions(aux, inner);
                    Sym::NonTerminal(aux)
                };
                vec![Alt {
                    steps: vec![Step {
                        symbol,
                        alias: Some(alias),
                    }],
                    ..Alt::default()
                }]
            }
            Rule::Prec { value, content } => {
                self.with_precedence(content, context, value.value(), Associativity::None)?
            }
            Rule::PrecLeft { value, content } => {
                self.with_precedence(content, context, value.value(), Associativity::Left)?
            }
            Rule::PrecRight { value, content } => {
                self.with_precedence(content, context, value.value(), Associativity::Right)?
            }
        })
    }

    fn with_precedence(
        &mut self,
        content: &Rule,
        context: &str,
        value: i32,
        associativity: Associativity,
    ) -> Result<Vec<Alt>, CompileError> {
        let mut alts = self.flatten(content, context)?;
        for alt in &mut alts {
            alt.precedence.get_or_insert(value);
            if associativity != Associativity::None {
                alt.associativity.get_or_insert(associativity);
            }
        }
        Ok(alts)
    }

    fn resolve(&self, name: &str, context: &str) -> Result<Sym, CompileError> {
        if let Some(i) = self
            .externals
            .iter()
            .position(|(ext, named)| *named && ext == name)
        {
            return Ok(Sym::External(i));
        }
        if let Some(i) = self.nonterminals.get_index_of(name) {
            return Ok(Sym::NonTerminal(i));
        }
        if let Some(i) = self
            .terminals
            .get_index_of(&TerminalKey::Named(name.to_owned()))
        {
            return Ok(Sym::Terminal(i));
        }
        Err(CompileError::UndefinedSymbol {
            name: name.to_owned(),
            rule: context.to_owned(),
        })
    }

    fn literal(&mut self, value: &str) -> Sym {
        if let Some(i) = self
            .externals
            .iter()
            .position(|(ext, named)| !*named && ext == value)
        {
            return Sym::External(i);
        }
        let entry = self
            .terminals
            .entry(TerminalKey::Literal(value.to_owned()));
        let index = entry.index();
        entry.or_insert_with(|| TerminalDef {
            name: value.to_owned(),
            matcher: TokenMatcher::Literal(value.to_owned()),
            visible: true,
            named: false,
        });
        Sym::Terminal(index)
    }

    fn anonymous_token(&mut self, rule: &Rule, context: &str) -> Result<Sym, CompileError> {
        let matcher = matcher_for(rule, context)?;
        let pattern = match matcher {
            TokenMatcher::Literal(value) => return Ok(self.literal(&value)),
            TokenMatcher::Pattern(pattern) => pattern,
        };

        let key = TerminalKey::Pattern(pattern.clone());
        if let Some(index) = self.terminals.get_index_of(&key) {
            return Ok(Sym::Terminal(index));
        }

        let counter = self.token_counters.entry(context.to_owned()).or_default();
        *counter += 1;
        let name = format!("_{}_token{}", context.trim_start_matches('_'), counter);
        let (index, _) = self.terminals.insert_full(
            key,
            TerminalDef {
                name,
                matcher: TokenMatcher::Pattern(pattern),
                visible: false,
                named: false,
            },
        );
        Ok(Sym::Terminal(index))
    }

    fn repeat_symbol(&mut self, content: &Rule, context: &str) -> Result<Sym, CompileError> {
        if let Some(&aux) = self.repeats.get(content) {
            return Ok(Sym::NonTerminal(aux));
        }

        let aux = self.aux_nonterminal(format!("_{}_repeat", context.trim_start_matches('_')));
        self.repeats.insert(content.clone(), aux);

        let items = self.flatten(content, context)?;
        let recursive = Alt::single(Sym::NonTerminal(aux));
        let mut alts = items.clone();
        alts.extend(items.iter().map(|item| recursive.concat(item)));
        self.add_productions(aux, alts);

        Ok(Sym::NonTerminal(aux))
    }

    fn aux_nonterminal(&mut self, base: String) -> usize {
        let mut n = 1;
        let mut name = format!("{base}{n}");
        while self.nonterminals.contains_key(&name) {
            n += 1;
            name = format!("{base}{n}");
        }
        let (index, _) = self.nonterminals.insert_full(
            name.clone(),
            NonTerminalDef {
                name,
                visible: false,
            },
        );
        index
    }

    fn alias_symbol(&mut self, value: &str, named: bool, content: &Rule) -> Result<Sym, CompileError> {
        if named {
            if let Some(i) = self.nonterminals.get_index_of(value) {
                if self.nonterminals[i].visible {
                    return Ok(Sym::NonTerminal(i));
                }
            }
            if let Some(i) = self
                .terminals
                .get_index_of(&TerminalKey::Named(value.to_owned()))
            {
                if self.terminals[i].visible {
                    return Ok(Sym::Terminal(i));
                }
            }
        } else if let Some(i) = self
            .terminals
            .get_index_of(&TerminalKey::Literal(value.to_owned()))
        {
            return Ok(Sym::Terminal(i));
        }

        let kind = if content.is_lexical() || self.is_token_symbol(content) {
            SymbolKind::Terminal
        } else {
            SymbolKind::NonTerminal
        };
        let entry = self.aliases.entry((value.to_owned(), named));
        let index = entry.index();
        entry.or_insert_with(|| AliasDef {
            name: value.to_owned(),
            named,
            kind,
        });
        Ok(Sym::Alias(index))
    }

    fn is_token_symbol(&self, rule: &Rule) -> bool {
        match rule {
            Rule::Symbol(name) => !self.nonterminals.contains_key(name),
            _ => false,
        }
    }

    fn mark_extras(&mut self) -> Result<(), CompileError> {
        let grammar = self.grammar;
        for extra in &grammar.extras {
            let symbol = match extra {
                Rule::Symbol(name) => self.resolve(name, "extras")?,
                Rule::String(value) => self.literal(value),
                rule if rule.is_lexical() => self.anonymous_token(rule, "extras")?,
                _ => {
                    return Err(CompileError::UnsupportedRule {
                        rule: "extras".into(),
                        message: "extras must be tokens".into(),
                    });
                }
            };
            if matches!(symbol, Sym::NonTerminal(_)) {
                return Err(CompileError::UnsupportedRule {
                    rule: "extras".into(),
                    message: "extras must be tokens".into(),
                });
            }
            self.extras.insert(symbol);
        }
        Ok(())
    }

    fn finish(self) -> Result<SyntaxGrammar, CompileError> {
        let terminal_base = SymbolId::BUILTIN_COUNT as usize;
        let external_base = terminal_base + self.terminals.len();
        let nonterminal_base = external_base + self.externals.len();
        let alias_base = nonterminal_base + self.nonterminals.len();
        let total = alias_base + self.aliases.len();
        if total > u16::MAX as usize {
            return Err(CompileError::TooLarge(format!("{total} symbols")));
        }

        let id = |sym: Sym| {
            SymbolId(match sym {
                Sym::Terminal(i) => terminal_base + i,
                Sym::External(i) => external_base + i,
                Sym::NonTerminal(i) => nonterminal_base + i,
                Sym::Alias(i) => alias_base + i,
            } as u16)
        };
        let extra = |sym: Sym| self.extras.contains(&sym);

        let builtin = |name: &str, visible: bool| SymbolInfo {
            name: name.into(),
            kind: SymbolKind::Builtin,
            visible,
            named: visible,
            extra: false,
        };
        let mut symbols = vec![
            builtin("end", false),
            builtin("ERROR", true),
            builtin("_trivia", false),
        ];
        let mut terminals = Vec::with_capacity(self.terminals.len());
        for (i, def) in self.terminals.values().enumerate() {
            symbols.push(SymbolInfo {
                name: def.name.clone(),
                kind: SymbolKind::Terminal,
                visible: def.visible,
                named: def.named,
                extra: extra(Sym::Terminal(i)),
            });
            terminals.push(LexTerminal {
                symbol: id(Sym::Terminal(i)),
                matcher: def.matcher.clone(),
            });
        }
        let mut externals = Vec::with_capacity(self.externals.len());
        for (i, (name, named)) in self.externals.iter().enumerate() {
            symbols.push(SymbolInfo {
                name: name.clone(),
                kind: SymbolKind::External,
                visible: !(*named && name.starts_with('_')),
                named: *named,
                extra: extra(Sym::External(i)),
            });
            externals.push(id(Sym::External(i)));
        }
        for def in self.nonterminals.values() {
            symbols.push(SymbolInfo {
                name: def.name.clone(),
                kind: SymbolKind::NonTerminal,
                visible: def.visible,
                named: true,
                extra: false,
            });
        }
        for def in self.aliases.values() {
            symbols.push(SymbolInfo {
                name: def.name.clone(),
                kind: def.kind,
                visible: true,
                named: def.named,
                extra: false,
            });
        }

        let productions = self
            .productions
            .iter()
            .map(|(lhs, alt)| FlatProduction {
                lhs: id(Sym::NonTerminal(*lhs)),
                steps: alt
                    .steps
                    .iter()
                    .map(|step| FlatStep {
                        symbol: id(step.symbol),
                        alias: step.alias.map(id),
                    })
                    .collect(),
                precedence: alt.precedence.unwrap_or(0),
                associativity: alt.associativity.unwrap_or_default(),
            })
            .collect();

        Ok(SyntaxGrammar {
            name: self.grammar.name.clone(),
            symbols,
            terminals,
            externals,
            productions,
            start: id(Sym::NonTerminal(0)),
        })
    }
}
