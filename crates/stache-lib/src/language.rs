//! Loaded languages.
//!
//! A [`Language`] is the runtime form of a compiled grammar: the validated
//! parse table, one matcher per internal terminal, per-state lexing modes,
//! and the external scanner factory. It is immutable and cheap to clone, so
//! one instance can serve any number of parsers on any number of threads.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;
use stache_core::{
    EncodedTable, FORMAT_VERSION, GrammarProvider, LoadError, ParseTable, StateId, SymbolId,
};

use crate::lexer::{ExternalScanner, Matcher, ScannerFactory};

/// Terminals worth trying in one parse state.
#[derive(Debug)]
pub(crate) struct LexMode {
    /// Scanner `valid` flags, by external index.
    pub externals: Box<[bool]>,
    pub any_external: bool,
    /// Internal terminal indices, in declaration order.
    pub terminals: Box<[usize]>,
}

struct Inner {
    table: ParseTable,
    version: u32,
    matchers: Vec<Matcher>,
    modes: Vec<LexMode>,
    scanner: Option<ScannerFactory>,
}

/// Shared handle to a loaded grammar.
#[derive(Clone)]
pub struct Language {
    inner: Arc<Inner>,
}

impl Language {
    /// Load a grammar without an external scanner.
    pub fn load(provider: &impl GrammarProvider) -> Result<Self, LoadError> {
        Self::build(provider, None)
    }

    /// Load a grammar whose external tokens come from `factory`'s scanners.
    pub fn load_with_scanner<F>(provider: &impl GrammarProvider, factory: F) -> Result<Self, LoadError>
    where
        F: Fn() -> Box<dyn ExternalScanner> + Send + Sync + 'static,
    {
        Self::build(provider, Some(Arc::new(factory)))
    }

    /// Decode a table container and load it.
    pub fn from_bytes(bytes: &[u8], scanner: Option<ScannerFactory>) -> Result<Self, LoadError> {
        let encoded = EncodedTable::from_bytes(bytes)?;
        Self::build(&encoded, scanner)
    }

    /// Memory-map a table file and load it.
    pub fn from_path(path: impl AsRef<Path>, scanner: Option<ScannerFactory>) -> Result<Self, LoadError> {
        let file = File::open(path)?;
        // SAFETY: the mapping is only read while decoding and dropped before returning.
        // Concurrent truncation of the file is the caller's responsibility.
        let map = unsafe { Mmap::map(&file)? };
        Self::from_bytes(&map, scanner)
    }

    fn build(provider: &impl GrammarProvider, scanner: Option<ScannerFactory>) -> Result<Self, LoadError> {
        if provider.version() != FORMAT_VERSION {
            return Err(LoadError::UnsupportedVersion {
                found: provider.version(),
                expected: FORMAT_VERSION,
            });
        }

        let table = provider.tables();
        table.validate()?;
        if !table.externals.is_empty() && scanner.is_none() {
            return Err(LoadError::MissingScanner {
                externals: table.externals.len(),
            });
        }

        let matchers = table
            .terminals
            .iter()
            .map(|terminal| {
                Matcher::build(&terminal.matcher).map_err(|message| LoadError::InvalidPattern {
                    terminal: table.symbol_name(terminal.symbol).to_owned(),
                    message,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let modes = lex_modes(table);

        tracing::debug!(
            language = %table.name,
            symbols = table.symbols.len(),
            states = table.states.len(),
            "loaded language"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                table: table.clone(),
                version: provider.version(),
                matchers,
                modes,
                scanner,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.table.name
    }

    /// Table format version this language was loaded from.
    pub fn version(&self) -> u32 {
        self.inner.version
    }

    pub fn symbol_count(&self) -> usize {
        self.inner.table.symbols.len()
    }

    pub fn state_count(&self) -> usize {
        self.inner.table.states.len()
    }

    pub fn symbol_name(&self, symbol: SymbolId) -> &str {
        self.inner.table.symbol_name(symbol)
    }

    pub fn symbol_for_name(&self, name: &str, named: bool) -> Option<SymbolId> {
        self.inner.table.symbol(name, named)
    }

    pub fn is_named(&self, symbol: SymbolId) -> bool {
        self.inner
            .table
            .symbol_info(symbol)
            .is_some_and(|info| info.named)
    }

    pub fn is_visible(&self, symbol: SymbolId) -> bool {
        self.inner
            .table
            .symbol_info(symbol)
            .is_some_and(|info| info.visible)
    }

    pub fn is_extra(&self, symbol: SymbolId) -> bool {
        self.inner
            .table
            .symbol_info(symbol)
            .is_some_and(|info| info.extra)
    }

    pub fn has_scanner(&self) -> bool {
        self.inner.scanner.is_some()
    }

    pub fn table(&self) -> &ParseTable {
        &self.inner.table
    }

    /// Whether two handles share the same loaded grammar.
    pub fn same_as(&self, other: &Language) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn new_scanner(&self) -> Option<Box<dyn ExternalScanner>> {
        self.inner.scanner.as_ref().map(|factory| factory())
    }

    pub(crate) fn matcher(&self, terminal: usize) -> &Matcher {
        &self.inner.matchers[terminal]
    }

    pub(crate) fn lex_mode(&self, state: StateId) -> &LexMode {
        &self.inner.modes[state.index()]
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name())
            .field("version", &self.version())
            .field("symbols", &self.symbol_count())
            .field("states", &self.state_count())
            .field("scanner", &self.has_scanner())
            .finish()
    }
}

fn lex_modes(table: &ParseTable) -> Vec<LexMode> {
    let terminal_index: HashMap<SymbolId, usize> = table
        .terminals
        .iter()
        .enumerate()
        .map(|(i, terminal)| (terminal.symbol, i))
        .collect();
    let extras: Vec<SymbolId> = table.extras().collect();

    (0..table.states.len())
        .map(|state| {
            let mut externals = vec![false; table.externals.len()];
            let mut terminals = Vec::new();
            let valid = table.valid_terminals(StateId(state as u16)).chain(extras.iter().copied());
            for symbol in valid {
                if let Some(&index) = terminal_index.get(&symbol) {
                    terminals.push(index);
                } else if let Some(index) = table.external_index(symbol) {
                    externals[index] = true;
                }
            }
            terminals.sort_unstable();
            terminals.dedup();
            LexMode {
                any_external: externals.iter().any(|&valid| valid),
                externals: externals.into(),
                terminals: terminals.into(),
            }
        })
        .collect()
}
