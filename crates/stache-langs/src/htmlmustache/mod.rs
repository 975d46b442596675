//! HTML with Mustache templates.
//!
//! The grammar in `grammar/htmlmustache/grammar.json` is compiled into a
//! parse table at build time and embedded here. Tag names, implicit end
//! tags, raw `<script>`/`<style>` text, comments and Mustache section names
//! come from [`Scanner`].

mod scanner;
mod tag;

#[cfg(test)]
mod scanner_tests;
#[cfg(test)]
mod tag_tests;

use std::sync::{Arc, LazyLock};

use stache_lib::{ExternalScanner, Language, LoadError, ScannerFactory};

pub use scanner::{SERIALIZATION_BUFFER_SIZE, Scanner};
pub use tag::{Tag, TagKind};

pub const NAME: &str = "htmlmustache";

/// The compiled table container.
pub static TABLE: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/htmlmustache.stbl"));

/// Creates a fresh [`Scanner`] for every parse.
pub fn scanner_factory() -> ScannerFactory {
    Arc::new(|| -> Box<dyn ExternalScanner> { Box::new(Scanner::default()) })
}

/// Decode the embedded table and attach the scanner.
pub fn load() -> Result<Language, LoadError> {
    Language::from_bytes(TABLE, Some(scanner_factory()))
}

/// Shared handle to the language, loaded on first use.
pub fn language() -> Language {
    static LANGUAGE: LazyLock<Language> =
        LazyLock::new(|| load().expect("embedded htmlmustache table is valid"));
    LANGUAGE.clone()
}
