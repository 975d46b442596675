//! Languages bundled with stache.
//!
//! Each language ships its grammar as a table compiled at build time, plus
//! the external scanner the grammar needs. Handles are loaded once and
//! shared.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod htmlmustache;

#[cfg(test)]
mod lib_tests;

use stache_lib::{Language, ScannerFactory};

/// Look up a bundled language by name or alias (case-insensitive).
pub fn from_name(name: &str) -> Option<Language> {
    match name.to_ascii_lowercase().as_str() {
        "htmlmustache" | "mustache" | "html" => Some(htmlmustache::language()),
        _ => None,
    }
}

/// Look up a bundled language by file extension (case-insensitive).
pub fn from_ext(ext: &str) -> Option<Language> {
    match ext.to_ascii_lowercase().as_str() {
        "mustache" | "html" | "htm" => Some(htmlmustache::language()),
        _ => None,
    }
}

/// External scanner for a grammar named `name`, for tables loaded from disk.
pub fn scanner_for(name: &str) -> Option<ScannerFactory> {
    match name {
        htmlmustache::NAME => Some(htmlmustache::scanner_factory()),
        _ => None,
    }
}

/// All bundled languages.
pub fn all() -> Vec<Language> {
    vec![htmlmustache::language()]
}
