use std::path::PathBuf;

use stache_core::Grammar;

/// Grammars compiled into `OUT_DIR/<name>.stbl` and embedded by `src/<name>`.
const GRAMMARS: &[&str] = &["htmlmustache"];

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR not set");

    for name in GRAMMARS {
        let grammar_path = PathBuf::from(&manifest_dir)
            .join("grammar")
            .join(name)
            .join("grammar.json");
        println!("cargo::rerun-if-changed={}", grammar_path.display());

        let json = std::fs::read_to_string(&grammar_path)
            .unwrap_or_else(|e| panic!("failed to read {}: {e}", grammar_path.display()));
        let grammar = Grammar::from_json(&json)
            .unwrap_or_else(|e| panic!("invalid grammar {}: {e}", grammar_path.display()));
        let table = stache_compiler::compile(&grammar)
            .unwrap_or_else(|e| panic!("failed to compile grammar `{name}`: {e}"));
        let bytes = stache_core::format::encode(&table)
            .unwrap_or_else(|e| panic!("failed to encode table `{name}`: {e}"));

        let table_path = PathBuf::from(&out_dir).join(format!("{name}.stbl"));
        std::fs::write(&table_path, bytes)
            .unwrap_or_else(|e| panic!("failed to write {}: {e}", table_path.display()));
    }

    println!("cargo::rerun-if-changed=build.rs");
}
