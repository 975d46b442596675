//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that commands compose. The same
//! definition is reused wherever a flag means the same thing.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Arg, ArgAction, value_parser};

use crate::commands::edit::EditSpec;

/// Source file to parse (positional, `-` for stdin).
pub fn source_path_arg() -> Arg {
    Arg::new("source_path")
        .value_name("SOURCE")
        .value_parser(value_parser!(PathBuf))
        .help("Source file to parse (- for stdin)")
}

/// Inline source text (-s/--source).
pub fn source_text_arg() -> Arg {
    Arg::new("source_text")
        .short('s')
        .long("source")
        .value_name("TEXT")
        .help("Inline source text")
}

/// Bundled language (-l/--lang).
pub fn lang_arg() -> Arg {
    Arg::new("lang")
        .short('l')
        .long("lang")
        .value_name("LANG")
        .help("Bundled language (inferred from extension if not specified)")
}

/// Compiled table file (--grammar).
pub fn grammar_arg() -> Arg {
    Arg::new("grammar")
        .short('g')
        .long("grammar")
        .value_name("TABLE")
        .value_parser(value_parser!(PathBuf))
        .conflicts_with("lang")
        .help("Compiled grammar table (.stbl) instead of a bundled language")
}

/// Tree output format (--format).
pub fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .value_name("FORMAT")
        .default_value("sexp")
        .value_parser(["sexp", "tree", "json"])
        .help("Tree output format")
}

/// Operation budget (--max-ops).
pub fn max_ops_arg() -> Arg {
    Arg::new("max_ops")
        .long("max-ops")
        .value_name("N")
        .value_parser(value_parser!(u64))
        .help("Stop after N lexer calls, shifts and reductions")
}

/// Byte budget (--max-bytes).
pub fn max_bytes_arg() -> Arg {
    Arg::new("max_bytes")
        .long("max-bytes")
        .value_name("N")
        .value_parser(value_parser!(usize))
        .help("Stop lexing at byte N")
}

/// Print diagnostics and fail on syntax errors (--diagnostics).
pub fn diagnostics_arg() -> Arg {
    Arg::new("diagnostics")
        .short('d')
        .long("diagnostics")
        .action(ArgAction::SetTrue)
        .help("Print syntax errors and exit with status 1 when there are any")
}

/// Edits applied in order (--edit start:end:text).
pub fn edit_arg() -> Arg {
    Arg::new("edit")
        .short('e')
        .long("edit")
        .value_name("START:END:TEXT")
        .action(ArgAction::Append)
        .required(true)
        .value_parser(EditSpec::from_str)
        .help("Replace bytes START..END with TEXT (repeatable)")
}

/// Query pattern text (positional).
pub fn query_arg() -> Arg {
    Arg::new("query")
        .value_name("QUERY")
        .help("Query pattern, e.g. '(tag_name) @name'")
}

/// Grammar definition file (positional).
pub fn grammar_json_arg() -> Arg {
    Arg::new("grammar_json")
        .value_name("GRAMMAR")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Grammar definition (grammar.json)")
}

/// Write output to file (-o/--output).
pub fn output_file_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Write output to file")
}

/// Table file to describe (optional positional).
pub fn table_path_arg() -> Arg {
    Arg::new("table_path")
        .value_name("TABLE")
        .value_parser(value_parser!(PathBuf))
        .help("Compiled grammar table (bundled languages if omitted)")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .global(true)
        .help("Colorize output")
}

/// Log to stderr (-v/--verbose).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Log parser and compiler activity to stderr")
}
