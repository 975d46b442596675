//! Command builders for the CLI.
//!
//! Each command is built from the shared arg builders in `args.rs`.
//! `--color` and `--verbose` are global and reach every subcommand.

use clap::Command;

use super::args::*;

/// Source input, language selection and budget flags shared by the
/// commands that parse.
fn with_parse_args(cmd: Command) -> Command {
    cmd.arg(source_path_arg())
        .arg(source_text_arg())
        .arg(lang_arg())
        .arg(grammar_arg())
        .arg(max_ops_arg())
        .arg(max_bytes_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("stache")
        .about("Incremental, error-tolerant parsing of HTML with Mustache templates")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(color_arg())
        .arg(verbose_arg())
        .subcommand(parse_command())
        .subcommand(edit_command())
        .subcommand(query_command())
        .subcommand(compile_command())
        .subcommand(info_command())
}

/// Parse a source file and print its tree.
pub fn parse_command() -> Command {
    let cmd = Command::new("parse")
        .about("Parse a source file and print its syntax tree")
        .override_usage(
            "\
  stache parse <SOURCE>
  stache parse -s <TEXT>
  stache parse <SOURCE> --grammar <TABLE>",
        )
        .after_help(
            r#"EXAMPLES:
  stache parse page.mustache                  # s-expression
  stache parse page.mustache --format tree    # indented, with byte ranges
  stache parse page.html --format json        # nested JSON
  stache parse -s '<p>{{name}}</p>'           # inline source
  stache parse page.html -d                   # fail on syntax errors
  stache parse page.html --grammar html.stbl  # compiled table from disk"#,
        )
        .arg(format_arg())
        .arg(diagnostics_arg());

    with_parse_args(cmd)
}

/// Parse, apply edits incrementally, and report reuse.
pub fn edit_command() -> Command {
    let cmd = Command::new("edit")
        .about("Apply edits incrementally and print the new tree")
        .override_usage(
            "\
  stache edit <SOURCE> --edit <START:END:TEXT>...
  stache edit -s <TEXT> --edit <START:END:TEXT>...",
        )
        .after_help(
            r#"EXAMPLES:
  stache edit page.mustache -e 20:24:user     # replace bytes 20..24
  stache edit -s '<p>a</p>' -e 3:3:b -e 0:0:x # edits apply in order
  stache edit page.html -e 10:15:             # delete bytes 10..15"#,
        )
        .arg(edit_arg())
        .arg(format_arg());

    with_parse_args(cmd)
}

/// Run a query against a parsed source.
pub fn query_command() -> Command {
    let cmd = Command::new("query")
        .about("Print the captures of a query over a source file")
        .override_usage(
            "\
  stache query <SOURCE> <QUERY>
  stache query -s <TEXT> <QUERY>",
        )
        .after_help(
            r#"EXAMPLES:
  stache query page.html '(tag_name) @tag'
  stache query page.mustache '(mustache_section (mustache_section_begin (mustache_tag_name) @name))'
  stache query -s '<p>{{x}}</p>' '(mustache_identifier) @id'"#,
        );

    // The source positional comes first.
    with_parse_args(cmd).arg(query_arg())
}

/// Compile a grammar definition into a table file.
pub fn compile_command() -> Command {
    Command::new("compile")
        .about("Compile a grammar.json into a parse table")
        .override_usage("  stache compile <GRAMMAR> [-o <TABLE>]")
        .after_help(
            r#"EXAMPLES:
  stache compile grammar.json                  # writes <name>.stbl
  stache compile grammar.json -o html.stbl"#,
        )
        .arg(grammar_json_arg())
        .arg(output_file_arg())
}

/// Describe a table file or the bundled languages.
pub fn info_command() -> Command {
    Command::new("info")
        .about("Show name, format version and table sizes")
        .override_usage("  stache info [TABLE]")
        .arg(table_path_arg())
}
