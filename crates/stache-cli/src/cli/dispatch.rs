//! Dispatch logic: extract params from `ArgMatches` and convert them to
//! command args.
//!
//! `*Params` mirror the command `*Args` but are populated from clap; the
//! `From` impls bridge them to the command handlers.

use std::path::PathBuf;

use clap::ArgMatches;
use stache_lib::{Budget, ParseOptions};

use super::ColorChoice;
use crate::commands::compile::CompileArgs;
use crate::commands::edit::{EditArgs, EditSpec};
use crate::commands::info::InfoArgs;
use crate::commands::output::TreeFormat;
use crate::commands::parse::ParseArgs;
use crate::commands::query::QueryArgs;
use crate::commands::{LanguageChoice, SourceInput};

/// Flags that apply to every command.
pub struct GlobalParams {
    pub verbose: bool,
}

impl GlobalParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            verbose: m.get_flag("verbose"),
        }
    }
}

/// Source, language and budget flags of the parsing commands.
pub struct InputParams {
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub lang: Option<String>,
    pub grammar: Option<PathBuf>,
    pub max_ops: Option<u64>,
    pub max_bytes: Option<usize>,
}

impl InputParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            source_path: m.get_one::<PathBuf>("source_path").cloned(),
            source_text: m.get_one::<String>("source_text").cloned(),
            lang: m.get_one::<String>("lang").cloned(),
            grammar: m.get_one::<PathBuf>("grammar").cloned(),
            max_ops: m.get_one::<u64>("max_ops").copied(),
            max_bytes: m.get_one::<usize>("max_bytes").copied(),
        }
    }

    fn source(&self) -> SourceInput {
        SourceInput {
            path: self.source_path.clone(),
            text: self.source_text.clone(),
        }
    }

    fn language(&self) -> LanguageChoice {
        LanguageChoice {
            lang: self.lang.clone(),
            grammar: self.grammar.clone(),
        }
    }

    /// A budget only when one of the limits was given.
    fn options(&self) -> ParseOptions {
        if self.max_ops.is_none() && self.max_bytes.is_none() {
            return ParseOptions::new();
        }
        let mut budget = Budget::new();
        if let Some(ops) = self.max_ops {
            budget = budget.max_ops(ops);
        }
        if let Some(bytes) = self.max_bytes {
            budget = budget.max_bytes(bytes);
        }
        ParseOptions::new().budget(budget)
    }
}

pub struct ParseParams {
    pub input: InputParams,
    pub format: TreeFormat,
    pub diagnostics: bool,
    pub color: ColorChoice,
}

impl ParseParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input: InputParams::from_matches(m),
            format: parse_format(m),
            diagnostics: m.get_flag("diagnostics"),
            color: parse_color(m),
        }
    }
}

impl From<ParseParams> for ParseArgs {
    fn from(p: ParseParams) -> Self {
        Self {
            source: p.input.source(),
            language: p.input.language(),
            options: p.input.options(),
            format: p.format,
            diagnostics: p.diagnostics,
            color: p.color.should_colorize(),
        }
    }
}

pub struct EditParams {
    pub input: InputParams,
    pub edits: Vec<EditSpec>,
    pub format: TreeFormat,
}

impl EditParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input: InputParams::from_matches(m),
            edits: m
                .get_many::<EditSpec>("edit")
                .map(|edits| edits.cloned().collect())
                .unwrap_or_default(),
            format: parse_format(m),
        }
    }
}

impl From<EditParams> for EditArgs {
    fn from(p: EditParams) -> Self {
        Self {
            source: p.input.source(),
            language: p.input.language(),
            options: p.input.options(),
            edits: p.edits,
            format: p.format,
        }
    }
}

pub struct QueryParams {
    pub input: InputParams,
    pub query: Option<String>,
    pub color: ColorChoice,
}

impl QueryParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        let mut input = InputParams::from_matches(m);
        let mut query = m.get_one::<String>("query").cloned();

        // Positional shifting: with -s, a single positional is the query.
        if input.source_text.is_some() && query.is_none() {
            query = input
                .source_path
                .take()
                .map(|path| path.to_string_lossy().into_owned());
        }

        Self {
            input,
            query,
            color: parse_color(m),
        }
    }
}

impl From<QueryParams> for QueryArgs {
    fn from(p: QueryParams) -> Self {
        Self {
            source: p.input.source(),
            language: p.input.language(),
            options: p.input.options(),
            query: p.query,
            color: p.color.should_colorize(),
        }
    }
}

pub struct CompileParams {
    pub grammar_path: PathBuf,
    pub output: Option<PathBuf>,
}

impl CompileParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_path: m
                .get_one::<PathBuf>("grammar_json")
                .cloned()
                .unwrap_or_default(),
            output: m.get_one::<PathBuf>("output").cloned(),
        }
    }
}

impl From<CompileParams> for CompileArgs {
    fn from(p: CompileParams) -> Self {
        Self {
            grammar_path: p.grammar_path,
            output: p.output,
        }
    }
}

pub struct InfoParams {
    pub table_path: Option<PathBuf>,
}

impl InfoParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            table_path: m.get_one::<PathBuf>("table_path").cloned(),
        }
    }
}

impl From<InfoParams> for InfoArgs {
    fn from(p: InfoParams) -> Self {
        Self {
            table_path: p.table_path,
        }
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

fn parse_format(m: &ArgMatches) -> TreeFormat {
    match m.get_one::<String>("format").map(|s| s.as_str()) {
        Some("tree") => TreeFormat::Tree,
        Some("json") => TreeFormat::Json,
        _ => TreeFormat::Sexp,
    }
}
