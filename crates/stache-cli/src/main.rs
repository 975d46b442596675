mod cli;
mod commands;

use std::process::ExitCode;

use cli::{CompileParams, EditParams, GlobalParams, InfoParams, ParseParams, QueryParams, build_cli};
use commands::CliError;

fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    let Some((name, m)) = matches.subcommand() else {
        unreachable!("clap should have caught this")
    };

    let global = GlobalParams::from_matches(m);
    init_tracing(global.verbose);

    let result = match name {
        "parse" => commands::parse::run(ParseParams::from_matches(m).into()),
        "edit" => commands::edit::run(EditParams::from_matches(m).into()),
        "query" => commands::query::run(QueryParams::from_matches(m).into()),
        "compile" => commands::compile::run(CompileParams::from_matches(m).into()),
        "info" => commands::info::run(InfoParams::from_matches(m).into()),
        _ => unreachable!("clap should have caught this"),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        // Already rendered as diagnostics.
        Err(CliError::SyntaxErrors(_) | CliError::InvalidQuery) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr when `--verbose` is given or `RUST_LOG` is set.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("debug"),
        Err(_) => return,
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}
