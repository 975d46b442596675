use std::path::Path;

use stache_core::{EncodedTable, LoadError};
use stache_langs::htmlmustache;
use stache_lib::Language;

use super::{CliError, LanguageChoice};

/// Resolve the language to parse with.
///
/// A `--grammar` table wins, then `--lang`, then the source file's
/// extension. Anything else parses as htmlmustache.
pub fn resolve_language(
    choice: &LanguageChoice,
    source_path: Option<&Path>,
) -> Result<Language, CliError> {
    if let Some(path) = &choice.grammar {
        return load_table(path);
    }

    if let Some(name) = &choice.lang {
        return stache_langs::from_name(name).ok_or_else(|| {
            if let Some(suggestion) = suggest_language(name) {
                eprintln!("hint: did you mean '{}'?", suggestion);
            }
            CliError::UnknownLanguage(name.clone())
        });
    }

    if let Some(path) = source_path
        && let Some(ext) = path.extension().and_then(|e| e.to_str())
        && let Some(language) = stache_langs::from_ext(ext)
    {
        return Ok(language);
    }

    Ok(htmlmustache::language())
}

/// Load a table file, attaching the bundled scanner its grammar needs.
pub fn load_table(path: &Path) -> Result<Language, CliError> {
    let load_error = |source| CliError::Load {
        path: path.to_path_buf(),
        source,
    };

    match Language::from_path(path, None) {
        Err(LoadError::MissingScanner { .. }) => {}
        result => return result.map_err(load_error),
    }

    let bytes = std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let name = EncodedTable::from_bytes(&bytes)
        .map_err(load_error)?
        .into_table()
        .name;
    let scanner = stache_langs::scanner_for(&name).ok_or_else(|| CliError::NoScanner {
        path: path.to_path_buf(),
        name: name.clone(),
    })?;
    tracing::debug!(%name, "attaching bundled scanner");
    Language::from_bytes(&bytes, Some(scanner)).map_err(load_error)
}

/// Suggest a bundled language name for a typo.
pub fn suggest_language(input: &str) -> Option<String> {
    let input = input.to_lowercase();
    stache_langs::all()
        .into_iter()
        .map(|lang| lang.name().to_string())
        .filter(|name| levenshtein(name, &input) <= 2)
        .min_by_key(|name| levenshtein(name, &input))
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev = (0..=b.len()).collect::<Vec<_>>();
    let mut curr = vec![0; b.len() + 1];
    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
