//! Lexical rules: turning token-shaped grammar rules into matchers.

use regex_syntax::ParserBuilder;
use stache_core::{Rule, TokenMatcher};

use crate::CompileError;

/// Build the matcher for a lexical rule.
///
/// Plain strings (possibly wrapped in `token(...)` or a precedence) stay
/// literals; everything else becomes a single regex.
pub(crate) fn matcher_for(rule: &Rule, context: &str) -> Result<TokenMatcher, CompileError> {
    match rule {
        Rule::String(value) => literal(value, context),
        Rule::Token(content)
        | Rule::ImmediateToken(content)
        | Rule::Prec { content, .. }
        | Rule::PrecLeft { content, .. }
        | Rule::PrecRight { content, .. } => match content.as_ref() {
            Rule::String(value) => literal(value, context),
            _ => pattern(rule, context),
        },
        _ => pattern(rule, context),
    }
}

fn literal(value: &str, context: &str) -> Result<TokenMatcher, CompileError> {
    if value.is_empty() {
        return Err(CompileError::EmptyToken {
            rule: context.to_owned(),
        });
    }
    Ok(TokenMatcher::Literal(value.to_owned()))
}

fn pattern(rule: &Rule, context: &str) -> Result<TokenMatcher, CompileError> {
    let regex = to_regex(rule, context)?;
    validate_regex(&regex, context)?;
    Ok(TokenMatcher::Pattern(regex))
}

/// Translate a token rule into regex source.
pub(crate) fn to_regex(rule: &Rule, context: &str) -> Result<String, CompileError> {
    Ok(match rule {
        Rule::Blank => String::new(),
        Rule::String(value) => regex_syntax::escape(value),
        Rule::Pattern { value, flags } => match flags.as_deref() {
            Some(flags) if flags.contains('i') => format!("(?i:{value})"),
            _ => format!("(?:{value})"),
        },
        Rule::Seq(members) => members
            .iter()
            .map(|member| to_regex(member, context))
            .collect::<Result<String, _>>()?,
        Rule::Choice(members) => {
            let parts = members
                .iter()
                .map(|member| to_regex(member, context))
                .collect::<Result<Vec<_>, _>>()?;
            format!("(?:{})", parts.join("|"))
        }
        Rule::Repeat(content) => format!("(?:{})*", to_regex(content, context)?),
        Rule::Repeat1(content) => format!("(?:{})+", to_regex(content, context)?),
        Rule::Token(content)
        | Rule::ImmediateToken(content)
        | Rule::Field { content, .. }
        | Rule::Alias { content, .. }
        | Rule::Prec { content, .. }
        | Rule::PrecLeft { content, .. }
        | Rule::PrecRight { content, .. } => to_regex(content, context)?,
        Rule::Symbol(name) => {
            return Err(CompileError::UnsupportedRule {
                rule: context.to_owned(),
                message: format!("symbol `{name}` cannot appear inside a token"),
            });
        }
    })
}

fn validate_regex(regex: &str, context: &str) -> Result<(), CompileError> {
    ParserBuilder::new()
        .build()
        .parse(regex)
        .map(drop)
        .map_err(|err| CompileError::InvalidPattern {
            rule: context.to_owned(),
            message: err.to_string(),
        })
}
