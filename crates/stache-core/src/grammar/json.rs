//! Reading tree-sitter `grammar.json` files.
//!
//! Rules are objects tagged by a `type` field. Top-level keys the runtime
//! has no use for (`conflicts`, `precedences`, `reserved`) are ignored.

use indexmap::IndexMap;
use serde::Deserialize;

use super::types::{Grammar, Precedence, Rule};

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("invalid grammar.json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid binary grammar: {0}")]
    Binary(#[from] postcard::Error),
}

impl Grammar {
    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        let file: GrammarFile = serde_json::from_str(json)?;
        Ok(file.into_grammar())
    }
}

#[derive(Deserialize)]
struct GrammarFile {
    name: String,
    /// Insertion-ordered so the start rule stays first.
    rules: IndexMap<String, JsonRule>,
    #[serde(default)]
    extras: Vec<JsonRule>,
    #[serde(default)]
    externals: Vec<JsonRule>,
    #[serde(default)]
    inline: Vec<String>,
    #[serde(default)]
    supertypes: Vec<String>,
    #[serde(default)]
    word: Option<String>,
}

impl GrammarFile {
    fn into_grammar(self) -> Grammar {
        let list = |rules: Vec<JsonRule>| -> Vec<Rule> {
            rules.into_iter().map(JsonRule::into_rule).collect()
        };
        Grammar {
            name: self.name,
            rules: self
                .rules
                .into_iter()
                .map(|(name, rule)| (name, rule.into_rule()))
                .collect(),
            extras: list(self.extras),
            externals: list(self.externals),
            inline: self.inline,
            supertypes: self.supertypes,
            word: self.word,
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum JsonRule {
    Blank,
    String {
        value: String,
    },
    Pattern {
        value: String,
        #[serde(default)]
        flags: Option<String>,
    },
    Symbol {
        name: String,
    },
    Seq {
        members: Vec<JsonRule>,
    },
    Choice {
        members: Vec<JsonRule>,
    },
    Repeat {
        content: Box<JsonRule>,
    },
    Repeat1 {
        content: Box<JsonRule>,
    },
    Field {
        name: String,
        content: Box<JsonRule>,
    },
    Alias {
        content: Box<JsonRule>,
        value: String,
        named: bool,
    },
    Token {
        content: Box<JsonRule>,
    },
    ImmediateToken {
        content: Box<JsonRule>,
    },
    Prec {
        value: i32,
        content: Box<JsonRule>,
    },
    PrecLeft {
        value: i32,
        content: Box<JsonRule>,
    },
    PrecRight {
        value: i32,
        content: Box<JsonRule>,
    },
    /// Read for compatibility; the dynamic value is dropped.
    PrecDynamic {
        content: Box<JsonRule>,
    },
}

impl JsonRule {
    fn into_rule(self) -> Rule {
        let inner = |content: Box<JsonRule>| Box::new(content.into_rule());
        let list = |members: Vec<JsonRule>| -> Vec<Rule> {
            members.into_iter().map(JsonRule::into_rule).collect()
        };
        match self {
            JsonRule::Blank => Rule::Blank,
            JsonRule::String { value } => Rule::String(value),
            JsonRule::Pattern { value, flags } => Rule::Pattern { value, flags },
            JsonRule::Symbol { name } => Rule::Symbol(name),
            JsonRule::Seq { members } => Rule::Seq(list(members)),
            JsonRule::Choice { members } => Rule::Choice(list(members)),
            JsonRule::Repeat { content } => Rule::Repeat(inner(content)),
            JsonRule::Repeat1 { content } => Rule::Repeat1(inner(content)),
            JsonRule::Field { name, content } => Rule::Field {
                name,
                content: inner(content),
            },
            JsonRule::Alias {
                content,
                value,
                named,
            } => Rule::Alias {
                content: inner(content),
                value,
                named,
            },
            JsonRule::Token { content } => Rule::Token(inner(content)),
            JsonRule::ImmediateToken { content } => Rule::ImmediateToken(inner(content)),
            JsonRule::Prec { value, content } => Rule::Prec {
                value: Precedence::Integer(value),
                content: inner(content),
            },
            JsonRule::PrecLeft { value, content } => Rule::PrecLeft {
                value: Precedence::Integer(value),
                content: inner(content),
            },
            JsonRule::PrecRight { value, content } => Rule::PrecRight {
                value: Precedence::Integer(value),
                content: inner(content),
            },
            JsonRule::PrecDynamic { content } => content.into_rule(),
        }
    }
}
