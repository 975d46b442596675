//! Grammar type definitions.

use serde::{Deserialize, Serialize};

/// A grammar in tree-sitter's `grammar.json` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grammar {
    /// Grammar name (e.g., "htmlmustache").
    pub name: String,
    /// Production rules, preserving definition order. The first rule is the start symbol.
    pub rules: Vec<(String, Rule)>,
    /// Tokens allowed between any two symbols (comments, whitespace).
    #[serde(default)]
    pub extras: Vec<Rule>,
    /// Tokens produced by the external scanner, in scanner index order.
    #[serde(default)]
    pub externals: Vec<Rule>,
    /// Rules whose nodes are spliced into their parent.
    #[serde(default)]
    pub inline: Vec<String>,
    /// Supertype rules (hidden, listed for tooling).
    #[serde(default)]
    pub supertypes: Vec<String>,
    /// Keyword identifier rule.
    #[serde(default)]
    pub word: Option<String>,
}

impl Grammar {
    /// Look up a rule body by name.
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find_map(|(rule_name, rule)| (rule_name == name).then_some(rule))
    }

    /// Name of the start rule.
    pub fn start_rule(&self) -> Option<&str> {
        self.rules.first().map(|(name, _)| name.as_str())
    }
}

/// Grammar rule variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    /// Epsilon (empty match).
    Blank,
    /// Literal token.
    String(String),
    /// Regex token.
    Pattern {
        value: String,
        #[serde(default)]
        flags: Option<String>,
    },
    /// Reference to another rule or external token.
    Symbol(String),
    /// Sequence of rules (must match in order).
    Seq(Vec<Rule>),
    /// Alternation.
    Choice(Vec<Rule>),
    /// Zero or more repetitions.
    Repeat(Box<Rule>),
    /// One or more repetitions.
    Repeat1(Box<Rule>),
    /// Named field. Only the content takes part in parsing.
    Field { name: String, content: Box<Rule> },
    /// Rename node.
    Alias {
        content: Box<Rule>,
        value: String,
        named: bool,
    },
    /// Force tokenization.
    Token(Box<Rule>),
    /// Immediate tokenization.
    ImmediateToken(Box<Rule>),
    /// Precedence.
    Prec {
        value: Precedence,
        content: Box<Rule>,
    },
    /// Left-associative precedence.
    PrecLeft {
        value: Precedence,
        content: Box<Rule>,
    },
    /// Right-associative precedence.
    PrecRight {
        value: Precedence,
        content: Box<Rule>,
    },
}

impl Rule {
    pub fn string(value: impl Into<String>) -> Self {
        Rule::String(value.into())
    }

    pub fn pattern(value: impl Into<String>) -> Self {
        Rule::Pattern {
            value: value.into(),
            flags: None,
        }
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Rule::Symbol(name.into())
    }

    pub fn seq(members: impl IntoIterator<Item = Rule>) -> Self {
        Rule::Seq(members.into_iter().collect())
    }

    pub fn choice(members: impl IntoIterator<Item = Rule>) -> Self {
        Rule::Choice(members.into_iter().collect())
    }

    pub fn repeat(content: Rule) -> Self {
        Rule::Repeat(Box::new(content))
    }

    pub fn repeat1(content: Rule) -> Self {
        Rule::Repeat1(Box::new(content))
    }

    pub fn optional(content: Rule) -> Self {
        Rule::Choice(vec![content, Rule::Blank])
    }

    pub fn alias(content: Rule, value: impl Into<String>, named: bool) -> Self {
        Rule::Alias {
            content: Box::new(content),
            value: value.into(),
            named,
        }
    }

    pub fn prec(value: i32, content: Rule) -> Self {
        Rule::Prec {
            value: Precedence::Integer(value),
            content: Box::new(content),
        }
    }

    pub fn prec_left(value: i32, content: Rule) -> Self {
        Rule::PrecLeft {
            value: Precedence::Integer(value),
            content: Box::new(content),
        }
    }

    pub fn prec_right(value: i32, content: Rule) -> Self {
        Rule::PrecRight {
            value: Precedence::Integer(value),
            content: Box::new(content),
        }
    }

    /// True for rules that describe a single token (no sub-symbols).
    pub fn is_lexical(&self) -> bool {
        match self {
            Rule::String(_) | Rule::Pattern { .. } | Rule::Token(_) | Rule::ImmediateToken(_) => {
                true
            }
            Rule::Prec { content, .. }
            | Rule::PrecLeft { content, .. }
            | Rule::PrecRight { content, .. } => content.is_lexical(),
            _ => false,
        }
    }
}

/// Precedence value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precedence {
    Integer(i32),
}

impl Precedence {
    pub fn value(self) -> i32 {
        match self {
            Precedence::Integer(n) => n,
        }
    }
}
