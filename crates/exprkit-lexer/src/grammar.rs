//! Grammar configuration.
//!
//! A [`Grammar`] is the compile-time half of an exprkit language: which
//! literal kinds the scanner accepts, which operator tokens exist and their
//! precedence, and whether `name(args)` call syntax is allowed. It is built
//! once from [`GrammarOptions`] and never mutated afterwards.

use serde::Deserialize;

use crate::GrammarError;

/// Literal kinds a grammar can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralKind {
    Number,
    String,
}

/// An operator token and its binding strength. Higher binds tighter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Operator {
    pub token: String,
    pub precedence: u32,
}

impl Operator {
    pub fn new(token: impl Into<String>, precedence: u32) -> Self {
        Self {
            token: token.into(),
            precedence,
        }
    }
}

/// A knob that is either switched wholesale (`true` = built-in defaults,
/// `false` = nothing) or given an explicit list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Toggle<T> {
    All(bool),
    Only(Vec<T>),
}

/// User-facing grammar knobs. Every field is optional and defaults to the
/// built-in language (both literal kinds, `+ - * /`, calls allowed).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrammarOptions {
    pub literals: Option<Toggle<LiteralKind>>,
    pub operators: Option<Toggle<Operator>>,
    pub allow_function: Option<bool>,
}

/// Immutable grammar used by the scanner and parser.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    literals: Vec<LiteralKind>,
    operators: Vec<Operator>,
    allow_function: bool,
}

impl Grammar {
    pub fn new(options: GrammarOptions) -> Self {
        let literals = match options.literals {
            None | Some(Toggle::All(true)) => vec![LiteralKind::Number, LiteralKind::String],
            Some(Toggle::All(false)) => Vec::new(),
            Some(Toggle::Only(kinds)) => kinds,
        };
        let operators = match options.operators {
            None | Some(Toggle::All(true)) => default_operators(),
            Some(Toggle::All(false)) => Vec::new(),
            Some(Toggle::Only(ops)) => ops,
        };

        Self {
            literals,
            operators,
            allow_function: options.allow_function.unwrap_or(true),
        }
    }

    /// Default literals and call syntax with an explicit operator table.
    pub fn with_operators(operators: impl IntoIterator<Item = Operator>) -> Self {
        Self::new(GrammarOptions {
            operators: Some(Toggle::Only(operators.into_iter().collect())),
            ..GrammarOptions::default()
        })
    }

    pub fn allows_literal(&self, kind: LiteralKind) -> bool {
        self.literals.contains(&kind)
    }

    /// Exact-text membership in the operator table.
    pub fn is_operator(&self, text: &str) -> bool {
        self.find(text).is_some()
    }

    pub fn allows_calls(&self) -> bool {
        self.allow_function
    }

    /// Precedence of a configured operator. Duplicates resolve to the first entry.
    pub fn precedence(&self, text: &str) -> Result<u32, GrammarError> {
        self.find(text)
            .map(|op| op.precedence)
            .ok_or_else(|| GrammarError::UnknownOperator(text.to_string()))
    }

    pub fn operators(&self) -> impl Iterator<Item = &Operator> {
        self.operators.iter()
    }

    fn find(&self, text: &str) -> Option<&Operator> {
        self.operators.iter().find(|op| op.token == text)
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new(GrammarOptions::default())
    }
}

fn default_operators() -> Vec<Operator> {
    vec![
        Operator::new("+", 12),
        Operator::new("-", 12),
        Operator::new("*", 13),
        Operator::new("/", 13),
    ]
}
