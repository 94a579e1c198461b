//! Expression tree.
//!
//! Trees are built once by the parser and only ever read afterwards; every
//! node records the source span it was parsed from.

use std::fmt;

use exprkit_lexer::Span;

/// A complete expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Literal: raw source text, `42`, `.5`, `"hello"` (quotes kept).
    /// Decoding is left to the runtime.
    Literal(String),

    /// Identifier: `count`, `TRUE`
    Identifier(String),

    /// Function call: `max(a, 1)`
    Call { callee: String, arguments: Vec<Expr> },

    /// Binary operation: `a + b`, `x AND y`
    Binary {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The same node with a different span (used to absorb parentheses).
    pub fn with_span(self, span: Span) -> Self {
        Self { span, ..self }
    }

    /// Visit this node and all descendants, parents before children,
    /// arguments and operands left to right.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        f(self);
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::Identifier(_) => {}
            ExprKind::Call { arguments, .. } => {
                for arg in arguments {
                    arg.visit(f);
                }
            }
            ExprKind::Binary { left, right, .. } => {
                left.visit(f);
                right.visit(f);
            }
        }
    }
}

/// Fully parenthesized rendering: `1 + 2 * 3` displays as `(1 + (2 * 3))`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(text) | ExprKind::Identifier(text) => f.write_str(text),
            ExprKind::Call { callee, arguments } => {
                write!(f, "{callee}(")?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            ExprKind::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
        }
    }
}
