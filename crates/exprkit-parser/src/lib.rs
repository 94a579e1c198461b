//! exprkit Parser
//!
//! Parses a token stream into an expression tree with a precedence-climbing
//! parser. Operator precedence comes from the [`Grammar`] at runtime, so the
//! same parser serves any operator set a host configures.
//!
//! # Example
//!
//! ```
//! use exprkit_lexer::Grammar;
//! use exprkit_parser::Parser;
//!
//! let expr = Parser::parse_source("1 + 2 * 3", &Grammar::default()).unwrap();
//! assert_eq!(expr.to_string(), "(1 + (2 * 3))");
//! ```

pub mod ast;
pub mod parser;

pub use ast::{Expr, ExprKind};
pub use exprkit_lexer::Grammar;
pub use parser::{Parser, MAX_DEPTH};

use exprkit_lexer::{GrammarError, LexerError, Span};

/// Parser error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lexer(#[from] LexerError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("unexpected token {found} at {span}, expected {expected}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    /// Input ended while an expression or delimiter was still required.
    /// `span` is the last consumed token, or the end of the source if none was.
    #[error("unexpected end of input at {span}")]
    UnexpectedEnd { span: Span },

    #[error("unexpected trailing input {found} at {span}")]
    TrailingInput { found: String, span: Span },

    /// Nesting went past [`MAX_DEPTH`].
    #[error("expression nested too deeply at {span}")]
    TooDeep { span: Span },
}

impl ParseError {
    /// Source span the error points at, when it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::Lexer(LexerError::InvalidNumber { span, .. }) => Some(*span),
            ParseError::Lexer(
                LexerError::BacktrackUnderflow { pos }
                | LexerError::UnexpectedCharacter { pos, .. }
                | LexerError::UnterminatedString { pos }
                | LexerError::UnexpectedNewline { pos },
            ) => Some(Span::point(*pos)),
            ParseError::Grammar(_) => None,
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnexpectedEnd { span }
            | ParseError::TrailingInput { span, .. }
            | ParseError::TooDeep { span } => Some(*span),
        }
    }
}
