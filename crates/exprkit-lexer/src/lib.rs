//! exprkit Lexer
//!
//! Turns expression source text into tokens under a caller-supplied
//! [`Grammar`]. The grammar decides which literal kinds exist, which operator
//! tokens are recognized and how tightly they bind, and whether call syntax
//! is allowed; the scanner itself hardcodes none of that.
//!
//! # Example
//!
//! ```
//! use exprkit_lexer::{Grammar, Scanner, TokenKind};
//!
//! let tokens = Scanner::tokenize("two + 1.1", &Grammar::default()).unwrap();
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[1].kind, TokenKind::Operator);
//! ```

pub mod cursor;
pub mod grammar;
pub mod scanner;
pub mod token;

pub use cursor::Cursor;
pub use grammar::{Grammar, GrammarOptions, LiteralKind, Operator, Toggle};
pub use scanner::Scanner;
pub use token::{Position, Span, Token, TokenKind};

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    /// `Cursor::back` called with no step to undo.
    #[error("cannot step back: already at the beginning of the string ({pos})")]
    BacktrackUnderflow { pos: Position },

    #[error("invalid character '{ch}' at {pos}")]
    UnexpectedCharacter { ch: char, pos: Position },

    /// End of input reached before the closing quote. `pos` is the opening quote.
    #[error("unterminated string starting at {pos}")]
    UnterminatedString { pos: Position },

    #[error("unexpected newline in string at {pos}")]
    UnexpectedNewline { pos: Position },

    #[error("invalid number '{text}' at {span}")]
    InvalidNumber { text: String, span: Span },
}

/// Grammar configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("unknown operator: {0}")]
    UnknownOperator(String),
}
