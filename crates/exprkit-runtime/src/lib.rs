//! exprkit Runtime
//!
//! Compiles an expression once and evaluates it any number of times under
//! pluggable semantics.
//!
//! ```text
//! source ─ compile_with(grammar) → Program ─ run_with(config) → Value
//! ```
//!
//! # Example
//!
//! ```
//! use exprkit_runtime::{compile, RuntimeConfig, Value};
//!
//! let program = compile("price * qty").unwrap();
//! let config = RuntimeConfig::new()
//!     .with_constant("price", 2.5)
//!     .with_constant("qty", 4.0);
//! assert_eq!(program.run_with(&config).unwrap(), Value::Number(10.0));
//! ```

pub mod config;
pub mod program;
pub mod value;

pub use config::{
    ConstantResolver, FunctionHandler, LiteralHandler, OperatorHandler, RuntimeConfig,
};
pub use exprkit_lexer::{Grammar, GrammarOptions, LiteralKind, Operator, Span, Toggle};
pub use exprkit_parser::{Expr, ExprKind, ParseError, MAX_DEPTH};
pub use program::Program;
pub use value::Value;

use exprkit_parser::Parser;

/// Compilation error. No `Program` is produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("expression is empty")]
    EmptySource,

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A semantic failure raised while evaluating one node.
///
/// "Absent" lookups have their own variants; anything a host handler
/// reports is carried verbatim in `Handler`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("unknown constant: {0}")]
    UnknownConstant(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    #[error("invalid literal: {0}")]
    InvalidLiteral(String),

    /// Only reachable for trees built by hand; the parser caps height at
    /// the same limit.
    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("{0}")]
    Handler(String),
}

/// Evaluation error, located at the node that was being evaluated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{source} {span}")]
pub struct RuntimeError {
    pub source: EvalError,
    pub span: Span,
}

/// Compile `source` with the default grammar.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    compile_with(source, &Grammar::default())
}

/// Compile `source` under `grammar`. Blank source is rejected up front.
pub fn compile_with(source: &str, grammar: &Grammar) -> Result<Program, CompileError> {
    if source.trim().is_empty() {
        return Err(CompileError::EmptySource);
    }
    let ast = Parser::parse_source(source, grammar)?;
    Ok(Program::new(ast))
}
