use exprkit_lexer::Span;
use exprkit_parser::{Expr, ExprKind, MAX_DEPTH};

use crate::config::RuntimeConfig;
use crate::value::Value;
use crate::{EvalError, RuntimeError};

/// A compiled expression, ready to run any number of times.
///
/// The tree is immutable. Each run owns its own ancestor stack, so a
/// `Program` can be shared between threads and evaluated concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    ast: Expr,
}

impl Program {
    pub fn new(ast: Expr) -> Self {
        Self { ast }
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    /// Evaluate with the default runtime configuration.
    pub fn run(&self) -> Result<Value, RuntimeError> {
        self.run_with(&RuntimeConfig::default())
    }

    /// Evaluate with `config`. Errors carry the span of the node whose
    /// handler failed.
    pub fn run_with(&self, config: &RuntimeConfig) -> Result<Value, RuntimeError> {
        let mut stack = Vec::new();
        eval(&self.ast, config, &mut stack).map_err(|source| RuntimeError {
            source,
            span: failing_span(&stack, self.ast.span),
        })
    }
}

/// Depth-first evaluation. A node is pushed before its children are
/// evaluated and popped once its own handler succeeds; on failure it stays
/// on top of `stack`.
fn eval<'a>(
    node: &'a Expr,
    config: &RuntimeConfig,
    stack: &mut Vec<&'a Expr>,
) -> Result<Value, EvalError> {
    stack.push(node);
    if stack.len() > MAX_DEPTH {
        return Err(EvalError::TooDeep(MAX_DEPTH));
    }

    let value = match &node.kind {
        ExprKind::Literal(text) => config.handle_literal(text)?,
        ExprKind::Identifier(name) => config.handle_constant(name)?,
        ExprKind::Call { callee, arguments } => {
            let args = arguments
                .iter()
                .map(|arg| eval(arg, config, stack))
                .collect::<Result<Vec<_>, _>>()?;
            config.handle_function(callee, &args)?
        }
        ExprKind::Binary { op, left, right } => {
            let left = eval(left, config, stack)?;
            let right = eval(right, config, stack)?;
            config.handle_operator(op, &left, &right)?
        }
    };

    stack.pop();
    Ok(value)
}

fn failing_span(stack: &[&Expr], fallback: Span) -> Span {
    stack.last().map_or(fallback, |node| node.span)
}
