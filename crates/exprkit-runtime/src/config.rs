//! Runtime configuration.
//!
//! The evaluation-time half of an exprkit language. Every hook is optional;
//! a default `RuntimeConfig` decodes number and string literals and knows the
//! numeric operators `+ - * /`, nothing else.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::value::Value;
use crate::EvalError;

/// Variadic function handler.
pub type FunctionHandler = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Binary operator handler, called with the left and right operand.
pub type OperatorHandler = Arc<dyn Fn(&Value, &Value) -> Result<Value, String> + Send + Sync>;

/// Turns raw literal text (quotes included for strings) into a value.
pub type LiteralHandler = Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>;

/// Fallback for names missing from the constant table.
/// `None` means the resolver does not know the name either.
pub type ConstantResolver = Arc<dyn Fn(&str) -> Option<Result<Value, String>> + Send + Sync>;

/// Pluggable evaluation semantics.
#[derive(Clone)]
pub struct RuntimeConfig {
    constants: HashMap<String, Value>,
    resolver: Option<ConstantResolver>,
    functions: HashMap<String, FunctionHandler>,
    literal_handler: Option<LiteralHandler>,
    operators: HashMap<String, OperatorHandler>,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_constant(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constants.insert(name.into(), value.into());
        self
    }

    pub fn with_constants<K, V>(mut self, constants: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.constants
            .extend(constants.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_resolver(
        mut self,
        resolver: impl Fn(&str) -> Option<Result<Value, String>> + Send + Sync + 'static,
    ) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_function(
        mut self,
        name: impl Into<String>,
        handler: impl Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.functions.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn with_literal_handler(
        mut self,
        handler: impl Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.literal_handler = Some(Arc::new(handler));
        self
    }

    /// Add an operator, or replace a built-in one.
    pub fn with_operator(
        mut self,
        op: impl Into<String>,
        handler: impl Fn(&Value, &Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.operators.insert(op.into(), Arc::new(handler));
        self
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    pub fn handle_literal(&self, text: &str) -> Result<Value, EvalError> {
        match &self.literal_handler {
            Some(handler) => handler(text).map_err(EvalError::Handler),
            None => decode_literal(text),
        }
    }

    /// Constant table first, then the resolver.
    pub fn handle_constant(&self, name: &str) -> Result<Value, EvalError> {
        if let Some(value) = self.constants.get(name) {
            return Ok(value.clone());
        }
        match self.resolver.as_ref().and_then(|resolve| resolve(name)) {
            Some(result) => result.map_err(EvalError::Handler),
            None => Err(EvalError::UnknownConstant(name.to_string())),
        }
    }

    pub fn handle_function(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        let handler = self
            .functions
            .get(name)
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
        handler(args).map_err(EvalError::Handler)
    }

    pub fn handle_operator(
        &self,
        op: &str,
        left: &Value,
        right: &Value,
    ) -> Result<Value, EvalError> {
        let handler = self
            .operators
            .get(op)
            .ok_or_else(|| EvalError::UnknownOperator(op.to_string()))?;
        handler(left, right).map_err(EvalError::Handler)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let mut operators: HashMap<String, OperatorHandler> = HashMap::new();
        operators.insert("+".into(), numeric("+", |a, b| a + b));
        operators.insert("-".into(), numeric("-", |a, b| a - b));
        operators.insert("*".into(), numeric("*", |a, b| a * b));
        operators.insert("/".into(), numeric("/", |a, b| a / b));

        Self {
            constants: HashMap::new(),
            resolver: None,
            functions: HashMap::new(),
            literal_handler: None,
            operators,
        }
    }
}

impl fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut functions: Vec<_> = self.functions.keys().collect();
        functions.sort();
        let mut operators: Vec<_> = self.operators.keys().collect();
        operators.sort();

        f.debug_struct("RuntimeConfig")
            .field("constants", &self.constants)
            .field("resolver", &self.resolver.is_some())
            .field("functions", &functions)
            .field("literal_handler", &self.literal_handler.is_some())
            .field("operators", &operators)
            .finish()
    }
}

/// Default literal decoding: strip the quotes of a string literal (no escape
/// processing), otherwise parse a number.
pub fn decode_literal(text: &str) -> Result<Value, EvalError> {
    if let Some(inner) = text.strip_prefix('"') {
        let inner = inner.strip_suffix('"').unwrap_or(inner);
        return Ok(Value::String(inner.to_string()));
    }
    text.parse::<f64>()
        .map(Value::Number)
        .map_err(|_| EvalError::InvalidLiteral(text.to_string()))
}

fn numeric(op: &'static str, apply: fn(f64, f64) -> f64) -> OperatorHandler {
    Arc::new(move |left: &Value, right: &Value| match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(apply(*a, *b))),
        _ => Err(format!(
            "operator '{op}' expects numbers, got {} and {}",
            left.type_name(),
            right.type_name()
        )),
    })
}
