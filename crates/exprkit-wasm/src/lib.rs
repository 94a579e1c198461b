//! WASM bindings for the exprkit evaluator.
//!
//! Values cross the boundary as plain JS data (`null`, booleans, numbers,
//! strings, arrays). Every export throws a JS error carrying the rendered
//! message on failure.

use std::collections::HashMap;

use exprkit_lexer::{Grammar, GrammarOptions, Scanner, Token};
use exprkit_runtime::{compile_with, RuntimeConfig, Value};
use wasm_bindgen::prelude::*;

/// Evaluate `source` with the default grammar.
///
/// `constants` is a plain object such as `{ price: 2.5, label: "x" }`, or
/// `undefined`.
#[wasm_bindgen]
pub fn evaluate(source: &str, constants: JsValue) -> Result<JsValue, JsError> {
    let constants = constants_from_js(constants)?;
    let value = run(source, &Grammar::default(), constants).map_err(|e| JsError::new(&e))?;
    to_js(&value)
}

/// Evaluate `source` under custom grammar options, e.g.
/// `{ operators: [{ token: "AND", precedence: 12 }], allowFunction: false }`.
#[wasm_bindgen(js_name = evaluateWith)]
pub fn evaluate_with(
    source: &str,
    grammar: JsValue,
    constants: JsValue,
) -> Result<JsValue, JsError> {
    let grammar = grammar_from_js(grammar)?;
    let constants = constants_from_js(constants)?;
    let value = run(source, &grammar, constants).map_err(|e| JsError::new(&e))?;
    to_js(&value)
}

/// Compile without evaluating. Returns the fully parenthesized form.
#[wasm_bindgen]
pub fn check(source: &str) -> Result<String, JsError> {
    canonical(source).map_err(|e| JsError::new(&e))
}

/// Token stream as an array of `{ kind, text, span }` objects.
#[wasm_bindgen]
pub fn tokens(source: &str) -> Result<js_sys::Array, JsError> {
    let tokens =
        Scanner::tokenize(source, &Grammar::default()).map_err(|e| JsError::new(&e.to_string()))?;
    tokens.iter().map(token_to_js).collect()
}

/// Get the evaluator version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// =============================================================================
// Native pipeline
// =============================================================================

fn run(
    source: &str,
    grammar: &Grammar,
    constants: HashMap<String, Value>,
) -> Result<Value, String> {
    let program = compile_with(source, grammar).map_err(|e| e.to_string())?;
    let config = RuntimeConfig::new().with_constants(constants);
    program.run_with(&config).map_err(|e| e.to_string())
}

fn canonical(source: &str) -> Result<String, String> {
    compile_with(source, &Grammar::default())
        .map(|program| program.ast().to_string())
        .map_err(|e| e.to_string())
}

// =============================================================================
// JS conversions
// =============================================================================

fn constants_from_js(constants: JsValue) -> Result<HashMap<String, Value>, JsError> {
    if constants.is_undefined() || constants.is_null() {
        return Ok(HashMap::new());
    }
    serde_wasm_bindgen::from_value(constants)
        .map_err(|e| JsError::new(&format!("invalid constants: {e}")))
}

fn grammar_from_js(grammar: JsValue) -> Result<Grammar, JsError> {
    if grammar.is_undefined() || grammar.is_null() {
        return Ok(Grammar::default());
    }
    let options: GrammarOptions = serde_wasm_bindgen::from_value(grammar)
        .map_err(|e| JsError::new(&format!("invalid grammar: {e}")))?;
    Ok(Grammar::new(options))
}

fn to_js(value: &Value) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsError::new(&e.to_string()))
}

fn token_to_js(token: &Token) -> Result<JsValue, JsError> {
    let obj = js_sys::Object::new();
    js_sys::Reflect::set(&obj, &"kind".into(), &token.kind.to_string().into())
        .map_err(|_| JsError::new("Failed to set kind property"))?;
    js_sys::Reflect::set(&obj, &"text".into(), &token.text.as_str().into())
        .map_err(|_| JsError::new("Failed to set text property"))?;
    js_sys::Reflect::set(&obj, &"span".into(), &token.span.to_string().into())
        .map_err(|_| JsError::new("Failed to set span property"))?;
    Ok(obj.into())
}
