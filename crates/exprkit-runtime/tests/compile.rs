use exprkit_runtime::{
    compile, compile_with, CompileError, EvalError, Grammar, GrammarOptions, LiteralKind,
    Operator, ParseError, RuntimeConfig, Toggle, Value,
};
use pretty_assertions::assert_eq;

fn keyword_grammar() -> Grammar {
    Grammar::with_operators([Operator::new("AND", 12), Operator::new("IS", 11)])
}

fn boolean_config() -> RuntimeConfig {
    RuntimeConfig::new()
        .with_constants([("TRUE", true), ("FALSE", false)])
        .with_operator("AND", |a, b| Ok(Value::from(a.is_truthy() && b.is_truthy())))
        .with_operator("IS", |a, b| Ok(Value::from(a == b)))
        .with_function("Boolean", |args| {
            Ok(Value::from(args.first().is_some_and(Value::is_truthy)))
        })
}

#[test]
fn runs_with_default_config() {
    let program = compile("1 + 2").unwrap();
    assert_eq!(program.run().unwrap(), Value::Number(3.0));
}

#[test]
fn handler_error_carries_call_span() {
    let program = compile("add(1, \"2\")").unwrap();
    let config = RuntimeConfig::new().with_function("add", |args| match args {
        [Value::Number(a), Value::Number(b)] => Ok(Value::Number(a + b)),
        _ => Err("params must be number".to_string()),
    });

    let err = program.run_with(&config).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("params must be number"), "{message}");
    assert!(message.contains("1:1-1:11"), "{message}");
}

#[test]
fn custom_keyword_language() {
    let program = compile_with("TRUE AND FALSE IS Boolean(0)", &keyword_grammar()).unwrap();
    assert_eq!(program.run_with(&boolean_config()).unwrap(), Value::Boolean(true));
}

#[test]
fn custom_literal_handler() {
    let grammar = Grammar::with_operators([Operator::new("+", 12)]);
    let program = compile_with("1 + 1", &grammar).unwrap();

    // Wrap every literal as [type, value]
    let config = RuntimeConfig::new()
        .with_literal_handler(|text| {
            let value = match text.strip_prefix('"') {
                Some(rest) => Value::from(rest.trim_end_matches('"')),
                None => Value::Number(text.parse().map_err(|_| format!("bad number {text}"))?),
            };
            Ok(Value::List(vec![Value::from(value.type_name()), value]))
        })
        .with_operator("+", |a, b| match (a, b) {
            (Value::List(a), Value::List(b)) => {
                let sum = a[1].as_number().unwrap_or(0.0) + b[1].as_number().unwrap_or(0.0);
                Ok(Value::List(vec![Value::from("number"), Value::Number(sum)]))
            }
            _ => Err("expected wrapped values".to_string()),
        });

    assert_eq!(
        program.run_with(&config).unwrap(),
        Value::List(vec![Value::from("number"), Value::Number(2.0)])
    );
}

#[test]
fn nested_functions_with_constants() {
    let program = compile("add(add(a, 1), 1*2*3)").unwrap();
    let config = RuntimeConfig::new()
        .with_constant("a", 10.0)
        .with_function("add", |args| {
            Ok(Value::Number(args.iter().filter_map(Value::as_number).sum()))
        });
    assert_eq!(program.run_with(&config).unwrap(), Value::Number(17.0));
}

#[test]
fn leading_dot_numbers_evaluate() {
    assert_eq!(compile(".5 + .25").unwrap().run().unwrap(), Value::Number(0.75));
}

#[test]
fn comments_and_newlines_are_ignored() {
    let program = compile("# total\n1 +\n  2 # two\n* 3").unwrap();
    assert_eq!(program.run().unwrap(), Value::Number(7.0));
}

// =========================================================================
// Re-evaluation independence
// =========================================================================

#[test]
fn two_configs_do_not_leak() {
    let program = compile("x + y").unwrap();
    let first = RuntimeConfig::new().with_constants([("x", 1.0), ("y", 2.0)]);
    let second = RuntimeConfig::new()
        .with_constant("x", "a")
        .with_constant("y", "b")
        .with_operator("+", |a, b| Ok(Value::from(format!("{a}{b}"))));

    assert_eq!(program.run_with(&first).unwrap(), Value::Number(3.0));
    assert_eq!(program.run_with(&second).unwrap(), Value::from("ab"));
    assert_eq!(program.run_with(&first).unwrap(), Value::Number(3.0));
}

#[test]
fn same_config_same_result() {
    let program = compile_with("TRUE AND FALSE IS FALSE", &keyword_grammar()).unwrap();
    let config = boolean_config();
    let a = program.run_with(&config).unwrap();
    let b = program.run_with(&config).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, Value::Boolean(true));
}

#[test]
fn failed_run_does_not_poison_next_run() {
    let program = compile("f(1)").unwrap();
    let failing = RuntimeConfig::new().with_function("f", |_| Err("boom".to_string()));
    let working = RuntimeConfig::new().with_function("f", |args| Ok(args[0].clone()));

    assert_eq!(program.run_with(&failing).unwrap_err().to_string(), "boom 1:1-1:4");
    assert_eq!(program.run_with(&working).unwrap(), Value::Number(1.0));
}

// =========================================================================
// Grammar knobs through compile
// =========================================================================

#[test]
fn calls_disabled_rejects_call_syntax() {
    let grammar = Grammar::new(GrammarOptions {
        allow_function: Some(false),
        ..Default::default()
    });
    let err = compile_with("max(1, 2)", &grammar).unwrap_err();
    match err {
        CompileError::Parse(ParseError::UnexpectedToken { span, .. }) => {
            assert_eq!(span.to_string(), "1:4-1:4");
        }
        other => panic!("Expected UnexpectedToken, got {other:?}"),
    }
}

#[test]
fn string_literals_can_be_disabled() {
    let grammar = Grammar::new(GrammarOptions {
        literals: Some(Toggle::Only(vec![LiteralKind::Number])),
        ..Default::default()
    });
    assert!(compile_with("1 + 2", &grammar).is_ok());
    assert!(matches!(
        compile_with("\"a\"", &grammar),
        Err(CompileError::Parse(ParseError::Lexer(_)))
    ));
}

#[test]
fn multi_char_operator_needs_prefixes() {
    let only_eq = Grammar::with_operators([Operator::new("==", 7)]);
    assert!(compile_with("a == b", &only_eq).is_err());

    let with_prefix = Grammar::with_operators([Operator::new("=", 1), Operator::new("==", 7)]);
    let program = compile_with("a == b", &with_prefix).unwrap();
    let config = RuntimeConfig::new()
        .with_constants([("a", 1.0), ("b", 1.0)])
        .with_operator("==", |a, b| Ok(Value::from(a == b)));
    assert_eq!(program.run_with(&config).unwrap(), Value::Boolean(true));
}

#[test]
fn unknown_constant_is_distinct_from_handler_failure() {
    let program = compile("missing").unwrap();
    assert_eq!(
        program.run().unwrap_err().source,
        EvalError::UnknownConstant("missing".into())
    );

    let config = RuntimeConfig::new().with_resolver(|_| Some(Err("lookup failed".into())));
    assert_eq!(
        program.run_with(&config).unwrap_err().source,
        EvalError::Handler("lookup failed".into())
    );
}

// =========================================================================
// Pathological nesting
// =========================================================================

#[test]
fn deeply_nested_parens_are_an_error() {
    let source = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
    let err = compile(&source).unwrap_err();
    assert!(matches!(err, CompileError::Parse(ParseError::TooDeep { .. })));
    assert!(err.to_string().starts_with("expression nested too deeply"));
}

#[test]
fn long_operator_chain_is_an_error() {
    let source = vec!["1"; 200_000].join("+");
    assert!(matches!(
        compile(&source),
        Err(CompileError::Parse(ParseError::TooDeep { .. }))
    ));
}
