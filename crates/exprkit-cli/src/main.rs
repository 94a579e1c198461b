use clap::{Args, Parser, Subcommand};
use exprkit_lexer::{Grammar, GrammarOptions, LiteralKind, Operator, Scanner, Toggle};
use exprkit_runtime::{compile_with, Program, RuntimeConfig, Value};

#[derive(Parser)]
#[command(name = "exprkit")]
#[command(about = "exprkit: configurable expression evaluator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate an expression and print its value
    Eval {
        /// Expression source
        expr: String,

        /// Bind a constant, e.g. `--const rate=0.2`
        #[arg(long = "const", value_name = "NAME=VALUE", value_parser = parse_constant)]
        constants: Vec<(String, Value)>,

        #[command(flatten)]
        grammar: GrammarArgs,
    },

    /// Check an expression for errors without evaluating it
    Check {
        /// Expression source
        expr: String,

        #[command(flatten)]
        grammar: GrammarArgs,
    },

    /// Print the token stream of an expression
    Tokens {
        /// Expression source
        expr: String,

        #[command(flatten)]
        grammar: GrammarArgs,
    },
}

#[derive(Args, Default)]
struct GrammarArgs {
    /// Add an operator or change its precedence, e.g. `--op %=13`.
    /// Multi-char operators need every prefix declared too.
    #[arg(long = "op", value_name = "TOKEN=PREC", value_parser = parse_operator)]
    operators: Vec<Operator>,

    /// Disable `name(args)` call syntax
    #[arg(long)]
    no_calls: bool,

    /// Enabled literal kinds: `number`, `string`, both comma-separated, or `none`
    #[arg(long, value_name = "KINDS", value_parser = parse_literals)]
    literals: Option<Toggle<LiteralKind>>,
}

impl GrammarArgs {
    fn grammar(&self) -> Grammar {
        // Flags come first so they win over the defaults
        let operators = self
            .operators
            .iter()
            .cloned()
            .chain(Grammar::default().operators().cloned())
            .collect();

        Grammar::new(GrammarOptions {
            literals: self.literals.clone(),
            operators: Some(Toggle::Only(operators)),
            allow_function: Some(!self.no_calls),
        })
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Eval {
            expr,
            constants,
            grammar,
        } => cmd_eval(&expr, constants, &grammar),
        Command::Check { expr, grammar } => cmd_check(&expr, &grammar),
        Command::Tokens { expr, grammar } => cmd_tokens(&expr, &grammar),
    }
}

fn compile_or_exit(expr: &str, grammar: &GrammarArgs) -> Program {
    match compile_with(expr, &grammar.grammar()) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Compile error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_eval(expr: &str, constants: Vec<(String, Value)>, grammar: &GrammarArgs) {
    let program = compile_or_exit(expr, grammar);
    let config = runtime_config().with_constants(constants);

    match program.run_with(&config) {
        Ok(value) => println!("{value}"),
        Err(e) => {
            eprintln!("Runtime error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_check(expr: &str, grammar: &GrammarArgs) {
    let program = compile_or_exit(expr, grammar);
    eprintln!("OK: {}", program.ast());
}

fn cmd_tokens(expr: &str, grammar: &GrammarArgs) {
    let tokens = match Scanner::tokenize(expr, &grammar.grammar()) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("Lexer error: {e}");
            std::process::exit(1);
        }
    };

    for token in tokens {
        println!("{}\t{token}", token.span);
    }
}

// =============================================================================
// Built-in semantics
// =============================================================================

/// Default runtime plus the CLI's built-in functions and the extra operators
/// that `--op` can switch on.
fn runtime_config() -> RuntimeConfig {
    RuntimeConfig::new()
        .with_function("min", |args| fold_numbers("min", args, f64::min))
        .with_function("max", |args| fold_numbers("max", args, f64::max))
        .with_function("abs", |args| match args {
            [Value::Number(n)] => Ok(Value::Number(n.abs())),
            _ => Err("abs expects one number".to_string()),
        })
        .with_function("not", |args| match args {
            [arg] => arg
                .as_bool()
                .map(|b| Value::from(!b))
                .ok_or_else(|| format!("not expects a boolean, got {}", arg.type_name())),
            _ => Err("not expects one argument".to_string()),
        })
        .with_function("len", |args| match args {
            [arg] => arg
                .as_str()
                .map(|s| Value::Number(s.chars().count() as f64))
                .ok_or_else(|| format!("len expects a string, got {}", arg.type_name())),
            _ => Err("len expects one argument".to_string()),
        })
        .with_operator("%", |a, b| numbers("%", a, b).map(|(a, b)| Value::Number(a % b)))
        .with_operator("^", |a, b| numbers("^", a, b).map(|(a, b)| Value::Number(a.powf(b))))
        .with_operator("<", |a, b| numbers("<", a, b).map(|(a, b)| Value::from(a < b)))
        .with_operator(">", |a, b| numbers(">", a, b).map(|(a, b)| Value::from(a > b)))
        .with_operator("<=", |a, b| numbers("<=", a, b).map(|(a, b)| Value::from(a <= b)))
        .with_operator(">=", |a, b| numbers(">=", a, b).map(|(a, b)| Value::from(a >= b)))
        .with_operator("==", |a, b| Ok(Value::from(a == b)))
        .with_operator("!=", |a, b| Ok(Value::from(a != b)))
}

fn fold_numbers(name: &str, args: &[Value], pick: fn(f64, f64) -> f64) -> Result<Value, String> {
    let mut numbers = args.iter().map(|arg| {
        arg.as_number()
            .ok_or_else(|| format!("{name} expects numbers, got {}", arg.type_name()))
    });
    let first = numbers
        .next()
        .ok_or_else(|| format!("{name} expects at least one argument"))??;
    numbers
        .try_fold(first, |acc, n| Ok::<_, String>(pick(acc, n?)))
        .map(Value::Number)
}

fn numbers(op: &str, a: &Value, b: &Value) -> Result<(f64, f64), String> {
    match (a.as_number(), b.as_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(format!(
            "operator '{op}' expects numbers, got {} and {}",
            a.type_name(),
            b.type_name()
        )),
    }
}

// =============================================================================
// Flag parsers
// =============================================================================

fn parse_constant(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    if name.is_empty() {
        return Err(format!("missing constant name in '{raw}'"));
    }

    let value = match value {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        "null" => Value::Null,
        _ => value
            .parse::<f64>()
            .map_or_else(|_| Value::from(value), Value::Number),
    };
    Ok((name.to_string(), value))
}

fn parse_operator(raw: &str) -> Result<Operator, String> {
    // Split on the last '=' so `==` and `<=` can be declared
    let (token, precedence) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected TOKEN=PREC, got '{raw}'"))?;
    if token.is_empty() {
        return Err(format!("missing operator token in '{raw}'"));
    }
    let precedence = precedence
        .parse::<u32>()
        .map_err(|e| format!("invalid precedence in '{raw}': {e}"))?;
    Ok(Operator::new(token, precedence))
}

fn parse_literals(raw: &str) -> Result<Toggle<LiteralKind>, String> {
    if raw == "none" {
        return Ok(Toggle::All(false));
    }
    raw.split(',')
        .map(|kind| match kind.trim() {
            "number" => Ok(LiteralKind::Number),
            "string" => Ok(LiteralKind::String),
            other => Err(format!("unknown literal kind '{other}'")),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Toggle::Only)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(expr: &str, grammar: &GrammarArgs) -> Result<Value, String> {
        let program = compile_with(expr, &grammar.grammar()).map_err(|e| e.to_string())?;
        program.run_with(&runtime_config()).map_err(|e| e.to_string())
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from([
            "exprkit", "eval", "a % 3", "--const", "a=10", "--op", "%=13", "--no-calls",
        ])
        .unwrap();
        match cli.command {
            Command::Eval {
                expr,
                constants,
                grammar,
            } => {
                assert_eq!(expr, "a % 3");
                assert_eq!(constants, vec![("a".to_string(), Value::Number(10.0))]);
                assert_eq!(grammar.operators, vec![Operator::new("%", 13)]);
                assert!(grammar.no_calls);
            }
            _ => panic!("Expected eval"),
        }
    }

    #[test]
    fn test_parse_constant() {
        assert_eq!(parse_constant("x=1.5").unwrap(), ("x".into(), Value::Number(1.5)));
        assert_eq!(parse_constant("on=true").unwrap(), ("on".into(), Value::Boolean(true)));
        assert_eq!(parse_constant("s=a=b").unwrap(), ("s".into(), Value::from("a=b")));
        assert!(parse_constant("novalue").is_err());
        assert!(parse_constant("=1").is_err());
    }

    #[test]
    fn test_parse_operator() {
        assert_eq!(parse_operator("===7").unwrap(), Operator::new("==", 7));
        assert_eq!(parse_operator("AND=4").unwrap(), Operator::new("AND", 4));
        assert!(parse_operator("%").is_err());
        assert!(parse_operator("%=high").is_err());
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse_literals("none").unwrap(), Toggle::All(false));
        assert_eq!(
            parse_literals("number, string").unwrap(),
            Toggle::Only(vec![LiteralKind::Number, LiteralKind::String])
        );
        assert!(parse_literals("bool").is_err());
    }

    #[test]
    fn test_builtin_functions() {
        let grammar = GrammarArgs::default();
        assert_eq!(run("max(1, 7, 3)", &grammar), Ok(Value::Number(7.0)));
        assert_eq!(run("min(4, -2)", &grammar), Ok(Value::Number(-2.0)));
        assert_eq!(run("abs(1 - 5)", &grammar), Ok(Value::Number(4.0)));
        assert!(run("max()", &grammar).unwrap_err().contains("at least one argument"));
        assert!(run("min(1, \"x\")", &grammar).unwrap_err().contains("got string"));
    }

    #[test]
    fn test_not_and_len() {
        let grammar = GrammarArgs {
            operators: vec![Operator::new("<", 5)],
            ..Default::default()
        };
        assert_eq!(run("not(1 < 2)", &grammar), Ok(Value::Boolean(false)));
        assert_eq!(run("len(\"héllo\")", &grammar), Ok(Value::Number(5.0)));
        assert!(run("not(1)", &grammar).unwrap_err().contains("got number"));
        assert!(run("len(3)", &grammar).unwrap_err().contains("got number"));
        assert!(run("len()", &grammar).is_err());
    }

    #[test]
    fn test_op_flag_enables_operator() {
        let grammar = GrammarArgs {
            operators: vec![Operator::new("%", 13), Operator::new("-", 1)],
            ..Default::default()
        };
        assert_eq!(run("7 % 4", &grammar), Ok(Value::Number(3.0)));
        // `-` now binds looser than `+`
        assert_eq!(run("10 - 2 + 3", &grammar), Ok(Value::Number(5.0)));
    }

    #[test]
    fn test_comparison_needs_prefix() {
        let only_eq = GrammarArgs {
            operators: vec![Operator::new("==", 5)],
            ..Default::default()
        };
        assert!(run("1 == 1", &only_eq).is_err());

        let with_prefix = GrammarArgs {
            operators: vec![Operator::new("=", 0), Operator::new("==", 5)],
            ..Default::default()
        };
        assert_eq!(run("1 + 1 == 2", &with_prefix), Ok(Value::Boolean(true)));
    }

    #[test]
    fn test_no_calls_and_literals() {
        let grammar = GrammarArgs {
            no_calls: true,
            literals: Some(Toggle::Only(vec![LiteralKind::Number])),
            ..Default::default()
        };
        assert!(run("abs(1)", &grammar).is_err());
        assert!(run("\"s\"", &grammar).is_err());
        assert_eq!(run("2 * 3", &grammar), Ok(Value::Number(6.0)));
    }
}
