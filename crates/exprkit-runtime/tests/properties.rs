use exprkit_lexer::{Grammar, Position, Scanner, TokenKind};
use exprkit_runtime::config::decode_literal;
use exprkit_runtime::{compile, Expr, Value};
use proptest::prelude::*;

/// Digits with at most one embedded `.`, including `.5` and `5.` forms.
fn numeric_literal() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,12}",
        "[0-9]{1,8}\\.[0-9]{1,8}",
        "\\.[0-9]{1,8}",
        "[0-9]{1,8}\\.",
    ]
}

/// Small expressions over the default grammar, built from pieces that
/// always parse.
fn expression() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[0-9]{1,3}",
        "[a-z_][a-z0-9_]{0,4}",
        "\"[a-z ]{0,4}\"",
    ];
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            (inner.clone(), "[-+*/]", inner.clone(), " {0,2}")
                .prop_map(|(l, op, r, ws)| format!("{l}{ws}{op}{ws}{r}")),
            inner.clone().prop_map(|e| format!("( {e} )")),
            prop::collection::vec(inner, 0..3)
                .prop_map(|args| format!("fn_x({})", args.join(", "))),
        ]
    })
}

fn covered(expr: &Expr, pos: Position) -> bool {
    let mut hit = false;
    expr.visit(&mut |node| hit |= node.span.contains(pos));
    hit
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn numeric_literals_round_trip(text in numeric_literal()) {
        let tokens = Scanner::tokenize(&text, &Grammar::default()).unwrap();
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind, TokenKind::Literal);
        prop_assert_eq!(&tokens[0].text, &text);

        let expected: f64 = text.parse().unwrap();
        prop_assert_eq!(decode_literal(&tokens[0].text).unwrap(), Value::Number(expected));
    }

    #[test]
    fn spans_cover_every_significant_char(source in expression()) {
        let program = compile(&source).unwrap();
        let mut pos = Position::new(1, 1);
        for ch in source.chars() {
            if !ch.is_whitespace() {
                prop_assert!(covered(program.ast(), pos), "{:?} at {} in {:?}", ch, pos, source);
            }
            pos.column += 1;
        }
    }

    #[test]
    fn rerun_is_deterministic(source in expression()) {
        let program = compile(&source).unwrap();
        let first = program.run().map_err(|e| e.to_string());
        let second = program.run().map_err(|e| e.to_string());
        prop_assert_eq!(first, second);
    }
}
