use minicalc::token::TokenKind;
use minicalc::{evaluate, parse, run, tokenize, Environment, ErrorKind, Interpreter, Value};

fn eval_number(source: &str) -> f64 {
    match run(source).expect("Execution failed") {
        Value::Number(n) => n,
        other => panic!("Expected number, got {:?}", other),
    }
}

#[test]
fn test_standard_arithmetic() {
    assert_eq!(eval_number("2 + 3 * 4"), 14.0);
    assert_eq!(eval_number("(2 + 3) * 4"), 20.0);
    assert_eq!(eval_number("10 / 2 - 1"), 4.0);
    assert_eq!(eval_number("100 % 7"), 2.0);
    assert_eq!(eval_number("2 * (3 + (4 - 1)) / 3"), 4.0);
    assert_eq!(eval_number("1.5 + 2.25"), 3.75);
}

#[test]
fn test_token_texts_reconstruct_significant_source() {
    let source = "var soma = a + b; /* block */ soma >= 10 && 'ok' // tail";
    let joined: String = tokenize(source)
        .iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(joined, "varsoma=a+b;soma>=10&&'ok'");
}

#[test]
fn test_declarations_share_one_environment() {
    let mut env = Environment::new();
    for stmt in ["var a = 5;", "var b = 10;", "var soma = a + b;"] {
        let ast = parse(tokenize(stmt)).expect("Parse failed");
        evaluate(&ast, &mut env).expect("Evaluation failed");
    }

    let snapshot = env.snapshot();
    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot["a"], Value::Number(5.0));
    assert_eq!(snapshot["b"], Value::Number(10.0));
    assert_eq!(snapshot["soma"], Value::Number(15.0));
}

#[test]
fn test_unbound_identifier_is_named() {
    for name in ["x", "total_1", "_hidden"] {
        let err = run(&format!("1 + {}", name)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedVariable(name.to_string()));
        assert_eq!(err.kind.category(), "UndefinedVariableError");
    }
}

#[test]
fn test_division_by_zero_has_no_value() {
    let err = run("5 / 0;").unwrap_err();
    assert_eq!(err.kind, ErrorKind::DivisionByZero);
    assert_eq!(err.kind.category(), "DivisionByZeroError");
}

#[test]
fn test_missing_initializer_location() {
    let tokens = tokenize("var x = ;");
    let after_equals = tokens[3].clone();
    assert_eq!(after_equals.text, ";");

    let err = parse(tokens).unwrap_err();
    assert!(err.kind.is_syntax());
    assert_eq!(err.span, Some(after_equals.span));
}

#[test]
fn test_invalid_character_only_fails_when_parsed() {
    let tokens = tokenize("var a = 1; $");
    assert_eq!(tokens[5].kind, TokenKind::Invalid);

    let err = parse(tokens).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnexpectedCharacter("$".to_string()));
}

#[test]
fn test_unsupported_reserved_words_are_syntax_errors() {
    let err = parse(tokenize("if x")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ExpectedExpression(ref got) if got == "if"));
}

#[test]
fn test_logic_without_short_circuit() {
    let mut env = Environment::new();
    let ast = parse(tokenize("var hits = 0; 1 || (hits = hits + 1); hits")).unwrap();
    assert_eq!(evaluate(&ast, &mut env).unwrap(), Value::Number(1.0));
}

#[test]
fn test_deep_nesting_is_rejected_not_overflowed() {
    let depth = 10_000;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let err = parse(tokenize(&source)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TooComplex(_)));

    let negations = format!("{}1", "!".repeat(depth));
    assert!(matches!(run(&negations).unwrap_err().kind, ErrorKind::TooComplex(_)));
}

#[test]
fn test_long_operator_chain_is_rejected_not_overflowed() {
    let chain = vec!["1"; 20_000].join(" + ");
    let mut interp = Interpreter::new();

    let result = interp.run(&chain);
    assert!(result.ast.is_none());
    assert!(matches!(result.error.unwrap().kind, ErrorKind::TooComplex(_)));
    assert!(interp.history().is_empty());

    let analysis = interp.analyze(&chain);
    assert!(analysis.ast_dump.is_none());
    assert!(matches!(analysis.error.unwrap().kind, ErrorKind::TooComplex(_)));
    assert_eq!(analysis.metrics.numbers, 20_000);

    // chains that fit under the ceiling still run
    let fits = vec!["1"; 400].join(" + ");
    assert_eq!(interp.run(&fits).result, Some(Value::Number(400.0)));
    assert!(interp.analyze(&fits).ast_dump.is_some());
}

#[test]
fn test_string_literal_is_not_an_expression() {
    let err = parse(tokenize("1 + \"abc")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExpectedExpression("\"abc".to_string()));
    assert_eq!(err.span.unwrap().column, 5);

    let err = parse(tokenize("'x' + 1")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExpectedExpression("'x'".to_string()));
    assert_eq!(err.span.unwrap().column, 1);
}
