use std::collections::HashMap;

use commentpp::{
    error::{EvaluationError, ExpressionError, ParseError},
    expression::{evaluator::evaluate, parser::parse_expression, value::Value},
};

fn assert_value(src: &str, expected: Value) {
    match evaluate(src) {
        Ok(value) => assert_eq!(value, expected, "Expression: {src}"),
        Err(e) => panic!("Expression {src} failed: {e}"),
    }
}

fn assert_failure(src: &str) {
    if let Ok(value) = evaluate(src) {
        panic!("Expression {src} evaluated to {value:?} but was expected to fail")
    }
}

#[test]
fn arithmetic_and_precedence() {
    assert_value("2 + 3 * 4", Value::Int(14));
    assert_value("(2 + 3) * 4", Value::Int(20));
    assert_value("10 - 4 - 3", Value::Int(3));
    assert_value("7 / 2", Value::Int(3));
    assert_value("7 % 4", Value::Int(3));
    assert_value("7.0 / 2", Value::Float(3.5));
    assert_value("-2 * 3", Value::Int(-6));
    assert_value("0x1F", Value::Int(31));
    assert_value(".5 + 1", Value::Float(1.5));
}

#[test]
fn comparisons_promote_integers() {
    assert_value("3 < 3.5", Value::Bool(true));
    assert_value("2 == 2.0", Value::Bool(true));
    assert_value("1 + 1 == 2", Value::Bool(true));
    assert_value("\"abc\" < \"abd\"", Value::Bool(true));
    assert_value("true != false", Value::Bool(true));
}

#[test]
fn comparison_across_kinds_fails() {
    assert_failure("1 == \"1\"");
    assert_failure("true < false");
}

#[test]
fn logical_and_bitwise() {
    assert_value("true && !false", Value::Bool(true));
    assert_value("false || true", Value::Bool(true));
    assert_value("true ^ true", Value::Bool(false));
    assert_value("(6 && 3) == 2", Value::Bool(true));
    assert_value("(6 || 3) == 7", Value::Bool(true));
}

#[test]
fn string_concatenation() {
    assert_value("\"v\" + 2", Value::Str("v2".into()));
    assert_value("1.5 + \"x\"", Value::Str("1.5x".into()));
    assert_value("\"a\" + true", Value::Str("atrue".into()));
}

#[test]
fn evaluation_is_strict() {
    let result = evaluate("false && 1 / 0 == 0");
    assert!(matches!(result, Err(ExpressionError::Evaluation(EvaluationError::DivisionByZero))),
            "Got {result:?}");
}

#[test]
fn integer_overflow_is_an_error() {
    assert_failure("9223372036854775807 + 1");
    assert_failure("99999999999999999999");
}

#[test]
fn large_integers_promote_to_float() {
    assert_value("20000000 > 1.5", Value::Bool(true));
    assert_value("16777217 == 16777217.0", Value::Bool(true));
    assert_value("16777216 + 0.0", Value::Float(16_777_216.0));
}

#[test]
fn first_failing_operand_wins() {
    assert!(matches!(evaluate("missing + 1 / 0"),
                     Err(ExpressionError::Evaluation(EvaluationError::UnknownVariable { .. }))));
    assert!(matches!(evaluate("1 / 0 + missing"),
                     Err(ExpressionError::Evaluation(EvaluationError::DivisionByZero))));
    assert!(matches!(evaluate("issubstr(missing, 1 / 0)"),
                     Err(ExpressionError::Evaluation(EvaluationError::UnknownVariable { .. }))));
    assert!(matches!(evaluate("issubstr(1 / 0, missing)"),
                     Err(ExpressionError::Evaluation(EvaluationError::DivisionByZero))));
}

#[test]
fn builtin_functions() {
    assert_value("str2int(\"  42  \")", Value::Int(42));
    assert_value("strlen(\"héllo\")", Value::Int(5));
    assert_value("issubstr(\"ELL\", \"hello\")", Value::Bool(true));
    assert_value("abs(-3)", Value::Int(3));
    assert_value("round(2.5)", Value::Int(3));
    assert_value("str2web(\"<a>\")", Value::Str("&lt;a&gt;".into()));
    assert_value("trimlines(\"  a  \\n\\n b\")", Value::Str("a\nb".into()));
}

#[test]
fn function_errors() {
    assert!(matches!(evaluate("str2int(\"abc\")"),
                     Err(ExpressionError::Evaluation(EvaluationError::InvalidNumber { .. }))));
    assert!(matches!(evaluate("strlen(\"a\", \"b\")"),
                     Err(ExpressionError::Evaluation(EvaluationError::WrongArgumentCount { expected: 1,
                                                                                          found: 2,
                                                                                          .. }))));
    assert!(matches!(evaluate("strlen(1)"),
                     Err(ExpressionError::Evaluation(EvaluationError::NoMatchingSignature { .. }))));
    assert!(matches!(evaluate("nosuch(1)"),
                     Err(ExpressionError::Evaluation(EvaluationError::UnknownFunction { .. }))));
}

#[test]
fn variables_are_case_insensitive() {
    let tree = parse_expression("Version * 2 + OFFSET").unwrap_or_else(|e| panic!("{e}"));
    let variables = HashMap::from([("version".to_string(), Value::Int(4)),
                                   ("offset".to_string(), Value::Int(1))]);

    assert_eq!(tree.evaluate(&variables).unwrap(), Value::Int(9));
}

#[test]
fn unknown_variable_is_named() {
    match evaluate("missing + 1") {
        Err(ExpressionError::Evaluation(EvaluationError::UnknownVariable { name })) => {
            assert_eq!(name, "missing");
        },
        other => panic!("Unexpected result {other:?}"),
    }
}

#[test]
fn literals_parse_back_to_equal_values() {
    let values = [Value::Int(-17),
                  Value::Int(i64::MIN),
                  Value::Float(0.25),
                  Value::Float(-3.0),
                  Value::Bool(true),
                  Value::Str("tab\there \"quoted\" \\ back".into())];

    for value in values {
        let literal = value.to_literal();
        match evaluate(&literal) {
            Ok(parsed) => assert_eq!(parsed, value, "Literal: {literal}"),
            Err(e) => panic!("Literal {literal} failed: {e}"),
        }
    }
}

#[test]
fn display_formatting() {
    assert_eq!(Value::Float(3.0).to_string(), "3.0");
    assert_eq!(Value::Float(0.5).to_string(), "0.5");
    assert_eq!(Value::Int(-4).to_string(), "-4");
    assert_eq!(Value::Unresolved.to_string(), "<unresolved>");
}

#[test]
fn syntax_errors() {
    assert!(matches!(evaluate("(1 + 2"), Err(ExpressionError::Parse(_))));
    assert!(matches!(evaluate("1 +"), Err(ExpressionError::Parse(_))));
    assert!(matches!(evaluate("1 + 2)"),
                     Err(ExpressionError::Parse(ParseError::UnbalancedParenthesis { .. }))));
    assert!(matches!(evaluate("1, 2"), Err(ExpressionError::Parse(ParseError::UnexpectedComma { .. }))));
    assert!(matches!(evaluate("\"open"), Err(ExpressionError::Lex(_))));
    assert!(matches!(evaluate("12abc"), Err(ExpressionError::Lex(_))));
}

#[test]
fn parse_errors_carry_columns() {
    let error = parse_expression("1 + * 2").unwrap_err();
    assert_eq!(error.column(), 5);
}
