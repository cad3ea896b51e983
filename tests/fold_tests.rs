// tests/fold_tests.rs

use colexpr::ast::Body;
use colexpr::error::CompileError;
use colexpr::fold::Folder;
use colexpr::parser::parse_function;
use colexpr::registry::OperatorRegistry;
use colexpr::rewrite::rewrite;
use colexpr::value::Value;

fn fold(source: &str) -> Result<Value, CompileError> {
    let function = rewrite(parse_function(&format!("d => {}", source)).unwrap(), "op");
    let registry = OperatorRegistry::standard();
    match function.body {
        Body::Expr(expr) => Folder::new(&registry).fold(&expr),
        Body::Block(_) => panic!("Expected an expression body"),
    }
}

fn number(source: &str) -> f64 {
    match fold(source) {
        Ok(Value::Number(n)) => n,
        other => panic!("Expected a number for {}, got {:?}", source, other),
    }
}

fn string(source: &str) -> String {
    match fold(source) {
        Ok(Value::String(s)) => s,
        other => panic!("Expected a string for {}, got {:?}", source, other),
    }
}

fn boolean(source: &str) -> bool {
    match fold(source) {
        Ok(Value::Boolean(b)) => b,
        other => panic!("Expected a boolean for {}, got {:?}", source, other),
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_arithmetic() {
    let test_cases = vec![
        ("1 + 2 * 3", 7.0),
        ("0.5 / 2", 0.25),
        ("7 % 3", 1.0),
        ("-7 % 3", -1.0),
        ("2 ** 10", 1024.0),
        ("2 ** 3 ** 2", 512.0),
        ("-(3 - 5)", 2.0),
        ("+'4' + 1", 5.0),
        ("'6' * '7'", 42.0),
        ("true + true", 2.0),
        ("null + 1", 1.0),
        ("0x10 + 0b11", 19.0),
    ];
    for (source, expected) in test_cases {
        assert_eq!(number(source), expected, "Failed for: {}", source);
    }
}

#[test]
fn test_ieee_semantics() {
    assert_eq!(number("1 / 0"), f64::INFINITY);
    assert_eq!(number("-1 / 0"), f64::NEG_INFINITY);
    assert!(number("0 / 0").is_nan());
    assert!(number("undefined + 1").is_nan());
    assert!(number("'abc' * 2").is_nan());
    assert_eq!(number("NaN ** 0"), 1.0);
    assert!(number("1 ** Infinity").is_nan());
    assert_eq!(number("Infinity - 1"), f64::INFINITY);
}

#[test]
fn test_bitwise() {
    let test_cases = vec![
        ("5 & 3", 1.0),
        ("5 | 3", 7.0),
        ("5 ^ 3", 6.0),
        ("~5", -6.0),
        ("1 << 4", 16.0),
        ("-16 >> 2", -4.0),
        ("-1 >>> 28", 15.0),
        ("1 << 33", 2.0),
        ("4294967297 | 0", 1.0),
    ];
    for (source, expected) in test_cases {
        assert_eq!(number(source), expected, "Failed for: {}", source);
    }
}

#[test]
fn test_constants() {
    assert_eq!(number("PI"), std::f64::consts::PI);
    assert_eq!(number("E * 1"), std::f64::consts::E);
    assert_eq!(number("SQRT2"), std::f64::consts::SQRT_2);
    assert_eq!(fold("undefined"), Ok(Value::Undefined));
}

// ============================================================================
// Strings, comparisons and logic
// ============================================================================

#[test]
fn test_string_concatenation() {
    assert_eq!(string("'a' + 1"), "a1");
    assert_eq!(string("1 + 2 + 'x'"), "3x");
    assert_eq!(string("'x' + 1 + 2"), "x12");
    assert_eq!(string("[1, 2] + ''"), "1,2");
    assert_eq!(string("0.1 * 3 + ''"), "0.30000000000000004");
    assert_eq!(string("`${1 + 1}-${'b'}`"), "2-b");
    assert_eq!(string("typeof null"), "object");
    assert_eq!(string("typeof 'a'"), "string");
    assert_eq!(string("typeof undefined"), "undefined");
}

#[test]
fn test_comparisons() {
    assert!(boolean("1 < 2"));
    assert!(boolean("'b' > 'a'"));
    assert!(boolean("'10' < '9'"));
    assert!(boolean("'10' > 9"));
    assert!(!boolean("NaN < 1"));
    assert!(!boolean("NaN >= NaN"));
    assert!(boolean("1 == '1'"));
    assert!(!boolean("1 === '1'"));
    assert!(boolean("null == undefined"));
    assert!(!boolean("null === undefined"));
    assert!(!boolean("null == 0"));
    assert!(!boolean("NaN == NaN"));
    assert!(boolean("[1] == 1"));
    assert!(!boolean("[1] === [1]"));
}

#[test]
fn test_logical_and_conditional() {
    assert_eq!(number("0 || 5"), 5.0);
    assert_eq!(number("3 && 4"), 4.0);
    assert_eq!(number("0 ?? 7"), 0.0);
    assert_eq!(number("null ?? 7"), 7.0);
    assert_eq!(string("'' ? 'yes' : 'no'"), "no");
    assert!(boolean("!''"));
}

#[test]
fn test_untaken_branches_must_be_constant() {
    for source in [
        "1 || d.a",
        "0 && d.a",
        "1 ?? op.mean(d.a)",
        "true ? 0.5 : op.lag(d.b, 1)",
        "false ? d.a : 2",
    ] {
        assert!(
            matches!(fold(source), Err(CompileError::Parameter(_))),
            "Expected parameter error for {}",
            source
        );
    }
    assert_eq!(
        fold("1 || nope(2)"),
        Err(CompileError::OperatorUnknown("nope".to_string()))
    );
    assert_eq!(number("1 || abs(-2)"), 1.0);
}

#[test]
fn test_literals_and_members() {
    assert_eq!(
        fold("[1, 'a', null]"),
        Ok(Value::Array(vec![
            Value::Number(1.0),
            Value::String("a".to_string()),
            Value::Null,
        ]))
    );
    assert_eq!(number("[10, 20, 30][1]"), 20.0);
    assert_eq!(number("[10, 20].length"), 2.0);
    assert_eq!(number("'hello'.length"), 5.0);
    assert_eq!(string("'hello'[1]"), "e");
    assert_eq!(number("({a: {b: 3}}).a.b"), 3.0);
    assert_eq!(number("({['k' + 1]: 4}).k1"), 4.0);
    assert_eq!(fold("({a: 1}).missing"), Ok(Value::Undefined));

    match fold("({b: 2, a: 1})") {
        Ok(Value::Object(map)) => {
            let keys: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
            assert_eq!(keys, vec!["b", "a"]);
        }
        other => panic!("Expected object, got {:?}", other),
    }
}

// ============================================================================
// Scalar functions
// ============================================================================

#[test]
fn test_scalar_functions() {
    assert_eq!(number("abs(sqrt(0.25))"), 0.5);
    assert_eq!(number("op.abs(op.sqrt(0.25))"), 0.5);
    assert_eq!(number("round(2.5)"), 3.0);
    assert_eq!(number("round(-2.5)"), -2.0);
    assert_eq!(number("pow(2, 8)"), 256.0);
    assert_eq!(number("greatest(1, 9, 3)"), 9.0);
    assert_eq!(number("least()"), f64::INFINITY);
    assert_eq!(number("hypot(3, 4)"), 5.0);
    assert_eq!(number("parse_int('0x1f', 16)"), 31.0);
    assert_eq!(number("parse_float('2.5e1kg')"), 25.0);
    assert_eq!(number("length('abc')"), 3.0);
    assert_eq!(string("upper('abc')"), "ABC");
    assert_eq!(string("trim('  x ')"), "x");
    assert!(boolean("is_nan(NaN)"));
}

// ============================================================================
// Non-constant input
// ============================================================================

#[test]
fn test_non_constant_parameters() {
    let sources = [
        "d.a",
        "1 + d.a",
        "op.mean(1)",
        "op.lag(1)",
        "d.f(1)",
        "'k' in ({k: 1})",
        "abs(1, 2)",
    ];
    for source in sources {
        assert!(
            matches!(fold(source), Err(CompileError::Parameter(_))),
            "Expected parameter error for {}",
            source
        );
    }
}

#[test]
fn test_unknown_function() {
    assert_eq!(
        fold("frobnicate(1)"),
        Err(CompileError::OperatorUnknown("frobnicate".to_string()))
    );
}
