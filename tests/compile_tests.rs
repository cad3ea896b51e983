// tests/compile_tests.rs

use colexpr::error::CompileError;
use colexpr::exprs::{ExprDef, ExprSet, rolling};
use colexpr::registry::OperatorRegistry;
use colexpr::{CompileOptions, Compiler, OperatorCall, Value, Window, compile};

/// Host that returns the generated body unchanged.
fn body_only(_params: &[&str], body: &str) -> Result<String, CompileError> {
    Ok(body.to_string())
}

fn compile_one(source: &str) -> String {
    let exprs = ExprSet::new().with("f", source);
    compile(&exprs).unwrap().values["f"].clone()
}

fn compile_error(exprs: &ExprSet) -> CompileError {
    match compile(exprs) {
        Err(e) => e,
        Ok(compiled) => panic!("Expected compile error, got {:?}", compiled),
    }
}

fn op(name: &str, fields: &[&str], params: Vec<Value>, id: usize) -> OperatorCall {
    OperatorCall {
        name: name.to_string(),
        fields: fields.iter().map(|f| f.to_string()).collect(),
        params,
        id,
        window: None,
    }
}

fn check_batch(exprs: ExprSet) {
    let compiled = Compiler::new().with_host(body_only).compile(&exprs).unwrap();

    let mut windowed = op("mean", &["data.value.get(row)"], vec![], 4);
    windowed.window = Some(Window {
        frame: [-3.0, 3.0],
        peers: true,
    });
    assert_eq!(
        compiled.ops,
        vec![
            op("mean", &["data.a.get(row)"], vec![], 0),
            op("corr", &["data.a.get(row)", "data.b.get(row)"], vec![], 1),
            op("quantile", &["(-data.bar.get(row))"], vec![Value::Number(0.25)], 2),
            op("lag", &["data.value.get(row)"], vec![Value::Number(2.0)], 3),
            windowed,
        ]
    );

    let values: Vec<(&str, &str)> = compiled
        .values
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(
        values,
        vec![
            ("constant", "(1+1)"),
            ("column", "(data.a.get(row)*data.b.get(row))"),
            ("agg1", "op[0]"),
            ("agg2", "op[1]"),
            ("agg3", "(1+op[2])"),
            ("win1", "(data.value.get(row)-op[3])"),
            ("win2", "op[4]"),
        ]
    );
}

// ============================================================================
// Operator spellings
// ============================================================================

#[test]
fn test_global_operator_names() {
    check_batch(
        ExprSet::new()
            .with("constant", "() => 1 + 1")
            .with("column", "d => d.a * d.b")
            .with("agg1", "d => mean(d.a)")
            .with("agg2", "d => corr(d.a, d.b)")
            .with("agg3", "d => 1 + quantile(-d.bar, 0.5/2)")
            .with("win1", "d => d.value - lag(d.value, 2)")
            .with("win2", rolling("d => mean(d.value)", [-3.0, 3.0])),
    );
}

#[test]
fn test_operator_namespace() {
    check_batch(
        ExprSet::new()
            .with("constant", "() => 1 + 1")
            .with("column", "d => d.a * d.b")
            .with("agg1", "d => op.mean(d.a)")
            .with("agg2", "d => op.corr(d.a, d.b)")
            .with("agg3", "d => 1 + op.quantile(-d.bar, 0.5/2)")
            .with("win1", "d => d.value - op.lag(d.value, 2)")
            .with("win2", rolling("d => op.mean(d.value)", [-3.0, 3.0])),
    );
}

#[test]
fn test_nested_operator_namespace() {
    check_batch(
        ExprSet::new()
            .with("constant", "() => 1 + 1")
            .with("column", "d => d.a * d.b")
            .with("agg1", "d => dl.op.mean(d.a)")
            .with("agg2", "d => dl.op['corr'](d.a, d.b)")
            .with("agg3", "d => 1 + dl.op.quantile(-d.bar, 0.5/2)")
            .with("win1", "d => d.value - dl.op.lag(d.value, 2)")
            .with("win2", rolling("d => dl.op.mean(d.value)", [-3.0, 3.0])),
    );
}

#[test]
fn test_custom_namespace() {
    let compiler = Compiler::new().with_options(CompileOptions {
        namespace: "fn".to_string(),
    });
    let compiled = compiler
        .compile(&ExprSet::new().with("m", "d => fn.max(d.a)"))
        .unwrap();
    assert_eq!(compiled.ops[0].name, "max");
    assert_eq!(compiled.values["m"], "(row,data,op)=>op[0]");
}

// ============================================================================
// Generated code
// ============================================================================

#[test]
fn test_constants() {
    let test_cases = vec![
        ("undefined", "void(0)"),
        ("Infinity", "Number.POSITIVE_INFINITY"),
        ("NaN", "Number.NaN"),
        ("E", "Math.E"),
        ("LN2", "Math.LN2"),
        ("LN10", "Math.LN10"),
        ("LOG2E", "Math.LOG2E"),
        ("LOG10E", "Math.LOG10E"),
        ("PI", "Math.PI"),
        ("SQRT1_2", "Math.SQRT1_2"),
        ("SQRT2", "Math.SQRT2"),
    ];
    for (input, expected) in test_cases {
        assert_eq!(
            compile_one(&format!("d => {}", input)),
            format!("(row,data,op)=>{}", expected),
            "Failed for constant: {}",
            input
        );
    }
}

#[test]
fn test_literals() {
    let test_cases = vec![
        ("1", "1"),
        ("1e-5", "1e-5"),
        ("0x1F", "0x1F"),
        ("true", "true"),
        ("false", "false"),
        ("null", "null"),
        ("\"foo\"", "\"foo\""),
        ("'it\\'s'", "'it\\'s'"),
        ("[1,2,3]", "[1,2,3]"),
        ("({a:1})", "({a:1})"),
        ("({\"b\":2})", "({\"b\":2})"),
        ("({[d.k]: 1})", "({[data.k.get(row)]:1})"),
    ];
    for (input, expected) in test_cases {
        assert_eq!(
            compile_one(&format!("d => {}", input)),
            format!("(row,data,op)=>{}", expected),
            "Failed for literal: {}",
            input
        );
    }
}

#[test]
fn test_column_access() {
    assert_eq!(compile_one("d => d.x.y"), "(row,data,op)=>data.x.get(row).y");
    assert_eq!(compile_one("d => d['x']"), "(row,data,op)=>data.x.get(row)");
    assert_eq!(
        compile_one("d => d['first name']"),
        "(row,data,op)=>data[\"first name\"].get(row)"
    );
    assert_eq!(
        compile_one("d => d['say \"hi\"']"),
        "(row,data,op)=>data[\"say \\\"hi\\\"\"].get(row)"
    );
    assert_eq!(compile_one("d => d[0]"), "(row,data,op)=>data[\"0\"].get(row)");
    assert_eq!(
        compile_one("row => row.a[1]"),
        "(row,data,op)=>data.a.get(row)[1]"
    );
}

#[test]
fn test_member_of_number_literal() {
    assert_eq!(compile_one("d => (1).x"), "(row,data,op)=>(1).x");
    assert_eq!(compile_one("d => 2.5['y']"), "(row,data,op)=>(2.5)['y']");
    assert_eq!(compile_one("d => undefined.x"), "(row,data,op)=>(void(0)).x");
    assert_eq!(compile_one("d => 'ab'.length"), "(row,data,op)=>'ab'.length");
}

#[test]
fn test_operators_and_precedence() {
    assert_eq!(
        compile_one("d => (-d.a) ** 2 === undefined"),
        "(row,data,op)=>(((-data.a.get(row))**2)===void(0))"
    );
    assert_eq!(
        compile_one("d => 1 - (2 - 3) + -(-d.a)"),
        "(row,data,op)=>((1-(2-3))+(-(-data.a.get(row))))"
    );
}

#[test]
fn test_expression_shapes() {
    let test_cases = vec![
        ("d => (d.a + 1) * 2", "((data.a.get(row)+1)*2)"),
        ("d => d.a || d.b && 1", "(data.a.get(row)||(data.b.get(row)&&1))"),
        ("d => d.a ?? 0", "(data.a.get(row)??0)"),
        ("d => d.a > 0 ? 'pos' : 'neg'", "((data.a.get(row)>0)?'pos':'neg')"),
        ("d => !d.a", "(!data.a.get(row))"),
        ("d => typeof d.a", "(typeof data.a.get(row))"),
        ("d => 'k' in d.obj", "('k' in data.obj.get(row))"),
        ("d => d.f(1, 2)", "data.f.get(row)(1,2)"),
        ("d => abs(d.a)", "fun.abs(data.a.get(row))"),
        ("d => op.round(d.a * 10) / 10", "(fun.round((data.a.get(row)*10))/10)"),
    ];
    for (input, expected) in test_cases {
        assert_eq!(
            compile_one(input),
            format!("(row,data,op)=>{}", expected),
            "Failed for: {}",
            input
        );
    }
}

#[test]
fn test_template_literal() {
    assert_eq!(
        compile_one("d => `${d.x} + ${d.y}`"),
        "(row,data,op)=>`${data.x.get(row)} + ${data.y.get(row)}`"
    );
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_block_statements() {
    let exprs = ExprSet::new().with("val", "d => { const s = op.sum(d.a); return s * s; }");

    let compiled = Compiler::new().with_host(body_only).compile(&exprs).unwrap();
    assert_eq!(compiled.ops, vec![op("sum", &["data.a.get(row)"], vec![], 0)]);
    assert_eq!(compiled.values["val"], "{const s=op[0];return (s*s);}");

    let compiled = compile(&exprs).unwrap();
    assert_eq!(
        compiled.values["val"],
        "(row,data,op)=>{const s=op[0];return (s*s);}"
    );
}

#[test]
fn test_if_statements() {
    let exprs = ExprSet::new()
        .with(
            "val1",
            "() => { const d = 3 - 2; if (d < 1) { return 1; } else { return 0; } }",
        )
        .with("val2", "() => { const d = 3 - 2; if (d < 1) { return 1; } return 0; }");

    let compiled = Compiler::new().with_host(body_only).compile(&exprs).unwrap();
    assert_eq!(
        compiled.values["val1"],
        "{const d=(3-2);if ((d<1)){return 1;} else {return 0;};}"
    );
    assert_eq!(
        compiled.values["val2"],
        "{const d=(3-2);if ((d<1)){return 1;};return 0;}"
    );
}

#[test]
fn test_if_without_braces() {
    let test_cases = vec![
        (
            "d => { if (d.a) return 1; else return 0; }",
            "{if (data.a.get(row))return 1; else return 0;}",
        ),
        (
            "d => { if (d.a); else return 0 }",
            "{if (data.a.get(row)); else return 0;}",
        ),
        (
            "d => { if (d.a) return 1; else if (d.b) return 2; else { return 3 } }",
            "{if (data.a.get(row))return 1; else if (data.b.get(row))return 2; else {return 3;};}",
        ),
        ("d => { if (d.a) return 1; return 0 }", "{if (data.a.get(row))return 1;return 0;}"),
    ];
    for (input, expected) in test_cases {
        let exprs = ExprSet::new().with("val", input);
        let compiled = Compiler::new().with_host(body_only).compile(&exprs).unwrap();
        assert_eq!(compiled.values["val"], expected, "Failed for: {}", input);
    }
}

#[test]
fn test_switch_statement() {
    let exprs = ExprSet::new().with(
        "val",
        "() => { const v = 'foo'; switch (v) { case 'foo': return 1; case 'bar': return 2; default: return 3; } }",
    );
    let compiled = Compiler::new().with_host(body_only).compile(&exprs).unwrap();
    assert_eq!(
        compiled.values["val"],
        "{const v='foo';switch (v) {case 'foo': return 1;case 'bar': return 2;default: return 3;};}"
    );
}

#[test]
fn test_local_updates() {
    assert_eq!(
        compile_one("d => { let x = d.a; x += 1; x++; return x }"),
        "(row,data,op)=>{let x=data.a.get(row);(x+=1);(x++);return x;}"
    );
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn test_parameter_folding() {
    let exprs = ExprSet::new().with("op", "d => op.quantile(d.a, op.abs(op.sqrt(0.25)))");
    let compiled = compile(&exprs).unwrap();
    assert_eq!(compiled.ops[0].params, vec![Value::Number(0.5)]);

    let exprs = ExprSet::new()
        .with("a", "d => bins(d.a, 0, 10 * 10, `step${2}`)")
        .with("b", "d => nth_value(d.a, [1, 2].length + PI * 0)")
        .with("c", "d => lag(d.a, 1, {fill: 'x'}.fill)");
    let compiled = compile(&exprs).unwrap();
    assert_eq!(
        compiled.ops[0].params,
        vec![
            Value::Number(0.0),
            Value::Number(100.0),
            Value::String("step2".to_string()),
        ]
    );
    assert_eq!(compiled.ops[1].params, vec![Value::Number(2.0)]);
    assert_eq!(
        compiled.ops[2].params,
        vec![Value::Number(1.0), Value::String("x".to_string())]
    );
}

#[test]
fn test_invalid_parameters() {
    let sources = [
        "d => op.quantile(d.a, d.b)",
        "d => op.sum(op.mean(d.a))",
        "d => op.sum(op.lag(d.a))",
        "d => op.lag(op.sum(d.a))",
        "d => { const value = 0.5; return op.quantile(d.a, value) }",
        "d => { const value = 0.5; return op.quantile(d.a + value, 0.5) }",
        "d => op.quantile(d.a, op.lag(d.a, 1))",
        "d => op.quantile(d.a, op.count())",
        "d => op.mean(1)",
        "d => op.mean()",
        "d => op.mean(d.a, 2)",
        "d => op.abs(d.a, 2)",
        "d => op.quantile(d.a, 1 || d.b)",
        "d => op.quantile(d.a, true ? 0.5 : op.lag(d.b, 1))",
        "d => op.quantile(d.a, false && op.sum(d.b))",
    ];
    for source in sources {
        let exprs = ExprSet::new().with("op", source);
        match compile_error(&exprs).root() {
            CompileError::Parameter(_) => {}
            other => panic!("Expected parameter error for {}, got {:?}", source, other),
        }
    }
}

#[test]
fn test_unknown_operator() {
    let exprs = ExprSet::new().with("x", "d => op.bogus(d.a)");
    assert_eq!(
        compile_error(&exprs).root(),
        &CompileError::OperatorUnknown("bogus".to_string())
    );

    let exprs = ExprSet::new().with("x", "d => op.quantile(d.a, nope(1))");
    assert_eq!(
        compile_error(&exprs).root(),
        &CompileError::OperatorUnknown("nope".to_string())
    );
}

// ============================================================================
// Windows and ids
// ============================================================================

#[test]
fn test_window_defaults() {
    let exprs = ExprSet::new()
        .with("w", colexpr::exprs::window("d => op.row_number() + op.sum(d.a)"))
        .with(
            "x",
            ExprDef::Window {
                function: "d => op.lead(d.a)".to_string(),
                frame: [-1.0, 1.0],
                peers: false,
            },
        );
    let compiled = compile(&exprs).unwrap();
    let default = Some(Window {
        frame: [f64::NEG_INFINITY, 0.0],
        peers: true,
    });
    assert_eq!(compiled.ops[0].window, default);
    assert_eq!(compiled.ops[1].window, default);
    assert_eq!(
        compiled.ops[2].window,
        Some(Window {
            frame: [-1.0, 1.0],
            peers: false,
        })
    );
}

#[test]
fn test_invalid_frame() {
    let exprs = ExprSet::new().with("w", rolling("d => op.mean(d.a)", [1.0, 2.0]));
    assert!(matches!(
        compile_error(&exprs).root(),
        CompileError::Validation(_)
    ));
}

#[test]
fn test_ids_are_sequential_without_dedup() {
    let exprs = ExprSet::new()
        .with("a", "d => op.sum(d.x) + op.sum(d.x)")
        .with("b", "d => { const m = op.mean(d.y); return m > op.max(d.y) ? m : 0 }");
    let compiled = compile(&exprs).unwrap();
    let ids: Vec<usize> = compiled.ops.iter().map(|o| o.id).collect();
    let names: Vec<&str> = compiled.ops.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
    assert_eq!(names, vec!["sum", "sum", "mean", "max"]);
    assert_eq!(compiled.values["a"], "(row,data,op)=>(op[0]+op[1])");

    // a fresh batch starts again at zero
    let again = compile(&exprs).unwrap();
    assert_eq!(again.ops[0].id, 0);
}

// ============================================================================
// Errors and hosts
// ============================================================================

#[test]
fn test_errors_name_the_expression() {
    let exprs = ExprSet::new()
        .with("good", "d => d.a")
        .with("bad", "d => foo");
    let error = compile_error(&exprs);
    assert_eq!(error.expression(), Some("bad"));
    assert!(matches!(error.root(), CompileError::Reference(_)));
    assert!(error.to_string().contains("bad"));
}

#[test]
fn test_loops_abort_the_batch() {
    let sources = [
        "() => { let v = 0; for (let i = 0; i < 5; ++i) { v += i; } return v; }",
        "() => { let v = 0; let i = 0; while (i < 5) { v += i++; } return v; }",
        "() => { let v = 0; let i = 0; do { v += i; } while (++i < 5); return v; }",
    ];
    for source in sources {
        let exprs = ExprSet::new().with("ok", "d => d.a").with("val", source);
        assert!(matches!(
            compile_error(&exprs).root(),
            CompileError::Validation(_)
        ));
    }
}

#[test]
fn test_dirty_tricks() {
    let sources = [
        "() => globalThis",
        "() => global",
        "() => window",
        "() => self",
        "() => this",
        "() => Object",
        "() => Date",
        "() => Array",
        "() => Number",
        "() => Math",
        "() => String",
        "() => RegExp",
        "() => { const foo = [].constructor; return new foo(3); }",
        "() => [].constructor()",
        "() => [].__proto__.unsafe = 1",
        "() => 'abc'.toUpperCase()",
        "() => { const s = 'abc'; return s.toUpperCase(); }",
        "() => ('abc')['toUpperCase']()",
        "d => op.mean(var foo = d.x)",
    ];
    for source in sources {
        let exprs = ExprSet::new().with("f", source);
        assert!(compile(&exprs).is_err(), "Expected {} to be rejected", source);
    }
}

#[test]
fn test_check_only() {
    let compiler = Compiler::new();
    assert!(compiler.check(&ExprSet::new().with("a", "d => op.mean(d.a)")).is_ok());
    // unknown operators are only found during extraction
    assert!(compiler.check(&ExprSet::new().with("a", "d => op.bogus(d.a)")).is_ok());
    assert!(compiler.check(&ExprSet::new().with("a", "d => foo")).is_err());
}

#[test]
fn test_host_errors_are_attributed() {
    let reject = |_params: &[&str], body: &str| -> Result<usize, CompileError> {
        if body.contains("op[") {
            Err(CompileError::Host("operators unsupported".to_string()))
        } else {
            Ok(body.len())
        }
    };
    let compiler = Compiler::new().with_host(reject);

    let compiled = compiler.compile(&ExprSet::new().with("a", "d => d.a")).unwrap();
    assert_eq!(compiled.values["a"], "data.a.get(row)".len());

    let error = compiler
        .compile(&ExprSet::new().with("a", "d => d.a").with("b", "d => op.sum(d.a)"))
        .unwrap_err();
    assert_eq!(error.expression(), Some("b"));
    assert!(matches!(error.root(), CompileError::Host(_)));
}

#[test]
fn test_custom_registry() {
    let mut registry = OperatorRegistry::standard();
    registry
        .register_aggregate("geomean", 1, 0)
        .register_function("double", 1, 1, |args| {
            Value::Number(args[0].to_number() * 2.0)
        });
    let compiler = Compiler::new().with_registry(registry);
    let compiled = compiler
        .compile(&ExprSet::new().with("g", "d => op.quantile(d.a, double(0.25)) + geomean(d.b)"))
        .unwrap();
    assert_eq!(compiled.ops[0].params, vec![Value::Number(0.5)]);
    assert_eq!(compiled.ops[1].name, "geomean");
}
