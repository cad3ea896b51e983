//! Operator Registry
//!
//! Names the operators an expression may invoke. Aggregate and window
//! operators are extracted into the batch operator list and evaluated once
//! per query; scalar functions stay inline in row code and are evaluated
//! directly when they appear in constant parameters.

use indexmap::IndexMap;

use crate::value::Value;

/// Category of an extracted operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    /// Reduces a group to one value
    Aggregate,
    /// Produces one value per row from neighbouring rows
    Window,
}

/// Argument shape of an aggregate or window operator.
///
/// The first `fields` arguments read row data, up to `params` trailing
/// arguments are compile-time constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorDef {
    pub kind: OperatorKind,
    pub fields: usize,
    pub params: usize,
}

/// Evaluates a scalar function over constant arguments.
pub type ScalarFn = fn(&[Value]) -> Value;

/// Scalar function usable both in row code and in constant parameters.
#[derive(Debug, Clone, Copy)]
pub struct FunctionDef {
    pub min_args: usize,
    pub max_args: usize,
    pub eval: ScalarFn,
}

/// What a call name resolves to.
#[derive(Debug, Clone, Copy)]
pub enum Callable<'a> {
    Operator(&'a OperatorDef),
    Function(&'a FunctionDef),
}

/// Registry of aggregate operators, window operators and scalar functions.
#[derive(Debug, Clone)]
pub struct OperatorRegistry {
    operators: IndexMap<String, OperatorDef>,
    functions: IndexMap<String, FunctionDef>,
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl OperatorRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        OperatorRegistry {
            operators: IndexMap::new(),
            functions: IndexMap::new(),
        }
    }

    /// Registry with the built-in aggregate, window and scalar operators.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register_aggregate_operators();
        registry.register_window_operators();
        registry.register_math_functions();
        registry.register_string_functions();
        registry
    }

    pub fn register_aggregate(&mut self, name: &str, fields: usize, params: usize) -> &mut Self {
        self.operators.insert(
            name.to_string(),
            OperatorDef {
                kind: OperatorKind::Aggregate,
                fields,
                params,
            },
        );
        self
    }

    pub fn register_window(&mut self, name: &str, fields: usize, params: usize) -> &mut Self {
        self.operators.insert(
            name.to_string(),
            OperatorDef {
                kind: OperatorKind::Window,
                fields,
                params,
            },
        );
        self
    }

    pub fn register_function(
        &mut self,
        name: &str,
        min_args: usize,
        max_args: usize,
        eval: ScalarFn,
    ) -> &mut Self {
        self.functions.insert(
            name.to_string(),
            FunctionDef {
                min_args,
                max_args,
                eval,
            },
        );
        self
    }

    pub fn lookup(&self, name: &str) -> Option<Callable<'_>> {
        if let Some(def) = self.operators.get(name) {
            return Some(Callable::Operator(def));
        }
        self.functions.get(name).map(Callable::Function)
    }

    pub fn operator(&self, name: &str) -> Option<&OperatorDef> {
        self.operators.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    pub fn is_window(&self, name: &str) -> bool {
        self.operators
            .get(name)
            .is_some_and(|def| def.kind == OperatorKind::Window)
    }

    pub fn is_aggregate(&self, name: &str) -> bool {
        self.operators
            .get(name)
            .is_some_and(|def| def.kind == OperatorKind::Aggregate)
    }

    /// Registered operators in registration order.
    pub fn operators(&self) -> impl Iterator<Item = (&str, &OperatorDef)> {
        self.operators.iter().map(|(name, def)| (name.as_str(), def))
    }

    /// Registered scalar functions in registration order.
    pub fn functions(&self) -> impl Iterator<Item = (&str, &FunctionDef)> {
        self.functions.iter().map(|(name, def)| (name.as_str(), def))
    }

    // Built-in tables

    fn register_aggregate_operators(&mut self) {
        let shapes: &[(&str, usize, usize)] = &[
            ("count", 0, 0),
            ("any", 1, 0),
            ("distinct", 1, 0),
            ("valid", 1, 0),
            ("invalid", 1, 0),
            ("sum", 1, 0),
            ("product", 1, 0),
            ("mean", 1, 0),
            ("average", 1, 0),
            ("mode", 1, 0),
            ("median", 1, 0),
            ("min", 1, 0),
            ("max", 1, 0),
            ("quantile", 1, 1),
            ("variance", 1, 0),
            ("variancep", 1, 0),
            ("stdev", 1, 0),
            ("stdevp", 1, 0),
            ("covariance", 2, 0),
            ("covariancep", 2, 0),
            ("corr", 2, 0),
            ("bins", 1, 3),
            ("array_agg", 1, 0),
            ("array_agg_distinct", 1, 0),
            ("object_agg", 2, 0),
            ("map_agg", 2, 0),
            ("entries_agg", 2, 0),
        ];
        for (name, fields, params) in shapes {
            self.register_aggregate(name, *fields, *params);
        }
    }

    fn register_window_operators(&mut self) {
        let shapes: &[(&str, usize, usize)] = &[
            ("row_number", 0, 0),
            ("rank", 0, 0),
            ("avg_rank", 0, 0),
            ("dense_rank", 0, 0),
            ("percent_rank", 0, 0),
            ("cume_dist", 0, 0),
            ("ntile", 0, 1),
            ("lag", 1, 2),
            ("lead", 1, 2),
            ("first_value", 1, 0),
            ("last_value", 1, 0),
            ("nth_value", 1, 1),
            ("fill_down", 1, 1),
            ("fill_up", 1, 1),
        ];
        for (name, fields, params) in shapes {
            self.register_window(name, *fields, *params);
        }
    }

    fn register_math_functions(&mut self) {
        self.register_function("abs", 1, 1, |a| unary_math(a, f64::abs))
            .register_function("sqrt", 1, 1, |a| unary_math(a, f64::sqrt))
            .register_function("cbrt", 1, 1, |a| unary_math(a, f64::cbrt))
            .register_function("ceil", 1, 1, |a| unary_math(a, f64::ceil))
            .register_function("floor", 1, 1, |a| unary_math(a, f64::floor))
            .register_function("round", 1, 1, |a| unary_math(a, round_half_up))
            .register_function("trunc", 1, 1, |a| unary_math(a, f64::trunc))
            .register_function("sign", 1, 1, |a| unary_math(a, sign))
            .register_function("exp", 1, 1, |a| unary_math(a, f64::exp))
            .register_function("expm1", 1, 1, |a| unary_math(a, f64::exp_m1))
            .register_function("log", 1, 1, |a| unary_math(a, f64::ln))
            .register_function("log10", 1, 1, |a| unary_math(a, f64::log10))
            .register_function("log1p", 1, 1, |a| unary_math(a, f64::ln_1p))
            .register_function("log2", 1, 1, |a| unary_math(a, f64::log2))
            .register_function("sin", 1, 1, |a| unary_math(a, f64::sin))
            .register_function("cos", 1, 1, |a| unary_math(a, f64::cos))
            .register_function("tan", 1, 1, |a| unary_math(a, f64::tan))
            .register_function("asin", 1, 1, |a| unary_math(a, f64::asin))
            .register_function("acos", 1, 1, |a| unary_math(a, f64::acos))
            .register_function("atan", 1, 1, |a| unary_math(a, f64::atan))
            .register_function("pow", 2, 2, |a| binary_math(a, f64::powf))
            .register_function("atan2", 2, 2, |a| binary_math(a, f64::atan2))
            .register_function("hypot", 0, usize::MAX, |a| {
                Value::Number(a.iter().map(|v| v.to_number().powi(2)).sum::<f64>().sqrt())
            })
            .register_function("greatest", 0, usize::MAX, |a| {
                fold_numbers(a, f64::NEG_INFINITY, f64::max)
            })
            .register_function("least", 0, usize::MAX, |a| {
                fold_numbers(a, f64::INFINITY, f64::min)
            })
            .register_function("is_nan", 1, 1, |a| Value::Boolean(arg(a, 0).to_number().is_nan()))
            .register_function("is_finite", 1, 1, |a| {
                Value::Boolean(arg(a, 0).to_number().is_finite())
            });
    }

    fn register_string_functions(&mut self) {
        self.register_function("lower", 1, 1, |a| {
            Value::String(arg(a, 0).to_display_string().to_lowercase())
        })
        .register_function("upper", 1, 1, |a| {
            Value::String(arg(a, 0).to_display_string().to_uppercase())
        })
        .register_function("trim", 1, 1, |a| {
            Value::String(arg(a, 0).to_display_string().trim().to_string())
        })
        .register_function("length", 1, 1, |a| match arg(a, 0) {
            Value::Array(items) => Value::Number(items.len() as f64),
            Value::String(s) => Value::Number(s.encode_utf16().count() as f64),
            _ => Value::Undefined,
        })
        .register_function("parse_float", 1, 1, |a| {
            Value::Number(parse_float_prefix(&arg(a, 0).to_display_string()))
        })
        .register_function("parse_int", 1, 2, |a| {
            let radix = match a.get(1) {
                Some(v) => v.to_number() as u32,
                None => 10,
            };
            Value::Number(parse_int_prefix(&arg(a, 0).to_display_string(), radix))
        });
    }
}

fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&Value::Undefined)
}

fn unary_math(args: &[Value], f: fn(f64) -> f64) -> Value {
    Value::Number(f(arg(args, 0).to_number()))
}

fn binary_math(args: &[Value], f: fn(f64, f64) -> f64) -> Value {
    Value::Number(f(arg(args, 0).to_number(), arg(args, 1).to_number()))
}

fn fold_numbers(args: &[Value], init: f64, f: fn(f64, f64) -> f64) -> Value {
    let mut acc = init;
    for value in args {
        let n = value.to_number();
        if n.is_nan() {
            return Value::Number(f64::NAN);
        }
        acc = f(acc, n);
    }
    Value::Number(acc)
}

/// Rounds halves towards positive infinity.
fn round_half_up(n: f64) -> f64 {
    (n + 0.5).floor()
}

fn sign(n: f64) -> f64 {
    if n.is_nan() || n == 0.0 { n } else { n.signum() }
}

fn parse_float_prefix(s: &str) -> f64 {
    let trimmed = s.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_exp = false;
    let bytes = trimmed.as_bytes();
    while end < bytes.len() {
        let c = bytes[end] as char;
        let ok = match c {
            '0'..='9' => true,
            '+' | '-' => end == 0 || matches!(bytes[end - 1] as char, 'e' | 'E'),
            '.' if !seen_dot && !seen_exp => {
                seen_dot = true;
                true
            }
            'e' | 'E' if !seen_exp && end > 0 => {
                seen_exp = true;
                true
            }
            _ => false,
        };
        if !ok {
            break;
        }
        end += 1;
    }
    let mut candidate = &trimmed[..end];
    while !candidate.is_empty() {
        if let Ok(n) = candidate.parse::<f64>() {
            return n;
        }
        candidate = &candidate[..candidate.len() - 1];
    }
    if trimmed.starts_with("Infinity") || trimmed.starts_with("+Infinity") {
        f64::INFINITY
    } else if trimmed.starts_with("-Infinity") {
        f64::NEG_INFINITY
    } else {
        f64::NAN
    }
}

fn parse_int_prefix(s: &str, radix: u32) -> f64 {
    let trimmed = s.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let (radix, rest) = match (radix, rest.get(..2)) {
        (16 | 0, Some("0x" | "0X")) => (16, &rest[2..]),
        (0, _) => (10, rest),
        (r, _) => (r, rest),
    };
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    let digits: String = rest.chars().take_while(|c| c.is_digit(radix)).collect();
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut value = 0f64;
    for c in digits.chars() {
        value = value * radix as f64 + c.to_digit(radix).unwrap_or(0) as f64;
    }
    if negative { -value } else { value }
}

#[test]
fn test_lookup_categories() {
    let registry = OperatorRegistry::standard();
    assert!(registry.is_aggregate("mean"));
    assert!(registry.is_window("lag"));
    assert!(matches!(registry.lookup("abs"), Some(Callable::Function(_))));
    assert!(registry.lookup("no_such_op").is_none());
}

#[test]
fn test_parse_prefixes() {
    assert_eq!(parse_float_prefix("3.5abc"), 3.5);
    assert_eq!(parse_int_prefix("0x1f", 16), 31.0);
    assert_eq!(parse_int_prefix("42px", 10), 42.0);
    assert!(parse_int_prefix("px", 10).is_nan());
}
