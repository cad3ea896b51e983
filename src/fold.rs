//! Constant folding for operator parameters.
//!
//! Parameters must reduce to a value at compile time. The folder evaluates
//! a rewritten expression with no row, no locals and no operator results;
//! scalar functions from the registry are applied directly.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::{
    ast::{BinOp, Expr, Literal, LogicalOp, Property, PropertyKey, UnaryOp},
    error::CompileError,
    registry::{Callable, OperatorRegistry},
    value::{Value, format_number},
};

pub struct Folder<'a> {
    registry: &'a OperatorRegistry,
}

fn not_constant(what: &str) -> CompileError {
    CompileError::Parameter(format!("operator parameters must be constant; found {}", what))
}

impl<'a> Folder<'a> {
    pub fn new(registry: &'a OperatorRegistry) -> Self {
        Folder { registry }
    }

    pub fn fold(&self, expr: &Expr) -> Result<Value, CompileError> {
        self.check_constant(expr)?;
        self.eval(expr)
    }

    /// Rejects non-constant input anywhere in `expr`, including branches
    /// that evaluation would short-circuit past.
    fn check_constant(&self, expr: &Expr) -> Result<(), CompileError> {
        let registry = self.registry;
        let mut found = None;
        expr.any(&mut |e| {
            found = match e {
                Expr::Column(name) => Some(not_constant(&format!("column '{}'", name))),
                Expr::Identifier(name) => {
                    Some(not_constant(&format!("local value '{}'", name)))
                }
                Expr::OpRef(_) => Some(not_constant("an operator result")),
                Expr::Call { .. } => Some(not_constant("a row method call")),
                Expr::Assign { .. } | Expr::Update { .. } => Some(not_constant("an assignment")),
                Expr::This | Expr::New { .. } => Some(not_constant("an object reference")),
                Expr::Unary {
                    op: UnaryOp::Delete,
                    ..
                } => Some(not_constant("'delete'")),
                Expr::OpCall { name, .. } | Expr::FnCall { name, .. } => {
                    match registry.lookup(name) {
                        Some(Callable::Function(_)) => None,
                        Some(Callable::Operator(_)) => {
                            Some(not_constant(&format!("operator '{}'", name)))
                        }
                        None => Some(CompileError::OperatorUnknown(name.clone())),
                    }
                }
                _ => None,
            };
            found.is_some()
        });
        found.map_or(Ok(()), Err)
    }

    fn eval(&self, expr: &Expr) -> Result<Value, CompileError> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                Literal::Number { value, .. } => Value::Number(*value),
                Literal::String { value, .. } => Value::String(value.clone()),
                Literal::Boolean(b) => Value::Boolean(*b),
                Literal::Null => Value::Null,
            }),

            Expr::Constant(constant) => Ok(match constant.number() {
                Some(n) => Value::Number(n),
                None => Value::Undefined,
            }),

            Expr::Array(items) => Ok(Value::Array(
                items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<Result<_, _>>()?,
            )),

            Expr::Object(properties) => {
                let mut map = IndexMap::new();
                for property in properties {
                    let key = match &property.key {
                        PropertyKey::Computed(key) => self.eval(key)?.to_display_string(),
                        key => key
                            .static_name()
                            .ok_or_else(|| not_constant("an object key"))?,
                    };
                    map.insert(key, self.eval(&property.value)?);
                }
                Ok(Value::Object(map))
            }

            Expr::Template { quasis, exprs } => {
                let mut out = String::new();
                for (i, quasi) in quasis.iter().enumerate() {
                    out.push_str(quasi);
                    if let Some(expr) = exprs.get(i) {
                        out.push_str(&self.eval(expr)?.to_display_string());
                    }
                }
                Ok(Value::String(out))
            }

            Expr::Member { object, property } => {
                let object = self.eval(object)?;
                let key = match property {
                    Property::Named(name) => Value::String(name.clone()),
                    Property::Computed(key) => self.eval(key)?,
                };
                Ok(member(&object, &key))
            }

            Expr::Unary { op, argument } => {
                let value = self.eval(argument)?;
                Ok(match op {
                    UnaryOp::Negate => Value::Number(-value.to_number()),
                    UnaryOp::Plus => Value::Number(value.to_number()),
                    UnaryOp::Not => Value::Boolean(!value.is_truthy()),
                    UnaryOp::BitNot => Value::Number(!to_int32(value.to_number()) as f64),
                    UnaryOp::Typeof => Value::String(value.type_name().to_string()),
                    UnaryOp::Void => Value::Undefined,
                    UnaryOp::Delete => return Err(not_constant("'delete'")),
                })
            }

            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                apply_binop(*op, &left, &right)
            }

            Expr::Logical { op, left, right } => {
                let left = self.eval(left)?;
                let take_left = match op {
                    LogicalOp::And => !left.is_truthy(),
                    LogicalOp::Or => left.is_truthy(),
                    LogicalOp::NullCoalesce => !left.is_nullish(),
                };
                if take_left { Ok(left) } else { self.eval(right) }
            }

            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.eval(test)?.is_truthy() {
                    self.eval(consequent)
                } else {
                    self.eval(alternate)
                }
            }

            Expr::OpCall { name, args } | Expr::FnCall { name, args } => {
                self.call(name, args)
            }

            Expr::Column(name) => Err(not_constant(&format!("column '{}'", name))),
            Expr::Identifier(name) => Err(not_constant(&format!("local value '{}'", name))),
            Expr::OpRef(_) => Err(not_constant("an operator result")),
            Expr::Call { .. } => Err(not_constant("a row method call")),
            Expr::Assign { .. } | Expr::Update { .. } => Err(not_constant("an assignment")),
            Expr::This | Expr::New { .. } => Err(not_constant("an object reference")),
        }
    }

    fn call(&self, name: &str, args: &[Expr]) -> Result<Value, CompileError> {
        match self.registry.lookup(name) {
            Some(Callable::Function(def)) => {
                if args.len() < def.min_args || args.len() > def.max_args {
                    return Err(CompileError::Parameter(format!(
                        "function '{}' received {} argument(s)",
                        name,
                        args.len()
                    )));
                }
                let values = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((def.eval)(&values))
            }
            Some(Callable::Operator(_)) => Err(not_constant(&format!("operator '{}'", name))),
            None => Err(CompileError::OperatorUnknown(name.to_string())),
        }
    }
}

fn member(object: &Value, key: &Value) -> Value {
    let name = match key {
        Value::Number(n) => format_number(*n),
        other => other.to_display_string(),
    };
    match object {
        Value::Array(items) => {
            if name == "length" {
                return Value::Number(items.len() as f64);
            }
            name.parse::<usize>()
                .ok()
                .and_then(|i| items.get(i).cloned())
                .unwrap_or(Value::Undefined)
        }
        Value::String(s) => {
            let units: Vec<u16> = s.encode_utf16().collect();
            if name == "length" {
                return Value::Number(units.len() as f64);
            }
            name.parse::<usize>()
                .ok()
                .and_then(|i| units.get(i))
                .map(|unit| Value::String(String::from_utf16_lossy(&[*unit])))
                .unwrap_or(Value::Undefined)
        }
        Value::Object(map) => map.get(&name).cloned().unwrap_or(Value::Undefined),
        _ => Value::Undefined,
    }
}

fn to_int32(n: f64) -> i32 {
    if !n.is_finite() {
        return 0;
    }
    let wrapped = n.trunc().rem_euclid(4_294_967_296.0);
    wrapped as u32 as i32
}

fn to_uint32(n: f64) -> u32 {
    to_int32(n) as u32
}

fn is_primitive(v: &Value) -> bool {
    !matches!(v, Value::Array(_) | Value::Object(_))
}

fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        // Distinct literals never share identity
        _ => false,
    }
}

fn loose_equals(left: &Value, right: &Value) -> bool {
    if left.is_nullish() || right.is_nullish() {
        return left.is_nullish() && right.is_nullish();
    }
    match (left, right) {
        (Value::Array(_) | Value::Object(_), Value::Array(_) | Value::Object(_)) => false,
        (Value::String(a), Value::String(b)) => a == b,
        (a, b) if is_primitive(a) && is_primitive(b) => a.to_number() == b.to_number(),
        (a, b) => {
            let (object, primitive) = if is_primitive(a) { (b, a) } else { (a, b) };
            loose_equals(&Value::String(object.to_display_string()), primitive)
        }
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    let left = if is_primitive(left) {
        left.clone()
    } else {
        Value::String(left.to_display_string())
    };
    let right = if is_primitive(right) {
        right.clone()
    } else {
        Value::String(right.to_display_string())
    };
    match (&left, &right) {
        (Value::String(a), Value::String(b)) => Some(a.encode_utf16().cmp(b.encode_utf16())),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}

pub(crate) fn apply_binop(op: BinOp, left: &Value, right: &Value) -> Result<Value, CompileError> {
    let number = |f: fn(f64, f64) -> f64| Value::Number(f(left.to_number(), right.to_number()));
    let int = |f: fn(i32, u32) -> i32| {
        Value::Number(f(to_int32(left.to_number()), to_uint32(right.to_number())) as f64)
    };
    let ordering = compare(left, right);
    let value = match op {
        BinOp::Add => {
            let concat = matches!(left, Value::String(_) | Value::Array(_) | Value::Object(_))
                || matches!(right, Value::String(_) | Value::Array(_) | Value::Object(_));
            if concat {
                Value::String(left.to_display_string() + &right.to_display_string())
            } else {
                number(|a, b| a + b)
            }
        }
        BinOp::Subtract => number(|a, b| a - b),
        BinOp::Multiply => number(|a, b| a * b),
        BinOp::Divide => number(|a, b| a / b),
        BinOp::Modulo => number(|a, b| a % b),
        BinOp::Power => number(power),
        BinOp::Equal => Value::Boolean(loose_equals(left, right)),
        BinOp::NotEqual => Value::Boolean(!loose_equals(left, right)),
        BinOp::StrictEqual => Value::Boolean(strict_equals(left, right)),
        BinOp::StrictNotEqual => Value::Boolean(!strict_equals(left, right)),
        BinOp::LessThan => Value::Boolean(ordering == Some(Ordering::Less)),
        BinOp::GreaterThan => Value::Boolean(ordering == Some(Ordering::Greater)),
        BinOp::LessEqual => Value::Boolean(matches!(
            ordering,
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinOp::GreaterEqual => Value::Boolean(matches!(
            ordering,
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinOp::BitAnd => int(|a, b| a & b as i32),
        BinOp::BitOr => int(|a, b| a | b as i32),
        BinOp::BitXor => int(|a, b| a ^ b as i32),
        BinOp::ShiftLeft => int(|a, b| a.wrapping_shl(b & 31)),
        BinOp::ShiftRight => int(|a, b| a.wrapping_shr(b & 31)),
        BinOp::UnsignedShiftRight => Value::Number(
            (to_uint32(left.to_number()) >> (to_uint32(right.to_number()) & 31)) as f64,
        ),
        BinOp::In | BinOp::InstanceOf => {
            return Err(not_constant(&format!("'{}'", op.as_str())));
        }
    };
    Ok(value)
}

/// Exponentiation where a NaN exponent or `±1 ** ±Infinity` yields NaN.
fn power(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        f64::NAN
    } else {
        base.powf(exponent)
    }
}
