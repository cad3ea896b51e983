//! JSON <-> expression batch conversion utilities

use crate::{
    Compiled, ExprDef, ExprSet, OperatorCall, Value,
    exprs::{DEFAULT_FRAME, DEFAULT_PEERS},
};

use super::CliError;

/// Convert a JSON object of named definitions to an expression batch.
///
/// A definition is either function source or
/// `{"function": "...", "frame": [preceding, following], "peers": bool}`.
/// `null` frame bounds are unbounded.
pub fn json_to_exprs(v: serde_json::Value) -> Result<ExprSet, CliError> {
    let serde_json::Value::Object(obj) = v else {
        return Err(CliError::InvalidDefinition(
            "expected a JSON object mapping names to expressions".into(),
        ));
    };
    let mut exprs = ExprSet::new();
    for (name, def) in obj {
        let def = json_to_def(&name, def)?;
        exprs.insert(name, def);
    }
    Ok(exprs)
}

fn json_to_def(name: &str, v: serde_json::Value) -> Result<ExprDef, CliError> {
    match v {
        serde_json::Value::String(source) => Ok(ExprDef::Source(source)),
        serde_json::Value::Object(mut obj) => {
            let function = match obj.remove("function") {
                Some(serde_json::Value::String(source)) => source,
                _ => {
                    return Err(CliError::InvalidDefinition(format!(
                        "'{}' needs a \"function\" string",
                        name
                    )));
                }
            };
            let frame = match obj.remove("frame") {
                None | Some(serde_json::Value::Null) => DEFAULT_FRAME,
                Some(serde_json::Value::Array(bounds)) if bounds.len() == 2 => {
                    [bound(name, &bounds[0], f64::NEG_INFINITY)?, bound(name, &bounds[1], f64::INFINITY)?]
                }
                Some(_) => {
                    return Err(CliError::InvalidDefinition(format!(
                        "'{}' frame must be a two-element array",
                        name
                    )));
                }
            };
            let peers = match obj.remove("peers") {
                None | Some(serde_json::Value::Null) => DEFAULT_PEERS,
                Some(serde_json::Value::Bool(b)) => b,
                Some(_) => {
                    return Err(CliError::InvalidDefinition(format!(
                        "'{}' peers must be a boolean",
                        name
                    )));
                }
            };
            Ok(ExprDef::Window {
                function,
                frame,
                peers,
            })
        }
        _ => Err(CliError::InvalidDefinition(format!(
            "'{}' must be a string or an object",
            name
        ))),
    }
}

fn bound(name: &str, v: &serde_json::Value, unbounded: f64) -> Result<f64, CliError> {
    match v {
        serde_json::Value::Null => Ok(unbounded),
        serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| {
            CliError::InvalidDefinition(format!("'{}' frame bound is out of range", name))
        }),
        _ => Err(CliError::InvalidDefinition(format!(
            "'{}' frame bounds must be numbers or null",
            name
        ))),
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::Number((n as i64).into());
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Convert a folded constant to serde_json::Value
///
/// Non-finite numbers and `undefined` have no JSON form and become `null`.
pub fn value_to_json(v: Value) -> serde_json::Value {
    match v {
        Value::Undefined | Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Number(n) => number_to_json(n),
        Value::String(s) => serde_json::Value::String(s),
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Object(obj) => serde_json::Value::Object(
            obj.into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

fn op_to_json(op: OperatorCall) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    obj.insert("name".into(), serde_json::Value::String(op.name));
    obj.insert(
        "fields".into(),
        serde_json::Value::Array(op.fields.into_iter().map(serde_json::Value::String).collect()),
    );
    obj.insert(
        "params".into(),
        serde_json::Value::Array(op.params.into_iter().map(value_to_json).collect()),
    );
    obj.insert("id".into(), serde_json::Value::Number(op.id.into()));
    if let Some(window) = op.window {
        obj.insert(
            "frame".into(),
            serde_json::Value::Array(window.frame.iter().map(|n| number_to_json(*n)).collect()),
        );
        obj.insert("peers".into(), serde_json::Value::Bool(window.peers));
    }
    serde_json::Value::Object(obj)
}

/// Convert compiled output to `{"ops": [...], "values": {...}}`
pub fn compiled_to_json(compiled: Compiled) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    obj.insert(
        "ops".into(),
        serde_json::Value::Array(compiled.ops.into_iter().map(op_to_json).collect()),
    );
    obj.insert(
        "values".into(),
        serde_json::Value::Object(
            compiled
                .values
                .into_iter()
                .map(|(k, v)| (k, serde_json::Value::String(v)))
                .collect(),
        ),
    );
    serde_json::Value::Object(obj)
}
