//! Static sandbox for expression functions.
//!
//! The validator walks the parsed tree and rejects anything that could reach
//! outside the row being evaluated: loops, ambient or global bindings, method
//! invocation on arbitrary receivers, object construction and prototype
//! access. It never mutates the tree.

use std::collections::HashMap;

use crate::{
    ast::{
        BinOp, Body, Constant, DeclKind, Expr, Function, Literal, Property, PropertyKey, Stmt,
        UnaryOp,
    },
    error::CompileError,
};

/// Names of ambient execution-context bindings and built-in namespaces.
/// Referencing them is a validation failure rather than an unresolved name.
const AMBIENT_NAMES: &[&str] = &[
    "globalThis",
    "global",
    "window",
    "self",
    "document",
    "arguments",
    "Object",
    "Function",
    "Array",
    "Number",
    "String",
    "Boolean",
    "Symbol",
    "BigInt",
    "Math",
    "Date",
    "RegExp",
    "JSON",
    "Reflect",
    "Proxy",
    "Promise",
    "Error",
    "Map",
    "Set",
    "WeakMap",
    "WeakSet",
    "Intl",
    "eval",
    "require",
    "module",
    "exports",
    "process",
    "console",
    "import",
];

/// Properties that expose constructors or the prototype chain.
const PROTOTYPE_PROPERTIES: &[&str] = &["constructor", "__proto__", "prototype"];

/// Checks one expression function against the sandbox rules.
///
/// `namespace` is the operator namespace identifier (usually `op`).
pub fn validate(function: &Function, namespace: &str) -> Result<(), CompileError> {
    let mut validator = Validator {
        param: function.param.as_deref(),
        namespace,
        scopes: vec![HashMap::new()],
        switch_depth: 0,
    };
    match &function.body {
        Body::Expr(expr) => validator.check_expr(expr),
        Body::Block(statements) => validator.check_statements(statements),
    }
}

struct Validator<'a> {
    param: Option<&'a str>,
    namespace: &'a str,
    /// Local bindings, innermost scope last
    scopes: Vec<HashMap<String, DeclKind>>,
    switch_depth: usize,
}

impl Validator<'_> {
    fn lookup_local(&self, name: &str) -> Option<DeclKind> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    fn is_param(&self, name: &str) -> bool {
        self.param == Some(name)
    }

    fn declare(&mut self, kind: DeclKind, name: &str) -> Result<(), CompileError> {
        if self.is_param(name) || name == self.namespace || Constant::from_name(name).is_some() {
            return Err(CompileError::Validation(format!(
                "cannot declare '{}': the name is reserved",
                name
            )));
        }
        if AMBIENT_NAMES.contains(&name) {
            return Err(CompileError::Validation(format!(
                "cannot declare '{}': shadows a global binding",
                name
            )));
        }
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| CompileError::Validation("declaration outside of any scope".into()))?;
        if scope.contains_key(name) {
            return Err(CompileError::Validation(format!(
                "'{}' has already been declared",
                name
            )));
        }
        scope.insert(name.to_string(), kind);
        Ok(())
    }

    fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.scopes.push(HashMap::new());
        let result = f(self);
        self.scopes.pop();
        result
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn check_statements(&mut self, statements: &[Stmt]) -> Result<(), CompileError> {
        statements.iter().try_for_each(|stmt| self.check_stmt(stmt))
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Expr(expr) => self.check_expr(expr),
            Stmt::Declare { kind, name, init } => {
                if let Some(init) = init {
                    self.check_expr(init)?;
                }
                self.declare(*kind, name)
            }
            Stmt::Block(statements) => {
                self.with_scope(|v| v.check_statements(statements))
            }
            Stmt::If {
                test,
                consequent,
                alternate,
            } => {
                self.check_expr(test)?;
                self.with_scope(|v| v.check_stmt(consequent))?;
                match alternate {
                    Some(alternate) => self.with_scope(|v| v.check_stmt(alternate)),
                    None => Ok(()),
                }
            }
            Stmt::Switch {
                discriminant,
                cases,
            } => {
                self.check_expr(discriminant)?;
                self.switch_depth += 1;
                let result = self.with_scope(|v| {
                    cases.iter().try_for_each(|case| {
                        if let Some(test) = &case.test {
                            v.check_expr(test)?;
                        }
                        v.check_statements(&case.consequent)
                    })
                });
                self.switch_depth -= 1;
                result
            }
            Stmt::Return(value) => match value {
                Some(expr) => self.check_expr(expr),
                None => Ok(()),
            },
            Stmt::Break => {
                if self.switch_depth == 0 {
                    Err(CompileError::Validation(
                        "'break' is only allowed inside a switch".into(),
                    ))
                } else {
                    Ok(())
                }
            }
            Stmt::Continue => Err(CompileError::Validation(
                "'continue' is not supported: loops are not allowed".into(),
            )),
            Stmt::Empty => Ok(()),
            Stmt::For { .. } => Err(CompileError::Validation(
                "'for' loops are not supported".into(),
            )),
            Stmt::ForEach { of, .. } => Err(CompileError::Validation(format!(
                "'for...{}' loops are not supported",
                if *of { "of" } else { "in" }
            ))),
            Stmt::While { .. } => Err(CompileError::Validation(
                "'while' loops are not supported".into(),
            )),
            Stmt::DoWhile { .. } => Err(CompileError::Validation(
                "'do...while' loops are not supported".into(),
            )),
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn check_exprs(&mut self, exprs: &[Expr]) -> Result<(), CompileError> {
        exprs.iter().try_for_each(|e| self.check_expr(e))
    }

    fn check_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Literal(_) => Ok(()),
            Expr::Array(items) => self.check_exprs(items),
            Expr::Object(properties) => properties.iter().try_for_each(|property| {
                match &property.key {
                    PropertyKey::Computed(key) => self.check_expr(key)?,
                    key => {
                        if key.static_name().as_deref() == Some("__proto__") {
                            return Err(CompileError::Validation(
                                "'__proto__' keys are not allowed in object literals".into(),
                            ));
                        }
                    }
                }
                self.check_expr(&property.value)
            }),
            Expr::Template { exprs, .. } => self.check_exprs(exprs),
            Expr::Identifier(name) => self.check_identifier(name),
            Expr::This => Err(CompileError::Validation(
                "'this' is not accessible in expressions".into(),
            )),
            Expr::Member { object, property } => self.check_member(object, property),
            Expr::Call { callee, args } => {
                self.check_callee(callee)?;
                self.check_exprs(args)
            }
            Expr::New { .. } => Err(CompileError::Validation(
                "object construction with 'new' is not allowed".into(),
            )),
            Expr::Unary { op, argument } => {
                if *op == UnaryOp::Delete {
                    return Err(CompileError::Validation(
                        "'delete' is not allowed".into(),
                    ));
                }
                self.check_expr(argument)
            }
            Expr::Update { argument, .. } => self.check_target(argument),
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.check_expr(left)?;
                self.check_expr(right)
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.check_expr(test)?;
                self.check_expr(consequent)?;
                self.check_expr(alternate)
            }
            Expr::Assign { target, value, .. } => {
                self.check_target(target)?;
                self.check_expr(value)
            }
            // Canonical nodes only exist after rewriting; surface parsing never
            // produces them.
            Expr::Column(_)
            | Expr::Constant(_)
            | Expr::OpCall { .. }
            | Expr::OpRef(_)
            | Expr::FnCall { .. } => Ok(()),
        }
    }

    fn check_identifier(&self, name: &str) -> Result<(), CompileError> {
        if self.lookup_local(name).is_some() || Constant::from_name(name).is_some() {
            return Ok(());
        }
        if self.is_param(name) {
            return Err(CompileError::Validation(format!(
                "row parameter '{}' may only be used to access columns",
                name
            )));
        }
        if name == self.namespace {
            return Err(CompileError::Validation(format!(
                "operator namespace '{}' may only be used to call operators",
                name
            )));
        }
        if AMBIENT_NAMES.contains(&name) {
            return Err(CompileError::Validation(format!(
                "access to '{}' is not permitted",
                name
            )));
        }
        Err(CompileError::Reference(format!("'{}' is not defined", name)))
    }

    fn check_property_name(name: &str) -> Result<(), CompileError> {
        if PROTOTYPE_PROPERTIES.contains(&name) {
            return Err(CompileError::Validation(format!(
                "access to '{}' is not permitted",
                name
            )));
        }
        Ok(())
    }

    fn check_member(&mut self, object: &Expr, property: &Property) -> Result<(), CompileError> {
        if let Some(name) = property.static_name() {
            Self::check_property_name(&name)?;
        }

        // d.x / d['x']: column access
        if let Expr::Identifier(root) = object
            && self.is_param(root)
            && self.lookup_local(root).is_none()
        {
            return match property.static_name() {
                Some(_) => Ok(()),
                None => Err(CompileError::Validation(format!(
                    "columns of '{}' must be accessed with a constant name",
                    root
                ))),
            };
        }

        self.check_expr(object)?;
        match property {
            Property::Computed(key) if property.static_name().is_none() => {
                // A runtime string key could spell a prototype property.
                if !is_numeric_key(key) {
                    return Err(CompileError::Validation(
                        "computed member keys must be constant or numeric".into(),
                    ));
                }
                self.check_expr(key)
            }
            Property::Computed(_) | Property::Named(_) => Ok(()),
        }
    }

    /// Only operator spellings and direct row-parameter members may be called.
    fn check_callee(&mut self, callee: &Expr) -> Result<(), CompileError> {
        match callee {
            Expr::Identifier(name) => {
                if self.lookup_local(name).is_some() {
                    return Err(CompileError::Validation(format!(
                        "local value '{}' cannot be invoked",
                        name
                    )));
                }
                if self.is_param(name) || name == self.namespace {
                    return Err(CompileError::Validation(format!(
                        "'{}' cannot be invoked",
                        name
                    )));
                }
                if AMBIENT_NAMES.contains(&name.as_str()) || Constant::from_name(name).is_some() {
                    return Err(CompileError::Validation(format!(
                        "calling '{}' is not permitted",
                        name
                    )));
                }
                // Bare operator name; resolved against the registry later.
                Ok(())
            }
            Expr::Member { object, property } => {
                if let Some(name) = property.static_name() {
                    Self::check_property_name(&name)?;
                }
                if callee.operator_spelling(self.namespace).is_some() {
                    return match callee.root_identifier() {
                        Some(root) if self.lookup_local(root).is_some() || self.is_param(root) => {
                            Err(CompileError::Validation(format!(
                                "operators must be invoked through '{}', not through '{}'",
                                self.namespace, root
                            )))
                        }
                        _ => Ok(()),
                    };
                }
                if let Expr::Identifier(root) = object.as_ref()
                    && self.is_param(root)
                    && self.lookup_local(root).is_none()
                {
                    return self.check_member(object, property);
                }
                Err(CompileError::Validation(
                    "method invocation is only permitted on the operator namespace or the row parameter"
                        .into(),
                ))
            }
            _ => Err(CompileError::Validation(
                "only operators may be invoked".into(),
            )),
        }
    }

    /// Assignment and update targets must be rooted at a mutable local.
    fn check_target(&mut self, target: &Expr) -> Result<(), CompileError> {
        match target {
            Expr::Identifier(name) => match self.lookup_local(name) {
                Some(DeclKind::Const) => Err(CompileError::Validation(format!(
                    "cannot assign to constant '{}'",
                    name
                ))),
                Some(_) => Ok(()),
                None => {
                    self.check_identifier(name)?;
                    Err(CompileError::Validation(format!(
                        "cannot assign to '{}'",
                        name
                    )))
                }
            },
            Expr::Member { object, property } => {
                if let Some(name) = property.static_name() {
                    Self::check_property_name(&name)?;
                }
                match object.root_identifier() {
                    Some(root) if self.lookup_local(root).is_some() => {
                        self.check_member(object, property)
                    }
                    Some(root) if self.is_param(root) => Err(CompileError::Validation(
                        "row data is read-only".into(),
                    )),
                    _ => {
                        self.check_expr(object)?;
                        Err(CompileError::Validation(
                            "assignment is only permitted to local bindings".into(),
                        ))
                    }
                }
            }
            _ => Err(CompileError::Validation("invalid assignment target".into())),
        }
    }
}

/// True when `key` always evaluates to a number.
fn is_numeric_key(key: &Expr) -> bool {
    match key {
        Expr::Literal(Literal::Number { .. }) | Expr::Update { .. } => true,
        Expr::Unary { op, .. } => matches!(op, UnaryOp::Negate | UnaryOp::Plus | UnaryOp::BitNot),
        Expr::Binary {
            op: BinOp::Add,
            left,
            right,
        } => is_numeric_key(left) && is_numeric_key(right),
        Expr::Binary { op, .. } => matches!(
            op,
            BinOp::Subtract
                | BinOp::Multiply
                | BinOp::Divide
                | BinOp::Modulo
                | BinOp::Power
                | BinOp::BitAnd
                | BinOp::BitOr
                | BinOp::BitXor
                | BinOp::ShiftLeft
                | BinOp::ShiftRight
                | BinOp::UnsignedShiftRight
        ),
        Expr::Conditional {
            consequent,
            alternate,
            ..
        } => is_numeric_key(consequent) && is_numeric_key(alternate),
        _ => false,
    }
}

/// Convenience check used by the CLI and tests: parse and validate.
pub fn check_source(source: &str, namespace: &str) -> Result<(), CompileError> {
    let function = crate::parser::parse_function(source)?;
    validate(&function, namespace)
}

