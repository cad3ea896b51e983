//! Operator extraction.
//!
//! Replaces every aggregate or window call in a rewritten function with a
//! reference to its slot in the batch operator list. Fields are compiled to
//! accessor source, parameters are folded to constants. Scalar function
//! calls stay in row code as `FnCall`.

use log::trace;

use crate::{
    ast::{Body, Expr, Function, ObjectProperty, Property, PropertyKey, Stmt, SwitchCase},
    codegen,
    error::CompileError,
    fold::Folder,
    registry::{Callable, OperatorRegistry},
    value::Value,
};

/// Window settings attached to operators extracted from a window-wrapped
/// expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    /// `[preceding, following]`
    pub frame: [f64; 2],
    pub peers: bool,
}

/// One operator invocation evaluated once per query.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorCall {
    pub name: String,
    /// Accessor source for each field argument
    pub fields: Vec<String>,
    /// Folded constant parameters
    pub params: Vec<Value>,
    /// Position in the batch operator list
    pub id: usize,
    pub window: Option<Window>,
}

/// Extracts operators from `function`, appending them to `ops`.
///
/// Ids continue from `ops.len()`, so threading the same list through every
/// expression of a batch numbers operators in first-occurrence order.
pub fn extract(
    function: Function,
    registry: &OperatorRegistry,
    window: Option<Window>,
    ops: &mut Vec<OperatorCall>,
) -> Result<Function, CompileError> {
    let mut extractor = Extractor {
        registry,
        folder: Folder::new(registry),
        window,
        ops,
    };
    let body = match function.body {
        Body::Expr(expr) => Body::Expr(extractor.expr(expr)?),
        Body::Block(statements) => Body::Block(extractor.statements(statements)?),
    };
    Ok(Function {
        param: function.param,
        body,
    })
}

struct Extractor<'a> {
    registry: &'a OperatorRegistry,
    folder: Folder<'a>,
    window: Option<Window>,
    ops: &'a mut Vec<OperatorCall>,
}

impl Extractor<'_> {
    fn statements(&mut self, statements: Vec<Stmt>) -> Result<Vec<Stmt>, CompileError> {
        statements.into_iter().map(|s| self.stmt(s)).collect()
    }

    fn stmt(&mut self, stmt: Stmt) -> Result<Stmt, CompileError> {
        Ok(match stmt {
            Stmt::Expr(expr) => Stmt::Expr(self.expr(expr)?),
            Stmt::Declare { kind, name, init } => Stmt::Declare {
                kind,
                name,
                init: init.map(|e| self.expr(e)).transpose()?,
            },
            Stmt::Block(statements) => Stmt::Block(self.statements(statements)?),
            Stmt::If {
                test,
                consequent,
                alternate,
            } => Stmt::If {
                test: self.expr(test)?,
                consequent: Box::new(self.stmt(*consequent)?),
                alternate: match alternate {
                    Some(alternate) => Some(Box::new(self.stmt(*alternate)?)),
                    None => None,
                },
            },
            Stmt::Switch {
                discriminant,
                cases,
            } => {
                let discriminant = self.expr(discriminant)?;
                let cases = cases
                    .into_iter()
                    .map(|case| {
                        Ok(SwitchCase {
                            test: case.test.map(|e| self.expr(e)).transpose()?,
                            consequent: self.statements(case.consequent)?,
                        })
                    })
                    .collect::<Result<_, CompileError>>()?;
                Stmt::Switch {
                    discriminant,
                    cases,
                }
            }
            Stmt::Return(value) => Stmt::Return(value.map(|e| self.expr(e)).transpose()?),
            other => other,
        })
    }

    fn exprs(&mut self, exprs: Vec<Expr>) -> Result<Vec<Expr>, CompileError> {
        exprs.into_iter().map(|e| self.expr(e)).collect()
    }

    fn boxed(&mut self, expr: Box<Expr>) -> Result<Box<Expr>, CompileError> {
        Ok(Box::new(self.expr(*expr)?))
    }

    fn expr(&mut self, expr: Expr) -> Result<Expr, CompileError> {
        Ok(match expr {
            Expr::OpCall { name, args } => match self.registry.lookup(&name) {
                Some(Callable::Operator(def)) => {
                    let (fields, params) = (def.fields, def.params);
                    self.operator(name, args, fields, params)?
                }
                Some(Callable::Function(def)) => {
                    if args.len() < def.min_args || args.len() > def.max_args {
                        return Err(CompileError::Parameter(format!(
                            "function '{}' received {} argument(s)",
                            name,
                            args.len()
                        )));
                    }
                    Expr::FnCall {
                        name,
                        args: self.exprs(args)?,
                    }
                }
                None => return Err(CompileError::OperatorUnknown(name)),
            },

            Expr::Array(items) => Expr::Array(self.exprs(items)?),
            Expr::Object(properties) => Expr::Object(
                properties
                    .into_iter()
                    .map(|p| {
                        Ok(ObjectProperty {
                            key: match p.key {
                                PropertyKey::Computed(key) => PropertyKey::Computed(self.boxed(key)?),
                                key => key,
                            },
                            value: self.expr(p.value)?,
                            shorthand: p.shorthand,
                        })
                    })
                    .collect::<Result<_, CompileError>>()?,
            ),
            Expr::Template { quasis, exprs } => Expr::Template {
                quasis,
                exprs: self.exprs(exprs)?,
            },
            Expr::Member { object, property } => Expr::Member {
                object: self.boxed(object)?,
                property: match property {
                    Property::Computed(key) => Property::Computed(self.boxed(key)?),
                    named => named,
                },
            },
            Expr::Call { callee, args } => Expr::Call {
                callee: self.boxed(callee)?,
                args: self.exprs(args)?,
            },
            Expr::New { callee, args } => Expr::New {
                callee: self.boxed(callee)?,
                args: self.exprs(args)?,
            },
            Expr::Unary { op, argument } => Expr::Unary {
                op,
                argument: self.boxed(argument)?,
            },
            Expr::Update {
                op,
                prefix,
                argument,
            } => Expr::Update {
                op,
                prefix,
                argument: self.boxed(argument)?,
            },
            Expr::Binary { op, left, right } => Expr::Binary {
                op,
                left: self.boxed(left)?,
                right: self.boxed(right)?,
            },
            Expr::Logical { op, left, right } => Expr::Logical {
                op,
                left: self.boxed(left)?,
                right: self.boxed(right)?,
            },
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => Expr::Conditional {
                test: self.boxed(test)?,
                consequent: self.boxed(consequent)?,
                alternate: self.boxed(alternate)?,
            },
            Expr::Assign { op, target, value } => Expr::Assign {
                op,
                target: self.boxed(target)?,
                value: self.boxed(value)?,
            },
            Expr::FnCall { name, args } => Expr::FnCall {
                name,
                args: self.exprs(args)?,
            },
            other @ (Expr::Literal(_)
            | Expr::Identifier(_)
            | Expr::This
            | Expr::Column(_)
            | Expr::Constant(_)
            | Expr::OpRef(_)) => other,
        })
    }

    fn operator(
        &mut self,
        name: String,
        args: Vec<Expr>,
        field_count: usize,
        param_count: usize,
    ) -> Result<Expr, CompileError> {
        if args.len() < field_count {
            return Err(CompileError::Parameter(format!(
                "operator '{}' expects {} field argument(s), found {}",
                name,
                field_count,
                args.len()
            )));
        }
        if args.len() > field_count + param_count {
            return Err(CompileError::Parameter(format!(
                "operator '{}' accepts at most {} argument(s), found {}",
                name,
                field_count + param_count,
                args.len()
            )));
        }

        let mut args = args.into_iter();
        let mut fields = Vec::with_capacity(field_count);
        for arg in args.by_ref().take(field_count) {
            fields.push(self.field(&name, arg)?);
        }
        let params = args
            .map(|arg| self.folder.fold(&arg))
            .collect::<Result<Vec<_>, _>>()?;

        let id = self.ops.len();
        trace!(
            "extracted operator {} as op[{}] (fields: {:?}, params: {:?})",
            name, id, fields, params
        );
        self.ops.push(OperatorCall {
            name,
            fields,
            params,
            id,
            window: self.window,
        });
        Ok(Expr::OpRef(id))
    }

    /// Compiles a field argument to accessor source.
    fn field(&mut self, operator: &str, arg: Expr) -> Result<String, CompileError> {
        let registry = self.registry;
        let mut nested = None;
        let mut local = None;
        arg.any(&mut |e| match e {
            Expr::OpCall { name, .. } if nested.is_none() => {
                if matches!(registry.lookup(name), Some(Callable::Operator(_))) {
                    nested = Some(name.clone());
                }
                false
            }
            Expr::Identifier(name) if local.is_none() => {
                local = Some(name.clone());
                false
            }
            _ => false,
        });
        if let Some(inner) = nested {
            return Err(CompileError::Parameter(format!(
                "operator '{}' cannot be nested inside operator '{}'",
                inner, operator
            )));
        }
        if let Some(name) = local {
            return Err(CompileError::Parameter(format!(
                "field of operator '{}' cannot reference local value '{}'",
                operator, name
            )));
        }
        if !arg.reads_row() {
            return Err(CompileError::Parameter(format!(
                "field of operator '{}' must reference row data",
                operator
            )));
        }
        let arg = self.expr(arg)?;
        Ok(codegen::generate_expr(&arg))
    }
}
