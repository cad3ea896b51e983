use crate::ast::{Body, Constant, Expr, Function, ObjectProperty, Property, PropertyKey, Stmt, SwitchCase};

/// Rewrites a validated function into canonical form.
///
/// - `d.x` and `d['x']` become `Column("x")`
/// - every operator spelling (`mean(..)`, `op.mean(..)`, `op['mean'](..)`,
///   `w.op.mean(..)`) becomes `OpCall`
/// - whitelisted constant identifiers become `Constant`
///
/// Input must have passed validation; local bindings therefore never
/// shadow the row parameter, the namespace or a constant name.
pub fn rewrite(function: Function, namespace: &str) -> Function {
    let rewriter = Rewriter {
        param: function.param.clone(),
        namespace,
    };
    let body = match function.body {
        Body::Expr(expr) => Body::Expr(rewriter.expr(expr)),
        Body::Block(statements) => Body::Block(rewriter.statements(statements)),
    };
    Function {
        param: function.param,
        body,
    }
}

struct Rewriter<'a> {
    param: Option<String>,
    namespace: &'a str,
}

impl Rewriter<'_> {
    fn is_param(&self, expr: &Expr) -> bool {
        matches!((expr, &self.param), (Expr::Identifier(name), Some(param)) if name == param)
    }

    fn statements(&self, statements: Vec<Stmt>) -> Vec<Stmt> {
        statements.into_iter().map(|s| self.stmt(s)).collect()
    }

    fn stmt(&self, stmt: Stmt) -> Stmt {
        match stmt {
            Stmt::Expr(expr) => Stmt::Expr(self.expr(expr)),
            Stmt::Declare { kind, name, init } => Stmt::Declare {
                kind,
                name,
                init: init.map(|e| self.expr(e)),
            },
            Stmt::Block(statements) => Stmt::Block(self.statements(statements)),
            Stmt::If {
                test,
                consequent,
                alternate,
            } => Stmt::If {
                test: self.expr(test),
                consequent: Box::new(self.stmt(*consequent)),
                alternate: alternate.map(|s| Box::new(self.stmt(*s))),
            },
            Stmt::Switch {
                discriminant,
                cases,
            } => Stmt::Switch {
                discriminant: self.expr(discriminant),
                cases: cases
                    .into_iter()
                    .map(|case| SwitchCase {
                        test: case.test.map(|e| self.expr(e)),
                        consequent: self.statements(case.consequent),
                    })
                    .collect(),
            },
            Stmt::Return(value) => Stmt::Return(value.map(|e| self.expr(e))),
            // Loops never survive validation
            other => other,
        }
    }

    fn exprs(&self, exprs: Vec<Expr>) -> Vec<Expr> {
        exprs.into_iter().map(|e| self.expr(e)).collect()
    }

    fn boxed(&self, expr: Box<Expr>) -> Box<Expr> {
        Box::new(self.expr(*expr))
    }

    fn expr(&self, expr: Expr) -> Expr {
        match expr {
            Expr::Identifier(name) => match Constant::from_name(&name) {
                Some(constant) => Expr::Constant(constant),
                None => Expr::Identifier(name),
            },

            Expr::Member { object, property } => {
                if self.is_param(&object)
                    && let Some(column) = property.static_name()
                {
                    return Expr::Column(column);
                }
                Expr::Member {
                    object: self.boxed(object),
                    property: self.property(property),
                }
            }

            Expr::Call { callee, args } => {
                if let Some(name) = callee.operator_spelling(self.namespace) {
                    return Expr::OpCall {
                        name,
                        args: self.exprs(args),
                    };
                }
                Expr::Call {
                    callee: self.boxed(callee),
                    args: self.exprs(args),
                }
            }

            Expr::Array(items) => Expr::Array(self.exprs(items)),
            Expr::Object(properties) => Expr::Object(
                properties
                    .into_iter()
                    .map(|p| ObjectProperty {
                        key: match p.key {
                            PropertyKey::Computed(key) => PropertyKey::Computed(self.boxed(key)),
                            key => key,
                        },
                        value: self.expr(p.value),
                        shorthand: p.shorthand,
                    })
                    .collect(),
            ),
            Expr::Template { quasis, exprs } => Expr::Template {
                quasis,
                exprs: self.exprs(exprs),
            },
            Expr::New { callee, args } => Expr::New {
                callee: self.boxed(callee),
                args: self.exprs(args),
            },
            Expr::Unary { op, argument } => Expr::Unary {
                op,
                argument: self.boxed(argument),
            },
            Expr::Update {
                op,
                prefix,
                argument,
            } => Expr::Update {
                op,
                prefix,
                argument: self.boxed(argument),
            },
            Expr::Binary { op, left, right } => Expr::Binary {
                op,
                left: self.boxed(left),
                right: self.boxed(right),
            },
            Expr::Logical { op, left, right } => Expr::Logical {
                op,
                left: self.boxed(left),
                right: self.boxed(right),
            },
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => Expr::Conditional {
                test: self.boxed(test),
                consequent: self.boxed(consequent),
                alternate: self.boxed(alternate),
            },
            Expr::Assign { op, target, value } => Expr::Assign {
                op,
                target: self.boxed(target),
                value: self.boxed(value),
            },
            Expr::OpCall { name, args } => Expr::OpCall {
                name,
                args: self.exprs(args),
            },
            Expr::FnCall { name, args } => Expr::FnCall {
                name,
                args: self.exprs(args),
            },
            other @ (Expr::Literal(_)
            | Expr::This
            | Expr::Column(_)
            | Expr::Constant(_)
            | Expr::OpRef(_)) => other,
        }
    }

    fn property(&self, property: Property) -> Property {
        match property {
            Property::Computed(key) => Property::Computed(self.boxed(key)),
            named => named,
        }
    }
}
