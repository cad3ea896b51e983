//! Source generation for compiled expressions.
//!
//! Emits the body of a function with the parameter list [`PARAMS`]:
//! the current row index, the column table and the operator results.
//! Every operation is parenthesised, so generated code never depends on
//! operator precedence.
//!
//! ```text
//! d => op.mean(d.a) - d.b      becomes   (op[0]-data.b.get(row))
//! d => { const s = op.sum(d.a); return s * s }
//!                              becomes   {const s=op[0];return (s*s);}
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{Body, Expr, Literal, ObjectProperty, Property, PropertyKey, Stmt, SwitchCase};

/// Parameter names of every generated function.
pub const PARAMS: [&str; 3] = ["row", "data", "op"];

/// Object through which row code reaches scalar functions.
pub const FUNCTIONS: &str = "fun";

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid")
});

/// Generates the source of a function body.
pub fn generate_body(body: &Body) -> String {
    let printer = CodePrinter;
    match body {
        Body::Expr(expr) => printer.print_expr(expr),
        Body::Block(statements) => printer.print_block(statements),
    }
}

/// Generates the source of a single expression.
pub fn generate_expr(expr: &Expr) -> String {
    CodePrinter.print_expr(expr)
}

/// Column read at the current row.
pub fn column_access(name: &str) -> String {
    if IDENTIFIER.is_match(name) {
        format!("{}.{}.get({})", PARAMS[1], name, PARAMS[0])
    } else {
        let quoted = serde_json::Value::String(name.to_string()).to_string();
        format!("{}[{}].get({})", PARAMS[1], quoted, PARAMS[0])
    }
}

struct CodePrinter;

impl CodePrinter {
    fn print_list(&self, exprs: &[Expr]) -> String {
        exprs
            .iter()
            .map(|e| self.print_expr(e))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn print_expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal(literal) => match literal {
                Literal::Number { raw, .. } | Literal::String { raw, .. } => raw.clone(),
                Literal::Boolean(b) => b.to_string(),
                Literal::Null => "null".to_string(),
            },
            Expr::Array(items) => format!("[{}]", self.print_list(items)),
            Expr::Object(properties) => {
                let items: Vec<String> = properties
                    .iter()
                    .map(|p| self.print_property(p))
                    .collect();
                format!("({{{}}})", items.join(","))
            }
            Expr::Template { quasis, exprs } => {
                let mut out = String::from("`");
                for (i, quasi) in quasis.iter().enumerate() {
                    out.push_str(quasi);
                    if let Some(expr) = exprs.get(i) {
                        out.push_str("${");
                        out.push_str(&self.print_expr(expr));
                        out.push('}');
                    }
                }
                out.push('`');
                out
            }
            Expr::Identifier(name) => name.clone(),
            Expr::This => "this".to_string(),
            Expr::Member { object, property } => {
                // `1.x` and `void(0).x` do not read as member access.
                let object = match object.as_ref() {
                    Expr::Literal(Literal::Number { .. }) | Expr::Constant(_) => {
                        format!("({})", self.print_expr(object))
                    }
                    _ => self.print_expr(object),
                };
                match property {
                    Property::Named(name) => format!("{}.{}", object, name),
                    Property::Computed(key) => format!("{}[{}]", object, self.print_expr(key)),
                }
            }
            Expr::Call { callee, args } => {
                format!("{}({})", self.print_expr(callee), self.print_list(args))
            }
            Expr::New { callee, args } => {
                format!("(new {}({}))", self.print_expr(callee), self.print_list(args))
            }
            Expr::Unary { op, argument } => {
                let separator = if op.is_word() { " " } else { "" };
                format!("({}{}{})", op.as_str(), separator, self.print_expr(argument))
            }
            Expr::Update {
                op,
                prefix,
                argument,
            } => {
                if *prefix {
                    format!("({}{})", op.as_str(), self.print_expr(argument))
                } else {
                    format!("({}{})", self.print_expr(argument), op.as_str())
                }
            }
            Expr::Binary { op, left, right } => {
                let symbol = op.as_str();
                let separator = if symbol.chars().all(|c| c.is_ascii_alphabetic()) {
                    " "
                } else {
                    ""
                };
                format!(
                    "({}{sep}{}{sep}{})",
                    self.print_expr(left),
                    symbol,
                    self.print_expr(right),
                    sep = separator
                )
            }
            Expr::Logical { op, left, right } => format!(
                "({}{}{})",
                self.print_expr(left),
                op.as_str(),
                self.print_expr(right)
            ),
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => format!(
                "({}?{}:{})",
                self.print_expr(test),
                self.print_expr(consequent),
                self.print_expr(alternate)
            ),
            Expr::Assign { op, target, value } => format!(
                "({}{}{})",
                self.print_expr(target),
                op.as_str(),
                self.print_expr(value)
            ),
            Expr::Column(name) => column_access(name),
            Expr::Constant(constant) => constant.source().to_string(),
            Expr::OpRef(id) => format!("{}[{}]", PARAMS[2], id),
            // Unextracted operator calls only reach here when printing a
            // rewritten tree directly; they read like function calls.
            Expr::OpCall { name, args } | Expr::FnCall { name, args } => {
                format!("{}.{}({})", FUNCTIONS, name, self.print_list(args))
            }
        }
    }

    fn print_property(&self, property: &ObjectProperty) -> String {
        let key = match &property.key {
            PropertyKey::Identifier(name) => name.clone(),
            PropertyKey::Literal(Literal::Number { raw, .. })
            | PropertyKey::Literal(Literal::String { raw, .. }) => raw.clone(),
            PropertyKey::Literal(Literal::Boolean(b)) => b.to_string(),
            PropertyKey::Literal(Literal::Null) => "null".to_string(),
            PropertyKey::Computed(key) => format!("[{}]", self.print_expr(key)),
        };
        format!("{}:{}", key, self.print_expr(&property.value))
    }

    fn print_block(&self, statements: &[Stmt]) -> String {
        let mut out = String::from("{");
        for stmt in statements {
            out.push_str(&self.print_stmt(stmt));
            out.push(';');
        }
        out.push('}');
        out
    }

    fn print_stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expr(expr) => self.print_expr(expr),
            Stmt::Declare { kind, name, init } => match init {
                Some(init) => format!("{} {}={}", kind.as_str(), name, self.print_expr(init)),
                None => format!("{} {}", kind.as_str(), name),
            },
            Stmt::Block(statements) => self.print_block(statements),
            Stmt::If {
                test,
                consequent,
                alternate,
            } => {
                let mut out = format!(
                    "if ({}){}",
                    self.print_expr(test),
                    self.print_stmt(consequent)
                );
                if let Some(alternate) = alternate {
                    if !matches!(consequent.as_ref(), Stmt::Block(_)) {
                        out.push(';');
                    }
                    out.push_str(" else ");
                    out.push_str(&self.print_stmt(alternate));
                }
                out
            }
            Stmt::Switch {
                discriminant,
                cases,
            } => {
                let mut out = format!("switch ({}) {{", self.print_expr(discriminant));
                for case in cases {
                    out.push_str(&self.print_case(case));
                }
                out.push('}');
                out
            }
            Stmt::Return(Some(value)) => format!("return {}", self.print_expr(value)),
            Stmt::Return(None) => "return".to_string(),
            Stmt::Break => "break".to_string(),
            Stmt::Continue => "continue".to_string(),
            Stmt::Empty => String::new(),
            Stmt::For {
                init,
                test,
                update,
                body,
            } => format!(
                "for ({};{};{}){}",
                init.as_ref().map(|s| self.print_stmt(s)).unwrap_or_default(),
                test.as_ref().map(|e| self.print_expr(e)).unwrap_or_default(),
                update.as_ref().map(|e| self.print_expr(e)).unwrap_or_default(),
                self.print_stmt(body)
            ),
            Stmt::ForEach {
                kind,
                name,
                of,
                iterable,
                body,
            } => format!(
                "for ({}{} {} {}){}",
                kind.map(|k| format!("{} ", k.as_str())).unwrap_or_default(),
                name,
                if *of { "of" } else { "in" },
                self.print_expr(iterable),
                self.print_stmt(body)
            ),
            Stmt::While { test, body } => {
                format!("while ({}){}", self.print_expr(test), self.print_stmt(body))
            }
            Stmt::DoWhile { body, test } => {
                format!("do {} while ({})", self.print_stmt(body), self.print_expr(test))
            }
        }
    }

    fn print_case(&self, case: &SwitchCase) -> String {
        let mut out = match &case.test {
            Some(test) => format!("case {}: ", self.print_expr(test)),
            None => "default: ".to_string(),
        };
        for stmt in &case.consequent {
            out.push_str(&self.print_stmt(stmt));
            out.push(';');
        }
        out
    }
}
