use crate::ast::{Expr, Stmt};

/// A parsed expression function.
///
/// ```text
/// d => d.a * d.b
/// () => 1 + 1
/// d => { const s = op.sum(d.a); return s * s; }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Name of the row parameter, if the function declares one
    pub param: Option<String>,

    pub body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Concise arrow body
    Expr(Expr),
    /// Statement list between braces
    Block(Vec<Stmt>),
}
