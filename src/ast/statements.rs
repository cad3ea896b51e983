use crate::ast::Expr;

/// Statement inside a block-bodied function.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Expression evaluated for its effect
    Expr(Expr),

    /// Single-binding declaration
    ///
    /// # Example
    /// ```text
    /// const s = op.sum(d.a)
    /// ```
    Declare {
        kind: DeclKind,
        name: String,
        init: Option<Expr>,
    },

    /// `{ ... }`
    Block(Vec<Stmt>),

    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },

    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },

    Return(Option<Expr>),

    Break,

    Continue,

    /// Lone `;`
    Empty,

    // Loops are parsed only so that they can be rejected with a precise error.
    For {
        init: Option<Box<Stmt>>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },

    /// `for (x in obj)` / `for (x of arr)`
    ForEach {
        kind: Option<DeclKind>,
        name: String,
        of: bool,
        iterable: Expr,
        body: Box<Stmt>,
    },

    While {
        test: Expr,
        body: Box<Stmt>,
    },

    DoWhile {
        body: Box<Stmt>,
        test: Expr,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Const,
    Let,
    Var,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Const => "const",
            DeclKind::Let => "let",
            DeclKind::Var => "var",
        }
    }
}

/// One `case` or `default` arm of a switch.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// `None` for `default`
    pub test: Option<Expr>,
    pub consequent: Vec<Stmt>,
}
