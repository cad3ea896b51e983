use crate::ast::{AssignOp, BinOp, LogicalOp, UnaryOp, UpdateOp};

/// Abstract Syntax Tree node representing an expression.
///
/// The tree holds both surface forms produced by the parser and the
/// canonical forms introduced by the rewriter and operator extractor
/// (`Column`, `Constant`, `OpCall`, `OpRef`, `FnCall`).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Scalar literal with its source spelling preserved
    Literal(Literal),

    /// Array literal
    ///
    /// # Example
    /// ```text
    /// [1, 2, d.x]
    /// ```
    Array(Vec<Expr>),

    /// Object literal, in source key order
    ///
    /// # Example
    /// ```text
    /// ({a: 1, "b": d.x})
    /// ```
    Object(Vec<ObjectProperty>),

    /// Template literal; `quasis` holds raw text chunks around `exprs`
    Template {
        quasis: Vec<String>,
        exprs: Vec<Expr>,
    },

    // References
    /// Named reference (row parameter, local binding, namespace or constant)
    Identifier(String),

    /// The `this` keyword
    This,

    // Access
    /// Member access
    ///
    /// # Examples
    /// ```text
    /// d.value
    /// d['value']
    /// arr[i]
    /// ```
    Member {
        object: Box<Expr>,
        property: Property,
    },

    /// Call expression
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    /// Construction with `new`
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    // Operations
    Unary {
        op: UnaryOp,
        argument: Box<Expr>,
    },

    Update {
        op: UpdateOp,
        prefix: bool,
        argument: Box<Expr>,
    },

    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `test ? consequent : alternate`
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },

    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },

    // Canonical forms
    /// Column value read at the current row
    Column(String),

    /// Whitelisted named constant
    Constant(Constant),

    /// Operator invocation normalized from any call spelling
    OpCall {
        name: String,
        args: Vec<Expr>,
    },

    /// Reference to the result of the operator with the given id
    OpRef(usize),

    /// Row-level scalar function call
    FnCall {
        name: String,
        args: Vec<Expr>,
    },
}

/// Scalar literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number { value: f64, raw: String },
    String { value: String, raw: String },
    Boolean(bool),
    Null,
}

/// Property position of a member access.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// `object.name`
    Named(String),
    /// `object[expr]`
    Computed(Box<Expr>),
}

impl Property {
    /// The property name when it is known without evaluation.
    pub fn static_name(&self) -> Option<String> {
        match self {
            Property::Named(name) => Some(name.clone()),
            Property::Computed(expr) => match expr.as_ref() {
                Expr::Literal(Literal::String { value, .. }) => Some(value.clone()),
                Expr::Literal(Literal::Number { value, .. }) => {
                    Some(crate::value::format_number(*value))
                }
                _ => None,
            },
        }
    }
}

/// Key of an object literal property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    /// Bare identifier key
    Identifier(String),
    /// Quoted or numeric key, kept as written
    Literal(Literal),
    /// `[expr]` key
    Computed(Box<Expr>),
}

impl PropertyKey {
    pub fn static_name(&self) -> Option<String> {
        match self {
            PropertyKey::Identifier(name) => Some(name.clone()),
            PropertyKey::Literal(Literal::String { value, .. }) => Some(value.clone()),
            PropertyKey::Literal(Literal::Number { value, .. }) => {
                Some(crate::value::format_number(*value))
            }
            PropertyKey::Literal(_) => None,
            PropertyKey::Computed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty {
    pub key: PropertyKey,
    pub value: Expr,
    /// Written as `{ name }`
    pub shorthand: bool,
}

/// Named constants that may be referenced without declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Undefined,
    Infinity,
    NaN,
    E,
    Ln2,
    Ln10,
    Log2E,
    Log10E,
    Pi,
    Sqrt1_2,
    Sqrt2,
}

impl Constant {
    pub fn from_name(name: &str) -> Option<Self> {
        let constant = match name {
            "undefined" => Constant::Undefined,
            "Infinity" => Constant::Infinity,
            "NaN" => Constant::NaN,
            "E" => Constant::E,
            "LN2" => Constant::Ln2,
            "LN10" => Constant::Ln10,
            "LOG2E" => Constant::Log2E,
            "LOG10E" => Constant::Log10E,
            "PI" => Constant::Pi,
            "SQRT1_2" => Constant::Sqrt1_2,
            "SQRT2" => Constant::Sqrt2,
            _ => return None,
        };
        Some(constant)
    }

    /// Numeric value; `None` for `undefined`.
    pub fn number(&self) -> Option<f64> {
        use std::f64::consts;
        match self {
            Constant::Undefined => None,
            Constant::Infinity => Some(f64::INFINITY),
            Constant::NaN => Some(f64::NAN),
            Constant::E => Some(consts::E),
            Constant::Ln2 => Some(consts::LN_2),
            Constant::Ln10 => Some(consts::LN_10),
            Constant::Log2E => Some(consts::LOG2_E),
            Constant::Log10E => Some(consts::LOG10_E),
            Constant::Pi => Some(consts::PI),
            Constant::Sqrt1_2 => Some(consts::FRAC_1_SQRT_2),
            Constant::Sqrt2 => Some(consts::SQRT_2),
        }
    }

    /// Source form emitted by the code generator.
    pub fn source(&self) -> &'static str {
        match self {
            Constant::Undefined => "void(0)",
            Constant::Infinity => "Number.POSITIVE_INFINITY",
            Constant::NaN => "Number.NaN",
            Constant::E => "Math.E",
            Constant::Ln2 => "Math.LN2",
            Constant::Ln10 => "Math.LN10",
            Constant::Log2E => "Math.LOG2E",
            Constant::Log10E => "Math.LOG10E",
            Constant::Pi => "Math.PI",
            Constant::Sqrt1_2 => "Math.SQRT1_2",
            Constant::Sqrt2 => "Math.SQRT2",
        }
    }
}

impl Expr {
    pub fn number(value: f64, raw: &str) -> Expr {
        Expr::Literal(Literal::Number {
            value,
            raw: raw.to_string(),
        })
    }

    pub fn string(value: &str, raw: &str) -> Expr {
        Expr::Literal(Literal::String {
            value: value.to_string(),
            raw: raw.to_string(),
        })
    }

    /// Operator name when this node is the callee of an operator invocation.
    ///
    /// Recognized spellings, for namespace `op`:
    /// ```text
    /// mean(...)
    /// op.mean(...)
    /// op['mean'](...)
    /// wrapper.op.mean(...)
    /// ```
    /// A bare identifier always qualifies here; callers decide whether the
    /// name is shadowed by a local binding.
    pub fn operator_spelling(&self, namespace: &str) -> Option<String> {
        match self {
            Expr::Identifier(name) => Some(name.clone()),
            Expr::Member { object, property } => {
                let name = property.static_name()?;
                if object.is_namespace_path(namespace) {
                    Some(name)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// True for `op`, `wrapper.op`, `a.b.op`, ...
    fn is_namespace_path(&self, namespace: &str) -> bool {
        match self {
            Expr::Identifier(name) => name == namespace,
            Expr::Member {
                object,
                property: Property::Named(name),
            } => name == namespace && object.is_identifier_path(),
            _ => false,
        }
    }

    fn is_identifier_path(&self) -> bool {
        match self {
            Expr::Identifier(_) => true,
            Expr::Member {
                object,
                property: Property::Named(_),
            } => object.is_identifier_path(),
            _ => false,
        }
    }

    /// Leftmost identifier of a member chain.
    pub fn root_identifier(&self) -> Option<&str> {
        match self {
            Expr::Identifier(name) => Some(name),
            Expr::Member { object, .. } => object.root_identifier(),
            _ => None,
        }
    }

    /// Visits this node and every sub-expression, stopping at the first
    /// `true` returned by `pred`.
    pub fn any(&self, pred: &mut dyn FnMut(&Expr) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match self {
            Expr::Literal(_)
            | Expr::Identifier(_)
            | Expr::This
            | Expr::Column(_)
            | Expr::Constant(_)
            | Expr::OpRef(_) => false,
            Expr::Array(items) => items.iter().any(|e| e.any(pred)),
            Expr::Object(props) => props.iter().any(|p| {
                let key = match &p.key {
                    PropertyKey::Computed(k) => k.any(pred),
                    _ => false,
                };
                key || p.value.any(pred)
            }),
            Expr::Template { exprs, .. } => exprs.iter().any(|e| e.any(pred)),
            Expr::Member { object, property } => {
                object.any(pred)
                    || match property {
                        Property::Computed(key) => key.any(pred),
                        Property::Named(_) => false,
                    }
            }
            Expr::Call { callee, args } | Expr::New { callee, args } => {
                callee.any(pred) || args.iter().any(|a| a.any(pred))
            }
            Expr::Unary { argument, .. } | Expr::Update { argument, .. } => argument.any(pred),
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                left.any(pred) || right.any(pred)
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => test.any(pred) || consequent.any(pred) || alternate.any(pred),
            Expr::Assign { target, value, .. } => target.any(pred) || value.any(pred),
            Expr::OpCall { args, .. } | Expr::FnCall { args, .. } => {
                args.iter().any(|a| a.any(pred))
            }
        }
    }

    /// True if any column accessor occurs in this subtree.
    pub fn reads_row(&self) -> bool {
        self.any(&mut |e| matches!(e, Expr::Column(_)))
    }
}
