//! # Expression Abstract Syntax Tree
//!
//! Node types for expression functions written against a table row, such as
//!
//! ```text
//! d => op.mean(d.price) - d.price
//! ```
//!
//! ## Organization
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes, including the canonical forms the
//!   rewriter and operator extractor introduce
//! - **[operators]** - Unary, binary, logical, update and assignment operators
//! - **[statements]** - Statements of block-bodied functions
//! - **[function]** - The function wrapper (row parameter plus body)
//!
//! ## Lifecycle
//!
//! A tree is created by the [parser](crate::parser), checked by
//! [validate](crate::validate), normalized by [rewrite](crate::rewrite),
//! stripped of operator calls by [extract](crate::extract) and finally
//! serialized by [codegen](crate::codegen). Nothing outlives one compile call.
//!
//! ## Canonical forms
//!
//! | surface syntax                          | canonical node        |
//! |-----------------------------------------|-----------------------|
//! | `d.x`, `d['x']`                         | `Expr::Column("x")`   |
//! | `PI`, `undefined`, ...                  | `Expr::Constant(..)`  |
//! | `mean(x)`, `op.mean(x)`, `w.op.mean(x)` | `Expr::OpCall { .. }` |
//! | extracted aggregate / window call       | `Expr::OpRef(id)`     |
//! | scalar function call                    | `Expr::FnCall { .. }` |
pub mod tokens;
pub mod expressions;
pub mod operators;
pub mod statements;
pub mod function;

pub use tokens::{CompoundOp, Keyword, Token};
pub use expressions::{Constant, Expr, Literal, ObjectProperty, Property, PropertyKey};
pub use operators::{AssignOp, BinOp, LogicalOp, UnaryOp, UpdateOp};
pub use statements::{DeclKind, Stmt, SwitchCase};
pub use function::{Body, Function};
