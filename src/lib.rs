pub mod ast;
pub mod codegen;
pub mod compile;
pub mod error;
pub mod exprs;
pub mod extract;
pub mod fold;
pub mod host;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod rewrite;
pub mod validate;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{Expr, Function, Stmt, Token};
pub use compile::{CompileOptions, Compiled, Compiler, compile};
pub use error::CompileError;
pub use exprs::{ExprDef, ExprSet};
pub use extract::{OperatorCall, Window};
pub use host::{HostCompiler, SourceText};
pub use lexer::Lexer;
pub use parser::{Parser, parse_function};
pub use registry::OperatorRegistry;
pub use value::Value;
