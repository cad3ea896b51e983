//! Host compilers turn generated source into the caller's executable form.

use crate::error::CompileError;

/// Compiles a generated function, given its parameter names and body.
pub trait HostCompiler {
    type Output;

    fn compile(&self, params: &[&str], body: &str) -> Result<Self::Output, CompileError>;
}

/// Identity host: yields the complete function source.
///
/// ```
/// use colexpr::host::{HostCompiler, SourceText};
///
/// let source = SourceText.compile(&["row", "data", "op"], "(1+1)").unwrap();
/// assert_eq!(source, "(row,data,op)=>(1+1)");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceText;

impl HostCompiler for SourceText {
    type Output = String;

    fn compile(&self, params: &[&str], body: &str) -> Result<String, CompileError> {
        Ok(format!("({})=>{}", params.join(","), body))
    }
}

impl<F, T> HostCompiler for F
where
    F: Fn(&[&str], &str) -> Result<T, CompileError>,
{
    type Output = T;

    fn compile(&self, params: &[&str], body: &str) -> Result<T, CompileError> {
        self(params, body)
    }
}
