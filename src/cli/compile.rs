//! Compile expression batches given as JSON

use log::debug;

use crate::Compiler;

use super::{CliError, compiled_to_json, json_to_exprs};

/// Options for the compile command
#[derive(Debug, Clone, Default)]
pub struct CompileRequest {
    /// JSON object of named expression definitions
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Only parse and validate, don't generate code
    pub check_only: bool,
}

/// Result of a compile operation
#[derive(Debug)]
pub enum CompileResult {
    /// Every expression parsed and validated
    Valid(usize),
    /// Compiled `{ops, values}` output, and its text as requested
    Success {
        json: serde_json::Value,
        text: String,
    },
}

/// Execute a colexpr compile operation
pub fn execute_compile(request: &CompileRequest) -> Result<CompileResult, CliError> {
    let json_str = request.input.as_ref().ok_or(CliError::NoInput)?;
    let json_value: serde_json::Value = serde_json::from_str(json_str).map_err(CliError::Json)?;
    let exprs = json_to_exprs(json_value)?;
    debug!("read {} expression definition(s)", exprs.len());

    let compiler = Compiler::new();
    if request.check_only {
        compiler.check(&exprs)?;
        return Ok(CompileResult::Valid(exprs.len()));
    }

    let compiled = compiler.compile(&exprs)?;
    let json = compiled_to_json(compiled);
    let text = if request.pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    }?;
    Ok(CompileResult::Success { json, text })
}
