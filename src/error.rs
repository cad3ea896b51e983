//! Error taxonomy shared by every compile stage.
//!
//! Failures are raised at the point of detection and abort the whole batch.
//! The driver wraps them in [`CompileError::InExpression`] so callers can
//! report which named expression was at fault.

/// Errors that can occur while compiling an expression batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// Source text does not parse under the expression grammar
    #[error("Syntax error at position {position}: {message}")]
    Syntax { message: String, position: usize },

    /// A forbidden construct was found by the static validator
    #[error("Invalid expression: {0}")]
    Validation(String),

    /// An identifier does not resolve to anything in scope
    #[error("Reference error: {0}")]
    Reference(String),

    /// A field or parameter argument of an operator call is not acceptable
    #[error("Invalid operator argument: {0}")]
    Parameter(String),

    /// The operator name is not present in the registry
    #[error("Unrecognized operator: {0}")]
    OperatorUnknown(String),

    /// The host compiler rejected generated source
    #[error("Host compiler error: {0}")]
    Host(String),

    /// Any of the above, attributed to a named expression of the batch
    #[error("In expression '{name}': {source}")]
    InExpression {
        name: String,
        #[source]
        source: Box<CompileError>,
    },
}

impl CompileError {
    pub(crate) fn syntax(message: impl Into<String>, position: usize) -> Self {
        CompileError::Syntax {
            message: message.into(),
            position,
        }
    }

    /// Attributes the error to the named expression.
    pub fn in_expression(self, name: &str) -> Self {
        match self {
            CompileError::InExpression { .. } => self,
            other => CompileError::InExpression {
                name: name.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying error with any expression attribution removed.
    pub fn root(&self) -> &CompileError {
        match self {
            CompileError::InExpression { source, .. } => source.root(),
            other => other,
        }
    }

    /// Name of the expression the error was raised in, if attributed.
    pub fn expression(&self) -> Option<&str> {
        match self {
            CompileError::InExpression { name, .. } => Some(name),
            _ => None,
        }
    }
}
