//! Batch compilation driver.
//!
//! Each named expression runs through parse, validate, rewrite, extract and
//! code generation; the operator list is shared across the batch so ids are
//! assigned in first-occurrence order. Any failure aborts the whole batch.

use indexmap::IndexMap;
use log::debug;

use crate::{
    codegen,
    error::CompileError,
    exprs::{ExprDef, ExprSet},
    extract::{self, OperatorCall, Window},
    host::{HostCompiler, SourceText},
    parser, rewrite,
    registry::OperatorRegistry,
    validate,
};

/// Compiler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Identifier through which expressions reach operators, as in
    /// `op.mean(d.x)`
    pub namespace: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            namespace: "op".to_string(),
        }
    }
}

/// Result of compiling a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled<T = String> {
    /// Operators to evaluate once, in id order, before any value
    pub ops: Vec<OperatorCall>,
    /// Compiled value per expression name, in input order
    pub values: IndexMap<String, T>,
}

/// Expression compiler bound to a registry and a host compiler.
///
/// ```
/// use colexpr::{Compiler, ExprSet};
///
/// let exprs = ExprSet::new()
///     .with("centered", "d => d.value - op.mean(d.value)");
/// let compiled = Compiler::new().compile(&exprs).unwrap();
///
/// assert_eq!(compiled.ops[0].name, "mean");
/// assert_eq!(
///     compiled.values["centered"],
///     "(row,data,op)=>(data.value.get(row)-op[0])"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Compiler<H = SourceText> {
    registry: OperatorRegistry,
    host: H,
    options: CompileOptions,
}

impl Default for Compiler<SourceText> {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler<SourceText> {
    pub fn new() -> Self {
        Compiler {
            registry: OperatorRegistry::standard(),
            host: SourceText,
            options: CompileOptions::default(),
        }
    }
}

impl<H: HostCompiler> Compiler<H> {
    pub fn with_registry(mut self, registry: OperatorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_host<G: HostCompiler>(self, host: G) -> Compiler<G> {
        Compiler {
            registry: self.registry,
            host,
            options: self.options,
        }
    }

    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compiles every expression of the batch.
    pub fn compile(&self, exprs: &ExprSet) -> Result<Compiled<H::Output>, CompileError> {
        let mut ops = Vec::new();
        let mut values = IndexMap::with_capacity(exprs.len());

        for (name, def) in exprs.iter() {
            let value = self
                .compile_one(def, &mut ops)
                .map_err(|e| e.in_expression(name))?;
            values.insert(name.to_string(), value);
        }

        debug!(
            "compiled {} expression(s) with {} operator(s)",
            values.len(),
            ops.len()
        );
        Ok(Compiled { ops, values })
    }

    /// Parses and validates every expression without generating code.
    pub fn check(&self, exprs: &ExprSet) -> Result<(), CompileError> {
        for (name, def) in exprs.iter() {
            def.check_frame()
                .and_then(|_| self.check_source(def.function()))
                .map_err(|e| e.in_expression(name))?;
        }
        Ok(())
    }

    /// Parses and validates a single function source.
    pub fn check_source(&self, source: &str) -> Result<(), CompileError> {
        validate::check_source(source, &self.options.namespace)
    }

    /// Generates the function body for one definition, appending its
    /// operators to `ops`.
    fn generate(&self, def: &ExprDef, ops: &mut Vec<OperatorCall>) -> Result<String, CompileError> {
        def.check_frame()?;
        let namespace = self.options.namespace.as_str();

        let function = parser::parse_function(def.function())?;
        validate::validate(&function, namespace)?;
        let function = rewrite::rewrite(function, namespace);

        let window = def.window().map(|(frame, peers)| Window { frame, peers });
        let function = extract::extract(function, &self.registry, window, ops)?;
        Ok(codegen::generate_body(&function.body))
    }

    fn compile_one(
        &self,
        def: &ExprDef,
        ops: &mut Vec<OperatorCall>,
    ) -> Result<H::Output, CompileError> {
        let first_op = ops.len();
        let body = self.generate(def, ops)?;
        debug!(
            "generated {} (operators {}..{})",
            body,
            first_op,
            ops.len()
        );
        self.host.compile(&codegen::PARAMS, &body)
    }
}

/// Compiles a batch with the standard registry and the identity host.
pub fn compile(exprs: &ExprSet) -> Result<Compiled, CompileError> {
    Compiler::new().compile(exprs)
}
