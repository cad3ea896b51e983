use indexmap::IndexMap;

use crate::error::CompileError;

/// Frame used by window-wrapped definitions that omit one: every preceding
/// row up to the current row.
pub const DEFAULT_FRAME: [f64; 2] = [f64::NEG_INFINITY, 0.0];

/// Peer inclusion used by window-wrapped definitions that omit it.
pub const DEFAULT_PEERS: bool = true;

/// Source definition of one named expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprDef {
    /// Plain function source, e.g. `d => d.a * 2`
    Source(String),

    /// Function evaluated over a sliding window of rows
    Window {
        function: String,
        /// `[preceding, following]`; infinite bounds are unbounded
        frame: [f64; 2],
        peers: bool,
    },
}

impl ExprDef {
    pub fn function(&self) -> &str {
        match self {
            ExprDef::Source(source) => source,
            ExprDef::Window { function, .. } => function,
        }
    }

    /// Frame and peers, when window-wrapped.
    pub fn window(&self) -> Option<([f64; 2], bool)> {
        match self {
            ExprDef::Source(_) => None,
            ExprDef::Window { frame, peers, .. } => Some((*frame, *peers)),
        }
    }

    /// Frame bounds must be numbers (possibly infinite) with
    /// preceding <= 0 <= following.
    pub fn check_frame(&self) -> Result<(), CompileError> {
        let Some(([preceding, following], _)) = self.window() else {
            return Ok(());
        };
        if preceding.is_nan() || following.is_nan() {
            return Err(CompileError::Validation(
                "window frame bounds must be numbers".into(),
            ));
        }
        if preceding > 0.0 || following < 0.0 {
            return Err(CompileError::Validation(format!(
                "window frame [{}, {}] must contain the current row",
                crate::value::format_number(preceding),
                crate::value::format_number(following)
            )));
        }
        Ok(())
    }
}

impl From<&str> for ExprDef {
    fn from(source: &str) -> Self {
        ExprDef::Source(source.to_string())
    }
}

impl From<String> for ExprDef {
    fn from(source: String) -> Self {
        ExprDef::Source(source)
    }
}

/// Window-wrapped definition with explicit frame and default peers.
///
/// ```
/// use colexpr::exprs::{ExprDef, rolling};
///
/// let def = rolling("d => op.mean(d.value)", [-3.0, 3.0]);
/// assert_eq!(def.window(), Some(([-3.0, 3.0], true)));
/// ```
pub fn rolling(function: &str, frame: [f64; 2]) -> ExprDef {
    ExprDef::Window {
        function: function.to_string(),
        frame,
        peers: DEFAULT_PEERS,
    }
}

/// Window-wrapped definition with the default frame and peers.
pub fn window(function: &str) -> ExprDef {
    rolling(function, DEFAULT_FRAME)
}

/// Ordered mapping of expression names to definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExprSet {
    defs: IndexMap<String, ExprDef>,
}

impl ExprSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a definition, replacing any earlier one of the same name while
    /// keeping its position.
    pub fn insert(&mut self, name: impl Into<String>, def: impl Into<ExprDef>) -> &mut Self {
        self.defs.insert(name.into(), def.into());
        self
    }

    pub fn with(mut self, name: impl Into<String>, def: impl Into<ExprDef>) -> Self {
        self.insert(name, def);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ExprDef> {
        self.defs.get(name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExprDef)> {
        self.defs.iter().map(|(name, def)| (name.as_str(), def))
    }
}

impl<K: Into<String>, V: Into<ExprDef>> FromIterator<(K, V)> for ExprSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ExprSet::new();
        for (name, def) in iter {
            set.insert(name, def);
        }
        set
    }
}
