//! Registry listing for `colexpr operators`

use crate::registry::{OperatorKind, OperatorRegistry};

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

fn arity(min: usize, max: usize) -> String {
    match (min, max) {
        (min, usize::MAX) => format!("{}+ args", min),
        (min, max) if min == max => plural(min, "arg"),
        (min, max) => format!("{}-{} args", min, max),
    }
}

/// Lists every aggregate, window and scalar operator with its shape.
pub fn list_operators(registry: &OperatorRegistry) -> String {
    let mut out = String::new();
    for (title, kind) in [
        ("AGGREGATE OPERATORS", OperatorKind::Aggregate),
        ("WINDOW OPERATORS", OperatorKind::Window),
    ] {
        out.push_str(title);
        out.push('\n');
        for (name, def) in registry.operators().filter(|(_, def)| def.kind == kind) {
            out.push_str(&format!(
                "  {:<20} {}, up to {}\n",
                name,
                plural(def.fields, "field"),
                plural(def.params, "param")
            ));
        }
        out.push('\n');
    }

    out.push_str("SCALAR FUNCTIONS\n");
    for (name, def) in registry.functions() {
        out.push_str(&format!("  {:<20} {}\n", name, arity(def.min_args, def.max_args)));
    }
    out
}
