//! pymutant: mutation generation for Python sources
//!
//! Parses Python with tree-sitter and runs a catalog of mutation operators
//! over the tree in a single pass. Each operator proposes small,
//! semantics-altering edits; every edit is a [`Mutation`] that can be
//! rendered as patched text or a unified diff.
//!
//! # Architecture
//!
//! All operators compile down to a single primitive: [`Mutation`], the
//! replacement of one line/column span. Intelligence lives in choosing the
//! span and replacement (node dispatch, scope resolution, override
//! analysis), not in applying them.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), pymutant::MutateError> {
//! let source = "def f(a, b):\n    return a + b\n";
//! for mutation in pymutant::mutate(source, &["AOR"], "python")? {
//!     print!("{}", mutation.unified_diff(source, "f.py", "f.py", 3)?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod diff;
pub mod discovery;
pub mod error;
pub mod harness;
pub mod mutation;
pub mod ops;
pub mod overrides;
pub mod pool;
pub mod scope;
pub mod span;
pub mod ts;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, MutateConfig};
pub use discovery::{ModuleFile, ModulePattern};
pub use error::MutateError;
pub use harness::{HarnessError, MutantSupplier, VariantSupplier};
pub use mutation::{Mutation, PatchError};
pub use ops::dispatch::{CallableOperator, HandlerResult, NodeVisitor, VisitorComposition};
pub use ops::{standard_operators, OperatorTag};
pub use scope::ScopePath;
pub use span::{Point, Span};
pub use ts::{Language, NodeKind, NodeRef, SyntaxTree, TreeSitterError};

use pool::with_parser;

/// Mutate `source` with the named operators.
///
/// An empty `ops` list selects the language's standard set. Unknown
/// operator names and unsupported languages are rejected before parsing.
pub fn mutate<S: AsRef<str>>(
    source: &str,
    ops: &[S],
    language: &str,
) -> Result<Vec<Mutation>, MutateError> {
    let language = Language::from_tag(language).ok_or_else(|| MutateError::UnsupportedLanguage {
        tag: language.to_string(),
    })?;
    let ops = if ops.is_empty() {
        standard_operators(language)
    } else {
        ops::parse_operators(ops)?
    };
    mutate_with(source, &ops, language)
}

/// Mutate `source` with already resolved operators.
pub fn mutate_with(
    source: &str,
    ops: &[OperatorTag],
    language: Language,
) -> Result<Vec<Mutation>, MutateError> {
    let tree = match language {
        Language::Python => with_parser(|parser| parser.parse_tree(source))??,
    };
    mutate_tree(&tree, ops)
}

/// Run `ops` over an already parsed tree in one traversal.
///
/// Mutations are returned grouped by operator, in the order of `ops`, and in
/// traversal order within an operator.
pub fn mutate_tree(tree: &SyntaxTree, ops: &[OperatorTag]) -> Result<Vec<Mutation>, MutateError> {
    let composition = ops
        .iter()
        .fold(VisitorComposition::new(), |composition, op| {
            composition.with(op.bind(tree))
        });
    let mutations = composition.run(tree)?;
    tracing::debug!(
        operators = ops.len(),
        nodes = tree.len(),
        mutations = mutations.len(),
        "mutation pass finished"
    );
    Ok(mutations)
}
