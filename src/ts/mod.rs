//! Tree-sitter integration for Python sources.
//!
//! Parses Python with the grammar bundled by ast-grep-language and flattens
//! the result into an immutable index arena the mutation pass walks.

pub mod errors;
pub mod parser;
pub mod tree;
pub mod validator;

pub use errors::TreeSitterError;
pub use parser::{ErrorNode, Language, PythonParser};
pub use tree::{NodeId, NodeKind, NodeRef, SyntaxTree};
pub use validator::{introduces_errors, validate_syntax};
