use crate::pool::with_parser;
use crate::ts::errors::TreeSitterError;
use crate::ts::parser::{collect_error_nodes, ErrorNode};

/// Validate that Python source code has no syntax errors.
///
/// Returns Ok(()) if the code parses without ERROR or MISSING nodes.
pub fn validate_syntax(source: &str) -> Result<(), TreeSitterError> {
    let errors = error_nodes(source)?;
    match errors.len() {
        0 => Ok(()),
        1 => Err(TreeSitterError::SyntaxError {
            line: errors[0].start_point.row,
            column: errors[0].start_point.column,
        }),
        n => Err(TreeSitterError::MultipleSyntaxErrors { count: n }),
    }
}

/// Check whether a patched variant parses with more errors than the original.
///
/// This only reports; whether an unparsable mutant is discarded is left to
/// the caller.
pub fn introduces_errors(original: &str, patched: &str) -> Result<bool, TreeSitterError> {
    let before = error_nodes(original)?.len();
    let after = error_nodes(patched)?.len();
    Ok(after > before)
}

fn error_nodes(source: &str) -> Result<Vec<ErrorNode>, TreeSitterError> {
    let tree = with_parser(|parser| parser.parse(source))??;
    let mut errors = Vec::new();
    collect_error_nodes(tree.root_node(), &mut errors);
    Ok(errors)
}
