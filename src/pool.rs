//! Per-thread Python parser.
//!
//! Setting the Python grammar on a tree-sitter parser is the expensive part
//! of parsing a small module, so each thread keeps one `PythonParser` around
//! and hands it to every parse on that thread. Discovery can then fan module
//! files out over threads without any locking.

use crate::ts::{PythonParser, TreeSitterError};
use std::cell::RefCell;

thread_local! {
    static PYTHON_PARSER: RefCell<Option<PythonParser>> = const { RefCell::new(None) };
}

/// Run `f` with this thread's Python parser, building it on first use.
///
/// Only grammar setup can fail; whatever `f` returns is passed through, so
/// parse calls end up as `with_parser(..)??`.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use pymutant::pool::with_parser;
///
/// let tree = with_parser(|parser| parser.parse_tree("import os\n"))??;
/// assert_eq!(tree.root().text(), "import os\n");
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(f: F) -> Result<R, TreeSitterError>
where
    F: FnOnce(&mut PythonParser) -> R,
{
    PYTHON_PARSER.with(|cell| {
        // The parser is out of the slot while `f` runs; nested calls build
        // their own.
        let taken = cell.borrow_mut().take();
        let mut parser = match taken {
            Some(parser) => parser,
            None => PythonParser::new()?,
        };
        let result = f(&mut parser);
        *cell.borrow_mut() = Some(parser);
        Ok(result)
    })
}
