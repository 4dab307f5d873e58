//! Unified diff rendering between an original source and a mutant.

use similar::TextDiff;

/// Default number of context lines around each hunk.
pub const DEFAULT_CONTEXT: usize = 3;

/// Render a unified diff with `--- from` / `+++ to` headers.
///
/// Identical inputs produce an empty string.
pub fn unified_diff(
    original: &str,
    patched: &str,
    from_file: &str,
    to_file: &str,
    context: usize,
) -> String {
    TextDiff::from_lines(original, patched)
        .unified_diff()
        .context_radius(context)
        .header(from_file, to_file)
        .to_string()
}
