use crate::diff::unified_diff;
use crate::scope::{scope_path, ScopePath};
use crate::span::{Point, Span, SpanError};
use crate::ts::NodeRef;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The mutation primitive: replace the text of one span.
///
/// Every operator compiles down to this record. Intelligence lives in
/// choosing the span and replacement, not in applying them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[must_use = "Mutation does nothing until applied to a source"]
pub struct Mutation {
    span: Span,
    replacement: String,
    operator: &'static str,
    scope: ScopePath,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("span {span} lies outside a source of {lines} lines")]
    OutOfBounds { span: Span, lines: usize },

    #[error("span {span} does not fall on character boundaries")]
    NotCharBoundary { span: Span },

    #[error("invalid undo span: {0}")]
    Undo(#[from] SpanError),
}

impl Mutation {
    pub fn new(
        span: Span,
        replacement: impl Into<String>,
        operator: &'static str,
        scope: ScopePath,
    ) -> Self {
        Self {
            span,
            replacement: replacement.into(),
            operator,
            scope,
        }
    }

    /// Mutation replacing `node`, scoped by its position in the tree.
    ///
    /// Returns `None` for zero-width nodes, which the parser only produces
    /// while recovering from syntax errors.
    pub fn at_node(
        node: NodeRef<'_>,
        replacement: impl Into<String>,
        operator: &'static str,
    ) -> Option<Self> {
        let span = node.span()?;
        Some(Self::new(span, replacement, operator, scope_path(node)))
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn operator(&self) -> &'static str {
        self.operator
    }

    pub fn scope(&self) -> &ScopePath {
        &self.scope
    }

    /// Stable identifier derived from span, replacement and operator.
    pub fn id(&self) -> u64 {
        let (sl, sc, el, ec) = self.span.as_tuple();
        let key = format!(
            "{}:{sl}:{sc}:{el}:{ec}:{}",
            self.operator, self.replacement
        );
        xxh3_64(key.as_bytes())
    }

    /// Apply to `source`, returning the patched text and an undo mutation.
    ///
    /// Applying the undo mutation to the patched text restores `source`
    /// byte-for-byte. Fails with [`PatchError::Undo`] when the patched text
    /// is empty, since no span can cover the re-insertion point.
    pub fn apply(&self, source: &str) -> Result<(String, Mutation), PatchError> {
        let splice = self.splice(source)?;
        let undo = self.undo(&splice.patched, splice.offset, splice.removed)?;
        Ok((splice.patched, undo))
    }

    /// Patched text only.
    pub fn patched(&self, source: &str) -> Result<String, PatchError> {
        self.splice(source).map(|splice| splice.patched)
    }

    fn splice(&self, source: &str) -> Result<Splice, PatchError> {
        let lines: Vec<&str> = source.split_inclusive('\n').collect();
        let (start_line, start_col, end_line, end_col) = self.span.as_tuple();

        let first = line_at(&lines, start_line).ok_or_else(|| self.out_of_bounds(&lines))?;
        let last = line_at(&lines, end_line).ok_or_else(|| self.out_of_bounds(&lines))?;

        let (Some(head), Some(tail)) = (first.get(..start_col), last.get(end_col..)) else {
            return Err(self.char_boundary_error(&lines, first, last));
        };

        let mut removed = if start_line == end_line {
            first[start_col..end_col].to_string()
        } else {
            first[start_col..].to_string()
        };
        if start_line != end_line {
            removed.extend(lines[start_line + 1..end_line].iter().copied());
            removed.push_str(&last[..end_col]);
        }

        let offset = lines[..start_line].iter().map(|l| l.len()).sum::<usize>() + head.len();
        let mut patched = String::with_capacity(source.len() + self.replacement.len());
        patched.extend(lines[..start_line].iter().copied());
        patched.push_str(head);
        patched.push_str(&self.replacement);
        patched.push_str(tail);
        if end_line + 1 < lines.len() {
            patched.extend(lines[end_line + 1..].iter().copied());
        }

        Ok(Splice {
            patched,
            offset,
            removed,
        })
    }

    /// Unified diff between `source` and its patched variant.
    pub fn unified_diff(
        &self,
        source: &str,
        from_file: &str,
        to_file: &str,
        context: usize,
    ) -> Result<String, PatchError> {
        let patched = self.patched(source)?;
        Ok(unified_diff(source, &patched, from_file, to_file, context))
    }

    /// Undo covering the inserted replacement inside `patched`.
    ///
    /// An empty insertion is widened by one neighbouring character so the
    /// undo span is never zero-width.
    fn undo(&self, patched: &str, start: usize, removed: String) -> Result<Mutation, PatchError> {
        let end = start + self.replacement.len();
        let (from, to, text) = if end > start {
            (start, end, removed)
        } else if let Some(next) = patched[end..].chars().next() {
            (start, end + next.len_utf8(), format!("{removed}{next}"))
        } else if let Some(prev) = patched[..start].chars().next_back() {
            (start - prev.len_utf8(), end, format!("{prev}{removed}"))
        } else {
            (start, end, removed)
        };

        let span = Span::new(point_at(patched, from), point_at(patched, to))?;
        Ok(Mutation::new(span, text, self.operator, self.scope.clone()))
    }

    fn out_of_bounds(&self, lines: &[&str]) -> PatchError {
        PatchError::OutOfBounds {
            span: self.span,
            lines: lines.len(),
        }
    }

    fn char_boundary_error(&self, lines: &[&str], first: &str, last: &str) -> PatchError {
        let (_, start_col, _, end_col) = self.span.as_tuple();
        if start_col > first.len() || end_col > last.len() {
            self.out_of_bounds(lines)
        } else {
            PatchError::NotCharBoundary { span: self.span }
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operator)?;
        if !self.scope.is_empty() {
            write!(f, "@{}", self.scope)?;
        }
        write!(f, "({}) -> {}", self.span, self.replacement)
    }
}

/// Result of splicing a replacement into a source.
struct Splice {
    patched: String,
    /// Byte offset of the replacement in `patched`.
    offset: usize,
    /// Original text the replacement took the place of.
    removed: String,
}

/// Physical line `index`, or an empty virtual line just past the end.
fn line_at<'a>(lines: &[&'a str], index: usize) -> Option<&'a str> {
    match lines.get(index) {
        Some(line) => Some(line),
        None if index == lines.len() => Some(""),
        None => None,
    }
}

fn point_at(text: &str, offset: usize) -> Point {
    Point::new(0, 0).advance(&text[..offset])
}
