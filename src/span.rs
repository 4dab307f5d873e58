//! Line/column source regions.
//!
//! Positions follow the parser's convention: 0-indexed lines, 0-indexed
//! byte columns within the line.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A position in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub line: usize,
    pub column: usize,
}

impl Point {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position reached after writing `text` starting at `self`.
    pub fn advance(self, text: &str) -> Self {
        match text.rfind('\n') {
            Some(last) => Point {
                line: self.line + text.matches('\n').count(),
                column: text.len() - last - 1,
            },
            None => Point {
                line: self.line,
                column: self.column + text.len(),
            },
        }
    }
}

impl From<tree_sitter::Point> for Point {
    fn from(p: tree_sitter::Point) -> Self {
        Point {
            line: p.row,
            column: p.column,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpanError {
    #[error("span start {start} lies after its end {end}")]
    Inverted { start: Point, end: Point },

    #[error("span at {at} is zero-width")]
    ZeroWidth { at: Point },
}

/// Half-open source region `[start, end)`.
///
/// Never inverted and never a zero-width point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Span {
    start: Point,
    end: Point,
}

impl Span {
    pub fn new(start: Point, end: Point) -> Result<Self, SpanError> {
        if start.line > end.line || (start.line == end.line && start.column > end.column) {
            return Err(SpanError::Inverted { start, end });
        }
        if start == end {
            return Err(SpanError::ZeroWidth { at: start });
        }
        Ok(Self { start, end })
    }

    /// Build from `(start_line, start_col, end_line, end_col)`.
    pub fn from_tuple(
        (start_line, start_col, end_line, end_col): (usize, usize, usize, usize),
    ) -> Result<Self, SpanError> {
        Self::new(
            Point::new(start_line, start_col),
            Point::new(end_line, end_col),
        )
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn as_tuple(&self) -> (usize, usize, usize, usize) {
        (
            self.start.line,
            self.start.column,
            self.end.line,
            self.end.column,
        )
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

impl<'de> Deserialize<'de> for Span {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            start: Point,
            end: Point,
        }

        let raw = Raw::deserialize(deserializer)?;
        Span::new(raw.start, raw.end).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_width() {
        let err = Span::from_tuple((2, 4, 2, 4)).unwrap_err();
        assert_eq!(err, SpanError::ZeroWidth { at: Point::new(2, 4) });
    }

    #[test]
    fn rejects_inverted() {
        assert!(matches!(
            Span::from_tuple((3, 0, 2, 9)),
            Err(SpanError::Inverted { .. })
        ));
        assert!(matches!(
            Span::from_tuple((1, 5, 1, 2)),
            Err(SpanError::Inverted { .. })
        ));
    }

    #[test]
    fn multi_line_span_may_end_in_lower_column() {
        let span = Span::from_tuple((1, 8, 3, 0)).unwrap();
        assert_eq!(span.as_tuple(), (1, 8, 3, 0));
    }

    #[test]
    fn advance_over_text() {
        let p = Point::new(2, 4);
        assert_eq!(p.advance("abc"), Point::new(2, 7));
        assert_eq!(p.advance("ab\ncd\nxyz"), Point::new(4, 3));
        assert_eq!(p.advance("ab\n"), Point::new(3, 0));
        assert_eq!(p.advance(""), p);
    }

    #[test]
    fn deserialize_checks_invariant() {
        let ok: Span = serde_json::from_str(
            r#"{"start":{"line":0,"column":1},"end":{"line":0,"column":3}}"#,
        )
        .unwrap();
        assert_eq!(ok.as_tuple(), (0, 1, 0, 3));

        let bad: Result<Span, _> = serde_json::from_str(
            r#"{"start":{"line":0,"column":3},"end":{"line":0,"column":3}}"#,
        );
        assert!(bad.is_err());
    }
}
