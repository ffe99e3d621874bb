//! Source location tracking
//!
//! Positions and spans attached to tokens and diagnostics, plus a
//! `SourceMap` that renders cargo-style excerpts for error reports.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based, in characters)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Offset 0, line 1, column 1
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Advance position past one character
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            },
            _ => Self {
                offset: self.offset + ch.len_utf8(),
                line: self.line,
                column: self.column + 1,
            },
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start (inclusive) to end (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Zero-width span at a position
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Merge two spans into one covering both
    pub fn merge(self, other: Self) -> Self {
        let start = if self.start.offset < other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset > other.end.offset {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Get the source text for this span from the input
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start.offset..self.end.offset]
    }

    /// Placeholder span for synthesized values
    pub fn dummy() -> Self {
        Self::point(Position::start())
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Line index over one compilation unit for excerpt rendering
#[derive(Debug, Clone)]
pub struct SourceMap {
    /// Label printed in the `-->` line; empty for anonymous text
    pub name: String,
    pub source: String,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: String) -> Self {
        Self::named("", source)
    }

    pub fn named(name: impl Into<String>, source: String) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                source
                    .char_indices()
                    .filter(|&(_, ch)| ch == '\n')
                    .map(|(offset, _)| offset + 1),
            )
            .collect();
        Self {
            name: name.into(),
            source,
            line_starts,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get a line of text by line number (1-based)
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        let line_idx = (line_num as usize).checked_sub(1)?;
        let start = *self.line_starts.get(line_idx)?;
        let end = self
            .line_starts
            .get(line_idx + 1)
            .map(|next| next - 1)
            .unwrap_or(self.source.len());

        Some(self.source[start..end].trim_end_matches('\r'))
    }

    /// Format a message with the offending line and a caret underline
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let mut out = format!("error: {}\n", message);
        if self.name.is_empty() {
            out.push_str(&format!("  --> {}\n", span.start));
        } else {
            out.push_str(&format!("  --> {}:{}\n", self.name, span.start));
        }

        let Some(text) = self.get_line(span.start.line) else {
            return out;
        };

        let gutter = span.start.line.to_string();
        let pad = " ".repeat(gutter.len());
        let indent = span.start.column.saturating_sub(1) as usize;
        let width = if span.start.line == span.end.line {
            span.end.column.saturating_sub(span.start.column) as usize
        } else {
            // Multi-line spans underline to the end of the first line
            text.chars().count().saturating_sub(indent)
        };

        out.push_str(&format!("{} |\n", pad));
        out.push_str(&format!("{} | {}\n", gutter, text));
        out.push_str(&format!("{} | {}{}\n", pad, " ".repeat(indent), "^".repeat(width.max(1))));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance_tracks_lines() {
        let pos = Position::start().advance('a').advance('\n').advance('b');
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 2);
        assert_eq!(pos.offset, 3);
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(Position::new(0, 1, 1), Position::new(3, 1, 4));
        let b = Span::new(Position::new(5, 1, 6), Position::new(9, 1, 10));
        let merged = a.merge(b);
        assert_eq!(merged.start.offset, 0);
        assert_eq!(merged.end.offset, 9);
        assert_eq!(merged.slice("Para prog {"), "Para prog");
    }

    #[test]
    fn test_source_map_lines() {
        let map = SourceMap::new("Para p {\nEl x Puntual;\n}".to_string());
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.get_line(2), Some("El x Puntual;"));
        assert_eq!(map.get_line(0), None);
        assert_eq!(map.get_line(4), None);
    }

    #[test]
    fn test_format_error_underlines_span() {
        let map = SourceMap::new("El x Puntual;\nx Dice 5;".to_string());
        let span = Span::new(Position::new(14, 2, 1), Position::new(15, 2, 2));
        let rendered = map.format_error(&span, "undeclared identifier 'x'");

        assert!(rendered.starts_with("error: undeclared identifier 'x'"));
        assert!(rendered.contains("--> 2:1"));
        assert!(rendered.contains("2 | x Dice 5;"));
        assert!(rendered.contains("  | ^\n"));
    }

    #[test]
    fn test_named_map_labels_location() {
        let map = SourceMap::named("prog.txt", "Para p {\nEl x Puntual\n} Fin".to_string());
        let span = Span::new(Position::new(11, 2, 3), Position::new(12, 2, 4));
        let rendered = map.format_error(&span, "expected ';'");

        assert!(rendered.contains("--> prog.txt:2:3"));
        assert!(rendered.contains("  |   ^\n"));
    }

    #[test]
    fn test_span_past_last_line_has_no_excerpt() {
        let map = SourceMap::new("Fin".to_string());
        let span = Span::point(Position::new(40, 9, 1));
        let rendered = map.format_error(&span, "unexpected end of input");
        assert!(!rendered.contains('|'));
    }
}
