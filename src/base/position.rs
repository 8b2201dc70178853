/// Position tracking for syntax nodes
///
/// Lines are 1-based (matching what PHP tooling reports), columns are
/// 0-based byte columns.
use text_size::TextSize;

/// A span representing a range in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// A position in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Check if a position falls within this span
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Offset to line/column conversion for one source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::new(offset as u32 + 1));
            }
        }
        Self { line_starts }
    }

    /// 1-based line containing `offset`
    pub fn line(&self, offset: TextSize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact + 1,
            Err(next) => next,
        }
    }

    pub fn position(&self, offset: TextSize) -> Position {
        let line = self.line(offset);
        let start = self.line_starts[line - 1];
        Position::new(line, u32::from(offset - start) as usize)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of_offsets() {
        let index = LineIndex::new("<?php\nclass A {}\n\nfunction b() {}\n");
        assert_eq!(index.line(TextSize::new(0)), 1);
        assert_eq!(index.line(TextSize::new(5)), 1);
        assert_eq!(index.line(TextSize::new(6)), 2);
        assert_eq!(index.line(TextSize::new(17)), 3);
        assert_eq!(index.line(TextSize::new(18)), 4);
    }

    #[test]
    fn test_position_column() {
        let index = LineIndex::new("ab\ncdef");
        assert_eq!(index.position(TextSize::new(5)), Position::new(2, 2));
    }

    #[test]
    fn test_span_contains() {
        let span = Span::new(Position::new(2, 4), Position::new(3, 1));
        assert!(span.contains(Position::new(2, 10)));
        assert!(span.contains(Position::new(3, 1)));
        assert!(!span.contains(Position::new(3, 2)));
        assert!(!span.contains(Position::new(1, 9)));
    }
}
