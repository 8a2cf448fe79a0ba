use std::fmt;

use serde::Serialize;

/// Source location of a syntax node, with 1-indexed line/column and byte offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Span {
    /// 1-indexed line number within the file.
    pub line: u32,
    /// 1-indexed column number (in characters, not bytes).
    pub column: u32,
    /// Byte offset of the first character of the node.
    pub byte_start: usize,
    /// Byte offset one past the last character of the node.
    pub byte_end: usize,
}

impl Span {
    /// Creates a span from pre-computed line, column, and byte offsets.
    #[must_use]
    pub const fn new(line: u32, column: u32, byte_start: usize, byte_end: usize) -> Self {
        Self {
            line,
            column,
            byte_start,
            byte_end,
        }
    }

    /// Builds a span from a zero-based row and byte column, as reported by
    /// the parser, converting the column to a character count.
    ///
    /// Falls back to the byte column when the offsets do not fall on UTF-8
    /// character boundaries.
    #[must_use]
    pub fn from_position(content: &str, row: usize, byte_column: usize, byte_start: usize, byte_end: usize) -> Self {
        let line_start = byte_start.saturating_sub(byte_column);
        let column = content
            .get(line_start..byte_start)
            .map_or(byte_column, |prefix| prefix.chars().count());

        Self::new(saturating_u32(row + 1), saturating_u32(column + 1), byte_start, byte_end)
    }

    /// Returns the byte length of the spanned region.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.byte_end - self.byte_start
    }

    /// Returns `true` if the span covers zero bytes.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.byte_start == self.byte_end
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_position_converts_zero_based_row() {
        let span = Span::from_position("aes.NewCipher(key)", 0, 0, 0, 3);
        assert_eq!((span.line, span.column), (1, 1));
    }

    #[test]
    fn from_position_on_later_line_keeps_byte_offsets() {
        let content = "package main\nvar x = 1";
        let span = Span::from_position(content, 1, 4, 17, 18);
        assert_eq!((span.line, span.column), (2, 5));
        assert_eq!((span.byte_start, span.byte_end), (17, 18));
    }

    #[test]
    fn from_position_counts_characters_not_bytes_for_column() {
        let content = "é := 16";
        let span = Span::from_position(content, 0, 6, 6, 8);
        assert_eq!(span.column, 6);
    }

    #[test]
    fn from_position_falls_back_to_byte_column_off_boundary() {
        let content = "é";
        let span = Span::from_position(content, 0, 1, 1, 2);
        assert_eq!(span.column, 2);
    }

    #[test]
    fn len_and_is_empty_follow_byte_offsets() {
        assert_eq!(Span::new(1, 1, 10, 25).len(), 15);
        assert!(Span::new(1, 1, 5, 5).is_empty());
    }

    #[test]
    fn display_formats_as_line_colon_column() {
        assert_eq!(Span::new(42, 13, 0, 10).to_string(), "42:13");
    }

    #[test]
    fn spans_order_by_position() {
        assert!(Span::new(1, 9, 8, 9) < Span::new(2, 1, 10, 11));
    }
}
