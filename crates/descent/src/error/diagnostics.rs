//! # Diagnostic Utilities
//!
//! Renders an error together with the offending source line and a caret
//! under the reported column:
//!
//! ```text
//! unexpected token 'b' (B) at line 1, column 2, expected A
//!   |
//! 1 | ab c
//!   |  ^
//! ```

use crate::error::ParseError;
use crate::lexer::{Position, TokenKind};

/// The full text of the line containing `position`, without its line terminator.
#[must_use]
pub fn extract_line(source: &str, position: Position) -> Option<&str> {
    let offset = position.offset.min(source.len());
    if !source.is_char_boundary(offset) {
        return None;
    }
    let start = memchr::memrchr(b'\n', &source.as_bytes()[..offset]).map_or(0, |p| p + 1);
    let end = memchr::memchr(b'\n', &source.as_bytes()[offset..])
        .map_or(source.len(), |p| offset + p);
    Some(source[start..end].trim_end_matches('\r'))
}

/// Format an error with its source line and a caret marking the column.
///
/// Errors without a location render as their plain message.
#[must_use]
pub fn format_error_with_context<K: TokenKind>(error: &ParseError<K>, source: &str) -> String {
    let mut result = error.to_string();

    if let Some(position) = error.position()
        && let Some(line) = extract_line(source, position)
    {
        let number = (position.line + 1).to_string();
        let gutter = " ".repeat(number.len());
        let caret = " ".repeat(usize::try_from(position.column).unwrap_or(0));
        result.push_str(&format!(
            "\n{gutter} |\n{number} | {line}\n{gutter} | {caret}^"
        ));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LexerError, LexerErrorKind};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Eof,
    }

    impl TokenKind for Kind {
        const EOF: Self = Self::Eof;

        fn from_name(_: &str) -> Option<Self> {
            None
        }
    }

    #[test]
    fn test_extract_line() {
        let source = "first\nsecond line\r\nthird";
        assert_eq!(extract_line(source, Position::new(0, 2, 2)), Some("first"));
        assert_eq!(extract_line(source, Position::new(1, 3, 9)), Some("second line"));
        assert_eq!(extract_line(source, Position::new(2, 0, 20)), Some("third"));
        assert_eq!(extract_line(source, Position::new(2, 5, 25)), Some("third"));
    }

    #[test]
    fn test_format_error_with_context() {
        let source = "let x\nlet ?y";
        let error: ParseError<Kind> = LexerError::new(
            Position::new(1, 4, 10),
            LexerErrorKind::unexpected_char('?'),
        )
        .into();

        let rendered = format_error_with_context(&error, source);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "unexpected character '?' at line 2, column 5");
        assert_eq!(lines[2], "2 | let ?y");
        assert_eq!(lines[3], "  |     ^");
    }

    #[test]
    fn test_unlocated_error_renders_plain_message() {
        let error: ParseError<Kind> = crate::error::ReduceError::custom("bad literal").into();
        assert_eq!(format_error_with_context(&error, "anything"), "bad literal");
    }
}
