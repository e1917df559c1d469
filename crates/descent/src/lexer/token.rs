use compact_str::CompactString;
use std::fmt;
use std::hash::Hash;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Identity of a token.
///
/// Implemented by the consumer's token enum. `EOF` names the end-of-input
/// marker the lexer appends after the last real token; `from_name` lets rule
/// notation such as `"list : LBRACKET value* RBRACKET"` resolve terminal names.
///
/// # Example
///
/// ```rust
/// use descent::lexer::TokenKind;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Calc {
///     Int,
///     Plus,
///     Eof,
/// }
///
/// impl TokenKind for Calc {
///     const EOF: Self = Self::Eof;
///
///     fn from_name(name: &str) -> Option<Self> {
///         match name {
///             "INT" => Some(Self::Int),
///             "PLUS" => Some(Self::Plus),
///             _ => None,
///         }
///     }
/// }
///
/// assert_eq!(Calc::from_name("PLUS"), Some(Calc::Plus));
/// ```
pub trait TokenKind: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// The end-of-input marker.
    const EOF: Self;

    /// Resolve a terminal name used in rule notation.
    fn from_name(name: &str) -> Option<Self>;
}

/// Location of a token in the source text.
///
/// `line` and `column` are zero-based; `offset` is a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: u32, column: u32, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line + 1, self.column + 1)
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Token<K> {
    /// The token's identity
    pub kind: K,
    /// The matched source text (empty for the end-of-input marker)
    pub text: CompactString,
    /// Where the match starts
    pub position: Position,
}

impl<K: TokenKind> Token<K> {
    #[must_use]
    pub fn new(kind: K, text: impl Into<CompactString>, position: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    /// The end-of-input marker placed at `position`.
    #[must_use]
    pub fn eof(position: Position) -> Self {
        Self {
            kind: K::EOF,
            text: CompactString::default(),
            position,
        }
    }

    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.kind == K::EOF
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text with one pair of surrounding quotes removed, if present.
    ///
    /// Both `"..."` and `'...'` are recognized.
    #[must_use]
    pub fn unquoted(&self) -> &str {
        let text = self.text.as_str();
        for quote in ['"', '\''] {
            if text.len() >= 2
                && let Some(inner) = text
                    .strip_prefix(quote)
                    .and_then(|rest| rest.strip_suffix(quote))
            {
                return inner;
            }
        }
        text
    }

    /// Position immediately after this token's text, on the same line.
    #[must_use]
    pub fn end_position(&self) -> Position {
        let columns = u32::try_from(self.text.chars().count()).unwrap_or(u32::MAX);
        Position {
            line: self.position.line,
            column: self.position.column.saturating_add(columns),
            offset: self.position.offset + self.text.len(),
        }
    }
}

impl<K: TokenKind> fmt::Display for Token<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_eof() {
            write!(f, "end of input")
        } else {
            write!(f, "'{}' ({:?})", self.text, self.kind)
        }
    }
}
