//! # Error Types
//!
//! Error types produced while building lexers, tokenizing, parsing and reducing.
//!
//! - [`LexerError`]: no token definition matched, an unterminated block
//!   comment, or a token pattern that is not a valid regex
//! - [`UnexpectedTokenError`]: the single syntax error reported for a failed parse
//! - [`ReduceError`]: a reduction function rejected its arguments
//! - [`ParseError`]: any of the above, as surfaced by [`Parser::parse`](crate::Parser::parse)
//!
//! Grammar construction errors live next to the builder, see
//! [`GrammarError`](crate::grammar::GrammarError).
//!
//! ## Diagnostics Support
//!
//! When the `diagnostics` feature is enabled, errors derive `miette::Diagnostic`
//! with stable codes.

pub mod diagnostics;

use crate::lexer::{Position, Token, TokenKind};
use compact_str::CompactString;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Lexer error with location information
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
#[error("{kind} at {position}")]
pub struct LexerError {
    #[cfg_attr(feature = "diagnostics", label)]
    pub position: Position,
    #[source]
    pub kind: LexerErrorKind,
}

impl LexerError {
    #[must_use]
    pub const fn new(position: Position, kind: LexerErrorKind) -> Self {
        Self { position, kind }
    }
}

/// Types of lexer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum LexerErrorKind {
    #[error("unexpected character '{char}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::unexpected_char)))]
    UnexpectedChar { char: char },

    #[error("unterminated comment, expected '{closer}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::unterminated_comment)))]
    UnterminatedComment { closer: CompactString },

    #[error("invalid pattern `{pattern}`: {reason}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::invalid_pattern)))]
    InvalidPattern {
        pattern: CompactString,
        reason: String,
    },
}

impl LexerErrorKind {
    #[must_use]
    pub const fn unexpected_char(char: char) -> Self {
        Self::UnexpectedChar { char }
    }
}

#[cfg(feature = "diagnostics")]
impl From<Position> for miette::SourceSpan {
    fn from(position: Position) -> Self {
        (position.offset, 1).into()
    }
}

/// A token that no rule could accept.
///
/// `expected` is `None` when nothing more was expected at that point (typically
/// trailing input after a complete parse); otherwise it lists the token kinds
/// that would have been accepted, in grammar order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedTokenError<K> {
    pub token: Token<K>,
    pub expected: Option<SmallVec<[K; 4]>>,
}

impl<K: TokenKind> UnexpectedTokenError<K> {
    #[must_use]
    pub const fn new(token: Token<K>, expected: Option<SmallVec<[K; 4]>>) -> Self {
        Self { token, expected }
    }

    /// `token` was found where nothing more was expected.
    #[must_use]
    pub const fn nothing_expected(token: Token<K>) -> Self {
        Self::new(token, None)
    }

    /// `token` was found where exactly `expected` was required.
    #[must_use]
    pub fn expected_one(token: Token<K>, expected: K) -> Self {
        let mut kinds = SmallVec::new();
        kinds.push(expected);
        Self::new(token, Some(kinds))
    }

    /// `token` was found where any of `expected` would have been accepted.
    #[must_use]
    pub fn expected_any(token: Token<K>, expected: impl IntoIterator<Item = K>) -> Self {
        Self::new(token, Some(expected.into_iter().collect()))
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.token.position
    }

    #[must_use]
    pub fn expected(&self) -> &[K] {
        self.expected.as_deref().unwrap_or_default()
    }

    /// Order by how useful the error is to report.
    ///
    /// Later offsets rank higher; at the same offset an error listing more
    /// expected kinds ranks higher than one listing fewer, and any listing ranks
    /// higher than "nothing expected". The greatest error is the one reported.
    #[must_use]
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        self.token
            .position
            .offset
            .cmp(&other.token.position.offset)
            .then_with(|| self.detail_rank().cmp(&other.detail_rank()))
            .then_with(|| self.format_expected().cmp(&other.format_expected()))
    }

    fn detail_rank(&self) -> usize {
        self.expected.as_ref().map_or(0, |kinds| kinds.len() + 1)
    }

    /// Format expected tokens as a human-readable string
    #[must_use]
    pub fn format_expected(&self) -> String {
        let names: Vec<String> = self.expected().iter().map(|kind| format!("{kind:?}")).collect();
        format_expected_list(&names)
    }
}

impl<K: TokenKind> fmt::Display for UnexpectedTokenError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.token.is_eof() {
            write!(f, "unexpected end of input at {}", self.token.position)?;
        } else {
            write!(
                f,
                "unexpected token {} at {}",
                self.token, self.token.position
            )?;
        }
        if !self.expected().is_empty() {
            write!(f, ", expected {}", self.format_expected())?;
        }
        Ok(())
    }
}

impl<K: TokenKind> std::error::Error for UnexpectedTokenError<K> {}

/// Format a list of expected tokens as a human-readable string
#[must_use]
pub fn format_expected_list(expected: &[String]) -> String {
    match expected {
        [] => "nothing".to_string(),
        [one] => one.clone(),
        [first, second] => format!("{first} or {second}"),
        [init @ .., last] => format!("one of {}, or {last}", init.join(", ")),
    }
}

/// A reduction function could not build its value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ReduceError {
    #[error("rule `{rule}` has no argument {index}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reduce::missing_argument)))]
    MissingArgument { rule: CompactString, index: usize },

    #[error("rule `{rule}`: argument {index} is a {found}, not a {expected}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reduce::argument_kind)))]
    ArgumentKind {
        rule: CompactString,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("no rule for node `{name}`")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reduce::unknown_rule)))]
    UnknownRule { name: CompactString },

    #[error("only rule nodes can be reduced, found a {found}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reduce::not_a_node)))]
    NotANode { found: &'static str },

    #[error("{0}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(reduce::custom)))]
    Custom(String),
}

impl ReduceError {
    /// An error raised by a reduction function itself.
    #[must_use]
    pub fn custom(message: impl fmt::Display) -> Self {
        Self::Custom(message.to_string())
    }
}

/// Any failure surfaced by [`Parser::parse`](crate::Parser::parse).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ParseError<K: TokenKind> {
    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::lexical)))]
    Lexical(#[from] LexerError),

    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::unexpected_token)))]
    Syntax(#[from] UnexpectedTokenError<K>),

    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::reduce)))]
    Reduce(#[from] ReduceError),
}

impl<K: TokenKind> ParseError<K> {
    /// Where in the source the error occurred, if it is tied to a location.
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        match self {
            Self::Lexical(error) => Some(error.position),
            Self::Syntax(error) => Some(error.position()),
            Self::Reduce(_) => None,
        }
    }

    #[must_use]
    pub const fn as_syntax(&self) -> Option<&UnexpectedTokenError<K>> {
        match self {
            Self::Syntax(error) => Some(error),
            _ => None,
        }
    }
}

/// Timing and size information for one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseMetrics {
    /// Tokens handed to the engine, end-of-input marker included
    pub tokens: usize,
    pub parse_time: Duration,
}

/// Outcome of [`Parser::parse`](crate::Parser::parse).
///
/// Exactly one of `result` and `errors` is populated: a successful parse holds
/// the reduced value, a failed one holds a single error.
#[derive(Debug, Clone)]
pub struct ParseResult<K: TokenKind, V> {
    pub result: Option<V>,
    pub errors: Vec<ParseError<K>>,
    pub metrics: ParseMetrics,
}

impl<K: TokenKind, V> ParseResult<K, V> {
    #[must_use]
    pub fn success(value: V, metrics: ParseMetrics) -> Self {
        Self {
            result: Some(value),
            errors: Vec::new(),
            metrics,
        }
    }

    #[must_use]
    pub fn failure(error: impl Into<ParseError<K>>, metrics: ParseMetrics) -> Self {
        Self {
            result: None,
            errors: vec![error.into()],
            metrics,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty() && self.result.is_some()
    }

    /// Convert into a `Result`, keeping the errors on failure.
    ///
    /// # Errors
    ///
    /// Returns the collected errors when parsing failed.
    pub fn into_result(self) -> Result<V, Vec<ParseError<K>>> {
        match self.result {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(self.errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        A,
        B,
        C,
        Eof,
    }

    impl TokenKind for Kind {
        const EOF: Self = Self::Eof;

        fn from_name(_: &str) -> Option<Self> {
            None
        }
    }

    fn token_at(offset: usize) -> Token<Kind> {
        Token::new(Kind::A, "a", Position::new(0, u32::try_from(offset).unwrap(), offset))
    }

    #[test]
    fn test_format_expected_list() {
        assert_eq!(format_expected_list(&[]), "nothing");
        assert_eq!(format_expected_list(&["A".into()]), "A");
        assert_eq!(format_expected_list(&["A".into(), "B".into()]), "A or B");
        assert_eq!(
            format_expected_list(&["A".into(), "B".into(), "C".into()]),
            "one of A, B, or C"
        );
    }

    #[test]
    fn test_later_offset_ranks_higher() {
        let near = UnexpectedTokenError::expected_any(token_at(0), [Kind::A, Kind::B, Kind::C]);
        let far = UnexpectedTokenError::nothing_expected(token_at(3));
        assert_eq!(near.priority_cmp(&far), Ordering::Less);
    }

    #[test]
    fn test_richer_detail_ranks_higher_at_same_offset() {
        let nothing = UnexpectedTokenError::nothing_expected(token_at(2));
        let one = UnexpectedTokenError::expected_one(token_at(2), Kind::B);
        let many = UnexpectedTokenError::expected_any(token_at(2), [Kind::B, Kind::C]);

        let mut errors = vec![many.clone(), nothing, one];
        errors.sort_by(UnexpectedTokenError::priority_cmp);
        assert_eq!(errors.last(), Some(&many));
    }

    #[test]
    fn test_display() {
        let error = UnexpectedTokenError::expected_one(token_at(1), Kind::B);
        assert_eq!(
            error.to_string(),
            "unexpected token 'a' (A) at line 1, column 2, expected B"
        );

        let eof = UnexpectedTokenError::expected_any(
            Token::eof(Position::new(1, 0, 4)),
            [Kind::B, Kind::C],
        );
        assert_eq!(
            eof.to_string(),
            "unexpected end of input at line 2, column 1, expected B or C"
        );
    }

    #[test]
    fn test_parse_result_into_result() {
        let ok: ParseResult<Kind, u32> = ParseResult::success(7, ParseMetrics::default());
        assert!(ok.is_ok());
        assert_eq!(ok.into_result(), Ok(7));

        let failed: ParseResult<Kind, u32> = ParseResult::failure(
            ReduceError::custom("boom"),
            ParseMetrics::default(),
        );
        assert!(failed.is_error());
        let errors = failed.into_result().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].position(), None);
    }
}
