use crate::error::UnexpectedTokenError;
use crate::lexer::TokenKind;
use crate::syntax::SyntaxTree;

/// Outcome of matching a clause, rule or non-terminal at some position.
///
/// A result can succeed and still carry errors: they describe the furthest
/// failed alternative seen on the way and feed the final error report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxParseResult<K> {
    /// The matched tree; `None` on failure or when a rule did not apply
    pub root: Option<SyntaxTree<K>>,
    /// Index of the first token not consumed by the match
    pub ending_position: usize,
    /// Whether the match consumed all input up to the end-of-input marker
    pub is_ended: bool,
    pub is_error: bool,
    pub errors: Vec<UnexpectedTokenError<K>>,
}

impl<K: TokenKind> SyntaxParseResult<K> {
    #[must_use]
    pub const fn success(root: SyntaxTree<K>, ending_position: usize, is_ended: bool) -> Self {
        Self {
            root: Some(root),
            ending_position,
            is_ended,
            is_error: false,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub const fn failure(errors: Vec<UnexpectedTokenError<K>>, ending_position: usize) -> Self {
        Self {
            root: None,
            ending_position,
            is_ended: false,
            is_error: true,
            errors,
        }
    }

    /// A rule that does not apply at `position`: neither a match nor an error.
    #[must_use]
    pub const fn no_match(position: usize) -> Self {
        Self {
            root: None,
            ending_position: position,
            is_ended: false,
            is_error: false,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_errors(mut self, errors: Vec<UnexpectedTokenError<K>>) -> Self {
        self.errors = errors;
        self
    }

    /// Whether this is a successful match with a tree.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        !self.is_error && self.root.is_some()
    }
}
