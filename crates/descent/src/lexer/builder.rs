use crate::error::{LexerError, LexerErrorKind};
use crate::lexer::regex_lexer::{CompiledDefinition, CompiledLexer};
use crate::lexer::{Position, TokenKind};
use compact_str::CompactString;
use regex::Regex;
use smallvec::SmallVec;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// One entry of the token vocabulary.
///
/// Definitions are tried in declaration order; the first whose pattern matches
/// at the current position wins.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TokenDefinition<K> {
    pub kind: K,
    /// Regex source, matched anchored at the current position
    pub pattern: CompactString,
    /// Recognized and then dropped (whitespace and the like)
    pub discard: bool,
    /// Dropped and counted as a line break
    pub line_break: bool,
}

impl<K> TokenDefinition<K> {
    #[must_use]
    pub fn new(kind: K, pattern: impl Into<CompactString>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
            discard: false,
            line_break: false,
        }
    }

    /// Whether tokens of this definition are left out of the token sequence.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        self.discard || self.line_break
    }
}

/// Comment delimiters. Comments are skipped like whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CommentDefinition {
    /// Opens a comment running to the end of the line, e.g. `//`
    pub single_line: Option<CompactString>,
    /// Opener and closer of a block comment, e.g. `/*` and `*/`
    pub multi_line: Option<(CompactString, CompactString)>,
}

impl CommentDefinition {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn single_line(mut self, opener: impl Into<CompactString>) -> Self {
        self.single_line = Some(opener.into());
        self
    }

    #[must_use]
    pub fn multi_line(
        mut self,
        opener: impl Into<CompactString>,
        closer: impl Into<CompactString>,
    ) -> Self {
        self.multi_line = Some((opener.into(), closer.into()));
        self
    }

    /// The usual `//` and `/* */` pair.
    #[must_use]
    pub fn c_style() -> Self {
        Self::new().single_line("//").multi_line("/*", "*/")
    }
}

/// Builds a [`CompiledLexer`] from an ordered token vocabulary.
///
/// # Example
///
/// ```rust
/// use descent::lexer::{LexerBuilder, TokenKind};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Kind { Int, Plus, Ws, Eof }
///
/// impl TokenKind for Kind {
///     const EOF: Self = Self::Eof;
///     fn from_name(_: &str) -> Option<Self> { None }
/// }
///
/// let lexer = LexerBuilder::new()
///     .token(Kind::Int, r"[0-9]+")
///     .token(Kind::Plus, r"\+")
///     .discard(Kind::Ws, r"[ \t]+")
///     .build()?;
///
/// let tokens = lexer.tokenize("1 + 22")?;
/// assert_eq!(tokens.len(), 4);
/// # Ok::<(), descent::LexerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LexerBuilder<K> {
    definitions: SmallVec<[TokenDefinition<K>; 16]>,
    comments: Option<CommentDefinition>,
}

impl<K: TokenKind> Default for LexerBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TokenKind> LexerBuilder<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            definitions: SmallVec::new(),
            comments: None,
        }
    }

    /// Add a token that reaches the parser.
    #[must_use]
    pub fn token(self, kind: K, pattern: impl Into<CompactString>) -> Self {
        self.definition(TokenDefinition::new(kind, pattern))
    }

    /// Add a token that is recognized and dropped.
    #[must_use]
    pub fn discard(self, kind: K, pattern: impl Into<CompactString>) -> Self {
        let mut definition = TokenDefinition::new(kind, pattern);
        definition.discard = true;
        self.definition(definition)
    }

    /// Add a dropped token that also counts as a line break.
    #[must_use]
    pub fn line_break(self, kind: K, pattern: impl Into<CompactString>) -> Self {
        let mut definition = TokenDefinition::new(kind, pattern);
        definition.discard = true;
        definition.line_break = true;
        self.definition(definition)
    }

    #[must_use]
    pub fn definition(mut self, definition: TokenDefinition<K>) -> Self {
        self.definitions.push(definition);
        self
    }

    #[must_use]
    pub fn comments(mut self, comments: CommentDefinition) -> Self {
        self.comments = Some(comments);
        self
    }

    /// Compile every pattern.
    ///
    /// # Errors
    ///
    /// Returns [`LexerErrorKind::InvalidPattern`] for the first pattern that is
    /// not a valid regex, or for an empty comment delimiter.
    pub fn build(self) -> Result<CompiledLexer<K>, LexerError> {
        let definitions = self
            .definitions
            .into_iter()
            .map(|definition| {
                let regex = Regex::new(&format!(r"\A(?:{})", definition.pattern))
                    .map_err(|err| invalid_pattern(&definition.pattern, err.to_string()))?;
                Ok(CompiledDefinition { definition, regex })
            })
            .collect::<Result<Vec<_>, LexerError>>()?;

        if let Some(comments) = &self.comments {
            let delimiters = comments
                .single_line
                .iter()
                .chain(comments.multi_line.iter().flat_map(|(open, close)| [open, close]));
            for delimiter in delimiters {
                if delimiter.is_empty() {
                    return Err(invalid_pattern(delimiter, "empty comment delimiter".into()));
                }
            }
        }

        tracing::debug!(
            definitions = definitions.len(),
            comments = self.comments.is_some(),
            "compiled lexer"
        );

        Ok(CompiledLexer::new(definitions, self.comments))
    }
}

fn invalid_pattern(pattern: &str, reason: String) -> LexerError {
    LexerError::new(
        Position::default(),
        LexerErrorKind::InvalidPattern {
            pattern: pattern.into(),
            reason,
        },
    )
}
