use crate::error::{LexerError, LexerErrorKind};
use crate::lexer::builder::{CommentDefinition, TokenDefinition};
use crate::lexer::{Position, Token, TokenKind};
use regex::Regex;

pub(crate) struct CompiledDefinition<K> {
    pub(crate) definition: TokenDefinition<K>,
    pub(crate) regex: Regex,
}

/// A priority-ordered, regex-backed tokenizer.
///
/// Built by [`LexerBuilder`](crate::lexer::LexerBuilder). Holds no per-call
/// state, so one lexer can tokenize any number of sources, from any thread.
pub struct CompiledLexer<K> {
    definitions: Vec<CompiledDefinition<K>>,
    comments: Option<CommentDefinition>,
}

impl<K: TokenKind> std::fmt::Debug for CompiledLexer<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledLexer")
            .field(
                "definitions",
                &self.definitions().map(|d| (d.kind, d.pattern.as_str())).collect::<Vec<_>>(),
            )
            .field("comments", &self.comments)
            .finish()
    }
}

/// Line and column bookkeeping while scanning.
#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    offset: usize,
    line: u32,
    column: u32,
}

impl Cursor {
    const fn position(self) -> Position {
        Position::new(self.line, self.column, self.offset)
    }

    fn advance(&mut self, text: &str, line_break: bool) {
        self.offset += text.len();
        let bytes = text.as_bytes();
        let newlines = memchr::memchr_iter(b'\n', bytes).count();
        match memchr::memrchr(b'\n', bytes) {
            Some(last) => {
                self.line = self.line.saturating_add(count_u32(newlines));
                self.column = count_u32(text[last + 1..].chars().count());
            }
            None if line_break => {
                // a break written without '\n', e.g. a lone "\r"
                self.line = self.line.saturating_add(1);
                self.column = 0;
            }
            None => {
                self.column = self.column.saturating_add(count_u32(text.chars().count()));
            }
        }
    }
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

impl<K: TokenKind> CompiledLexer<K> {
    pub(crate) fn new(
        definitions: Vec<CompiledDefinition<K>>,
        comments: Option<CommentDefinition>,
    ) -> Self {
        Self {
            definitions,
            comments,
        }
    }

    /// The token definitions, in priority order.
    pub fn definitions(&self) -> impl Iterator<Item = &TokenDefinition<K>> {
        self.definitions.iter().map(|compiled| &compiled.definition)
    }

    #[must_use]
    pub const fn comments(&self) -> Option<&CommentDefinition> {
        self.comments.as_ref()
    }

    /// Tokenize `source`.
    ///
    /// The returned sequence always ends with one end-of-input token placed
    /// just after the last character.
    ///
    /// # Errors
    ///
    /// Fails at the first character no definition matches, or at an
    /// unterminated block comment.
    pub fn tokenize(&self, source: &str) -> Result<Vec<Token<K>>, LexerError> {
        let mut tokens = Vec::new();
        let mut cursor = Cursor::default();

        while cursor.offset < source.len() {
            let rest = &source[cursor.offset..];

            if let Some(length) = self.comment_length(rest, cursor)? {
                cursor.advance(&rest[..length], false);
                continue;
            }

            let Some((definition, length)) = self.match_definition(rest) else {
                let char = rest.chars().next().unwrap_or_default();
                return Err(LexerError::new(
                    cursor.position(),
                    LexerErrorKind::unexpected_char(char),
                ));
            };

            let text = &rest[..length];
            if !definition.is_skipped() {
                tokens.push(Token::new(definition.kind, text, cursor.position()));
            }
            cursor.advance(text, definition.line_break);
        }

        tokens.push(Token::eof(cursor.position()));
        tracing::debug!(tokens = tokens.len(), bytes = source.len(), "tokenized");
        Ok(tokens)
    }

    /// First definition with a non-empty match at the start of `rest`.
    fn match_definition(&self, rest: &str) -> Option<(&TokenDefinition<K>, usize)> {
        self.definitions.iter().find_map(|compiled| {
            compiled
                .regex
                .find(rest)
                .filter(|found| found.end() > 0)
                .map(|found| (&compiled.definition, found.end()))
        })
    }

    /// Length of the comment starting at `rest`, if one does.
    fn comment_length(&self, rest: &str, cursor: Cursor) -> Result<Option<usize>, LexerError> {
        let Some(comments) = &self.comments else {
            return Ok(None);
        };

        if let Some((opener, closer)) = &comments.multi_line
            && rest.starts_with(opener.as_str())
        {
            let body = &rest.as_bytes()[opener.len()..];
            return match memchr::memmem::find(body, closer.as_bytes()) {
                Some(end) => Ok(Some(opener.len() + end + closer.len())),
                None => Err(LexerError::new(
                    cursor.position(),
                    LexerErrorKind::UnterminatedComment {
                        closer: closer.clone(),
                    },
                )),
            };
        }

        if let Some(opener) = &comments.single_line
            && rest.starts_with(opener.as_str())
        {
            // the line terminator is left for the token definitions
            let end = memchr::memchr2(b'\n', b'\r', rest.as_bytes()).unwrap_or(rest.len());
            return Ok(Some(end));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::{CommentDefinition, LexerBuilder, TokenKind};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Ident,
        Int,
        Ws,
        Eol,
        Eof,
    }

    impl TokenKind for Kind {
        const EOF: Self = Self::Eof;

        fn from_name(_: &str) -> Option<Self> {
            None
        }
    }

    fn lexer() -> super::CompiledLexer<Kind> {
        LexerBuilder::new()
            .token(Kind::Ident, "[a-z]+")
            .token(Kind::Int, "[0-9]+")
            .discard(Kind::Ws, "[ \t]+")
            .line_break(Kind::Eol, "[\n\r]+")
            .comments(CommentDefinition::c_style())
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_source_yields_only_eof() {
        let tokens = lexer().tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }

    #[test]
    fn test_single_line_comment_keeps_line_break() {
        let tokens = lexer().tokenize("a // note\nb").unwrap();
        let kinds: Vec<Kind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![Kind::Ident, Kind::Ident, Kind::Eof]);
        assert_eq!(tokens[1].position.line, 1);
        assert_eq!(tokens[1].position.column, 0);
    }

    #[test]
    fn test_block_comment_advances_lines() {
        let tokens = lexer().tokenize("a /* one\ntwo\n */ 7").unwrap();
        assert_eq!(tokens[1].kind, Kind::Int);
        assert_eq!(tokens[1].position.line, 2);
        assert_eq!(tokens[1].position.column, 4);
    }

    #[test]
    fn test_eof_position_follows_last_character() {
        let tokens = lexer().tokenize("ab 12").unwrap();
        let eof = tokens.last().unwrap();
        assert_eq!(eof.position.offset, 5);
        assert_eq!(eof.position.column, 5);
    }
}
