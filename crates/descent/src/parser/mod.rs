//! # Parser Module
//!
//! [`Parser`] bundles a [`CompiledLexer`] with a [`Grammar`]: source text goes
//! in, a reduced value or a single error comes out.
//!
//! ```text
//! source ──lexer──▶ tokens ──engine──▶ syntax tree ──reduce──▶ value
//! ```
//!
//! The [`engine`] module exposes the recursive-descent matcher directly for
//! callers that already hold tokens or want the raw tree.

pub mod engine;
mod parallel;

pub use engine::RecursiveDescent;
pub use parallel::ParallelConfig;

use crate::error::{ParseMetrics, ParseResult, UnexpectedTokenError};
use crate::grammar::{Grammar, GrammarError};
use crate::lexer::{CompiledLexer, Token, TokenKind};
use crate::syntax::{SyntaxParseResult, reduce};
use compact_str::CompactString;
use std::time::Instant;

/// Parser configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserConfig {
    /// Starting non-terminal; the grammar's own start when `None`
    pub start: Option<CompactString>,
}

impl ParserConfig {
    #[must_use]
    pub fn with_start(start: impl Into<CompactString>) -> Self {
        Self {
            start: Some(start.into()),
        }
    }
}

/// A lexer and grammar ready to parse source text.
///
/// # Example
///
/// ```rust
/// use descent::{GrammarBuilder, LexerBuilder, Parser, TokenKind};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Kind { Word, Ws, Eof }
///
/// impl TokenKind for Kind {
///     const EOF: Self = Self::Eof;
///     fn from_name(name: &str) -> Option<Self> {
///         (name == "WORD").then_some(Self::Word)
///     }
/// }
///
/// let lexer = LexerBuilder::new()
///     .token(Kind::Word, "[a-z]+")
///     .discard(Kind::Ws, " +")
///     .build()?;
/// let grammar = GrammarBuilder::new("words")
///     .production("words : WORD+", |args| Ok(args.tokens(0)?.len()))
///     .build()?;
///
/// let parser = Parser::new(lexer, grammar);
/// assert_eq!(parser.parse("three little words").result, Some(3));
/// assert!(parser.parse("").is_error());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Parser<K, V> {
    lexer: CompiledLexer<K>,
    grammar: Grammar<K, V>,
    config: ParserConfig,
}

impl<K: TokenKind, V> Parser<K, V> {
    #[must_use]
    pub fn new(lexer: CompiledLexer<K>, grammar: Grammar<K, V>) -> Self {
        Self {
            lexer,
            grammar,
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with configuration
    ///
    /// # Errors
    ///
    /// [`GrammarError::UndefinedStart`] when the configured starting
    /// non-terminal is not part of the grammar.
    pub fn with_config(
        lexer: CompiledLexer<K>,
        grammar: Grammar<K, V>,
        config: ParserConfig,
    ) -> Result<Self, GrammarError> {
        if let Some(start) = &config.start
            && grammar.non_terminal(start).is_none()
        {
            return Err(GrammarError::UndefinedStart(start.clone()));
        }
        Ok(Self {
            lexer,
            grammar,
            config,
        })
    }

    #[must_use]
    pub const fn lexer(&self) -> &CompiledLexer<K> {
        &self.lexer
    }

    #[must_use]
    pub const fn grammar(&self) -> &Grammar<K, V> {
        &self.grammar
    }

    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The non-terminal parses start from.
    #[must_use]
    pub fn start(&self) -> &str {
        self.config.start.as_deref().unwrap_or(self.grammar.start())
    }

    /// Tokenize, parse and reduce `source`.
    pub fn parse(&self, source: &str) -> ParseResult<K, V> {
        self.parse_with_start(source, self.start())
    }

    /// Like [`parse`](Self::parse), starting from the non-terminal `start`.
    pub fn parse_with_start(&self, source: &str, start: &str) -> ParseResult<K, V> {
        let started = Instant::now();

        let tokens = match self.lexer.tokenize(source) {
            Ok(tokens) => tokens,
            Err(error) => {
                tracing::debug!(%error, "lexing failed");
                return ParseResult::failure(error, metrics(0, started));
            }
        };

        let syntax = RecursiveDescent::new(&self.grammar).parse(&tokens, start);
        let count = tokens.len();

        match syntax.root {
            Some(root) if !syntax.is_error => match reduce(root, &self.grammar) {
                Ok(value) => ParseResult::success(value, metrics(count, started)),
                Err(error) => ParseResult::failure(error, metrics(count, started)),
            },
            _ => {
                let error = syntax.errors.into_iter().next().unwrap_or_else(|| {
                    UnexpectedTokenError::nothing_expected(tokens[0].clone())
                });
                ParseResult::failure(error, metrics(count, started))
            }
        }
    }

    /// Run the engine on already tokenized input and return the raw result.
    #[must_use]
    pub fn parse_tokens(&self, tokens: &[Token<K>]) -> SyntaxParseResult<K> {
        RecursiveDescent::new(&self.grammar).parse(tokens, self.start())
    }
}

impl<K: TokenKind, V> std::fmt::Debug for Parser<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("lexer", &self.lexer)
            .field("grammar", &self.grammar)
            .field("config", &self.config)
            .finish()
    }
}

fn metrics(tokens: usize, started: Instant) -> ParseMetrics {
    ParseMetrics {
        tokens,
        parse_time: started.elapsed(),
    }
}
