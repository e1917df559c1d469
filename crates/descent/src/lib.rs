//! # Descent
//!
//! Regex-driven tokenizers and EBNF recursive-descent parsers built from
//! declarative rules.
//!
//! ## Overview
//!
//! Descent turns a list of token patterns and a list of grammar rules into a
//! parser that produces a domain value from source text:
//!
//! - **Lexing**: ordered regex token definitions, discarded tokens, line
//!   breaks and comments
//! - **Grammar rules**: `nonterminal : clause clause ...` strings with `*`,
//!   `+`, `?` and `( ... )` groups, validated and analyzed once at build time
//! - **Backtracking descent**: every candidate rule is tried at the top level;
//!   nested non-terminals keep their first match
//! - **Single error**: a failed parse reports the most informative error from
//!   the attempt that got furthest
//! - **Reduction**: each rule is paired with a function that builds the value
//!   of its matches
//!
//! ## Quick Start
//!
//! A parser for sums of integers:
//!
//! ```rust
//! use descent::{GrammarBuilder, LexerBuilder, Parser, ReduceError, TokenKind};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Kind {
//!     Int,
//!     Plus,
//!     Ws,
//!     Eof,
//! }
//!
//! impl TokenKind for Kind {
//!     const EOF: Self = Self::Eof;
//!
//!     fn from_name(name: &str) -> Option<Self> {
//!         match name {
//!             "INT" => Some(Self::Int),
//!             "PLUS" => Some(Self::Plus),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! fn int(text: &str) -> Result<i64, ReduceError> {
//!     text.parse().map_err(ReduceError::custom)
//! }
//!
//! let lexer = LexerBuilder::new()
//!     .token(Kind::Int, "[0-9]+")
//!     .token(Kind::Plus, r"\+")
//!     .discard(Kind::Ws, r"[ \t]+")
//!     .build()?;
//!
//! let grammar = GrammarBuilder::new("sum")
//!     .production("sum : INT (PLUS INT)*", |args| {
//!         let mut total = int(args.token(0)?.text())?;
//!         for mut group in args.groups(1)? {
//!             total += int(group.token(1)?.text())?;
//!         }
//!         Ok(total)
//!     })
//!     .build()?;
//!
//! let parser = Parser::new(lexer, grammar);
//! assert_eq!(parser.parse("1 + 2 + 39").result, Some(42));
//!
//! let failed = parser.parse("1 + + 2");
//! assert!(failed.is_error());
//! println!("{}", failed.errors[0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`lexer`] - Token definitions and the regex lexer
//! - [`grammar`] - Rule notation, grammar validation and leading-token sets
//! - [`parser`] - The recursive-descent engine and the [`Parser`] facade
//! - [`syntax`] - Syntax trees and their reduction into values
//! - [`error`] - Error types and diagnostics
//!
//! ## Features
//!
//! - `diagnostics`: errors implement `miette::Diagnostic`
//! - `parallel`: [`Parser::parse_batch`] runs on a rayon pool
//! - `serialize`: serde derives for tokens, positions and token definitions

pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod syntax;

// Re-export commonly used types
pub use error::{
    LexerError, ParseError, ParseMetrics, ParseResult, ReduceError, UnexpectedTokenError,
};
pub use grammar::{Clause, Grammar, GrammarBuilder, GrammarError};
pub use lexer::{CompiledLexer, LexerBuilder, Position, Token, TokenKind};
pub use parser::{ParallelConfig, Parser, ParserConfig};
pub use syntax::{Args, SyntaxParseResult, SyntaxTree};
