//! # Lexer Module
//!
//! Tokenization driven by an ordered list of regex token definitions.
//!
//! ## Overview
//!
//! - **Priority order**: at each position the definitions are tried in the
//!   order they were declared, and the first one that matches wins, even when a
//!   later definition would match more text. Declare `[0-9]+\.[0-9]+` before
//!   `[0-9]+`.
//! - **Discarded tokens**: whitespace and similar tokens are recognized and
//!   dropped; line-break tokens are dropped and advance the line counter.
//! - **Comments**: optional single-line and block comment delimiters, skipped
//!   before any definition is tried.
//! - **End marker**: every token sequence ends with a token of kind
//!   [`TokenKind::EOF`].
//!
//! ## Error Handling
//!
//! [`LexerBuilder::build`] rejects invalid patterns, and
//! [`CompiledLexer::tokenize`] fails with a [`LexerError`](crate::LexerError)
//! at the first character no definition matches.

mod builder;
mod regex_lexer;
mod token;

pub use builder::{CommentDefinition, LexerBuilder, TokenDefinition};
pub use regex_lexer::CompiledLexer;
pub use token::{Position, Token, TokenKind};
