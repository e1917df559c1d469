//! # Syntax Trees
//!
//! The engine produces a [`SyntaxTree`]: rule nodes named
//! `<non-terminal>__<rule key>`, token leaves, and dedicated nodes for
//! repetitions, options and groups. [`reduce`] turns a tree into a domain
//! value using the reduction functions registered with the grammar.

mod reduce;
mod result;
mod tree;

pub use reduce::{Arg, Args, reduce};
pub use result::SyntaxParseResult;
pub use tree::{GroupNode, ManyNode, OptionNode, SyntaxLeaf, SyntaxNode, SyntaxTree};
