//! # Grammar Module
//!
//! Grammars are sets of named non-terminals, each expanding to an ordered list
//! of rules. Rules are written as strings and paired with the function that
//! reduces their matches:
//!
//! ```text
//! list      : LBRACKET RBRACKET
//! list      : LBRACKET elements RBRACKET
//! elements  : value (COMMA value)*
//! ```
//!
//! ## Clauses
//!
//! - a name that [`TokenKind::from_name`](crate::lexer::TokenKind::from_name)
//!   resolves is a terminal; any other name refers to a non-terminal
//! - `x*`, `x+` and `x?` repeat or make optional the preceding clause
//! - `( ... )` groups clauses so a postfix applies to all of them
//!
//! ## Validation
//!
//! [`GrammarBuilder::build`] rejects malformed rule strings, references to
//! undefined non-terminals, rules that mention the end-of-input marker and
//! directly left-recursive rules. Leading-token sets are computed as part of
//! the build, so a built [`Grammar`] is never modified again.

mod builder;
mod clause;
mod first;
mod notation;
mod rule;
mod validate;

pub use builder::{Grammar, GrammarBuilder, GrammarError};
pub use clause::{Clause, rule_key};
pub use notation::{RuleSource, parse_rule};
pub use rule::{LeadingTokens, NonTerminal, Reducer, Rule, RuleMetadata};
