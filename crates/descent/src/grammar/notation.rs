//! Reader for rule strings such as `"members : property (COMMA property)*"`.
//!
//! ```text
//! rule    := NAME ':' clause*
//! clause  := atom ('+' | '*' | '?')?
//! atom    := NAME | '(' clause+ ')'
//! ```
//!
//! A name is a terminal when [`TokenKind::from_name`] resolves it, and a
//! non-terminal otherwise.

use crate::grammar::GrammarError;
use crate::grammar::clause::Clause;
use crate::lexer::TokenKind;
use compact_str::CompactString;
use std::iter::Peekable;
use std::str::CharIndices;

/// A parsed rule string: the non-terminal it belongs to and its clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSource<K> {
    pub non_terminal: CompactString,
    pub clauses: Vec<Clause<K>>,
}

/// Parse one rule string.
///
/// # Errors
///
/// Returns [`GrammarError::InvalidRule`] describing the first problem found.
pub fn parse_rule<K: TokenKind>(source: &str) -> Result<RuleSource<K>, GrammarError> {
    RuleReader::new(source).rule()
}

struct RuleReader<'s> {
    source: &'s str,
    chars: Peekable<CharIndices<'s>>,
}

impl<'s> RuleReader<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn rule<K: TokenKind>(mut self) -> Result<RuleSource<K>, GrammarError> {
        let Some(non_terminal) = self.name() else {
            return Err(self.error("expected the non-terminal name before ':'"));
        };
        if K::from_name(non_terminal).is_some() {
            return Err(self.error(format!(
                "`{non_terminal}` names a token and cannot be defined as a non-terminal"
            )));
        }
        if !self.eat(':') {
            return Err(self.error(format!("expected ':' after `{non_terminal}`")));
        }

        let clauses = self.sequence::<K>()?;
        if let Some((_, c)) = self.peek() {
            return Err(self.error(format!("unexpected '{c}'")));
        }

        Ok(RuleSource {
            non_terminal: non_terminal.into(),
            clauses,
        })
    }

    /// Clauses up to the end of input or a closing parenthesis.
    fn sequence<K: TokenKind>(&mut self) -> Result<Vec<Clause<K>>, GrammarError> {
        let mut clauses = Vec::new();
        loop {
            match self.peek() {
                None | Some((_, ')')) => return Ok(clauses),
                Some(_) => {
                    let atom = self.atom::<K>()?;
                    clauses.push(self.postfix(atom));
                }
            }
        }
    }

    fn atom<K: TokenKind>(&mut self) -> Result<Clause<K>, GrammarError> {
        if self.eat('(') {
            let inner = self.sequence::<K>()?;
            if !self.eat(')') {
                return Err(self.error("unclosed '('"));
            }
            if inner.is_empty() {
                return Err(self.error("empty group '()'"));
            }
            return Ok(Clause::Group(inner));
        }

        match self.name() {
            Some(name) => Ok(K::from_name(name).map_or_else(
                || Clause::NonTerminal(name.into()),
                Clause::Terminal,
            )),
            None => {
                let found = self.peek().map_or('?', |(_, c)| c);
                Err(self.error(format!("unexpected '{found}'")))
            }
        }
    }

    fn postfix<K: TokenKind>(&mut self, atom: Clause<K>) -> Clause<K> {
        if self.eat('*') {
            Clause::zero_or_more(atom)
        } else if self.eat('+') {
            Clause::one_or_more(atom)
        } else if self.eat('?') {
            Clause::option(atom)
        } else {
            atom
        }
    }

    fn name(&mut self) -> Option<&'s str> {
        self.skip_whitespace();
        let &(start, first) = self.chars.peek()?;
        if !(first.is_alphabetic() || first == '_') {
            return None;
        }
        let mut end = start;
        while let Some(&(offset, c)) = self.chars.peek() {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            end = offset + c.len_utf8();
            self.chars.next();
        }
        Some(&self.source[start..end])
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.chars.peek().is_some_and(|&(_, c)| c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        self.skip_whitespace();
        self.chars.peek().copied()
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|&(_, c)| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn error(&mut self, reason: impl Into<String>) -> GrammarError {
        let offset = self.peek().map_or(self.source.len(), |(offset, _)| offset);
        GrammarError::InvalidRule {
            rule: self.source.into(),
            reason: format!("{} (at offset {offset})", reason.into()),
        }
    }
}
