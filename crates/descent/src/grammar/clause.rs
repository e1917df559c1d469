use crate::lexer::TokenKind;
use compact_str::CompactString;
use std::fmt;

/// One element of a rule's right-hand side.
///
/// `Terminal` never holds [`TokenKind::EOF`]; the builder rejects such rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause<K> {
    /// A single token of the given kind
    Terminal(K),
    /// A reference to a non-terminal by name
    NonTerminal(CompactString),
    /// `inner*`
    ZeroOrMore(Box<Clause<K>>),
    /// `inner+`
    OneOrMore(Box<Clause<K>>),
    /// `inner?`
    Option(Box<Clause<K>>),
    /// `( a b ... )`
    Group(Vec<Clause<K>>),
}

impl<K: TokenKind> Clause<K> {
    #[must_use]
    pub fn non_terminal(name: impl Into<CompactString>) -> Self {
        Self::NonTerminal(name.into())
    }

    #[must_use]
    pub fn zero_or_more(inner: Self) -> Self {
        Self::ZeroOrMore(Box::new(inner))
    }

    #[must_use]
    pub fn one_or_more(inner: Self) -> Self {
        Self::OneOrMore(Box::new(inner))
    }

    #[must_use]
    pub fn option(inner: Self) -> Self {
        Self::Option(Box::new(inner))
    }

    /// Whether the clause can match without consuming input.
    ///
    /// A non-terminal is never considered optional, even when one of its rules
    /// derives the empty string.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        match self {
            Self::Option(_) | Self::ZeroOrMore(_) => true,
            Self::Group(clauses) => clauses.iter().all(Self::is_optional),
            Self::Terminal(_) | Self::NonTerminal(_) | Self::OneOrMore(_) => false,
        }
    }

    /// The non-terminal this clause starts with, if any.
    pub(crate) fn leftmost_non_terminal(&self) -> Option<&str> {
        match self {
            Self::NonTerminal(name) => Some(name.as_str()),
            Self::ZeroOrMore(inner) | Self::OneOrMore(inner) | Self::Option(inner) => {
                inner.leftmost_non_terminal()
            }
            Self::Group(clauses) => clauses.first().and_then(Self::leftmost_non_terminal),
            Self::Terminal(_) => None,
        }
    }

    /// Visit every clause nested in this one, this one included.
    pub(crate) fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Self)) {
        visit(self);
        match self {
            Self::ZeroOrMore(inner) | Self::OneOrMore(inner) | Self::Option(inner) => {
                inner.walk(visit);
            }
            Self::Group(clauses) => {
                for clause in clauses {
                    clause.walk(visit);
                }
            }
            Self::Terminal(_) | Self::NonTerminal(_) => {}
        }
    }
}

impl<K: TokenKind> fmt::Display for Clause<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal(kind) => write!(f, "{kind:?}"),
            Self::NonTerminal(name) => f.write_str(name),
            Self::ZeroOrMore(inner) => write!(f, "{inner}*"),
            Self::OneOrMore(inner) => write!(f, "{inner}+"),
            Self::Option(inner) => write!(f, "{inner}?"),
            Self::Group(clauses) => {
                f.write_str("(")?;
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{clause}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// The key identifying a rule within its non-terminal: clause names joined by `_`.
#[must_use]
pub fn rule_key<K: TokenKind>(clauses: &[Clause<K>]) -> CompactString {
    let mut key = CompactString::default();
    for (i, clause) in clauses.iter().enumerate() {
        if i > 0 {
            key.push('_');
        }
        key.push_str(&clause.to_string());
    }
    key
}
