use crate::error::ReduceError;
use crate::grammar::clause::{Clause, rule_key};
use crate::lexer::TokenKind;
use crate::syntax::Args;
use compact_str::CompactString;
use hashbrown::HashMap;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Builds a rule's value from its reduced children.
pub type Reducer<K, V> = Arc<dyn Fn(&mut Args<K, V>) -> Result<V, ReduceError> + Send + Sync>;

/// Token kinds that can start a rule, in discovery order, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadingTokens<K>(SmallVec<[K; 4]>);

impl<K> Default for LeadingTokens<K> {
    fn default() -> Self {
        Self(SmallVec::new())
    }
}

impl<K: TokenKind> LeadingTokens<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `kind` unless already present. Returns whether it was added.
    pub fn insert(&mut self, kind: K) -> bool {
        if self.contains(kind) {
            false
        } else {
            self.0.push(kind);
            true
        }
    }

    pub fn extend(&mut self, kinds: impl IntoIterator<Item = K>) {
        for kind in kinds {
            self.insert(kind);
        }
    }

    #[must_use]
    pub fn contains(&self, kind: K) -> bool {
        self.0.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[K] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: TokenKind> FromIterator<K> for LeadingTokens<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tokens = Self::new();
        tokens.extend(iter);
        tokens
    }
}

/// Extra behavior attached to a rule while building the grammar.
///
/// Registering an operator turns the rule into an expression rule: when the
/// matched node has exactly two children and the second is a token with a
/// registered resolver, that resolver builds the node's value instead of the
/// rule's own reducer.
pub struct RuleMetadata<K, V> {
    pub(crate) operators: HashMap<K, Reducer<K, V>, ahash::RandomState>,
    pub(crate) is_expression: bool,
}

impl<K: TokenKind, V> Default for RuleMetadata<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TokenKind, V> RuleMetadata<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            operators: HashMap::with_hasher(ahash::RandomState::new()),
            is_expression: false,
        }
    }

    /// Register the resolver used when `kind` is the operator token.
    pub fn operator<F>(&mut self, kind: K, resolver: F) -> &mut Self
    where
        F: Fn(&mut Args<K, V>) -> Result<V, ReduceError> + Send + Sync + 'static,
    {
        self.operators.insert(kind, Arc::new(resolver));
        self.is_expression = true;
        self
    }
}

/// One alternative of a non-terminal.
pub struct Rule<K, V> {
    pub(crate) key: CompactString,
    pub(crate) clauses: Vec<Clause<K>>,
    pub(crate) leading: LeadingTokens<K>,
    pub(crate) may_be_empty: bool,
    pub(crate) reducer: Reducer<K, V>,
    pub(crate) metadata: RuleMetadata<K, V>,
}

impl<K: TokenKind, V> Rule<K, V> {
    pub(crate) fn new(
        clauses: Vec<Clause<K>>,
        reducer: Reducer<K, V>,
        metadata: RuleMetadata<K, V>,
    ) -> Self {
        Self {
            key: rule_key(&clauses),
            may_be_empty: clauses.iter().all(Clause::is_optional),
            clauses,
            leading: LeadingTokens::new(),
            reducer,
            metadata,
        }
    }

    /// Clause names joined by `_`, unique within the non-terminal in practice.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn clauses(&self) -> &[Clause<K>] {
        &self.clauses
    }

    /// Token kinds that can start this rule.
    #[must_use]
    pub const fn leading_tokens(&self) -> &LeadingTokens<K> {
        &self.leading
    }

    /// Whether every clause is optional, so the rule can match nothing.
    #[must_use]
    pub const fn may_be_empty(&self) -> bool {
        self.may_be_empty
    }

    #[must_use]
    pub const fn is_expression(&self) -> bool {
        self.metadata.is_expression
    }

    #[must_use]
    pub fn reducer(&self) -> &Reducer<K, V> {
        &self.reducer
    }

    /// The resolver registered for operator `kind`.
    #[must_use]
    pub fn operator(&self, kind: K) -> Option<&Reducer<K, V>> {
        self.metadata.operators.get(&kind)
    }
}

impl<K: TokenKind, V> fmt::Debug for Rule<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("key", &self.key)
            .field("leading", &self.leading)
            .field("may_be_empty", &self.may_be_empty)
            .field("is_expression", &self.metadata.is_expression)
            .finish_non_exhaustive()
    }
}

/// A named non-terminal and its rules, in declaration order.
pub struct NonTerminal<K, V> {
    pub(crate) name: CompactString,
    pub(crate) rules: Vec<Rule<K, V>>,
}

impl<K: TokenKind, V> NonTerminal<K, V> {
    pub(crate) const fn new(name: CompactString) -> Self {
        Self {
            name,
            rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule<K, V>] {
        &self.rules
    }

    /// Union of the leading tokens of every rule, in rule order.
    #[must_use]
    pub fn leading_tokens(&self) -> LeadingTokens<K> {
        self.rules.iter().flat_map(|rule| rule.leading.iter()).collect()
    }
}

impl<K: TokenKind, V> fmt::Debug for NonTerminal<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonTerminal")
            .field("name", &self.name)
            .field("rules", &self.rules)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        A,
        B,
        Eof,
    }

    impl TokenKind for Kind {
        const EOF: Self = Self::Eof;

        fn from_name(_: &str) -> Option<Self> {
            None
        }
    }

    #[test]
    fn test_leading_tokens_keep_order_and_dedupe() {
        let mut tokens = LeadingTokens::new();
        assert!(tokens.insert(Kind::B));
        assert!(tokens.insert(Kind::A));
        assert!(!tokens.insert(Kind::B));
        assert_eq!(tokens.as_slice(), &[Kind::B, Kind::A]);
    }

    #[test]
    fn test_rule_may_be_empty() {
        let reducer: Reducer<Kind, ()> = Arc::new(|_: &mut Args<Kind, ()>| Ok(()));
        let rule = Rule::new(
            vec![Clause::option(Clause::Terminal(Kind::A))],
            reducer.clone(),
            RuleMetadata::new(),
        );
        assert!(rule.may_be_empty());
        assert_eq!(rule.key(), "A?");

        let rule = Rule::new(Vec::new(), reducer.clone(), RuleMetadata::new());
        assert!(rule.may_be_empty());

        let rule = Rule::new(
            vec![Clause::option(Clause::Terminal(Kind::A)), Clause::Terminal(Kind::B)],
            reducer,
            RuleMetadata::new(),
        );
        assert!(!rule.may_be_empty());
    }

    #[test]
    fn test_operator_marks_expression() {
        let mut metadata: RuleMetadata<Kind, i32> = RuleMetadata::new();
        metadata.operator(Kind::A, |_| Ok(1));
        let rule = Rule::new(
            vec![Clause::Terminal(Kind::B), Clause::Terminal(Kind::A)],
            Arc::new(|_: &mut Args<Kind, i32>| Ok(0)),
            metadata,
        );
        assert!(rule.is_expression());
        assert!(rule.operator(Kind::A).is_some());
        assert!(rule.operator(Kind::B).is_none());
    }
}
