use crate::error::ReduceError;
use crate::grammar::first::compute_leading_tokens;
use crate::grammar::notation::parse_rule;
use crate::grammar::rule::{LeadingTokens, NonTerminal, Reducer, Rule, RuleMetadata};
use crate::grammar::validate::validate_grammar;
use crate::lexer::TokenKind;
use crate::syntax::Args;
use compact_str::CompactString;
use lasso::{Key, Rodeo, RodeoReader, Spur};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Grammar construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("grammar has no productions")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::empty)))]
    EmptyGrammar,

    #[error("starting non-terminal `{0}` is not defined")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::undefined_start)))]
    UndefinedStart(CompactString),

    #[error("rule `{rule}` references undefined non-terminal `{name}`")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::undefined_non_terminal)))]
    UndefinedNonTerminal {
        rule: CompactString,
        name: CompactString,
    },

    #[error("invalid rule `{rule}`: {reason}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::invalid_rule)))]
    InvalidRule { rule: CompactString, reason: String },

    #[error("rule `{rule}` uses the end-of-input marker as a terminal")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::eof_in_rule)))]
    EofInRule { rule: CompactString },

    #[error("non-terminal `{0}` is left recursive")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(grammar::left_recursion),
            help("rewrite `a : a x | y` as `a : y x*`")
        )
    )]
    LeftRecursion(CompactString),
}

/// A validated grammar with precomputed leading-token sets.
///
/// Immutable once built, so one grammar can serve any number of parses on
/// any number of threads.
///
/// # Example
///
/// ```rust
/// use descent::grammar::GrammarBuilder;
/// use descent::lexer::TokenKind;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Kind { Int, Plus, Eof }
///
/// impl TokenKind for Kind {
///     const EOF: Self = Self::Eof;
///     fn from_name(name: &str) -> Option<Self> {
///         match name {
///             "INT" => Some(Self::Int),
///             "PLUS" => Some(Self::Plus),
///             _ => None,
///         }
///     }
/// }
///
/// let grammar = GrammarBuilder::<Kind, i64>::new("sum")
///     .production("sum : operand (PLUS operand)*", |args| {
///         let first = args.value(0)?;
///         let rest: i64 = args
///             .groups(1)?
///             .into_iter()
///             .map(|mut group| group.value(1))
///             .sum::<Result<i64, _>>()?;
///         Ok(first + rest)
///     })
///     .production("operand : INT", |args| {
///         let token = args.token(0)?;
///         token.text().parse().map_err(descent::ReduceError::custom)
///     })
///     .build()?;
///
/// assert_eq!(grammar.len(), 2);
/// assert!(grammar.non_terminal("operand").is_some());
/// # Ok::<(), descent::grammar::GrammarError>(())
/// ```
pub struct Grammar<K, V> {
    non_terminals: Vec<NonTerminal<K, V>>,
    /// Names are interned in declaration order, so a name's key is its index.
    names: RodeoReader<Spur>,
    start: CompactString,
}

impl<K: TokenKind, V> Grammar<K, V> {
    /// The default starting non-terminal.
    #[must_use]
    pub fn start(&self) -> &str {
        &self.start
    }

    #[must_use]
    pub fn non_terminal(&self, name: &str) -> Option<&NonTerminal<K, V>> {
        self.index_of(name).map(|index| &self.non_terminals[index])
    }

    /// Non-terminals in declaration order.
    pub fn non_terminals(&self) -> impl Iterator<Item = &NonTerminal<K, V>> {
        self.non_terminals.iter()
    }

    #[must_use]
    pub fn rule(&self, non_terminal: &str, index: usize) -> Option<&Rule<K, V>> {
        self.non_terminal(non_terminal)?.rules.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.non_terminals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.non_terminals.is_empty()
    }

    /// Recompute every rule's leading tokens from scratch.
    ///
    /// Indexed `[non_terminal][rule]` in declaration order. The sets stored in
    /// the grammar were produced by the same computation, so the two agree.
    #[must_use]
    pub fn compute_leading_tokens(&self) -> Vec<Vec<LeadingTokens<K>>> {
        let start = self.index_of(&self.start).unwrap_or_default();
        compute_leading_tokens(&self.non_terminals, start, |name| self.index_of(name))
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.names.get(name).map(Key::into_usize)
    }
}

impl<K: TokenKind, V> fmt::Debug for Grammar<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("start", &self.start)
            .field("non_terminals", &self.non_terminals)
            .finish()
    }
}

struct Production<K, V> {
    source: CompactString,
    reducer: Reducer<K, V>,
    metadata: RuleMetadata<K, V>,
}

/// Collects `(rule string, reducer)` productions and builds a [`Grammar`].
///
/// Rules of the same non-terminal keep the order they were added in; that
/// order decides which rule wins when several match.
pub struct GrammarBuilder<K, V> {
    start: CompactString,
    productions: Vec<Production<K, V>>,
}

impl<K: TokenKind, V> GrammarBuilder<K, V> {
    /// Start a grammar whose default starting non-terminal is `start`.
    #[must_use]
    pub fn new(start: impl Into<CompactString>) -> Self {
        Self {
            start: start.into(),
            productions: Vec::new(),
        }
    }

    /// Add a rule, written like `"object : LBRACE members? RBRACE"`, and the
    /// function that reduces its matches.
    #[must_use]
    pub fn production<F>(self, rule: &str, reducer: F) -> Self
    where
        F: Fn(&mut Args<K, V>) -> Result<V, ReduceError> + Send + Sync + 'static,
    {
        self.production_with(rule, reducer, |_| {})
    }

    /// Like [`production`](Self::production), with access to the rule's
    /// metadata, e.g. to register operator resolvers.
    #[must_use]
    pub fn production_with<F>(
        mut self,
        rule: &str,
        reducer: F,
        configure: impl FnOnce(&mut RuleMetadata<K, V>),
    ) -> Self
    where
        F: Fn(&mut Args<K, V>) -> Result<V, ReduceError> + Send + Sync + 'static,
    {
        let mut metadata = RuleMetadata::new();
        configure(&mut metadata);
        self.productions.push(Production {
            source: rule.into(),
            reducer: Arc::new(reducer),
            metadata,
        });
        self
    }

    /// Parse every rule, validate the grammar and compute leading tokens.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] for malformed rule strings, an undefined
    /// starting or referenced non-terminal, an end-of-input terminal in a
    /// rule, or direct left recursion.
    pub fn build(self) -> Result<Grammar<K, V>, GrammarError> {
        if self.productions.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }

        let mut names = Rodeo::<Spur>::new();
        let mut non_terminals: Vec<NonTerminal<K, V>> = Vec::new();

        for production in self.productions {
            let parsed = parse_rule::<K>(&production.source)?;
            let index = names.get_or_intern(&parsed.non_terminal).into_usize();
            if index == non_terminals.len() {
                non_terminals.push(NonTerminal::new(parsed.non_terminal));
            }
            non_terminals[index].rules.push(Rule::new(
                parsed.clauses,
                production.reducer,
                production.metadata,
            ));
        }

        let Some(start) = names.get(&self.start).map(Key::into_usize) else {
            return Err(GrammarError::UndefinedStart(self.start));
        };

        validate_grammar(&non_terminals, |name| names.contains(name))?;

        let sets = compute_leading_tokens(&non_terminals, start, |name| {
            names.get(name).map(Key::into_usize)
        });
        for (non_terminal, rule_sets) in non_terminals.iter_mut().zip(sets) {
            for (rule, leading) in non_terminal.rules.iter_mut().zip(rule_sets) {
                rule.leading = leading;
            }
        }

        tracing::debug!(
            start = %self.start,
            non_terminals = non_terminals.len(),
            rules = non_terminals.iter().map(|nt| nt.rules.len()).sum::<usize>(),
            "built grammar"
        );

        Ok(Grammar {
            non_terminals,
            names: names.into_reader(),
            start: self.start,
        })
    }
}
