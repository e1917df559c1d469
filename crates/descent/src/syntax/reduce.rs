//! Post-order reduction of a syntax tree into a domain value.
//!
//! Each rule node is reduced by the function registered for its rule (or by
//! an operator resolver, for expression nodes) after all of its children have
//! been reduced. The function receives the children as [`Args`]: tokens for
//! leaves, values for rule nodes, lists for repetitions, optional arguments for
//! `?` clauses and nested [`Args`] for groups.

use crate::error::ReduceError;
use crate::grammar::Grammar;
use crate::lexer::{Token, TokenKind};
use crate::syntax::{SyntaxNode, SyntaxTree};
use compact_str::CompactString;

/// One reduced child.
#[derive(Debug)]
pub enum Arg<K, V> {
    Token(Token<K>),
    Value(V),
    Many(Vec<Arg<K, V>>),
    Option(Option<Box<Arg<K, V>>>),
    Group(Args<K, V>),
}

impl<K, V> Arg<K, V> {
    const fn kind_name(&self) -> &'static str {
        match self {
            Self::Token(_) => "token",
            Self::Value(_) => "value",
            Self::Many(_) => "repetition",
            Self::Option(_) => "option",
            Self::Group(_) => "group",
        }
    }
}

/// The reduced children of one node, taken out by index.
///
/// Each argument can be taken once; the accessors move it out.
#[derive(Debug)]
pub struct Args<K, V> {
    rule: CompactString,
    items: Vec<Option<Arg<K, V>>>,
}

impl<K: TokenKind, V> Args<K, V> {
    #[must_use]
    pub fn new(rule: impl Into<CompactString>, items: Vec<Arg<K, V>>) -> Self {
        Self {
            rule: rule.into(),
            items: items.into_iter().map(Some).collect(),
        }
    }

    /// Name of the node being reduced.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Move argument `index` out.
    ///
    /// # Errors
    ///
    /// [`ReduceError::MissingArgument`] when out of range or already taken.
    pub fn take(&mut self, index: usize) -> Result<Arg<K, V>, ReduceError> {
        self.items
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| ReduceError::MissingArgument {
                rule: self.rule.clone(),
                index,
            })
    }

    /// # Errors
    ///
    /// Fails when argument `index` is missing or is not a token.
    pub fn token(&mut self, index: usize) -> Result<Token<K>, ReduceError> {
        let arg = self.take(index)?;
        self.expect_token(index, arg)
    }

    /// # Errors
    ///
    /// Fails when argument `index` is missing or is not a value.
    pub fn value(&mut self, index: usize) -> Result<V, ReduceError> {
        let arg = self.take(index)?;
        self.expect_value(index, arg)
    }

    /// The tokens matched by a repetition of terminals.
    ///
    /// # Errors
    ///
    /// Fails when argument `index` is missing, is not a repetition, or holds
    /// something other than tokens.
    pub fn tokens(&mut self, index: usize) -> Result<Vec<Token<K>>, ReduceError> {
        let items = self.expect_many(index)?;
        items
            .into_iter()
            .map(|arg| self.expect_token(index, arg))
            .collect()
    }

    /// The values of a repetition of non-terminals.
    ///
    /// # Errors
    ///
    /// Fails when argument `index` is missing, is not a repetition, or holds
    /// something other than values.
    pub fn values(&mut self, index: usize) -> Result<Vec<V>, ReduceError> {
        let items = self.expect_many(index)?;
        items
            .into_iter()
            .map(|arg| self.expect_value(index, arg))
            .collect()
    }

    /// The groups of a repeated `( ... )` clause.
    ///
    /// # Errors
    ///
    /// Fails when argument `index` is missing, is not a repetition, or holds
    /// something other than groups.
    pub fn groups(&mut self, index: usize) -> Result<Vec<Self>, ReduceError> {
        let items = self.expect_many(index)?;
        items
            .into_iter()
            .map(|arg| self.expect_group(index, arg))
            .collect()
    }

    /// # Errors
    ///
    /// Fails when argument `index` is missing or is not a group.
    pub fn group(&mut self, index: usize) -> Result<Self, ReduceError> {
        let arg = self.take(index)?;
        self.expect_group(index, arg)
    }

    /// # Errors
    ///
    /// Fails when argument `index` is missing, is not an option, or holds
    /// something other than a token.
    pub fn option_token(&mut self, index: usize) -> Result<Option<Token<K>>, ReduceError> {
        self.expect_option(index)?
            .map(|arg| self.expect_token(index, arg))
            .transpose()
    }

    /// # Errors
    ///
    /// Fails when argument `index` is missing, is not an option, or holds
    /// something other than a value.
    pub fn option_value(&mut self, index: usize) -> Result<Option<V>, ReduceError> {
        self.expect_option(index)?
            .map(|arg| self.expect_value(index, arg))
            .transpose()
    }

    /// # Errors
    ///
    /// Fails when argument `index` is missing, is not an option, or holds
    /// something other than a group.
    pub fn option_group(&mut self, index: usize) -> Result<Option<Self>, ReduceError> {
        self.expect_option(index)?
            .map(|arg| self.expect_group(index, arg))
            .transpose()
    }

    fn expect_many(&mut self, index: usize) -> Result<Vec<Arg<K, V>>, ReduceError> {
        match self.take(index)? {
            Arg::Many(items) => Ok(items),
            other => Err(self.mismatch(index, "repetition", &other)),
        }
    }

    fn expect_option(&mut self, index: usize) -> Result<Option<Arg<K, V>>, ReduceError> {
        match self.take(index)? {
            Arg::Option(inner) => Ok(inner.map(|arg| *arg)),
            other => Err(self.mismatch(index, "option", &other)),
        }
    }

    fn expect_token(&self, index: usize, arg: Arg<K, V>) -> Result<Token<K>, ReduceError> {
        match arg {
            Arg::Token(token) => Ok(token),
            other => Err(self.mismatch(index, "token", &other)),
        }
    }

    fn expect_value(&self, index: usize, arg: Arg<K, V>) -> Result<V, ReduceError> {
        match arg {
            Arg::Value(value) => Ok(value),
            other => Err(self.mismatch(index, "value", &other)),
        }
    }

    fn expect_group(&self, index: usize, arg: Arg<K, V>) -> Result<Self, ReduceError> {
        match arg {
            Arg::Group(args) => Ok(args),
            other => Err(self.mismatch(index, "group", &other)),
        }
    }

    fn mismatch(&self, index: usize, expected: &'static str, found: &Arg<K, V>) -> ReduceError {
        ReduceError::ArgumentKind {
            rule: self.rule.clone(),
            index,
            expected,
            found: found.kind_name(),
        }
    }
}

/// Reduce a rule node and everything below it.
///
/// # Errors
///
/// Fails when `tree` is not a rule node, when a node's rule is unknown to
/// `grammar`, or when a reduction function fails.
pub fn reduce<K: TokenKind, V>(
    tree: SyntaxTree<K>,
    grammar: &Grammar<K, V>,
) -> Result<V, ReduceError> {
    match tree {
        SyntaxTree::Node(node) => reduce_node(node, grammar),
        other => Err(ReduceError::NotANode {
            found: other.kind_name(),
        }),
    }
}

fn reduce_node<K: TokenKind, V>(
    node: SyntaxNode<K>,
    grammar: &Grammar<K, V>,
) -> Result<V, ReduceError> {
    let Some(rule) = grammar.rule(&node.non_terminal, node.rule) else {
        return Err(ReduceError::UnknownRule { name: node.name });
    };

    let items = node
        .children
        .into_iter()
        .map(|child| reduce_arg(child, grammar))
        .collect::<Result<Vec<_>, _>>()?;
    let mut args = Args::new(node.name, items);

    let reducer = node
        .operator
        .and_then(|operator| rule.operator(operator))
        .unwrap_or_else(|| rule.reducer());
    reducer(&mut args)
}

fn reduce_arg<K: TokenKind, V>(
    tree: SyntaxTree<K>,
    grammar: &Grammar<K, V>,
) -> Result<Arg<K, V>, ReduceError> {
    Ok(match tree {
        SyntaxTree::Leaf(leaf) => Arg::Token(leaf.token),
        SyntaxTree::Node(node) => Arg::Value(reduce_node(node, grammar)?),
        SyntaxTree::Many(many) => Arg::Many(
            many.children
                .into_iter()
                .map(|child| reduce_arg(child, grammar))
                .collect::<Result<_, _>>()?,
        ),
        SyntaxTree::Option(option) => Arg::Option(match option.child {
            Some(child) => Some(Box::new(reduce_arg(*child, grammar)?)),
            None => None,
        }),
        SyntaxTree::Group(group) => Arg::Group(Args::new(
            "group",
            group
                .children
                .into_iter()
                .map(|child| reduce_arg(child, grammar))
                .collect::<Result<_, _>>()?,
        )),
    })
}
