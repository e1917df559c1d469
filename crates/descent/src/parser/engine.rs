//! # Recursive-Descent Engine
//!
//! Matches a token sequence against a [`Grammar`] with backtracking.
//!
//! ## Ambiguity policy
//!
//! - **Top level**: every rule of the starting non-terminal whose leading
//!   tokens admit the first token is attempted. The first one, in declaration
//!   order, that succeeds and reaches the end of input wins. If none does, the
//!   single most informative error of the attempts that got furthest is
//!   reported.
//! - **Nested non-terminals**: candidate rules are tried in declaration order
//!   and the first success is kept, without checking whether a later rule
//!   would have let the enclosing rule continue.
//!
//! Every matching function takes a position and returns a fresh
//! [`SyntaxParseResult`]; nothing is shared between attempts.

use crate::error::UnexpectedTokenError;
use crate::grammar::{Clause, Grammar, Rule};
use crate::lexer::{Token, TokenKind};
use crate::syntax::{
    GroupNode, ManyNode, OptionNode, SyntaxLeaf, SyntaxNode, SyntaxParseResult, SyntaxTree,
};
use smallvec::SmallVec;
use std::borrow::Cow;

/// Recursive-descent matcher over a borrowed grammar.
pub struct RecursiveDescent<'g, K, V> {
    grammar: &'g Grammar<K, V>,
}

/// Matched children of a clause sequence, or the errors that stopped it.
struct Sequence<K> {
    children: Vec<SyntaxTree<K>>,
    position: usize,
    errors: Vec<UnexpectedTokenError<K>>,
    failed: bool,
}

impl<'g, K: TokenKind, V> RecursiveDescent<'g, K, V> {
    #[must_use]
    pub const fn new(grammar: &'g Grammar<K, V>) -> Self {
        Self { grammar }
    }

    /// Parse `tokens` starting from the non-terminal named `start`.
    ///
    /// An end-of-input marker is appended when `tokens` does not end with one.
    #[must_use]
    pub fn parse(&self, tokens: &[Token<K>], start: &str) -> SyntaxParseResult<K> {
        let tokens = with_end_marker(tokens);
        let tokens: &[Token<K>] = &tokens;

        let Some(non_terminal) = self.grammar.non_terminal(start) else {
            tracing::warn!(start, "unknown starting non-terminal");
            return SyntaxParseResult::failure(
                vec![UnexpectedTokenError::nothing_expected(tokens[0].clone())],
                0,
            );
        };

        let first = tokens[0].kind;
        let mut results: Vec<SyntaxParseResult<K>> = non_terminal
            .rules()
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.leading_tokens().contains(first))
            .map(|(index, rule)| self.match_rule(tokens, non_terminal.name(), index, rule, 0))
            .collect();

        tracing::debug!(
            start,
            tokens = tokens.len(),
            candidates = results.len(),
            "parsing"
        );

        if results.is_empty() {
            return SyntaxParseResult::failure(
                vec![UnexpectedTokenError::expected_any(
                    tokens[0].clone(),
                    non_terminal.leading_tokens().iter(),
                )],
                0,
            );
        }

        if let Some(winner) = results.iter().position(|r| r.is_ended && r.is_match()) {
            return results.swap_remove(winner);
        }

        let furthest = results
            .iter()
            .map(|r| r.ending_position)
            .max()
            .unwrap_or_default();
        let mut errors = vec![UnexpectedTokenError::nothing_expected(
            tokens[furthest].clone(),
        )];
        for result in results {
            if result.ending_position == furthest {
                errors.extend(result.errors);
            }
        }
        errors.sort_by(UnexpectedTokenError::priority_cmp);

        tracing::debug!(furthest, reported = ?errors.last(), "parse failed");
        SyntaxParseResult::failure(errors.pop().into_iter().collect(), furthest)
    }

    /// Match one rule of `non_terminal` at `position`.
    ///
    /// A rule that cannot start with the current token, and cannot match
    /// nothing, does not apply: the result is neither a match nor an error.
    pub fn match_rule(
        &self,
        tokens: &[Token<K>],
        non_terminal: &str,
        index: usize,
        rule: &Rule<K, V>,
        position: usize,
    ) -> SyntaxParseResult<K> {
        let current = tokens[position].kind;
        if !rule.leading_tokens().contains(current) && !rule.may_be_empty() {
            return SyntaxParseResult::no_match(position);
        }

        tracing::trace!(non_terminal, rule = rule.key(), position, "matching rule");

        let sequence = self.match_sequence(tokens, rule.clauses(), position);
        if sequence.failed {
            return SyntaxParseResult::failure(sequence.errors, sequence.position);
        }

        let mut node = SyntaxNode::new(non_terminal, index, rule.key(), sequence.children);
        if rule.is_expression() {
            attach_operator(rule, &mut node);
        }

        SyntaxParseResult::success(
            SyntaxTree::Node(node),
            sequence.position,
            is_ended(tokens, sequence.position),
        )
        .with_errors(sequence.errors)
    }

    fn match_clause(
        &self,
        tokens: &[Token<K>],
        clause: &Clause<K>,
        position: usize,
    ) -> SyntaxParseResult<K> {
        match clause {
            Clause::Terminal(kind) => match_terminal(tokens, *kind, position),
            Clause::NonTerminal(name) => self.match_non_terminal(tokens, name, position),
            Clause::ZeroOrMore(inner) => self.match_zero_or_more(tokens, inner, position),
            Clause::OneOrMore(inner) => self.match_one_or_more(tokens, inner, position),
            Clause::Option(inner) => self.match_option(tokens, inner, position),
            Clause::Group(clauses) => self.match_group(tokens, clauses, position),
        }
    }

    /// Match clauses left to right, stopping at the first failure.
    fn match_sequence(
        &self,
        tokens: &[Token<K>],
        clauses: &[Clause<K>],
        position: usize,
    ) -> Sequence<K> {
        let mut sequence = Sequence {
            children: Vec::with_capacity(clauses.len()),
            position,
            errors: Vec::new(),
            failed: false,
        };

        for clause in clauses {
            let result = self.match_clause(tokens, clause, sequence.position);
            sequence.errors.extend(result.errors);
            match result.root {
                Some(root) if !result.is_error => {
                    sequence.children.push(root);
                    sequence.position = result.ending_position;
                }
                _ => {
                    sequence.failed = true;
                    break;
                }
            }
        }

        sequence
    }

    /// Resolve a non-terminal: the first candidate rule that matches wins.
    fn match_non_terminal(
        &self,
        tokens: &[Token<K>],
        name: &str,
        position: usize,
    ) -> SyntaxParseResult<K> {
        let token = &tokens[position];
        let Some(non_terminal) = self.grammar.non_terminal(name) else {
            return SyntaxParseResult::failure(
                vec![UnexpectedTokenError::nothing_expected(token.clone())],
                position,
            );
        };

        let candidates: SmallVec<[(usize, &Rule<K, V>); 4]> = non_terminal
            .rules()
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.leading_tokens().contains(token.kind) || rule.may_be_empty())
            .collect();

        if candidates.is_empty() {
            return SyntaxParseResult::failure(
                vec![UnexpectedTokenError::expected_any(
                    token.clone(),
                    non_terminal.leading_tokens().iter(),
                )],
                position,
            );
        }

        let mut furthest = 0;
        let mut furthest_errors = Vec::new();
        for (index, rule) in candidates {
            let result = self.match_rule(tokens, name, index, rule, position);

            let end = result.ending_position;
            if (end > furthest && !result.errors.is_empty()) || (furthest == 0 && end == 0) {
                furthest = end;
                furthest_errors.clone_from(&result.errors);
            }

            if result.is_match() {
                return SyntaxParseResult {
                    errors: furthest_errors,
                    ..result
                };
            }
        }

        if furthest_errors.is_empty() {
            furthest_errors.push(UnexpectedTokenError::expected_any(
                token.clone(),
                non_terminal.leading_tokens().iter(),
            ));
        }
        SyntaxParseResult::failure(furthest_errors, furthest)
    }

    fn match_option(
        &self,
        tokens: &[Token<K>],
        inner: &Clause<K>,
        position: usize,
    ) -> SyntaxParseResult<K> {
        let result = self.match_clause(tokens, inner, position);
        match result.root {
            Some(child) if !result.is_error => SyntaxParseResult::success(
                SyntaxTree::Option(OptionNode {
                    child: Some(Box::new(child)),
                }),
                result.ending_position,
                result.is_ended,
            )
            .with_errors(result.errors),
            _ => SyntaxParseResult::success(
                SyntaxTree::Option(OptionNode { child: None }),
                position,
                is_ended(tokens, position),
            ),
        }
    }

    fn match_zero_or_more(
        &self,
        tokens: &[Token<K>],
        inner: &Clause<K>,
        position: usize,
    ) -> SyntaxParseResult<K> {
        let (children, end, errors) = self.repeat(tokens, inner, position);
        SyntaxParseResult::success(
            SyntaxTree::Many(ManyNode { children }),
            end,
            is_ended(tokens, end),
        )
        .with_errors(errors_beyond(tokens, end, errors))
    }

    fn match_one_or_more(
        &self,
        tokens: &[Token<K>],
        inner: &Clause<K>,
        position: usize,
    ) -> SyntaxParseResult<K> {
        let (children, end, mut errors) = self.repeat(tokens, inner, position);
        if children.is_empty() {
            if errors.is_empty() {
                errors.push(UnexpectedTokenError::nothing_expected(
                    tokens[position].clone(),
                ));
            }
            return SyntaxParseResult::failure(errors, position);
        }
        SyntaxParseResult::success(
            SyntaxTree::Many(ManyNode { children }),
            end,
            is_ended(tokens, end),
        )
        .with_errors(errors_beyond(tokens, end, errors))
    }

    /// Match `inner` as many times as possible.
    ///
    /// Stops at the first failed attempt, at an attempt that consumes nothing,
    /// or when only the end-of-input marker is left. Returns the matches, the
    /// position after the last one and the errors of the failed attempt.
    fn repeat(
        &self,
        tokens: &[Token<K>],
        inner: &Clause<K>,
        position: usize,
    ) -> (Vec<SyntaxTree<K>>, usize, Vec<UnexpectedTokenError<K>>) {
        let mut children = Vec::new();
        let mut current = position;

        loop {
            let result = self.match_clause(tokens, inner, current);
            match result.root {
                Some(child) if !result.is_error && result.ending_position > current => {
                    children.push(child);
                    current = result.ending_position;
                    if tokens[current].is_eof() {
                        return (children, current, Vec::new());
                    }
                }
                _ => return (children, current, result.errors),
            }
        }
    }

    fn match_group(
        &self,
        tokens: &[Token<K>],
        clauses: &[Clause<K>],
        position: usize,
    ) -> SyntaxParseResult<K> {
        let sequence = self.match_sequence(tokens, clauses, position);
        if sequence.failed {
            return SyntaxParseResult::failure(sequence.errors, sequence.position);
        }
        SyntaxParseResult::success(
            SyntaxTree::Group(GroupNode {
                children: sequence.children,
            }),
            sequence.position,
            is_ended(tokens, sequence.position),
        )
        .with_errors(sequence.errors)
    }
}

fn match_terminal<K: TokenKind>(
    tokens: &[Token<K>],
    expected: K,
    position: usize,
) -> SyntaxParseResult<K> {
    let token = &tokens[position];
    if token.kind == expected && !token.is_eof() {
        let next = position + 1;
        SyntaxParseResult::success(
            SyntaxTree::Leaf(SyntaxLeaf {
                token: token.clone(),
            }),
            next,
            is_ended(tokens, next),
        )
    } else {
        SyntaxParseResult::failure(
            vec![UnexpectedTokenError::expected_one(token.clone(), expected)],
            position,
        )
    }
}

/// Errors of a repetition's last failed attempt that lie past where the
/// repetition stopped. Errors at the stop position are left to the clause
/// that follows.
fn errors_beyond<K: TokenKind>(
    tokens: &[Token<K>],
    end: usize,
    errors: Vec<UnexpectedTokenError<K>>,
) -> Vec<UnexpectedTokenError<K>> {
    let stop = tokens[end].position.offset;
    errors
        .into_iter()
        .filter(|error| error.position().offset > stop)
        .collect()
}

/// Whether `position` is at the end of input.
///
/// True on the final end marker, or one slot before it when the sequence
/// closes with an end marker.
fn is_ended<K: TokenKind>(tokens: &[Token<K>], position: usize) -> bool {
    let last = tokens.len().saturating_sub(1);
    position >= last || (position + 1 == last && tokens[last].is_eof())
}

/// Only the second of exactly two children can name the operator.
fn attach_operator<K: TokenKind, V>(rule: &Rule<K, V>, node: &mut SyntaxNode<K>) {
    if let [_, SyntaxTree::Leaf(leaf)] = node.children.as_slice()
        && rule.operator(leaf.token.kind).is_some()
    {
        node.operator = Some(leaf.token.kind);
    }
}

fn with_end_marker<K: TokenKind>(tokens: &[Token<K>]) -> Cow<'_, [Token<K>]> {
    match tokens.last() {
        Some(last) if last.is_eof() => Cow::Borrowed(tokens),
        last => {
            let position = last.map(Token::end_position).unwrap_or_default();
            let mut owned = tokens.to_vec();
            owned.push(Token::eof(position));
            Cow::Owned(owned)
        }
    }
}
