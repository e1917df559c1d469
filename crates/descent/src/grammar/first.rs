//! Leading-token (FIRST) sets.
//!
//! Each rule is computed once. A rule whose computation is still in progress
//! contributes nothing, which is what ends the recursion between mutually
//! referencing non-terminals.

use crate::grammar::clause::Clause;
use crate::grammar::rule::{LeadingTokens, NonTerminal};
use crate::lexer::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NotStarted,
    InProgress,
    Done,
}

struct LeadingTokenBuilder<'g, K, V, L> {
    non_terminals: &'g [NonTerminal<K, V>],
    lookup: L,
    states: Vec<Vec<State>>,
    sets: Vec<Vec<LeadingTokens<K>>>,
}

/// Compute the leading tokens of every rule, starting from `start`.
///
/// The result is indexed like the input: `result[nt][rule]`. `lookup` maps a
/// non-terminal name to its index; unknown names contribute nothing.
pub(crate) fn compute_leading_tokens<K, V, L>(
    non_terminals: &[NonTerminal<K, V>],
    start: usize,
    lookup: L,
) -> Vec<Vec<LeadingTokens<K>>>
where
    K: TokenKind,
    L: Fn(&str) -> Option<usize>,
{
    let mut builder = LeadingTokenBuilder {
        non_terminals,
        lookup,
        states: non_terminals
            .iter()
            .map(|nt| vec![State::NotStarted; nt.rules.len()])
            .collect(),
        sets: non_terminals
            .iter()
            .map(|nt| vec![LeadingTokens::new(); nt.rules.len()])
            .collect(),
    };

    if start < non_terminals.len() {
        builder.non_terminal(start);
    }
    for index in 0..non_terminals.len() {
        builder.non_terminal(index);
    }

    builder.sets
}

impl<K, V, L> LeadingTokenBuilder<'_, K, V, L>
where
    K: TokenKind,
    L: Fn(&str) -> Option<usize>,
{
    fn non_terminal(&mut self, index: usize) {
        for rule in 0..self.states[index].len() {
            self.rule(index, rule);
        }
    }

    fn rule(&mut self, non_terminal: usize, rule: usize) {
        if self.states[non_terminal][rule] != State::NotStarted {
            return;
        }
        self.states[non_terminal][rule] = State::InProgress;

        let non_terminals = self.non_terminals;
        let definition = &non_terminals[non_terminal].rules[rule];
        let set = self.sequence(&definition.clauses);
        tracing::trace!(
            non_terminal = %non_terminals[non_terminal].name,
            rule = %definition.key,
            leading = ?set.as_slice(),
            "leading tokens"
        );

        self.sets[non_terminal][rule] = set;
        self.states[non_terminal][rule] = State::Done;
    }

    /// Leading tokens of a clause sequence: the first clause's, plus the next
    /// clause's for as long as the clauses so far are optional.
    fn sequence(&mut self, clauses: &[Clause<K>]) -> LeadingTokens<K> {
        let mut set = LeadingTokens::new();
        for clause in clauses {
            let first = self.clause(clause);
            set.extend(first.iter());
            if !clause.is_optional() {
                break;
            }
        }
        set
    }

    fn clause(&mut self, clause: &Clause<K>) -> LeadingTokens<K> {
        match clause {
            Clause::Terminal(kind) => std::iter::once(*kind).collect(),
            Clause::NonTerminal(name) => {
                let Some(index) = (self.lookup)(name) else {
                    return LeadingTokens::new();
                };
                self.non_terminal(index);
                self.sets[index].iter().flat_map(LeadingTokens::iter).collect()
            }
            Clause::ZeroOrMore(inner) | Clause::OneOrMore(inner) | Clause::Option(inner) => {
                self.clause(inner)
            }
            Clause::Group(clauses) => self.sequence(clauses),
        }
    }
}
