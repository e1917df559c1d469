use crate::grammar::GrammarError;
use crate::grammar::clause::Clause;
use crate::grammar::rule::NonTerminal;
use crate::lexer::TokenKind;

/// Validate a grammar for common issues
///
/// # Errors
///
/// Returns the first problem found: an end-of-input terminal inside a rule,
/// a reference to an undefined non-terminal, or direct left recursion.
pub(crate) fn validate_grammar<K, V>(
    non_terminals: &[NonTerminal<K, V>],
    is_defined: impl Fn(&str) -> bool,
) -> Result<(), GrammarError>
where
    K: TokenKind,
{
    for non_terminal in non_terminals {
        for rule in &non_terminal.rules {
            let mut problem = None;
            for clause in &rule.clauses {
                clause.walk(&mut |nested| {
                    if problem.is_some() {
                        return;
                    }
                    problem = match nested {
                        Clause::Terminal(kind) if *kind == K::EOF => Some(GrammarError::EofInRule {
                            rule: qualified(&non_terminal.name, &rule.key),
                        }),
                        Clause::NonTerminal(name) if !is_defined(name) => {
                            Some(GrammarError::UndefinedNonTerminal {
                                rule: qualified(&non_terminal.name, &rule.key),
                                name: name.clone(),
                            })
                        }
                        _ => None,
                    };
                });
            }
            if let Some(problem) = problem {
                return Err(problem);
            }

            if is_directly_left_recursive(&rule.clauses, &non_terminal.name) {
                return Err(GrammarError::LeftRecursion(non_terminal.name.clone()));
            }
        }
    }

    Ok(())
}

fn qualified(non_terminal: &str, key: &str) -> compact_str::CompactString {
    compact_str::format_compact!("{non_terminal} : {key}")
}

/// Whether `name` can be the first thing `clauses` match.
fn is_directly_left_recursive<K: TokenKind>(clauses: &[Clause<K>], name: &str) -> bool {
    for clause in clauses {
        if clause.leftmost_non_terminal() == Some(name) {
            return true;
        }
        if !clause.is_optional() {
            break;
        }
    }
    false
}
