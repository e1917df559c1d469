//! Tests for batch parsing against a shared parser

use descent::{GrammarBuilder, LexerBuilder, Parser, ReduceError, TokenKind};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TestKind {
    Ident,
    Number,
    Equals,
    Semi,
    Whitespace,
    Eof,
}

impl TokenKind for TestKind {
    const EOF: Self = Self::Eof;

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "IDENT" => Some(Self::Ident),
            "NUMBER" => Some(Self::Number),
            "EQUALS" => Some(Self::Equals),
            "SEMI" => Some(Self::Semi),
            _ => None,
        }
    }
}

/// `name = 1; other = 2;` reduces to the sum of the assigned numbers.
fn create_test_parser() -> Parser<TestKind, u64> {
    let lexer = LexerBuilder::new()
        .token(TestKind::Ident, "[a-z]+")
        .token(TestKind::Number, "[0-9]+")
        .token(TestKind::Equals, "=")
        .token(TestKind::Semi, ";")
        .discard(TestKind::Whitespace, r"\s+")
        .build()
        .expect("Failed to build test lexer");

    let grammar = GrammarBuilder::new("program")
        .production("program : assignment*", |args| Ok(args.values(0)?.into_iter().sum()))
        .production("assignment : IDENT EQUALS NUMBER SEMI", |args| {
            args.token(2)?.text().parse().map_err(ReduceError::custom)
        })
        .build()
        .expect("Failed to build test grammar");

    Parser::new(lexer, grammar)
}

fn sources() -> Vec<String> {
    (0..64)
        .map(|i| {
            if i % 8 == 7 {
                format!("broken = {i}")
            } else {
                (0..i).map(|j| format!("v = {j};\n")).collect()
            }
        })
        .collect()
}

#[test]
fn test_parser_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Parser<TestKind, u64>>();
}

#[test]
fn test_parse_batch_matches_sequential() {
    let parser = create_test_parser();
    let sources = sources();
    let refs: Vec<&str> = sources.iter().map(String::as_str).collect();

    let batch = parser.parse_batch(&refs);
    assert_eq!(batch.len(), refs.len());

    for (source, result) in refs.iter().zip(&batch) {
        let sequential = parser.parse(source);
        assert_eq!(result.result, sequential.result);
        assert_eq!(result.errors, sequential.errors);
    }
}

#[test]
fn test_batch_results() {
    let parser = create_test_parser();
    let batch = parser.parse_batch(&["a = 1; b = 2;", "", "a = 1", "a = ;"]);

    assert_eq!(batch[0].result, Some(3));
    assert_eq!(batch[1].result, None);
    assert!(batch[1].is_error());
    assert!(batch[2].errors[0].as_syntax().unwrap().token.is_eof());
    assert_eq!(
        batch[3].errors[0].as_syntax().unwrap().expected(),
        &[TestKind::Number]
    );
}

#[test]
fn test_shared_parser_across_threads() {
    let parser = Arc::new(create_test_parser());

    let handles: Vec<_> = (1..=4u64)
        .map(|n| {
            let parser = Arc::clone(&parser);
            thread::spawn(move || {
                let source: String = (1..=n).map(|j| format!("x = {j}; ")).collect();
                parser.parse(&source).result
            })
        })
        .collect();

    let totals: Vec<Option<u64>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(totals, vec![Some(1), Some(3), Some(6), Some(10)]);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parse_batch_with_thread_count() {
    use descent::ParallelConfig;

    let parser = create_test_parser();
    let config = ParallelConfig { num_threads: 3 };
    let results = parser
        .parse_batch_with(&["a = 4;", "b = 5; c = 6;"], &config)
        .unwrap();

    let values: Vec<Option<u64>> = results.into_iter().map(|r| r.result).collect();
    assert_eq!(values, vec![Some(4), Some(11)]);
}
