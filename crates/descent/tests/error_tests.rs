//! Tests for rule selection and syntax error reporting

use descent::error::diagnostics::format_error_with_context;
use descent::{GrammarBuilder, LexerBuilder, Parser, TokenKind, UnexpectedTokenError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Letter {
    X,
    Y,
    Z,
    W,
    Ws,
    Eol,
    Eof,
}

impl TokenKind for Letter {
    const EOF: Self = Self::Eof;

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "z" => Some(Self::Z),
            "w" => Some(Self::W),
            _ => None,
        }
    }
}

/// A parser whose rules reduce to the name of the rule that matched.
fn parser(start: &str, rules: &[&str]) -> Parser<Letter, String> {
    let lexer = LexerBuilder::new()
        .token(Letter::X, "x")
        .token(Letter::Y, "y")
        .token(Letter::Z, "z")
        .token(Letter::W, "w")
        .discard(Letter::Ws, "[ \t]+")
        .line_break(Letter::Eol, r"\n")
        .build()
        .unwrap();

    let grammar = rules
        .iter()
        .fold(GrammarBuilder::new(start), |builder, rule| {
            builder.production(rule, |args| Ok(args.rule().to_string()))
        })
        .build()
        .unwrap();

    Parser::new(lexer, grammar)
}

fn syntax_error(parser: &Parser<Letter, String>, source: &str) -> UnexpectedTokenError<Letter> {
    let result = parser.parse(source);
    assert!(result.result.is_none(), "`{source}` should not parse");
    assert_eq!(result.errors.len(), 1);
    result.errors[0]
        .as_syntax()
        .cloned()
        .expect("a syntax error")
}

#[test]
fn test_first_complete_alternative_wins() {
    let parser = parser("s", &["s : x y", "s : x y z w?"]);
    assert_eq!(parser.parse("x y").result.as_deref(), Some("s__X_Y"));
    assert_eq!(parser.parse("x y z w").result.as_deref(), Some("s__X_Y_Z_W?"));
}

#[test]
fn test_alternatives_must_reach_the_end() {
    let parser = parser("s", &["s : x", "s : x y z"]);
    assert_eq!(parser.parse("x").result.as_deref(), Some("s__X"));
    assert_eq!(parser.parse("x y z").result.as_deref(), Some("s__X_Y_Z"));
}

#[test]
fn test_one_token_before_the_end_counts_as_ended() {
    let single = parser("s", &["s : x"]);
    let tokens = single.lexer().tokenize("x y").unwrap();
    let raw = single.parse_tokens(&tokens);
    assert!(raw.is_match());
    assert!(raw.is_ended);
    assert_eq!(raw.ending_position, 1);
    assert_eq!(single.parse("x y").result.as_deref(), Some("s__X"));

    // the earlier alternative wins even though it leaves `y` unread
    let shorter_first = parser("s", &["s : x", "s : x y"]);
    assert_eq!(shorter_first.parse("x y").result.as_deref(), Some("s__X"));
}

#[test]
fn test_nested_non_terminal_keeps_first_match() {
    let parser = parser("s", &["s : n z", "n : x", "n : x y"]);
    assert!(parser.parse("x z").is_ok());

    // `n : x` wins inside `s`, so `x y z` is never tried as `n : x y`
    let error = syntax_error(&parser, "x y z");
    assert_eq!(error.token.kind, Letter::Y);
    assert_eq!(error.expected(), &[Letter::Z]);
}

#[test]
fn test_error_from_furthest_attempt() {
    let parser = parser("s", &["s : x y z", "s : x w"]);
    let error = syntax_error(&parser, "x y w");
    assert_eq!(error.token.kind, Letter::W);
    assert_eq!(error.expected(), &[Letter::Z]);
    assert_eq!(error.position().column, 4);
}

#[test]
fn test_richer_expectation_wins_at_same_position() {
    let parser = parser("s", &["s : x y", "s : x n", "n : z", "n : w"]);
    let error = syntax_error(&parser, "x x");
    assert_eq!(error.expected(), &[Letter::Z, Letter::W]);
    assert_eq!(
        error.to_string(),
        "unexpected token 'x' (X) at line 1, column 3, expected Z or W"
    );
}

#[test]
fn test_failed_alternative_inside_successful_match_is_remembered() {
    let parser = parser("s", &["s : n w", "n : x y z", "n : x"]);
    assert!(parser.parse("x w").is_ok());

    // `n : x y z` got to `w` before `n : x` matched
    let error = syntax_error(&parser, "x y w");
    assert_eq!(error.token.kind, Letter::W);
    assert_eq!(error.expected(), &[Letter::Z]);
}

#[test]
fn test_trailing_input_expects_nothing() {
    let parser = parser("s", &["s : x"]);
    let error = syntax_error(&parser, "x y y");
    assert_eq!(error.token.kind, Letter::Y);
    assert!(error.expected.is_none());
    assert_eq!(error.to_string(), "unexpected token 'y' (Y) at line 1, column 3");
}

#[test]
fn test_unexpected_end_of_input() {
    let parser = parser("s", &["s : x y"]);
    let error = syntax_error(&parser, "x");
    assert!(error.token.is_eof());
    assert_eq!(
        error.to_string(),
        "unexpected end of input at line 1, column 2, expected Y"
    );
}

#[test]
fn test_no_candidate_lists_leading_tokens() {
    let parser = parser("s", &["s : n", "n : x", "n : y", "n : z"]);
    let error = syntax_error(&parser, "w");
    assert_eq!(error.expected(), &[Letter::X, Letter::Y, Letter::Z]);
    assert!(error.to_string().ends_with("expected one of X, Y, or Z"));

    let error = syntax_error(&parser, "");
    assert!(error.token.is_eof());
}

#[test]
fn test_optional_prefix_candidates() {
    let parser = parser("s", &["s : x? y"]);
    assert!(parser.parse("y").is_ok());
    assert!(parser.parse("x y").is_ok());
    let error = syntax_error(&parser, "x x");
    assert_eq!(error.expected(), &[Letter::Y]);
}

#[test]
fn test_error_rendering_with_source_line() {
    let parser = parser("s", &["s : x y z"]);
    let source = "x y\n  w";
    let result = parser.parse(source);
    let rendered = format_error_with_context(&result.errors[0], source);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(
        lines[0],
        "unexpected token 'w' (W) at line 2, column 3, expected Z"
    );
    assert_eq!(lines[2], "2 |   w");
    assert_eq!(lines[3], "  |   ^");
}

#[test]
fn test_parse_with_other_start() {
    let parser = parser("s", &["s : x", "t : y"]);
    assert!(parser.parse("y").is_error());
    assert_eq!(
        parser.parse_with_start("y", "t").result.as_deref(),
        Some("t__Y")
    );
    assert!(parser.parse_with_start("y", "unknown").is_error());
}

#[test]
fn test_configured_start() {
    use descent::{GrammarError, ParserConfig};

    let lexer = LexerBuilder::new().token(Letter::Y, "y").build().unwrap();
    let grammar = GrammarBuilder::new("s")
        .production("s : x", |_| Ok(0))
        .production("t : y", |_| Ok(1))
        .build()
        .unwrap();

    let configured = Parser::with_config(lexer, grammar, ParserConfig::with_start("t")).unwrap();
    assert_eq!(configured.start(), "t");
    assert_eq!(configured.parse("y").result, Some(1));

    let error = Parser::with_config(
        LexerBuilder::new().token(Letter::Y, "y").build().unwrap(),
        GrammarBuilder::<Letter, i32>::new("s")
            .production("s : x", |_| Ok(0))
            .build()
            .unwrap(),
        ParserConfig::with_start("missing"),
    )
    .unwrap_err();
    assert_eq!(error, GrammarError::UndefinedStart("missing".into()));
}
