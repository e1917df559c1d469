//! Tests for lexer functionality

use descent::error::LexerErrorKind;
use descent::lexer::{CommentDefinition, TokenDefinition};
use descent::{LexerBuilder, Position, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TestTokenKind {
    Double,
    Int,
    Ident,
    Keyword,
    Plus,
    Whitespace,
    Newline,
    Eof,
}

impl TokenKind for TestTokenKind {
    const EOF: Self = Self::Eof;

    fn from_name(_: &str) -> Option<Self> {
        None
    }
}

fn kinds(source: &str, builder: LexerBuilder<TestTokenKind>) -> Vec<TestTokenKind> {
    builder
        .build()
        .unwrap()
        .tokenize(source)
        .unwrap()
        .iter()
        .map(|token| token.kind)
        .collect()
}

fn number_lexer() -> LexerBuilder<TestTokenKind> {
    LexerBuilder::new()
        .token(TestTokenKind::Double, r"[0-9]+\.[0-9]+")
        .token(TestTokenKind::Int, "[0-9]+")
        .token(TestTokenKind::Plus, r"\+")
        .discard(TestTokenKind::Whitespace, "[ \t]+")
        .line_break(TestTokenKind::Newline, r"\r?\n")
}

#[test]
fn test_declaration_order_decides() {
    use TestTokenKind::*;

    assert_eq!(kinds("1.5 + 2", number_lexer()), vec![Double, Plus, Int, Eof]);

    // with Int declared first, "1.5" can never be a double
    let int_first = LexerBuilder::new()
        .token(Int, "[0-9]+")
        .token(Double, r"[0-9]+\.[0-9]+")
        .discard(Whitespace, " +");
    let error = int_first.build().unwrap().tokenize("1.5").unwrap_err();
    assert_eq!(error.kind, LexerErrorKind::UnexpectedChar { char: '.' });
    assert_eq!(error.position, Position::new(0, 1, 1));
}

#[test]
fn test_first_match_beats_longest_match() {
    use TestTokenKind::*;

    let builder = LexerBuilder::new()
        .token(Keyword, "if")
        .token(Ident, "[a-z]+")
        .discard(Whitespace, " +");
    let lexer = builder.build().unwrap();
    let tokens = lexer.tokenize("if iffy").unwrap();

    assert_eq!(tokens[0].kind, Keyword);
    assert_eq!(tokens[1].kind, Keyword);
    assert_eq!(tokens[1].text(), "if");
    assert_eq!(tokens[2].kind, Ident);
    assert_eq!(tokens[2].text(), "fy");
}

#[test]
fn test_discarded_tokens_are_dropped() {
    let lexer = number_lexer().build().unwrap();
    let tokens = lexer.tokenize("  1 \t+\t 2  ").unwrap();
    let texts: Vec<&str> = tokens.iter().map(|token| token.text()).collect();
    assert_eq!(texts, vec!["1", "+", "2", ""]);
    assert_eq!(tokens[2].position.column, 8);
}

#[test]
fn test_line_and_column_tracking() {
    let lexer = number_lexer().build().unwrap();
    let tokens = lexer.tokenize("1\n  2\r\n\n3").unwrap();

    assert_eq!(tokens[0].position, Position::new(0, 0, 0));
    assert_eq!(tokens[1].position, Position::new(1, 2, 4));
    assert_eq!(tokens[2].position, Position::new(3, 0, 8));
    assert_eq!(tokens[3].position.line, 3);
    assert_eq!(tokens[3].position.column, 1);
}

#[test]
fn test_unexpected_character() {
    let lexer = number_lexer().build().unwrap();
    let error = lexer.tokenize("1 +\n  $").unwrap_err();

    assert_eq!(error.kind, LexerErrorKind::UnexpectedChar { char: '$' });
    assert_eq!(error.position, Position::new(1, 2, 6));
    assert_eq!(
        error.to_string(),
        "unexpected character '$' at line 2, column 3"
    );
}

#[test]
fn test_invalid_pattern() {
    let error = LexerBuilder::new()
        .token(TestTokenKind::Int, "[0-9")
        .build()
        .unwrap_err();

    assert!(matches!(
        &error.kind,
        LexerErrorKind::InvalidPattern { pattern, .. } if pattern == "[0-9"
    ));
}

#[test]
fn test_single_and_multi_line_comments() {
    use TestTokenKind::*;

    let builder = number_lexer().comments(CommentDefinition::c_style());
    let lexer = builder.build().unwrap();
    let tokens = lexer
        .tokenize("1 // one\n+ /* two\nlines */ 2")
        .unwrap();

    let kinds: Vec<_> = tokens.iter().map(|token| token.kind).collect();
    assert_eq!(kinds, vec![Int, Plus, Int, Eof]);
    assert_eq!(tokens[1].position.line, 1);
    assert_eq!(tokens[2].position, Position::new(2, 9, 27));
}

#[test]
fn test_comment_opener_takes_precedence() {
    use TestTokenKind::*;

    let builder = LexerBuilder::new()
        .token(Ident, "[a-z#]+")
        .discard(Whitespace, " +")
        .comments(CommentDefinition::new().single_line("#"));
    assert_eq!(kinds("a #b c", builder), vec![Ident, Eof]);
}

#[test]
fn test_unterminated_comment() {
    let builder = number_lexer().comments(CommentDefinition::new().multi_line("(*", "*)"));
    let error = builder.build().unwrap().tokenize("1 (* 2").unwrap_err();

    assert_eq!(
        error.kind,
        LexerErrorKind::UnterminatedComment {
            closer: "*)".into()
        }
    );
    assert_eq!(error.position.column, 2);
}

#[test]
fn test_empty_comment_delimiter_is_rejected() {
    let error = number_lexer()
        .comments(CommentDefinition::new().single_line(""))
        .build()
        .unwrap_err();
    assert!(matches!(error.kind, LexerErrorKind::InvalidPattern { .. }));
}

#[test]
fn test_definitions_are_kept_in_order() {
    let lexer = LexerBuilder::new()
        .token(TestTokenKind::Int, "[0-9]+")
        .definition(TokenDefinition {
            discard: true,
            ..TokenDefinition::new(TestTokenKind::Whitespace, " +")
        })
        .build()
        .unwrap();

    let definitions: Vec<_> = lexer.definitions().collect();
    assert_eq!(definitions.len(), 2);
    assert_eq!(definitions[0].kind, TestTokenKind::Int);
    assert!(definitions[1].is_skipped());
    assert_eq!(lexer.tokenize("1 2").unwrap().len(), 3);
}

#[test]
fn test_lexer_is_reusable() {
    let lexer = number_lexer().build().unwrap();
    let first = lexer.tokenize("1 + 2").unwrap();
    let second = lexer.tokenize("1 + 2").unwrap();
    assert_eq!(first, second);
    assert!(lexer.tokenize("").unwrap()[0].is_eof());
}
