#![no_main]
use descent::{GrammarBuilder, LexerBuilder, Parser, TokenKind};
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum JsonKind {
    Number,
    Str,
    Literal,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    Whitespace,
    Eof,
}

impl TokenKind for JsonKind {
    const EOF: Self = Self::Eof;

    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "NUMBER" => Self::Number,
            "STRING" => Self::Str,
            "LITERAL" => Self::Literal,
            "LBRACE" => Self::LBrace,
            "RBRACE" => Self::RBrace,
            "LBRACKET" => Self::LBracket,
            "RBRACKET" => Self::RBracket,
            "COLON" => Self::Colon,
            "COMMA" => Self::Comma,
            _ => return None,
        })
    }
}

/// Counts values, so every successful parse must count at least one.
fn parser() -> &'static Parser<JsonKind, usize> {
    static PARSER: OnceLock<Parser<JsonKind, usize>> = OnceLock::new();
    PARSER.get_or_init(|| {
        let lexer = LexerBuilder::new()
            .token(JsonKind::Number, r"-?[0-9]+(\.[0-9]+)?")
            .token(JsonKind::Str, r#""[^"]*""#)
            .token(JsonKind::Literal, "true|false|null")
            .token(JsonKind::LBrace, r"\{")
            .token(JsonKind::RBrace, r"\}")
            .token(JsonKind::LBracket, r"\[")
            .token(JsonKind::RBracket, r"\]")
            .token(JsonKind::Colon, ":")
            .token(JsonKind::Comma, ",")
            .discard(JsonKind::Whitespace, r"\s+")
            .build()
            .expect("valid patterns");

        let grammar = GrammarBuilder::new("value")
            .production("value : NUMBER", |_| Ok(1))
            .production("value : STRING", |_| Ok(1))
            .production("value : LITERAL", |_| Ok(1))
            .production("value : LBRACE (member (COMMA member)*)? RBRACE", |args| {
                let Some(mut members) = args.option_group(1)? else {
                    return Ok(1);
                };
                let mut count = 1 + members.value(0)?;
                for mut rest in members.groups(1)? {
                    count += rest.value(1)?;
                }
                Ok(count)
            })
            .production("value : LBRACKET (value (COMMA value)*)? RBRACKET", |args| {
                let Some(mut values) = args.option_group(1)? else {
                    return Ok(1);
                };
                let mut count = 1 + values.value(0)?;
                for mut rest in values.groups(1)? {
                    count += rest.value(1)?;
                }
                Ok(count)
            })
            .production("member : STRING COLON value", |args| args.value(2))
            .build()
            .expect("valid grammar");

        Parser::new(lexer, grammar)
    })
}

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    let result = parser().parse(source);
    match result.result {
        Some(count) => {
            assert!(count >= 1);
            assert!(result.errors.is_empty());
        }
        None => assert_eq!(result.errors.len(), 1),
    }
});
