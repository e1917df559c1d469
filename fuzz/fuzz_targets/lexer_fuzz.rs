#![no_main]
use descent::lexer::CommentDefinition;
use descent::{LexerBuilder, TokenKind};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FuzzKind {
    Number,
    Ident,
    Punct,
    Whitespace,
    Newline,
    Eof,
}

impl TokenKind for FuzzKind {
    const EOF: Self = Self::Eof;

    fn from_name(_: &str) -> Option<Self> {
        None
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(lexer) = LexerBuilder::new()
        .token(FuzzKind::Number, r"[0-9]+(\.[0-9]+)?")
        .token(FuzzKind::Ident, r"\w+")
        .token(FuzzKind::Punct, r"[[:punct:]]")
        .discard(FuzzKind::Whitespace, r"[ \t]+")
        .line_break(FuzzKind::Newline, r"\r\n|\r|\n")
        .comments(CommentDefinition::c_style())
        .build()
    else {
        return;
    };

    if let Ok(tokens) = lexer.tokenize(source) {
        // exactly one end marker, last
        let last = tokens.last().expect("end marker");
        assert!(last.is_eof());
        assert_eq!(tokens.iter().filter(|t| t.is_eof()).count(), 1);
        assert_eq!(last.position.offset, source.len());

        let mut previous = 0;
        for token in &tokens[..tokens.len() - 1] {
            assert!(token.position.offset >= previous);
            assert_eq!(
                &source[token.position.offset..token.position.offset + token.text.len()],
                token.text()
            );
            previous = token.position.offset + token.text.len();
        }
    }
});
