// tests/lexer_tests.rs

use colexpr::ast::{CompoundOp, Keyword, Token};
use colexpr::error::CompileError;
use colexpr::lexer::Lexer;

fn tokens(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut out = Vec::new();
    loop {
        let token = lexer.next_token().unwrap();
        if token == Token::Eof {
            break;
        }
        out.push(token);
    }
    out
}

fn lex_error(input: &str) -> CompileError {
    let mut lexer = Lexer::new(input);
    loop {
        match lexer.next_token() {
            Ok(Token::Eof) => panic!("expected an error for {:?}", input),
            Ok(_) => continue,
            Err(e) => return e,
        }
    }
}

// ============================================================================
// Punctuation
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("(", Token::LParen),
        (")", Token::RParen),
        ("[", Token::LBracket),
        ("]", Token::RBracket),
        ("{", Token::LBrace),
        ("}", Token::RBrace),
        (",", Token::Comma),
        (";", Token::Semicolon),
        (":", Token::Colon),
        ("?", Token::Question),
        (".", Token::Dot),
        ("+", Token::Plus),
        ("-", Token::Minus),
        ("*", Token::Star),
        ("/", Token::Slash),
        ("%", Token::Percent),
        ("!", Token::Bang),
        ("~", Token::Tilde),
        ("&", Token::Amp),
        ("|", Token::Pipe),
        ("^", Token::Caret),
        ("<", Token::Lt),
        (">", Token::Gt),
        ("=", Token::Assign),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token, expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

#[test]
fn test_multi_char_tokens() {
    let test_cases = vec![
        ("=>", Token::Arrow),
        ("==", Token::EqEq),
        ("===", Token::EqEqEq),
        ("!=", Token::NotEq),
        ("!==", Token::NotEqEq),
        ("<=", Token::LtEq),
        (">=", Token::GtEq),
        ("&&", Token::AndAnd),
        ("||", Token::OrOr),
        ("??", Token::QuestionQuestion),
        ("**", Token::StarStar),
        ("++", Token::PlusPlus),
        ("--", Token::MinusMinus),
        ("<<", Token::Shl),
        (">>", Token::Shr),
        (">>>", Token::UShr),
        ("+=", Token::CompoundAssign(CompoundOp::Add)),
        ("-=", Token::CompoundAssign(CompoundOp::Subtract)),
        ("*=", Token::CompoundAssign(CompoundOp::Multiply)),
        ("/=", Token::CompoundAssign(CompoundOp::Divide)),
        ("%=", Token::CompoundAssign(CompoundOp::Modulo)),
        ("**=", Token::CompoundAssign(CompoundOp::Power)),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.next_token().unwrap(), expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

#[test]
fn test_unsupported_punctuation() {
    for input in ["...xs", "a?.b", "a &= 1", "a |= 1", "a <<= 1", "a >>= 1", "#"] {
        assert!(
            matches!(lex_error(input), CompileError::Syntax { .. }),
            "Expected syntax error for {}",
            input
        );
    }
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_numbers_keep_raw_text() {
    let test_cases = vec![
        ("42", 42.0, "42"),
        ("3.25", 3.25, "3.25"),
        (".5", 0.5, ".5"),
        ("1e-5", 1e-5, "1e-5"),
        ("2E+3", 2000.0, "2E+3"),
        ("0x1F", 31.0, "0x1F"),
        ("0o17", 15.0, "0o17"),
        ("0b101", 5.0, "0b101"),
    ];

    for (input, expected_value, expected_raw) in test_cases {
        match tokens(input).as_slice() {
            [Token::Number { value, raw }] => {
                assert_eq!(*value, expected_value, "Failed for input: {}", input);
                assert_eq!(raw, expected_raw);
            }
            other => panic!("Expected a number for {}, got {:?}", input, other),
        }
    }
}

#[test]
fn test_invalid_numbers() {
    assert!(matches!(lex_error("1e"), CompileError::Syntax { .. }));
    assert!(matches!(lex_error("3px"), CompileError::Syntax { .. }));
    assert!(matches!(lex_error("0xZZ"), CompileError::Syntax { .. }));
}

// ============================================================================
// Strings and templates
// ============================================================================

#[test]
fn test_strings_with_escapes() {
    let test_cases = vec![
        ("'foo'", "foo", "'foo'"),
        ("\"bar\"", "bar", "\"bar\""),
        (r"'a\nb'", "a\nb", r"'a\nb'"),
        (r"'it\'s'", "it's", r"'it\'s'"),
        (r"'\x41B\u{43}'", "ABC", r"'\x41B\u{43}'"),
        (r"'\0'", "\0", r"'\0'"),
    ];

    for (input, expected_value, expected_raw) in test_cases {
        match tokens(input).as_slice() {
            [Token::String { value, raw }] => {
                assert_eq!(value, expected_value, "Failed for input: {}", input);
                assert_eq!(raw, expected_raw);
            }
            other => panic!("Expected a string for {}, got {:?}", input, other),
        }
    }
}

#[test]
fn test_invalid_strings() {
    assert!(matches!(lex_error("'open"), CompileError::Syntax { .. }));
    assert!(matches!(lex_error("'line\nbreak'"), CompileError::Syntax { .. }));
    assert!(matches!(lex_error(r"'\1'"), CompileError::Syntax { .. }));
    assert!(matches!(lex_error(r"'\xZ1'"), CompileError::Syntax { .. }));
}

#[test]
fn test_template_literal() {
    match tokens("`${d.a} + ${ {x: 1}.x }!`").as_slice() {
        [Token::Template { quasis, exprs }] => {
            assert_eq!(quasis, &vec!["".to_string(), " + ".to_string(), "!".to_string()]);
            assert_eq!(exprs.len(), 2);
            assert_eq!(exprs[0], ("d.a".to_string(), 3));
            assert_eq!(exprs[1].0, " {x: 1}.x ");
        }
        other => panic!("Expected a template, got {:?}", other),
    }
}

#[test]
fn test_unterminated_template() {
    assert!(matches!(lex_error("`abc"), CompileError::Syntax { .. }));
    assert!(matches!(lex_error("`${d.a`"), CompileError::Syntax { .. }));
}

// ============================================================================
// Identifiers, keywords and comments
// ============================================================================

#[test]
fn test_identifiers_and_keywords() {
    assert_eq!(
        tokens("$x _y typeof void delete in instanceof let var"),
        vec![
            Token::Identifier("$x".to_string()),
            Token::Identifier("_y".to_string()),
            Token::Keyword(Keyword::Typeof),
            Token::Keyword(Keyword::Void),
            Token::Keyword(Keyword::Delete),
            Token::Keyword(Keyword::In),
            Token::Keyword(Keyword::Instanceof),
            Token::Keyword(Keyword::Let),
            Token::Keyword(Keyword::Var),
        ]
    );
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        tokens("a // trailing\n/* block\n comment */ b"),
        vec![
            Token::Identifier("a".to_string()),
            Token::Identifier("b".to_string()),
        ]
    );
    assert!(matches!(lex_error("a /* open"), CompileError::Syntax { .. }));
}

#[test]
fn test_error_position() {
    match lex_error("d => d.a @ 1") {
        CompileError::Syntax { position, .. } => assert_eq!(position, 9),
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_token_position() {
    let mut lexer = Lexer::new("  abc  def");
    lexer.next_token().unwrap();
    assert_eq!(lexer.token_position(), 2);
    lexer.next_token().unwrap();
    assert_eq!(lexer.token_position(), 7);

    let mut offset = Lexer::with_offset("x", 10);
    offset.next_token().unwrap();
    assert_eq!(offset.token_position(), 10);
}
