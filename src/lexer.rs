use crate::{
    ast::{CompoundOp, Keyword, Token},
    error::CompileError,
};

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    /// Position of the first character of the last token returned
    token_start: usize,
    /// Added to reported positions (template interpolations are lexed separately)
    offset: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self::with_offset(input, 0)
    }

    /// Lexer over a fragment that starts `offset` characters into the
    /// enclosing source.
    pub fn with_offset(input: &str, offset: usize) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            token_start: 0,
            offset,
        }
    }

    /// Start position of the most recently returned token.
    pub fn token_position(&self) -> usize {
        self.token_start + self.offset
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::syntax(message, self.position + self.offset)
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn slice(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), CompileError> {
        loop {
            match (self.current_char(), self.peek_char(1)) {
                (Some(ch), _) if ch.is_whitespace() => self.advance(),
                (Some('/'), Some('/')) => {
                    while let Some(ch) = self.current_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                (Some('/'), Some('*')) => {
                    self.advance();
                    self.advance();
                    loop {
                        match (self.current_char(), self.peek_char(1)) {
                            (Some('*'), Some('/')) => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            (Some(_), _) => self.advance(),
                            (None, _) => return Err(self.error("Unterminated comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn is_identifier_start(ch: char) -> bool {
        ch.is_alphabetic() || ch == '_' || ch == '$'
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<Token, CompileError> {
        let start = self.position;
        let mut value = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(Token::String {
                        value,
                        raw: self.slice(start),
                    });
                }
                '\n' => return Err(self.error("Unterminated string: line break in literal")),
                '\\' => {
                    self.advance();
                    self.read_escape(&mut value)?;
                }
                _ => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        Err(self.error("Unterminated string: missing closing quote"))
    }

    /// Reads the escape following a backslash into `out`.
    fn read_escape(&mut self, out: &mut String) -> Result<(), CompileError> {
        let ch = self
            .current_char()
            .ok_or_else(|| self.error("Unterminated string: unexpected end after backslash"))?;
        self.advance();
        match ch {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !self.current_char().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            'x' => {
                let code = self.read_hex_digits(2)?;
                out.push(self.code_point(code)?);
            }
            'u' => {
                let code = if self.current_char() == Some('{') {
                    self.advance();
                    let mut digits = String::new();
                    while let Some(c) = self.current_char() {
                        if c == '}' {
                            break;
                        }
                        digits.push(c);
                        self.advance();
                    }
                    if self.current_char() != Some('}') {
                        return Err(self.error("Unterminated unicode escape"));
                    }
                    self.advance();
                    u32::from_str_radix(&digits, 16)
                        .map_err(|_| self.error(format!("Invalid unicode escape: \\u{{{}}}", digits)))?
                } else {
                    self.read_hex_digits(4)?
                };
                out.push(self.code_point(code)?);
            }
            '\n' => {} // line continuation
            c if c.is_ascii_digit() => {
                return Err(self.error(format!("Octal escape sequences are not supported: \\{}", c)));
            }
            other => out.push(other),
        }
        Ok(())
    }

    fn read_hex_digits(&mut self, count: usize) -> Result<u32, CompileError> {
        let mut digits = String::new();
        for _ in 0..count {
            match self.current_char() {
                Some(c) if c.is_ascii_hexdigit() => {
                    digits.push(c);
                    self.advance();
                }
                _ => return Err(self.error("Invalid hexadecimal escape sequence")),
            }
        }
        u32::from_str_radix(&digits, 16).map_err(|_| self.error("Invalid hexadecimal escape sequence"))
    }

    fn code_point(&self, code: u32) -> Result<char, CompileError> {
        char::from_u32(code).ok_or_else(|| self.error(format!("Invalid code point: {:#x}", code)))
    }

    fn read_template(&mut self) -> Result<Token, CompileError> {
        self.advance(); // opening backtick
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();
        let mut chunk = String::new();

        loop {
            match self.current_char() {
                None => return Err(self.error("Unterminated template literal")),
                Some('`') => {
                    self.advance();
                    quasis.push(chunk);
                    return Ok(Token::Template { quasis, exprs });
                }
                Some('\\') => {
                    chunk.push('\\');
                    self.advance();
                    let escaped = self
                        .current_char()
                        .ok_or_else(|| self.error("Unterminated template literal"))?;
                    chunk.push(escaped);
                    self.advance();
                }
                Some('$') if self.peek_char(1) == Some('{') => {
                    self.advance();
                    self.advance();
                    quasis.push(std::mem::take(&mut chunk));
                    let start = self.position;
                    self.skip_interpolation()?;
                    exprs.push((self.slice(start), start + self.offset));
                    self.advance(); // closing brace
                }
                Some(ch) => {
                    chunk.push(ch);
                    self.advance();
                }
            }
        }
    }

    /// Moves to the `}` closing an interpolation, stepping over nested
    /// braces, strings and templates.
    fn skip_interpolation(&mut self) -> Result<(), CompileError> {
        let mut depth = 0usize;
        loop {
            match self.current_char() {
                None => return Err(self.error("Unterminated template interpolation")),
                Some('{') => {
                    depth += 1;
                    self.advance();
                }
                Some('}') => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                    self.advance();
                }
                Some(q @ ('"' | '\'')) => {
                    self.read_string(q)?;
                }
                Some('`') => {
                    self.read_template()?;
                }
                Some(_) => self.advance(),
            }
        }
    }

    fn read_number(&mut self) -> Result<Token, CompileError> {
        let start = self.position;

        if self.current_char() == Some('0')
            && let Some(radix) = match self.peek_char(1) {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            }
        {
            self.advance();
            self.advance();
            let digits_start = self.position;
            while self.current_char().is_some_and(|c| c.is_digit(radix)) {
                self.advance();
            }
            let digits = self.slice(digits_start);
            let value = u64::from_str_radix(&digits, radix)
                .map_err(|_| self.error(format!("Invalid numeric literal: {}", self.slice(start))))?;
            return self.finish_number(start, value as f64);
        }

        while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.current_char() == Some('.') {
            self.advance();
            while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.current_char(), Some('e' | 'E')) {
            let exponent_digit = match self.peek_char(1) {
                Some('+' | '-') => self.peek_char(2),
                other => other,
            };
            if !exponent_digit.is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.error("Invalid numeric literal: missing exponent"));
            }
            self.advance();
            if matches!(self.current_char(), Some('+' | '-')) {
                self.advance();
            }
            while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let raw = self.slice(start);
        let value = raw
            .parse::<f64>()
            .map_err(|_| self.error(format!("Invalid numeric literal: {}", raw)))?;
        self.finish_number(start, value)
    }

    fn finish_number(&mut self, start: usize, value: f64) -> Result<Token, CompileError> {
        if self.current_char().is_some_and(|c| Self::is_identifier_start(c) || c.is_ascii_digit()) {
            return Err(self.error("Identifier directly after number"));
        }
        Ok(Token::Number {
            value,
            raw: self.slice(start),
        })
    }

    /// Consumes `len` characters and returns `token`.
    fn punct(&mut self, len: usize, token: Token) -> Result<Token, CompileError> {
        self.position += len;
        Ok(token)
    }

    pub fn next_token(&mut self) -> Result<Token, CompileError> {
        self.skip_whitespace_and_comments()?;
        self.token_start = self.position;

        let (c1, c2, c3) = (self.peek_char(1), self.peek_char(2), self.peek_char(3));

        match self.current_char() {
            None => Ok(Token::Eof),
            Some('(') => self.punct(1, Token::LParen),
            Some(')') => self.punct(1, Token::RParen),
            Some('[') => self.punct(1, Token::LBracket),
            Some(']') => self.punct(1, Token::RBracket),
            Some('{') => self.punct(1, Token::LBrace),
            Some('}') => self.punct(1, Token::RBrace),
            Some(',') => self.punct(1, Token::Comma),
            Some(';') => self.punct(1, Token::Semicolon),
            Some(':') => self.punct(1, Token::Colon),
            Some('~') => self.punct(1, Token::Tilde),
            Some('^') => self.punct(1, Token::Caret),
            Some('.') => {
                if c1.is_some_and(|c| c.is_ascii_digit()) {
                    self.read_number()
                } else if c1 == Some('.') {
                    Err(self.error("Spread syntax is not supported"))
                } else {
                    self.punct(1, Token::Dot)
                }
            }
            Some('?') => match c1 {
                Some('?') => self.punct(2, Token::QuestionQuestion),
                Some('.') => Err(self.error("Optional chaining is not supported")),
                _ => self.punct(1, Token::Question),
            },
            Some('=') => match (c1, c2) {
                (Some('='), Some('=')) => self.punct(3, Token::EqEqEq),
                (Some('='), _) => self.punct(2, Token::EqEq),
                (Some('>'), _) => self.punct(2, Token::Arrow),
                _ => self.punct(1, Token::Assign),
            },
            Some('!') => match (c1, c2) {
                (Some('='), Some('=')) => self.punct(3, Token::NotEqEq),
                (Some('='), _) => self.punct(2, Token::NotEq),
                _ => self.punct(1, Token::Bang),
            },
            Some('+') => match c1 {
                Some('+') => self.punct(2, Token::PlusPlus),
                Some('=') => self.punct(2, Token::CompoundAssign(CompoundOp::Add)),
                _ => self.punct(1, Token::Plus),
            },
            Some('-') => match c1 {
                Some('-') => self.punct(2, Token::MinusMinus),
                Some('=') => self.punct(2, Token::CompoundAssign(CompoundOp::Subtract)),
                _ => self.punct(1, Token::Minus),
            },
            Some('*') => match (c1, c2) {
                (Some('*'), Some('=')) => self.punct(3, Token::CompoundAssign(CompoundOp::Power)),
                (Some('*'), _) => self.punct(2, Token::StarStar),
                (Some('='), _) => self.punct(2, Token::CompoundAssign(CompoundOp::Multiply)),
                _ => self.punct(1, Token::Star),
            },
            Some('/') => match c1 {
                Some('=') => self.punct(2, Token::CompoundAssign(CompoundOp::Divide)),
                _ => self.punct(1, Token::Slash),
            },
            Some('%') => match c1 {
                Some('=') => self.punct(2, Token::CompoundAssign(CompoundOp::Modulo)),
                _ => self.punct(1, Token::Percent),
            },
            Some('&') => match c1 {
                Some('&') => self.punct(2, Token::AndAnd),
                Some('=') => Err(self.error("Bitwise assignment is not supported")),
                _ => self.punct(1, Token::Amp),
            },
            Some('|') => match c1 {
                Some('|') => self.punct(2, Token::OrOr),
                Some('=') => Err(self.error("Bitwise assignment is not supported")),
                _ => self.punct(1, Token::Pipe),
            },
            Some('<') => match (c1, c2) {
                (Some('<'), Some('=')) => Err(self.error("Shift assignment is not supported")),
                (Some('<'), _) => self.punct(2, Token::Shl),
                (Some('='), _) => self.punct(2, Token::LtEq),
                _ => self.punct(1, Token::Lt),
            },
            Some('>') => match (c1, c2, c3) {
                (Some('>'), Some('>'), _) => self.punct(3, Token::UShr),
                (Some('>'), Some('='), _) => Err(self.error("Shift assignment is not supported")),
                (Some('>'), _, _) => self.punct(2, Token::Shr),
                (Some('='), _, _) => self.punct(2, Token::GtEq),
                _ => self.punct(1, Token::Gt),
            },
            Some(q @ ('"' | '\'')) => self.read_string(q),
            Some('`') => self.read_template(),
            Some(ch) if Self::is_identifier_start(ch) => {
                let ident = self.read_identifier();

                match ident.as_str() {
                    "true" => Ok(Token::Boolean(true)),
                    "false" => Ok(Token::Boolean(false)),
                    "null" => Ok(Token::Null),
                    word => Ok(match Keyword::from_word(word) {
                        Some(keyword) => Token::Keyword(keyword),
                        None => Token::Identifier(ident),
                    }),
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) => Err(self.error(format!("Unexpected character '{}'", ch))),
        }
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("const return true false null switch");
    assert_eq!(lexer.next_token().unwrap(), Token::Keyword(Keyword::Const));
    assert_eq!(lexer.next_token().unwrap(), Token::Keyword(Keyword::Return));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(false));
    assert_eq!(lexer.next_token().unwrap(), Token::Null);
    assert_eq!(lexer.next_token().unwrap(), Token::Keyword(Keyword::Switch));
}

#[test]
fn test_arrow() {
    let mut lexer = Lexer::new("d => d.x > 5");
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("d".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Arrow);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("d".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Dot);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("x".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Gt);
    assert!(matches!(lexer.next_token().unwrap(), Token::Number { value, .. } if value == 5.0));
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}
