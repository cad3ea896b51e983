use crate::{
    ast::{
        AssignOp, BinOp, Body, CompoundOp, DeclKind, Expr, Function, Keyword, Literal, LogicalOp,
        ObjectProperty, Property, PropertyKey, Stmt, SwitchCase, Token, UnaryOp, UpdateOp,
    },
    error::CompileError,
    lexer::Lexer,
};
use std::mem;

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    /// Start position of `current_token`
    position: usize,
}

/// Parses the source of one expression function.
pub fn parse_function(source: &str) -> Result<Function, CompileError> {
    let mut parser = Parser::new(Lexer::new(source))?;
    parser.parse_function()
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, CompileError> {
        let current_token = lexer.next_token()?;
        let position = lexer.token_position();
        Ok(Parser {
            lexer,
            current_token,
            position,
        })
    }

    fn advance(&mut self) -> Result<(), CompileError> {
        self.current_token = self.lexer.next_token()?;
        self.position = self.lexer.token_position();
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::syntax(message, self.position)
    }

    fn unexpected(&self, context: &str) -> CompileError {
        self.error(format!("Unexpected {:?} {}", self.current_token, context))
    }

    fn expect(&mut self, expected: Token) -> Result<(), CompileError> {
        if mem::discriminant(&self.current_token) != mem::discriminant(&expected) {
            return Err(self.error(format!(
                "Expected {:?}, got {:?}",
                expected, self.current_token
            )));
        }
        self.advance()
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current_token == Token::Keyword(keyword)
    }

    /// Consumes a `;` if one is present.
    fn skip_semicolon(&mut self) -> Result<(), CompileError> {
        if self.check(&Token::Semicolon) {
            self.advance()?;
        }
        Ok(())
    }

    fn expect_identifier(&mut self, context: &str) -> Result<String, CompileError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Identifier(name) => {
                self.advance()?;
                Ok(name)
            }
            token => {
                self.current_token = token;
                Err(self.unexpected(context))
            }
        }
    }

    // ------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------

    /// Parse a complete expression function and require end of input.
    ///
    /// Accepted forms: `d => ...`, `(d) => ...`, `() => ...`,
    /// `function (d) { ... }`.
    pub fn parse_function(&mut self) -> Result<Function, CompileError> {
        let function = if self.check_keyword(Keyword::Function) {
            self.advance()?;
            if self.check(&Token::Identifier(String::new())) {
                self.advance()?; // function name is irrelevant
            }
            let param = self.parse_parameter_list()?;
            if !self.check(&Token::LBrace) {
                return Err(self.unexpected("where a function body was expected"));
            }
            self.advance()?;
            Function {
                param,
                body: Body::Block(self.parse_block_body()?),
            }
        } else {
            let param = if self.check(&Token::LParen) {
                self.parse_parameter_list()?
            } else {
                Some(self.expect_identifier("where a function parameter was expected")?)
            };
            self.expect(Token::Arrow)?;
            let body = if self.check(&Token::LBrace) {
                self.advance()?;
                Body::Block(self.parse_block_body()?)
            } else {
                Body::Expr(self.parse_expression()?)
            };
            Function { param, body }
        };

        self.expect(Token::Eof)?;
        Ok(function)
    }

    fn parse_parameter_list(&mut self) -> Result<Option<String>, CompileError> {
        self.expect(Token::LParen)?;
        if self.check(&Token::RParen) {
            self.advance()?;
            return Ok(None);
        }
        let name = self.expect_identifier("in parameter list")?;
        if self.check(&Token::Comma) {
            return Err(self.error("Expression functions take a single row parameter"));
        }
        self.expect(Token::RParen)?;
        Ok(Some(name))
    }

    /// Statements up to and including the closing `}`.
    fn parse_block_body(&mut self) -> Result<Vec<Stmt>, CompileError> {
        let mut statements = vec![];
        while !self.check(&Token::RBrace) {
            if self.check(&Token::Eof) {
                return Err(self.error("Unterminated block: missing '}'"));
            }
            statements.push(self.parse_statement()?);
        }
        self.expect(Token::RBrace)?;
        Ok(statements)
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    pub fn parse_statement(&mut self) -> Result<Stmt, CompileError> {
        let stmt = match &self.current_token {
            Token::LBrace => {
                self.advance()?;
                return Ok(Stmt::Block(self.parse_block_body()?));
            }
            Token::Semicolon => {
                self.advance()?;
                return Ok(Stmt::Empty);
            }
            Token::Keyword(Keyword::Const | Keyword::Let | Keyword::Var) => {
                self.parse_declaration()?
            }
            Token::Keyword(Keyword::If) => return self.parse_if(),
            Token::Keyword(Keyword::Switch) => return self.parse_switch(),
            Token::Keyword(Keyword::For) => return self.parse_for(),
            Token::Keyword(Keyword::While) => {
                self.advance()?;
                let test = self.parse_parenthesized()?;
                let body = Box::new(self.parse_statement()?);
                return Ok(Stmt::While { test, body });
            }
            Token::Keyword(Keyword::Do) => {
                self.advance()?;
                let body = Box::new(self.parse_statement()?);
                if !self.check_keyword(Keyword::While) {
                    return Err(self.unexpected("where 'while' was expected"));
                }
                self.advance()?;
                let test = self.parse_parenthesized()?;
                Stmt::DoWhile { body, test }
            }
            Token::Keyword(Keyword::Return) => {
                self.advance()?;
                if matches!(
                    self.current_token,
                    Token::Semicolon | Token::RBrace | Token::Eof
                ) {
                    Stmt::Return(None)
                } else {
                    Stmt::Return(Some(self.parse_expression()?))
                }
            }
            Token::Keyword(Keyword::Break) => {
                self.advance()?;
                Stmt::Break
            }
            Token::Keyword(Keyword::Continue) => {
                self.advance()?;
                Stmt::Continue
            }
            Token::Keyword(Keyword::Function) => {
                return Err(self.error("Function declarations are not supported"));
            }
            _ => Stmt::Expr(self.parse_expression()?),
        };
        self.skip_semicolon()?;
        Ok(stmt)
    }

    fn parse_decl_kind(&mut self) -> Result<DeclKind, CompileError> {
        let kind = match self.current_token {
            Token::Keyword(Keyword::Const) => DeclKind::Const,
            Token::Keyword(Keyword::Let) => DeclKind::Let,
            Token::Keyword(Keyword::Var) => DeclKind::Var,
            _ => return Err(self.unexpected("where a declaration was expected")),
        };
        self.advance()?;
        Ok(kind)
    }

    /// `const name = init` (without the trailing semicolon)
    fn parse_declaration(&mut self) -> Result<Stmt, CompileError> {
        let kind = self.parse_decl_kind()?;
        let name = self.expect_identifier("in declaration")?;
        self.finish_declaration(kind, name)
    }

    fn finish_declaration(&mut self, kind: DeclKind, name: String) -> Result<Stmt, CompileError> {
        let init = if self.check(&Token::Assign) {
            self.advance()?;
            Some(self.parse_assignment()?)
        } else {
            None
        };
        if init.is_none() && kind == DeclKind::Const {
            return Err(self.error(format!("Missing initializer in const declaration of '{}'", name)));
        }
        if self.check(&Token::Comma) {
            return Err(self.error("Declarations may bind a single name"));
        }
        Ok(Stmt::Declare { kind, name, init })
    }

    fn parse_parenthesized(&mut self) -> Result<Expr, CompileError> {
        self.expect(Token::LParen)?;
        let expr = self.parse_expression()?;
        self.expect(Token::RParen)?;
        Ok(expr)
    }

    fn parse_if(&mut self) -> Result<Stmt, CompileError> {
        self.advance()?; // consume 'if'
        let test = self.parse_parenthesized()?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.check_keyword(Keyword::Else) {
            self.advance()?;
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            test,
            consequent,
            alternate,
        })
    }

    fn parse_switch(&mut self) -> Result<Stmt, CompileError> {
        self.advance()?; // consume 'switch'
        let discriminant = self.parse_parenthesized()?;
        self.expect(Token::LBrace)?;

        let mut cases = vec![];
        while !self.check(&Token::RBrace) {
            let test = if self.check_keyword(Keyword::Case) {
                self.advance()?;
                Some(self.parse_expression()?)
            } else if self.check_keyword(Keyword::Default) {
                self.advance()?;
                None
            } else {
                return Err(self.unexpected("in switch body"));
            };
            self.expect(Token::Colon)?;

            let mut consequent = vec![];
            while !matches!(
                self.current_token,
                Token::Keyword(Keyword::Case | Keyword::Default) | Token::RBrace | Token::Eof
            ) {
                consequent.push(self.parse_statement()?);
            }
            cases.push(SwitchCase { test, consequent });
        }
        self.expect(Token::RBrace)?;

        Ok(Stmt::Switch {
            discriminant,
            cases,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, CompileError> {
        self.advance()?; // consume 'for'
        self.expect(Token::LParen)?;

        let mut init = None;
        if !self.check(&Token::Semicolon) {
            let kind = match self.current_token {
                Token::Keyword(Keyword::Const | Keyword::Let | Keyword::Var) => {
                    Some(self.parse_decl_kind()?)
                }
                _ => None,
            };
            if let Some(kind) = kind {
                let name = self.expect_identifier("in for loop head")?;
                if let Some(of) = self.for_each_marker()? {
                    return self.finish_for_each(Some(kind), name, of);
                }
                init = Some(Box::new(self.finish_declaration(kind, name)?));
            } else {
                let expr = self.parse_expression()?;
                match expr {
                    // `x in obj` parses as a relational expression
                    Expr::Binary {
                        op: BinOp::In,
                        left,
                        right,
                    } if self.check(&Token::RParen) => match *left {
                        Expr::Identifier(name) => {
                            self.advance()?;
                            let body = Box::new(self.parse_statement()?);
                            return Ok(Stmt::ForEach {
                                kind: None,
                                name,
                                of: false,
                                iterable: *right,
                                body,
                            });
                        }
                        left => {
                            init = Some(Box::new(Stmt::Expr(Expr::Binary {
                                op: BinOp::In,
                                left: Box::new(left),
                                right,
                            })))
                        }
                    },
                    Expr::Identifier(name) => {
                        if let Some(of) = self.for_each_marker()? {
                            return self.finish_for_each(None, name, of);
                        }
                        init = Some(Box::new(Stmt::Expr(Expr::Identifier(name))));
                    }
                    expr => init = Some(Box::new(Stmt::Expr(expr))),
                }
            }
        }
        self.expect(Token::Semicolon)?;

        let test = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(Token::Semicolon)?;

        let update = if self.check(&Token::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(Token::RParen)?;

        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For {
            init,
            test,
            update,
            body,
        })
    }

    /// Consumes `in` / `of` in a for head; returns whether it was `of`.
    fn for_each_marker(&mut self) -> Result<Option<bool>, CompileError> {
        match &self.current_token {
            Token::Keyword(Keyword::In) => {
                self.advance()?;
                Ok(Some(false))
            }
            Token::Identifier(word) if word == "of" => {
                self.advance()?;
                Ok(Some(true))
            }
            _ => Ok(None),
        }
    }

    fn finish_for_each(
        &mut self,
        kind: Option<DeclKind>,
        name: String,
        of: bool,
    ) -> Result<Stmt, CompileError> {
        let iterable = self.parse_expression()?;
        self.expect(Token::RParen)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::ForEach {
            kind,
            name,
            of,
            iterable,
            body,
        })
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    pub fn parse_expression(&mut self) -> Result<Expr, CompileError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, CompileError> {
        let target = self.parse_conditional()?;

        let op = match &self.current_token {
            Token::Assign => AssignOp(None),
            Token::CompoundAssign(op) => AssignOp(Some(match op {
                CompoundOp::Add => BinOp::Add,
                CompoundOp::Subtract => BinOp::Subtract,
                CompoundOp::Multiply => BinOp::Multiply,
                CompoundOp::Divide => BinOp::Divide,
                CompoundOp::Modulo => BinOp::Modulo,
                CompoundOp::Power => BinOp::Power,
            })),
            _ => return Ok(target),
        };

        if !matches!(target, Expr::Identifier(_) | Expr::Member { .. }) {
            return Err(self.error("Invalid assignment target"));
        }
        self.advance()?;
        let value = self.parse_assignment()?; // right-associative

        Ok(Expr::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    fn parse_conditional(&mut self) -> Result<Expr, CompileError> {
        let test = self.parse_binary(0)?;
        if !self.check(&Token::Question) {
            return Ok(test);
        }
        self.advance()?;
        let consequent = self.parse_assignment()?;
        self.expect(Token::Colon)?;
        let alternate = self.parse_assignment()?;
        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    /// Binding power of the current token as an infix operator.
    fn infix_operator(&self) -> Option<(u8, Infix)> {
        let entry = match &self.current_token {
            Token::QuestionQuestion => (1, Infix::Logical(LogicalOp::NullCoalesce)),
            Token::OrOr => (1, Infix::Logical(LogicalOp::Or)),
            Token::AndAnd => (2, Infix::Logical(LogicalOp::And)),
            Token::Pipe => (3, Infix::Binary(BinOp::BitOr)),
            Token::Caret => (4, Infix::Binary(BinOp::BitXor)),
            Token::Amp => (5, Infix::Binary(BinOp::BitAnd)),
            Token::EqEq => (6, Infix::Binary(BinOp::Equal)),
            Token::NotEq => (6, Infix::Binary(BinOp::NotEqual)),
            Token::EqEqEq => (6, Infix::Binary(BinOp::StrictEqual)),
            Token::NotEqEq => (6, Infix::Binary(BinOp::StrictNotEqual)),
            Token::Lt => (7, Infix::Binary(BinOp::LessThan)),
            Token::Gt => (7, Infix::Binary(BinOp::GreaterThan)),
            Token::LtEq => (7, Infix::Binary(BinOp::LessEqual)),
            Token::GtEq => (7, Infix::Binary(BinOp::GreaterEqual)),
            Token::Keyword(Keyword::In) => (7, Infix::Binary(BinOp::In)),
            Token::Keyword(Keyword::Instanceof) => (7, Infix::Binary(BinOp::InstanceOf)),
            Token::Shl => (8, Infix::Binary(BinOp::ShiftLeft)),
            Token::Shr => (8, Infix::Binary(BinOp::ShiftRight)),
            Token::UShr => (8, Infix::Binary(BinOp::UnsignedShiftRight)),
            Token::Plus => (9, Infix::Binary(BinOp::Add)),
            Token::Minus => (9, Infix::Binary(BinOp::Subtract)),
            Token::Star => (10, Infix::Binary(BinOp::Multiply)),
            Token::Slash => (10, Infix::Binary(BinOp::Divide)),
            Token::Percent => (10, Infix::Binary(BinOp::Modulo)),
            _ => return None,
        };
        Some(entry)
    }

    /// Left-associative binary operators with precedence above `min`.
    fn parse_binary(&mut self, min: u8) -> Result<Expr, CompileError> {
        let mut left = self.parse_exponent()?;

        while let Some((precedence, infix)) = self.infix_operator() {
            if precedence <= min {
                break;
            }
            self.advance()?;
            let right = self.parse_binary(precedence)?;

            left = match infix {
                Infix::Binary(op) => Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                Infix::Logical(op) => Expr::Logical {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Ok(left)
    }

    fn parse_exponent(&mut self) -> Result<Expr, CompileError> {
        // `(-a) ** 2` is fine, `-a ** 2` is not; parentheses leave no node.
        let bare_unary = matches!(
            self.current_token,
            Token::Minus
                | Token::Plus
                | Token::Bang
                | Token::Tilde
                | Token::Keyword(Keyword::Typeof | Keyword::Void | Keyword::Delete)
        );
        let base = self.parse_unary()?;
        if !self.check(&Token::StarStar) {
            return Ok(base);
        }
        if bare_unary {
            return Err(self.error("Unary operand of '**' must be parenthesized"));
        }
        self.advance()?;
        let exponent = self.parse_exponent()?; // right-associative
        Ok(Expr::Binary {
            op: BinOp::Power,
            left: Box::new(base),
            right: Box::new(exponent),
        })
    }

    fn parse_unary(&mut self) -> Result<Expr, CompileError> {
        let op = match &self.current_token {
            Token::Minus => UnaryOp::Negate,
            Token::Plus => UnaryOp::Plus,
            Token::Bang => UnaryOp::Not,
            Token::Tilde => UnaryOp::BitNot,
            Token::Keyword(Keyword::Typeof) => UnaryOp::Typeof,
            Token::Keyword(Keyword::Void) => UnaryOp::Void,
            Token::Keyword(Keyword::Delete) => UnaryOp::Delete,
            Token::PlusPlus | Token::MinusMinus => {
                let op = if self.check(&Token::PlusPlus) {
                    UpdateOp::Increment
                } else {
                    UpdateOp::Decrement
                };
                self.advance()?;
                let argument = self.parse_unary()?;
                return Ok(Expr::Update {
                    op,
                    prefix: true,
                    argument: Box::new(argument),
                });
            }
            _ => return self.parse_postfix(),
        };
        self.advance()?;
        let argument = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            argument: Box::new(argument),
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr, CompileError> {
        let expr = self.parse_access()?;
        let op = match self.current_token {
            Token::PlusPlus => UpdateOp::Increment,
            Token::MinusMinus => UpdateOp::Decrement,
            _ => return Ok(expr),
        };
        self.advance()?;
        Ok(Expr::Update {
            op,
            prefix: false,
            argument: Box::new(expr),
        })
    }

    /// Member access and calls chained onto a primary expression
    fn parse_access(&mut self) -> Result<Expr, CompileError> {
        let mut expr = if self.check_keyword(Keyword::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };

        loop {
            match &self.current_token {
                Token::Dot => {
                    self.advance()?; // consume '.'
                    let name = self.parse_property_name()?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property: Property::Named(name),
                    };
                }
                Token::LBracket => {
                    self.advance()?; // consume '['
                    let key = self.parse_expression()?;
                    self.expect(Token::RBracket)?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property: Property::Computed(Box::new(key)),
                    };
                }
                Token::LParen => {
                    let args = self.parse_arguments()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                Token::Template { .. } => {
                    return Err(self.error("Tagged templates are not supported"));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// After a dot any name is allowed, reserved words included.
    fn parse_property_name(&mut self) -> Result<String, CompileError> {
        let name = match &self.current_token {
            Token::Identifier(name) => name.clone(),
            Token::Keyword(keyword) => keyword.as_str().to_string(),
            Token::Boolean(b) => b.to_string(),
            Token::Null => "null".to_string(),
            _ => return Err(self.unexpected("after '.'")),
        };
        self.advance()?;
        Ok(name)
    }

    fn parse_new(&mut self) -> Result<Expr, CompileError> {
        self.advance()?; // consume 'new'
        let mut callee = if self.check_keyword(Keyword::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            match &self.current_token {
                Token::Dot => {
                    self.advance()?;
                    let name = self.parse_property_name()?;
                    callee = Expr::Member {
                        object: Box::new(callee),
                        property: Property::Named(name),
                    };
                }
                Token::LBracket => {
                    self.advance()?;
                    let key = self.parse_expression()?;
                    self.expect(Token::RBracket)?;
                    callee = Expr::Member {
                        object: Box::new(callee),
                        property: Property::Computed(Box::new(key)),
                    };
                }
                _ => break,
            }
        }
        let args = if self.check(&Token::LParen) {
            self.parse_arguments()?
        } else {
            vec![]
        };
        Ok(Expr::New {
            callee: Box::new(callee),
            args,
        })
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, CompileError> {
        self.expect(Token::LParen)?;
        let mut args = vec![];
        while !self.check(&Token::RParen) {
            args.push(self.parse_assignment()?);
            if !self.check(&Token::RParen) {
                self.expect(Token::Comma)?;
            }
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }

    /// Parse primary expressions (atoms): literals, names, groups,
    /// array/object literals and templates
    fn parse_primary(&mut self) -> Result<Expr, CompileError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Number { value, raw } => {
                self.advance()?;
                Ok(Expr::Literal(Literal::Number { value, raw }))
            }
            Token::String { value, raw } => {
                self.advance()?;
                Ok(Expr::Literal(Literal::String { value, raw }))
            }
            Token::Boolean(b) => {
                self.advance()?;
                Ok(Expr::Literal(Literal::Boolean(b)))
            }
            Token::Null => {
                self.advance()?;
                Ok(Expr::Literal(Literal::Null))
            }
            Token::Template { quasis, exprs } => {
                self.advance()?;
                let exprs = exprs
                    .into_iter()
                    .map(|(source, offset)| parse_interpolation(&source, offset))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Expr::Template { quasis, exprs })
            }
            Token::Identifier(name) => {
                self.advance()?;
                if self.check(&Token::Arrow) {
                    return Err(self.error("Nested functions are not supported"));
                }
                Ok(Expr::Identifier(name))
            }
            Token::Keyword(Keyword::This) => {
                self.advance()?;
                Ok(Expr::This)
            }
            Token::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                if self.check(&Token::Arrow) {
                    return Err(self.error("Nested functions are not supported"));
                }
                Ok(expr)
            }
            Token::LBracket => {
                self.advance()?;
                self.parse_array_literal()
            }
            Token::LBrace => {
                self.advance()?;
                self.parse_object_literal()
            }
            Token::Keyword(Keyword::Function) => {
                self.current_token = Token::Keyword(Keyword::Function);
                Err(self.error("Function expressions are not supported"))
            }
            token => {
                self.current_token = token;
                Err(self.unexpected("in expression"))
            }
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expr, CompileError> {
        let mut elements = vec![];

        while !self.check(&Token::RBracket) {
            if self.check(&Token::Comma) {
                return Err(self.error("Array holes are not supported"));
            }
            elements.push(self.parse_assignment()?);

            if !self.check(&Token::RBracket) {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::RBracket)?;
        Ok(Expr::Array(elements))
    }

    fn parse_object_literal(&mut self) -> Result<Expr, CompileError> {
        let mut properties = vec![];

        while !self.check(&Token::RBrace) {
            let key = match mem::replace(&mut self.current_token, Token::Eof) {
                Token::Identifier(name) => PropertyKey::Identifier(name),
                Token::Keyword(keyword) => PropertyKey::Identifier(keyword.as_str().to_string()),
                Token::String { value, raw } => PropertyKey::Literal(Literal::String { value, raw }),
                Token::Number { value, raw } => PropertyKey::Literal(Literal::Number { value, raw }),
                Token::LBracket => {
                    self.advance()?;
                    let key = self.parse_assignment()?;
                    if !self.check(&Token::RBracket) {
                        return Err(self.unexpected("in computed property key"));
                    }
                    PropertyKey::Computed(Box::new(key))
                }
                token => {
                    self.current_token = token;
                    return Err(self.unexpected("where an object key was expected"));
                }
            };
            self.advance()?;

            let shorthand = matches!(self.current_token, Token::Comma | Token::RBrace);
            let property = match key {
                PropertyKey::Identifier(name) if shorthand => ObjectProperty {
                    key: PropertyKey::Identifier(name.clone()),
                    value: Expr::Identifier(name),
                    shorthand: true,
                },
                key => {
                    self.expect(Token::Colon)?;
                    ObjectProperty {
                        key,
                        value: self.parse_assignment()?,
                        shorthand: false,
                    }
                }
            };
            properties.push(property);

            if !self.check(&Token::RBrace) {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::RBrace)?;
        Ok(Expr::Object(properties))
    }
}

enum Infix {
    Binary(BinOp),
    Logical(LogicalOp),
}

fn parse_interpolation(source: &str, offset: usize) -> Result<Expr, CompileError> {
    let mut parser = Parser::new(Lexer::with_offset(source, offset))?;
    let expr = parser.parse_expression()?;
    parser.expect(Token::Eof)?;
    Ok(expr)
}
