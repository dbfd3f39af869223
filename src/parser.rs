use crate::ast::*;
use crate::error::SyntaxError;
use crate::lexer::{tokenize, Token, TokenKind};

type ParseResult<T> = Result<T, SyntaxError>;

/// Tokenizes and parses a whole source file.
pub fn parse_source(source: &str) -> ParseResult<Program> {
    parse(tokenize(source)?)
}

pub fn parse(tokens: Vec<Token>) -> ParseResult<Program> {
    let mut parser = Parser::new(tokens);
    let mut body = Vec::new();
    while !parser.at_eof() {
        body.push(parser.parse_stmt()?);
    }
    Ok(Program { body })
}

/// The Avenger word for a mainstream keyword.
fn suggestion(word: &str) -> Option<&'static str> {
    match word {
        "if" => Some("ifWorthy"),
        "else" => Some("otherwise"),
        "while" => Some("fightUntil"),
        "for" => Some("wakandaFor"),
        "switch" => Some("multiverse"),
        "case" => Some("madness"),
        "let" => Some("newAvenger"),
        "const" => Some("newEternal"),
        "return" => Some("snap"),
        "break" => Some("endGame"),
        "true" => Some("SHIELD"),
        "false" => Some("HYDRA"),
        _ => None,
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(TokenKind::Eof, "EndOfFile", line));
        }
        Self { tokens, pos: 0 }
    }

    fn at(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> TokenKind {
        self.at().kind
    }

    fn line(&self) -> usize {
        self.at().line
    }

    fn at_eof(&self) -> bool {
        self.kind() == TokenKind::Eof
    }

    fn eat(&mut self) -> Token {
        let token = self.at().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> ParseResult<Token> {
        if self.kind() == kind {
            return Ok(self.eat());
        }
        Err(SyntaxError::new(
            self.line(),
            format!("{}, instead scanned '{}'", what, self.at().value),
        ))
    }

    fn reserved_word(&self) -> SyntaxError {
        let word = &self.at().value;
        let message = match suggestion(word) {
            Some(hint) => format!("found an unexpected token '{}', did you mean '{}'", word, hint),
            None => format!("found an unexpected token '{}'", word),
        };
        SyntaxError::new(self.line(), message)
    }

    fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        let kind = match self.kind() {
            TokenKind::NewAvenger | TokenKind::NewEternal => self.parse_var_declaration()?,
            TokenKind::Worthy => StmtKind::If(self.parse_if()?),
            TokenKind::FightUntil => self.parse_while()?,
            TokenKind::EndGame => {
                self.eat();
                self.expect(TokenKind::Semicolon, "expected ';' after 'endGame'")?;
                StmtKind::Break
            }
            TokenKind::Team => self.parse_array_declaration()?,
            TokenKind::Multiverse => self.parse_switch()?,
            TokenKind::WakandaForEach => self.parse_range_for()?,
            TokenKind::WakandaFor => self.parse_c_for()?,
            TokenKind::Assemble => self.parse_function_definition()?,
            TokenKind::Snap => {
                self.eat();
                let value = if self.kind() == TokenKind::Semicolon {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(TokenKind::Semicolon, "expected ';' after 'snap'")?;
                StmtKind::Return(value)
            }
            TokenKind::Reserved => return Err(self.reserved_word()),
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "expected ';' after expression")?;
                StmtKind::Expr(expr)
            }
        };
        Ok(Stmt::new(kind, line))
    }

    /// `{ stmt* }`
    fn parse_block(&mut self, construct: &str) -> ParseResult<Vec<Stmt>> {
        self.expect(
            TokenKind::OpenBrace,
            &format!("expected '{{' before '{}' body", construct),
        )?;
        let mut body = Vec::new();
        while self.kind() != TokenKind::CloseBrace && !self.at_eof() {
            body.push(self.parse_stmt()?);
        }
        self.expect(
            TokenKind::CloseBrace,
            &format!("expected '}}' after '{}' body", construct),
        )?;
        Ok(body)
    }

    fn parse_var_declaration(&mut self) -> ParseResult<StmtKind> {
        let constant = self.eat().kind == TokenKind::NewEternal;
        let name = self
            .expect(TokenKind::Identifier, "expected identifier name in declaration")?
            .value;
        if self.kind() == TokenKind::Semicolon {
            if constant {
                return Err(SyntaxError::new(
                    self.line(),
                    format!("must assign value to constant expression {}", name),
                ));
            }
            self.eat();
            return Ok(StmtKind::VarDecl {
                name,
                constant,
                value: None,
            });
        }
        self.expect(
            TokenKind::Equals,
            &format!("expected assignment to identifier {}", name),
        )?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "expected ';' after declaration")?;
        Ok(StmtKind::VarDecl {
            name,
            constant,
            value: Some(value),
        })
    }

    fn parse_if(&mut self) -> ParseResult<IfStmt> {
        self.eat();
        self.expect(TokenKind::OpenParen, "expected '(' after 'ifWorthy'")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::CloseParen, "expected ')' after 'ifWorthy' condition")?;
        let body = self.parse_block("ifWorthy")?;

        let else_branch = if self.kind() == TokenKind::Otherwise {
            self.eat();
            if self.kind() == TokenKind::Worthy {
                Some(ElseBranch::If(Box::new(self.parse_if()?)))
            } else {
                Some(ElseBranch::Else(self.parse_block("otherwise")?))
            }
        } else {
            None
        };

        Ok(IfStmt {
            condition,
            body,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> ParseResult<StmtKind> {
        self.eat();
        self.expect(TokenKind::OpenParen, "expected '(' after 'fightUntil'")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::CloseParen, "expected ')' after 'fightUntil' condition")?;
        let body = self.parse_block("fightUntil")?;
        Ok(StmtKind::While { condition, body })
    }

    fn parse_array_declaration(&mut self) -> ParseResult<StmtKind> {
        self.eat();
        let name = self.expect(TokenKind::Identifier, "expected 'team' name")?.value;
        self.expect(
            TokenKind::OpenBracket,
            &format!("expected '[' after identifier '{}'", name),
        )?;
        let size = self.parse_expr()?;
        self.expect(TokenKind::CloseBracket, "expected ']' after 'team' size")?;
        self.expect(TokenKind::Equals, "expected '=' for 'team' assignment")?;
        self.expect(TokenKind::OpenBrace, "expected '{' before 'team' values")?;
        let mut values = Vec::new();
        while self.kind() != TokenKind::CloseBrace && !self.at_eof() {
            values.push(self.parse_expr()?);
            if self.kind() == TokenKind::Comma {
                self.eat();
            }
        }
        self.expect(TokenKind::CloseBrace, "expected '}' after 'team' values")?;
        self.expect(TokenKind::Semicolon, "expected ';' after 'team' declaration")?;
        Ok(StmtKind::ArrayDecl { name, size, values })
    }

    fn parse_switch(&mut self) -> ParseResult<StmtKind> {
        self.eat();
        self.expect(TokenKind::OpenParen, "expected '(' after 'multiverse'")?;
        let discriminant = self.parse_expr()?;
        self.expect(TokenKind::CloseParen, "expected ')' after 'multiverse' expression")?;
        self.expect(TokenKind::OpenBrace, "expected '{' before 'multiverse' body")?;

        let mut cases = Vec::new();
        let mut default = Vec::new();
        while self.kind() != TokenKind::CloseBrace && !self.at_eof() {
            match self.kind() {
                TokenKind::Madness => {
                    self.eat();
                    let test = self.parse_expr()?;
                    self.expect(TokenKind::Colon, "expected ':' after 'madness' expression")?;
                    let consequent = self.parse_case_body()?;
                    cases.push(SwitchCase { test, consequent });
                }
                TokenKind::Default => {
                    self.eat();
                    self.expect(TokenKind::Colon, "expected ':' after 'default'")?;
                    default = self.parse_case_body()?;
                }
                _ => {
                    return Err(SyntaxError::new(
                        self.line(),
                        "expected 'madness' or 'default' inside 'multiverse' statement",
                    ))
                }
            }
        }
        self.expect(TokenKind::CloseBrace, "expected '}' after 'multiverse' body")?;
        Ok(StmtKind::Switch {
            discriminant,
            cases,
            default,
        })
    }

    fn parse_case_body(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut body = Vec::new();
        while !matches!(
            self.kind(),
            TokenKind::Madness | TokenKind::Default | TokenKind::CloseBrace | TokenKind::Eof
        ) {
            body.push(self.parse_stmt()?);
        }
        Ok(body)
    }

    fn parse_range_for(&mut self) -> ParseResult<StmtKind> {
        self.eat();
        self.expect(TokenKind::OpenParen, "expected '(' after 'wakandaForEach'")?;
        let iterator = self
            .expect(
                TokenKind::Identifier,
                "expected identifier as an iterator in 'wakandaForEach' loop",
            )?
            .value;
        self.expect(TokenKind::In, "expected 'in' keyword after iterator")?;
        let start = self.parse_expr()?;
        self.expect(TokenKind::To, "expected 'to' keyword after start expression")?;
        let end = self.parse_expr()?;
        let step = if self.kind() == TokenKind::Step {
            self.eat();
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::CloseParen, "expected ')' after 'wakandaForEach' header")?;
        let body = self.parse_block("wakandaForEach")?;
        Ok(StmtKind::RangeFor {
            iterator,
            start,
            end,
            step,
            body,
        })
    }

    fn parse_c_for(&mut self) -> ParseResult<StmtKind> {
        self.eat();
        self.expect(TokenKind::OpenParen, "expected '(' after 'wakandaFor'")?;
        // the initializer statement consumes its own ';'
        let init = Box::new(self.parse_stmt()?);
        let condition = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "expected ';' after condition in 'wakandaFor'")?;
        let modification = self.parse_expr()?;
        self.expect(TokenKind::CloseParen, "expected ')' after 'wakandaFor' header")?;
        let body = self.parse_block("wakandaFor")?;
        Ok(StmtKind::CFor {
            init,
            condition,
            modification,
            body,
        })
    }

    fn parse_function_definition(&mut self) -> ParseResult<StmtKind> {
        self.eat();
        let name = self.expect(TokenKind::Identifier, "expected function name")?.value;
        self.expect(TokenKind::OpenParen, "expected '(' after function name")?;
        let mut params = Vec::new();
        if self.kind() != TokenKind::CloseParen {
            loop {
                params.push(self.expect(TokenKind::Identifier, "expected parameter name")?.value);
                if self.kind() != TokenKind::Comma {
                    break;
                }
                self.eat();
            }
        }
        self.expect(TokenKind::CloseParen, "expected ')' after function parameters")?;
        let body = self.parse_block("assemble")?;
        Ok(StmtKind::FunctionDef { name, params, body })
    }

    fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        let target = self.parse_logical()?;
        match self.kind() {
            TokenKind::Equals => {
                self.eat();
                let value = self.parse_assignment()?;
                Ok(Expr::Assign {
                    target: Box::new(target),
                    value: Box::new(value),
                })
            }
            TokenKind::CompoundAssign => {
                let token = self.eat();
                let op = BinaryOpKind::from_symbol(token.value.trim_end_matches('=')).ok_or_else(
                    || SyntaxError::new(token.line, format!("unknown operator '{}'", token.value)),
                )?;
                let value = self.parse_assignment()?;
                Ok(Expr::CompoundAssign {
                    target: Box::new(target),
                    op,
                    value: Box::new(value),
                })
            }
            _ => Ok(target),
        }
    }

    fn parse_logical(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_comparison()?;
        while self.kind() == TokenKind::LogicalOperator {
            let token = self.eat();
            let op = LogicalOpKind::from_symbol(&token.value).ok_or_else(|| {
                SyntaxError::new(token.line, format!("unknown operator '{}'", token.value))
            })?;
            let right = self.parse_comparison()?;
            left = Expr::Logical {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_additive()?;
        while self.kind() == TokenKind::ComparisonOperator {
            let token = self.eat();
            let op = CompareOpKind::from_symbol(&token.value).ok_or_else(|| {
                SyntaxError::new(token.line, format!("unknown operator '{}'", token.value))
            })?;
            let right = self.parse_additive()?;
            left = Expr::Comparison {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// Binary operator at the cursor if it is one of `ops`.
    fn binary_op(&self, ops: &[BinaryOpKind]) -> Option<BinaryOpKind> {
        if self.kind() != TokenKind::BinaryOperator {
            return None;
        }
        BinaryOpKind::from_symbol(&self.at().value).filter(|op| ops.contains(op))
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        while let Some(op) = self.binary_op(&[BinaryOpKind::Add, BinaryOpKind::Sub]) {
            self.eat();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_exponent()?;
        while let Some(op) =
            self.binary_op(&[BinaryOpKind::Mul, BinaryOpKind::Div, BinaryOpKind::Mod])
        {
            self.eat();
            let right = self.parse_exponent()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_exponent(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_call()?;
        while let Some(op) = self.binary_op(&[BinaryOpKind::Pow]) {
            self.eat();
            let right = self.parse_call()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_member()?;
        while self.kind() == TokenKind::OpenParen {
            self.eat();
            let mut args = Vec::new();
            if self.kind() != TokenKind::CloseParen {
                args.push(self.parse_expr()?);
                while self.kind() == TokenKind::Comma {
                    self.eat();
                    args.push(self.parse_expr()?);
                }
            }
            self.expect(TokenKind::CloseParen, "expected ')' after arguments")?;
            expr = Expr::Call {
                callee: Box::new(expr),
                args,
            };
        }
        Ok(expr)
    }

    fn parse_member(&mut self) -> ParseResult<Expr> {
        let mut object = self.parse_unary()?;
        while self.kind() == TokenKind::OpenBracket {
            self.eat();
            let index = self.parse_expr()?;
            self.expect(TokenKind::CloseBracket, "expected ']' after index")?;
            object = Expr::Member {
                object: Box::new(object),
                index: Box::new(index),
            };
        }
        Ok(object)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.kind() == TokenKind::Minus {
            self.eat();
            let operand = self.parse_primary()?;
            return Ok(Expr::Minus(Box::new(operand)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.kind() {
            TokenKind::Identifier => Ok(Expr::Identifier(self.eat().value)),
            TokenKind::Number => {
                let token = self.eat();
                token.value.parse::<f64>().map(Expr::Number).map_err(|_| {
                    SyntaxError::new(token.line, format!("invalid number '{}'", token.value))
                })
            }
            TokenKind::String => Ok(Expr::String(self.eat().value)),
            TokenKind::Null => {
                self.eat();
                Ok(Expr::Null)
            }
            TokenKind::OpenParen => {
                self.eat();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::CloseParen, "expected ')' after parenthesized expression")?;
                Ok(expr)
            }
            TokenKind::OpenBrace => {
                self.eat();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::CloseBrace, "expected '}' after braced expression")?;
                Ok(expr)
            }
            TokenKind::Not => {
                self.eat();
                let operand = self.parse_comparison()?;
                Ok(Expr::Not(Box::new(operand)))
            }
            TokenKind::Reserved => Err(self.reserved_word()),
            _ => Err(SyntaxError::new(
                self.line(),
                format!("unexpected token found while parsing, scanned '{}'", self.at().value),
            )),
        }
    }
}
