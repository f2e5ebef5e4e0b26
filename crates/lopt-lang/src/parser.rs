use crate::ast::*;
use crate::lexer::{Span, Token, TokenKind};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(source: &str) -> Result<Model, ParseError> {
        let tokens = crate::lexer::Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_model()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn peek_next_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn skip_newlines_and_comments(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Comment) {
            self.advance();
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        self.skip_newlines_and_comments();
        let token = self.current().cloned();
        match token {
            Some(t) if t.kind == kind => {
                self.advance();
                Ok(t)
            }
            Some(t) => Err(ParseError::UnexpectedToken {
                expected: format!("{:?}", kind),
                found: format!("{:?}", t.kind),
                span: t.span,
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("{:?}", t.kind),
                span: t.span,
            },
            None => ParseError::UnexpectedEof,
        }
    }

    fn parse_model(&mut self) -> Result<Model, ParseError> {
        let mut items = Vec::new();

        loop {
            self.skip_newlines_and_comments();

            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Maximize | TokenKind::Minimize => {
                    items.push(Item::Objective(self.parse_objective()?));
                }
                TokenKind::Subject => {
                    items.push(Item::Constraints(self.parse_constraint_block()?));
                }
                TokenKind::Int => {
                    items.push(Item::Integers(self.parse_integer_block()?));
                }
                _ => return Err(self.unexpected("maximize, minimize, subject, or int")),
            }
        }

        Ok(Model { items })
    }

    fn parse_objective(&mut self) -> Result<Objective, ParseError> {
        let token = self.advance().cloned().ok_or(ParseError::UnexpectedEof)?;
        let direction = match token.kind {
            TokenKind::Maximize => ObjectiveDirection::Maximize,
            _ => ObjectiveDirection::Minimize,
        };
        self.expect(TokenKind::Colon)?;
        let expr = self.parse_expr()?;

        let span = expr
            .terms
            .last()
            .map(|t| token.span.merge(t.span))
            .unwrap_or(token.span);
        Ok(Objective {
            span,
            direction,
            expr,
        })
    }

    fn parse_constraint_block(&mut self) -> Result<ConstraintBlock, ParseError> {
        let subject = self.expect(TokenKind::Subject)?;
        self.expect(TokenKind::To)?;
        self.expect(TokenKind::LBrace)?;

        let mut constraints = Vec::new();
        let end;
        loop {
            self.skip_newlines_and_comments();
            match self.peek_kind() {
                TokenKind::RBrace => {
                    end = self.advance().expect("brace present").span;
                    break;
                }
                TokenKind::Eof => return Err(ParseError::UnexpectedEof),
                _ => constraints.push(self.parse_constraint()?),
            }
        }

        Ok(ConstraintBlock {
            span: subject.span.merge(end),
            constraints,
        })
    }

    fn parse_constraint(&mut self) -> Result<ConstraintDecl, ParseError> {
        let start = self
            .current()
            .map(|t| t.span)
            .ok_or(ParseError::UnexpectedEof)?;

        // A label is an identifier directly followed by a colon.
        let name = if self.peek_kind() == TokenKind::Ident
            && self.peek_next_kind() == TokenKind::Colon
        {
            let label = self.advance().expect("ident present").text.clone();
            self.advance();
            Some(label)
        } else {
            None
        };

        let expr = self.parse_expr()?;

        let cmp = match self.peek_kind() {
            TokenKind::Le => Cmp::Le,
            TokenKind::Ge => Cmp::Ge,
            TokenKind::Eq => Cmp::Eq,
            _ => return Err(self.unexpected("<=, >=, or =")),
        };
        self.advance();

        let (rhs, end) = self.parse_signed_number()?;

        Ok(ConstraintDecl {
            span: start.merge(end),
            name,
            expr,
            cmp,
            rhs,
        })
    }

    fn parse_integer_block(&mut self) -> Result<IntegerBlock, ParseError> {
        let int = self.expect(TokenKind::Int)?;
        self.expect(TokenKind::LBrace)?;

        let mut names = Vec::new();
        let end;
        loop {
            self.skip_newlines_and_comments();
            match self.peek_kind() {
                TokenKind::RBrace => {
                    end = self.advance().expect("brace present").span;
                    break;
                }
                TokenKind::Ident => {
                    names.push(self.advance().expect("ident present").text.clone());
                }
                TokenKind::Eof => return Err(ParseError::UnexpectedEof),
                _ => return Err(self.unexpected("variable name or }")),
            }
        }

        Ok(IntegerBlock {
            span: int.span.merge(end),
            names,
        })
    }

    /// Parse a linear expression: signed terms until something that cannot
    /// continue one (a comparison, newline, or brace).
    fn parse_expr(&mut self) -> Result<LinExpr, ParseError> {
        let mut terms = Vec::new();

        let mut sign = match self.peek_kind() {
            TokenKind::Plus => {
                self.advance();
                1.0
            }
            TokenKind::Minus => {
                self.advance();
                -1.0
            }
            _ => 1.0,
        };

        loop {
            terms.push(self.parse_term(sign)?);
            match self.peek_kind() {
                TokenKind::Plus => {
                    self.advance();
                    sign = 1.0;
                }
                TokenKind::Minus => {
                    self.advance();
                    sign = -1.0;
                }
                _ => break,
            }
        }

        Ok(LinExpr { terms })
    }

    fn parse_term(&mut self, sign: f64) -> Result<Term, ParseError> {
        match self.peek_kind() {
            TokenKind::Number => {
                let number = self.advance().expect("number present").clone();
                let value: f64 = number
                    .text
                    .parse()
                    .map_err(|_| ParseError::InvalidNumber(number.text.clone()))?;

                // `3 x`, `3 * x`, or a bare constant
                match self.peek_kind() {
                    TokenKind::Star => {
                        self.advance();
                        let ident = self.expect(TokenKind::Ident)?;
                        Ok(Term::variable(
                            number.span.merge(ident.span),
                            sign * value,
                            ident.text,
                        ))
                    }
                    TokenKind::Ident => {
                        let ident = self.advance().expect("ident present").clone();
                        Ok(Term::variable(
                            number.span.merge(ident.span),
                            sign * value,
                            ident.text,
                        ))
                    }
                    _ => Ok(Term::constant(number.span, sign * value)),
                }
            }
            TokenKind::Ident => {
                let ident = self.advance().expect("ident present").clone();
                Ok(Term::variable(ident.span, sign, ident.text))
            }
            _ => Err(self.unexpected("number or variable")),
        }
    }

    fn parse_signed_number(&mut self) -> Result<(f64, Span), ParseError> {
        let sign = match self.peek_kind() {
            TokenKind::Minus => {
                self.advance();
                -1.0
            }
            TokenKind::Plus => {
                self.advance();
                1.0
            }
            _ => 1.0,
        };
        let number = self.expect(TokenKind::Number)?;
        let value: f64 = number
            .text
            .parse()
            .map_err(|_| ParseError::InvalidNumber(number.text.clone()))?;
        Ok((sign * value, number.span))
    }
}
