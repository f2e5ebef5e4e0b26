use std::str::Chars;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Maximize,
    Minimize,
    Subject,
    To,
    Int,

    // Literals
    Ident,
    Number,

    // Operators
    Plus,
    Minus,
    Star,
    Colon,
    Le,
    Ge,
    Eq,

    // Delimiters
    LBrace,
    RBrace,

    // Special
    Newline,
    Comment,
    Eof,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    current: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            current,
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current;
        self.current = self.chars.next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        c
    }

    fn skip_spaces(&mut self) {
        while matches!(self.current, Some(' ') | Some('\t') | Some('\r')) {
            self.advance();
        }
    }

    fn next_token(&mut self) -> Token {
        self.skip_spaces();

        let start = self.pos;
        let Some(c) = self.current else {
            return Token::new(TokenKind::Eof, Span::new(start, start), "");
        };

        match c {
            '\n' => {
                self.advance();
                Token::new(TokenKind::Newline, Span::new(start, self.pos), "\n")
            }
            '#' => {
                while self.current.is_some() && self.current != Some('\n') {
                    self.advance();
                }
                Token::new(
                    TokenKind::Comment,
                    Span::new(start, self.pos),
                    &self.source[start..self.pos],
                )
            }
            '{' => self.single(TokenKind::LBrace, start),
            '}' => self.single(TokenKind::RBrace, start),
            '+' => self.single(TokenKind::Plus, start),
            '-' => self.single(TokenKind::Minus, start),
            '*' => self.single(TokenKind::Star, start),
            ':' => self.single(TokenKind::Colon, start),
            '=' => self.single(TokenKind::Eq, start),
            '<' => {
                self.advance();
                if self.current == Some('=') {
                    self.advance();
                    Token::new(TokenKind::Le, Span::new(start, self.pos), "<=")
                } else {
                    Token::new(TokenKind::Error, Span::new(start, self.pos), "<")
                }
            }
            '>' => {
                self.advance();
                if self.current == Some('=') {
                    self.advance();
                    Token::new(TokenKind::Ge, Span::new(start, self.pos), ">=")
                } else {
                    Token::new(TokenKind::Error, Span::new(start, self.pos), ">")
                }
            }
            c if c.is_ascii_digit() || c == '.' => self.number(start),
            c if c.is_alphabetic() || c == '_' => self.ident_or_keyword(start),
            _ => {
                self.advance();
                Token::new(
                    TokenKind::Error,
                    Span::new(start, self.pos),
                    &self.source[start..self.pos],
                )
            }
        }
    }

    fn single(&mut self, kind: TokenKind, start: usize) -> Token {
        self.advance();
        Token::new(kind, Span::new(start, self.pos), &self.source[start..self.pos])
    }

    fn number(&mut self, start: usize) -> Token {
        while matches!(self.current, Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.current == Some('.') {
            self.advance();
            while matches!(self.current, Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        Token::new(
            TokenKind::Number,
            Span::new(start, self.pos),
            &self.source[start..self.pos],
        )
    }

    fn ident_or_keyword(&mut self, start: usize) -> Token {
        while matches!(self.current, Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        let text = &self.source[start..self.pos];
        let kind = match text {
            "maximize" => TokenKind::Maximize,
            "minimize" => TokenKind::Minimize,
            "subject" => TokenKind::Subject,
            "to" => TokenKind::To,
            "int" => TokenKind::Int,
            _ => TokenKind::Ident,
        };
        Token::new(kind, Span::new(start, self.pos), text)
    }
}
