use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::{ErrorSink, SyntaxError};

static KEYWORDS: Lazy<HashMap<&'static str, TokenType>> = Lazy::new(|| {
    HashMap::from([
        ("and", TokenType::And),
        ("class", TokenType::Class),
        ("else", TokenType::Else),
        ("false", TokenType::False),
        ("for", TokenType::For),
        ("fun", TokenType::Fun),
        ("if", TokenType::If),
        ("nil", TokenType::Nil),
        ("or", TokenType::Or),
        ("print", TokenType::Print),
        ("return", TokenType::Return),
        ("true", TokenType::True),
        ("var", TokenType::Var),
        ("while", TokenType::While),
    ])
});

pub fn scan_tokens(code: &str, sink: &mut ErrorSink) -> Vec<Token> {
    let mut scanner = Scanner::new(code);
    let mut tokens = Vec::new();

    while let Some(token) = scanner.next_token(sink) {
        tokens.push(token);
    }

    // the stream always closes with an end-of-file marker
    tokens.push(Token {
        token_type: TokenType::Eof,
        lexeme: String::new(),
        line: scanner.line,
    });
    tokens
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens.
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals.
    Identifier(String),
    String(String),
    Number(f64),

    // Keywords.
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    True,
    Var,
    While,

    // End-of-file marker, always the final token in the stream.
    Eof,
}

#[derive(Debug)]
struct Scanner {
    source: Vec<char>,
    current: usize,
    line: u32,
}

impl Scanner {
    fn new(code: &str) -> Scanner {
        Scanner {
            source: code.chars().collect(),
            current: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.current).copied()
    }

    fn peek_second(&self) -> Option<char> {
        self.source.get(self.current + 1).copied()
    }

    // every consumed character passes through here, so newline counting
    // cannot be forgotten by an individual scanning path
    fn bump(&mut self) -> Option<char> {
        let consumed = self.peek()?;
        self.current += 1;
        if consumed == '\n' {
            self.line += 1;
        }
        Some(consumed)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.bump();
        }
    }

    fn lexeme_from(&self, start: usize) -> String {
        self.source[start..self.current].iter().collect()
    }

    // Produces the next real token, skipping whitespace, comments, and
    // characters the language has no use for. None once input is exhausted.
    fn next_token(&mut self, sink: &mut ErrorSink) -> Option<Token> {
        loop {
            let start = self.current;
            let first = self.bump()?;

            let token_type = match first {
                '(' => TokenType::LeftParen,
                ')' => TokenType::RightParen,
                '{' => TokenType::LeftBrace,
                '}' => TokenType::RightBrace,
                ',' => TokenType::Comma,
                '.' => TokenType::Dot,
                '-' => TokenType::Minus,
                '+' => TokenType::Plus,
                ';' => TokenType::Semicolon,
                '*' => TokenType::Star,
                '!' => self.match_next('=', TokenType::BangEqual, TokenType::Bang),
                '=' => self.match_next('=', TokenType::EqualEqual, TokenType::Equal),
                '<' => self.match_next('=', TokenType::LessEqual, TokenType::Less),
                '>' => self.match_next('=', TokenType::GreaterEqual, TokenType::Greater),
                '/' => {
                    if self.eat('/') {
                        // line comment runs up to, but not through, the newline
                        self.eat_while(|c| c != '\n');
                        continue;
                    }
                    TokenType::Slash
                }
                ' ' | '\r' | '\t' | '\n' => continue,
                '"' => match self.string_literal(start) {
                    Some(token_type) => token_type,
                    None => {
                        sink.syntax_error(&SyntaxError::at_line(self.line, "Unterminated string."));
                        return None;
                    }
                },
                c if c.is_ascii_digit() => self.number_literal(start, sink),
                c if c.is_alphabetic() || c == '_' => self.identifier(start),
                _ => {
                    sink.syntax_error(&SyntaxError::at_line(self.line, "Unexpected character."));
                    continue;
                }
            };

            return Some(Token {
                token_type,
                lexeme: self.lexeme_from(start),
                line: self.line,
            });
        }
    }

    fn match_next(&mut self, second: char, matched: TokenType, alone: TokenType) -> TokenType {
        if self.eat(second) {
            matched
        } else {
            alone
        }
    }

    // None when the closing quote never arrives; the literal may span lines
    fn string_literal(&mut self, start: usize) -> Option<TokenType> {
        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }
            self.bump();
        }
        if !self.eat('"') {
            return None;
        }

        let contents: String = self.source[start + 1..self.current - 1].iter().collect();
        Some(TokenType::String(contents))
    }

    fn number_literal(&mut self, start: usize, sink: &mut ErrorSink) -> TokenType {
        self.eat_while(|c| c.is_ascii_digit());

        // the dot belongs to the number only when a digit follows it
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
        }

        match self.lexeme_from(start).parse() {
            Ok(number) => TokenType::Number(number),
            Err(_) => {
                sink.syntax_error(&SyntaxError::at_line(self.line, "Invalid number literal."));
                TokenType::Number(0.0)
            }
        }
    }

    fn identifier(&mut self, start: usize) -> TokenType {
        self.eat_while(|c| c.is_alphanumeric() || c == '_');

        let text = self.lexeme_from(start);
        match KEYWORDS.get(text.as_str()) {
            Some(keyword) => keyword.clone(),
            None => TokenType::Identifier(text),
        }
    }
}
