use std::iter::Peekable;
use std::str::Chars;

use log::debug;
use thiserror::Error;

use crate::token::{Literal, Token, TokenType};

/// public interface for tokenizing
///
/// Scanning always runs to the end of `source`: every lexical error is handed to `error_reporter`
/// and the scan resumes after the offending lexeme. The returned tokens end with a single `EOF`.
pub fn tokenize<F: FnMut(ScanningError)>(source: &str, error_reporter: F) -> Vec<Token> {
    let mut scanner = Scanner::new(source, error_reporter);
    scanner.scan_tokens();
    scanner.tokens
}

struct Scanner<'a, F: FnMut(ScanningError)> {
    source: &'a str,
    char_iter: Peekable<Chars<'a>>,
    tokens: Vec<Token>,
    error_reporter: F,

    // byte offset of the start of lexeme, always on a char boundary
    current_lexeme_start: usize,
    current_lexeme_line: usize,
    current: usize,
    line: usize,
}

#[derive(Debug, PartialEq, Error)]
pub enum ScanningError {
    #[error("Unexpected character.")]
    UnexpectedCharacter { line: usize, character: char },
    #[error("Unterminated string.")]
    UnterminatedString { line: usize, string_start: String },
    #[error("Trailing decimal point is not supported.")]
    TrailingDecimalPoint { line: usize, lexeme: String },
    #[error("Invalid number literal.")]
    InvalidNumber { line: usize, lexeme: String },
}

impl ScanningError {
    pub fn line(&self) -> usize {
        match self {
            ScanningError::UnexpectedCharacter { line, .. }
            | ScanningError::UnterminatedString { line, .. }
            | ScanningError::TrailingDecimalPoint { line, .. }
            | ScanningError::InvalidNumber { line, .. } => *line,
        }
    }
}

impl<'a, F: FnMut(ScanningError)> Scanner<'a, F> {
    fn new(source: &'a str, error_reporter: F) -> Scanner<'a, F> {
        Scanner {
            source,
            char_iter: source.chars().peekable(),
            tokens: vec![],
            error_reporter,
            current_lexeme_start: 0,
            current_lexeme_line: 1,
            current: 0,
            line: 1,
        }
    }

    fn scan_tokens(&mut self) {
        while !self.is_at_end() {
            if let Err(scanning_error) = self.scan_token() {
                debug!("scanning error on line {}: {scanning_error:?}", scanning_error.line());
                (self.error_reporter)(scanning_error)
            }
        }
        self.tokens.push(Token::eof(self.line));
    }

    fn scan_token(&mut self) -> Result<(), ScanningError> {
        self.current_lexeme_start = self.current;
        self.current_lexeme_line = self.line;
        let Some(c) = self.advance() else {
            return Ok(());
        };
        let maybe_token_type = match c {
            '(' => Some(TokenType::LeftParen),
            ')' => Some(TokenType::RightParen),
            '{' => Some(TokenType::LeftBrace),
            '}' => Some(TokenType::RightBrace),
            ',' => Some(TokenType::Comma),
            '.' => Some(TokenType::Dot),
            '-' => Some(TokenType::Minus),
            '+' => Some(TokenType::Plus),
            ';' => Some(TokenType::Semicolon),
            '*' => Some(TokenType::Star),
            '!' => match self.match_one('=') {
                true => Some(TokenType::BangEqual),
                false => Some(TokenType::Bang),
            },
            '=' => match self.match_one('=') {
                true => Some(TokenType::EqualEqual),
                false => Some(TokenType::Equal),
            },
            '<' => match self.match_one('=') {
                true => Some(TokenType::LessEqual),
                false => Some(TokenType::Less),
            },
            '>' => match self.match_one('=') {
                true => Some(TokenType::GreaterEqual),
                false => Some(TokenType::Greater),
            },
            '/' => {
                if self.match_one('/') {
                    // the newline is left for the main loop so it bumps the line count
                    while self.peek_one().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                    None
                } else {
                    Some(TokenType::Slash)
                }
            }
            ' ' | '\r' | '\t' => None,
            '\n' => {
                self.line += 1;
                None
            }
            '"' => {
                let value = self.consume_if_match_string()?;
                self.add_literal_token(TokenType::String, Literal::String(value));
                None
            }
            c if is_digit(c) => {
                let value = self.consume_if_match_number()?;
                self.add_literal_token(TokenType::Number, Literal::Number(value));
                None
            }
            c if is_alpha(c) => Some(self.consume_if_match_identifier()),
            _ => {
                return Err(ScanningError::UnexpectedCharacter {
                    line: self.line,
                    character: c,
                });
            }
        };

        if let Some(token_type) = maybe_token_type {
            self.add_token(token_type, None);
        }
        Ok(())
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn match_one(&mut self, expected: char) -> bool {
        if self.peek_one() != Some(expected) {
            return false;
        }
        self.advance();
        true
    }

    fn advance(&mut self) -> Option<char> {
        let current_char = self.char_iter.next()?;
        self.current += current_char.len_utf8();
        Some(current_char)
    }

    /// like advance but does not consume the character. 1 lookahead.
    fn peek_one(&mut self) -> Option<char> {
        self.char_iter.peek().copied()
    }

    fn current_lexeme(&self) -> &'a str {
        &self.source[self.current_lexeme_start..self.current]
    }

    fn add_token(&mut self, token_type: TokenType, literal: Option<Literal>) {
        let token = Token {
            r#type: token_type,
            lexeme: self.current_lexeme().to_string(),
            literal,
            line: self.current_lexeme_line,
        };
        debug!("token {token}");
        self.tokens.push(token);
    }

    fn add_literal_token(&mut self, token_type: TokenType, literal: Literal) {
        self.add_token(token_type, Some(literal))
    }

    /// Returns the text between the quotes. Newlines are allowed inside a string.
    fn consume_if_match_string(&mut self) -> Result<String, ScanningError> {
        while let Some(c) = self.peek_one() {
            if c == '"' {
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            return Err(ScanningError::UnterminatedString {
                line: self.line,
                string_start: self.current_lexeme().to_string(),
            });
        }

        // consume closing quote
        self.advance();

        // both quotes are a single byte
        let lexeme = self.current_lexeme();
        Ok(lexeme[1..lexeme.len() - 1].to_string())
    }

    fn consume_if_match_number(&mut self) -> Result<f64, ScanningError> {
        self.consume_digits();

        if self.match_one('.') {
            // the '.' stays consumed on error, so `1.` is reported once and not as a stray Dot
            if !self.peek_one().is_some_and(is_digit) {
                return Err(ScanningError::TrailingDecimalPoint {
                    line: self.line,
                    lexeme: self.current_lexeme().to_string(),
                });
            }
            self.consume_digits();
        }

        let lexeme = self.current_lexeme();
        lexeme
            .parse::<f64>()
            .map_err(|_| ScanningError::InvalidNumber {
                line: self.line,
                lexeme: lexeme.to_string(),
            })
    }

    fn consume_digits(&mut self) {
        while self.peek_one().is_some_and(is_digit) {
            self.advance();
        }
    }

    fn consume_if_match_identifier(&mut self) -> TokenType {
        while self.peek_one().is_some_and(is_alphanumeric) {
            self.advance();
        }

        match_keyword(self.current_lexeme()).unwrap_or(TokenType::Identifier)
    }
}

fn match_keyword(input: &str) -> Option<TokenType> {
    match input {
        "and" => Some(TokenType::And),
        "class" => Some(TokenType::Class),
        "else" => Some(TokenType::Else),
        "false" => Some(TokenType::False),
        "fun" => Some(TokenType::Fun),
        "for" => Some(TokenType::For),
        "if" => Some(TokenType::If),
        "nil" => Some(TokenType::Nil),
        "or" => Some(TokenType::Or),
        "print" => Some(TokenType::Print),
        "return" => Some(TokenType::Return),
        "super" => Some(TokenType::Super),
        "this" => Some(TokenType::This),
        "true" => Some(TokenType::True),
        "var" => Some(TokenType::Var),
        "while" => Some(TokenType::While),
        _ => None,
    }
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

// Only ASCII letters: 'é' is an unexpected character, not part of an identifier.
fn is_alpha(c: char) -> bool {
    match c {
        'a'..='z' | 'A'..='Z' | '_' => true,
        _ => false,
    }
}

fn is_alphanumeric(c: char) -> bool {
    is_digit(c) || is_alpha(c)
}
