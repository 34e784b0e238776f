use crate::scanner::{tokenize, ScanningError};
use crate::token::{Token, TokenType};

/// Scan code that is expected to be valid, panicking on the first scanning error.
pub fn scan_ok(code: &str) -> Vec<Token> {
    tokenize(code, |error| panic!("{error:?}"))
}

pub fn scan_collecting_errors(code: &str) -> (Vec<Token>, Vec<ScanningError>) {
    let mut errors = vec![];
    let tokens = tokenize(code, |error| errors.push(error));
    (tokens, errors)
}

pub fn token_types(code: &str) -> Vec<TokenType> {
    scan_ok(code).into_iter().map(|token| token.r#type).collect()
}
