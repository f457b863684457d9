pub mod token;
pub use token::is_keyword;

use crate::diagnostics::CompileError;
use crate::span::{LineIndex, Spanned};
use logos::Logos;
use token::Token;

pub fn lex(source: &str) -> Result<Vec<Spanned<Token>>, CompileError> {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = index.span(range.start, range.end);
        match result {
            Ok(Token::LineComment | Token::BlockComment) => continue,
            Ok(tok) => tokens.push(Spanned::new(tok, span)),
            Err(()) => {
                let text = &source[range.start..range.end];
                let msg = if text.bytes().all(|b| b.is_ascii_digit()) {
                    format!("integer literal '{text}' out of range")
                } else {
                    format!("unexpected character '{text}'")
                };
                return Err(CompileError::syntax(msg, span));
            }
        }
    }

    Ok(tokens)
}
